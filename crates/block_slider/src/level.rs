use bevy::prelude::*;

pub const WALLS: [IVec2; 9] = [
    IVec2::new(-2, 2),
    IVec2::new(-1, 2),
    IVec2::new(0, 2),
    IVec2::new(1, 2),
    IVec2::new(1, 1),
    IVec2::new(1, 0),
    IVec2::new(-3, -2),
    IVec2::new(-2, -2),
    IVec2::new(3, -3),
];

pub const BLOCKS: [IVec2; 3] = [IVec2::new(-4, -4), IVec2::new(0, -1), IVec2::new(3, 3)];

pub const GOAL: IVec2 = IVec2::new(-1, 3);
