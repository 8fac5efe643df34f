//! Cast primitives for exercising the controller without a physics engine.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::cast::{ALL_LAYERS, BlockShape, CastFilter, CastHit, HitBuffer, ShapeCaster};

#[derive(Debug, Clone, Copy)]
pub struct RecordedCast {
    pub origin: Vec2,
    pub direction: Dir2,
    pub max_distance: f32,
    pub filter: CastFilter,
}

/// Answers each cast with the next queued hit list, then with nothing.
#[derive(Debug, Default)]
pub struct ScriptedCaster {
    pub responses: VecDeque<Vec<CastHit>>,
    pub casts: Vec<RecordedCast>,
}

impl ScriptedCaster {
    pub fn with_responses(responses: impl IntoIterator<Item = Vec<CastHit>>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            casts: Vec::new(),
        }
    }
}

impl ShapeCaster for ScriptedCaster {
    fn cast(
        &mut self,
        _shape: &BlockShape,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &CastFilter,
        hits: &mut HitBuffer,
    ) {
        self.casts.push(RecordedCast {
            origin,
            direction,
            max_distance,
            filter: *filter,
        });
        for hit in self.responses.pop_front().unwrap_or_default() {
            hits.push(hit);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StaticBox {
    pub body: Entity,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub layers: u32,
    pub trigger: bool,
}

/// Static axis-aligned boxes with exact swept-box casts.
#[derive(Debug, Default)]
pub struct BoxWorld {
    pub boxes: Vec<StaticBox>,
}

impl BoxWorld {
    pub fn add(&mut self, body: Entity, center: Vec2, half_extents: Vec2) {
        self.boxes.push(StaticBox {
            body,
            center,
            half_extents,
            layers: ALL_LAYERS,
            trigger: false,
        });
    }

    pub fn add_on_layers(&mut self, body: Entity, center: Vec2, half_extents: Vec2, layers: u32) {
        self.boxes.push(StaticBox {
            body,
            center,
            half_extents,
            layers,
            trigger: false,
        });
    }

    pub fn add_trigger(&mut self, body: Entity, center: Vec2, half_extents: Vec2) {
        self.boxes.push(StaticBox {
            body,
            center,
            half_extents,
            layers: ALL_LAYERS,
            trigger: true,
        });
    }
}

/// Ray against the Minkowski sum of both boxes. Boxes that only share a
/// face parallel to the motion are not hit.
fn sweep(shape: &BlockShape, origin: Vec2, direction: Vec2, target: &StaticBox) -> Option<(f32, Vec2)> {
    let reach = shape.half_extents + target.half_extents;
    let offset = origin - target.center;

    let mut enter = f32::NEG_INFINITY;
    let mut exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, r) = (offset[axis], direction[axis], reach[axis]);
        if d == 0.0 {
            if o.abs() >= r {
                return None;
            }
            continue;
        }
        let near = (-r.copysign(d) - o) / d;
        let far = (r.copysign(d) - o) / d;
        if near > enter {
            enter = near;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        exit = exit.min(far);
    }

    if enter > exit || exit <= 0.0 {
        return None;
    }
    Some((enter.max(0.0), normal))
}

impl ShapeCaster for BoxWorld {
    fn cast(
        &mut self,
        shape: &BlockShape,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &CastFilter,
        hits: &mut HitBuffer,
    ) {
        for target in &self.boxes {
            if !filter.accepts(target.body, target.layers, target.trigger) {
                continue;
            }
            let Some((distance, normal)) = sweep(shape, origin, *direction, target) else {
                continue;
            };
            if distance <= max_distance {
                hits.push(CastHit {
                    body: target.body,
                    distance,
                    normal,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_block() -> BlockShape {
        BlockShape::from_size(Vec2::ONE)
    }

    #[test]
    fn sweep_reports_face_normal_and_distance() {
        let mut world = BoxWorld::default();
        world.add(Entity::from_raw(2), Vec2::new(3.0, 0.0), Vec2::splat(0.5));
        let mut hits = HitBuffer::default();

        world.cast(
            &unit_block(),
            Vec2::ZERO,
            Dir2::X,
            5.0,
            &CastFilter::default(),
            &mut hits,
        );

        let hit = hits.iter().next().copied().unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec2::NEG_X);
    }

    #[test]
    fn parallel_faces_and_triggers_are_not_hit() {
        let mut world = BoxWorld::default();
        world.add(Entity::from_raw(2), Vec2::new(2.0, 1.0), Vec2::splat(0.5));
        world.add_trigger(Entity::from_raw(3), Vec2::new(2.0, 0.0), Vec2::splat(0.5));
        let mut hits = HitBuffer::default();

        world.cast(
            &unit_block(),
            Vec2::ZERO,
            Dir2::X,
            5.0,
            &CastFilter::default(),
            &mut hits,
        );

        assert!(hits.is_empty());
    }
}
