use bevy::prelude::*;

use crate::cast::{
    ALL_LAYERS, BlockShape, CastFilter, DEFAULT_HIT_CAPACITY, HitBuffer, ShapeCaster,
};
use crate::grid::GridLayout;
use crate::pointer::PointerInput;

/// Movements shorter than this are ignored.
pub const MOVE_EPSILON: f32 = 0.001;
/// Gap kept between the block and whatever blocked it.
pub const SKIN_EPSILON: f32 = 0.01;
/// Snap offsets shorter than this are applied without casting.
pub const SNAP_THRESHOLD: f32 = 0.05;
/// Extra cast length when validating a snap, to catch edge-touching colliders.
pub const SNAP_CAST_MARGIN: f32 = 0.01;
/// Snap-cast hits at or below this distance count as resting contact.
pub const CONTACT_TOLERANCE: f32 = 0.01;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MotionSettings {
    pub move_epsilon: f32,
    pub skin_epsilon: f32,
    pub snap_threshold: f32,
    pub snap_cast_margin: f32,
    pub contact_tolerance: f32,
    pub hit_capacity: usize,
    /// Collision layers the block is stopped by.
    pub layers: u32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            move_epsilon: MOVE_EPSILON,
            skin_epsilon: SKIN_EPSILON,
            snap_threshold: SNAP_THRESHOLD,
            snap_cast_margin: SNAP_CAST_MARGIN,
            contact_tolerance: CONTACT_TOLERANCE,
            hit_capacity: DEFAULT_HIT_CAPACITY,
            layers: ALL_LAYERS,
        }
    }
}

/// Created when the block is grabbed, dropped when it is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Block position minus pointer position at grab time.
    pub grab_offset: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapOutcome {
    /// Already within the snap threshold; moved without a cast.
    Aligned,
    Snapped,
    /// Something sits between the block and its cell. Nothing moved.
    Blocked { from: Vec2, to: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    None,
    Grabbed,
    Moved { from: Vec2, to: Vec2 },
    Released(SnapOutcome),
}

/// Drives one draggable block: grab, collision-aware drag and grid snap on
/// release.
#[derive(Debug, Clone)]
pub struct BlockMotionController {
    grid: GridLayout,
    body: Entity,
    shape: BlockShape,
    position: Vec2,
    state: DragState,
    activated: bool,
    settings: MotionSettings,
    hits: HitBuffer,
}

impl BlockMotionController {
    pub fn new(
        grid: GridLayout,
        body: Entity,
        shape: BlockShape,
        position: Vec2,
        settings: MotionSettings,
    ) -> Self {
        Self {
            grid,
            body,
            shape,
            position,
            state: DragState::Idle,
            activated: false,
            settings,
            hits: HitBuffer::with_capacity(settings.hit_capacity),
        }
    }

    pub const fn position(&self) -> Vec2 {
        self.position
    }
    pub const fn body(&self) -> Entity {
        self.body
    }
    pub const fn shape(&self) -> BlockShape {
        self.shape
    }
    pub const fn grid(&self) -> &GridLayout {
        &self.grid
    }
    pub const fn state(&self) -> DragState {
        self.state
    }
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }
    pub const fn is_activated(&self) -> bool {
        self.activated
    }
    pub const fn grab_offset(&self) -> Option<Vec2> {
        match self.state {
            DragState::Dragging(session) => Some(session.grab_offset),
            DragState::Idle => None,
        }
    }
    pub fn cell(&self) -> IVec2 {
        self.grid.world_to_grid(self.position)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.shape.contains(self.position, point)
    }

    /// Initial snap. Only the first call does anything.
    pub fn activate(&mut self, caster: &mut impl ShapeCaster) -> Option<SnapOutcome> {
        if self.activated {
            return None;
        }
        self.activated = true;
        Some(self.snap_to_grid(caster))
    }

    /// Advances the drag state machine by one tick of pointer input.
    pub fn tick(&mut self, input: &PointerInput, caster: &mut impl ShapeCaster) -> DragEvent {
        self.activate(caster);

        match self.state {
            DragState::Idle => {
                if input.just_pressed && self.contains_point(input.world_position) {
                    self.grab(input.world_position);
                    DragEvent::Grabbed
                } else {
                    DragEvent::None
                }
            }
            DragState::Dragging(_) if input.just_released || !input.pressed => {
                DragEvent::Released(self.release(caster))
            }
            DragState::Dragging(session) => {
                let from = self.position;
                self.drag_to(input.world_position + session.grab_offset, caster);
                if from == self.position {
                    DragEvent::None
                } else {
                    DragEvent::Moved {
                        from,
                        to: self.position,
                    }
                }
            }
        }
    }

    pub fn grab(&mut self, pointer: Vec2) {
        self.state = DragState::Dragging(DragSession {
            grab_offset: self.position - pointer,
        });
    }

    pub fn release(&mut self, caster: &mut impl ShapeCaster) -> SnapOutcome {
        self.state = DragState::Idle;
        self.snap_to_grid(caster)
    }

    /// Moves toward `target`, first clamping it onto the grid when its cell
    /// lies outside the bounds.
    pub fn drag_to(&mut self, target: Vec2, caster: &mut impl ShapeCaster) -> Vec2 {
        let target = self.grid.clamp_world(target);
        self.resolve_movement(target, caster)
    }

    /// Moves as far toward `target` as obstacles allow, then slides along the
    /// blocking surface with what is left. Returns the applied displacement,
    /// which is never longer than `target - position`.
    pub fn resolve_movement(&mut self, target: Vec2, caster: &mut impl ShapeCaster) -> Vec2 {
        let start = self.position;
        let movement = target - start;
        let distance = movement.length();
        if distance < self.settings.move_epsilon {
            return Vec2::ZERO;
        }
        let Ok(direction) = Dir2::new(movement) else {
            return Vec2::ZERO;
        };

        self.cast(direction, distance, caster);

        let mut closest_distance = distance;
        let mut closest_normal = Vec2::ZERO;
        for hit in self.hits.iter() {
            if hit.body != self.body && hit.distance < closest_distance {
                closest_distance = hit.distance;
                closest_normal = hit.normal;
            }
        }

        if closest_distance >= distance {
            self.position = target;
            return target - start;
        }

        let approach = (closest_distance - self.settings.skin_epsilon).max(0.0);
        self.position += *direction * approach;

        let remaining = target - self.position;
        if closest_normal != Vec2::ZERO && remaining.length() > self.settings.move_epsilon {
            self.slide(closest_normal, remaining, caster);
        }

        self.position - start
    }

    fn slide(&mut self, normal: Vec2, remaining: Vec2, caster: &mut impl ShapeCaster) {
        let perpendicular = normal.normalize_or_zero().perp();
        let slide_direction = if perpendicular.dot(remaining) >= 0.0 {
            perpendicular
        } else {
            -perpendicular
        };
        let slide_distance = remaining.normalize().dot(slide_direction) * remaining.length();
        let requested = slide_distance.abs();
        if requested <= 0.0 {
            return;
        }
        let Ok(direction) = Dir2::new(slide_direction) else {
            return;
        };

        self.cast(direction, requested, caster);

        let mut allowed = requested;
        for hit in self.hits.iter() {
            if hit.body != self.body && hit.distance < requested {
                allowed = allowed.min(hit.distance - self.settings.skin_epsilon);
            }
        }

        if allowed > 0.0 {
            self.position += *direction * allowed;
        }
    }

    /// Moves onto the centre of the nearest in-bounds cell unless something
    /// is in the way, in which case the block stays put.
    pub fn snap_to_grid(&mut self, caster: &mut impl ShapeCaster) -> SnapOutcome {
        let snapped = self.grid.snap_world(self.position);
        let offset = snapped - self.position;
        let distance = offset.length();

        if distance < self.settings.snap_threshold {
            self.position = snapped;
            return SnapOutcome::Aligned;
        }

        let Ok(direction) = Dir2::new(offset) else {
            self.position = snapped;
            return SnapOutcome::Aligned;
        };
        self.cast(direction, distance + self.settings.snap_cast_margin, caster);

        let blocked = self
            .hits
            .iter()
            .any(|hit| hit.body != self.body && hit.distance > self.settings.contact_tolerance);

        if blocked {
            warn!("Snap to grid blocked: {} -> {}", self.position, snapped);
            return SnapOutcome::Blocked {
                from: self.position,
                to: snapped,
            };
        }

        self.position = snapped;
        info!("Snapped to grid at {}", self.cell());
        SnapOutcome::Snapped
    }

    fn cast(&mut self, direction: Dir2, max_distance: f32, caster: &mut impl ShapeCaster) {
        let filter = CastFilter::solid_except(self.body, self.settings.layers);
        self.hits.clear();
        caster.cast(
            &self.shape,
            self.position,
            direction,
            max_distance,
            &filter,
            &mut self.hits,
        );
        if self.hits.is_truncated() {
            warn!(
                "Cast from {} hit more than {} colliders, extra hits dropped",
                self.position,
                self.hits.capacity()
            );
        }
    }
}
