use bevy::prelude::*;

/// Layer mask matching every collision layer.
pub const ALL_LAYERS: u32 = u32::MAX;

/// Default number of hits a single cast can report.
pub const DEFAULT_HIT_CAPACITY: usize = 5;

/// One contact reported by a shape cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub body: Entity,
    /// Distance travelled along the cast direction before touching `body`.
    pub distance: f32,
    /// Surface normal of `body` at the contact point.
    pub normal: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastFilter {
    pub exclude: Option<Entity>,
    pub layers: u32,
    pub include_triggers: bool,
}

impl CastFilter {
    /// Solid colliders on `layers`, ignoring `body` itself.
    pub const fn solid_except(body: Entity, layers: u32) -> Self {
        Self {
            exclude: Some(body),
            layers,
            include_triggers: false,
        }
    }

    pub fn accepts(&self, body: Entity, layers: u32, is_trigger: bool) -> bool {
        self.exclude != Some(body)
            && self.layers & layers != 0
            && (self.include_triggers || !is_trigger)
    }
}

impl Default for CastFilter {
    fn default() -> Self {
        Self {
            exclude: None,
            layers: ALL_LAYERS,
            include_triggers: false,
        }
    }
}

/// Axis-aligned box swept by a cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockShape {
    pub half_extents: Vec2,
}

impl BlockShape {
    pub const fn from_size(size: Vec2) -> Self {
        Self {
            half_extents: Vec2::new(size.x / 2.0, size.y / 2.0),
        }
    }

    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let local = (point - center).abs();
        local.x <= self.half_extents.x && local.y <= self.half_extents.y
    }
}

/// Fixed-capacity scratch storage reused across casts.
///
/// Hits pushed beyond the capacity are dropped and the buffer is flagged as
/// truncated until the next [`HitBuffer::clear`].
#[derive(Debug, Clone)]
pub struct HitBuffer {
    hits: Vec<CastHit>,
    capacity: usize,
    truncated: bool,
}

impl HitBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hits: Vec::with_capacity(capacity),
            capacity,
            truncated: false,
        }
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.truncated = false;
    }

    /// Returns false when the hit did not fit.
    pub fn push(&mut self, hit: CastHit) -> bool {
        if self.hits.len() >= self.capacity {
            self.truncated = true;
            return false;
        }
        self.hits.push(hit);
        true
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
    /// Slots still free before further hits are dropped.
    pub fn remaining(&self) -> usize {
        self.capacity - self.hits.len()
    }
    pub fn len(&self) -> usize {
        self.hits.len()
    }
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }
    pub fn iter(&self) -> impl Iterator<Item = &CastHit> {
        self.hits.iter()
    }
}

impl Default for HitBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HIT_CAPACITY)
    }
}

/// Sweeps a box through the world and records what it touches.
///
/// Implementations fill `hits` (which the caller has already cleared) with
/// every accepted contact within `max_distance`, in any order.
pub trait ShapeCaster {
    fn cast(
        &mut self,
        shape: &BlockShape,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &CastFilter,
        hits: &mut HitBuffer,
    );
}
