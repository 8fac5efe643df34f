use avian2d::prelude::*;
use bevy::prelude::*;

use crate::cast::{BlockShape, CastFilter, CastHit, HitBuffer, ShapeCaster};
use crate::grid::GridLayout;
use crate::motion::{BlockMotionController, DragEvent, MotionSettings, SnapOutcome};
use crate::pointer::{PointerInput, read_pointer};

/// Drives every [`DraggableBlock`] from mouse or touch input.
///
/// Physics itself is not added here; the app is expected to add avian's
/// `PhysicsPlugins`.
pub struct GridDragPlugin {
    pub grid: GridLayout,
    pub settings: MotionSettings,
}

impl GridDragPlugin {
    pub fn new(grid: GridLayout) -> Self {
        Self {
            grid,
            settings: MotionSettings::default(),
        }
    }
}

impl Plugin for GridDragPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.grid)
            .insert_resource(self.settings)
            .init_resource::<PointerInput>()
            .add_event::<BlockReleased>()
            .add_systems(
                Update,
                (read_pointer, activate_blocks, drive_blocks)
                    .chain()
                    .in_set(GridDragSet),
            );
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridDragSet;

/// Spawn this next to a `Transform` to get a draggable block of `size`.
#[derive(Component, Debug, Clone, Copy)]
pub struct DraggableBlock {
    pub size: Vec2,
}

/// Motion state attached once a [`DraggableBlock`] has been activated.
#[derive(Component, Debug, Deref, DerefMut)]
pub struct BlockMotion(pub BlockMotionController);

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BlockReleased {
    pub entity: Entity,
    pub outcome: SnapOutcome,
}

/// [`ShapeCaster`] over avian's spatial query pipeline.
pub struct AvianCaster<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    sensors: &'a Query<'w, 's, (), With<Sensor>>,
}

impl<'a, 'w, 's> AvianCaster<'a, 'w, 's> {
    pub const fn new(
        spatial_query: &'a SpatialQuery<'w, 's>,
        sensors: &'a Query<'w, 's, (), With<Sensor>>,
    ) -> Self {
        Self {
            spatial_query,
            sensors,
        }
    }
}

impl ShapeCaster for AvianCaster<'_, '_, '_> {
    fn cast(
        &mut self,
        shape: &BlockShape,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &CastFilter,
        hits: &mut HitBuffer,
    ) {
        let collider = Collider::rectangle(shape.half_extents.x * 2.0, shape.half_extents.y * 2.0);
        let mut query_filter = SpatialQueryFilter::from_mask(LayerMask(filter.layers));
        if let Some(exclude) = filter.exclude {
            query_filter = query_filter.with_excluded_entities([exclude]);
        }

        // Sensors are dropped after the query, so leave room for them.
        let max_hits = (hits.remaining() + self.sensors.iter().count()).max(1) as u32;
        let found = self.spatial_query.shape_hits(
            &collider,
            origin,
            0.0,
            direction,
            max_hits,
            &ShapeCastConfig::from_max_distance(max_distance),
            &query_filter,
        );

        for hit in found {
            if !filter.include_triggers && self.sensors.contains(hit.entity) {
                continue;
            }
            hits.push(CastHit {
                body: hit.entity,
                distance: hit.distance,
                normal: hit.normal1,
            });
        }
    }
}

/// The block that should receive this tick's input: the one already being
/// dragged, or on a fresh press the first block under the pointer.
pub fn pick_active_block<'a>(
    blocks: impl IntoIterator<Item = (Entity, &'a BlockMotionController)>,
    pointer: &PointerInput,
) -> Option<Entity> {
    let mut pressed_on = None;
    for (entity, controller) in blocks {
        if controller.is_dragging() {
            return Some(entity);
        }
        if pressed_on.is_none()
            && pointer.just_pressed
            && controller.contains_point(pointer.world_position)
        {
            pressed_on = Some(entity);
        }
    }
    pressed_on
}

fn activate_blocks(
    mut commands: Commands,
    grid: Res<GridLayout>,
    settings: Res<MotionSettings>,
    spatial_query: SpatialQuery,
    sensors: Query<(), With<Sensor>>,
    mut new_blocks: Query<(Entity, &DraggableBlock, &mut Transform), Without<BlockMotion>>,
) {
    let mut caster = AvianCaster::new(&spatial_query, &sensors);

    for (entity, block, mut transform) in &mut new_blocks {
        let mut controller = BlockMotionController::new(
            *grid,
            entity,
            BlockShape::from_size(block.size),
            transform.translation.truncate(),
            *settings,
        );
        if let Some(outcome) = controller.activate(&mut caster) {
            debug!("Activated block {entity}: {outcome:?}");
        }
        transform.translation = controller.position().extend(transform.translation.z);

        commands.entity(entity).insert((
            BlockMotion(controller),
            RigidBody::Kinematic,
            Collider::rectangle(block.size.x, block.size.y),
            LockedAxes::ROTATION_LOCKED,
            SweptCcd::default(),
        ));
    }
}

fn drive_blocks(
    pointer: Res<PointerInput>,
    spatial_query: SpatialQuery,
    sensors: Query<(), With<Sensor>>,
    mut blocks: Query<(Entity, &mut BlockMotion, &mut Transform)>,
    mut released: EventWriter<BlockReleased>,
) {
    let Some(entity) = pick_active_block(
        blocks.iter().map(|(entity, motion, _)| (entity, &motion.0)),
        &pointer,
    ) else {
        return;
    };
    let Ok((_, mut motion, mut transform)) = blocks.get_mut(entity) else {
        return;
    };

    let mut caster = AvianCaster::new(&spatial_query, &sensors);
    match motion.tick(&pointer, &mut caster) {
        DragEvent::Grabbed => debug!("Grabbed block {entity} at {}", motion.cell()),
        DragEvent::Released(outcome) => {
            released.send(BlockReleased { entity, outcome });
        }
        DragEvent::Moved { .. } | DragEvent::None => {}
    }

    let position = motion.position();
    if transform.translation.truncate() != position {
        transform.translation = position.extend(transform.translation.z);
    }
}
