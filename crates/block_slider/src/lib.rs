use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::window::{WindowMode, WindowResolution};
use grid_drag::{
    BlockReleased, DraggableBlock, GridDragPlugin, GridDragSet, GridLayout, SnapOutcome,
};

mod level;

use level::{BLOCKS, GOAL, WALLS};

// typical smartphone screen ratio (9:16)
const WINDOW_WIDTH: f32 = 360.0;
const WINDOW_HEIGHT: f32 = 640.0;

const GRID_ROWS: i32 = 10;
const GRID_COLS: i32 = 10;
/// One grid cell is one world unit; this is how many pixels it covers.
const CELL_PIXELS: f32 = 34.0;
/// Blocks are a bit smaller than a cell so neighbours never touch.
const BLOCK_SIZE: f32 = 0.9;

const LIGHT_CELL: Color = Color::srgb(0.16, 0.16, 0.2);
const DARK_CELL: Color = Color::srgb(0.12, 0.12, 0.15);
const WALL_COLOR: Color = Color::srgb(0.45, 0.45, 0.5);
const BLOCK_COLOR: Color = Color::srgb(0.3, 0.5, 0.7);
const GOAL_COLOR: Color = Color::srgba(0.3, 0.8, 0.3, 0.5);

#[derive(Component)]
struct MovesText;

#[derive(Resource, Default)]
struct Moves {
    count: u32,
    blocked: u32,
}

pub fn run() {
    let grid = match GridLayout::new(GRID_ROWS, GRID_COLS, 1.0) {
        Ok(grid) => grid,
        Err(err) => {
            error!("Invalid grid configuration: {err}");
            return;
        }
    };

    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: env!("CARGO_PKG_NAME").to_string(),
            present_mode: bevy::window::PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            canvas: Some("#bit".into()),
            fit_canvas_to_parent: true,
            mode: WindowMode::Windowed,
            prevent_default_event_handling: false,
            ..default()
        }),
        ..default()
    };

    App::new()
        .add_plugins(DefaultPlugins.set(window_plugin))
        // Keeps the frame rate in check on mobile.
        .add_plugins(bevy_framepace::FramepacePlugin)
        .add_plugins(PhysicsPlugins::default())
        .insert_resource(Gravity(Vec2::ZERO))
        .insert_resource(ClearColor(Color::BLACK))
        .add_plugins(GridDragPlugin::new(grid))
        .init_resource::<Moves>()
        .add_systems(Startup, (setup_camera, spawn_board, spawn_hud))
        .add_systems(
            Update,
            (count_moves, update_hud).chain().after(GridDragSet),
        )
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scale: CELL_PIXELS.recip(),
            ..OrthographicProjection::default_2d()
        },
    ));
}

fn spawn_board(mut commands: Commands, grid: Res<GridLayout>) {
    for x in grid.min_x()..=grid.max_x() {
        for y in grid.min_y()..=grid.max_y() {
            let color = if (x + y).rem_euclid(2) == 0 {
                LIGHT_CELL
            } else {
                DARK_CELL
            };
            let center = grid.grid_to_world(IVec2::new(x, y));
            commands.spawn((
                Sprite::from_color(color, Vec2::ONE),
                Transform::from_translation(center.extend(-10.0)),
            ));
        }
    }

    for cell in WALLS {
        let center = grid.grid_to_world(cell);
        commands.spawn((
            Sprite::from_color(WALL_COLOR, Vec2::ONE),
            Transform::from_translation(center.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(1.0, 1.0),
        ));
    }

    // The goal is a trigger, blocks pass straight over it.
    commands.spawn((
        Sprite::from_color(GOAL_COLOR, Vec2::ONE),
        Transform::from_translation(grid.grid_to_world(GOAL).extend(-5.0)),
        RigidBody::Static,
        Collider::rectangle(1.0, 1.0),
        Sensor,
    ));

    for cell in BLOCKS {
        // Blocks start slightly off their cell; activation snaps them in.
        let start = grid.grid_to_world(cell) + Vec2::new(0.2, -0.15);
        commands.spawn((
            Sprite::from_color(BLOCK_COLOR, Vec2::splat(BLOCK_SIZE)),
            Transform::from_translation(start.extend(1.0)),
            DraggableBlock {
                size: Vec2::splat(BLOCK_SIZE),
            },
        ));
    }
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Text::new("Drag a block onto the green cell"),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(16.0),
            ..default()
        },
        MovesText,
    ));
}

fn count_moves(
    mut released: EventReader<BlockReleased>,
    mut moves: ResMut<Moves>,
    grid: Res<GridLayout>,
    transforms: Query<&Transform>,
) {
    for event in released.read() {
        match event.outcome {
            SnapOutcome::Blocked { from, to } => {
                moves.blocked += 1;
                info!("Block {} could not settle: {from} -> {to}", event.entity);
            }
            SnapOutcome::Aligned | SnapOutcome::Snapped => {
                moves.count += 1;
                let Ok(transform) = transforms.get(event.entity) else {
                    continue;
                };
                if grid.world_to_grid(transform.translation.truncate()) == GOAL {
                    info!("Block {} reached the goal", event.entity);
                }
            }
        }
    }
}

fn update_hud(moves: Res<Moves>, mut text: Query<&mut Text, With<MovesText>>) {
    if !moves.is_changed() || moves.count + moves.blocked == 0 {
        return;
    }
    let Ok(mut text) = text.get_single_mut() else {
        return;
    };
    text.0 = format!("Moves: {}  Blocked: {}", moves.count, moves.blocked);
}
