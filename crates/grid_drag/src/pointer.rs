use bevy::prelude::*;

/// Snapshot of the primary pointer for one tick, already in world space.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerInput {
    pub just_pressed: bool,
    pub pressed: bool,
    pub just_released: bool,
    pub world_position: Vec2,
}

impl PointerInput {
    pub const fn press(world_position: Vec2) -> Self {
        Self {
            just_pressed: true,
            pressed: true,
            just_released: false,
            world_position,
        }
    }

    pub const fn hold(world_position: Vec2) -> Self {
        Self {
            just_pressed: false,
            pressed: true,
            just_released: false,
            world_position,
        }
    }

    pub const fn release(world_position: Vec2) -> Self {
        Self {
            just_pressed: false,
            pressed: false,
            just_released: true,
            world_position,
        }
    }

    pub const fn idle(world_position: Vec2) -> Self {
        Self {
            just_pressed: false,
            pressed: false,
            just_released: false,
            world_position,
        }
    }
}

/// Screen position of the left mouse button or the first touch, with its
/// button state.
fn screen_pointer(
    buttons: &ButtonInput<MouseButton>,
    touches: &Touches,
    windows: &Query<&Window>,
) -> Option<(PointerInput, Vec2)> {
    let mouse_active = buttons.pressed(MouseButton::Left)
        || buttons.just_pressed(MouseButton::Left)
        || buttons.just_released(MouseButton::Left);

    if mouse_active {
        let cursor_position = windows.get_single().ok()?.cursor_position()?;
        let state = PointerInput {
            just_pressed: buttons.just_pressed(MouseButton::Left),
            pressed: buttons.pressed(MouseButton::Left),
            just_released: buttons.just_released(MouseButton::Left),
            world_position: Vec2::ZERO,
        };
        return Some((state, cursor_position));
    }

    if let Some(touch) = touches.iter_just_pressed().next() {
        return Some((PointerInput::press(Vec2::ZERO), touch.position()));
    }
    if let Some(touch) = touches.iter_just_released().next() {
        return Some((PointerInput::release(Vec2::ZERO), touch.position()));
    }
    let touch = touches.iter().next()?;
    Some((PointerInput::hold(Vec2::ZERO), touch.position()))
}

/// Refreshes the [`PointerInput`] resource from mouse and touch input.
///
/// When nothing is pressed the last world position is kept so a release
/// that happens off-window still has a sensible location.
pub fn read_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mut pointer: ResMut<PointerInput>,
) {
    let last_position = pointer.world_position;

    let Some((mut state, screen_position)) = screen_pointer(&buttons, &touches, &windows) else {
        // A release outside the window still has to end the drag.
        let released =
            buttons.just_released(MouseButton::Left) || touches.any_just_released();
        *pointer = if released {
            PointerInput::release(last_position)
        } else {
            PointerInput::idle(last_position)
        };
        return;
    };

    let Ok((camera, camera_transform)) = camera.get_single() else {
        *pointer = PointerInput::idle(last_position);
        return;
    };

    state.world_position = camera
        .viewport_to_world(camera_transform, screen_position)
        .map(|ray| ray.origin.truncate())
        .unwrap_or(last_position);
    *pointer = state;
}
