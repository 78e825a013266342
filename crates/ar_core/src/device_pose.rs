//! Simulated device pose.
//!
//! There is no phone to track, so the device is held at a fixed distance from
//! a pivot on the floor and always faces it. Right mouse drag walks around the
//! pivot and tilts the device; the scroll wheel moves it closer or further.
//! The left button is left free for gestures.

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::prelude::*;

use crate::config::CameraConfig;

/// Never look from below the floor or straight down.
const TILT_RANGE: (f32, f32) = (0.05, 1.5);
const DISTANCE_RANGE: (f32, f32) = (0.1, 5.0);
/// Radians per pixel of drag
const DRAG_SENSITIVITY: f32 = 0.005;
/// Meters per scroll line
const SCROLL_STEP: f32 = 0.05;

/// Where the device is held relative to the point it looks at.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct DeviceCamera {
    pub pivot: Vec3,
    pub distance: f32,
    /// Turn around the pivot (radians, about +Y)
    pub heading: f32,
    /// Angle above the floor (radians)
    pub tilt: f32,
}

impl DeviceCamera {
    pub fn from_config(config: &CameraConfig, pivot: Vec3) -> Self {
        Self {
            pivot,
            distance: config.distance.clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1),
            heading: 0.0,
            tilt: config.elevation.clamp(TILT_RANGE.0, TILT_RANGE.1),
        }
    }

    /// Apply one frame of input: a drag in pixels and scroll in lines.
    pub fn apply_input(&mut self, drag: Vec2, scroll: f32) {
        self.heading -= drag.x * DRAG_SENSITIVITY;
        self.tilt = (self.tilt + drag.y * DRAG_SENSITIVITY).clamp(TILT_RANGE.0, TILT_RANGE.1);
        self.distance =
            (self.distance - scroll * SCROLL_STEP).clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
    }

    /// World pose of the device, facing the pivot.
    pub fn transform(&self) -> Transform {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.heading, -self.tilt, 0.0);
        Transform::from_translation(self.pivot + rotation * Vec3::Z * self.distance)
            .with_rotation(rotation)
    }
}

/// Components for the device camera, rendering with 4x multisampling.
pub fn device_camera(device: DeviceCamera) -> impl Bundle {
    (Camera3d::default(), Msaa::Sample4, device.transform(), device)
}

fn move_device(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mut devices: Query<(&mut DeviceCamera, &mut Transform)>,
) {
    let drag = if mouse_button.pressed(MouseButton::Right) {
        mouse_motion.delta
    } else {
        Vec2::ZERO
    };
    let scroll = mouse_scroll.delta.y;
    if drag == Vec2::ZERO && scroll == 0.0 {
        return;
    }

    for (mut device, mut transform) in devices.iter_mut() {
        device.apply_input(drag, scroll);
        *transform = device.transform();
    }
}

pub struct DevicePosePlugin;

impl Plugin for DevicePosePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, move_device);
    }
}
