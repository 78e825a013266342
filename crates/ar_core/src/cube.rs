//! Cube objects: randomized appearance plus a two-state motion machine.
//!
//! A cube starts [`MotionState::Stopped`]. [`CubeObject::swap_state`] flips it;
//! entering `Moving` starts a looping Y rotation, entering `Stopped` removes
//! every running action. A swipe changes the rotation speed and restarts the
//! rotation straight away, whatever the motion state.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;
use rand::Rng;
use std::f64::consts::{PI, TAU};

use crate::config::CubeConfig;
use crate::gesture::SwipeDirection;
use crate::scene::NodeId;

/// Physics mass of every cube.
pub const CUBE_MASS: f32 = 2.0;
/// Linear and angular damping of every cube.
pub const CUBE_DAMPING: f32 = 0.5;
/// Physics category bit for cubes.
pub const CUBE_CATEGORY_BITS: u32 = 1 << 1;
/// Duration of one rotation cycle in seconds.
pub const ROTATION_CYCLE_SECS: f64 = 1.0;

/// Index of a cube in the scene's append-only cube list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeId(pub usize);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionState {
    #[default]
    Stopped,
    Moving,
}

impl MotionState {
    pub fn toggled(self) -> Self {
        match self {
            MotionState::Stopped => MotionState::Moving,
            MotionState::Moving => MotionState::Stopped,
        }
    }
}

/// How the cube's material is composited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Alpha,
    Screen,
}

/// Infinitely repeating rotation around Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationAction {
    /// Radians turned per cycle
    pub angle_per_cycle: f64,
    pub cycle_secs: f64,
}

impl RotationAction {
    pub fn for_speed(rotation_speed: f64) -> Self {
        Self {
            angle_per_cycle: rotation_speed * PI,
            cycle_secs: ROTATION_CYCLE_SECS,
        }
    }

    /// Radians per second.
    pub fn angular_velocity(&self) -> f64 {
        self.angle_per_cycle / self.cycle_secs
    }

    /// Rotation produced over `dt` seconds.
    pub fn advance(&self, dt: f64) -> f64 {
        self.angular_velocity() * dt
    }
}

/// Randomized look of a cube, fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeAppearance {
    /// Axis (x, y, z) and angle (w, radians), each drawn from `[0, 90]`
    pub rotation: Vec4,
    pub color: Color,
    pub blend_mode: BlendMode,
}

impl CubeAppearance {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let rotation = Vec4::new(
            rng.gen_range(0.0..=90.0),
            rng.gen_range(0.0..=90.0),
            rng.gen_range(0.0..=90.0),
            rng.gen_range(0.0..=90.0),
        );

        let mut channel = || rng.gen_range(0.0f32..255.0) / 255.0;
        let color = Color::srgba(channel(), channel(), channel(), 1.0);

        let blend_mode = if rng.gen_bool(0.5) {
            BlendMode::Screen
        } else {
            BlendMode::Alpha
        };

        Self {
            rotation,
            color,
            blend_mode,
        }
    }

    /// Initial orientation as a quaternion. A zero axis falls back to +Y.
    pub fn orientation(&self) -> Quat {
        let axis = self.rotation.truncate().try_normalize().unwrap_or(Vec3::Y);
        Quat::from_axis_angle(axis, self.rotation.w)
    }
}

/// A spawned cube.
#[derive(Clone, Debug)]
pub struct CubeObject {
    pub id: CubeId,
    pub node: NodeId,
    /// Current world position, kept in sync with the physics body
    pub position: Vec3,
    /// Current body orientation, kept in sync with the physics body
    pub rotation: Quat,
    pub size: f32,
    pub appearance: CubeAppearance,
    rotation_speed: f64,
    state: MotionState,
    action: Option<RotationAction>,
    spin: f64,
}

impl CubeObject {
    pub fn new<R: Rng + ?Sized>(
        id: CubeId,
        node: NodeId,
        position: Vec3,
        config: &CubeConfig,
        rng: &mut R,
    ) -> Self {
        let appearance = CubeAppearance::random(rng);
        Self {
            id,
            node,
            position,
            rotation: appearance.orientation(),
            size: config.size,
            appearance,
            rotation_speed: config.initial_rotation_speed,
            state: MotionState::Stopped,
            action: None,
            spin: 0.0,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// The running rotation, if any.
    pub fn action(&self) -> Option<&RotationAction> {
        self.action.as_ref()
    }

    /// Accumulated rotation from actions, in `[0, 2π)`.
    pub fn spin_angle(&self) -> f64 {
        self.spin
    }

    pub fn mass(&self) -> f32 {
        CUBE_MASS
    }

    pub fn damping(&self) -> f32 {
        CUBE_DAMPING
    }

    /// Flip between stopped and moving and return the new state.
    pub fn swap_state(&mut self) -> MotionState {
        self.state = self.state.toggled();
        match self.state {
            MotionState::Moving => self.start_rotation(),
            MotionState::Stopped => self.stop_all_actions(),
        }
        self.state
    }

    /// Apply a directional swipe: right speeds up, left slows down (and may go negative).
    pub fn handle_swipe(&mut self, direction: SwipeDirection, step: f64) -> f64 {
        self.rotation_speed = match direction {
            SwipeDirection::Right => self.rotation_speed + step,
            SwipeDirection::Left => self.rotation_speed - step,
        };
        self.stop_all_actions();
        self.start_rotation();
        self.rotation_speed
    }

    /// Advance running actions by `dt` seconds and return the spin angle.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if let Some(action) = &self.action {
            self.spin = (self.spin + action.advance(dt)).rem_euclid(TAU);
        }
        self.spin
    }

    /// Orientation of the visible mesh: the body rotation plus the action spin.
    pub fn world_rotation(&self) -> Quat {
        self.rotation * Quat::from_rotation_y(self.spin as f32)
    }

    /// Bounding box in the cube's own frame.
    pub fn local_bounding_box(&self) -> Aabb3d {
        Aabb3d::new(Vec3::ZERO, Vec3::splat(self.size / 2.0))
    }

    /// Distance along `ray` to the cube's bounding box, tested in the cube's frame.
    pub fn ray_intersection(&self, ray: Ray3d, max_distance: f32) -> Option<f32> {
        let inverse = self.world_rotation().inverse();
        let local = Ray3d {
            origin: inverse * (ray.origin - self.position),
            direction: inverse * ray.direction,
        };
        RayCast3d::from_ray(local, max_distance).aabb_intersection_at(&self.local_bounding_box())
    }

    fn start_rotation(&mut self) {
        self.action = Some(RotationAction::for_speed(self.rotation_speed));
    }

    fn stop_all_actions(&mut self) {
        self.action = None;
    }
}
