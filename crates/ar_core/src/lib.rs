//! Core types for the AR cube demo.
//!
//! This crate provides:
//! - Cube objects and their motion state machine
//! - Scene state with a node table and hit-testing
//! - Gesture handlers that mutate the scene
//! - A simulated world tracking session (plane detection, light estimation)
//! - Gesture recognition from mouse and touch input
//! - The device camera controller
//! - Configuration loading

use bevy::prelude::*;

pub mod config;
pub mod controller;
pub mod cube;
pub mod device_pose;
pub mod error;
pub mod gesture;
pub mod rng;
pub mod scene;
pub mod scene_nodes;
pub mod tracking;

pub use config::{
    CameraConfig, CubeConfig, DemoConfig, GestureConfig, PhysicsConfig, SurfaceConfig,
    TrackingConfig, DEFAULT_CONFIG_FILE,
};
pub use controller::{
    handle_gesture, handle_long_press, handle_swipe, handle_tap, GestureOutcome, IgnoreReason,
};
pub use cube::{
    BlendMode, CubeAppearance, CubeId, CubeObject, MotionState, RotationAction, CUBE_CATEGORY_BITS,
    CUBE_DAMPING, CUBE_MASS, ROTATION_CYCLE_SECS,
};
pub use device_pose::{device_camera, DeviceCamera, DevicePosePlugin};
pub use error::{ConfigError, ConfigResult};
pub use gesture::{
    Gesture, GestureKind, GestureMessage, GesturePlugin, GestureRecognizer, LongPressSettings,
    PointerCapture, SwipeDirection,
};
pub use rng::SceneRng;
pub use scene::{NodeHit, NodeId, SceneNode, SceneState};
pub use scene_nodes::{FloorMaterial, LightKind, LightSource, PlaneSurface};
pub use tracking::{
    AnchorId, ArSession, ArSessionPlugin, HitTestType, LightEstimate, PlaneAnchor,
    PlaneAnchorAdded, PlaneDetection, PlaneHit, PlaneHitTester, TrackingState,
    WorldTrackingConfiguration,
};

/// Core plugin: tracking session, gesture recognition and the device camera.
pub struct CorePlugin {
    pub config: DemoConfig,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(SceneRng::from_optional_seed(self.config.rng_seed))
            .add_plugins(ArSessionPlugin {
                config: self.config.tracking.clone(),
            })
            .add_plugins(GesturePlugin {
                config: self.config.gestures.clone(),
            })
            .add_plugins(DevicePosePlugin);
    }
}
