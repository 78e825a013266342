//! Demo configuration.
//!
//! Everything tunable about the demo lives in [`DemoConfig`]. It is loaded from
//! an optional JSON file; any field left out of the file keeps its default, so
//! an empty object `{}` is a valid configuration.
//!
//! ```ignore
//! let config = DemoConfig::load_or_default("ar_demo.json")?;
//! app.insert_resource(config);
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ar_demo.json";

/// Top-level demo configuration.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub tracking: TrackingConfig,
    pub physics: PhysicsConfig,
    pub cube: CubeConfig,
    pub gestures: GestureConfig,
    pub camera: CameraConfig,
    /// Seed for cube randomization. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

/// Simulated world tracking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub light_estimation: bool,
    pub horizontal_plane_detection: bool,
    /// Real-world horizontal surfaces the session will eventually detect.
    pub surfaces: Vec<SurfaceConfig>,
    /// Ambient intensity reported by the light estimate (1000 is neutral).
    pub ambient_intensity: f32,
    /// Ambient color temperature in kelvin reported by the light estimate.
    pub ambient_color_temperature: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            light_estimation: true,
            horizontal_plane_detection: true,
            surfaces: vec![SurfaceConfig::default()],
            ambient_intensity: 1000.0,
            ambient_color_temperature: 6500.0,
        }
    }
}

/// A horizontal surface in the simulated environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Center of the surface in world space
    pub center: [f32; 3],
    /// Width (x) and depth (z) of the surface
    pub extent: [f32; 2],
    /// Seconds of tracking before the surface is detected
    pub detection_delay_secs: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            extent: [1.0, 1.0],
            detection_delay_secs: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration. Defaults to lunar gravity.
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity: -1.62 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Edge length of a spawned cube
    pub size: f32,
    /// Height above a tapped cube where its duplicate spawns
    pub stack_offset: f32,
    pub initial_rotation_speed: f64,
    /// Rotation speed change per directional swipe
    pub rotation_speed_step: f64,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: 0.02,
            stack_offset: 0.02,
            initial_rotation_speed: 1.0,
            rotation_speed_step: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Seconds a press must be held to become a long press
    pub long_press_min_duration: f32,
    pub delays_touches_ended: bool,
    /// Horizontal travel in pixels that turns a press into a swipe
    pub swipe_min_distance: f32,
    /// Pixels a tap may drift and still count as a tap
    pub tap_max_movement: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_min_duration: 0.5,
            delays_touches_ended: true,
            swipe_min_distance: 40.0,
            tap_max_movement: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting distance of the device from the origin
    pub distance: f32,
    /// Starting elevation angle (radians)
    pub elevation: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 0.5,
            elevation: 0.6,
        }
    }
}

impl DemoConfig {
    /// Load a config from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: DemoConfig = serde_json::from_str(&text)?;
        config.validate(path)?;
        Ok(config)
    }

    /// Load a config from a JSON file, or return the defaults if it doesn't exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validate(&self, path: &Path) -> ConfigResult<()> {
        let invalid = |reason: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if !(self.cube.size > 0.0) {
            return Err(invalid("cube.size must be positive"));
        }
        if self.gestures.long_press_min_duration < 0.0 {
            return Err(invalid("gestures.long_press_min_duration must not be negative"));
        }
        if !(self.gestures.swipe_min_distance > self.gestures.tap_max_movement) {
            return Err(invalid(
                "gestures.swipe_min_distance must exceed gestures.tap_max_movement",
            ));
        }
        if !(self.camera.distance > 0.0) {
            return Err(invalid("camera.distance must be positive"));
        }
        for surface in &self.tracking.surfaces {
            if surface.extent[0] <= 0.0 || surface.extent[1] <= 0.0 {
                return Err(invalid("tracking.surfaces extent must be positive"));
            }
        }
        Ok(())
    }
}
