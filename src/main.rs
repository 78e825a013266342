use ar_controller::{DebugPanelPlugin, SceneControllerPlugin};
use ar_core::{ConfigError, CorePlugin, DemoConfig, DEFAULT_CONFIG_FILE};
use ar_physics::PhysicsPlugin;
use bevy::prelude::*;

fn main() {
    // Config path is the first argument, or ar_demo.json in the working directory
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let (config, load) = load_config(path);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "AR Cubes".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(CorePlugin {
            config: config.clone(),
        })
        .add_plugins(PhysicsPlugin {
            gravity: config.physics.gravity,
        })
        .add_plugins(SceneControllerPlugin {
            config: config.clone(),
        })
        .add_plugins(DebugPanelPlugin)
        // Stand-in for the camera feed
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)))
        .insert_resource(load)
        .add_systems(Startup, report_config_load)
        .run();
}

/// Outcome of reading the config file, reported once logging is up.
#[derive(Resource)]
struct ConfigLoad {
    path: String,
    error: Option<ConfigError>,
}

/// A file that fails to load falls back to defaults; the error is kept for logging.
fn load_config(path: String) -> (DemoConfig, ConfigLoad) {
    match DemoConfig::load_or_default(&path) {
        Ok(config) => (config, ConfigLoad { path, error: None }),
        Err(err) => (
            DemoConfig::default(),
            ConfigLoad {
                path,
                error: Some(err),
            },
        ),
    }
}

fn report_config_load(load: Res<ConfigLoad>) {
    match &load.error {
        Some(err) => warn!("Failed to load {}: {}. Using defaults.", load.path, err),
        None => debug!("Using config {}", load.path),
    }
}
