//! Bevy side of the scene controller.
//!
//! Turns [`GestureMessage`]s into world rays, runs the gesture handlers from
//! `ar_core` against the [`SceneState`] resource, then mirrors the results into
//! entities and physics bodies.

use ar_core::gesture::recognize_gestures;
use ar_core::{
    handle_gesture, ArSession, CubeId, DemoConfig, DeviceCamera, GestureMessage, GestureOutcome,
    LightSource, PlaneSurface, SceneRng, SceneState,
};
use ar_physics::PhysicsSet;
use bevy::prelude::*;

pub mod animation;
pub mod debug_panel;
pub mod plane_visual;
pub mod spawn;

pub use animation::{animate_cubes, sync_cube_positions, CubeSpin};
pub use debug_panel::DebugPanelPlugin;
pub use plane_visual::PlaneAnchorVisual;
pub use spawn::{
    setup_scene, spawn_cube_entities, CubeAssets, CubeEntity, DefaultLighting, LightSourceNode,
    PlaneSurfaceNode,
};

/// Sent after the controller appends a cube to the scene state.
#[derive(Message, Clone, Copy, Debug)]
pub struct CubeSpawned(pub CubeId);

pub struct SceneControllerPlugin {
    pub config: DemoConfig,
}

impl Plugin for SceneControllerPlugin {
    fn build(&self, app: &mut App) {
        let floor_height = self
            .config
            .tracking
            .surfaces
            .first()
            .map(|surface| surface.center[1])
            .unwrap_or(0.0);

        app.add_message::<CubeSpawned>()
            .insert_resource(SceneState::new(
                PlaneSurface::new(floor_height),
                LightSource::default(),
                self.config.cube.clone(),
            ))
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (
                    (handle_gestures, spawn_cube_entities)
                        .chain()
                        .after(recognize_gestures)
                        .before(PhysicsSet),
                    animate_cubes,
                    sync_cube_positions.after(PhysicsSet),
                    spawn::follow_light_estimate,
                    plane_visual::visualize_plane_anchors,
                ),
            );
    }
}

/// Runs each recognized gesture through the handlers.
pub fn handle_gestures(
    mut gestures: MessageReader<GestureMessage>,
    cameras: Query<(&Camera, &GlobalTransform), With<DeviceCamera>>,
    session: Res<ArSession>,
    mut scene: ResMut<SceneState>,
    mut rng: ResMut<SceneRng>,
    mut spawned: MessageWriter<CubeSpawned>,
) {
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    for GestureMessage(gesture) in gestures.read() {
        let ray = match camera.viewport_to_world(camera_transform, gesture.position) {
            Ok(ray) => ray,
            Err(err) => {
                warn!(
                    "Dropping {:?} at {}: no world ray ({:?})",
                    gesture.kind, gesture.position, err
                );
                continue;
            }
        };

        match handle_gesture(&mut *scene, &*session, gesture.kind, ray, &mut rng.0) {
            GestureOutcome::CubeSpawned { cube, position } => {
                info!("Spawned cube {} at {}", cube.0, position);
                spawned.write(CubeSpawned(cube));
            }
            GestureOutcome::StateToggled { cube, state } => {
                info!("Cube {} is now {:?}", cube.0, state);
            }
            GestureOutcome::SpeedChanged {
                cube,
                rotation_speed,
            } => {
                info!("Cube {} rotation speed {:.1}", cube.0, rotation_speed);
            }
            GestureOutcome::Ignored(reason) => {
                debug!("Ignored {:?}: {:?}", gesture.kind, reason);
            }
        }
    }
}
