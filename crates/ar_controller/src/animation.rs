//! Cube rotation actions and physics position sync.

use ar_core::{CubeId, SceneState};
use ar_physics::{PhysicsState, RigidBodyLink};
use bevy::prelude::*;

use crate::spawn::CubeEntity;

/// Cube mesh child that turns with the cube's rotation action.
#[derive(Component)]
pub struct CubeSpin(pub CubeId);

/// Advances every running rotation action and applies it to the cube meshes.
pub fn animate_cubes(
    time: Res<Time>,
    mut scene: ResMut<SceneState>,
    mut spins: Query<(&CubeSpin, &mut Transform)>,
) {
    let dt = time.delta_secs_f64();
    for cube in scene.cubes_mut() {
        cube.advance(dt);
    }

    for (spin, mut transform) in spins.iter_mut() {
        if let Some(cube) = scene.cube(spin.0) {
            transform.rotation = Quat::from_rotation_y(cube.spin_angle() as f32);
        }
    }
}

/// Copies physics poses back into the scene state so hit-tests and
/// stacking see where cubes actually are.
pub fn sync_cube_positions(
    physics: Res<PhysicsState>,
    mut scene: ResMut<SceneState>,
    cubes: Query<(&CubeEntity, &RigidBodyLink)>,
) {
    for (entity, link) in cubes.iter() {
        let (Some(position), Some(rotation)) =
            (physics.translation(link.0), physics.rotation(link.0))
        else {
            continue;
        };
        if let Some(cube) = scene.cube_mut(entity.0) {
            cube.position = position;
            cube.rotation = rotation;
        }
    }
}
