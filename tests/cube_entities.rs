//! Headless app: spawned cubes get physics bodies and the scene state follows them.

use ar_controller::{
    spawn_cube_entities, sync_cube_positions, CubeAssets, CubeEntity, CubeSpawned,
};
use ar_core::{CubeConfig, CubeId, LightSource, PlaneSurface, SceneState};
use ar_physics::{PhysicsPlugin, PhysicsSet, PhysicsState, RigidBodyLink};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DROP_HEIGHT: f32 = 0.5;

fn build_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(PhysicsPlugin { gravity: -1.62 })
        .add_message::<CubeSpawned>()
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .insert_resource(SceneState::new(
            PlaneSurface::new(0.0),
            LightSource::default(),
            CubeConfig::default(),
        ))
        .add_systems(
            Update,
            (
                spawn_cube_entities.before(PhysicsSet),
                sync_cube_positions.after(PhysicsSet),
            ),
        );

    let mesh = app
        .world_mut()
        .resource_mut::<Assets<Mesh>>()
        .add(Cuboid::new(0.02, 0.02, 0.02));
    app.insert_resource(CubeAssets { mesh });
    app.world_mut().resource_mut::<PhysicsState>().insert_floor(0.0);
    app
}

fn drop_cube(app: &mut App, x: f32) -> CubeId {
    let mut rng = StdRng::seed_from_u64(17);
    let id = app
        .world_mut()
        .resource_mut::<SceneState>()
        .spawn_cube(Vec3::new(x, DROP_HEIGHT, 0.0), &mut rng);
    app.world_mut().write_message(CubeSpawned(id));
    id
}

fn cube_pose(app: &App, id: CubeId) -> (Vec3, Quat) {
    let scene = app.world().resource::<SceneState>();
    let cube = scene.cube(id).unwrap();
    (cube.position, cube.rotation)
}

#[test]
fn spawned_cube_gets_linked_body() {
    let mut app = build_app();
    let id = drop_cube(&mut app, 0.0);
    app.update();

    let mut query = app.world_mut().query::<(&CubeEntity, &RigidBodyLink)>();
    let linked: Vec<CubeId> = query.iter(app.world()).map(|(cube, _)| cube.0).collect();
    assert_eq!(linked, vec![id]);
    assert_eq!(app.world().resource::<PhysicsState>().dynamic_body_count(), 1);
}

#[test]
fn scene_state_follows_falling_cube() {
    let mut app = build_app();
    let id = drop_cube(&mut app, 0.0);

    for _ in 0..30 {
        app.update();
    }
    let (falling, _) = cube_pose(&app, id);
    assert!(falling.y < DROP_HEIGHT, "scene position should fall, y = {}", falling.y);

    for _ in 0..600 {
        app.update();
    }
    let (resting, rotation) = cube_pose(&app, id);
    assert!(resting.y > 0.0 && resting.y < 0.05, "cube should rest on the floor, y = {}", resting.y);

    let mut query = app.world_mut().query::<(&CubeEntity, &RigidBodyLink)>();
    let (_, link) = query.single(app.world()).unwrap();
    let body_rotation = app.world().resource::<PhysicsState>().rotation(link.0).unwrap();
    assert!(rotation.angle_between(body_rotation) < 1e-4);
}

#[test]
fn cube_far_from_origin_still_lands() {
    let mut app = build_app();
    let id = drop_cube(&mut app, 60.0);

    for _ in 0..600 {
        app.update();
    }
    let (resting, _) = cube_pose(&app, id);
    assert!(resting.y > 0.0, "cube fell through the floor, y = {}", resting.y);
}
