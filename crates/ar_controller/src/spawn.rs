//! Startup scene and cube entity spawning.

use ar_core::{
    device_camera, ArSession, BlendMode, CubeAppearance, CubeId, DemoConfig, DeviceCamera,
    FloorMaterial, LightSource, SceneState, CUBE_CATEGORY_BITS,
};
use ar_physics::{CuboidBody, PhysicsState, RigidBodyLink};
use bevy::prelude::*;

use crate::animation::CubeSpin;
use crate::CubeSpawned;

/// Neutral light estimate intensity.
const NOMINAL_AMBIENT_INTENSITY: f32 = 1000.0;
/// Illuminance of the default light under a neutral estimate.
const DEFAULT_ILLUMINANCE: f32 = 10_000.0;
/// Scene light intensity units to lumens.
const LUMENS_PER_INTENSITY: f32 = 1000.0;
/// Side length of the visible floor quad.
const FLOOR_QUAD_SIZE: f32 = 100.0;

/// Physics-driven root of a cube. The mesh is a child carrying [`CubeSpin`].
#[derive(Component)]
pub struct CubeEntity(pub CubeId);

#[derive(Component)]
pub struct PlaneSurfaceNode;

#[derive(Component)]
pub struct LightSourceNode;

/// Directional light that follows the session's light estimate.
#[derive(Component)]
pub struct DefaultLighting {
    pub base_illuminance: f32,
}

/// Mesh shared by every cube.
#[derive(Resource)]
pub struct CubeAssets {
    pub mesh: Handle<Mesh>,
}

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut physics: ResMut<PhysicsState>,
    scene: Res<SceneState>,
    config: Res<DemoConfig>,
) {
    let plane = scene.plane();

    commands.spawn(device_camera(DeviceCamera::from_config(
        &config.camera,
        plane.position(),
    )));

    // Invisible floor
    physics.insert_floor(plane.height);
    commands.spawn((
        PlaneSurfaceNode,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(FLOOR_QUAD_SIZE, FLOOR_QUAD_SIZE))),
        MeshMaterial3d(materials.add(floor_material(&plane.material))),
        Transform::from_translation(plane.position()),
    ));

    let light = scene.light();
    commands.spawn((
        LightSourceNode,
        PointLight {
            intensity: light.intensity * LUMENS_PER_INTENSITY,
            color: light_color(light),
            range: 50.0,
            ..default()
        },
        Transform::from_translation(light.position),
    ));

    commands.spawn((
        DefaultLighting {
            base_illuminance: DEFAULT_ILLUMINANCE,
        },
        DirectionalLight {
            illuminance: DEFAULT_ILLUMINANCE,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.8, 0.4, 0.0)),
    ));

    let size = scene.cube_config().size;
    commands.insert_resource(CubeAssets {
        mesh: meshes.add(Cuboid::new(size, size, size)),
    });

    info!(
        "Scene ready: floor at y = {}, light at {}",
        plane.height, light.position
    );
}

/// Creates the entity and physics body for each newly spawned cube.
pub fn spawn_cube_entities(
    mut commands: Commands,
    mut spawned: MessageReader<CubeSpawned>,
    scene: Res<SceneState>,
    assets: Option<Res<CubeAssets>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut physics: ResMut<PhysicsState>,
) {
    let Some(assets) = assets else {
        return;
    };

    for CubeSpawned(id) in spawned.read() {
        let Some(cube) = scene.cube(*id) else {
            warn!("Cube {} missing from scene state", id.0);
            continue;
        };

        let rotation = cube.rotation;
        let body = physics.insert_cuboid(CuboidBody {
            position: cube.position,
            rotation,
            half_extent: cube.size / 2.0,
            mass: cube.mass(),
            damping: cube.damping(),
            category_bits: CUBE_CATEGORY_BITS,
        });
        let material = materials.add(cube_material(&cube.appearance));

        commands
            .spawn((
                CubeEntity(*id),
                RigidBodyLink(body),
                Transform::from_translation(cube.position).with_rotation(rotation),
                Visibility::default(),
            ))
            .with_children(|parent| {
                parent.spawn((
                    CubeSpin(*id),
                    Mesh3d(assets.mesh.clone()),
                    MeshMaterial3d(material),
                    Transform::default(),
                ));
            });
    }
}

/// Scales the default light with the session's light estimate.
pub fn follow_light_estimate(
    session: Res<ArSession>,
    mut lights: Query<(&DefaultLighting, &mut DirectionalLight)>,
) {
    let Some(estimate) = session.light_estimate() else {
        return;
    };
    let scale = estimate.ambient_intensity / NOMINAL_AMBIENT_INTENSITY;
    for (default_lighting, mut light) in lights.iter_mut() {
        light.illuminance = default_lighting.base_illuminance * scale;
    }
}

pub fn cube_material(appearance: &CubeAppearance) -> StandardMaterial {
    StandardMaterial {
        base_color: appearance.color,
        alpha_mode: match appearance.blend_mode {
            BlendMode::Alpha => AlphaMode::Blend,
            BlendMode::Screen => AlphaMode::Add,
        },
        ..default()
    }
}

pub fn floor_material(floor: &FloorMaterial) -> StandardMaterial {
    let mut material = StandardMaterial {
        base_color: if floor.writes_color {
            Color::WHITE
        } else {
            Color::NONE
        },
        alpha_mode: if floor.writes_color {
            AlphaMode::Opaque
        } else {
            AlphaMode::Blend
        },
        unlit: floor.constant_lighting,
        double_sided: floor.double_sided,
        ..default()
    };
    if floor.double_sided {
        material.cull_mode = None;
    }
    material
}

/// A temperature of 0 leaves the light white.
fn light_color(light: &LightSource) -> Color {
    if light.temperature <= 0.0 {
        Color::WHITE
    } else {
        kelvin_to_color(light.temperature)
    }
}

/// Approximate blackbody color for a temperature in kelvin.
fn kelvin_to_color(kelvin: f32) -> Color {
    let t = (kelvin / 100.0).clamp(10.0, 400.0);
    let red = if t <= 66.0 {
        1.0
    } else {
        (329.698_73 * (t - 60.0).powf(-0.133_204_76) / 255.0).clamp(0.0, 1.0)
    };
    let green = if t <= 66.0 {
        ((99.470_8 * t.ln() - 161.119_57) / 255.0).clamp(0.0, 1.0)
    } else {
        (288.122_16 * (t - 60.0).powf(-0.075_514_85) / 255.0).clamp(0.0, 1.0)
    };
    let blue = if t >= 66.0 {
        1.0
    } else if t <= 19.0 {
        0.0
    } else {
        ((138.517_73 * (t - 10.0).ln() - 305.044_8) / 255.0).clamp(0.0, 1.0)
    };
    Color::srgb(red, green, blue)
}
