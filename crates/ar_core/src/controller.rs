//! Gesture handlers.
//!
//! Each handler takes the scene state, the world ray under the gesture, the
//! plane hit-tester, and returns what happened. Handlers never fail: a gesture
//! that hits nothing useful comes back as [`GestureOutcome::Ignored`].

use bevy::prelude::*;
use rand::Rng;

use crate::cube::{CubeId, MotionState};
use crate::gesture::{GestureKind, LongPressSettings, SwipeDirection};
use crate::scene::SceneState;
use crate::tracking::{HitTestType, PlaneHitTester};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Neither a node nor a detected plane was under the gesture
    NoHit,
    /// Something was hit, but it wasn't a cube
    NotACube,
    /// Long press configured too short to be intentional
    DegenerateLongPress,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    CubeSpawned { cube: CubeId, position: Vec3 },
    StateToggled { cube: CubeId, state: MotionState },
    SpeedChanged { cube: CubeId, rotation_speed: f64 },
    Ignored(IgnoreReason),
}

/// Dispatch a gesture to its handler.
pub fn handle_gesture<P, R>(
    scene: &mut SceneState,
    planes: &P,
    kind: GestureKind,
    ray: Ray3d,
    rng: &mut R,
) -> GestureOutcome
where
    P: PlaneHitTester + ?Sized,
    R: Rng + ?Sized,
{
    match kind {
        GestureKind::Tap => handle_tap(scene, planes, ray, rng),
        GestureKind::LongPress(settings) => handle_long_press(scene, settings, ray),
        GestureKind::Swipe(direction) => handle_swipe(scene, direction, ray),
    }
}

/// Tap on a cube stacks a new cube just above it; tap on a detected plane
/// drops a cube at the hit point.
pub fn handle_tap<P, R>(scene: &mut SceneState, planes: &P, ray: Ray3d, rng: &mut R) -> GestureOutcome
where
    P: PlaneHitTester + ?Sized,
    R: Rng + ?Sized,
{
    let tapped_cube = scene
        .hit_test_nodes(ray)
        .and_then(|hit| hit.cube())
        .and_then(|id| scene.cube(id));

    let position = match tapped_cube {
        Some(cube) => cube.position + Vec3::Y * scene.cube_config().stack_offset,
        None => match planes.hit_test(ray, HitTestType::ExistingPlane).first() {
            Some(hit) => hit.translation(),
            None => return GestureOutcome::Ignored(IgnoreReason::NoHit),
        },
    };

    let cube = scene.spawn_cube(position, rng);
    GestureOutcome::CubeSpawned { cube, position }
}

/// Long press on a cube toggles it between stopped and moving.
pub fn handle_long_press(
    scene: &mut SceneState,
    settings: LongPressSettings,
    ray: Ray3d,
) -> GestureOutcome {
    if settings.is_degenerate() {
        return GestureOutcome::Ignored(IgnoreReason::DegenerateLongPress);
    }

    let cube = match hit_cube(scene, ray) {
        Ok(cube) => cube,
        Err(reason) => return GestureOutcome::Ignored(reason),
    };
    match scene.cube_mut(cube) {
        Some(object) => GestureOutcome::StateToggled {
            cube,
            state: object.swap_state(),
        },
        None => GestureOutcome::Ignored(IgnoreReason::NotACube),
    }
}

/// Swipe on a cube changes its rotation speed and restarts the rotation.
pub fn handle_swipe(
    scene: &mut SceneState,
    direction: SwipeDirection,
    ray: Ray3d,
) -> GestureOutcome {
    let cube = match hit_cube(scene, ray) {
        Ok(cube) => cube,
        Err(reason) => return GestureOutcome::Ignored(reason),
    };
    let step = scene.cube_config().rotation_speed_step;
    match scene.cube_mut(cube) {
        Some(object) => GestureOutcome::SpeedChanged {
            cube,
            rotation_speed: object.handle_swipe(direction, step),
        },
        None => GestureOutcome::Ignored(IgnoreReason::NotACube),
    }
}

fn hit_cube(scene: &SceneState, ray: Ray3d) -> Result<CubeId, IgnoreReason> {
    let hit = scene.hit_test_nodes(ray).ok_or(IgnoreReason::NoHit)?;
    hit.cube().ok_or(IgnoreReason::NotACube)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{AnchorId, PlaneHit};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Returns a fixed set of plane hits for every query.
    struct FixedPlanes(Vec<PlaneHit>);

    impl PlaneHitTester for FixedPlanes {
        fn hit_test(&self, _ray: Ray3d, _types: HitTestType) -> Vec<PlaneHit> {
            self.0.clone()
        }
    }

    fn plane_hit_at(point: Vec3) -> FixedPlanes {
        FixedPlanes(vec![PlaneHit {
            anchor: AnchorId(0),
            distance: 1.0,
            world_transform: Mat4::from_translation(point),
        }])
    }

    fn no_planes() -> FixedPlanes {
        FixedPlanes(Vec::new())
    }

    /// Ray that never reaches the floor or any cube.
    fn sky_ray() -> Ray3d {
        Ray3d::new(Vec3::new(0.0, 1.0, 0.0), Dir3::Y)
    }

    fn ray_down_at(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 1.0, z), Dir3::NEG_Y)
    }

    fn long_press() -> LongPressSettings {
        LongPressSettings {
            minimum_press_duration: 0.5,
            delays_touches_ended: true,
        }
    }

    fn scene_with_cube(rng: &mut StdRng, position: Vec3) -> (SceneState, CubeId) {
        let mut scene = SceneState::default();
        let id = scene.spawn_cube(position, rng);
        (scene, id)
    }

    #[test]
    fn test_tap_without_hits_is_noop() {
        let mut scene = SceneState::default();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = handle_tap(&mut scene, &no_planes(), sky_ray(), &mut rng);
        assert_eq!(outcome, GestureOutcome::Ignored(IgnoreReason::NoHit));
        assert_eq!(scene.cube_count(), 0);
    }

    #[test]
    fn test_tap_on_floor_without_detected_plane_is_noop() {
        let mut scene = SceneState::default();
        let mut rng = StdRng::seed_from_u64(2);
        let outcome = handle_tap(&mut scene, &no_planes(), ray_down_at(0.3, 0.3), &mut rng);
        assert_eq!(outcome, GestureOutcome::Ignored(IgnoreReason::NoHit));
        assert_eq!(scene.cube_count(), 0);
    }

    #[test]
    fn test_tap_on_plane_spawns_at_hit_translation() {
        let mut scene = SceneState::default();
        let mut rng = StdRng::seed_from_u64(3);
        let target = Vec3::new(0.25, 0.0, -0.1);

        let outcome = handle_tap(&mut scene, &plane_hit_at(target), sky_ray(), &mut rng);
        assert_eq!(
            outcome,
            GestureOutcome::CubeSpawned {
                cube: CubeId(0),
                position: target
            }
        );
        assert_eq!(scene.cube_count(), 1);
        assert_eq!(scene.cube(CubeId(0)).unwrap().position, target);
    }

    #[test]
    fn test_tap_on_cube_stacks_above_it() {
        let mut rng = StdRng::seed_from_u64(4);
        let base = Vec3::new(0.2, 0.01, 0.0);
        let (mut scene, _) = scene_with_cube(&mut rng, base);

        // A plane hit is available but the cube takes priority
        let planes = plane_hit_at(Vec3::new(9.0, 9.0, 9.0));
        let outcome = handle_tap(&mut scene, &planes, ray_down_at(0.2, 0.0), &mut rng);

        let expected = Vec3::new(0.2, 0.03, 0.0);
        match outcome {
            GestureOutcome::CubeSpawned { cube, position } => {
                assert_eq!(cube, CubeId(1));
                assert!(position.abs_diff_eq(expected, 1e-6));
            }
            other => panic!("expected spawn, got {:?}", other),
        }
        assert_eq!(scene.cube_count(), 2);
    }

    #[test]
    fn test_tap_on_cube_without_planes_still_stacks() {
        let mut rng = StdRng::seed_from_u64(5);
        let (mut scene, _) = scene_with_cube(&mut rng, Vec3::new(0.0, 0.01, 0.0));
        let outcome = handle_tap(&mut scene, &no_planes(), ray_down_at(0.0, 0.0), &mut rng);
        assert!(matches!(outcome, GestureOutcome::CubeSpawned { .. }));
        assert_eq!(scene.cube_count(), 2);
    }

    #[test]
    fn test_long_press_toggles_hit_cube() {
        let mut rng = StdRng::seed_from_u64(6);
        let (mut scene, id) = scene_with_cube(&mut rng, Vec3::new(0.0, 0.01, 0.0));

        let outcome = handle_long_press(&mut scene, long_press(), ray_down_at(0.0, 0.0));
        assert_eq!(
            outcome,
            GestureOutcome::StateToggled {
                cube: id,
                state: MotionState::Moving
            }
        );
        let outcome = handle_long_press(&mut scene, long_press(), ray_down_at(0.0, 0.0));
        assert_eq!(
            outcome,
            GestureOutcome::StateToggled {
                cube: id,
                state: MotionState::Stopped
            }
        );
    }

    #[test]
    fn test_degenerate_long_press_is_ignored() {
        let mut rng = StdRng::seed_from_u64(7);
        let (mut scene, id) = scene_with_cube(&mut rng, Vec3::new(0.0, 0.01, 0.0));
        let settings = LongPressSettings {
            minimum_press_duration: 0.05,
            delays_touches_ended: false,
        };

        let outcome = handle_long_press(&mut scene, settings, ray_down_at(0.0, 0.0));
        assert_eq!(
            outcome,
            GestureOutcome::Ignored(IgnoreReason::DegenerateLongPress)
        );
        assert_eq!(scene.cube(id).unwrap().state(), MotionState::Stopped);
    }

    #[test]
    fn test_long_press_on_floor_is_not_a_cube() {
        let mut rng = StdRng::seed_from_u64(8);
        let (mut scene, id) = scene_with_cube(&mut rng, Vec3::new(0.0, 0.01, 0.0));
        let outcome = handle_long_press(&mut scene, long_press(), ray_down_at(0.5, 0.5));
        assert_eq!(outcome, GestureOutcome::Ignored(IgnoreReason::NotACube));
        assert_eq!(scene.cube(id).unwrap().state(), MotionState::Stopped);
    }

    #[test]
    fn test_swipes_adjust_speed() {
        let mut rng = StdRng::seed_from_u64(9);
        let (mut scene, id) = scene_with_cube(&mut rng, Vec3::new(0.0, 0.01, 0.0));
        let ray = ray_down_at(0.0, 0.0);

        handle_swipe(&mut scene, SwipeDirection::Right, ray);
        let speed = scene.cube(id).unwrap().rotation_speed();
        assert!((speed - 1.2).abs() < 1e-9);

        for _ in 0..8 {
            handle_swipe(&mut scene, SwipeDirection::Left, ray);
        }
        let speed = scene.cube(id).unwrap().rotation_speed();
        assert!((speed - (-0.4)).abs() < 1e-9);
        assert!(scene.cube(id).unwrap().action().is_some());
    }

    #[test]
    fn test_swipe_on_nothing_is_noop() {
        let mut rng = StdRng::seed_from_u64(10);
        let (mut scene, id) = scene_with_cube(&mut rng, Vec3::new(0.0, 0.01, 0.0));
        let outcome = handle_swipe(&mut scene, SwipeDirection::Right, sky_ray());
        assert_eq!(outcome, GestureOutcome::Ignored(IgnoreReason::NoHit));
        assert_eq!(scene.cube(id).unwrap().rotation_speed(), 1.0);
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let mut rng = StdRng::seed_from_u64(11);
        let (mut scene, _) = scene_with_cube(&mut rng, Vec3::new(0.0, 0.01, 0.0));
        let ray = ray_down_at(0.0, 0.0);
        let planes = no_planes();

        let tap = handle_gesture(&mut scene, &planes, GestureKind::Tap, ray, &mut rng);
        assert!(matches!(tap, GestureOutcome::CubeSpawned { .. }));

        let press = handle_gesture(
            &mut scene,
            &planes,
            GestureKind::LongPress(long_press()),
            ray,
            &mut rng,
        );
        assert!(matches!(press, GestureOutcome::StateToggled { .. }));

        let swipe = handle_gesture(
            &mut scene,
            &planes,
            GestureKind::Swipe(SwipeDirection::Left),
            ray,
            &mut rng,
        );
        assert!(matches!(swipe, GestureOutcome::SpeedChanged { .. }));
    }
}
