use bevy::prelude::*;
use rapier3d::prelude as rapier;
use rapier::nalgebra::Vector3;

pub struct PhysicsPlugin {
    pub gravity: f32,
}

impl Default for PhysicsPlugin {
    fn default() -> Self {
        Self { gravity: -1.62 }
    }
}

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PhysicsState::with_gravity(self.gravity))
            .add_systems(Update, (step_physics, sync_transforms).chain().in_set(PhysicsSet));
    }
}

/// Systems that step the simulation and copy body poses to transforms.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhysicsSet;

/// Parameters for a dynamic cuboid body.
#[derive(Clone, Copy, Debug)]
pub struct CuboidBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub half_extent: f32,
    pub mass: f32,
    pub damping: f32,
    /// Collision membership bits
    pub category_bits: u32,
}

#[derive(Resource)]
pub struct PhysicsState {
    pub gravity: Vector3<f32>,
    pub integration_parameters: rapier::IntegrationParameters,
    pub physics_pipeline: rapier::PhysicsPipeline,
    pub island_manager: rapier::IslandManager,
    pub broad_phase: rapier::DefaultBroadPhase,
    pub narrow_phase: rapier::NarrowPhase,
    pub rigid_body_set: rapier::RigidBodySet,
    pub collider_set: rapier::ColliderSet,
    pub impulse_joint_set: rapier::ImpulseJointSet,
    pub multibody_joint_set: rapier::MultibodyJointSet,
    pub ccd_solver: rapier::CCDSolver,
}

impl PhysicsState {
    pub fn new() -> Self {
        Self::with_gravity(-9.81)
    }

    pub fn with_gravity(gravity: f32) -> Self {
        Self {
            gravity: Vector3::new(0.0, gravity, 0.0),
            integration_parameters: rapier::IntegrationParameters::default(),
            physics_pipeline: rapier::PhysicsPipeline::new(),
            island_manager: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            rigid_body_set: rapier::RigidBodySet::new(),
            collider_set: rapier::ColliderSet::new(),
            impulse_joint_set: rapier::ImpulseJointSet::new(),
            multibody_joint_set: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
        }
    }

    /// Insert a fixed, unbounded floor: everything below `height` is solid.
    pub fn insert_floor(&mut self, height: f32) -> rapier::RigidBodyHandle {
        let body = rapier::RigidBodyBuilder::fixed().translation(Vector3::new(0.0, height, 0.0));
        let handle = self.rigid_body_set.insert(body);
        let collider = rapier::ColliderBuilder::halfspace(Vector3::y_axis());
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Insert a dynamic cuboid.
    pub fn insert_cuboid(&mut self, params: CuboidBody) -> rapier::RigidBodyHandle {
        let (axis, angle) = params.rotation.to_axis_angle();
        let scaled_axis = axis * angle;

        let body = rapier::RigidBodyBuilder::dynamic()
            .translation(Vector3::new(
                params.position.x,
                params.position.y,
                params.position.z,
            ))
            .rotation(Vector3::new(scaled_axis.x, scaled_axis.y, scaled_axis.z))
            .linear_damping(params.damping)
            .angular_damping(params.damping);
        let handle = self.rigid_body_set.insert(body);

        let h = params.half_extent;
        let collider = rapier::ColliderBuilder::cuboid(h, h, h)
            .mass(params.mass)
            .collision_groups(rapier::InteractionGroups::new(
                rapier::Group::from_bits_truncate(params.category_bits),
                rapier::Group::ALL,
            ));
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Advance the simulation by one integration step.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    pub fn translation(&self, handle: rapier::RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    pub fn rotation(&self, handle: rapier::RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set.get(handle).map(|body| {
            let rot = body.rotation();
            Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w)
        })
    }

    pub fn dynamic_body_count(&self) -> usize {
        self.rigid_body_set
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .count()
    }
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Links a Bevy entity to a Rapier rigid body
#[derive(Component)]
pub struct RigidBodyLink(pub rapier::RigidBodyHandle);

fn step_physics(mut physics: ResMut<PhysicsState>) {
    physics.step();
}

fn sync_transforms(physics: Res<PhysicsState>, mut query: Query<(&RigidBodyLink, &mut Transform)>) {
    for (link, mut transform) in query.iter_mut() {
        if let Some(body) = physics.rigid_body_set.get(link.0) {
            let pos = body.translation();
            let rot = body.rotation();
            transform.translation = Vec3::new(pos.x, pos.y, pos.z);
            transform.rotation = Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_at(position: Vec3) -> CuboidBody {
        CuboidBody {
            position,
            rotation: Quat::IDENTITY,
            half_extent: 0.01,
            mass: 2.0,
            damping: 0.5,
            category_bits: 1 << 1,
        }
    }

    #[test]
    fn test_body_counts() {
        let mut physics = PhysicsState::with_gravity(-1.62);
        physics.insert_floor(0.0);
        assert_eq!(physics.dynamic_body_count(), 0);

        physics.insert_cuboid(cube_at(Vec3::new(0.0, 0.1, 0.0)));
        physics.insert_cuboid(cube_at(Vec3::new(0.1, 0.1, 0.0)));
        assert_eq!(physics.dynamic_body_count(), 2);
        assert_eq!(physics.rigid_body_set.len(), 3);
    }

    #[test]
    fn test_cube_falls_and_rests_on_floor() {
        let mut physics = PhysicsState::with_gravity(-1.62);
        physics.insert_floor(0.0);
        let handle = physics.insert_cuboid(cube_at(Vec3::new(0.0, 0.1, 0.0)));

        for _ in 0..240 {
            physics.step();
        }

        let pos = physics.translation(handle).unwrap();
        assert!(pos.y < 0.1, "cube should have fallen, y = {}", pos.y);
        assert!(pos.y > -0.005, "cube should rest on the floor, y = {}", pos.y);
    }

    #[test]
    fn test_floor_is_unbounded() {
        let mut physics = PhysicsState::with_gravity(-1.62);
        physics.insert_floor(0.0);
        let near = physics.insert_cuboid(cube_at(Vec3::new(60.0, 0.1, 0.0)));
        let far = physics.insert_cuboid(cube_at(Vec3::new(-500.0, 0.1, 2000.0)));

        for _ in 0..240 {
            physics.step();
        }

        for handle in [near, far] {
            let pos = physics.translation(handle).unwrap();
            assert!(pos.y > -0.005 && pos.y < 0.1, "cube should rest on the floor, y = {}", pos.y);
        }
    }

    #[test]
    fn test_rotation_reported_for_body() {
        let mut physics = PhysicsState::with_gravity(-1.62);
        let turned = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let handle = physics.insert_cuboid(CuboidBody {
            rotation: turned,
            ..cube_at(Vec3::new(0.0, 1.0, 0.0))
        });
        let rotation = physics.rotation(handle).unwrap();
        assert!(rotation.angle_between(turned) < 1e-4);
    }

    #[test]
    fn test_mass_applied_to_body() {
        let mut physics = PhysicsState::with_gravity(-1.62);
        let handle = physics.insert_cuboid(cube_at(Vec3::ZERO));
        physics.step();
        let mass = physics.rigid_body_set.get(handle).unwrap().mass();
        assert!((mass - 2.0).abs() < 1e-3);
    }
}
