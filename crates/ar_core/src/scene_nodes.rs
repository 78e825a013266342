//! The static nodes created once at startup: the invisible floor and the light.

use bevy::math::primitives::InfinitePlane3d;
use bevy::prelude::*;

/// How the floor is drawn: it occludes cubes that sink below it but shows nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorMaterial {
    pub constant_lighting: bool,
    pub writes_to_depth: bool,
    pub writes_color: bool,
    pub double_sided: bool,
}

impl Default for FloorMaterial {
    fn default() -> Self {
        Self {
            constant_lighting: true,
            writes_to_depth: true,
            writes_color: false,
            double_sided: true,
        }
    }
}

/// Infinite horizontal floor used for physics collision and node hit-tests.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneSurface {
    pub height: f32,
    pub material: FloorMaterial,
}

impl PlaneSurface {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            material: FloorMaterial::default(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, self.height, 0.0)
    }

    /// Distance along `ray` to the floor, if the ray reaches it.
    pub fn intersect(&self, ray: Ray3d) -> Option<f32> {
        ray.intersect_plane(self.position(), InfinitePlane3d::new(Vec3::Y))
    }
}

impl Default for PlaneSurface {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Omni,
}

/// The scene's light.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    pub kind: LightKind,
    pub intensity: f32,
    /// Color temperature in kelvin; 0 leaves the light color untouched.
    pub temperature: f32,
    pub position: Vec3,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            kind: LightKind::Omni,
            intensity: 100.0,
            temperature: 0.0,
            position: Vec3::new(0.0, 5.0, 5.0),
        }
    }
}
