//! Random source for cube appearance.
//!
//! Cube construction takes any `rand::Rng`; the app keeps one [`SceneRng`]
//! resource so a fixed seed reproduces the same sequence of cubes.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seedable RNG shared by every system that creates cubes.
#[derive(Resource)]
pub struct SceneRng(pub StdRng);

impl SceneRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Seeded when `seed` is given, otherwise from entropy.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl Default for SceneRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
