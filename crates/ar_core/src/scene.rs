//! Scene state: the node table and the cube list.
//!
//! Every node in the scene gets a [`NodeId`]. The node table maps each id to
//! a [`SceneNode`], so a hit-test result is resolved to a cube by lookup
//! rather than by inspecting the node's type.

use bevy::prelude::*;
use rand::Rng;
use std::collections::BTreeMap;

use crate::config::CubeConfig;
use crate::cube::{CubeId, CubeObject};
use crate::scene_nodes::{LightSource, PlaneSurface};

/// Hit-tests ignore anything further away than this.
pub const MAX_HIT_DISTANCE: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// What a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneNode {
    PlaneSurface,
    LightSource,
    Cube(CubeId),
}

/// Nearest node along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeHit {
    pub node: NodeId,
    pub kind: SceneNode,
    pub distance: f32,
}

impl NodeHit {
    pub fn cube(&self) -> Option<CubeId> {
        match self.kind {
            SceneNode::Cube(id) => Some(id),
            _ => None,
        }
    }
}

/// Single owner of everything placed in the scene.
#[derive(Resource, Debug)]
pub struct SceneState {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_node: u32,
    cubes: Vec<CubeObject>,
    plane: PlaneSurface,
    plane_node: NodeId,
    light: LightSource,
    light_node: NodeId,
    cube_config: CubeConfig,
}

impl SceneState {
    pub fn new(plane: PlaneSurface, light: LightSource, cube_config: CubeConfig) -> Self {
        let mut scene = Self {
            nodes: BTreeMap::new(),
            next_node: 0,
            cubes: Vec::new(),
            plane,
            plane_node: NodeId(0),
            light,
            light_node: NodeId(0),
            cube_config,
        };
        scene.plane_node = scene.insert_node(SceneNode::PlaneSurface);
        scene.light_node = scene.insert_node(SceneNode::LightSource);
        scene
    }

    fn insert_node(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, node);
        id
    }

    pub fn plane(&self) -> &PlaneSurface {
        &self.plane
    }

    pub fn plane_node(&self) -> NodeId {
        self.plane_node
    }

    pub fn light(&self) -> &LightSource {
        &self.light
    }

    pub fn light_node(&self) -> NodeId {
        self.light_node
    }

    pub fn cube_config(&self) -> &CubeConfig {
        &self.cube_config
    }

    pub fn node(&self, id: NodeId) -> Option<SceneNode> {
        self.nodes.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cubes(&self) -> &[CubeObject] {
        &self.cubes
    }

    pub fn cube_count(&self) -> usize {
        self.cubes.len()
    }

    pub fn cube(&self, id: CubeId) -> Option<&CubeObject> {
        self.cubes.get(id.0)
    }

    pub fn cube_mut(&mut self, id: CubeId) -> Option<&mut CubeObject> {
        self.cubes.get_mut(id.0)
    }

    pub fn cubes_mut(&mut self) -> impl Iterator<Item = &mut CubeObject> {
        self.cubes.iter_mut()
    }

    /// Create a cube at `position` and register its node.
    pub fn spawn_cube<R: Rng + ?Sized>(&mut self, position: Vec3, rng: &mut R) -> CubeId {
        let id = CubeId(self.cubes.len());
        let node = self.insert_node(SceneNode::Cube(id));
        let cube = CubeObject::new(id, node, position, &self.cube_config, rng);
        self.cubes.push(cube);
        id
    }

    /// Bounding-box hit-test against the floor and every cube. Each cube's box
    /// is tested in its own rotated frame.
    ///
    /// Only the nearest hit is returned.
    pub fn hit_test_nodes(&self, ray: Ray3d) -> Option<NodeHit> {
        let floor = self
            .plane
            .intersect(ray)
            .filter(|t| *t <= MAX_HIT_DISTANCE)
            .map(|distance| NodeHit {
                node: self.plane_node,
                kind: SceneNode::PlaneSurface,
                distance,
            });

        let cubes = self.cubes.iter().filter_map(|cube| {
            cube.ray_intersection(ray, MAX_HIT_DISTANCE)
                .map(|distance| NodeHit {
                    node: cube.node,
                    kind: SceneNode::Cube(cube.id),
                    distance,
                })
        });

        floor
            .into_iter()
            .chain(cubes)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(
            PlaneSurface::default(),
            LightSource::default(),
            CubeConfig::default(),
        )
    }
}
