//! Simulated world tracking.
//!
//! Stands in for a device AR session. The environment is a list of horizontal
//! surfaces; each one is reported as a [`PlaneAnchor`] once tracking has run
//! for its detection delay. Hit-tests only see planes that have been detected.
//!
//! Tracking state goes `NotAvailable` before [`ArSession::run`], then
//! `Limited(Initializing)` until the first plane is found, then `Normal`.

use bevy::math::primitives::InfinitePlane3d;
use bevy::prelude::*;

use crate::config::{SurfaceConfig, TrackingConfig};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaneDetection {
    #[default]
    None,
    Horizontal,
}

/// World tracking with light estimation and horizontal plane detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTrackingConfiguration {
    pub light_estimation_enabled: bool,
    pub plane_detection: PlaneDetection,
}

impl WorldTrackingConfiguration {
    pub fn new() -> Self {
        Self {
            light_estimation_enabled: true,
            plane_detection: PlaneDetection::Horizontal,
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self {
            light_estimation_enabled: config.light_estimation,
            plane_detection: if config.horizontal_plane_detection {
                PlaneDetection::Horizontal
            } else {
                PlaneDetection::None
            },
        }
    }
}

impl Default for WorldTrackingConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u32);

/// A detected horizontal plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneAnchor {
    pub id: AnchorId,
    pub center: Vec3,
    /// Width (x) and depth (z)
    pub extent: Vec2,
}

impl PlaneAnchor {
    fn contains(&self, point: Vec3) -> bool {
        let local = point - self.center;
        local.x.abs() <= self.extent.x / 2.0 && local.z.abs() <= self.extent.y / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTestType {
    /// Detected planes treated as infinite
    ExistingPlane,
    /// Detected planes limited to their extent
    ExistingPlaneUsingExtent,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneHit {
    pub anchor: AnchorId,
    pub distance: f32,
    pub world_transform: Mat4,
}

impl PlaneHit {
    pub fn translation(&self) -> Vec3 {
        self.world_transform.w_axis.truncate()
    }
}

/// Anything that can hit-test detected planes.
pub trait PlaneHitTester {
    /// Hits along `ray`, nearest first.
    fn hit_test(&self, ray: Ray3d, types: HitTestType) -> Vec<PlaneHit>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitedReason {
    Initializing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingState {
    NotAvailable,
    Limited(LimitedReason),
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightEstimate {
    /// Lumens; 1000 is a well-lit neutral scene
    pub ambient_intensity: f32,
    /// Kelvin
    pub ambient_color_temperature: f32,
}

/// Simulated AR session.
#[derive(Resource, Debug)]
pub struct ArSession {
    configuration: Option<WorldTrackingConfiguration>,
    surfaces: Vec<SurfaceConfig>,
    detected: Vec<bool>,
    anchors: Vec<PlaneAnchor>,
    elapsed: f32,
    estimate: LightEstimate,
}

impl ArSession {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            configuration: None,
            surfaces: config.surfaces.clone(),
            detected: vec![false; config.surfaces.len()],
            anchors: Vec::new(),
            elapsed: 0.0,
            estimate: LightEstimate {
                ambient_intensity: config.ambient_intensity,
                ambient_color_temperature: config.ambient_color_temperature,
            },
        }
    }

    /// Start (or restart) tracking. Previously detected anchors are dropped.
    pub fn run(&mut self, configuration: WorldTrackingConfiguration) {
        self.configuration = Some(configuration);
        self.detected.iter_mut().for_each(|d| *d = false);
        self.anchors.clear();
        self.elapsed = 0.0;
    }

    pub fn configuration(&self) -> Option<&WorldTrackingConfiguration> {
        self.configuration.as_ref()
    }

    /// Advance tracking by `dt` seconds and return newly detected anchors.
    pub fn update(&mut self, dt: f32) -> Vec<PlaneAnchor> {
        let Some(configuration) = self.configuration else {
            return Vec::new();
        };
        self.elapsed += dt;

        if configuration.plane_detection != PlaneDetection::Horizontal {
            return Vec::new();
        }

        let mut added = Vec::new();
        for (index, surface) in self.surfaces.iter().enumerate() {
            if self.detected[index] || self.elapsed < surface.detection_delay_secs {
                continue;
            }
            self.detected[index] = true;
            let anchor = PlaneAnchor {
                id: AnchorId(self.anchors.len() as u32),
                center: Vec3::from_array(surface.center),
                extent: Vec2::from_array(surface.extent),
            };
            self.anchors.push(anchor);
            added.push(anchor);
        }
        added
    }

    pub fn anchors(&self) -> &[PlaneAnchor] {
        &self.anchors
    }

    pub fn tracking_state(&self) -> TrackingState {
        match (&self.configuration, self.anchors.is_empty()) {
            (None, _) => TrackingState::NotAvailable,
            (Some(_), true) => TrackingState::Limited(LimitedReason::Initializing),
            (Some(_), false) => TrackingState::Normal,
        }
    }

    /// Current light estimate, if light estimation is enabled.
    pub fn light_estimate(&self) -> Option<LightEstimate> {
        self.configuration
            .filter(|c| c.light_estimation_enabled)
            .map(|_| self.estimate)
    }
}

impl PlaneHitTester for ArSession {
    fn hit_test(&self, ray: Ray3d, types: HitTestType) -> Vec<PlaneHit> {
        let mut hits: Vec<PlaneHit> = self
            .anchors
            .iter()
            .filter_map(|anchor| {
                let distance =
                    ray.intersect_plane(anchor.center, InfinitePlane3d::new(Vec3::Y))?;
                let point = ray.get_point(distance);
                if types == HitTestType::ExistingPlaneUsingExtent && !anchor.contains(point) {
                    return None;
                }
                Some(PlaneHit {
                    anchor: anchor.id,
                    distance,
                    world_transform: Mat4::from_translation(point),
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Sent when the session detects a new plane.
#[derive(Message, Clone, Copy, Debug)]
pub struct PlaneAnchorAdded(pub PlaneAnchor);

/// Advances the session every frame.
fn update_session(
    time: Res<Time>,
    mut session: ResMut<ArSession>,
    mut added: MessageWriter<PlaneAnchorAdded>,
) {
    for anchor in session.update(time.delta_secs()) {
        info!(
            "Plane anchor {:?} detected at {} ({} x {})",
            anchor.id, anchor.center, anchor.extent.x, anchor.extent.y
        );
        added.write(PlaneAnchorAdded(anchor));
    }
}

/// Plugin that runs the simulated session.
#[derive(Default)]
pub struct ArSessionPlugin {
    pub config: TrackingConfig,
}

impl Plugin for ArSessionPlugin {
    fn build(&self, app: &mut App) {
        let mut session = ArSession::new(&self.config);
        session.run(WorldTrackingConfiguration::from_config(&self.config));

        app.add_message::<PlaneAnchorAdded>()
            .insert_resource(session)
            .add_systems(PreUpdate, update_session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_session(config: &TrackingConfig) -> ArSession {
        let mut session = ArSession::new(config);
        session.run(WorldTrackingConfiguration::from_config(config));
        session
    }

    fn ray_from_above(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 1.0, z), Dir3::NEG_Y)
    }

    #[test]
    fn test_configuration_enables_tracking_features() {
        let config = WorldTrackingConfiguration::new();
        assert!(config.light_estimation_enabled);
        assert_eq!(config.plane_detection, PlaneDetection::Horizontal);
    }

    #[test]
    fn test_plane_detected_after_delay() {
        let mut session = running_session(&TrackingConfig::default());
        assert_eq!(
            session.tracking_state(),
            TrackingState::Limited(LimitedReason::Initializing)
        );
        assert!(session.update(0.5).is_empty());

        let added = session.update(0.6);
        assert_eq!(added.len(), 1);
        assert_eq!(session.tracking_state(), TrackingState::Normal);

        // Reported once only
        assert!(session.update(1.0).is_empty());
        assert_eq!(session.anchors().len(), 1);
    }

    #[test]
    fn test_no_detection_when_disabled() {
        let config = TrackingConfig {
            horizontal_plane_detection: false,
            ..Default::default()
        };
        let mut session = running_session(&config);
        assert!(session.update(10.0).is_empty());
        assert!(session.anchors().is_empty());
    }

    #[test]
    fn test_not_running_reports_nothing() {
        let mut session = ArSession::new(&TrackingConfig::default());
        assert_eq!(session.tracking_state(), TrackingState::NotAvailable);
        assert!(session.update(10.0).is_empty());
        assert!(session.light_estimate().is_none());
    }

    #[test]
    fn test_hit_test_requires_detected_plane() {
        let mut session = running_session(&TrackingConfig::default());
        let ray = ray_from_above(0.1, 0.2);
        assert!(session.hit_test(ray, HitTestType::ExistingPlane).is_empty());

        session.update(2.0);
        let hits = session.hit_test(ray, HitTestType::ExistingPlane);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].translation().abs_diff_eq(Vec3::new(0.1, 0.0, 0.2), 1e-5));
    }

    #[test]
    fn test_existing_plane_is_infinite_but_extent_is_not() {
        let mut session = running_session(&TrackingConfig::default());
        session.update(2.0);
        // Default surface is 1 x 1 around the origin
        let outside = ray_from_above(3.0, 0.0);
        assert_eq!(session.hit_test(outside, HitTestType::ExistingPlane).len(), 1);
        assert!(session
            .hit_test(outside, HitTestType::ExistingPlaneUsingExtent)
            .is_empty());
    }

    #[test]
    fn test_hits_sorted_nearest_first() {
        let config = TrackingConfig {
            surfaces: vec![
                SurfaceConfig {
                    center: [0.0, 0.0, 0.0],
                    ..Default::default()
                },
                SurfaceConfig {
                    center: [0.0, 0.5, 0.0],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut session = running_session(&config);
        assert_eq!(session.update(2.0).len(), 2);

        let hits = session.hit_test(ray_from_above(0.0, 0.0), HitTestType::ExistingPlane);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].anchor, AnchorId(1));
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn test_light_estimate_follows_configuration() {
        let session = running_session(&TrackingConfig::default());
        let estimate = session.light_estimate().unwrap();
        assert_eq!(estimate.ambient_intensity, 1000.0);

        let config = TrackingConfig {
            light_estimation: false,
            ..Default::default()
        };
        assert!(running_session(&config).light_estimate().is_none());
    }

    #[test]
    fn test_run_resets_anchors() {
        let mut session = running_session(&TrackingConfig::default());
        session.update(2.0);
        session.run(WorldTrackingConfiguration::new());
        assert!(session.anchors().is_empty());
        assert_eq!(session.update(2.0).len(), 1);
    }
}
