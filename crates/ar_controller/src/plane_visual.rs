//! Translucent overlay for each detected plane anchor.

use ar_core::{AnchorId, PlaneAnchorAdded};
use bevy::prelude::*;

/// Lift above the anchor so the overlay doesn't z-fight the floor.
const OVERLAY_OFFSET: f32 = 0.001;

#[derive(Component)]
pub struct PlaneAnchorVisual(pub AnchorId);

pub fn visualize_plane_anchors(
    mut commands: Commands,
    mut added: MessageReader<PlaneAnchorAdded>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for PlaneAnchorAdded(anchor) in added.read() {
        let mesh = meshes.add(Plane3d::default().mesh().size(anchor.extent.x, anchor.extent.y));
        let material = materials.add(StandardMaterial {
            base_color: Color::srgba(0.2, 0.6, 1.0, 0.25),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        });

        commands.spawn((
            PlaneAnchorVisual(anchor.id),
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(anchor.center + Vec3::Y * OVERLAY_OFFSET),
        ));
    }
}
