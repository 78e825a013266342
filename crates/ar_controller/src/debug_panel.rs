use ar_core::gesture::recognize_gestures;
use ar_core::{ArSession, PointerCapture, SceneState};
use bevy::prelude::*;
use bevy_mod_imgui::prelude::*;

/// Imgui window showing tracking and cube state.
pub struct DebugPanelPlugin;

impl Plugin for DebugPanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(bevy_mod_imgui::ImguiPlugin::default())
            .add_systems(Update, debug_panel_ui.before(recognize_gestures));
    }
}

fn debug_panel_ui(
    mut context: NonSendMut<ImguiContext>,
    session: Res<ArSession>,
    scene: Res<SceneState>,
    mut capture: ResMut<PointerCapture>,
) {
    let ui = context.ui();

    ui.window("AR Session")
        .size([320.0, 240.0], Condition::FirstUseEver)
        .build(|| {
            ui.text(format!("Tracking: {:?}", session.tracking_state()));
            ui.text(format!("Planes: {}", session.anchors().len()));
            match session.light_estimate() {
                Some(estimate) => ui.text(format!(
                    "Light: {:.0} lm, {:.0} K",
                    estimate.ambient_intensity, estimate.ambient_color_temperature
                )),
                None => ui.text("Light: estimation off"),
            }
            ui.separator();

            ui.text(format!("Cubes: {}", scene.cube_count()));
            for cube in scene.cubes() {
                ui.text(format!(
                    "#{} {:?} speed {:.1}",
                    cube.id.0,
                    cube.state(),
                    cube.rotation_speed()
                ));
            }
        });

    // Clicks on the panel shouldn't start gestures
    capture.0 = ui.io().want_capture_mouse;
}
