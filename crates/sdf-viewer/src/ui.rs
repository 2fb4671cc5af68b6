//! egui overlays: the statistics HUD and the parameter panel.

use sdf_sync::{
    params::{ParamHandle, Parameters},
    shader::GateState,
};

/// The panel's own copy of the parameters. Edits are sent through the
/// handle and reach the scene on its next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub ray_marching: bool,
    pub ball_count: usize,
    pub dot_size: f32,
    pub smooth_value: f32,
}

impl From<&Parameters> for PanelState {
    fn from(p: &Parameters) -> Self {
        Self {
            ray_marching: p.background_visible,
            ball_count: p.active_count,
            dot_size: p.dot_size,
            smooth_value: p.smooth_value,
        }
    }
}

impl PanelState {
    /// Sends every field that differs from `previous`.
    pub fn send_changes(&self, previous: &PanelState, handle: &ParamHandle) {
        if self.ray_marching != previous.ray_marching {
            handle.set_background_visible(self.ray_marching);
        }
        if self.ball_count != previous.ball_count {
            handle.set_active_count(self.ball_count);
        }
        if self.dot_size != previous.dot_size {
            handle.set_dot_size(self.dot_size);
        }
        if self.smooth_value != previous.smooth_value {
            handle.set_smooth_value(self.smooth_value);
        }
    }
}

pub fn draw_panel(ctx: &egui::Context, state: &mut PanelState, handle: &ParamHandle) {
    let before = state.clone();

    egui::Window::new("Parameters")
        .default_width(310.0)
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.checkbox(&mut state.ray_marching, "ray marching");
            ui.add(
                egui::Slider::new(&mut state.ball_count, 1..=handle.max_active())
                    .step_by(1.0)
                    .text("ball count"),
            );
            ui.add(
                egui::Slider::new(&mut state.dot_size, 0.0..=1.0)
                    .step_by(0.01)
                    .text("dot size"),
            );
            ui.add(
                egui::Slider::new(&mut state.smooth_value, 0.0..=1.0)
                    .step_by(0.01)
                    .text("smooth value"),
            );
        });

    state.send_changes(&before, handle);
}

/// HUD line for the background. A gate that released its sources but has
/// no pipeline to show for it means the device rejected the programs.
pub fn background_status(shader: GateState, pipeline_built: bool) -> String {
    match shader {
        GateState::Built if pipeline_built => "background ready".to_string(),
        GateState::Built => "background pipeline rejected".to_string(),
        GateState::Failed(stage) => format!("{stage} program failed"),
        GateState::AwaitingOne(stage) => format!("waiting for {stage} program"),
        GateState::AwaitingBoth | GateState::Idle => "loading programs".to_string(),
    }
}

pub fn draw_hud(
    ctx: &egui::Context,
    fps: f32,
    frame_ms: f32,
    shader: GateState,
    pipeline_built: bool,
) {
    egui::Area::new(egui::Id::new("stats_hud"))
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(format!("{:.0} FPS", fps));
                ui.label(format!("{:.1} ms", frame_ms));
                ui.small(background_status(shader, pipeline_built));
            });
        });
}
