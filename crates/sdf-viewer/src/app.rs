use crate::{
    camera::CameraController,
    clock::FrameClock,
    config::Config,
    renderer::Renderer,
    ui::{self, PanelState},
};
use anyhow::Result;
use glam::Vec3;
use sdf_sync::{
    bridge::Viewport,
    camera::OrbitCamera,
    params::{ParamHandle, Parameters},
    shader::{LogSink, ShaderLoader},
    Scene, MAX_BALLS,
};
use std::sync::Arc;
use winit::{event::WindowEvent, window::Window};

pub const FOV_DEG: f32 = 45.0;
pub const NEAR: f32 = 1.0;
pub const FAR: f32 = 1000.0;
pub const CAMERA_START: Vec3 = Vec3::new(10.0, 0.0, 10.0);

pub struct App {
    pub renderer: Renderer,
    pub camera: OrbitCamera,
    pub camera_controller: CameraController,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub scene: Scene,
    pub panel: PanelState,
    params: ParamHandle,
    shaders: ShaderLoader,
    clock: FrameClock,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let renderer = Renderer::new(window.clone(), !config.no_vsync).await?;

        let initial = Parameters {
            active_count: config.ball_count,
            dot_size: config.dot_size,
            smooth_value: config.smooth_value,
            ..Parameters::default()
        };
        let mut scene = Scene::new(MAX_BALLS, config.seed, FOV_DEG, initial)?;
        let params = scene.param_handle();
        let panel = PanelState::from(scene.params());

        let mut camera = OrbitCamera::looking_at(CAMERA_START, Vec3::ZERO, FOV_DEG, NEAR, FAR);
        let size = renderer.gfx.size;
        scene.resize(
            &mut camera,
            Viewport {
                width: size.width,
                height: size.height,
                scale_factor: window.scale_factor(),
            },
        );

        log::info!(
            "Loading background programs from {} and {}",
            config.vertex_path().display(),
            config.fragment_path().display()
        );
        let shaders = ShaderLoader::spawn(config.vertex_path(), config.fragment_path());

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            camera,
            camera_controller: CameraController::new(),
            egui_ctx,
            egui_state,
            scene,
            panel,
            params,
            shaders,
            clock: FrameClock::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.scene.resize(
                &mut self.camera,
                Viewport {
                    width: new_size.width,
                    height: new_size.height,
                    scale_factor,
                },
            );
        }
    }

    /// Returns `true` when the event was consumed by the UI.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size, window.scale_factor());
        }

        if response.consumed {
            return true;
        }

        self.camera_controller.handle_event(event, &mut self.camera);
        false
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let time = self.clock.tick();

        // Completed fetches land here; the pipeline is built on the tick both are in.
        let renderer = &mut self.renderer;
        let scene = &self.scene;
        self.shaders
            .poll(&mut LogSink, |sources| renderer.build_raymarch(sources, scene));

        self.scene.tick(time.elapsed_s, &self.camera);

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(&swap_view, &self.scene, &self.camera);

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        ui::draw_hud(
            &self.egui_ctx,
            self.clock.fps(),
            time.dt * 1000.0,
            self.shaders.state(),
            self.renderer.raymarch.is_some(),
        );
        ui::draw_panel(&self.egui_ctx, &mut self.panel, &self.params);

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
