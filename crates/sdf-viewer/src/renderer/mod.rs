//! The rendering orchestrator. Owns the GPU context, the depth target, the
//! sphere pipeline and, once its programs have loaded, the raymarch pipeline.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{raymarch::RaymarchPipeline, spheres::SpherePipeline},
    targets::Targets,
};
use sdf_sync::{camera::OrbitCamera, shader::ShaderSources, Scene};
use std::sync::Arc;
use winit::window::Window;

/// Background clear colour, visible until the raymarch pipeline exists.
const CLEAR: wgpu::Color = wgpu::Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub spheres: SpherePipeline,
    /// Absent until both program texts have arrived.
    pub raymarch: Option<RaymarchPipeline>,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, vsync: bool) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window, vsync).await?;
        let targets = Targets::new(&gfx.device, gfx.size);
        let spheres = SpherePipeline::new(&gfx.device, gfx.config.format, targets.depth_fmt);

        let egui_renderer =
            egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            targets,
            spheres,
            raymarch: None,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    /// Builds the raymarch pipeline from freshly loaded sources. Called at
    /// most once; a rejected program leaves the background off for good.
    pub fn build_raymarch(&mut self, sources: ShaderSources, scene: &Scene) {
        match RaymarchPipeline::new(
            &self.gfx.device,
            self.gfx.config.format,
            self.targets.depth_fmt,
            &sources,
            scene.uniforms(),
        ) {
            Ok(pipeline) => {
                log::info!("Raymarch pipeline built");
                self.raymarch = Some(pipeline);
            }
            Err(e) => log::error!("Failed to build raymarch pipeline: {:#}", e),
        }
    }

    pub fn render(&mut self, swap_view: &wgpu::TextureView, scene: &Scene, camera: &OrbitCamera) {
        let instances = self.spheres.prepare(
            &self.gfx.queue,
            camera,
            scene.visible_balls().map(|(_, ball)| ball),
        );

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Background first so the spheres land on top of it.
            if scene.params().background_visible {
                if let Some(raymarch) = &self.raymarch {
                    raymarch.draw(&mut pass, &self.gfx.queue, scene.uniforms());
                }
            }

            self.spheres.draw(&mut pass, instances);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
