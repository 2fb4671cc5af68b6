// Raymarched background: a plane covering clip space whose fragment program
// reads the scene uniforms.

use anyhow::{anyhow, Result};
use sdf_sync::{shader::ShaderSources, uniforms::SceneUniforms};
use wgpu::util::DeviceExt;

/// Unit plane (corners at ±0.5); the vertex program doubles it to cover clip space.
#[rustfmt::skip]
const PLANE_CORNERS: [[f32; 3]; 6] = [
    [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.5, 0.5, 0.0],
    [-0.5, -0.5, 0.0], [0.5, 0.5, 0.0],  [-0.5, 0.5, 0.0],
];

pub struct RaymarchPipeline {
    pipeline:       wgpu::RenderPipeline,
    bind_group:     wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    plane_vb:       wgpu::Buffer,
}

impl RaymarchPipeline {
    /// Builds the pipeline from freshly loaded program texts.
    ///
    /// Validation errors (bad WGSL, layout mismatch) are captured and
    /// returned instead of aborting the device.
    pub fn new(
        device:    &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
        sources:   &ShaderSources,
        initial:   &SceneUniforms,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        // Sized once for the full ball capacity; only its contents change.
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Scene Uniform Buffer"),
            contents: bytemuck::bytes_of(initial),
            usage:    wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some("Scene Uniform BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding:    0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty:                 wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size:   wgpu::BufferSize::new(
                        std::mem::size_of::<SceneUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Scene Uniform Bind Group"),
            layout:  &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let plane_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Raymarch Plane VB"),
            contents: bytemuck::cast_slice(&PLANE_CORNERS),
            usage:    wgpu::BufferUsages::VERTEX,
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Raymarch Vertex WGSL"),
            source: wgpu::ShaderSource::Wgsl(sources.vertex.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Raymarch Fragment WGSL"),
            source: wgpu::ShaderSource::Wgsl(sources.fragment.as_str().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Raymarch Pipeline Layout"),
            bind_group_layouts:   &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label:  Some("Raymarch Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module:      &vertex_module,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode:    wgpu::VertexStepMode::Vertex,
                    attributes:   &[wgpu::VertexAttribute {
                        shader_location: 0,
                        format:          wgpu::VertexFormat::Float32x3,
                        offset:          0,
                    }],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module:      &fragment_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format:     color_fmt,
                    blend:      None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format:              depth_fmt,
                depth_write_enabled: false, // Background never occludes the spheres
                depth_compare:       wgpu::CompareFunction::Always,
                stencil:             wgpu::StencilState::default(),
                bias:                wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview:   None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(anyhow!("raymarch pipeline rejected: {err}"));
        }

        Ok(Self {
            pipeline,
            bind_group,
            uniform_buffer,
            plane_vb,
        })
    }

    /// Uploads this frame's uniforms and draws the plane.
    pub fn draw<'a>(
        &'a self,
        rpass:    &mut wgpu::RenderPass<'a>,
        queue:    &wgpu::Queue,
        uniforms: &SceneUniforms,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.plane_vb.slice(..));
        rpass.draw(0..PLANE_CORNERS.len() as u32, 0..1);
    }
}
