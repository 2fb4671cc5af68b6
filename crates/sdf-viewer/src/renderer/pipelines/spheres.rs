// Instanced spheres for the visible balls.

use glam::Vec3;
use sdf_sync::{animator::Ball, camera::OrbitCamera, MAX_BALLS};
use wgpu::util::DeviceExt;

/// Colours are sRGB hex; the shader works in linear space.
const BASE_COLOR: u32 = 0x049ef4;
const AMBIENT: u32 = 0x404040;
const LIGHT_COLOR: u32 = 0xffff00;
const LIGHT_POSITION: Vec3 = Vec3::new(20.0, 10.0, 15.0);
const LIGHT_INTENSITY: f32 = 500.0;

/// Converts a `0xRRGGBB` sRGB colour to linear RGBA with alpha 1.
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), 1.0]
}

const WIDTH_SEGMENTS: u32 = 32;
const HEIGHT_SEGMENTS: u32 = 16;

/// Per-instance data. Must match the instance inputs in `spheres.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereInstance {
    pub position: [f32; 3],
    pub scale: f32,
}

impl From<&Ball> for SphereInstance {
    fn from(ball: &Ball) -> Self {
        Self {
            position: ball.position.to_array(),
            scale: ball.scale,
        }
    }
}

/// Must match `SphereUniforms` in `spheres.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereUniforms {
    pub view_proj: [[f32; 4]; 4], // 64 B
    /// xyz = light position, w = intensity.
    pub light: [f32; 4], // +16 -> 80
    pub light_color: [f32; 4], // +16 -> 96
    pub ambient: [f32; 4], // +16 -> 112
    pub base_color: [f32; 4], // +16 -> 128
}

const _: [(); 128] = [(); core::mem::size_of::<SphereUniforms>()];

/// Unit UV sphere: positions (which double as normals) and triangle indices.
pub fn uv_sphere(width_segments: u32, height_segments: u32) -> (Vec<[f32; 3]>, Vec<u32>) {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let (sin_t, cos_t) = (v * std::f32::consts::PI).sin_cos();
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let (sin_p, cos_p) = (u * std::f32::consts::TAU).sin_cos();
            vertices.push([-cos_p * sin_t, cos_t, sin_p * sin_t]);
        }
    }

    let mut indices = Vec::with_capacity((w * h * 6) as usize);
    let row = w + 1;
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // The poles collapse one triangle of each quad.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    (vertices, indices)
}

pub struct SpherePipeline {
    pipeline:       wgpu::RenderPipeline,
    bind_group:     wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    mesh_vb:        wgpu::Buffer,
    mesh_ib:        wgpu::Buffer,
    index_count:    u32,
    /// Room for every slot; only the visible prefix is written.
    instance_vb:    wgpu::Buffer,
    staging:        Vec<SphereInstance>,
}

impl SpherePipeline {
    pub fn new(
        device:    &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("Sphere Uniform Buffer"),
            size:               std::mem::size_of::<SphereUniforms>() as u64,
            usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sphere UBO Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SphereUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sphere Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/spheres.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/spheres.wgsl").into()),
        });

        let (vertices, indices) = uv_sphere(WIDTH_SEGMENTS, HEIGHT_SEGMENTS);
        let mesh_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Mesh VB"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let mesh_ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Mesh IB"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sphere Instance VB"),
            size: (std::mem::size_of::<SphereInstance>() * MAX_BALLS) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Vertex buffer layouts: mesh + per‑instance data
        let vbuf_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SphereInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    // Centre (vec3)
                    wgpu::VertexAttribute {
                        shader_location: 1,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // Scale (f32)
                    wgpu::VertexAttribute {
                        shader_location: 2,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32,
                    },
                ],
            },
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sphere Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            mesh_vb,
            mesh_ib,
            index_count: indices.len() as u32,
            instance_vb,
            staging: Vec::with_capacity(MAX_BALLS),
        }
    }

    /// Uploads camera and instance data for this frame. Returns the number
    /// of instances the next [`Self::draw`] will render.
    pub fn prepare<'b>(
        &mut self,
        queue:  &wgpu::Queue,
        camera: &OrbitCamera,
        balls:  impl Iterator<Item = &'b Ball>,
    ) -> u32 {
        self.staging.clear();
        self.staging.extend(balls.take(MAX_BALLS).map(SphereInstance::from));
        if self.staging.is_empty() {
            return 0;
        }

        let uniforms = SphereUniforms {
            view_proj: camera.view_proj().to_cols_array_2d(),
            light: LIGHT_POSITION.extend(LIGHT_INTENSITY).to_array(),
            light_color: srgb_hex_to_linear(LIGHT_COLOR),
            ambient: srgb_hex_to_linear(AMBIENT),
            base_color: srgb_hex_to_linear(BASE_COLOR),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        queue.write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(&self.staging));

        self.staging.len() as u32
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, instances: u32) {
        if instances == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh_vb.slice(..));
        rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
        rpass.set_index_buffer(self.mesh_ib.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_sphere_is_unit_and_indices_in_range() {
        let (vertices, indices) = uv_sphere(WIDTH_SEGMENTS, HEIGHT_SEGMENTS);
        assert_eq!(vertices.len(), 33 * 17);
        // Two triangles per quad, minus one per quad on each pole row.
        assert_eq!(indices.len(), (32 * 16 * 2 - 32 * 2) * 3);

        for v in &vertices {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn instance_mirrors_ball() {
        let animator = sdf_sync::animator::EntityAnimator::new(1, 4).unwrap();
        let ball = &animator.balls()[0];
        let inst = SphereInstance::from(ball);
        assert_eq!(inst.position, ball.position.to_array());
        assert_eq!(inst.scale, ball.scale);
    }

    #[test]
    fn hex_colours_are_linearised() {
        let base = srgb_hex_to_linear(BASE_COLOR);
        assert!((base[0] - 0.0012).abs() < 1e-4);
        assert!((base[1] - 0.3419).abs() < 1e-3);
        assert!((base[2] - 0.9047).abs() < 1e-3);
        assert_eq!(base[3], 1.0);

        let ambient = srgb_hex_to_linear(AMBIENT);
        assert!(ambient[..3].iter().all(|c| (c - 0.0513).abs() < 1e-3));

        assert_eq!(srgb_hex_to_linear(LIGHT_COLOR), [1.0, 1.0, 0.0, 1.0]);
    }
}
