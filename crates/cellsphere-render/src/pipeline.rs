//! Instanced cell pipeline: draws the sphere once per instance payload.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Uniform buffer for the cell pass: camera transform plus a light direction.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4], // 64 bytes, mat4x4
    pub light_dir: [f32; 4],      // xyz direction towards the light, w unused
}

static_assertions::assert_eq_size!(CameraUniform, [f32; 20]);

impl CameraUniform {
    /// Build from a view-projection matrix and a direction towards the light.
    pub fn new(view_proj: Mat4, light_dir: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: light_dir.normalize_or_zero().extend(0.0).to_array(),
        }
    }

    /// Reverse-Z perspective camera at `eye` looking at `target`, lit from the eye.
    pub fn looking_at(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_infinite_reverse_rh(60f32.to_radians(), aspect, 0.1);
        Self::new(proj * view, eye - target)
    }
}

/// Render pipeline for instanced cell spheres.
pub struct CellPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
}

impl CellPipeline {
    /// Create the pipeline.
    ///
    /// `buffer_layouts` must describe slot 0 (per-vertex) and slot 1
    /// (per-instance), normally taken from the mesh's
    /// [`VertexArray`](crate::VertexArray) or
    /// [`sphere_buffer_layouts`](cellsphere_mesh::sphere_buffer_layouts).
    pub fn new(
        device: &wgpu::Device,
        buffer_layouts: &[wgpu::VertexBufferLayout<'_>],
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cell-shader"),
            source: wgpu::ShaderSource::Wgsl(CELL_SHADER_SOURCE.into()),
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("cell-camera-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<CameraUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cell-camera-uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cell-camera-bind-group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cell-pipeline-layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            immediate_size: 0,
        });

        let depth_stencil = depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::GreaterEqual, // reverse-Z
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cell-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: buffer_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // Sphere triangles are clockwise on screen under a right-handed camera.
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None, // opaque
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            camera_bind_group_layout,
            camera_bind_group,
            camera_buffer,
        }
    }

    /// Upload a new camera uniform.
    pub fn write_camera(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    /// Set the pipeline and camera bind group on a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
    }
}

/// The WGSL source for the cell shader.
///
/// Vertex inputs follow the fixed locations of
/// [`cellsphere_mesh::vertex_format`]: 0 position, 1 normal, 2 instance
/// payload (`xyz` center, `w` scale).
pub const CELL_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    light_dir: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) instance: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = in.position * in.instance.w + in.instance.xyz;
    out.clip_position = camera.view_proj * vec4<f32>(world, 1.0);
    out.normal = in.normal;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let diffuse = max(dot(n, camera.light_dir.xyz), 0.0);
    let base = vec3<f32>(0.35, 0.75, 0.45);
    return vec4<f32>(base * (0.25 + 0.75 * diffuse), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use cellsphere_mesh::sphere_buffer_layouts;

    #[test]
    fn test_camera_uniform_size() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
    }

    #[test]
    fn test_camera_light_dir_is_normalized() {
        let camera = CameraUniform::looking_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, 1.0);
        let light = Vec3::from_slice(&camera.light_dir[..3]);
        assert!((light.length() - 1.0).abs() < 1e-6);
        assert_eq!(camera.light_dir[3], 0.0);
    }

    #[test]
    fn test_reverse_z_maps_near_geometry_to_higher_depth() {
        let camera = CameraUniform::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0);
        let view_proj = Mat4::from_cols_array_2d(&camera.view_proj);
        let near = view_proj.project_point3(Vec3::new(0.0, 0.0, 1.0));
        let far = view_proj.project_point3(Vec3::new(0.0, 0.0, -1.0));
        assert!(near.z > far.z);
    }

    #[test]
    fn test_shader_declares_fixed_locations() {
        assert!(CELL_SHADER_SOURCE.contains("@location(0) position: vec3<f32>"));
        assert!(CELL_SHADER_SOURCE.contains("@location(1) normal: vec3<f32>"));
        assert!(CELL_SHADER_SOURCE.contains("@location(2) instance: vec4<f32>"));
    }

    #[test]
    fn test_pipeline_creation() {
        let Some((device, queue)) = create_test_device_queue() else {
            return; // graceful skip when no GPU
        };
        let pipeline = CellPipeline::new(
            &device,
            &sphere_buffer_layouts(),
            wgpu::TextureFormat::Rgba8Unorm,
            Some(wgpu::TextureFormat::Depth32Float),
        );
        pipeline.write_camera(
            &queue,
            &CameraUniform::looking_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, 1.0),
        );
        assert_eq!(pipeline.camera_buffer.size(), 80);
    }
}
