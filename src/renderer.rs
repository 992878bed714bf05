//! Oriented-particle rendering from the state surfaces.
//!
//! The renderer consumes the current and previous state views plus the static
//! color and geometry tables, and draws every particle as a box oriented along
//! its motion: the basis is a look-at transform from the current position
//! toward the previous one, the size follows a parabolic life envelope, and
//! each corner picks between the front-facing and back-facing candidate set by
//! the sign of the view/normal dot product. All geometry is regenerated on the
//! GPU per frame; the host uploads no per-vertex data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::color::ColorBuffer;
use crate::geometry::{GeometryTables, VERTICES_PER_PARTICLE};
use crate::state::StateBuffer;
use crate::uniforms::MAX_LIFE;

/// WGSL source of the particle shader; exposed for validation in tests.
pub const PARTICLE_SHADER: &str = include_str!("particles.wgsl");

/// Depth format the renderer's pipeline expects from the host's pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Matches `RenderUniforms` in `particles.wgsl` field for field.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct RenderUniformsGpu {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub time: f32,
    pub light_pos: [f32; 3],
    pub mesh_scale: f32,
    pub box_scale: [f32; 3],
    pub max_life: f32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub _padding: [f32; 2],
}

/// Per-frame camera inputs, computed by the host (camera control is outside
/// this crate).
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    pub view_proj: Mat4,
    pub camera_pos: Vec3,
    pub time: f32,
}

/// Draws the particle grid from GPU-side state.
pub struct ParticleRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    geometry: GeometryTables,
    state_bind_groups: [wgpu::BindGroup; 2],
    grid_width: u32,
    grid_height: u32,
    /// Per-axis stretch of each particle box.
    pub box_scale: Vec3,
    /// Uniform scale applied on top of the life envelope.
    pub mesh_scale: f32,
    /// World-space light position used by the fragment stage.
    pub light_pos: Vec3,
}

impl ParticleRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        state: &StateBuffer,
        colors: &ColorBuffer,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Particle Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The vertex stage flips corners to face the viewer itself.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Uniform Buffer"),
            contents: bytemuck::bytes_of(&RenderUniformsGpu::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let geometry = GeometryTables::new(device);
        let state_bind_groups = Self::build_state_bind_groups(
            device,
            &bind_group_layout,
            &uniform_buffer,
            &geometry,
            state,
            colors,
        );

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            geometry,
            state_bind_groups,
            grid_width: state.width(),
            grid_height: state.height(),
            box_scale: Vec3::ONE,
            mesh_scale: 1.0,
            light_pos: Vec3::new(10.0, 10.0, 10.0),
        }
    }

    fn build_state_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        geometry: &GeometryTables,
        state: &StateBuffer,
        colors: &ColorBuffer,
    ) -> [wgpu::BindGroup; 2] {
        // Bind group N is used when surface N is active: `map` is the current
        // view and `prev_map` the other surface. Selecting by active index
        // keeps the handles fresh across swaps without per-frame rebuilds.
        let ordered = if state.active_index() == 0 {
            [
                (state.current_view(), state.previous_view()),
                (state.previous_view(), state.current_view()),
            ]
        } else {
            [
                (state.previous_view(), state.current_view()),
                (state.current_view(), state.previous_view()),
            ]
        };

        ordered.map(|(current, previous)| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Particle Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(current),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(previous),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(colors.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: geometry.buffer().as_entire_binding(),
                    },
                ],
            })
        })
    }

    /// Rebind after a particle-grid resize reconstructed the state surfaces
    /// and the color buffer. Viewport-only resizes never need this.
    pub fn rebind(&mut self, device: &wgpu::Device, state: &StateBuffer, colors: &ColorBuffer) {
        self.grid_width = state.width();
        self.grid_height = state.height();
        self.state_bind_groups = Self::build_state_bind_groups(
            device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            &self.geometry,
            state,
            colors,
        );
    }

    /// Upload this frame's camera and style uniforms.
    pub fn prepare(&self, queue: &wgpu::Queue, frame: &FrameView) {
        let uniforms = RenderUniformsGpu {
            view_proj: frame.view_proj.to_cols_array_2d(),
            camera_pos: frame.camera_pos.to_array(),
            time: frame.time,
            light_pos: self.light_pos.to_array(),
            mesh_scale: self.mesh_scale,
            box_scale: self.box_scale.to_array(),
            max_life: MAX_LIFE,
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            _padding: [0.0; 2],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the particle draw into the host's render pass. Reads the state
    /// views fresh through the active index, so handles captured before an
    /// earlier swap can never leak in.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, state: &StateBuffer) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.state_bind_groups[state.active_index()], &[]);
        pass.draw(0..VERTICES_PER_PARTICLE, 0..state.particle_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_particle_shader_validates() {
        validate_wgsl(PARTICLE_SHADER).expect("particle WGSL should be valid");
    }

    #[test]
    fn test_render_uniforms_layout_size() {
        // mat4x4 (64) + four 16-byte rows.
        assert_eq!(std::mem::size_of::<RenderUniformsGpu>(), 128);
        assert_eq!(std::mem::size_of::<RenderUniformsGpu>() % 16, 0);
    }

    #[test]
    fn test_mirrored_corner_indices_stay_in_bounds() {
        // The backface swap in the vertex shader remaps corner vi to the
        // opposite face; every remapped index must stay inside the table.
        for vi in 0..VERTICES_PER_PARTICLE {
            let face = vi / 6;
            let mirrored = (face ^ 1) * 6 + (vi % 6);
            assert!(mirrored < VERTICES_PER_PARTICLE);
        }
    }

    #[test]
    fn test_mirrored_face_shading_normal_faces_the_viewer() {
        // CPU mirror of the vertex-stage backface swap: the emitted corners
        // of a swapped face belong to the opposite face, so shading must use
        // the negated normal. That normal has to point toward the camera for
        // every face that triggered the swap.
        let camera = Vec3::new(0.0, 0.0, 8.0);
        let position = Vec3::ZERO;
        let scale = 0.025;

        for face in 0..6usize {
            let n = Vec3::from(crate::geometry::BOX_NORMALS[face]);
            let face_point = position + n * scale;
            let view = (face_point - camera).normalize();
            let facing = view.dot(n);
            let shading = if facing >= 0.0 { -n } else { n };
            assert!(
                view.dot(shading) < 0.0,
                "face {} shaded with a normal pointing away from the viewer",
                face
            );
        }
    }

    /// CPU mirror of `look_at_basis` in `particles.wgsl`.
    fn look_at_basis(origin: Vec3, target: Vec3) -> glam::Mat3 {
        let d = target - origin;
        if d.length_squared() < 1e-12 {
            return glam::Mat3::IDENTITY;
        }
        let ww = d.normalize();
        let mut up = Vec3::Y;
        if ww.y.abs() > 0.999 {
            up = Vec3::X;
        }
        let uu = ww.cross(up).normalize();
        let vv = uu.cross(ww);
        glam::Mat3::from_cols(uu, vv, ww)
    }

    fn assert_orthonormal(basis: glam::Mat3) {
        for col in [basis.x_axis, basis.y_axis, basis.z_axis] {
            assert!(col.is_finite());
            assert!((col.length() - 1.0).abs() < 1e-5);
        }
        assert!(basis.x_axis.dot(basis.y_axis).abs() < 1e-5);
        assert!(basis.y_axis.dot(basis.z_axis).abs() < 1e-5);
        assert!(basis.x_axis.dot(basis.z_axis).abs() < 1e-5);
    }

    #[test]
    fn test_stationary_particle_uses_identity_basis() {
        // A particle that has not moved since the previous step gets the
        // identity orientation, not NaN from normalizing a zero direction.
        let p = Vec3::new(0.3, -1.2, 4.0);
        assert_eq!(look_at_basis(p, p), glam::Mat3::IDENTITY);
    }

    #[test]
    fn test_moving_particle_basis_is_orthonormal() {
        let basis = look_at_basis(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-0.5, 0.25, 2.0));
        assert_orthonormal(basis);
        // Third column tracks the motion direction.
        let dir = (Vec3::new(-0.5, 0.25, 2.0) - Vec3::new(1.0, 2.0, 3.0)).normalize();
        assert!((basis.z_axis - dir).length() < 1e-5);
    }

    #[test]
    fn test_vertical_motion_switches_up_vector() {
        // Straight-up motion is parallel to the default up vector; the basis
        // must fall back to the X axis and stay orthonormal.
        let basis = look_at_basis(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));
        assert_orthonormal(basis);
    }
}
