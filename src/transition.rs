//! The GPU transition program advancing particle state by one step.
//!
//! One full-surface render pass: a fullscreen triangle rasterized over the
//! write target with an `Rgba32Float` color attachment, whose fragment stage
//! evaluates the transition function once per particle. The program binds the
//! read surface as a plain texture and never samples its own target.

use wgpu::util::DeviceExt;

use crate::state::{StateBuffer, ActiveView, WriteTarget, STATE_FORMAT};
use crate::uniforms::{ControlUniforms, ControlUniformsGpu};

/// WGSL source of the step shader; exposed for validation in tests.
pub const TRANSITION_SHADER: &str = include_str!("transition.wgsl");

/// Compiled step pipeline plus the per-frame uniform buffer.
///
/// Bind groups come in pairs, one per state surface, so selecting the read
/// source is an index lookup rather than a per-frame bind-group rebuild.
pub struct TransitionProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    read_bind_groups: [wgpu::BindGroup; 2],
}

impl TransitionProgram {
    pub fn new(device: &wgpu::Device, state: &StateBuffer) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Transition Shader"),
            source: wgpu::ShaderSource::Wgsl(TRANSITION_SHADER.into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transition Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
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
            label: Some("Transition Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Transition Pipeline"),
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
                    format: STATE_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transition Uniform Buffer"),
            contents: bytemuck::bytes_of(&ControlUniforms::default().to_gpu()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let read_bind_groups =
            Self::build_read_bind_groups(device, &bind_group_layout, &uniform_buffer, state);

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            read_bind_groups,
        }
    }

    fn build_read_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        state: &StateBuffer,
    ) -> [wgpu::BindGroup; 2] {
        // Bind group N reads surface N; the step picks by active index.
        // current_view/previous_view cover both surfaces regardless of which
        // one is active right now.
        let views = if state.active_index() == 0 {
            [state.current_view(), state.previous_view()]
        } else {
            [state.previous_view(), state.current_view()]
        };

        views.map(|view| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Transition Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                ],
            })
        })
    }

    /// Recreate the read bind groups after the state surfaces were rebuilt.
    pub fn rebind(&mut self, device: &wgpu::Device, state: &StateBuffer) {
        self.read_bind_groups = Self::build_read_bind_groups(
            device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            state,
        );
    }

    /// Upload this step's parameters.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, controls: &ControlUniforms) {
        let gpu: ControlUniformsGpu = controls.to_gpu();
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&gpu));
    }

    /// Encode one full-surface step that reads `source` and writes `target`.
    /// The pass covers every pixel, so every particle advances exactly once.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        source: &ActiveView<'_>,
        target: &WriteTarget<'_>,
    ) {
        debug_assert_ne!(
            source.index(),
            target.index(),
            "transition step must not read its own render target"
        );

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Transition Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view(),
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.read_bind_groups[source.index()], &[]);
        pass.draw(0..3, 0..1);
    }
}
