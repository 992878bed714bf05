//! Demo host shell: window, device, camera, and the frame loop.
//!
//! Everything in this module plays the role the library treats as external:
//! it owns the winit window and event loop, requests the adapter and device,
//! orbits the camera, raycasts the pointer onto the attractor plane, and calls
//! `Simulator::advance` followed by `ParticleRenderer::draw` once per frame.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::clock::FrameClock;
use crate::color::ColorBuffer;
use crate::error::{GpuError, ShellError};
use crate::renderer::{FrameView, ParticleRenderer, DEPTH_FORMAT};
use crate::resize::ResizeManager;
use crate::simulator::Simulator;
use crate::uniforms::ControlUniforms;

const STATE_SEED: u64 = 0x5eed_0001;
const COLOR_SEED: u64 = 0x5eed_0002;

/// The transition operates in scaled time, ten simulation units per second.
const SIM_TIME_SCALE: f32 = 10.0;

pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
}

impl Camera {
    fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 8.0,
            target: Vec3::ZERO,
        }
    }

    fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(70.0_f32.to_radians(), aspect, 0.01, 100.0)
    }
}

struct Shell {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    simulator: Simulator,
    colors: ColorBuffer,
    renderer: ParticleRenderer,
    resize_manager: ResizeManager,
    clock: FrameClock,
    camera: Camera,
    controls: ControlUniforms,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    cursor_pos: Option<(f64, f64)>,
}

impl Shell {
    async fn new(window: Arc<Window>) -> Result<Self, ShellError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window).map_err(GpuError::from)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(GpuError::from)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, &config);

        let resize_manager = ResizeManager::new(config.width);
        let grid = resize_manager.grid();

        let simulator = Simulator::new(&device, &queue, grid.width, grid.height, STATE_SEED)?;
        let colors = ColorBuffer::new(&device, &queue, grid.width, grid.height, COLOR_SEED);
        let renderer = ParticleRenderer::new(&device, config.format, simulator.state(), &colors);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            simulator,
            colors,
            renderer,
            resize_manager,
            clock: FrameClock::new(),
            camera: Camera::new(),
            controls: ControlUniforms::default(),
            mouse_pressed: false,
            last_mouse_pos: None,
            cursor_pos: None,
        })
    }

    /// Viewport resize: surface and depth buffer only, unless the new width
    /// crosses the device-class breakpoint, in which case the particle grid
    /// is reconstructed as well.
    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, &self.config);

        if let Some(grid) = self.resize_manager.viewport_changed(new_size.width) {
            if let Err(e) = self
                .simulator
                .resize(&self.device, &self.queue, grid.width, grid.height)
            {
                eprintln!("Grid resize failed: {}", e);
                return;
            }
            self.colors.dispose();
            self.colors = ColorBuffer::new(
                &self.device,
                &self.queue,
                grid.width,
                grid.height,
                COLOR_SEED.wrapping_add(grid.width as u64),
            );
            self.renderer
                .rebind(&self.device, self.simulator.state(), &self.colors);
        }
    }

    fn toggle_running(&mut self) {
        self.controls.running = !self.controls.running;
        self.clock.toggle_pause();
    }

    /// Project the cursor onto the z = 0 plane to get the attractor point.
    fn attractor_from_cursor(&self) -> Option<Vec3> {
        let (cx, cy) = self.cursor_pos?;
        let ndc_x = (cx as f32 / self.config.width as f32) * 2.0 - 1.0;
        let ndc_y = 1.0 - (cy as f32 / self.config.height as f32) * 2.0;

        let aspect = self.config.width as f32 / self.config.height as f32;
        let view_proj = self.camera.projection(aspect) * self.camera.view_matrix();
        let inverse = view_proj.inverse();

        let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        let dir = far - near;
        if dir.z.abs() < 1e-6 {
            return None;
        }
        let t = -near.z / dir.z;
        if t < 0.0 {
            return None;
        }
        Some(near + dir * t)
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let (time, delta) = self.clock.update();
        self.controls.time = time;
        self.controls.delta = delta * SIM_TIME_SCALE;
        if let Some(point) = self.attractor_from_cursor() {
            self.controls.offset = point;
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Simulation step first; the swap inside `advance` completes before
        // the render pass below reads the state views.
        self.simulator
            .advance(&self.queue, &mut encoder, &self.controls);

        let aspect = self.config.width as f32 / self.config.height as f32;
        self.renderer.prepare(
            &self.queue,
            &FrameView {
                view_proj: self.camera.projection(aspect) * self.camera.view_matrix(),
                camera_pos: self.camera.position(),
                time,
            },
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.015,
                            g: 0.015,
                            b: 0.015,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer.draw(&mut pass, self.simulator.state());
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Winit application driving the demo.
pub struct App {
    window: Option<Arc<Window>>,
    shell: Option<Shell>,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            shell: None,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("polyshred")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                eprintln!("{}", ShellError::from(e));
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(Shell::new(window)) {
            Ok(shell) => self.shell = Some(shell),
            Err(e) => {
                eprintln!("{}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                // Finish teardown before the last frame's resources go away.
                if let Some(shell) = &mut self.shell {
                    shell.simulator.dispose();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(shell) = &mut self.shell {
                    shell.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(shell) = &mut self.shell {
                    shell.toggle_running();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    if let Some(shell) = &mut self.shell {
                        shell.mouse_pressed = state == ElementState::Pressed;
                        if !shell.mouse_pressed {
                            shell.last_mouse_pos = None;
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(shell) = &mut self.shell {
                    shell.cursor_pos = Some((position.x, position.y));
                    if shell.mouse_pressed {
                        if let Some((last_x, last_y)) = shell.last_mouse_pos {
                            let dx = position.x - last_x;
                            let dy = position.y - last_y;
                            shell.camera.yaw -= dx as f32 * 0.005;
                            shell.camera.pitch += dy as f32 * 0.005;
                            shell.camera.pitch = shell.camera.pitch.clamp(-1.5, 1.5);
                        }
                        shell.last_mouse_pos = Some((position.x, position.y));
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(shell) = &mut self.shell {
                    shell.camera.distance -= scroll * 0.3;
                    shell.camera.distance = shell.camera.distance.clamp(1.0, 30.0);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(shell) = &mut self.shell {
                    match shell.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            let size = winit::dpi::PhysicalSize {
                                width: shell.config.width,
                                height: shell.config.height,
                            };
                            shell.resize(size);
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
