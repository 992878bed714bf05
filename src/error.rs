//! Error types for polyshred.
//!
//! Construction-time failures (no adapter, device loss, bad dimensions) are
//! reported to the caller; no partially built object is ever returned.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when building or rebuilding particle state.
#[derive(Debug)]
pub enum StateError {
    /// Requested state grid dimensions include a zero. A zero-sized surface
    /// can never be allocated; the request is rejected outright.
    InvalidDimensions { width: u32, height: u32 },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::InvalidDimensions { width, height } => write!(
                f,
                "Invalid state grid dimensions {}x{}: both sides must be at least 1",
                width, height
            ),
        }
    }
}

impl std::error::Error for StateError {}

/// Errors that can occur when running the demo shell.
#[derive(Debug)]
pub enum ShellError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Particle state construction failed.
    State(StateError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ShellError::Window(e) => write!(f, "Failed to create window: {}", e),
            ShellError::Gpu(e) => write!(f, "GPU error: {}", e),
            ShellError::State(e) => write!(f, "State error: {}", e),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::EventLoop(e) => Some(e),
            ShellError::Window(e) => Some(e),
            ShellError::Gpu(e) => Some(e),
            ShellError::State(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ShellError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ShellError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ShellError {
    fn from(e: winit::error::OsError) -> Self {
        ShellError::Window(e)
    }
}

impl From<GpuError> for ShellError {
    fn from(e: GpuError) -> Self {
        ShellError::Gpu(e)
    }
}

impl From<StateError> for ShellError {
    fn from(e: StateError) -> Self {
        ShellError::State(e)
    }
}
