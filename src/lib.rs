//! # polyshred
//!
//! GPU particle animation with texture-encoded ping-pong simulation state.
//!
//! A fixed grid of particles lives entirely on the GPU: each particle is one
//! `Rgba32Float` pixel (`rgb` position, `a` life) in a pair of state surfaces.
//! Every frame a transition pass reads one surface and writes the other, the
//! roles swap, and the renderer draws each particle as a box oriented along
//! its motion since the previous step.
//!
//! ## Frame flow
//!
//! ```ignore
//! let (time, delta) = clock.update();
//! let controls = ControlUniforms { time, delta, offset: attractor, ..Default::default() };
//!
//! simulator.advance(&queue, &mut encoder, &controls); // step + swap
//! renderer.prepare(&queue, &frame_view);
//! renderer.draw(&mut pass, simulator.state());        // reads fresh views
//! ```
//!
//! ## Core pieces
//!
//! - [`StateBuffer`]: the double-buffered state store. Read and write
//!   surfaces for a step come as a typed pair from `begin_step`, so the same
//!   surface can never be bound as both source and target.
//! - [`Simulator`]: one owned value carrying all simulation state; drives
//!   the transition pass and the swap, skips entirely while paused.
//! - [`ParticleRenderer`]: regenerates 36 oriented vertices per particle on
//!   the GPU from the current/previous views, the static [`ColorBuffer`], and
//!   the shared [`GeometryTables`].
//! - [`ResizeManager`]: decides when a viewport change crosses the device
//!   breakpoint and the particle grid must be rebuilt from a fresh seed.
//!
//! The binary target is a thin demo host (window, orbit camera, pointer
//! attractor); the library has no windowing dependencies in its core path.

pub mod clock;
pub mod color;
pub mod error;
pub mod geometry;
pub mod renderer;
pub mod resize;
pub mod seed;
pub mod simulator;
pub mod state;
pub mod transition;
pub mod uniforms;
pub mod window;

pub use clock::FrameClock;
pub use color::{ColorBuffer, PALETTE};
pub use error::{GpuError, ShellError, StateError};
pub use geometry::{GeometryTables, BOX_NORMALS, BOX_VERTICES, VERTICES_PER_PARTICLE};
pub use glam::{Mat4, Vec3};
pub use renderer::{FrameView, ParticleRenderer};
pub use resize::{GridSize, ResizeManager};
pub use seed::{spherical_shell, ParticleState};
pub use simulator::Simulator;
pub use state::{ActiveView, StateBuffer, WriteTarget};
pub use transition::TransitionProgram;
pub use uniforms::{ControlUniforms, MAX_LIFE};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::clock::FrameClock;
    pub use crate::color::ColorBuffer;
    pub use crate::renderer::{FrameView, ParticleRenderer};
    pub use crate::resize::{GridSize, ResizeManager};
    pub use crate::seed::{spherical_shell, ParticleState};
    pub use crate::simulator::Simulator;
    pub use crate::state::StateBuffer;
    pub use crate::uniforms::ControlUniforms;
    pub use crate::{Mat4, Vec3};
}
