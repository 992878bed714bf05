//! Control uniforms for the simulation step.
//!
//! The transition program is a pure function of the previous state pixel and
//! the values in [`ControlUniforms`]. Every knob is a named, statically typed
//! field supplied by the caller each frame; the shader reads nothing else.
//!
//! # Example
//!
//! ```ignore
//! let controls = ControlUniforms {
//!     time,
//!     delta: delta * 10.0,
//!     offset: attractor_point,
//!     ..ControlUniforms::default()
//! };
//! simulator.advance(&mut encoder, &controls);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Maximum particle life in simulation units. Life counts down from a random
/// value in `[0, MAX_LIFE)` and the particle reseeds when it hits zero.
pub const MAX_LIFE: f32 = 100.0;

/// Per-frame simulation parameters.
///
/// `running` never reaches the GPU: when it is false the simulator skips the
/// step entirely and the state surfaces stay frozen (see [`crate::Simulator`]).
#[derive(Debug, Clone, Copy)]
pub struct ControlUniforms {
    /// Elapsed time in seconds.
    pub time: f32,
    /// Time advanced this step, in simulation units.
    pub delta: f32,
    /// Attractor point particles are pulled toward. Interpreted in the space
    /// defined by `orientation`.
    pub offset: Vec3,
    /// Overall advection speed multiplier.
    pub speed: f32,
    /// Strength of the radial spring toward the orbit shell.
    pub factor: f32,
    /// Frequency of the per-particle wobble term.
    pub evolution: f32,
    /// Radius of the orbit shell around the attractor.
    pub radius: f32,
    /// Scale applied to the reseed shell radius.
    pub gen_scale: f32,
    /// Transform applied to `offset` before use, for hosts that supply the
    /// attractor in view space. Identity when `offset` is already world space.
    pub orientation: Mat4,
    /// When false, `Simulator::advance` leaves the state untouched.
    pub running: bool,
}

impl Default for ControlUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            delta: 0.0,
            offset: Vec3::ZERO,
            speed: 0.5,
            factor: 0.5,
            evolution: 0.5,
            radius: 2.0,
            gen_scale: 1.0,
            orientation: Mat4::IDENTITY,
            running: true,
        }
    }
}

impl ControlUniforms {
    /// GPU representation of this frame's parameters.
    pub(crate) fn to_gpu(self) -> ControlUniformsGpu {
        ControlUniformsGpu {
            orientation: self.orientation.to_cols_array_2d(),
            offset: self.offset.to_array(),
            time: self.time,
            delta: self.delta,
            speed: self.speed,
            factor: self.factor,
            evolution: self.evolution,
            radius: self.radius,
            gen_scale: self.gen_scale,
            _padding: [0.0; 2],
        }
    }
}

/// Matches `SimUniforms` in `transition.wgsl` field for field.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct ControlUniformsGpu {
    pub orientation: [[f32; 4]; 4],
    pub offset: [f32; 3],
    pub time: f32,
    pub delta: f32,
    pub speed: f32,
    pub factor: f32,
    pub evolution: f32,
    pub radius: f32,
    pub gen_scale: f32,
    pub _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_layout_size() {
        // mat4x4 (64) + vec3/time (16) + four scalars (16) + tail (16).
        assert_eq!(std::mem::size_of::<ControlUniformsGpu>(), 112);
        assert_eq!(std::mem::size_of::<ControlUniformsGpu>() % 16, 0);
    }

    #[test]
    fn test_to_gpu_carries_fields() {
        let controls = ControlUniforms {
            time: 3.0,
            delta: 0.25,
            offset: Vec3::new(1.0, 2.0, 3.0),
            speed: 0.7,
            factor: 0.4,
            evolution: 0.9,
            radius: 1.5,
            gen_scale: 2.0,
            orientation: Mat4::IDENTITY,
            running: false,
        };

        let gpu = controls.to_gpu();
        assert_eq!(gpu.time, 3.0);
        assert_eq!(gpu.delta, 0.25);
        assert_eq!(gpu.offset, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.speed, 0.7);
        assert_eq!(gpu.factor, 0.4);
        assert_eq!(gpu.evolution, 0.9);
        assert_eq!(gpu.radius, 1.5);
        assert_eq!(gpu.gen_scale, 2.0);
    }

    #[test]
    fn test_defaults_match_reference_values() {
        let controls = ControlUniforms::default();
        assert_eq!(controls.speed, 0.5);
        assert_eq!(controls.factor, 0.5);
        assert_eq!(controls.evolution, 0.5);
        assert_eq!(controls.radius, 2.0);
        assert_eq!(controls.gen_scale, 1.0);
        assert!(controls.running);
    }
}
