//! Frame-by-frame orchestration of the simulation step.
//!
//! One [`Simulator`] value owns the state buffer, the transition program, and
//! the reseed bookkeeping. There is no state reachable outside it: callers
//! hand in a [`ControlUniforms`] each frame and get back read-only views.
//!
//! Step order within `advance` is fixed: upload uniforms, obtain the
//! non-aliasing read/write pair from the state buffer, encode the full-surface
//! pass, swap. The swap happens before `advance` returns, so a renderer that
//! runs afterwards in the same frame always observes a fully written surface.
//!
//! Paused semantics: when `controls.running` is false, `advance` returns
//! without encoding anything. No identity pass runs, no swap happens, and the
//! state surfaces stay bit-identical until the flag flips back.

use crate::error::StateError;
use crate::seed;
use crate::state::StateBuffer;
use crate::transition::TransitionProgram;
use crate::uniforms::ControlUniforms;

/// Decide whether a frame performs a simulation step.
///
/// Pure so the pause/dispose contract is testable without a device: a paused
/// or disposed simulator never mutates state, however many frames elapse.
pub(crate) fn step_planned(running: bool, disposed: bool) -> bool {
    running && !disposed
}

/// Owns the double-buffered particle state and the program that advances it.
pub struct Simulator {
    state: StateBuffer,
    transition: TransitionProgram,
    rng_seed: u64,
    disposed: bool,
}

impl Simulator {
    /// Build the state buffer with the default spherical-shell seed and
    /// compile the transition pipeline. Fails fast on invalid dimensions;
    /// no partially constructed simulator is returned.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rng_seed: u64,
    ) -> Result<Self, StateError> {
        let mut seed_fn = seed::spherical_shell(rng_seed);
        let state = StateBuffer::new(device, queue, width, height, &mut seed_fn)?;
        let transition = TransitionProgram::new(device, &state);

        Ok(Self {
            state,
            transition,
            rng_seed,
            disposed: false,
        })
    }

    /// Read-only access to the state buffer (current/previous views, grid
    /// dimensions, active index).
    pub fn state(&self) -> &StateBuffer {
        &self.state
    }

    pub fn particle_count(&self) -> u32 {
        self.state.particle_count()
    }

    /// Advance the simulation by one step, or do nothing when paused or
    /// disposed. Returns whether a step was encoded.
    ///
    /// The encoded pass reads the active surface and writes the other one;
    /// the pair comes from `StateBuffer::begin_step`, so the two can never
    /// be the same surface. The swap runs after the pass is encoded, which
    /// keeps `current_view` pointing at complete data at all times.
    pub fn advance(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        controls: &ControlUniforms,
    ) -> bool {
        if !step_planned(controls.running, self.disposed) {
            return false;
        }

        self.transition.write_uniforms(queue, controls);
        {
            let (source, target) = self.state.begin_step();
            self.transition.encode(encoder, &source, &target);
        }
        self.state.swap();
        true
    }

    /// Rebuild the particle grid at new dimensions with a fresh seed. All
    /// simulation history is discarded; the transition program is rebound to
    /// the new surfaces. Viewport-only resizes must not come through here.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
    ) -> Result<(), StateError> {
        self.rng_seed = self.rng_seed.wrapping_add(1);
        let mut seed_fn = seed::spherical_shell(self.rng_seed);
        self.state.resize(device, queue, width, height, &mut seed_fn)?;
        self.transition.rebind(device, &self.state);
        Ok(())
    }

    /// Release both state surfaces. Idempotent. Subsequent `advance` calls
    /// are no-ops; view handles must already be dropped by the caller.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.state.dispose();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_frames_plan_no_step() {
        // Pause idempotence: any number of paused frames leaves state alone.
        for _ in 0..5 {
            assert!(!step_planned(false, false));
        }
    }

    #[test]
    fn test_running_frames_plan_a_step() {
        assert!(step_planned(true, false));
    }

    #[test]
    fn test_disposed_simulator_never_steps() {
        assert!(!step_planned(true, true));
        assert!(!step_planned(false, true));
    }
}
