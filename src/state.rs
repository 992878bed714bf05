//! Texture-encoded particle state with ping-pong double buffering.
//!
//! [`StateBuffer`] owns exactly two `Rgba32Float` surfaces of identical size.
//! One pixel encodes one particle (`rgb = position`, `a = life`), so a
//! `width x height` buffer holds `width * height` particles. Each simulation
//! step reads the active surface and writes the other, then the roles swap.
//!
//! The read/write split is expressed in the types: a step can only obtain its
//! target through [`StateBuffer::begin_step`], which hands back an
//! [`ActiveView`] and a [`WriteTarget`] that are guaranteed to refer to
//! different surfaces. There is no way to bind the surface being read as the
//! render target of the same pass.
//!
//! Surfaces are immutable in dimensions once allocated. Changing the grid size
//! goes through [`StateBuffer::resize`], which drops both surfaces and reseeds
//! from scratch; simulation history does not survive a resize.

use crate::error::StateError;
use crate::seed::{self, ParticleState};

/// Pixel format of the state surfaces. Render-attachable and exact under
/// `textureLoad`, which keeps step results bit-reproducible.
pub(crate) const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Pure active-index bookkeeping behind the double buffer.
///
/// Kept free of GPU resources so the ping-pong invariant is testable on its
/// own: the read and write roles always differ, and `swap` alternates the
/// active index on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PingPong {
    active: usize,
}

impl PingPong {
    pub(crate) fn new() -> Self {
        Self { active: 0 }
    }

    /// Index of the surface holding the most recently computed state.
    pub(crate) fn read_index(&self) -> usize {
        self.active
    }

    /// Index of the surface the next step writes into.
    pub(crate) fn write_index(&self) -> usize {
        1 - self.active
    }

    pub(crate) fn swap(&mut self) {
        self.active = 1 - self.active;
    }
}

struct StateSurface {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl StateSurface {
    fn new(device: &wgpu::Device, width: u32, height: u32, index: usize) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("Particle State Surface {}", index)),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    fn upload(&self, queue: &wgpu::Queue, width: u32, height: u32, data: &[f32]) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(data),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 16),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Read-only view of the surface holding the latest computed state.
pub struct ActiveView<'a> {
    view: &'a wgpu::TextureView,
    index: usize,
}

impl ActiveView<'_> {
    pub fn view(&self) -> &wgpu::TextureView {
        self.view
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

/// Render target for the step in progress. Always the surface the active view
/// does not refer to.
pub struct WriteTarget<'a> {
    view: &'a wgpu::TextureView,
    index: usize,
}

impl WriteTarget<'_> {
    pub fn view(&self) -> &wgpu::TextureView {
        self.view
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

/// Double-buffered GPU store of per-particle state.
pub struct StateBuffer {
    surfaces: [StateSurface; 2],
    roles: PingPong,
    width: u32,
    height: u32,
    disposed: bool,
}

impl StateBuffer {
    /// Allocate both surfaces and upload the initial distribution produced by
    /// `seed_fn` into each of them, so `previous_view` matches `current_view`
    /// until the first step has run.
    ///
    /// Fails with [`StateError::InvalidDimensions`] if either side is zero.
    pub fn new<F>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        seed_fn: &mut F,
    ) -> Result<Self, StateError>
    where
        F: FnMut(u32) -> ParticleState,
    {
        if width == 0 || height == 0 {
            return Err(StateError::InvalidDimensions { width, height });
        }

        let data = seed::encode_grid(width, height, seed_fn);
        let surfaces = [
            StateSurface::new(device, width, height, 0),
            StateSurface::new(device, width, height, 1),
        ];
        for surface in &surfaces {
            surface.upload(queue, width, height, &data);
        }

        Ok(Self {
            surfaces,
            roles: PingPong::new(),
            width,
            height,
            disposed: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn particle_count(&self) -> u32 {
        self.width * self.height
    }

    /// Which surface currently holds the latest state. Stable between steps;
    /// flips on every [`StateBuffer::swap`].
    pub fn active_index(&self) -> usize {
        self.roles.read_index()
    }

    /// The surface holding the most recently computed state.
    pub fn current_view(&self) -> &wgpu::TextureView {
        &self.surfaces[self.roles.read_index()].view
    }

    /// The surface holding the state from one step earlier. Before any step
    /// has run this carries the same seed data as `current_view`.
    pub fn previous_view(&self) -> &wgpu::TextureView {
        &self.surfaces[self.roles.write_index()].view
    }

    /// Hand out the read source and write target for one simulation step.
    ///
    /// The pair is derived from a single role index, so the two handles can
    /// never alias the same surface.
    pub fn begin_step(&self) -> (ActiveView<'_>, WriteTarget<'_>) {
        let read = self.roles.read_index();
        let write = self.roles.write_index();
        debug_assert_ne!(read, write, "state step would read and write the same surface");

        (
            ActiveView {
                view: &self.surfaces[read].view,
                index: read,
            },
            WriteTarget {
                view: &self.surfaces[write].view,
                index: write,
            },
        )
    }

    /// Promote the surface written by the step just finished to active.
    /// Callable only after the write into the inactive surface has been
    /// encoded; the simulator owns that ordering.
    pub fn swap(&mut self) {
        self.roles.swap();
    }

    /// Drop both surfaces and reseed at the new dimensions. Resets the active
    /// index and all simulation history; this is a full reconstruction, not an
    /// incremental resize.
    pub fn resize<F>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        seed_fn: &mut F,
    ) -> Result<(), StateError>
    where
        F: FnMut(u32) -> ParticleState,
    {
        let rebuilt = StateBuffer::new(device, queue, width, height, seed_fn)?;
        self.dispose();
        *self = rebuilt;
        Ok(())
    }

    /// Release both surfaces. Idempotent; repeated calls are no-ops. View
    /// handles obtained earlier must be dropped before teardown.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for surface in &self.surfaces {
            surface.texture.destroy();
        }
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for StateBuffer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_never_alias() {
        let mut roles = PingPong::new();
        for _ in 0..8 {
            assert_ne!(roles.read_index(), roles.write_index());
            roles.swap();
        }
    }

    #[test]
    fn test_swap_alternates_active_index() {
        // The ping-pong invariant from the step contract: the active index
        // after step N differs from the active index after step N-1.
        let mut roles = PingPong::new();
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(roles.read_index());
            roles.swap();
        }
        for pair in seen.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_two_steps_return_to_initial_surface() {
        let mut roles = PingPong::new();
        assert_eq!(roles.read_index(), 0);
        roles.swap();
        assert_eq!(roles.read_index(), 1);
        roles.swap();
        assert_eq!(roles.read_index(), 0);
    }

    #[test]
    fn test_write_index_is_previous_read_index_after_swap() {
        let mut roles = PingPong::new();
        let written = roles.write_index();
        roles.swap();
        // The surface just written is now the one handed out for reading.
        assert_eq!(roles.read_index(), written);
    }
}
