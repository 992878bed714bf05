//! Static per-particle colors.
//!
//! Every particle is assigned one palette entry when the state grid is built
//! and keeps it for the lifetime of that grid. The assignment lives in an
//! `Rgba8Unorm` texture with the same dimensions as the state surfaces, so the
//! particle shader looks its color up with the same pixel coordinate it uses
//! for position. Reallocated only on grid resize, never mutated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The fixed palette particles draw from, as `0xRRGGBB`.
pub const PALETTE: [u32; 15] = [
    0xed6a5a, 0xf4f1bb, 0x9bc1bc, 0x5ca4a9, 0xe6ebe0, 0xf0b67f, 0xfe5f55, 0xd6d1b1,
    0xc7efcf, 0xeef5db, 0x50514f, 0xf25f5c, 0xffe066, 0x247ba0, 0x70c1b3,
];

fn palette_rgba(entry: u32) -> [u8; 4] {
    [
        ((entry >> 16) & 0xff) as u8,
        ((entry >> 8) & 0xff) as u8,
        (entry & 0xff) as u8,
        0xff,
    ]
}

/// Generate the packed RGBA assignment for a grid. Deterministic per seed.
pub(crate) fn assign_palette(width: u32, height: u32, rng_seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let count = (width * height) as usize;
    let mut data = Vec::with_capacity(count * 4);
    for _ in 0..count {
        let entry = PALETTE[rng.gen_range(0..PALETTE.len())];
        data.extend_from_slice(&palette_rgba(entry));
    }
    data
}

/// GPU texture holding one palette color per particle.
pub struct ColorBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl ColorBuffer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rng_seed: u64,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Particle Color Buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let data = assign_palette(width, height, rng_seed);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Release the texture. Idempotent at the wgpu level.
    pub fn dispose(&mut self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_covers_grid_and_is_opaque() {
        let data = assign_palette(4, 4, 3);
        assert_eq!(data.len(), 16 * 4);
        for pixel in data.chunks_exact(4) {
            assert_eq!(pixel[3], 0xff);
        }
    }

    #[test]
    fn test_assignment_uses_only_palette_entries() {
        let data = assign_palette(8, 8, 11);
        for pixel in data.chunks_exact(4) {
            let packed =
                ((pixel[0] as u32) << 16) | ((pixel[1] as u32) << 8) | (pixel[2] as u32);
            assert!(PALETTE.contains(&packed), "{:#08x} not in palette", packed);
        }
    }

    #[test]
    fn test_assignment_is_deterministic_per_seed() {
        assert_eq!(assign_palette(8, 8, 5), assign_palette(8, 8, 5));
        assert_ne!(assign_palette(8, 8, 5), assign_palette(8, 8, 6));
    }
}
