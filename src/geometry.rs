//! Static box geometry shared by every particle instance.
//!
//! Each particle is drawn as a unit box: 6 faces, 2 triangles each, 36
//! corners total. The corner and face-normal tables are constant for the
//! lifetime of the program and are uploaded once into a uniform buffer that
//! all draw invocations read; nothing here is rebuilt per frame.
//!
//! Faces are ordered front, back, top, bottom, right, left, so the face
//! opposite to face `f` is `f ^ 1`. The particle vertex shader relies on that
//! pairing when it swaps a corner for its mirrored counterpart to avoid
//! backface artifacts.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Corners per particle box (6 faces x 2 triangles x 3 vertices).
pub const VERTICES_PER_PARTICLE: u32 = 36;

/// Unit-box corner positions, 6 consecutive entries per face.
pub const BOX_VERTICES: [[f32; 3]; 36] = [
    // Front (+z)
    [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0],
    // Back (-z)
    [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0],
    // Top (+y)
    [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0],
    // Bottom (-y)
    [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0],
    // Right (+x)
    [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0],
    // Left (-x)
    [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0],
];

/// Outward face normals, one per face, same ordering as [`BOX_VERTICES`].
pub const BOX_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
];

/// Uniform-buffer layout of the tables. `vec3` entries are padded to 16 bytes
/// to satisfy WGSL uniform array stride rules; matches `GeometryTables` in
/// `particles.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GeometryTablesGpu {
    vertices: [[f32; 4]; 36],
    normals: [[f32; 4]; 6],
}

impl GeometryTablesGpu {
    fn build() -> Self {
        let mut vertices = [[0.0; 4]; 36];
        for (dst, src) in vertices.iter_mut().zip(BOX_VERTICES.iter()) {
            *dst = [src[0], src[1], src[2], 0.0];
        }
        let mut normals = [[0.0; 4]; 6];
        for (dst, src) in normals.iter_mut().zip(BOX_NORMALS.iter()) {
            *dst = [src[0], src[1], src[2], 0.0];
        }
        Self { vertices, normals }
    }
}

/// The corner/normal tables resident on the GPU, allocated once and shared
/// read-only by all particle draws.
pub struct GeometryTables {
    buffer: wgpu::Buffer,
}

impl GeometryTables {
    pub fn new(device: &wgpu::Device) -> Self {
        let tables = GeometryTablesGpu::build();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Box Geometry Tables"),
            contents: bytemuck::bytes_of(&tables),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        Self { buffer }
    }

    pub(crate) fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_corners_lie_on_unit_cube() {
        for corner in BOX_VERTICES {
            for c in corner {
                assert!(c == 1.0 || c == -1.0);
            }
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        for n in BOX_NORMALS {
            assert_eq!(Vec3::from(n).length(), 1.0);
        }
    }

    #[test]
    fn test_opposite_faces_pair_by_xor() {
        for face in 0..6usize {
            let n = Vec3::from(BOX_NORMALS[face]);
            let opposite = Vec3::from(BOX_NORMALS[face ^ 1]);
            assert_eq!(n, -opposite);
        }
    }

    #[test]
    fn test_each_face_lies_in_its_normal_plane() {
        // All six corners of a face sit on the cube side the normal points at.
        for face in 0..6usize {
            let n = Vec3::from(BOX_NORMALS[face]);
            for corner in &BOX_VERTICES[face * 6..face * 6 + 6] {
                assert_eq!(Vec3::from(*corner).dot(n), 1.0);
            }
        }
    }

    #[test]
    fn test_gpu_table_size() {
        assert_eq!(std::mem::size_of::<GeometryTablesGpu>(), 36 * 16 + 6 * 16);
    }
}
