use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use id_arena::Id;

use crate::math::bounds::Aabb;

pub type MeshId = Id<Mesh>;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub tex_coords: Vec2,
}

pub struct MeshPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Base colour factor of the primitive's imported material.
    pub base_color: Vec4,
}

impl MeshPrimitive {
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|triangle| {
            let a = self.vertices.get(triangle[0] as usize)?.position;
            let b = self.vertices.get(triangle[1] as usize)?.position;
            let c = self.vertices.get(triangle[2] as usize)?.position;
            Some([a, b, c])
        })
    }
}

/// Geometry shared by every node that references it. Bounds are in mesh
/// space.
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<MeshPrimitive>,
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(name: impl Into<String>, primitives: Vec<MeshPrimitive>) -> Option<Self> {
        let bounds = Aabb::from_points(
            primitives
                .iter()
                .flat_map(|primitive| primitive.vertices.iter().map(|vertex| vertex.position)),
        )?;

        Some(Self {
            name: name.into(),
            primitives,
            bounds,
        })
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.primitives
            .iter()
            .flat_map(|primitive| primitive.triangles())
    }

    /// Axis-aligned box with the given half extents, centred on the origin.
    #[cfg(test)]
    pub fn cuboid(name: &str, half_extents: Vec3) -> Mesh {
        let h = half_extents;
        let positions = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];

        let vertices = positions
            .iter()
            .map(|&position| Vertex {
                position,
                tex_coords: Vec2::ZERO,
            })
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 0, 2, 3, // back
            4, 6, 5, 4, 7, 6, // front
            0, 4, 5, 0, 5, 1, // bottom
            3, 2, 6, 3, 6, 7, // top
            0, 3, 7, 0, 7, 4, // left
            1, 5, 6, 1, 6, 2, // right
        ];

        let primitive = MeshPrimitive {
            index: 0,
            vertices,
            indices,
            base_color: Vec4::ONE,
        };

        Mesh::new(name, vec![primitive]).expect("cuboid has vertices")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_bounds_and_triangles() {
        let mesh = Mesh::cuboid("box", Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangles().count(), 12);
    }

    #[test]
    fn mesh_without_vertices_is_rejected() {
        let primitive = MeshPrimitive {
            index: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
            base_color: Vec4::ONE,
        };
        assert!(Mesh::new("empty", vec![primitive]).is_none());
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let primitive = MeshPrimitive {
            index: 0,
            vertices: vec![
                Vertex { position: Vec3::ZERO, tex_coords: Vec2::ZERO },
                Vertex { position: Vec3::X, tex_coords: Vec2::ZERO },
                Vertex { position: Vec3::Y, tex_coords: Vec2::ZERO },
            ],
            indices: vec![0, 1, 2, 0, 1, 7],
            base_color: Vec4::ONE,
        };
        assert_eq!(primitive.triangles().count(), 1);
    }
}
