//! Probe meshes.

use std::f32::consts::TAU;

use depthgate_core::constants::CYLINDER_SEGMENTS;
use depthgate_core::math::Aabb;
use depthgate_core::ProbeShape;
use glam::{Vec2, Vec3};

/// Probe vertex: model-space position and diffuse texcoord.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
}

impl Vertex {
    #[inline]
    pub fn new(position: Vec3, texcoord: Vec2) -> Self {
        Self {
            position: position.to_array(),
            texcoord: texcoord.to_array(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn texcoord(&self) -> Vec2 {
        Vec2::from_array(self.texcoord)
    }
}

/// Indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ProbeMesh {
    /// Tessellate a probe shape centered on the origin.
    pub fn from_shape(shape: ProbeShape) -> Self {
        match shape {
            ProbeShape::Box {
                width,
                height,
                length,
            } => Self::cuboid(Vec3::new(width, height, length) * 0.5),
            ProbeShape::Cylinder { radius, height } => {
                Self::cylinder(radius, height, CYLINDER_SEGMENTS)
            }
        }
    }

    /// Box with the given half extents, four vertices per face.
    pub fn cuboid(half_extents: Vec3) -> Self {
        // (normal, u, v) with u x v = normal, so faces wind counter-clockwise.
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut mesh = Self::default();
        for (normal, u, v) in FACES {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in CORNERS {
                let position = (normal + u * su + v * sv) * half_extents;
                let texcoord = Vec2::new((su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5);
                mesh.vertices.push(Vertex::new(position, texcoord));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Capped cylinder along local Y.
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let ring = |i: u32| {
            let angle = i as f32 / segments as f32 * TAU;
            (angle.sin() * radius, angle.cos() * radius, angle)
        };

        let mut mesh = Self::default();

        // Side: one top/bottom vertex pair per column, seam duplicated for texcoords.
        for i in 0..=segments {
            let (x, z, _) = ring(i);
            let u = i as f32 / segments as f32;
            mesh.vertices.push(Vertex::new(Vec3::new(x, half, z), Vec2::new(u, 0.0)));
            mesh.vertices.push(Vertex::new(Vec3::new(x, -half, z), Vec2::new(u, 1.0)));
        }
        for i in 0..segments {
            let top = 2 * i;
            let bottom = top + 1;
            let next_top = top + 2;
            let next_bottom = top + 3;
            mesh.indices
                .extend_from_slice(&[top, bottom, next_bottom, top, next_bottom, next_top]);
        }

        // Caps: center fan with polar texcoords.
        for (y, flip) in [(half, false), (-half, true)] {
            let center = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::new(Vec3::new(0.0, y, 0.0), Vec2::splat(0.5)));
            for i in 0..=segments {
                let (x, z, angle) = ring(i);
                let texcoord = Vec2::new(0.5 + 0.5 * angle.sin(), 0.5 + 0.5 * angle.cos());
                mesh.vertices.push(Vertex::new(Vec3::new(x, y, z), texcoord));
            }
            for i in 0..segments {
                let a = center + 1 + i;
                let b = a + 1;
                if flip {
                    mesh.indices.extend_from_slice(&[center, b, a]);
                } else {
                    mesh.indices.extend_from_slice(&[center, a, b]);
                }
            }
        }

        mesh
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Model-space bounds; `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(Vertex::position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cuboid_counts_and_bounds() {
        let mesh = ProbeMesh::from_shape(ProbeShape::Box {
            width: 2.0,
            height: 4.0,
            length: 6.0,
        });
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn cuboid_faces_wind_outward() {
        let mesh = ProbeMesh::cuboid(Vec3::ONE);
        for [a, b, c] in mesh.triangles() {
            let normal = (b.position() - a.position()).cross(c.position() - a.position());
            let centroid = (a.position() + b.position() + c.position()) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn cylinder_counts_and_bounds() {
        let mesh = ProbeMesh::cylinder(0.5, 2.0, 8);
        // Side pairs + two caps of center + ring.
        assert_eq!(mesh.vertices.len(), 9 * 2 + 2 * (1 + 9));
        assert_eq!(mesh.triangle_count(), 8 * 2 + 8 * 2);
        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.max.y, 1.0);
        assert_relative_eq!(bounds.min.y, -1.0);
        assert_relative_eq!(bounds.max.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(bounds.max.z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn cylinder_vertices_lie_on_radius() {
        let mesh = ProbeMesh::cylinder(0.25, 1.0, 12);
        for vertex in &mesh.vertices {
            let p = vertex.position();
            let r = Vec2::new(p.x, p.z).length();
            assert!(r < 1e-6 || (r - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn texcoords_in_unit_square() {
        for shape in [ProbeShape::default_box(), ProbeShape::default_cylinder()] {
            let mesh = ProbeMesh::from_shape(shape);
            assert!(mesh
                .vertices
                .iter()
                .all(|v| (0.0..=1.0).contains(&v.texcoord[0]) && (0.0..=1.0).contains(&v.texcoord[1])));
        }
    }

    #[test]
    fn indices_in_range() {
        let mesh = ProbeMesh::from_shape(ProbeShape::default_cylinder());
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }
}
