//! Mesh capability: per-vertex attribute provider consumed by the rasterizer.

use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};

/// Per-vertex attributes produced by a [`MeshProvider`] and consumed by a
/// [`crate::Material`]'s vertex and fragment stages.
///
/// `position` is carried as a homogeneous coordinate: a fresh bundle has `w = 1`,
/// and the vertex stage is free to leave it in clip space with any `w`. The four
/// bone slots are carried through unused -- the pipeline never resolves skinning,
/// see the crate's design notes.
#[derive(Debug, Clone)]
pub struct VertexBundle {
    pub position: Vector4<f32>,
    pub uv: Vector2<f32>,
    pub uv2: Vector2<f32>,
    pub normal: Vector3<f32>,
    pub color: Vector3<f32>,
    pub bone_indices: [u32; 4],
    pub bone_weights: [f32; 4],
    pub bone_matrices: [Matrix4<f32>; 4],
}

impl Default for VertexBundle {
    fn default() -> Self {
        VertexBundle {
            position: Vector4::new(0.0, 0.0, 0.0, 1.0),
            uv: Vector2::zeros(),
            uv2: Vector2::zeros(),
            normal: Vector3::zeros(),
            color: Vector3::zeros(),
            bone_indices: [0; 4],
            bone_weights: [0.0; 4],
            bone_matrices: [Matrix4::identity(); 4],
        }
    }
}

impl VertexBundle {
    /// Linearly interpolates `position`, `uv`, `uv2` and `color` by barycentric
    /// weights `(u, v, w)` against `(a, b, c)`, then re-normalizes the interpolated
    /// normal. Bone data is not interpolated -- it's never read by the default
    /// pipeline.
    pub fn barycentric_interpolate(bary: Vector3<f32>, a: &VertexBundle, b: &VertexBundle, c: &VertexBundle) -> VertexBundle {
        let (u, v, w) = (bary.x, bary.y, bary.z);

        let normal = a.normal * u + b.normal * v + c.normal * w;
        let normal = if normal.norm_squared() > 0.0 { normal.normalize() } else { normal };

        VertexBundle {
            position: a.position * u + b.position * v + c.position * w,
            uv: a.uv * u + b.uv * v + c.uv * w,
            uv2: a.uv2 * u + b.uv2 * v + c.uv2 * w,
            normal,
            color: a.color * u + b.color * v + c.color * w,
            ..VertexBundle::default()
        }
    }
}

/// The capability a mesh must provide to be rasterized: flat, pre-triangulated
/// vertex access. Triangulation is the loader's job -- each consecutive triple of
/// vertex ids forms a triangle.
pub trait MeshProvider {
    /// Total number of (possibly repeated) vertices, i.e. `3 * face_count`.
    fn vert_count(&self) -> usize;

    fn face_count(&self) -> usize {
        self.vert_count() / 3
    }

    fn is_valid(&self) -> bool {
        self.vert_count() > 0
    }

    /// Fills `out` with the attributes of vertex `id`. `id` is in `[0, vert_count())`.
    fn get_vertex_data(&self, out: &mut VertexBundle, id: usize);
}

/// A concrete mesh storing parallel attribute sequences indexed by a flat vertex id.
///
/// Attribute sequences other than `positions` may be shorter than `positions`
/// (or empty); missing entries default per [`VertexBundle::default`].
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub uv2s: Vec<Vector2<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub colors: Vec<Vector3<f32>>,
}

impl Mesh {
    pub fn new(positions: Vec<Point3<f32>>) -> Mesh {
        Mesh {
            positions,
            ..Mesh::default()
        }
    }
}

impl MeshProvider for Mesh {
    fn vert_count(&self) -> usize {
        self.positions.len()
    }

    fn get_vertex_data(&self, out: &mut VertexBundle, id: usize) {
        let p = self.positions[id];
        out.position = Vector4::new(p.x, p.y, p.z, 1.0);
        out.uv = self.uvs.get(id).copied().unwrap_or_else(Vector2::zeros);
        out.uv2 = self.uv2s.get(id).copied().unwrap_or_else(Vector2::zeros);
        out.normal = self.normals.get(id).copied().unwrap_or_else(Vector3::zeros);
        out.color = self.colors.get(id).copied().unwrap_or_else(Vector3::zeros);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_is_invalid() {
        let mesh = Mesh::default();
        assert!(!mesh.is_valid());
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn missing_attributes_default_rather_than_panic() {
        let mesh = Mesh::new(vec![Point3::new(1.0, 2.0, 3.0)]);
        let mut out = VertexBundle::default();
        mesh.get_vertex_data(&mut out, 0);
        assert_eq!(out.position, Vector4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(out.uv, Vector2::zeros());
        assert_eq!(out.normal, Vector3::zeros());
    }

    #[test]
    fn barycentric_interpolate_at_a_vertex_returns_that_vertex() {
        let mut a = VertexBundle::default();
        a.uv = Vector2::new(1.0, 0.0);
        let b = VertexBundle::default();
        let c = VertexBundle::default();

        let out = VertexBundle::barycentric_interpolate(Vector3::new(1.0, 0.0, 0.0), &a, &b, &c);
        assert_eq!(out.uv, a.uv);
    }
}
