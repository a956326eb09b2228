//! The programmable vertex/fragment shader pair.

use nalgebra::{Matrix3, Matrix4, Vector4};

use crate::mesh::VertexBundle;

/// A shader pair: a vertex stage run once per vertex and a fragment stage run once
/// per surviving pixel. The rasterizer handles everything else -- projection,
/// culling, traversal, depth testing, attribute interpolation and blending.
pub trait Material {
    /// Transforms `bundle.position` by `projection * view * model` (preserving `w`)
    /// and `bundle.normal` by `normal_matrix`, then re-normalizing it. Other fields
    /// are left untouched by the default implementation.
    fn vertex(&self, bundle: &mut VertexBundle, projection: &Matrix4<f32>, view: &Matrix4<f32>, model: &Matrix4<f32>, normal_matrix: &Matrix3<f32>) {
        bundle.position = projection * view * model * bundle.position;

        let normal = normal_matrix * bundle.normal;
        bundle.normal = if normal.norm_squared() > 0.0 { normal.normalize() } else { normal };
    }

    /// Produces the fragment's linear RGBA in `[0,1]` from the interpolated bundle.
    fn fragment(&self, bundle: &VertexBundle) -> Vector4<f32>;
}

/// The fallback material: transforms normally, shades every fragment opaque white.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMaterial;

impl Material for DefaultMaterial {
    fn fragment(&self, _bundle: &VertexBundle) -> Vector4<f32> {
        Vector4::new(1.0, 1.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn default_material_shades_opaque_white() {
        let mat = DefaultMaterial;
        let bundle = VertexBundle::default();
        assert_eq!(mat.fragment(&bundle), Vector4::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn default_vertex_stage_preserves_w_and_renormalizes_normal() {
        let mat = DefaultMaterial;
        let mut bundle = VertexBundle::default();
        bundle.normal = Vector3::new(2.0, 0.0, 0.0);

        let identity = Matrix4::identity();
        let normal_matrix = Matrix3::identity();
        mat.vertex(&mut bundle, &identity, &identity, &identity, &normal_matrix);

        assert_eq!(bundle.position.w, 1.0);
        assert!((bundle.normal.norm() - 1.0).abs() < 1e-6);
    }
}
