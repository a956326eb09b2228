//! Screen-space projection, face culling and barycentric rasterization math shared
//! by the renderer and the occlusion detector.

use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};

/// Which winding of triangle faces survive culling in [`crate::Renderer::draw_shaded_mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceMode {
    /// No culling; every triangle is rasterized.
    Both,
    /// Discard triangles whose world-space normal points away from the camera.
    Front,
    /// Discard triangles whose world-space normal points toward the camera.
    Back,
}

impl Default for FaceMode {
    fn default() -> FaceMode {
        FaceMode::Both
    }
}

/// Projects a clip-space homogeneous position to screen space: `x, y` in pixels
/// (`y` flipped so row 0 is the top), `z` inverted so that *larger means closer*.
pub fn project_to_screen(clip: Vector4<f32>, width: f32, height: f32) -> Vector3<f32> {
    let ndc = clip.xyz() / clip.w;
    Vector3::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height, 1.0 - ndc.z)
}

/// World-space back-face test. `p0, p1, p2` must be transformed only by the model
/// matrix, not by view/projection -- culling happens on a copy of the raw positions,
/// before the material's vertex stage runs, so a shader that mangles the homogeneous
/// position can't destabilize it.
pub fn is_culled(mode: FaceMode, p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>, camera: Point3<f32>) -> bool {
    if mode == FaceMode::Both {
        return false;
    }

    let normal = (p1 - p0).cross(&(p2 - p0));
    let d = normal.dot(&(camera - p0));

    match mode {
        FaceMode::Front => d < 0.0,
        FaceMode::Back => d > 0.0,
        FaceMode::Both => unreachable!(),
    }
}

/// `transpose(inverse(model_3x3))`, used to transform normals so non-uniform scale
/// in the model matrix doesn't skew their direction. Falls back to the identity if
/// the upper 3x3 block is singular.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = model.fixed_view::<3, 3>(0, 0).into_owned();
    upper.try_inverse().map(|inv| inv.transpose()).unwrap_or_else(Matrix3::identity)
}

/// The camera's world-space position: the translation column of the inverse view
/// matrix. Falls back to the origin if the view matrix is singular.
pub fn camera_position(view: &Matrix4<f32>) -> Point3<f32> {
    view.try_inverse()
        .map(|inv| Point3::new(inv[(0, 3)], inv[(1, 3)], inv[(2, 3)]))
        .unwrap_or_else(Point3::origin)
}

/// Barycentric weights of `p` with respect to screen-space triangle `(p0, p1, p2)`,
/// via the cross-product method. A degenerate (zero-area) triangle produces
/// `(-1, 1, 1)`, which every caller rejects since one component is negative.
pub fn barycentric(p0: Vector2<f32>, p1: Vector2<f32>, p2: Vector2<f32>, p: Vector2<f32>) -> Vector3<f32> {
    let cross = Vector3::new(p2.x - p0.x, p1.x - p0.x, p0.x - p.x).cross(&Vector3::new(p2.y - p0.y, p1.y - p0.y, p0.y - p.y));

    if cross.z.abs() < 1.0 {
        return Vector3::new(-1.0, 1.0, 1.0);
    }

    Vector3::new(1.0 - (cross.x + cross.y) / cross.z, cross.y / cross.z, cross.x / cross.z)
}
