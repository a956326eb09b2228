//! The triangle traversal core shared by [`crate::Renderer::draw_shaded_mesh`] and
//! [`crate::OcclusionDetector::check_mesh`].

use nalgebra::{Vector2, Vector3};

use crate::geometry::barycentric;

/// The screen-space axis-aligned bounding box of `p0, p1, p2`, clamped to
/// `[0, width-1] x [0, height-1]`. Returns `None` if the clamped box is empty
/// (the triangle falls entirely outside the viewport).
pub fn screen_bounds(p0: Vector3<f32>, p1: Vector3<f32>, p2: Vector3<f32>, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }

    let xmin = p0.x.min(p1.x).min(p2.x).floor().max(0.0);
    let ymin = p0.y.min(p1.y).min(p2.y).floor().max(0.0);
    let xmax = p0.x.max(p1.x).max(p2.x).ceil().min((width - 1) as f32);
    let ymax = p0.y.max(p1.y).max(p2.y).ceil().min((height - 1) as f32);

    if xmin > xmax || ymin > ymax {
        return None;
    }

    Some((xmin as u32, ymin as u32, xmax as u32, ymax as u32))
}

/// Walks the clamped bounding box of screen-space triangle `(p0, p1, p2)`, calling
/// `visit(x, y, barycentric, screen_z)` for every pixel whose barycentric weights
/// are all non-negative. Pixels rejected by [`barycentric`]'s degenerate-triangle
/// sentinel or by being outside the triangle are skipped without calling `visit`.
///
/// `visit` returns `true` to keep walking the remaining pixels, or `false` to stop
/// immediately -- callers that only need to know whether *any* pixel passes (e.g.
/// [`crate::OcclusionDetector::check_mesh`] with `zbuffer_write` off) can short-circuit
/// on the first one instead of scanning the whole bounding box.
pub fn rasterize_triangle<F>(p0: Vector3<f32>, p1: Vector3<f32>, p2: Vector3<f32>, width: u32, height: u32, mut visit: F)
where
    F: FnMut(u32, u32, Vector3<f32>, f32) -> bool,
{
    let (xmin, ymin, xmax, ymax) = match screen_bounds(p0, p1, p2, width, height) {
        Some(bounds) => bounds,
        None => return,
    };

    let p0_xy = Vector2::new(p0.x, p0.y);
    let p1_xy = Vector2::new(p1.x, p1.y);
    let p2_xy = Vector2::new(p2.x, p2.y);

    for y in ymin..=ymax {
        for x in xmin..=xmax {
            let p = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);
            let bary = barycentric(p0_xy, p1_xy, p2_xy, p);

            if bary.x < 0.0 || bary.y < 0.0 || bary.z < 0.0 {
                continue;
            }

            let z = p0.z * bary.x + p1.z * bary.y + p2.z * bary.z;
            if !visit(x, y, bary, z) {
                return;
            }
        }
    }
}
