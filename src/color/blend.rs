//! Alpha-over compositing between a shaded fragment and the existing framebuffer pixel.

use nalgebra::{Vector3, Vector4};

use super::Color;

/// Composites `rgb` (with coverage `alpha`) over `dst`, i.e. `mix(dst, vec4(rgb, 1), alpha)`.
///
/// `alpha` is expected in `(0,1)` -- the fully-transparent (`a=0`, skip) and
/// fully-opaque (`a>=1`, plain overwrite) cases don't need to read `dst` at all, so
/// callers handle those themselves and only reach for this for the partial case.
pub fn alpha_over(dst: Color, rgb: Vector3<f32>, alpha: f32) -> Color {
    let dst = dst.to_normalized();
    let src = Vector4::new(rgb.x, rgb.y, rgb.z, 1.0);
    Color::from_normalized(dst * (1.0 - alpha) + src * alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_alpha_red_over_opaque_black_is_s5() {
        let dst = Color::new(0, 0, 0, 255);
        let out = alpha_over(dst, Vector3::new(1.0, 0.0, 0.0), 0.5);
        assert_eq!(out.r, 128);
        assert_eq!(out.g, 0);
        assert_eq!(out.b, 0);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn zero_alpha_caller_never_calls_this_but_would_return_dst_untouched() {
        let dst = Color::new(9, 9, 9, 9);
        let out = alpha_over(dst, Vector3::new(1.0, 1.0, 1.0), 0.0);
        assert_eq!(out, dst);
    }
}
