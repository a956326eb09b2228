//! The single-threaded rendering façade: owns a framebuffer and depth buffer and
//! exposes the primitive drawing surface built on top of [`crate::rasterizer`].

use std::mem;

use log::{debug, trace};
use nalgebra::{Matrix4, Point3, Vector3};

use crate::color::blend::alpha_over;
use crate::color::Color;
use crate::depth::{DepthBuffer, DepthTest};
use crate::error::RasterResult;
use crate::framebuffer::FrameBuffer;
use crate::geometry::{self, FaceMode};
use crate::material::Material;
use crate::mesh::{MeshProvider, VertexBundle};
use crate::rasterizer::rasterize_triangle;
use crate::texture::Texture;

/// Owns a color buffer and a depth buffer and draws into them.
///
/// Perspective-correct interpolation, clipping against the view frustum,
/// antialiasing, gamma correction and skeletal skinning are out of scope -- see
/// the crate's design notes.
pub struct Renderer {
    framebuffer: FrameBuffer,
    depth_buffer: DepthBuffer,
    clear_color: Color,
    face_mode: FaceMode,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    depth_test: DepthTest,
    zbuffer_write: bool,
}

impl Renderer {
    /// Constructs a renderer with identity view/projection and `DepthTest::Less`.
    /// Fails only if `width` or `height` is zero.
    pub fn new(width: u32, height: u32) -> RasterResult<Renderer> {
        Ok(Renderer {
            framebuffer: FrameBuffer::new(width, height)?,
            depth_buffer: DepthBuffer::new(width, height)?,
            clear_color: Color::TRANSPARENT,
            face_mode: FaceMode::default(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            depth_test: DepthTest::default(),
            zbuffer_write: true,
        })
    }

    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn face_mode(&self) -> FaceMode {
        self.face_mode
    }

    pub fn set_face_mode(&mut self, mode: FaceMode) {
        self.face_mode = mode;
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn set_view(&mut self, view: Matrix4<f32>) {
        self.view = view;
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    pub fn depth_test(&self) -> DepthTest {
        self.depth_test
    }

    pub fn set_depth_test(&mut self, test: DepthTest) {
        self.depth_test = test;
    }

    pub fn zbuffer_write(&self) -> bool {
        self.zbuffer_write
    }

    pub fn set_zbuffer_write(&mut self, write: bool) {
        self.zbuffer_write = write;
    }

    pub fn clear(&mut self) {
        self.clear_frame_buffer();
        self.clear_zbuffer();
    }

    pub fn clear_frame_buffer(&mut self) {
        self.framebuffer.clear(self.clear_color);
    }

    pub fn clear_zbuffer(&mut self) {
        self.depth_buffer.clear();
    }

    /// Writes `color` at `(x, y)`. No bounds check -- callers and higher-level
    /// primitives are responsible for valid coordinates.
    pub fn draw_point(&mut self, x: u32, y: u32, color: Color) {
        self.framebuffer.set_pixel(x, y, color);
    }

    /// Integer Bresenham with octant-symmetric stepping, so `draw_line(a, b, _)`
    /// and `draw_line(b, a, _)` touch the same pixel set.
    pub fn draw_line(&mut self, a: (i64, i64), b: (i64, i64), color: Color) {
        let (mut x0, mut y0) = a;
        let (mut x1, mut y1) = b;

        let steep = (x0 - x1).abs() < (y0 - y1).abs();
        if steep {
            mem::swap(&mut x0, &mut y0);
            mem::swap(&mut x1, &mut y1);
        }

        if x0 > x1 {
            mem::swap(&mut x0, &mut x1);
            mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = y1 - y0;
        let derror2 = dy.abs() * 2;
        let mut error2 = 0;
        let y_step = if y1 > y0 { 1 } else { -1 };
        let mut y = y0;

        for x in x0..=x1 {
            let (px, py) = if steep { (y, x) } else { (x, y) };

            if self.framebuffer.in_bounds(px, py) {
                self.draw_point(px as u32, py as u32, color);
            }

            error2 += derror2;
            if error2 > dx {
                y += y_step;
                error2 -= dx * 2;
            }
        }
    }

    pub fn draw_triangle_wire_frame(&mut self, a: (i64, i64), b: (i64, i64), c: (i64, i64), color: Color) {
        self.draw_line(a, b, color);
        self.draw_line(b, c, color);
        self.draw_line(c, a, color);
    }

    /// Sorts the three points by Y, splits into two horizontal segments at the
    /// middle vertex, and fills each scanline between the two bounding edges.
    pub fn draw_basic_triangle(&mut self, a: (i64, i64), b: (i64, i64), c: (i64, i64), color: Color) {
        let mut pts = [a, b, c];
        pts.sort_by_key(|p| p.1);
        let [(x0, y0), (x1, y1), (x2, y2)] = pts;

        let total_height = y2 - y0;
        if total_height == 0 {
            return;
        }

        for y in y0..y2 {
            let second_half = y > y1 || y1 == y0;
            let segment_height = if second_half { y2 - y1 } else { y1 - y0 };
            if segment_height == 0 {
                continue;
            }

            let alpha = (y - y0) as f32 / total_height as f32;
            let beta = if second_half {
                (y - y1) as f32 / segment_height as f32
            } else {
                (y - y0) as f32 / segment_height as f32
            };

            let ax = x0 + ((x2 - x0) as f32 * alpha) as i64;
            let bx = if second_half {
                x1 + ((x2 - x1) as f32 * beta) as i64
            } else {
                x0 + ((x1 - x0) as f32 * beta) as i64
            };

            let (start, end) = if ax > bx { (bx, ax) } else { (ax, bx) };

            for x in start..=end {
                if self.framebuffer.in_bounds(x, y) {
                    self.draw_point(x as u32, y as u32, color);
                }
            }
        }
    }

    /// Blits `texture` with its top-left corner at `offset`, clipped to the
    /// viewport.
    pub fn draw_texture(&mut self, texture: &Texture, offset: (i64, i64)) {
        for ty in 0..texture.height() as i64 {
            for tx in 0..texture.width() as i64 {
                let (x, y) = (offset.0 + tx, offset.1 + ty);
                if self.framebuffer.in_bounds(x, y) {
                    self.draw_point(x as u32, y as u32, texture.get_color(tx, ty));
                }
            }
        }
    }

    /// Transforms, culls, rasterizes and shades every triangle of `mesh` under
    /// `model`, compositing into the framebuffer and (optionally) writing depth.
    ///
    /// `mesh` is assumed to lie within the view frustum; this crate does not clip
    /// against the near/far/side planes, so geometry straddling `w <= 0` will
    /// project to nonsense screen coordinates.
    pub fn draw_shaded_mesh<M: MeshProvider, T: Material>(&mut self, mesh: &M, material: &T, model: Matrix4<f32>) {
        if !mesh.is_valid() {
            debug!("draw_shaded_mesh: skipping mesh with vert_count() == 0");
            return;
        }

        let normal_matrix = geometry::normal_matrix(&model);
        let camera = geometry::camera_position(&self.view);
        let (width, height) = (self.width(), self.height());

        let mut raw = [VertexBundle::default(), VertexBundle::default(), VertexBundle::default()];

        for face in 0..mesh.face_count() {
            for i in 0..3 {
                mesh.get_vertex_data(&mut raw[i], face * 3 + i);
            }

            let world = [
                model.transform_point(&Point3::new(raw[0].position.x, raw[0].position.y, raw[0].position.z)),
                model.transform_point(&Point3::new(raw[1].position.x, raw[1].position.y, raw[1].position.z)),
                model.transform_point(&Point3::new(raw[2].position.x, raw[2].position.y, raw[2].position.z)),
            ];

            if geometry::is_culled(self.face_mode, world[0], world[1], world[2], camera) {
                trace!("draw_shaded_mesh: culled face {}", face);
                continue;
            }

            let mut shaded = raw.clone();
            for v in shaded.iter_mut() {
                material.vertex(v, &self.projection, &self.view, &model, &normal_matrix);
            }

            let screen: Vec<Vector3<f32>> = shaded.iter().map(|v| geometry::project_to_screen(v.position, width as f32, height as f32)).collect();

            let (p0, p1, p2) = (screen[0], screen[1], screen[2]);
            let (v0, v1, v2) = (&shaded[0], &shaded[1], &shaded[2]);

            let depth_test = self.depth_test;
            let zbuffer_write = self.zbuffer_write;
            let depth_buffer = &mut self.depth_buffer;
            let framebuffer = &mut self.framebuffer;

            rasterize_triangle(p0, p1, p2, width, height, |x, y, bary, z| {
                if !depth_buffer.test(depth_test, x, y, z) {
                    return true;
                }

                let interpolated = VertexBundle::barycentric_interpolate(bary, v0, v1, v2);
                let fragment = material.fragment(&interpolated);
                let a = fragment.w;

                if a <= 0.0 {
                    return true;
                }

                if zbuffer_write {
                    depth_buffer.set(x, y, z);
                }

                if a >= 1.0 {
                    framebuffer.set_pixel(x, y, Color::from_normalized(fragment));
                } else {
                    let dst = framebuffer.get_pixel(x, y);
                    framebuffer.set_pixel(x, y, alpha_over(dst, fragment.xyz(), a));
                }

                true
            });
        }
    }

    /// The framebuffer's raw row-major RGBA bytes, length `width * height * 4`.
    pub fn get_result(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.framebuffer.pixels().len() * 4);
        for p in self.framebuffer.pixels() {
            out.push(p.r);
            out.push(p.g);
            out.push(p.b);
            out.push(p.a);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    #[test]
    fn zero_dimensions_is_an_error() {
        assert!(Renderer::new(0, 4).is_err());
        assert!(Renderer::new(4, 0).is_err());
    }

    #[test]
    fn clear_fills_every_pixel_with_clear_color() {
        let mut r = Renderer::new(4, 4).unwrap();
        r.set_clear_color(Color::new(10, 20, 30, 40));
        r.clear();
        let bytes = r.get_result();
        assert_eq!(bytes.len(), 64);
        for chunk in bytes.chunks(4) {
            assert_eq!(chunk, &[10, 20, 30, 40]);
        }
    }

    #[test]
    fn single_point_is_isolated() {
        let mut r = Renderer::new(2, 2).unwrap();
        r.set_clear_color(Color::TRANSPARENT);
        r.clear();
        r.draw_point(1, 0, Color::new(255, 0, 0, 255));
        let bytes = r.get_result();
        assert_eq!(bytes, vec![0, 0, 0, 0, 255, 0, 0, 255, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn line_is_symmetric_regardless_of_endpoint_order() {
        let mut forward = Renderer::new(5, 5).unwrap();
        forward.clear();
        forward.draw_line((0, 0), (4, 4), Color::WHITE);

        let mut backward = Renderer::new(5, 5).unwrap();
        backward.clear();
        backward.draw_line((4, 4), (0, 0), Color::WHITE);

        assert_eq!(forward.get_result(), backward.get_result());
    }

    #[test]
    fn diagonal_line_touches_the_expected_pixels() {
        let mut r = Renderer::new(5, 5).unwrap();
        r.clear();
        r.draw_line((0, 0), (4, 4), Color::WHITE);

        for i in 0..5u32 {
            assert_eq!(r.get_result()[((i * 5 + i) * 4) as usize], 255);
        }
    }

    #[test]
    fn empty_mesh_draws_nothing() {
        let mut r = Renderer::new(4, 4).unwrap();
        r.set_clear_color(Color::TRANSPARENT);
        r.clear();
        let mesh = Mesh::default();
        let material = crate::material::DefaultMaterial;
        r.draw_shaded_mesh(&mesh, &material, Matrix4::identity());
        assert_eq!(r.get_result(), vec![0u8; 4 * 4 * 4]);
    }

    #[test]
    fn face_mode_front_culls_the_whole_triangle_end_to_end() {
        let mut r = Renderer::new(8, 8).unwrap();
        r.set_clear_color(Color::TRANSPARENT);
        r.clear();
        r.set_face_mode(FaceMode::Front);
        // Puts the camera at (0, 0, 10), matching `geometry`'s own culling test.
        r.set_view(Matrix4::new_translation(&Vector3::new(0.0, 0.0, -10.0)));

        // Same winding as `geometry::front_culls_triangles_facing_away_from_camera`:
        // the world-space normal points away from that camera, so `FaceMode::Front`
        // discards every pixel of the triangle.
        let mesh = Mesh::new(vec![Point3::new(0.0, 1.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)]);
        let material = crate::material::DefaultMaterial;
        r.draw_shaded_mesh(&mesh, &material, Matrix4::identity());

        assert_eq!(r.get_result(), vec![0u8; 8 * 8 * 4]);
    }

    #[test]
    fn basic_triangle_does_not_draw_the_apex_row() {
        // Grounded in `tsrpa.h`'s `for (i = 0; i < total_height; i++)`: the last
        // filled row is `c.y - 1`, so the max-Y vertex's own row stays untouched.
        let mut r = Renderer::new(10, 10).unwrap();
        r.set_clear_color(Color::BLACK);
        r.clear();
        r.draw_basic_triangle((0, 0), (4, 2), (2, 5), Color::WHITE);

        let bytes = r.get_result();
        for x in 0..10u32 {
            let i = ((5 * 10 + x) * 4) as usize;
            assert_eq!(&bytes[i..i + 4], &[0, 0, 0, 255], "apex row y=5 should be untouched at x={x}");
        }
    }

    #[test]
    fn basic_triangle_fills_interior_rows() {
        let mut r = Renderer::new(10, 10).unwrap();
        r.set_clear_color(Color::BLACK);
        r.clear();
        r.draw_basic_triangle((0, 0), (4, 2), (2, 5), Color::WHITE);

        assert_ne!(r.get_result(), vec![0u8; 10 * 10 * 4], "some interior pixel should have been filled white");
    }

    #[test]
    fn basic_triangle_with_all_vertices_on_one_row_draws_nothing() {
        let mut r = Renderer::new(5, 5).unwrap();
        r.set_clear_color(Color::BLACK);
        r.clear();
        r.draw_basic_triangle((0, 2), (2, 2), (4, 2), Color::WHITE);

        assert_eq!(r.get_result(), vec![0u8, 0, 0, 255].repeat(25));
    }

    proptest::proptest! {
        #[test]
        fn bresenham_line_is_symmetric_for_any_pair_of_endpoints(
            x0 in 0i64..40, y0 in 0i64..40,
            x1 in 0i64..40, y1 in 0i64..40,
        ) {
            let mut forward = Renderer::new(40, 40).unwrap();
            forward.clear();
            forward.draw_line((x0, y0), (x1, y1), Color::WHITE);

            let mut backward = Renderer::new(40, 40).unwrap();
            backward.clear();
            backward.draw_line((x1, y1), (x0, y0), Color::WHITE);

            proptest::prop_assert_eq!(forward.get_result(), backward.get_result());
        }
    }
}
