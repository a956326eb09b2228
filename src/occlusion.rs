//! Depth-only occlusion queries, sharing the transform and traversal math used by
//! [`crate::Renderer::draw_shaded_mesh`] without any color work.

use log::debug;
use nalgebra::Matrix4;

use crate::depth::{DepthBuffer, DepthTest};
use crate::error::RasterResult;
use crate::geometry::project_to_screen;
use crate::mesh::{MeshProvider, VertexBundle};
use crate::rasterizer::rasterize_triangle;

/// Answers "would this mesh draw anything visible?" against a depth buffer, without
/// a color target, a material, or back-face culling -- any triangle that passes the
/// depth test counts as visible, conservatively.
pub struct OcclusionDetector {
    depth_buffer: DepthBuffer,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    depth_test: DepthTest,
    zbuffer_write: bool,
}

impl OcclusionDetector {
    pub fn new(width: u32, height: u32) -> RasterResult<OcclusionDetector> {
        Ok(OcclusionDetector {
            depth_buffer: DepthBuffer::new(width, height)?,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            depth_test: DepthTest::default(),
            zbuffer_write: true,
        })
    }

    pub fn width(&self) -> u32 {
        self.depth_buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.depth_buffer.height()
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
        self.depth_buffer.clear();
    }

    /// `true` if any pixel of any triangle of `mesh` under `model` passes the depth
    /// test. With `zbuffer_write` on, every passing triangle still writes depth, so
    /// later queries against the same buffer see the accumulated occluders.
    pub fn check_mesh<M: MeshProvider>(&mut self, mesh: &M, model: Matrix4<f32>) -> bool {
        if !mesh.is_valid() {
            debug!("check_mesh: skipping mesh with vert_count() == 0");
            return false;
        }

        let (width, height) = (self.width(), self.height());
        let mvp = self.projection * self.view * model;
        let mut visible = false;

        let mut bundle = [VertexBundle::default(), VertexBundle::default(), VertexBundle::default()];

        for face in 0..mesh.face_count() {
            for i in 0..3 {
                mesh.get_vertex_data(&mut bundle[i], face * 3 + i);
            }

            let screen = [
                project_to_screen(mvp * bundle[0].position, width as f32, height as f32),
                project_to_screen(mvp * bundle[1].position, width as f32, height as f32),
                project_to_screen(mvp * bundle[2].position, width as f32, height as f32),
            ];

            let depth_test = self.depth_test;
            let zbuffer_write = self.zbuffer_write;
            let depth_buffer = &mut self.depth_buffer;
            let mut face_visible = false;

            rasterize_triangle(screen[0], screen[1], screen[2], width, height, |x, y, _bary, z| {
                if depth_buffer.test(depth_test, x, y, z) {
                    face_visible = true;
                    if zbuffer_write {
                        depth_buffer.set(x, y, z);
                        true
                    } else {
                        // The first passing pixel already answers the query; no need
                        // to keep walking the rest of this face's bounding box.
                        false
                    }
                } else {
                    true
                }
            });

            if face_visible {
                visible = true;
                if !zbuffer_write {
                    return true;
                }
            }
        }

        visible
    }
}
