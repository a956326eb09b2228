//! A single-consumer task queue that runs a [`Renderer`] on a dedicated worker
//! thread, offering the same draw surface without blocking the caller on the draw
//! itself.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nalgebra::Matrix4;
use parking_lot::Mutex;

use crate::color::Color;
use crate::depth::DepthTest;
use crate::error::RasterResult;
use crate::geometry::FaceMode;
use crate::material::Material;
use crate::mesh::MeshProvider;
use crate::renderer::Renderer;
use crate::texture::Texture;

type Job = Box<dyn FnOnce(&mut Renderer) + Send>;

const WORKER_IDLE_POLL: Duration = Duration::from_micros(10);

/// A read-only mirror of the renderer's configuration, updated synchronously on the
/// producer side so getters never race with the worker thread.
struct Shadow {
    width: u32,
    height: u32,
    clear_color: Color,
    face_mode: FaceMode,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    depth_test: DepthTest,
    zbuffer_write: bool,
}

/// Wraps a [`Renderer`] on a dedicated worker thread. Every draw and setter
/// captures its arguments by value and enqueues a closure that replays the call on
/// the worker; getters read a shadow copy held on this side, so they never touch
/// the worker's state directly.
///
/// The worker sleeps [`WORKER_IDLE_POLL`] between polls of an empty queue. Dropping
/// a `ConcurrentRenderer` stops the worker after it drains whatever is already
/// queued; call [`ConcurrentRenderer::get_result`] first if you need the final
/// framebuffer.
pub struct ConcurrentRenderer {
    shadow: Arc<Mutex<Shadow>>,
    sender: mpsc::Sender<Job>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ConcurrentRenderer {
    pub fn new(width: u32, height: u32) -> RasterResult<ConcurrentRenderer> {
        let renderer = Renderer::new(width, height)?;

        let shadow = Arc::new(Mutex::new(Shadow {
            width,
            height,
            clear_color: renderer.clear_color(),
            face_mode: renderer.face_mode(),
            view: renderer.view(),
            projection: renderer.projection(),
            depth_test: renderer.depth_test(),
            zbuffer_write: renderer.zbuffer_write(),
        }));

        let running = Arc::new(AtomicBool::new(true));
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker_running = Arc::clone(&running);

        let worker = thread::spawn(move || {
            let mut renderer = renderer;
            loop {
                match receiver.recv_timeout(WORKER_IDLE_POLL) {
                    Ok(job) => job(&mut renderer),
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if !worker_running.load(Ordering::Acquire) {
                            break;
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(ConcurrentRenderer {
            shadow,
            sender,
            running,
            worker: Some(worker),
        })
    }

    fn enqueue<F>(&self, job: F)
    where
        F: FnOnce(&mut Renderer) + Send + 'static,
    {
        // The worker only disconnects once this handle is dropped, so a send
        // failure here can't happen through the public API.
        let _ = self.sender.send(Box::new(job));
    }

    pub fn width(&self) -> u32 {
        self.shadow.lock().width
    }

    pub fn height(&self) -> u32 {
        self.shadow.lock().height
    }

    pub fn clear_color(&self) -> Color {
        self.shadow.lock().clear_color
    }

    pub fn set_clear_color(&self, color: Color) {
        self.shadow.lock().clear_color = color;
        self.enqueue(move |r| r.set_clear_color(color));
    }

    pub fn face_mode(&self) -> FaceMode {
        self.shadow.lock().face_mode
    }

    pub fn set_face_mode(&self, mode: FaceMode) {
        self.shadow.lock().face_mode = mode;
        self.enqueue(move |r| r.set_face_mode(mode));
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.shadow.lock().view
    }

    pub fn set_view(&self, view: Matrix4<f32>) {
        self.shadow.lock().view = view;
        self.enqueue(move |r| r.set_view(view));
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.shadow.lock().projection
    }

    pub fn set_projection(&self, projection: Matrix4<f32>) {
        self.shadow.lock().projection = projection;
        self.enqueue(move |r| r.set_projection(projection));
    }

    pub fn depth_test(&self) -> DepthTest {
        self.shadow.lock().depth_test
    }

    pub fn set_depth_test(&self, test: DepthTest) {
        self.shadow.lock().depth_test = test;
        self.enqueue(move |r| r.set_depth_test(test));
    }

    pub fn zbuffer_write(&self) -> bool {
        self.shadow.lock().zbuffer_write
    }

    pub fn set_zbuffer_write(&self, write: bool) {
        self.shadow.lock().zbuffer_write = write;
        self.enqueue(move |r| r.set_zbuffer_write(write));
    }

    pub fn clear(&self) {
        self.enqueue(|r| r.clear());
    }

    pub fn clear_frame_buffer(&self) {
        self.enqueue(|r| r.clear_frame_buffer());
    }

    pub fn clear_zbuffer(&self) {
        self.enqueue(|r| r.clear_zbuffer());
    }

    pub fn draw_point(&self, x: u32, y: u32, color: Color) {
        self.enqueue(move |r| r.draw_point(x, y, color));
    }

    pub fn draw_line(&self, a: (i64, i64), b: (i64, i64), color: Color) {
        self.enqueue(move |r| r.draw_line(a, b, color));
    }

    pub fn draw_triangle_wire_frame(&self, a: (i64, i64), b: (i64, i64), c: (i64, i64), color: Color) {
        self.enqueue(move |r| r.draw_triangle_wire_frame(a, b, c, color));
    }

    pub fn draw_basic_triangle(&self, a: (i64, i64), b: (i64, i64), c: (i64, i64), color: Color) {
        self.enqueue(move |r| r.draw_basic_triangle(a, b, c, color));
    }

    pub fn draw_texture(&self, texture: Texture, offset: (i64, i64)) {
        self.enqueue(move |r| r.draw_texture(&texture, offset));
    }

    pub fn draw_shaded_mesh<M, T>(&self, mesh: M, material: T, model: Matrix4<f32>)
    where
        M: MeshProvider + Send + 'static,
        T: Material + Send + 'static,
    {
        self.enqueue(move |r| r.draw_shaded_mesh(&mesh, &material, model));
    }

    /// Enqueues a sentinel and blocks until every previously-submitted draw has
    /// executed, then returns the framebuffer's raw bytes. Synchronous with
    /// respect to the FIFO queue: every `set*`/`draw*` call issued before this one
    /// returns is guaranteed to be reflected in the result.
    pub fn get_result(&self) -> Vec<u8> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.enqueue(move |r| {
            let _ = reply_tx.send(r.get_result());
        });
        reply_rx.recv().expect("renderer worker thread disconnected before replying")
    }
}

impl Drop for ConcurrentRenderer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);

        if let Some(handle) = self.worker.take() {
            if let Err(payload) = handle.join() {
                panic::resume_unwind(payload);
            }
        }
    }
}
