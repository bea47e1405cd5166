//! A self-contained software rendering surface.
//!
//! Composites a shaded cube with `vello_cpu` each time a frame is requested. It exists so the
//! CLI and integration tests can drive real captures without an external renderer.

use crate::foundation::core::{PixelBuffer, SurfaceSize};
use crate::surface::RenderSurface;
use kurbo::Point;
use std::cell::{Cell, RefCell};

const BACKGROUND: [u8; 4] = [18, 20, 28, 255];
const ELEVATION: f64 = 0.45;
const CAMERA_DISTANCE: f64 = 4.0;
const LIGHT: [f64; 3] = [0.4, 0.7, -0.6];

const CUBE_VERTICES: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Faces as vertex indices (counter-clockwise seen from outside) plus base color.
const CUBE_FACES: [([usize; 4], [u8; 3]); 6] = [
    ([0, 3, 2, 1], [232, 92, 74]),
    ([4, 5, 6, 7], [74, 160, 232]),
    ([0, 1, 5, 4], [120, 200, 110]),
    ([3, 7, 6, 2], [240, 200, 90]),
    ([0, 4, 7, 3], [170, 110, 220]),
    ([1, 2, 6, 5], [90, 210, 200]),
];

#[derive(Debug)]
struct SurfaceState {
    size: SurfaceSize,
    pixel_density: f64,
    azimuth: f64,
    frame: PixelBuffer,
}

/// In-process [`RenderSurface`] rendering a rotating cube on the CPU.
///
/// Physical surfaces are limited to [`SoftwareSurface::MAX_DIMENSION`] pixels per side. Past
/// that nothing is composited and readback returns a buffer with no pixel data, so encoders
/// reject the frame instead of capturing a blank image.
#[derive(Debug)]
pub struct SoftwareSurface {
    state: RefCell<SurfaceState>,
    composited: Cell<u64>,
}

impl SoftwareSurface {
    /// Largest physical width or height the rasterizer supports.
    pub const MAX_DIMENSION: u32 = u16::MAX as u32;

    /// `true` when `width x height` logical pixels at `pixel_density` can be rendered.
    pub fn supports(size: SurfaceSize, pixel_density: f64) -> bool {
        let (w, h) = size.physical(pixel_density);
        w <= Self::MAX_DIMENSION && h <= Self::MAX_DIMENSION
    }

    /// Surface of logical `size` at `pixel_density`, subject at azimuth 0.
    pub fn new(size: SurfaceSize, pixel_density: f64) -> Self {
        Self {
            state: RefCell::new(SurfaceState {
                size,
                pixel_density,
                azimuth: 0.0,
                frame: PixelBuffer::transparent(0, 0),
            }),
            composited: Cell::new(0),
        }
    }

    /// Number of frames composited so far.
    pub fn frames_composited(&self) -> u64 {
        self.composited.get()
    }

    fn composite(&self) {
        let mut state = self.state.borrow_mut();
        self.composited.set(self.composited.get() + 1);
        if !Self::supports(state.size, state.pixel_density) {
            tracing::warn!(
                width = state.size.width,
                height = state.size.height,
                pixel_density = state.pixel_density,
                "surface exceeds the software rasterizer limit; nothing composited"
            );
            return;
        }
        let (w, h) = state.size.physical(state.pixel_density);
        state.frame = render_cube(w, h, state.azimuth);
    }
}

impl RenderSurface for SoftwareSurface {
    fn azimuth(&self) -> f64 {
        self.state.borrow().azimuth
    }

    fn set_azimuth(&self, radians: f64) {
        self.state.borrow_mut().azimuth = radians;
    }

    fn surface_size(&self) -> SurfaceSize {
        self.state.borrow().size
    }

    fn pixel_density(&self) -> f64 {
        self.state.borrow().pixel_density
    }

    fn resize_surface(&self, width: u32, height: u32) {
        self.state.borrow_mut().size = SurfaceSize { width, height };
    }

    fn set_pixel_density(&self, density: f64) {
        self.state.borrow_mut().pixel_density = density;
    }

    async fn next_composited_frame(&self) {
        self.composite();
        tokio::task::yield_now().await;
    }

    fn read_pixels(&self) -> PixelBuffer {
        let state = self.state.borrow();
        let (w, h) = state.size.physical(state.pixel_density);
        if !Self::supports(state.size, state.pixel_density) {
            return PixelBuffer {
                width: w,
                height: h,
                data: Vec::new(),
                premultiplied: true,
            };
        }
        if state.frame.width != w || state.frame.height != h {
            return PixelBuffer::transparent(w, h);
        }
        state.frame.clone()
    }
}

fn rotate(v: [f64; 3], azimuth: f64) -> [f64; 3] {
    let (sa, ca) = azimuth.sin_cos();
    let x = v[0] * ca + v[2] * sa;
    let z = -v[0] * sa + v[2] * ca;
    let (se, ce) = ELEVATION.sin_cos();
    let y = v[1] * ce - z * se;
    let z = v[1] * se + z * ce;
    [x, y, z]
}

fn project(v: [f64; 3], width: f64, height: f64) -> Point {
    let scale = 0.25 * width.min(height) * CAMERA_DISTANCE / (CAMERA_DISTANCE + v[2]);
    Point::new(width * 0.5 + v[0] * scale, height * 0.5 - v[1] * scale)
}

fn shade(base: [u8; 3], normal: [f64; 3]) -> [u8; 3] {
    let len = (LIGHT[0] * LIGHT[0] + LIGHT[1] * LIGHT[1] + LIGHT[2] * LIGHT[2]).sqrt();
    let lambert = (normal[0] * LIGHT[0] + normal[1] * LIGHT[1] + normal[2] * LIGHT[2]) / len;
    let k = 0.35 + 0.65 * lambert.max(0.0);
    base.map(|c| (f64::from(c) * k).round().clamp(0.0, 255.0) as u8)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

/// Callers keep `width` and `height` within [`SoftwareSurface::MAX_DIMENSION`].
fn render_cube(width: u32, height: u32, azimuth: f64) -> PixelBuffer {
    let w16 = u16::try_from(width).unwrap_or(u16::MAX);
    let h16 = u16::try_from(height).unwrap_or(u16::MAX);
    let (wf, hf) = (f64::from(w16), f64::from(h16));

    let verts = CUBE_VERTICES.map(|v| rotate(v, azimuth));
    let mut faces: Vec<(f64, [usize; 4], [u8; 3])> = CUBE_FACES
        .iter()
        .filter_map(|&(idx, color)| {
            let [a, b, c, d] = idx.map(|i| verts[i]);
            let normal = face_normal(a, b, c);
            // Camera looks down +z; faces pointing at it have negative z normals.
            if normal[2] >= 0.0 {
                return None;
            }
            let depth = (a[2] + b[2] + c[2] + d[2]) / 4.0;
            Some((depth, idx, shade(color, normal)))
        })
        .collect();
    faces.sort_by(|x, y| y.0.total_cmp(&x.0));

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    let [br, bg, bb, ba] = BACKGROUND;
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(br, bg, bb, ba));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, wf, hf));

    for (_, idx, [r, g, b]) in faces {
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(project(verts[idx[0]], wf, hf)));
        for &i in &idx[1..] {
            path.line_to(point_to_cpu(project(verts[i], wf, hf)));
        }
        path.close_path();
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, 255));
        ctx.fill_path(&path);
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut pixmap);
    PixelBuffer {
        width: u32::from(w16),
        height: u32::from(h16),
        data: pixmap.data_as_u8_slice().to_vec(),
        premultiplied: true,
    }
}

fn face_normal(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> [f64; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len == 0.0 {
        return [0.0, 0.0, 0.0];
    }
    n.map(|c| c / len)
}
