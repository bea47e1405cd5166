use crate::foundation::core::{PixelBuffer, SurfaceSize};
use crate::surface::RenderSurface;
use std::cell::{Cell, RefCell};

/// Scriptable surface: records azimuth writes, yields once per composite.
pub(crate) struct FakeSurface {
    pub(crate) size: Cell<(u32, u32)>,
    pub(crate) density: Cell<f64>,
    pub(crate) azimuth: Cell<f64>,
    pub(crate) composites: Cell<u64>,
    pub(crate) azimuth_log: RefCell<Vec<f64>>,
    /// Drop the last pixel from every readback.
    pub(crate) short_readback: Cell<bool>,
}

impl FakeSurface {
    pub(crate) fn new(width: u32, height: u32, density: f64, azimuth: f64) -> Self {
        Self {
            size: Cell::new((width, height)),
            density: Cell::new(density),
            azimuth: Cell::new(azimuth),
            composites: Cell::new(0),
            azimuth_log: RefCell::new(Vec::new()),
            short_readback: Cell::new(false),
        }
    }

    pub(crate) fn state(&self) -> ((u32, u32), f64, f64) {
        (self.size.get(), self.density.get(), self.azimuth.get())
    }
}

impl RenderSurface for FakeSurface {
    fn azimuth(&self) -> f64 {
        self.azimuth.get()
    }

    fn set_azimuth(&self, radians: f64) {
        self.azimuth_log.borrow_mut().push(radians);
        self.azimuth.set(radians);
    }

    fn surface_size(&self) -> SurfaceSize {
        let (width, height) = self.size.get();
        SurfaceSize { width, height }
    }

    fn pixel_density(&self) -> f64 {
        self.density.get()
    }

    fn resize_surface(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }

    fn set_pixel_density(&self, density: f64) {
        self.density.set(density);
    }

    async fn next_composited_frame(&self) {
        self.composites.set(self.composites.get() + 1);
        tokio::task::yield_now().await;
    }

    fn read_pixels(&self) -> PixelBuffer {
        let (w, h) = self.surface_size().physical(self.density.get());
        let shade = (self.composites.get() % 256) as u8;
        let mut data = [shade, shade, shade, 255].repeat((w as usize) * (h as usize));
        if self.short_readback.get() {
            data.truncate(data.len().saturating_sub(4));
        }
        PixelBuffer {
            width: w,
            height: h,
            data,
            premultiplied: true,
        }
    }
}
