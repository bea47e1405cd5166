//! The renderer boundary and scoped ownership of its output size, pixel density and azimuth.

use crate::foundation::core::{PixelBuffer, SurfaceSize};
use std::future::Future;

/// The live rendering surface driven by an external renderer.
///
/// The capture core never renders. It only resizes the surface, changes its pixel density,
/// rotates the subject, waits for the renderer to composite, and reads pixels back. Methods
/// take `&self`; implementations own their interior state.
pub trait RenderSurface {
    /// Current subject azimuth in radians.
    fn azimuth(&self) -> f64;
    /// Rotate the subject to `radians`.
    fn set_azimuth(&self, radians: f64);
    /// Current logical surface size.
    fn surface_size(&self) -> SurfaceSize;
    /// Current pixel density (physical pixels per logical pixel).
    fn pixel_density(&self) -> f64;
    /// Resize the surface to a logical `width x height`.
    fn resize_surface(&self, width: u32, height: u32);
    /// Change the surface pixel density.
    fn set_pixel_density(&self, density: f64);
    /// Resolves once, after the renderer has composited its next frame.
    fn next_composited_frame(&self) -> impl Future<Output = ()>;
    /// Read back the most recently composited pixels.
    fn read_pixels(&self) -> PixelBuffer;
}

/// Surface state captured when a session acquires the surface.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSnapshot {
    /// Logical width before the session.
    pub original_width: u32,
    /// Logical height before the session.
    pub original_height: u32,
    /// Pixel density before the session.
    pub original_pixel_density: f64,
    /// Subject azimuth before the session.
    pub original_azimuth: f64,
}

impl SurfaceSnapshot {
    /// Read the current state of `surface`.
    pub fn capture<S: RenderSurface>(surface: &S) -> Self {
        let size = surface.surface_size();
        Self {
            original_width: size.width,
            original_height: size.height,
            original_pixel_density: surface.pixel_density(),
            original_azimuth: surface.azimuth(),
        }
    }

    /// Reapply the captured state to `surface`.
    pub fn apply<S: RenderSurface>(&self, surface: &S) {
        surface.resize_surface(self.original_width, self.original_height);
        surface.set_pixel_density(self.original_pixel_density);
        surface.set_azimuth(self.original_azimuth);
    }
}

/// Scoped reconfiguration of a [`RenderSurface`].
///
/// `acquire` applies the session size and density; the snapshot is restored exactly once,
/// either through [`SurfaceLease::restore`] or when the lease is dropped (early return,
/// error, or a dropped future).
pub struct SurfaceLease<'s, S: RenderSurface> {
    surface: &'s S,
    snapshot: SurfaceSnapshot,
    restored: bool,
}

impl<'s, S: RenderSurface> SurfaceLease<'s, S> {
    /// Snapshot `surface`, then resize it to `size` at `pixel_density`.
    pub fn acquire(surface: &'s S, size: SurfaceSize, pixel_density: f64) -> Self {
        let snapshot = SurfaceSnapshot::capture(surface);
        surface.resize_surface(size.width, size.height);
        surface.set_pixel_density(pixel_density);
        tracing::debug!(
            width = size.width,
            height = size.height,
            pixel_density,
            "surface acquired"
        );
        Self {
            surface,
            snapshot,
            restored: false,
        }
    }

    /// The state captured at acquisition.
    pub fn snapshot(&self) -> &SurfaceSnapshot {
        &self.snapshot
    }

    /// The leased surface.
    pub fn surface(&self) -> &'s S {
        self.surface
    }

    /// Restore the captured state and end the lease.
    pub fn restore(mut self) {
        self.restore_once();
    }

    fn restore_once(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        self.snapshot.apply(self.surface);
        tracing::debug!(
            width = self.snapshot.original_width,
            height = self.snapshot.original_height,
            "surface restored"
        );
    }
}

impl<S: RenderSurface> Drop for SurfaceLease<'_, S> {
    fn drop(&mut self) {
        self.restore_once();
    }
}
