//! The rendering backend abstraction (§4.6).
//!
//! The engine only ever talks to a concrete renderer (XRender, GL, ...)
//! through the [`Backend`] trait; those concrete renderers are out of
//! scope for this crate. [`pixman_backend::PixmanBackend`] is a reference
//! implementation used by the engine's own tests, and [`test::TestBackend`]
//! is a call-recording fake used by integration tests that don't need real
//! pixels at all.

pub mod pixman_backend;
pub mod test;

use crate::error::BackendError;
use crate::region::Region;

/// Opaque handle to a backend-owned image (a window body, a rendered
/// shadow, or the root tile). Each handle is owned by exactly one window
/// record or by the session's root tile; it is released on unmap, destroy,
/// size change, or backend teardown (§5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

/// A mutation applied in-place to an image by [`Backend::image_op`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageOp {
    /// Invert every pixel's color, ignoring `region_op`/`region_visible`.
    InvertColorAll,
    /// Darken every pixel, ignoring `region_op`/`region_visible`.
    DimAll { amount: f64 },
    /// Multiply alpha by `factor` within `region_op` only.
    ApplyAlpha { factor: f64 },
    /// Multiply alpha by `factor` across the whole image.
    ApplyAlphaAll { factor: f64 },
    /// Resize the image to `(width, height)`, tiling its content.
    ResizeTile { width: i32, height: i32 },
}

/// Driver identification returned by [`Backend::detect_driver`], used only
/// to select workarounds; the engine does not interpret its value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverTag(pub &'static str);

/// The capability set a concrete rendering backend must provide (§4.6).
///
/// Any operation can fail; per the failure policy, only [`Backend::init`]
/// failing aborts redirection start. Every other failure is handled by the
/// caller: the affected window is marked `IMAGE_ERROR` and skipped until a
/// later rebind succeeds.
pub trait Backend {
    /// The largest number of frames a `buffer_age` result can report; also
    /// the size of the damage ring the engine allocates.
    fn max_buffer_age(&self) -> u32;

    /// Binds `pixmap` (already redirected by the X server) to a new image.
    /// If `owned` is true, the backend takes over the pixmap's lifetime.
    fn bind_pixmap(&mut self, pixmap: u32, visual: u32, owned: bool) -> Result<ImageHandle, BackendError>;

    /// Renders a drop shadow of size `(width + 2r, height + 2r)` from a
    /// precomputed convolution kernel and an RGBA color.
    fn render_shadow(
        &mut self,
        width: i32,
        height: i32,
        radius: i32,
        color: (f64, f64, f64, f64),
    ) -> Result<ImageHandle, BackendError>;

    /// Releases a previously bound or rendered image.
    fn release_image(&mut self, image: ImageHandle);

    /// Deep-copies `image` so the copy can be mutated independently by
    /// [`Backend::image_op`].
    fn copy(&mut self, image: ImageHandle) -> Result<ImageHandle, BackendError>;

    /// Mutates `image` in place. `region_op` is a hard clip; `region_visible`
    /// is an optimization hint the backend may ignore.
    fn image_op(
        &mut self,
        image: ImageHandle,
        op: ImageOp,
        region_op: &Region,
        region_visible: &Region,
    ) -> Result<(), BackendError>;

    /// Composes `image` into the render target at `(dst_x, dst_y)`, clipped
    /// to `region_paint` with `region_visible` as an optimization hint.
    fn compose(
        &mut self,
        image: ImageHandle,
        dst_x: i32,
        dst_y: i32,
        region_paint: &Region,
        region_visible: &Region,
    ) -> Result<(), BackendError>;

    /// Fills `region` with a flat color. Optional: used only by debug
    /// overlays; the default implementation does nothing.
    fn fill(&mut self, _color: (f64, f64, f64, f64), _region: &Region) -> Result<(), BackendError> {
        Ok(())
    }

    /// Blurs the render target in place within `region_blur`, scaled by
    /// `opacity`; `region_visible` is an optimization hint.
    fn blur(&mut self, opacity: f64, region_blur: &Region, region_visible: &Region) -> Result<(), BackendError>;

    /// True if `image` is fully transparent. Needed because custom shaders
    /// can make an otherwise-opaque image transparent.
    fn is_image_transparent(&self, image: ImageHandle) -> bool;

    /// Returns how many frames ago the current back buffer was last
    /// displayed, or `-1` if it has never been presented.
    fn buffer_age(&self) -> i32;

    /// Flips or copies the back buffer to the screen.
    fn present(&mut self) -> Result<(), BackendError>;

    /// Optional pre-frame hook, called with the frame's damage region
    /// before any `compose`/`image_op` calls.
    fn prepare(&mut self, _region_damage: &Region) {}

    /// Optional hook for backends that can adapt in place to a root
    /// geometry change; if unimplemented the engine destroys and
    /// reinitializes the backend instead.
    fn root_change(&mut self, _width: i32, _height: i32) -> Result<(), BackendError> {
        Err(BackendError::RootChangeUnsupported)
    }

    /// Returns a driver tag used only to select workarounds.
    fn detect_driver(&self) -> DriverTag {
        DriverTag("unknown")
    }
}
