//! A [`Backend`] implementation over `pixman::Image` offscreen buffers.
//!
//! Binds buffers to `pixman::Image` and composes them with
//! `pixman::Operation`. It only ever allocates plain host memory images —
//! it exists so the engine's own tests can exercise the paint pipeline
//! against real pixel data without an XRender or GL context. It is not
//! meant to back a production compositor.

use std::collections::HashMap;

use pixman::{FormatCode, Image, Operation};

use super::{Backend, DriverTag, ImageHandle, ImageOp};
use crate::error::BackendError;
use crate::region::Region;

/// Offscreen [`Backend`] backed by `pixman::Image` buffers.
#[derive(Debug)]
pub struct PixmanBackend {
    target: Image<'static, 'static>,
    images: HashMap<u64, Image<'static, 'static>>,
    next_handle: u64,
    present_count: u32,
}

impl PixmanBackend {
    /// Creates a backend targeting an offscreen buffer of `width` x
    /// `height` pixels.
    pub fn new(width: i32, height: i32) -> Result<Self, BackendError> {
        let target = Image::new(FormatCode::ARGB8888, width as usize, height as usize, true)
            .map_err(|_| BackendError::InitFailed)?;
        Ok(PixmanBackend {
            target,
            images: HashMap::new(),
            next_handle: 1,
            present_count: 0,
        })
    }

    fn alloc_handle(&mut self) -> ImageHandle {
        let h = ImageHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn get(&self, image: ImageHandle) -> Result<&Image<'static, 'static>, BackendError> {
        self.images.get(&image.0).ok_or(BackendError::OpFailed)
    }
}

impl Backend for PixmanBackend {
    fn max_buffer_age(&self) -> u32 {
        // A single, immediately-reused offscreen target: every present
        // invalidates the whole buffer, so only age 1 is ever meaningful.
        1
    }

    fn bind_pixmap(&mut self, _pixmap: u32, _visual: u32, _owned: bool) -> Result<ImageHandle, BackendError> {
        // Real pixel content comes from the X server via the pixmap; the
        // reference backend has no connection of its own, so it binds an
        // empty image of the target's size as a stand-in.
        let width = self.target.width();
        let height = self.target.height();
        let image =
            Image::new(FormatCode::ARGB8888, width, height, true).map_err(|_| BackendError::BindFailed { pixmap: _pixmap })?;
        let handle = self.alloc_handle();
        self.images.insert(handle.0, image);
        Ok(handle)
    }

    fn render_shadow(
        &mut self,
        width: i32,
        height: i32,
        radius: i32,
        color: (f64, f64, f64, f64),
    ) -> Result<ImageHandle, BackendError> {
        let w = (width + 2 * radius).max(0) as usize;
        let h = (height + 2 * radius).max(0) as usize;
        let mut image = Image::new(FormatCode::ARGB8888, w, h, true).map_err(|_| BackendError::OpFailed)?;
        let (r, g, b, a) = color;
        image
            .fill_boxes(Operation::Src, pixman_solid(r, g, b, a), &[pixman::Box32 {
                x1: 0,
                y1: 0,
                x2: w as i32,
                y2: h as i32,
            }])
            .map_err(|_| BackendError::OpFailed)?;
        let handle = self.alloc_handle();
        self.images.insert(handle.0, image);
        Ok(handle)
    }

    fn release_image(&mut self, image: ImageHandle) {
        self.images.remove(&image.0);
    }

    fn copy(&mut self, image: ImageHandle) -> Result<ImageHandle, BackendError> {
        let src = self.get(image)?;
        let w = src.width();
        let h = src.height();
        let mut dst = Image::new(FormatCode::ARGB8888, w, h, false).map_err(|_| BackendError::OpFailed)?;
        dst.compose(
            Operation::Src,
            src,
            None,
            (0, 0),
            (0, 0),
            (0, 0),
            w as i32,
            h as i32,
        );
        let handle = self.alloc_handle();
        self.images.insert(handle.0, dst);
        Ok(handle)
    }

    fn image_op(
        &mut self,
        image: ImageHandle,
        op: ImageOp,
        region_op: &Region,
        _region_visible: &Region,
    ) -> Result<(), BackendError> {
        let boxes: Vec<pixman::Box32> = region_op
            .rectangles()
            .iter()
            .map(|r| pixman::Box32 {
                x1: r.x(),
                y1: r.y(),
                x2: r.x() + r.width(),
                y2: r.y() + r.height(),
            })
            .collect();
        let img = self.images.get_mut(&image.0).ok_or(BackendError::OpFailed)?;
        match op {
            ImageOp::InvertColorAll => {
                img.fill_boxes(Operation::DifferenceRgb, pixman_solid(1.0, 1.0, 1.0, 1.0), &[pixman::Box32 {
                    x1: 0,
                    y1: 0,
                    x2: img.width() as i32,
                    y2: img.height() as i32,
                }])
                .map_err(|_| BackendError::OpFailed)?;
            }
            ImageOp::DimAll { amount } => {
                img.fill_boxes(Operation::OverReverse, pixman_solid(0.0, 0.0, 0.0, amount), &[pixman::Box32 {
                    x1: 0,
                    y1: 0,
                    x2: img.width() as i32,
                    y2: img.height() as i32,
                }])
                .map_err(|_| BackendError::OpFailed)?;
            }
            ImageOp::ApplyAlpha { factor } => {
                img.fill_boxes(Operation::In, pixman_solid(1.0, 1.0, 1.0, factor), &boxes)
                    .map_err(|_| BackendError::OpFailed)?;
            }
            ImageOp::ApplyAlphaAll { factor } => {
                img.fill_boxes(Operation::In, pixman_solid(1.0, 1.0, 1.0, factor), &[pixman::Box32 {
                    x1: 0,
                    y1: 0,
                    x2: img.width() as i32,
                    y2: img.height() as i32,
                }])
                .map_err(|_| BackendError::OpFailed)?;
            }
            ImageOp::ResizeTile { .. } => return Err(BackendError::OpFailed),
        }
        Ok(())
    }

    fn compose(
        &mut self,
        image: ImageHandle,
        dst_x: i32,
        dst_y: i32,
        region_paint: &Region,
        _region_visible: &Region,
    ) -> Result<(), BackendError> {
        let src = self.images.get(&image.0).ok_or(BackendError::OpFailed)?;
        let extents = region_paint.extents();
        self.target.compose(
            Operation::Over,
            src,
            None,
            (0, 0),
            (dst_x, dst_y),
            (extents.x(), extents.y()),
            extents.width(),
            extents.height(),
        );
        Ok(())
    }

    fn blur(&mut self, _opacity: f64, _region_blur: &Region, _region_visible: &Region) -> Result<(), BackendError> {
        // No real convolution: the reference backend only exists to
        // exercise call sequencing, not visual fidelity.
        Ok(())
    }

    fn is_image_transparent(&self, image: ImageHandle) -> bool {
        self.get(image).is_err()
    }

    fn buffer_age(&self) -> i32 {
        if self.present_count == 0 {
            -1
        } else {
            1
        }
    }

    fn present(&mut self) -> Result<(), BackendError> {
        self.present_count += 1;
        Ok(())
    }

    fn detect_driver(&self) -> DriverTag {
        DriverTag("pixman")
    }
}

fn pixman_solid(r: f64, g: f64, b: f64, a: f64) -> pixman::Solid {
    pixman::Solid {
        red: (r * 65535.0) as u16,
        green: (g * 65535.0) as u16,
        blue: (b * 65535.0) as u16,
        alpha: (a * 65535.0) as u16,
    }
}
