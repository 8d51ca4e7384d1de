//! The ignore-region cache: per-window "pixels occluded by strictly higher
//! opaque windows" (§4.5), maintained incrementally during preprocess.

use std::rc::Rc;

use crate::region::{Region, SharedRegion};
use crate::window::{PaintMode, WindowRecord};

/// Accumulates the running "ignore region so far" while preprocess scans
/// the stack top-to-bottom, and repairs each window's cached `reg_ignore`.
///
/// Usage: construct once per preprocess pass, then call
/// [`IgnoreScan::visit`] for each window from top to bottom in stack order.
#[derive(Debug, Default)]
pub struct IgnoreScan {
    last_reg_ignore: SharedRegion,
}

impl IgnoreScan {
    /// Starts a new scan with an empty running ignore region.
    pub fn new() -> Self {
        IgnoreScan {
            last_reg_ignore: Rc::new(Region::empty()),
        }
    }

    /// Visits one window during the top-down scan (§4.5 "Maintenance").
    ///
    /// If `window.reg_ignore_valid` is false, its cached region is replaced
    /// with the running region accumulated so far (a cheap `Rc` clone). If
    /// the window is opaque ([`PaintMode::Solid`]), its own opaque
    /// contribution is unioned into the running region for windows further
    /// down to inherit.
    pub fn visit(&mut self, window: &mut WindowRecord) {
        if !window.reg_ignore_valid {
            window.reg_ignore = Some(Rc::clone(&self.last_reg_ignore));
            window.reg_ignore_valid = true;
        } else if window.reg_ignore.is_none() {
            window.reg_ignore = Some(Rc::clone(&self.last_reg_ignore));
        }

        if window.paint_mode == PaintMode::Solid && window.to_paint {
            let contribution = opaque_contribution(window);
            if !contribution.is_empty() {
                let merged = self.last_reg_ignore.union(&contribution);
                self.last_reg_ignore = Rc::new(merged);
            }
        }
    }
}

/// The region a solid (fully opaque) window itself occludes: its bounding
/// shape translated to root coordinates, minus its WM frame if the frame
/// is translucent (§4.5, §4.7 step 3g).
pub fn opaque_contribution(window: &WindowRecord) -> Region {
    let translated = window.bounding_shape.translated(window.geometry.loc);
    if window.frame_opacity >= 1.0 {
        return translated;
    }
    let (left, right, top, bottom) = window.frame_extents;
    if left == 0 && right == 0 && top == 0 && bottom == 0 {
        return translated;
    }
    let g = window.geometry;
    let body = crate::utils::Rectangle::from_loc_and_size(
        (g.x() + left, g.y() + top),
        (
            (g.width() - left - right).max(0),
            (g.height() - top - bottom).max(0),
        ),
    );
    translated.intersect(&Region::from_rect(body))
}
