//! Pixel-accurate sets of rectangles: the region algebra used throughout
//! the engine (damage accounting, bounding shapes, ignore regions).
//!
//! Backed by [`pixman::Region32`]. This module is the only place in the
//! crate that names `pixman` types directly; everywhere else operates on
//! [`Region`].

use std::rc::Rc;

use pixman::Region32;

use crate::utils::{Point, Rectangle};

/// An owned, mutable set of pixel-aligned rectangles.
///
/// All operations are pure with respect to their arguments: `union`,
/// `intersect`, `subtract` and `translated` return new regions rather than
/// mutating in place, so callers are free to hand out [`Rc<Region>`]
/// (see [`SharedRegion`]) without fear of a later caller mutating shared
/// state from under them.
#[derive(Debug, Clone)]
pub struct Region(Region32);

/// A reference-counted, immutable region.
///
/// Used by the ignore-region cache (§4.5), where a window very frequently
/// inherits the exact region of the window above it unchanged; sharing
/// avoids an O(n²) blowup of region copies while scanning the stack.
pub type SharedRegion = Rc<Region>;

impl Default for Region {
    fn default() -> Self {
        Region::empty()
    }
}

impl Region {
    /// The empty region.
    pub fn empty() -> Self {
        Region(Region32::default())
    }

    /// A region consisting of a single rectangle.
    pub fn from_rect(rect: Rectangle) -> Self {
        if rect.is_empty() {
            return Region::empty();
        }
        Region(Region32::init_rect(
            rect.x(),
            rect.y(),
            rect.width() as u32,
            rect.height() as u32,
        ))
    }

    /// A region covering the union of `rects`.
    pub fn from_rects(rects: &[Rectangle]) -> Self {
        let boxes: Vec<pixman::Box32> = rects
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| pixman::Box32 {
                x1: r.x(),
                y1: r.y(),
                x2: r.x() + r.width(),
                y2: r.y() + r.height(),
            })
            .collect();
        Region(Region32::init_rects(&boxes))
    }

    /// True if the region contains no pixels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The union of `self` and `other`.
    pub fn union(&self, other: &Region) -> Region {
        Region(self.0.union(&other.0))
    }

    /// The intersection of `self` and `other`.
    pub fn intersect(&self, other: &Region) -> Region {
        Region(self.0.intersect(&other.0))
    }

    /// `self` with every pixel of `other` removed.
    pub fn subtract(&self, other: &Region) -> Region {
        Region(self.0.subtract(&other.0))
    }

    /// Returns a copy of this region translated by `delta`.
    pub fn translated(&self, delta: Point) -> Region {
        let mut copy = self.0.clone();
        copy.translate(delta.x, delta.y);
        Region(copy)
    }

    /// The rectangles making up this region, in the backend's canonical
    /// (non-overlapping, row-major) order.
    pub fn rectangles(&self) -> Vec<Rectangle> {
        self.0
            .rectangles()
            .iter()
            .map(|b| Rectangle::from_loc_and_size((b.x1, b.y1), (b.x2 - b.x1, b.y2 - b.y1)))
            .collect()
    }

    /// The bounding rectangle of every rectangle in this region.
    pub fn extents(&self) -> Rectangle {
        let b = self.0.extents();
        Rectangle::from_loc_and_size((b.x1, b.y1), (b.x2 - b.x1, b.y2 - b.y1))
    }

    /// Clips this region to `bounds`, returning a new region.
    pub fn clipped_to(&self, bounds: Rectangle) -> Region {
        self.intersect(&Region::from_rect(bounds))
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
