//! Small self-contained utilities shared across the engine: geometry and
//! the x11rb/calloop glue.

mod geometry;

pub mod x11rb;

pub use self::geometry::{Point, Rectangle, Size};
