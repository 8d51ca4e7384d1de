//! The paint preprocess and pipeline (§4.7, §4.8): deciding what to draw
//! each frame, and then drawing it.

mod pipeline;
mod preprocess;

pub use pipeline::paint_frame;
pub use preprocess::{preprocess, PreprocessOutcome};
