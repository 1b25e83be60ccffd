//! Geometry operations: cropping, quarter-turn rotation and mirroring.
//!
//! All operations take the buffer by value. Cases that leave the image
//! unchanged (an empty crop rect, a zero rotation) hand the same buffer back;
//! everything else returns a newly allocated buffer in the input's format.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downwards
//! - Crop rectangles are in pixels, right/bottom exclusive
//! - Positive rotation angles turn the image clockwise as displayed

mod crop;
mod flip;
mod rotation;

pub use crop::crop;
pub use flip::flip;
pub use rotation::{rotate, rotated_dimensions, QuarterTurn};
