//! Core types for retroreflective target detection.
//!
//! This crate is intentionally small. It holds the BGR frame buffer shared by
//! a pipeline runner and its collaborators, the integer geometry every stage
//! speaks (points, bounding boxes, contours) and the process-wide logger.
//! It does *not* know about thresholds, filters or telemetry.

mod geometry;
mod image;
mod logger;

pub use geometry::{convex_hull, polygon_area, BoundingBox, Contour};
pub use image::{BgrFrame, BgrFrameView, FrameError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

/// Integer pixel coordinate used by contours.
pub type PixelPoint = nalgebra::Point2<i32>;
