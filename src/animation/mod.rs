//! Progress arc animation
//!
//! This module turns elapsed countdown time into arc angles and the draw
//! commands a renderer applies to show them.

pub mod canvas;
pub mod progress;

// Re-export main types
pub use canvas::{Canvas, Layer, Renderer};
pub use progress::{
    ArcGeometry, ArcSegment, CanvasSize, DrawCommand, ProgressAnimator, StrokeAnimation,
    REFERENCE_ANGLE,
};
