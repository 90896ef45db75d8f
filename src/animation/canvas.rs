//! Render targets for progress arcs

use serde::Serialize;

use super::progress::{ArcGeometry, ArcSegment, DrawCommand};

/// Anything that can apply draw commands produced by a [`ProgressAnimator`](super::ProgressAnimator)
pub trait Renderer: Send {
    fn render(&mut self, command: DrawCommand);
}

/// One stroked layer on a [`Canvas`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layer {
    pub segment: ArcSegment,
    pub animated: bool,
}

/// Layer-recording renderer backing a timer row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Canvas {
    geometry: Option<ArcGeometry>,
    layers: Vec<Layer>,
    complete: bool,
    commands_applied: u64,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn geometry(&self) -> Option<ArcGeometry> {
        self.geometry
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn commands_applied(&self) -> u64 {
        self.commands_applied
    }

    /// Angle the outermost layer currently ends at
    pub fn end_angle(&self) -> Option<f64> {
        self.layers.last().map(|layer| layer.segment.end_degrees)
    }

    fn clear(&mut self) {
        self.layers.clear();
        self.complete = false;
    }
}

impl Renderer for Canvas {
    fn render(&mut self, command: DrawCommand) {
        self.commands_applied += 1;
        match command {
            DrawCommand::Clear => self.clear(),
            DrawCommand::Stroke {
                geometry, segment, ..
            } => {
                self.geometry = Some(geometry);
                self.complete = false;
                self.layers.push(Layer {
                    segment,
                    animated: true,
                });
            }
            DrawCommand::Redraw { geometry, segment } => {
                self.clear();
                self.geometry = Some(geometry);
                self.layers.push(Layer {
                    segment,
                    animated: false,
                });
            }
            DrawCommand::FullCircle { geometry } => {
                self.clear();
                self.geometry = Some(geometry);
                self.complete = true;
            }
        }
    }
}
