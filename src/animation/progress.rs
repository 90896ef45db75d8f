//! Progress arc angle math

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::timer_state::clamp_non_negative;

/// Angle (degrees) at which every sweep starts: the top of the circle
pub const REFERENCE_ANGLE: f64 = 270.0;

/// Length of the stroke reveal played for each one-second step
pub const STEP_ANIMATION: Duration = Duration::from_secs(1);

const FULL_TURN: f64 = 360.0;

/// Size of the surface the arc is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: clamp_non_negative(width),
            height: clamp_non_negative(height),
        }
    }
}

/// Circle the progress arc is stroked along
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub thickness: f64,
}

impl ArcGeometry {
    /// Fit a circle into the canvas, keeping the whole stroke inside it.
    pub fn for_canvas(canvas: CanvasSize, thickness: f64) -> Self {
        let thickness = clamp_non_negative(thickness);
        Self {
            center_x: canvas.width / 2.0,
            center_y: canvas.height / 2.0,
            radius: (canvas.width / 2.0 - thickness / 2.0).max(0.0),
            thickness,
        }
    }
}

/// A clockwise arc between two angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub start_degrees: f64,
    pub end_degrees: f64,
}

impl ArcSegment {
    pub fn start_radians(&self) -> f64 {
        self.start_degrees.to_radians()
    }

    pub fn end_radians(&self) -> f64 {
        self.end_degrees.to_radians()
    }
}

/// Linear reveal of a freshly stroked segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeAnimation {
    pub duration_ms: u64,
    pub from: f64,
    pub to: f64,
}

impl StrokeAnimation {
    fn one_step() -> Self {
        Self {
            duration_ms: STEP_ANIMATION.as_millis() as u64,
            from: 0.0,
            to: 1.0,
        }
    }
}

/// Instruction handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Remove every layer from the canvas
    Clear,
    /// Add one segment on top of the existing ones, animated
    Stroke {
        geometry: ArcGeometry,
        segment: ArcSegment,
        animation: StrokeAnimation,
    },
    /// Clear, then draw a single segment without animation
    Redraw {
        geometry: ArcGeometry,
        segment: ArcSegment,
    },
    /// Clear, then draw the closed circle without animation
    FullCircle { geometry: ArcGeometry },
}

/// Translates elapsed countdown time into arc angles.
///
/// Elapsed steps are tracked instead of accumulated angles, so
/// [`advance_one_step`](Self::advance_one_step) repeated `n` times lands on
/// exactly the angle [`replay_to`](Self::replay_to) computes for `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressAnimator {
    geometry: ArcGeometry,
    degrees_per_second: f64,
    elapsed: f64,
    start_angle: f64,
    end_angle: f64,
}

impl ProgressAnimator {
    pub fn initialize(total_duration: f64, arc_thickness: f64, canvas: CanvasSize) -> Self {
        let total_duration = clamp_non_negative(total_duration);
        let degrees_per_second = if total_duration > 0.0 {
            FULL_TURN / total_duration
        } else {
            0.0
        };

        Self {
            geometry: ArcGeometry::for_canvas(canvas, arc_thickness),
            degrees_per_second,
            elapsed: 0.0,
            start_angle: REFERENCE_ANGLE,
            end_angle: REFERENCE_ANGLE,
        }
    }

    pub fn geometry(&self) -> ArcGeometry {
        self.geometry
    }

    pub fn degrees_per_second(&self) -> f64 {
        self.degrees_per_second
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    /// End angle for a given amount of elapsed time, modulo a full turn
    pub fn angle_for(&self, elapsed_seconds: f64) -> f64 {
        (REFERENCE_ANGLE + self.degrees_per_second * clamp_non_negative(elapsed_seconds))
            .rem_euclid(FULL_TURN)
    }

    /// Back to zero progress
    pub fn reset(&mut self) -> DrawCommand {
        self.elapsed = 0.0;
        self.start_angle = REFERENCE_ANGLE;
        self.end_angle = REFERENCE_ANGLE;
        DrawCommand::Clear
    }

    /// Sweep one more second's worth of degrees, animated
    pub fn advance_one_step(&mut self) -> DrawCommand {
        let previous = self.end_angle;
        self.elapsed += 1.0;
        self.end_angle = self.angle_for(self.elapsed);
        self.start_angle = previous;

        DrawCommand::Stroke {
            geometry: self.geometry,
            segment: ArcSegment {
                start_degrees: previous,
                end_degrees: self.end_angle,
            },
            animation: StrokeAnimation::one_step(),
        }
    }

    /// Jump straight to the arc for `elapsed_seconds`, without animation
    pub fn replay_to(&mut self, elapsed_seconds: f64) -> DrawCommand {
        self.elapsed = clamp_non_negative(elapsed_seconds);
        self.start_angle = REFERENCE_ANGLE;
        self.end_angle = self.angle_for(self.elapsed);

        DrawCommand::Redraw {
            geometry: self.geometry,
            segment: ArcSegment {
                start_degrees: REFERENCE_ANGLE,
                end_degrees: self.end_angle,
            },
        }
    }

    /// Closed circle for a finished countdown
    pub fn mark_complete(&mut self) -> DrawCommand {
        self.start_angle = REFERENCE_ANGLE;
        self.end_angle = REFERENCE_ANGLE;
        DrawCommand::FullCircle {
            geometry: self.geometry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator(total: f64) -> ProgressAnimator {
        ProgressAnimator::initialize(total, 10.0, CanvasSize::new(40.0, 40.0))
    }

    #[test]
    fn initialize_sets_rate_and_zero_progress() {
        let animator = animator(90.0);
        assert_eq!(animator.degrees_per_second(), 4.0);
        assert_eq!(animator.end_angle(), REFERENCE_ANGLE);
        assert_eq!(animator.geometry().radius, 15.0);
    }

    #[test]
    fn zero_duration_never_moves() {
        let mut animator = animator(0.0);
        animator.advance_one_step();
        assert_eq!(animator.end_angle(), REFERENCE_ANGLE);
    }

    #[test]
    fn replay_matches_sequential_steps() {
        let mut stepped = animator(5.0);
        for _ in 0..3 {
            stepped.advance_one_step();
        }

        let mut replayed = animator(5.0);
        replayed.replay_to(3.0);

        assert_eq!(stepped.end_angle(), replayed.end_angle());
        assert_eq!(replayed.end_angle(), (REFERENCE_ANGLE + 216.0) % 360.0);
    }

    #[test]
    fn replay_is_deterministic() {
        let mut animator = animator(7.0);
        animator.advance_one_step();
        let first = animator.replay_to(4.5);
        let second = animator.replay_to(4.5);
        assert_eq!(first, second);
    }

    #[test]
    fn steps_wrap_past_full_turn() {
        let mut animator = animator(4.0);
        let command = animator.advance_one_step();
        assert_eq!(animator.end_angle(), 0.0);
        match command {
            DrawCommand::Stroke {
                segment, animation, ..
            } => {
                assert_eq!(segment.start_degrees, 270.0);
                assert_eq!(segment.end_degrees, 0.0);
                assert!((segment.start_radians() - 1.5 * std::f64::consts::PI).abs() < 1e-12);
                assert_eq!(segment.end_radians(), 0.0);
                assert_eq!(animation.duration_ms, 1000);
            }
            other => panic!("expected stroke, got {:?}", other),
        }
    }

    #[test]
    fn full_cycle_returns_to_reference() {
        let mut animator = animator(6.0);
        for _ in 0..6 {
            animator.advance_one_step();
        }
        assert!((animator.end_angle() - REFERENCE_ANGLE).abs() < 1e-9);
    }

    #[test]
    fn mark_complete_draws_full_circle() {
        let mut animator = animator(6.0);
        assert!(matches!(
            animator.mark_complete(),
            DrawCommand::FullCircle { .. }
        ));
    }
}
