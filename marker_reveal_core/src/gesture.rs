// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap versus drag-rotate disambiguation.
//!
//! A [`GestureClassifier`] consumes a pointer-down / move / up stream. A
//! session that ends before [`GestureConfig::tap_max_duration`] and whose
//! path stays under [`GestureConfig::tap_slop`] is a [`Classification::Tap`].
//! Anything else is a [`Classification::Drag`].
//!
//! Drag deltas are produced incrementally from consecutive pointer positions,
//! never re-derived from the absolute position. Moves are held back while the
//! session is still undetermined; once the session crosses either threshold
//! it is promoted to a drag and the held-back delta is released in one go.
//! A session that ends as a tap therefore never rotates the object.

use kurbo::{Point, Vec2};

use crate::time::{Duration, HostTime};
use crate::transform::Transform3d;

/// Thresholds and scaling for pointer gestures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Sessions at least this long are drags.
    pub tap_max_duration: Duration,
    /// Sessions whose path reaches this many pixels are drags.
    pub tap_slop: f64,
    /// Radians of rotation per pixel of pointer travel.
    pub sensitivity: f64,
}

impl GestureConfig {
    /// Touch-screen defaults: 200 ms, 10 px, 0.01 rad/px.
    #[must_use]
    pub const fn touch() -> Self {
        Self {
            tap_max_duration: Duration::from_millis(200),
            tap_slop: 10.0,
            sensitivity: 0.01,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::touch()
    }
}

/// How a pointer session was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Not decided yet; the pointer is still down.
    Undetermined,
    /// A short, still press. May trigger a face action.
    Tap,
    /// A rotation. Never triggers a face action.
    Drag,
}

/// Incremental rotation produced by a drag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationDelta {
    /// Change around the vertical axis, radians.
    pub yaw: f64,
    /// Change around the horizontal axis, radians.
    pub pitch: f64,
}

/// Accumulated rotation of the interactive object.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObjectRotation {
    /// Rotation around the X axis, radians.
    pub pitch: f64,
    /// Rotation around the Y axis, radians.
    pub yaw: f64,
}

impl ObjectRotation {
    /// No rotation.
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
    };

    /// Adds a drag delta.
    pub fn apply(&mut self, delta: RotationDelta) {
        self.yaw += delta.yaw;
        self.pitch += delta.pitch;
    }

    /// Returns the rotation as a transform (pitch applied after yaw).
    #[must_use]
    pub fn to_transform(self) -> Transform3d {
        Transform3d::from_rotation_x(self.pitch) * Transform3d::from_rotation_y(self.yaw)
    }
}

/// Final result of one pointer session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureOutcome {
    /// [`Classification::Tap`] or [`Classification::Drag`].
    pub classification: Classification,
    /// Time between pointer-down and pointer-up.
    pub duration: Duration,
    /// Total pointer travel in pixels.
    pub path_length: f64,
}

#[derive(Clone, Copy, Debug)]
struct GestureSession {
    started_at: HostTime,
    last: Point,
    path_length: f64,
    /// Travel held back while undetermined.
    pending: Vec2,
    classification: Classification,
}

/// Classifies pointer sessions.
#[derive(Clone, Debug)]
pub struct GestureClassifier {
    config: GestureConfig,
    session: Option<GestureSession>,
}

impl GestureClassifier {
    /// Creates a classifier with the given thresholds.
    #[must_use]
    pub const fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Returns the thresholds in use.
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Returns `true` while a pointer is down.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the classification of the session in progress, if any.
    #[must_use]
    pub fn current(&self) -> Option<Classification> {
        self.session.map(|s| s.classification)
    }

    /// Starts a session, discarding any unfinished one.
    pub fn pointer_down(&mut self, now: HostTime, point: Point) {
        self.session = Some(GestureSession {
            started_at: now,
            last: point,
            path_length: 0.0,
            pending: Vec2::ZERO,
            classification: Classification::Undetermined,
        });
    }

    /// Feeds a pointer move.
    ///
    /// Returns the rotation to apply once the session is a drag. Moves with
    /// no session, or with a non-finite position, are ignored.
    pub fn pointer_move(&mut self, now: HostTime, point: Point) -> Option<RotationDelta> {
        let config = self.config;
        let session = self.session.as_mut()?;
        if !point.is_finite() {
            return None;
        }
        let step = point - session.last;
        session.last = point;
        session.path_length += step.hypot();

        match session.classification {
            Classification::Drag => Some(to_rotation(step, config.sensitivity)),
            _ => {
                session.pending += step;
                let elapsed = now.saturating_duration_since(session.started_at);
                if session.path_length >= config.tap_slop || elapsed >= config.tap_max_duration {
                    session.classification = Classification::Drag;
                    let flushed = core::mem::replace(&mut session.pending, Vec2::ZERO);
                    Some(to_rotation(flushed, config.sensitivity))
                } else {
                    None
                }
            }
        }
    }

    /// Ends the session and classifies it exactly once.
    ///
    /// Returns `None` if no session was in progress.
    pub fn pointer_up(&mut self, now: HostTime) -> Option<GestureOutcome> {
        let session = self.session.take()?;
        let duration = now.saturating_duration_since(session.started_at);
        let classification = match session.classification {
            Classification::Drag => Classification::Drag,
            _ if duration < self.config.tap_max_duration
                && session.path_length < self.config.tap_slop =>
            {
                Classification::Tap
            }
            _ => Classification::Drag,
        };
        Some(GestureOutcome {
            classification,
            duration,
            path_length: session.path_length,
        })
    }

    /// Abandons the session without classifying it.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}

fn to_rotation(travel: Vec2, sensitivity: f64) -> RotationDelta {
    RotationDelta {
        yaw: travel.x * sensitivity,
        pitch: -travel.y * sensitivity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(GestureConfig::touch())
    }

    #[test]
    fn quick_still_press_is_a_tap() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::new(50.0, 50.0));
        assert_eq!(g.pointer_move(HostTime(40), Point::new(52.0, 51.0)), None);
        let outcome = g.pointer_up(HostTime(120)).unwrap();
        assert_eq!(outcome.classification, Classification::Tap);
        assert!(!g.is_active());
    }

    #[test]
    fn long_press_is_a_drag() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        let outcome = g.pointer_up(HostTime(200)).unwrap();
        assert_eq!(outcome.classification, Classification::Drag);
    }

    #[test]
    fn travel_beyond_slop_is_a_drag() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        let delta = g.pointer_move(HostTime(30), Point::new(12.0, 0.0)).unwrap();
        assert!((delta.yaw - 0.12).abs() < 1e-12);
        assert_eq!(g.current(), Some(Classification::Drag));
        let outcome = g.pointer_up(HostTime(60)).unwrap();
        assert_eq!(outcome.classification, Classification::Drag);
    }

    #[test]
    fn back_and_forth_counts_path_not_displacement() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        assert_eq!(g.pointer_move(HostTime(10), Point::new(6.0, 0.0)), None);
        // Back to the start: displacement 0, path 12.
        let flushed = g.pointer_move(HostTime(20), Point::ORIGIN).unwrap();
        assert!(flushed.yaw.abs() < 1e-12);
        assert_eq!(
            g.pointer_up(HostTime(30)).unwrap().classification,
            Classification::Drag
        );
    }

    #[test]
    fn drag_deltas_are_incremental() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        let first = g.pointer_move(HostTime(10), Point::new(0.0, 20.0)).unwrap();
        let second = g.pointer_move(HostTime(20), Point::new(0.0, 25.0)).unwrap();
        // Dragging down pitches the object backwards.
        assert!((first.pitch + 0.20).abs() < 1e-12);
        assert!((second.pitch + 0.05).abs() < 1e-12);
    }

    #[test]
    fn slow_drift_is_promoted_when_time_runs_out() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        assert_eq!(g.pointer_move(HostTime(100), Point::new(3.0, 0.0)), None);
        let flushed = g.pointer_move(HostTime(250), Point::new(4.0, 0.0)).unwrap();
        // Everything held back so far is released at promotion.
        assert!((flushed.yaw - 0.04).abs() < 1e-12);
    }

    #[test]
    fn up_without_down_is_ignored() {
        let mut g = classifier();
        assert_eq!(g.pointer_up(HostTime(5)), None);
        assert_eq!(g.pointer_move(HostTime(5), Point::ORIGIN), None);
    }

    #[test]
    fn classification_happens_once() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        assert!(g.pointer_up(HostTime(50)).is_some());
        assert_eq!(g.pointer_up(HostTime(60)), None);
    }

    #[test]
    fn cancel_discards_the_session() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        g.cancel();
        assert_eq!(g.pointer_up(HostTime(10)), None);
    }

    #[test]
    fn non_finite_moves_are_ignored() {
        let mut g = classifier();
        g.pointer_down(HostTime(0), Point::ORIGIN);
        assert_eq!(g.pointer_move(HostTime(5), Point::new(f64::NAN, 0.0)), None);
        assert_eq!(
            g.pointer_up(HostTime(50)).unwrap().classification,
            Classification::Tap
        );
    }

    #[test]
    fn rotation_accumulates_and_converts() {
        let mut rotation = ObjectRotation::ZERO;
        rotation.apply(RotationDelta {
            yaw: 0.5,
            pitch: -0.25,
        });
        rotation.apply(RotationDelta {
            yaw: 0.5,
            pitch: 0.0,
        });
        assert_eq!(rotation.yaw, 1.0);
        assert_eq!(rotation.pitch, -0.25);
        assert!(rotation.to_transform().is_finite());
        assert_eq!(ObjectRotation::ZERO.to_transform(), Transform3d::IDENTITY);
    }
}
