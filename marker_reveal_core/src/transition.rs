// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed transition parameters.
//!
//! Fades and pulses are described by plain data ([`FadeSpec`], [`PulseSpec`])
//! rather than encoded attribute strings. The layer registry records them as
//! requests; presenters hand them to the renderer's own transition API (for
//! example a CSS `transition` or `animation`) and return immediately.
//!
//! The same [`Duration`] that a presenter receives is the one sequencing code
//! schedules against, so a fade and the step that waits for it cannot drift.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::time::Duration;

/// Timing curve for a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Constant rate.
    #[default]
    Linear,
    /// Quadratic deceleration.
    EaseOutQuad,
    /// Quadratic acceleration then deceleration.
    EaseInOutQuad,
    /// Sinusoidal acceleration then deceleration.
    EaseInOutSine,
}

impl Easing {
    /// Maps linear progress `t` in `[0, 1]` onto the curve.
    ///
    /// Inputs outside `[0, 1]` are clamped.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
            Self::EaseInOutSine => -((core::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }

    /// Returns the CSS timing-function equivalent.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseOutQuad => "cubic-bezier(0.5, 1, 0.89, 1)",
            Self::EaseInOutQuad => "cubic-bezier(0.45, 0, 0.55, 1)",
            Self::EaseInOutSine => "cubic-bezier(0.37, 0, 0.63, 1)",
        }
    }
}

/// Parameters of a one-shot opacity fade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FadeSpec {
    /// How long the fade runs.
    pub duration: Duration,
    /// Timing curve.
    pub easing: Easing,
}

impl FadeSpec {
    /// A zero-length fade, i.e. an instant change.
    pub const INSTANT: Self = Self::new(Duration::ZERO, Easing::Linear);

    /// Creates a fade spec.
    #[must_use]
    pub const fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }
}

/// A fade in progress on one layer, as recorded by the registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    /// Opacity when the fade was requested.
    pub from: f32,
    /// Target opacity.
    pub to: f32,
    /// Duration and curve.
    pub spec: FadeSpec,
}

impl Fade {
    /// Samples the fade `elapsed` after it started.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "opacity is stored as f32; the f64 intermediate is only for the curve"
    )]
    pub fn sample(&self, elapsed: Duration) -> f32 {
        if self.spec.duration.is_zero() || elapsed >= self.spec.duration {
            return self.to;
        }
        let t = elapsed.millis() as f64 / self.spec.duration.millis() as f64;
        let k = self.spec.easing.apply(t);
        (f64::from(self.from) + (f64::from(self.to) - f64::from(self.from)) * k) as f32
    }
}

/// Parameters of a looping opacity pulse.
///
/// The pulse alternates between `low` and `high`, spending `period` on each
/// half-cycle, after an initial `delay`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseSpec {
    /// Lowest opacity of the cycle.
    pub low: f32,
    /// Highest opacity of the cycle.
    pub high: f32,
    /// Duration of one half-cycle.
    pub period: Duration,
    /// Delay before the first cycle starts.
    pub delay: Duration,
    /// Timing curve of each half-cycle.
    pub easing: Easing,
}

impl PulseSpec {
    /// Returns a copy with a different start delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns a copy started `n` extra steps of `stagger` later.
    ///
    /// Used to offset a row of layers pulsing with the same spec.
    #[must_use]
    pub fn staggered(self, stagger: Duration, n: usize) -> Self {
        let n = u64::try_from(n).unwrap_or(u64::MAX);
        let extra = Duration::from_millis(stagger.millis().saturating_mul(n));
        self.with_delay(self.delay.saturating_add(extra))
    }

    /// Samples the pulse `elapsed` after it was started.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "opacity is stored as f32; the f64 intermediate is only for the curve"
    )]
    pub fn sample(&self, elapsed: Duration) -> f32 {
        if elapsed < self.delay || self.period.is_zero() {
            return self.low;
        }
        let running = elapsed.saturating_sub(self.delay).millis();
        let period = self.period.millis();
        let cycle = running / period;
        let t = (running % period) as f64 / period as f64;
        // Odd half-cycles run backwards.
        let t = if cycle % 2 == 0 { t } else { 1.0 - t };
        let k = self.easing.apply(t);
        (f64::from(self.low) + (f64::from(self.high) - f64::from(self.low)) * k) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [
            Easing::Linear,
            Easing::EaseOutQuad,
            Easing::EaseInOutQuad,
            Easing::EaseInOutSine,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?} at 1");
            assert!((easing.apply(0.5) - 0.5).abs() < 0.26, "{easing:?} midpoint");
        }
    }

    #[test]
    fn easing_clamps_out_of_range_progress() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(3.0), 1.0);
    }

    #[test]
    fn fade_sample_reaches_target() {
        let fade = Fade {
            from: 1.0,
            to: 0.0,
            spec: FadeSpec::new(Duration(1200), Easing::EaseInOutQuad),
        };
        assert_eq!(fade.sample(Duration::ZERO), 1.0);
        assert!((fade.sample(Duration(600)) - 0.5).abs() < 1e-6);
        assert_eq!(fade.sample(Duration(1200)), 0.0);
        assert_eq!(fade.sample(Duration(5000)), 0.0);
    }

    #[test]
    fn instant_fade_is_already_done() {
        let fade = Fade {
            from: 0.0,
            to: 1.0,
            spec: FadeSpec::INSTANT,
        };
        assert_eq!(fade.sample(Duration::ZERO), 1.0);
    }

    #[test]
    fn pulse_alternates_direction() {
        let pulse = PulseSpec {
            low: 0.25,
            high: 1.0,
            period: Duration(900),
            delay: Duration(200),
            easing: Easing::Linear,
        };
        assert_eq!(pulse.sample(Duration(100)), 0.25, "still delayed");
        assert!((pulse.sample(Duration(1100)) - 1.0).abs() < 1e-6, "top of first half");
        assert!((pulse.sample(Duration(1550)) - 0.625).abs() < 1e-6, "on the way down");
        assert!((pulse.sample(Duration(2000)) - 0.25).abs() < 1e-6, "back at the bottom");
    }
}
