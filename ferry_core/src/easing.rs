// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves.
//!
//! Every curve maps `0.0..=1.0` onto itself with `apply(0) == 0` and
//! `apply(1) == 1`, so a completed animation always lands exactly on its
//! target. Inputs outside the unit interval are clamped first.

/// An easing curve, selected by id in [`SceneConfig`](crate::config::SceneConfig).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Quadratic deceleration.
    QuadOut,
    /// Cubic deceleration.
    #[default]
    CubicOut,
    /// Exponential deceleration: fast launch, long settle.
    ExpoOut,
    /// Sinusoidal acceleration then deceleration.
    SineInOut,
}

impl Easing {
    /// Maps raw progress to eased progress.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        // NaN collapses to the start rather than poisoning the pose.
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::QuadOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Self::CubicOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - libm::exp2(-10.0 * t)
                }
            }
            Self::SineInOut => 0.5 - 0.5 * libm::cos(core::f64::consts::PI * t),
        }
    }
}
