// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable scene configuration.
//!
//! A [`SceneConfig`] is built once, validated with
//! [`validate`](SceneConfig::validate), and handed by value to the scene. The
//! scheduler, flight engine, and layout engine each read the fields they need
//! at construction; nothing reads ambient constants.

use kurbo::Size;

use crate::easing::Easing;
use crate::error::ConfigError;
use crate::time::Duration;

/// Controls when the scheduler moves on to the next source stack.
///
/// Passed to the scheduler via [`SceneConfig::source_policy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourcePolicy {
    /// Rotate after `moves` launches from the current source, or earlier if
    /// a tick finds the source empty.
    ///
    /// Bounds how long any destination waits for traffic.
    MoveCap {
        /// Launches per source before rotating.
        moves: u32,
    },
    /// Stay on one source until its last item has launched.
    UntilEmpty,
}

/// Configuration for a transfer scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Number of stacks on the circle.
    pub stack_count: usize,
    /// Fixed item population, dealt evenly at setup.
    pub item_count: usize,
    /// Size of the visual key catalogue; item `i` gets key `i % visual_kinds`.
    pub visual_kinds: u32,
    /// Unscaled size of one item's visual.
    pub item_extent: Size,
    /// Nominal item scale at rest.
    pub item_scale: f64,
    /// Pile step as a fraction of one scaled item height.
    pub pile_step_fraction: f64,
    /// Radius of the stack circle in scene units.
    pub radius: f64,
    /// Fixed design canvas the scene is laid out in.
    pub design_size: Size,
    /// Cadence of the launch driver.
    pub move_interval: Duration,
    /// Flight length.
    pub flight_duration: Duration,
    /// Easing applied to flight progress.
    pub flight_easing: Easing,
    /// Lowest arc height.
    pub arc_min: f64,
    /// Width of the random band added to [`arc_min`](Self::arc_min).
    pub arc_variation: f64,
    /// Lateral swing for vertically aligned flights.
    pub side_offset: f64,
    /// Extra scale at the flight midpoint.
    pub lift_scale: f64,
    /// Glow intensity at the flight midpoint.
    pub glow_peak: f64,
    /// Length of a repack tween.
    pub repack_duration: Duration,
    /// Easing applied to repack tweens.
    pub repack_easing: Easing,
    /// Source rotation policy.
    pub source_policy: SourcePolicy,
    /// Seed for the initial shuffle and per-flight arc heights.
    pub seed: u64,
}

impl SceneConfig {
    /// Twelve stacks of a 144-card deck on a circle, one move per second.
    #[must_use]
    pub const fn ace_of_shadows() -> Self {
        Self {
            stack_count: 12,
            item_count: 144,
            visual_kinds: 36,
            item_extent: Size::new(70.0, 100.0),
            item_scale: 1.0,
            pile_step_fraction: 0.02,
            radius: 180.0,
            design_size: Size::new(1280.0, 720.0),
            move_interval: Duration::from_millis(1000),
            flight_duration: Duration::from_millis(2000),
            flight_easing: Easing::ExpoOut,
            arc_min: 120.0,
            arc_variation: 40.0,
            side_offset: 40.0,
            lift_scale: 0.2,
            glow_peak: 0.6,
            repack_duration: Duration::from_millis(180),
            repack_easing: Easing::CubicOut,
            source_policy: SourcePolicy::MoveCap { moves: 6 },
            seed: 0x5eed_cafe,
        }
    }

    /// Checks the configuration for mistakes that would break setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stack_count <= 1 {
            return Err(ConfigError::TooFewStacks(self.stack_count));
        }
        if self.item_count == 0 {
            return Err(ConfigError::NoItems);
        }
        if !self.item_count.is_multiple_of(self.stack_count) {
            return Err(ConfigError::UnevenPopulation {
                items: self.item_count,
                stacks: self.stack_count,
            });
        }
        if self.visual_kinds == 0 {
            return Err(ConfigError::NoVisualKinds);
        }
        let Size { width, height } = self.item_extent;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidItemExtent { width, height });
        }
        if self.move_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("move interval"));
        }
        if self.flight_duration.is_zero() {
            return Err(ConfigError::ZeroDuration("flight duration"));
        }
        let arc_ok = self.arc_min.is_finite()
            && self.arc_variation.is_finite()
            && self.arc_min >= 0.0
            && self.arc_variation >= 0.0;
        if !arc_ok {
            return Err(ConfigError::InvalidArcBand {
                min: self.arc_min,
                variation: self.arc_variation,
            });
        }
        if self.source_policy == (SourcePolicy::MoveCap { moves: 0 }) {
            return Err(ConfigError::ZeroMoveCap);
        }
        Ok(())
    }

    /// Items per stack after the initial deal.
    #[must_use]
    pub const fn items_per_stack(&self) -> usize {
        self.item_count / self.stack_count
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::ace_of_shadows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_is_valid() {
        let config = SceneConfig::ace_of_shadows();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.items_per_stack(), 12);
    }

    #[test]
    fn single_stack_is_rejected() {
        let config = SceneConfig {
            stack_count: 1,
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::TooFewStacks(1)));
    }

    #[test]
    fn uneven_population_is_rejected() {
        let config = SceneConfig {
            item_count: 145,
            ..SceneConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnevenPopulation {
                items: 145,
                stacks: 12
            })
        );
    }

    #[test]
    fn zero_timings_are_rejected() {
        let config = SceneConfig {
            flight_duration: Duration::ZERO,
            ..SceneConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("flight duration"))
        );
    }

    #[test]
    fn zero_move_cap_is_rejected() {
        let config = SceneConfig {
            source_policy: SourcePolicy::MoveCap { moves: 0 },
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMoveCap));

        let config = SceneConfig {
            source_policy: SourcePolicy::UntilEmpty,
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn degenerate_extent_is_rejected() {
        let config = SceneConfig {
            item_extent: Size::new(70.0, 0.0),
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidItemExtent { .. })
        ));
    }

    #[test]
    fn errors_describe_the_problem() {
        use alloc::string::ToString;

        let msg = ConfigError::UnevenPopulation {
            items: 10,
            stacks: 3,
        }
        .to_string();
        assert_eq!(msg, "10 items cannot be dealt evenly across 3 stacks");
    }
}
