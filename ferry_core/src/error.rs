// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Setup-time errors.
//!
//! Only configuration mistakes are errors. Runtime races (launching from an
//! empty stack, starting a running scheduler, driver calls outside the scene
//! lifetime) are reported as `None`/`false` by the operation itself.

use thiserror::Error;

/// A [`SceneConfig`](crate::config::SceneConfig) that cannot drive a scene.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Transfers need somewhere to go.
    #[error("at least two stacks are required, got {0}")]
    TooFewStacks(usize),
    /// The population is empty.
    #[error("item population must not be empty")]
    NoItems,
    /// The population cannot be dealt evenly.
    #[error("{items} items cannot be dealt evenly across {stacks} stacks")]
    UnevenPopulation {
        /// Configured item count.
        items: usize,
        /// Configured stack count.
        stacks: usize,
    },
    /// The visual key catalogue is empty.
    #[error("at least one visual kind is required")]
    NoVisualKinds,
    /// The reference item size is unusable.
    #[error("item extent must be finite and positive, got {width}x{height}")]
    InvalidItemExtent {
        /// Configured width.
        width: f64,
        /// Configured height.
        height: f64,
    },
    /// A timing parameter is zero.
    #[error("{0} must be longer than zero")]
    ZeroDuration(&'static str),
    /// The arc height band is unusable.
    #[error("arc band must be finite and non-negative, got {min} + [0, {variation})")]
    InvalidArcBand {
        /// Lowest arc height.
        min: f64,
        /// Width of the random band above `min`.
        variation: f64,
    },
    /// A move cap of zero would never launch anything.
    #[error("per-source move cap must be at least one")]
    ZeroMoveCap,
}
