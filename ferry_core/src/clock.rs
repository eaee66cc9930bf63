// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pause-compensated scene clock.
//!
//! [`SceneClock`] maps host time onto the scene's own timeline:
//!
//! ```text
//! scene_time = host_time - total_paused
//! ```
//!
//! While paused, scene time stays frozen at the instant of the pause. On
//! resume, the paused span is folded into `total_paused`, so flights, repack
//! tweens, and the launch cadence pick up exactly where they stopped instead
//! of jumping forward by the time spent in the background.

use crate::time::{Duration, HostTime};

/// Maps host time to pause-compensated scene time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneClock {
    /// Sum of all completed paused spans.
    paused_total: Duration,
    /// Host time at which the current pause began.
    paused_at: Option<HostTime>,
}

impl SceneClock {
    /// Creates a running clock with no paused history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            paused_total: Duration::ZERO,
            paused_at: None,
        }
    }

    /// Returns the scene time corresponding to `host`.
    #[must_use]
    pub fn scene_time(&self, host: HostTime) -> HostTime {
        let effective = match self.paused_at {
            Some(at) if at < host => at,
            _ => host,
        };
        effective.saturating_sub(self.paused_total)
    }

    /// Freezes scene time at `host`.
    ///
    /// Returns `false` if the clock was already paused.
    pub fn pause(&mut self, host: HostTime) -> bool {
        if self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(host);
        true
    }

    /// Resumes scene time, excluding the span since [`pause`](Self::pause).
    ///
    /// Returns the length of the paused span, or `None` if the clock was not
    /// paused.
    pub fn resume(&mut self, host: HostTime) -> Option<Duration> {
        let at = self.paused_at.take()?;
        let span = host.saturating_duration_since(at);
        self.paused_total = self.paused_total.saturating_add(span);
        Some(span)
    }

    /// Returns whether scene time is currently frozen.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Total time excluded from the scene timeline so far.
    #[must_use]
    pub const fn paused_total(&self) -> Duration {
        self.paused_total
    }

    /// Forgets all paused history.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
