// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The registry keeps two [`understory_dirty`] trackers, one keyed by item
//! index and one keyed by stack index. Every channel is local-only: items are
//! not nested, so nothing propagates. Mutators mark channels as they go, and
//! [`Registry::evaluate`](crate::registry::Registry::evaluate) drains them
//! into [`FrameChanges`](crate::registry::FrameChanges) for the presenter.

use understory_dirty::Channel;

/// Item local pose changed (flight step, repack tween, landing).
pub const ITEM_POSE: Channel = Channel::new(0);

/// Item glow intensity changed.
pub const ITEM_GLOW: Channel = Channel::new(1);

/// Item moved between a stack and the in-flight set.
pub const ITEM_OWNER: Channel = Channel::new(2);

/// Stack pose changed (layout pass).
pub const STACK_PLACEMENT: Channel = Channel::new(0);

/// Stack membership or order changed.
pub const STACK_MEMBERSHIP: Channel = Channel::new(1);
