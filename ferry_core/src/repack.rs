// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated repacking of stack piles.
//!
//! When a stack's membership changes, each resident item eases from its
//! current local position to its slot from [`pile_offset`]. A new request on
//! the same stack replaces any tween still running for its items, starting
//! from wherever they are now. Requests never queue.
//!
//! [`pile_offset`]: crate::layout::pile_offset

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Point;

use crate::config::SceneConfig;
use crate::easing::Easing;
use crate::registry::{ItemId, Owner, Registry, StackId};
use crate::time::{Duration, HostTime};
use crate::trace::{RepackEvent, Tracer};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    from: Point,
    to: Point,
    start: HostTime,
}

/// Per-item position tweens that keep piles contiguous.
#[derive(Clone, Debug)]
pub struct RepackAnimator {
    tweens: Vec<Option<Tween>>,
    duration: Duration,
    easing: Easing,
}

impl RepackAnimator {
    /// Creates an idle animator for `item_count` items.
    #[must_use]
    pub fn new(item_count: usize, duration: Duration, easing: Easing) -> Self {
        Self {
            tweens: vec![None; item_count],
            duration,
            easing,
        }
    }

    /// Creates an animator using the configured repack timing.
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(
            config.item_count,
            config.repack_duration,
            config.repack_easing,
        )
    }

    /// Starts easing every item of `stack` toward its slot.
    ///
    /// Returns the number of items that will move. Items already at their
    /// slot get no tween. With a zero repack duration the pile snaps.
    pub fn request(
        &mut self,
        registry: &mut Registry,
        stack: StackId,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> usize {
        let len = registry.len(stack);
        tracer.repack(&RepackEvent {
            stack,
            len,
            at: now,
        });

        let mut moving = 0;
        for index in 0..len {
            let item = registry.items(stack)[index];
            let to = registry.slot_position(stack, index);
            let from = registry.local_pose(item).position;
            if from == to {
                self.tweens[item.index()] = None;
            } else if self.duration.is_zero() {
                self.tweens[item.index()] = None;
                registry.set_local_position(item, to);
            } else {
                self.tweens[item.index()] = Some(Tween { from, to, start: now });
                moving += 1;
            }
        }
        moving
    }

    /// Places every resident item of every stack on its slot immediately.
    pub fn snap_all(&mut self, registry: &mut Registry) {
        self.tweens.fill(None);
        let stacks: Vec<StackId> = registry.stacks().collect();
        for stack in stacks {
            for index in 0..registry.len(stack) {
                let item = registry.items(stack)[index];
                let slot = registry.slot_position(stack, index);
                registry.set_local_position(item, slot);
            }
        }
    }

    /// Drops any tween running for `item`.
    ///
    /// Called when the item leaves its stack.
    pub fn cancel(&mut self, item: ItemId) {
        if let Some(tween) = self.tweens.get_mut(item.index()) {
            *tween = None;
        }
    }

    /// Returns `true` if `item` has a tween in progress.
    #[must_use]
    pub fn is_animating(&self, item: ItemId) -> bool {
        self.tweens.get(item.index()).is_some_and(Option::is_some)
    }

    /// Number of tweens in progress.
    #[must_use]
    pub fn active(&self) -> usize {
        self.tweens.iter().filter(|t| t.is_some()).count()
    }

    /// Writes every tween's position for `now` and retires finished ones.
    ///
    /// Returns the number of tweens still running.
    pub fn advance(&mut self, registry: &mut Registry, now: HostTime) -> usize {
        let mut running = 0;
        for (index, slot) in self.tweens.iter_mut().enumerate() {
            let Some(tween) = *slot else {
                continue;
            };
            let item = registry_item(index);
            if !matches!(registry.owner(item), Owner::Stack(_)) {
                *slot = None;
                continue;
            }
            let raw = now
                .saturating_duration_since(tween.start)
                .fraction_of(self.duration);
            if raw >= 1.0 {
                registry.set_local_position(item, tween.to);
                *slot = None;
            } else {
                let eased = self.easing.apply(raw);
                registry.set_local_position(item, tween.from.lerp(tween.to, eased));
                running += 1;
            }
        }
        running
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tween slots mirror the item population, which fits in u32"
)]
fn registry_item(index: usize) -> ItemId {
    ItemId::new(index as u32)
}
