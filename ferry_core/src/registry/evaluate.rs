// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame change collection.
//!
//! Each dirty channel is drained in deterministic (ascending index) order
//! into a [`FrameChanges`] list. Nothing is recomputed here: item poses are
//! already current when a flight or repack writes them, so evaluation only
//! tells the presenter which handles to re-read.

use alloc::vec::Vec;

use crate::dirty;

use super::id::{ItemId, StackId};
use super::store::Registry;

/// Handles whose presentable state changed since the last evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameChanges {
    /// Items whose local pose changed.
    pub poses: Vec<ItemId>,
    /// Items whose glow intensity changed.
    pub glows: Vec<ItemId>,
    /// Items that moved between a stack and the in-flight set.
    pub reparented: Vec<ItemId>,
    /// Stacks whose scene-space pose changed.
    pub placements: Vec<StackId>,
    /// Stacks whose membership or order changed.
    pub memberships: Vec<StackId>,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.poses.clear();
        self.glows.clear();
        self.reparented.clear();
        self.placements.clear();
        self.memberships.clear();
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
            && self.glows.is_empty()
            && self.reparented.is_empty()
            && self.placements.is_empty()
            && self.memberships.is_empty()
    }
}

impl Registry {
    /// Drains all dirty channels into a fresh [`FrameChanges`].
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses `changes`' allocations.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        changes.poses.extend(
            self.item_dirty
                .drain(dirty::ITEM_POSE)
                .deterministic()
                .run()
                .map(ItemId),
        );
        changes.glows.extend(
            self.item_dirty
                .drain(dirty::ITEM_GLOW)
                .deterministic()
                .run()
                .map(ItemId),
        );
        changes.reparented.extend(
            self.item_dirty
                .drain(dirty::ITEM_OWNER)
                .deterministic()
                .run()
                .map(ItemId),
        );
        changes.placements.extend(
            self.stack_dirty
                .drain(dirty::STACK_PLACEMENT)
                .deterministic()
                .run()
                .map(StackId),
        );
        changes.memberships.extend(
            self.stack_dirty
                .drain(dirty::STACK_MEMBERSHIP)
                .deterministic()
                .run()
                .map(StackId),
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::SceneConfig;
    use crate::layout::{LayoutParams, layout};

    fn registry() -> Registry {
        let config = SceneConfig {
            stack_count: 3,
            item_count: 6,
            ..SceneConfig::ace_of_shadows()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        Registry::populate(&config, &mut rng).unwrap()
    }

    #[test]
    fn initial_deal_reports_every_item_and_stack() {
        let mut registry = registry();
        let changes = registry.evaluate();
        assert_eq!(changes.reparented.len(), 6);
        assert_eq!(
            changes.memberships,
            [StackId(0), StackId(1), StackId(2)].to_vec()
        );
        assert!(registry.evaluate().is_empty(), "second drain is clean");
    }

    #[test]
    fn layout_marks_placements() {
        let config = SceneConfig {
            stack_count: 3,
            item_count: 6,
            ..SceneConfig::ace_of_shadows()
        };
        let mut registry = registry();
        let _ = registry.evaluate();
        let params = LayoutParams::from_config(&config);
        registry.apply_layout(&layout(3, config.item_extent, &params));
        let changes = registry.evaluate();
        assert_eq!(changes.placements.len(), 3);
        assert!(changes.poses.is_empty());
    }

    #[test]
    fn take_and_land_report_in_ascending_order() {
        let mut registry = registry();
        let _ = registry.evaluate();

        let a = registry.take_top(StackId(2)).unwrap();
        let b = registry.take_top(StackId(0)).unwrap();
        registry.land(a, StackId(1));
        let changes = registry.evaluate();

        let mut expected = [a, b].to_vec();
        expected.sort();
        assert_eq!(changes.reparented, expected);
        assert_eq!(
            changes.memberships,
            [StackId(0), StackId(1), StackId(2)].to_vec()
        );
        assert_eq!(changes.glows, [a].to_vec());
    }

    #[test]
    fn evaluate_into_reuses_buffer() {
        let mut registry = registry();
        let mut changes = FrameChanges::default();
        registry.evaluate_into(&mut changes);
        assert!(!changes.is_empty());
        registry.evaluate_into(&mut changes);
        assert!(changes.is_empty());
    }
}
