// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays item storage with stack sequences and ownership moves.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Point;
use rand::Rng;
use understory_dirty::{CycleHandling, DirtyTracker};

use crate::config::SceneConfig;
use crate::dirty;
use crate::error::ConfigError;
use crate::layout::{Layout, pile_offset};
use crate::pose::Pose;

use super::id::{ItemId, StackId, VisualKey};

/// Who currently holds an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Resident in a stack's sequence.
    Stack(StackId),
    /// Removed from its source and not yet landed.
    InFlight,
}

/// Storage for all stacks and items of one scene.
///
/// Items are addressed by [`ItemId`], stacks by [`StackId`]. Item poses are
/// local to the owning stack, or in scene space while the item is in flight.
#[derive(Debug)]
pub struct Registry {
    // -- Items --
    pub(crate) item_key: Vec<VisualKey>,
    pub(crate) item_pose: Vec<Pose>,
    pub(crate) item_glow: Vec<f64>,
    pub(crate) item_owner: Vec<Owner>,

    // -- Stacks --
    pub(crate) stack_pose: Vec<Pose>,
    pub(crate) stack_items: Vec<Vec<ItemId>>,

    // -- Geometry --
    pub(crate) pile_step: f64,
    pub(crate) item_scale: f64,

    // -- Dirty tracking --
    pub(crate) item_dirty: DirtyTracker<u32>,
    pub(crate) stack_dirty: DirtyTracker<u32>,
}

impl Registry {
    /// Creates the population described by `config` and deals it.
    ///
    /// Item `i` gets visual key `i % visual_kinds`. The items are shuffled
    /// with a Fisher–Yates pass driven by `rng`, then dealt round-robin so
    /// every stack receives the same count. Stack poses and item offsets stay
    /// at identity until the first [`apply_layout`](Self::apply_layout).
    pub fn populate<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;

        let item_count = config.item_count;
        let stack_count = config.stack_count;
        let rest = Pose::IDENTITY.with_scale(config.item_scale);

        let mut registry = Self {
            item_key: (0..item_count)
                .map(|i| VisualKey(index_u32(i) % config.visual_kinds))
                .collect(),
            item_pose: vec![rest; item_count],
            item_glow: vec![0.0; item_count],
            item_owner: vec![Owner::InFlight; item_count],
            stack_pose: vec![Pose::IDENTITY; stack_count],
            stack_items: (0..stack_count)
                .map(|_| Vec::with_capacity(config.items_per_stack()))
                .collect(),
            pile_step: 0.0,
            item_scale: config.item_scale,
            item_dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            stack_dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        };

        let mut order: Vec<ItemId> = (0..item_count).map(|i| ItemId(index_u32(i))).collect();
        for i in (1..order.len()).rev() {
            let j = rng.random_range(0..=i);
            order.swap(i, j);
        }

        for (slot, item) in order.into_iter().enumerate() {
            let stack = StackId(index_u32(slot % stack_count));
            registry.stack_items[stack.index()].push(item);
            registry.item_owner[item.index()] = Owner::Stack(stack);
            registry.item_dirty.mark(item.0, dirty::ITEM_OWNER);
        }
        for s in 0..stack_count {
            registry.stack_dirty.mark(index_u32(s), dirty::STACK_MEMBERSHIP);
        }

        Ok(registry)
    }

    // -- Queries --

    /// Number of stacks.
    #[must_use]
    pub fn stack_count(&self) -> usize {
        self.stack_items.len()
    }

    /// Size of the item population.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_owner.len()
    }

    /// Iterates over all stack handles in index order.
    pub fn stacks(&self) -> impl Iterator<Item = StackId> + '_ {
        (0..self.stack_items.len()).map(|i| StackId(index_u32(i)))
    }

    /// Items resident in `stack`, bottom to top.
    #[must_use]
    pub fn items(&self, stack: StackId) -> &[ItemId] {
        self.validate_stack(stack);
        &self.stack_items[stack.index()]
    }

    /// Number of items resident in `stack`.
    #[must_use]
    pub fn len(&self, stack: StackId) -> usize {
        self.items(stack).len()
    }

    /// Returns whether `stack` holds no items.
    #[must_use]
    pub fn is_empty(&self, stack: StackId) -> bool {
        self.items(stack).is_empty()
    }

    /// The most recently added item of `stack`.
    #[must_use]
    pub fn top(&self, stack: StackId) -> Option<ItemId> {
        self.items(stack).last().copied()
    }

    /// Who currently holds `item`.
    #[must_use]
    pub fn owner(&self, item: ItemId) -> Owner {
        self.validate_item(item);
        self.item_owner[item.index()]
    }

    /// The stack holding `item`, or `None` while it is in flight.
    #[must_use]
    pub fn stack_of(&self, item: ItemId) -> Option<StackId> {
        match self.owner(item) {
            Owner::Stack(stack) => Some(stack),
            Owner::InFlight => None,
        }
    }

    /// Number of items currently in flight.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.item_owner
            .iter()
            .filter(|o| **o == Owner::InFlight)
            .count()
    }

    /// The opaque visual key of `item`.
    #[must_use]
    pub fn visual_key(&self, item: ItemId) -> VisualKey {
        self.validate_item(item);
        self.item_key[item.index()]
    }

    /// Pose of `item` relative to its owner.
    #[must_use]
    pub fn local_pose(&self, item: ItemId) -> Pose {
        self.validate_item(item);
        self.item_pose[item.index()]
    }

    /// Glow intensity of `item` (zero at rest).
    #[must_use]
    pub fn glow(&self, item: ItemId) -> f64 {
        self.validate_item(item);
        self.item_glow[item.index()]
    }

    /// Scene-space pose of `stack`.
    #[must_use]
    pub fn stack_pose(&self, stack: StackId) -> Pose {
        self.validate_stack(stack);
        self.stack_pose[stack.index()]
    }

    /// Current distance between neighbouring items in a pile.
    #[must_use]
    pub fn pile_step(&self) -> f64 {
        self.pile_step
    }

    /// Nominal item scale at rest.
    #[must_use]
    pub fn item_scale(&self) -> f64 {
        self.item_scale
    }

    /// Scene-space pose of `item`.
    #[must_use]
    pub fn world_pose(&self, item: ItemId) -> Pose {
        let local = self.local_pose(item);
        match self.item_owner[item.index()] {
            Owner::Stack(stack) => self.stack_pose[stack.index()].compose(local),
            Owner::InFlight => local,
        }
    }

    /// Scene-space pose of the top of `stack`.
    ///
    /// This is the top item's current pose (which may be mid-repack), or the
    /// stack anchor if the stack is empty. Flights re-read it every frame so
    /// that items racing to the same stack pile onto whatever is there.
    #[must_use]
    pub fn top_pose(&self, stack: StackId) -> Pose {
        match self.top(stack) {
            Some(item) => self.world_pose(item),
            None => self.stack_pose[stack.index()].with_scale(self.item_scale),
        }
    }

    /// Resting local position of the item at `index` in `stack`.
    #[must_use]
    pub fn slot_position(&self, stack: StackId, index: usize) -> Point {
        pile_offset(index, self.len(stack), self.pile_step)
    }

    /// Verifies that every item is owned exactly once.
    ///
    /// Each item must either appear in exactly one stack sequence with a
    /// matching [`Owner::Stack`], or appear in none and be
    /// [`Owner::InFlight`].
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = vec![0_u32; self.item_count()];
        for (s, items) in self.stack_items.iter().enumerate() {
            for item in items {
                let Some(count) = seen.get_mut(item.index()) else {
                    return false;
                };
                *count += 1;
                if self.item_owner[item.index()] != Owner::Stack(StackId(index_u32(s))) {
                    return false;
                }
            }
        }
        seen.iter()
            .zip(&self.item_owner)
            .all(|(&count, owner)| match owner {
                Owner::Stack(_) => count == 1,
                Owner::InFlight => count == 0,
            })
    }

    // -- Property API --

    /// Sets the local pose of `item`.
    pub fn set_local_pose(&mut self, item: ItemId, pose: Pose) {
        self.validate_item(item);
        self.item_pose[item.index()] = pose;
        self.item_dirty.mark(item.0, dirty::ITEM_POSE);
    }

    /// Moves `item` to a new local position, keeping rotation and scale.
    pub fn set_local_position(&mut self, item: ItemId, position: Point) {
        self.validate_item(item);
        self.item_pose[item.index()].position = position;
        self.item_dirty.mark(item.0, dirty::ITEM_POSE);
    }

    /// Sets the glow intensity of `item`.
    pub fn set_glow(&mut self, item: ItemId, glow: f64) {
        self.validate_item(item);
        self.item_glow[item.index()] = glow;
        self.item_dirty.mark(item.0, dirty::ITEM_GLOW);
    }

    /// Applies stack poses and pile step from a layout pass.
    ///
    /// Returns whether the pile step changed, in which case every pile needs
    /// a repack.
    ///
    /// # Panics
    ///
    /// Panics if the layout was computed for a different stack count.
    pub fn apply_layout(&mut self, layout: &Layout) -> bool {
        assert_eq!(
            layout.stacks.len(),
            self.stack_count(),
            "layout computed for a different stack count"
        );
        for (s, pose) in layout.stacks.iter().enumerate() {
            if self.stack_pose[s] != *pose {
                self.stack_pose[s] = *pose;
                self.stack_dirty.mark(index_u32(s), dirty::STACK_PLACEMENT);
            }
        }
        let step_changed = self.pile_step != layout.pile_step;
        self.pile_step = layout.pile_step;
        step_changed
    }

    // -- Ownership API --

    /// Pops the top item of `stack` into the in-flight set.
    ///
    /// The item's pose is converted to scene space so it stays put on screen.
    /// Returns `None` if the stack is empty.
    pub fn take_top(&mut self, stack: StackId) -> Option<ItemId> {
        self.validate_stack(stack);
        let item = self.stack_items[stack.index()].pop()?;
        let world = self.stack_pose[stack.index()].compose(self.item_pose[item.index()]);
        self.item_pose[item.index()] = world;
        self.item_owner[item.index()] = Owner::InFlight;

        self.item_dirty.mark(item.0, dirty::ITEM_OWNER);
        self.item_dirty.mark(item.0, dirty::ITEM_POSE);
        self.stack_dirty.mark(stack.0, dirty::STACK_MEMBERSHIP);
        Some(item)
    }

    /// Appends an in-flight `item` to the top of `stack`.
    ///
    /// The item keeps its on-screen placement: its scene-space pose is
    /// converted into the stack's local space. Flight-only state is cleared
    /// (glow to zero, scale back to nominal).
    ///
    /// # Panics
    ///
    /// Panics if `item` is not in flight.
    pub fn land(&mut self, item: ItemId, stack: StackId) {
        self.validate_item(item);
        self.validate_stack(stack);
        assert_eq!(
            self.item_owner[item.index()],
            Owner::InFlight,
            "only in-flight items can land"
        );

        let frame = self.stack_pose[stack.index()];
        let local = frame
            .localize(self.item_pose[item.index()])
            .with_scale(self.item_scale);
        self.item_pose[item.index()] = local;
        self.item_glow[item.index()] = 0.0;
        self.item_owner[item.index()] = Owner::Stack(stack);
        self.stack_items[stack.index()].push(item);

        self.item_dirty.mark(item.0, dirty::ITEM_OWNER);
        self.item_dirty.mark(item.0, dirty::ITEM_POSE);
        self.item_dirty.mark(item.0, dirty::ITEM_GLOW);
        self.stack_dirty.mark(stack.0, dirty::STACK_MEMBERSHIP);
    }

    // -- Internal helpers --

    fn validate_item(&self, item: ItemId) {
        assert!(
            item.index() < self.item_owner.len(),
            "item handle {item:?} out of range"
        );
    }

    fn validate_stack(&self, stack: StackId) {
        assert!(
            stack.index() < self.stack_items.len(),
            "stack handle {stack:?} out of range"
        );
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "populations are bounded far below u32::MAX"
)]
const fn index_u32(i: usize) -> u32 {
    i as u32
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::layout::{LayoutParams, layout};

    fn small_config() -> SceneConfig {
        SceneConfig {
            stack_count: 3,
            item_count: 9,
            visual_kinds: 4,
            ..SceneConfig::ace_of_shadows()
        }
    }

    fn populated(config: &SceneConfig, seed: u64) -> Registry {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut registry = Registry::populate(config, &mut rng).unwrap();
        let params = LayoutParams::from_config(config);
        registry.apply_layout(&layout(config.stack_count, config.item_extent, &params));
        registry
    }

    #[test]
    fn deal_is_even_and_complete() {
        let config = SceneConfig::ace_of_shadows();
        let registry = populated(&config, 7);
        let mut all = BTreeSet::new();
        for stack in registry.stacks() {
            assert_eq!(registry.len(stack), 12, "{stack:?}");
            all.extend(registry.items(stack).iter().copied());
        }
        assert_eq!(all.len(), 144);
        assert!(registry.is_consistent());
    }

    #[test]
    fn shuffle_is_reproducible_per_seed() {
        let config = small_config();
        let a = populated(&config, 11);
        let b = populated(&config, 11);
        let c = populated(&config, 12);
        let deal = |r: &Registry| -> Vec<Vec<ItemId>> {
            r.stacks().map(|s| r.items(s).to_vec()).collect()
        };
        assert_eq!(deal(&a), deal(&b));
        assert_ne!(deal(&a), deal(&c), "different seeds should deal differently");
    }

    #[test]
    fn visual_keys_cycle_through_catalogue() {
        let registry = populated(&small_config(), 1);
        assert_eq!(registry.visual_key(ItemId(0)), VisualKey(0));
        assert_eq!(registry.visual_key(ItemId(5)), VisualKey(1));
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = SceneConfig {
            item_count: 10,
            ..small_config()
        };
        let mut rng = SmallRng::seed_from_u64(0);
        let err = Registry::populate(&config, &mut rng).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnevenPopulation {
                items: 10,
                stacks: 3
            }
        );
    }

    #[test]
    fn take_top_moves_item_in_flight_without_moving_it() {
        let config = small_config();
        let mut registry = populated(&config, 3);
        let stack = StackId(1);
        let top = registry.top(stack).unwrap();
        registry.set_local_position(top, registry.slot_position(stack, 2));
        let before = registry.world_pose(top);

        let taken = registry.take_top(stack).unwrap();
        assert_eq!(taken, top);
        assert_eq!(registry.owner(top), Owner::InFlight);
        assert_eq!(registry.stack_of(top), None);
        assert_eq!(registry.len(stack), 2);
        assert_eq!(registry.in_flight_count(), 1);
        assert_eq!(registry.world_pose(top), before);
        assert!(registry.is_consistent());
    }

    #[test]
    fn take_top_on_empty_stack_is_none() {
        let mut registry = populated(&small_config(), 3);
        let stack = StackId(0);
        while registry.take_top(stack).is_some() {}
        assert!(registry.is_empty(stack));
        assert_eq!(registry.take_top(stack), None);
        assert_eq!(registry.in_flight_count(), 3);
    }

    #[test]
    fn land_converts_into_destination_space() {
        let mut registry = populated(&small_config(), 3);
        let item = registry.take_top(StackId(0)).unwrap();
        let mut flying = registry.local_pose(item);
        flying.position = Point::new(400.0, 300.0);
        flying.rotation = registry.stack_pose(StackId(2)).rotation;
        flying.scale = 1.2;
        registry.set_local_pose(item, flying);
        registry.set_glow(item, 0.5);

        registry.land(item, StackId(2));
        assert_eq!(registry.stack_of(item), Some(StackId(2)));
        assert_eq!(registry.top(StackId(2)), Some(item));
        assert_eq!(registry.glow(item), 0.0);

        let local = registry.local_pose(item);
        assert_eq!(local.scale, registry.item_scale());
        assert!(local.rotation.abs() < 1e-12);
        let world = registry.world_pose(item);
        assert!((world.position - Point::new(400.0, 300.0)).hypot() < 1e-9);
        assert!(registry.is_consistent());
    }

    #[test]
    #[should_panic(expected = "only in-flight items can land")]
    fn landing_a_resident_item_panics() {
        let mut registry = populated(&small_config(), 3);
        let item = registry.top(StackId(0)).unwrap();
        registry.land(item, StackId(1));
    }

    #[test]
    fn top_pose_falls_back_to_anchor() {
        let mut registry = populated(&small_config(), 3);
        let stack = StackId(2);
        while registry.take_top(stack).is_some() {}
        let anchor = registry.stack_pose(stack);
        assert_eq!(registry.top_pose(stack).position, anchor.position);
        assert_eq!(registry.top_pose(stack).rotation, anchor.rotation);
    }
}
