// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-flight item transfers.
//!
//! [`FlightEngine::launch`] pops a stack's top item into the in-flight set and
//! records a [`Flight`]. [`FlightEngine::tick`] runs once per frame: it poses
//! every flight for a single `now`, then lands the flights that reached the
//! end of their duration, in launch order.
//!
//! A flight's destination is re-read every frame from
//! [`Registry::top_pose`]. Items racing toward the same stack each aim at
//! whatever is on top of it at that moment, so they cascade onto each other
//! instead of converging on one stale point.

use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SceneConfig;
use crate::easing::Easing;
use crate::motion::{self, FlightShape};
use crate::pose::Pose;
use crate::registry::{ItemId, Registry, StackId};
use crate::repack::RepackAnimator;
use crate::time::{Duration, HostTime};
use crate::trace::{LandingEvent, LaunchEvent, Tracer};

/// Flight timing and shape taken from [`SceneConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightParams {
    /// Length of every flight.
    pub duration: Duration,
    /// Easing applied to raw progress.
    pub easing: Easing,
    /// Lowest arc height.
    pub arc_min: f64,
    /// Width of the random arc band.
    pub arc_variation: f64,
    /// Lateral swing for near-vertical flights.
    pub side_offset: f64,
    /// Extra mid-flight scale.
    pub lift_scale: f64,
    /// Mid-flight glow.
    pub glow_peak: f64,
    /// Nominal item scale.
    pub base_scale: f64,
}

impl FlightParams {
    /// Extracts the flight fields of `config`.
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            duration: config.flight_duration,
            easing: config.flight_easing,
            arc_min: config.arc_min,
            arc_variation: config.arc_variation,
            side_offset: config.side_offset,
            lift_scale: config.lift_scale,
            glow_peak: config.glow_peak,
            base_scale: config.item_scale,
        }
    }
}

/// One item's transfer between two stacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flight {
    /// The item in flight.
    pub item: ItemId,
    /// Stack it left.
    pub source: StackId,
    /// Stack it is heading for.
    pub destination: StackId,
    /// Scene-space pose at launch.
    pub start: Pose,
    /// Scene time of the launch.
    pub started_at: HostTime,
    /// Flight length.
    pub duration: Duration,
    /// Peak arc height, drawn at launch.
    pub arc_height: f64,
    /// Easing applied to raw progress.
    pub easing: Easing,
}

impl Flight {
    /// Raw progress at `now`, clamped to `[0, 1]`.
    #[must_use]
    pub fn raw_progress(&self, now: HostTime) -> f64 {
        now.saturating_duration_since(self.started_at)
            .fraction_of(self.duration)
    }

    /// Eased progress at `now`.
    #[must_use]
    pub fn progress(&self, now: HostTime) -> f64 {
        self.easing.apply(self.raw_progress(now))
    }
}

/// Owns every active [`Flight`].
#[derive(Clone, Debug)]
pub struct FlightEngine {
    flights: Vec<Flight>,
    params: FlightParams,
    rng: SmallRng,
}

impl FlightEngine {
    /// Creates an engine with no flights. `seed` drives arc heights.
    #[must_use]
    pub fn new(params: FlightParams, seed: u64) -> Self {
        Self {
            flights: Vec::new(),
            params,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Parameters shared by every flight.
    #[must_use]
    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    /// Number of flights in the air.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Returns `true` if nothing is in the air.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Active flights in launch order.
    pub fn iter(&self) -> impl Iterator<Item = &Flight> + '_ {
        self.flights.iter()
    }

    /// The active flight carrying `item`, if any.
    #[must_use]
    pub fn flight_of(&self, item: ItemId) -> Option<&Flight> {
        self.flights.iter().find(|f| f.item == item)
    }

    /// Discards every flight without landing it.
    ///
    /// The items stay in the in-flight set; only teardown calls this.
    pub fn clear(&mut self) {
        self.flights.clear();
    }

    /// Sends the top item of `source` toward `destination`.
    ///
    /// Returns `None` without touching anything if `source` is empty. On
    /// success the source pile starts repacking to close the gap.
    pub fn launch(
        &mut self,
        registry: &mut Registry,
        repack: &mut RepackAnimator,
        source: StackId,
        destination: StackId,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Option<ItemId> {
        // Checked before the pop so a bad destination leaves no orphan.
        let _ = registry.stack_pose(destination);
        let item = registry.take_top(source)?;
        repack.cancel(item);

        let arc_height = self.params.arc_min
            + if self.params.arc_variation > 0.0 {
                self.rng.random_range(0.0..self.params.arc_variation)
            } else {
                0.0
            };
        let flight = Flight {
            item,
            source,
            destination,
            start: registry.local_pose(item),
            started_at: now,
            duration: self.params.duration,
            arc_height,
            easing: self.params.easing,
        };
        self.flights.push(flight);

        tracer.launch(&LaunchEvent {
            item,
            source,
            destination,
            at: now,
            arc_height,
        });
        repack.request(registry, source, now, tracer);
        Some(item)
    }

    /// Advances every flight to `now` and lands the finished ones.
    ///
    /// All flights are posed before any lands. Landings run in launch order;
    /// each appends the item to its destination and repacks both ends.
    /// Returns the number of landings.
    pub fn tick(
        &mut self,
        registry: &mut Registry,
        repack: &mut RepackAnimator,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> usize {
        for flight in &self.flights {
            let t = flight.progress(now);
            let end = destination_pose(registry, flight.destination);
            let side = motion::lateral_sign(
                end.position - flight.start.position,
                flight.source.index() % 2 == 0,
            );
            let shape = FlightShape {
                arc_height: flight.arc_height,
                side_offset: self.params.side_offset,
                lift_scale: self.params.lift_scale,
                glow_peak: self.params.glow_peak,
                base_scale: self.params.base_scale,
            };
            let sample = motion::sample(flight.start, end, t, &shape, side);
            registry.set_local_pose(flight.item, sample.pose);
            registry.set_glow(flight.item, sample.glow);
        }

        let mut landed = 0;
        let mut i = 0;
        while i < self.flights.len() {
            if self.flights[i].raw_progress(now) < 1.0 {
                i += 1;
                continue;
            }
            let flight = self.flights.remove(i);
            registry.land(flight.item, flight.destination);
            tracer.landing(&LandingEvent {
                item: flight.item,
                source: flight.source,
                destination: flight.destination,
                at: now,
                flight_time: now.saturating_duration_since(flight.started_at),
            });
            repack.request(registry, flight.source, now, tracer);
            repack.request(registry, flight.destination, now, tracer);
            landed += 1;
        }
        landed
    }
}

/// Where a flight to `stack` is aiming this frame.
///
/// Position is the live top of the pile; rotation is the stack's own.
fn destination_pose(registry: &Registry, stack: StackId) -> Pose {
    let mut end = registry.top_pose(stack);
    end.rotation = registry.stack_pose(stack).rotation;
    end
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::layout::{LayoutParams, layout};
    use crate::registry::Owner;

    struct Fixture {
        registry: Registry,
        repack: RepackAnimator,
        flights: FlightEngine,
    }

    fn fixture() -> Fixture {
        let config = SceneConfig {
            stack_count: 4,
            item_count: 16,
            ..SceneConfig::ace_of_shadows()
        };
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut registry = Registry::populate(&config, &mut rng).unwrap();
        let params = LayoutParams::from_config(&config);
        registry.apply_layout(&layout(4, config.item_extent, &params));
        let mut repack = RepackAnimator::from_config(&config);
        repack.snap_all(&mut registry);
        Fixture {
            registry,
            repack,
            flights: FlightEngine::new(FlightParams::from_config(&config), 1),
        }
    }

    fn ms(millis: u64) -> HostTime {
        HostTime::from_millis(millis)
    }

    impl Fixture {
        fn launch(&mut self, from: u32, to: u32, at: u64) -> Option<ItemId> {
            self.flights.launch(
                &mut self.registry,
                &mut self.repack,
                StackId::new(from),
                StackId::new(to),
                ms(at),
                &mut Tracer::none(),
            )
        }

        fn tick(&mut self, at: u64) -> usize {
            self.repack.advance(&mut self.registry, ms(at));
            self.flights
                .tick(&mut self.registry, &mut self.repack, ms(at), &mut Tracer::none())
        }
    }

    #[test]
    fn launch_moves_top_item_in_flight() {
        let mut f = fixture();
        let top = f.registry.top(StackId::new(0)).unwrap();
        let item = f.launch(0, 2, 0).unwrap();
        assert_eq!(item, top);
        assert_eq!(f.registry.owner(item), Owner::InFlight);
        assert_eq!(f.registry.len(StackId::new(0)), 3);
        assert_eq!(f.flights.len(), 1);

        let flight = f.flights.flight_of(item).unwrap();
        assert!(flight.arc_height >= 120.0 && flight.arc_height < 160.0);
        assert_eq!(flight.start.position, f.registry.stack_pose(StackId::new(0)).position);
        assert!(f.registry.is_consistent());
    }

    #[test]
    fn launch_from_empty_source_changes_nothing() {
        let mut f = fixture();
        for i in 0..4 {
            assert!(f.launch(1, 3, i).is_some());
        }
        let before: Vec<usize> = f.registry.stacks().map(|s| f.registry.len(s)).collect();
        assert_eq!(f.launch(1, 3, 10), None);
        let after: Vec<usize> = f.registry.stacks().map(|s| f.registry.len(s)).collect();
        assert_eq!(before, after);
        assert_eq!(f.flights.len(), 4);
        assert_eq!(f.registry.in_flight_count(), 4);
    }

    #[test]
    fn flight_lands_on_destination_after_duration() {
        let mut f = fixture();
        let item = f.launch(0, 1, 0).unwrap();
        assert_eq!(f.tick(1_000), 0);
        assert_eq!(f.registry.stack_of(item), None);
        assert!(f.registry.glow(item) > 0.0);

        assert_eq!(f.tick(2_000), 1);
        assert_eq!(f.registry.stack_of(item), Some(StackId::new(1)));
        assert_eq!(f.registry.top(StackId::new(1)), Some(item));
        assert_eq!(f.registry.len(StackId::new(1)), 5);
        assert_eq!(f.registry.glow(item), 0.0);
        assert_eq!(f.registry.local_pose(item).scale, 1.0);
        assert!(f.flights.is_empty());
        assert!(f.registry.is_consistent());
    }

    #[test]
    fn landing_keeps_item_in_place_then_repacks() {
        let mut f = fixture();
        let dest = StackId::new(2);
        let aim = f.registry.top_pose(dest).position;
        let item = f.launch(0, 2, 0).unwrap();
        f.tick(2_000);
        let world = f.registry.world_pose(item).position;
        assert!((world - aim).hypot() < 1e-9, "{world:?} vs {aim:?}");

        f.tick(2_500);
        let pile: Vec<Point> = f
            .registry
            .items(dest)
            .iter()
            .map(|&i| f.registry.local_pose(i).position)
            .collect();
        for (index, position) in pile.iter().enumerate() {
            assert_eq!(*position, f.registry.slot_position(dest, index));
        }
    }

    #[test]
    fn concurrent_flights_land_in_launch_order() {
        let mut f = fixture();
        let a = f.launch(0, 3, 0).unwrap();
        let b = f.launch(1, 3, 0).unwrap();
        let c = f.launch(2, 3, 500).unwrap();
        assert_eq!(f.tick(2_000), 2);
        assert_eq!(f.registry.items(StackId::new(3))[4..], [a, b]);
        assert_eq!(f.tick(2_500), 1);
        assert_eq!(f.registry.top(StackId::new(3)), Some(c));
        assert_eq!(f.registry.len(StackId::new(3)), 7);
    }

    #[test]
    fn round_trip_restores_counts() {
        let mut f = fixture();
        let a = StackId::new(0);
        let b = StackId::new(1);
        let mut now = 0;
        for _ in 0..3 {
            f.launch(0, 1, now).unwrap();
            now += 100;
        }
        now += 2_000;
        f.tick(now);
        for _ in 0..3 {
            f.launch(1, 0, now).unwrap();
            now += 100;
        }
        now += 2_000;
        f.tick(now);
        assert_eq!(f.registry.len(a), 4);
        assert_eq!(f.registry.len(b), 4);
        assert!(f.flights.is_empty());
        assert!(f.registry.is_consistent());
    }

    #[test]
    fn clear_abandons_items_mid_flight() {
        let mut f = fixture();
        let item = f.launch(0, 1, 0).unwrap();
        f.tick(500);
        f.flights.clear();
        assert!(f.flights.is_empty());
        assert_eq!(f.registry.owner(item), Owner::InFlight);
        assert_eq!(f.tick(5_000), 0);
        assert_eq!(f.registry.owner(item), Owner::InFlight);
    }
}
