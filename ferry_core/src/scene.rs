// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transfer scene and its lifecycle.
//!
//! [`TransferScene`] wires the registry, repack animator, flight engine and
//! scheduler to two host drivers:
//!
//! - [`on_timer`](TransferScene::on_timer): the coarse cadence. Asks the
//!   scheduler for a step and launches it.
//! - [`on_frame`](TransferScene::on_frame): once per display refresh.
//!   Advances repack tweens, then flights, then drains the registry's
//!   changes for the presenter.
//!
//! Both read time through one [`SceneClock`], so [`pause`] freezes launches,
//! flights and tweens together, and [`resume`] continues them from where they
//! stopped.
//!
//! [`pause`]: TransferScene::pause
//! [`resume`]: TransferScene::resume

use kurbo::Size;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::clock::SceneClock;
use crate::config::SceneConfig;
use crate::error::ConfigError;
use crate::flight::{FlightEngine, FlightParams};
use crate::layout::{LayoutParams, ViewportFit, layout};
use crate::registry::{FrameChanges, ItemId, Registry, StackId};
use crate::repack::RepackAnimator;
use crate::scheduler::{Advance, Step, TransferScheduler};
use crate::time::{Duration, HostTime};
use crate::trace::{ClockEvent, ClockEventKind, FrameSummary, SourceAdvanceEvent, Tracer};

/// Entry points a scene manager calls.
pub trait SceneLifecycle {
    /// Builds the scene and starts its drivers.
    fn on_enter(&mut self, now: HostTime) -> Result<(), ConfigError>;

    /// Tears the scene down. In-flight items are abandoned, not landed.
    fn on_exit(&mut self);

    /// Reacts to a new window size. Valid at any time, including before
    /// [`on_enter`](Self::on_enter).
    fn on_resize(&mut self, viewport: Size);
}

#[derive(Debug)]
struct Stage {
    registry: Registry,
    repack: RepackAnimator,
    flights: FlightEngine,
    scheduler: TransferScheduler,
}

/// Stacks on a circle trading items on arced flights.
#[derive(Debug)]
pub struct TransferScene {
    config: SceneConfig,
    viewport: Size,
    fit: ViewportFit,
    clock: SceneClock,
    stage: Option<Stage>,
    frame_index: u64,
}

impl TransferScene {
    /// Creates a scene that will use `config` when entered.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            viewport: config.design_size,
            fit: ViewportFit::IDENTITY,
            clock: SceneClock::new(),
            stage: None,
            frame_index: 0,
        }
    }

    /// The scene configuration.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Returns `true` between [`on_enter`](SceneLifecycle::on_enter) and
    /// [`on_exit`](SceneLifecycle::on_exit).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.stage.is_some()
    }

    /// The registry, while the scene is active.
    #[must_use]
    pub fn registry(&self) -> Option<&Registry> {
        self.stage.as_ref().map(|s| &s.registry)
    }

    /// The flight engine, while the scene is active.
    #[must_use]
    pub fn flights(&self) -> Option<&FlightEngine> {
        self.stage.as_ref().map(|s| &s.flights)
    }

    /// The scheduler, while the scene is active.
    #[must_use]
    pub fn scheduler(&self) -> Option<&TransferScheduler> {
        self.stage.as_ref().map(|s| &s.scheduler)
    }

    /// Number of flights in the air (zero when inactive).
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.flights().map_or(0, FlightEngine::len)
    }

    /// Last viewport passed to [`on_resize`](SceneLifecycle::on_resize).
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Design-to-window mapping for the presenter.
    #[must_use]
    pub fn view_transform(&self) -> ViewportFit {
        self.fit
    }

    /// Frames driven since the last enter.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns `true` while scene time is frozen.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Scene time at host time `host`.
    #[must_use]
    pub fn scene_time(&self, host: HostTime) -> HostTime {
        self.clock.scene_time(host)
    }

    /// Freezes scene time. Returns `false` if already paused.
    pub fn pause(&mut self, host: HostTime, tracer: &mut Tracer<'_>) -> bool {
        if !self.clock.pause(host) {
            return false;
        }
        tracer.clock(&ClockEvent {
            kind: ClockEventKind::Pause,
            host,
            paused_for: Duration::ZERO,
        });
        true
    }

    /// Resumes scene time without counting the paused span. Returns `false`
    /// if not paused.
    pub fn resume(&mut self, host: HostTime, tracer: &mut Tracer<'_>) -> bool {
        let Some(paused_for) = self.clock.resume(host) else {
            return false;
        };
        tracer.clock(&ClockEvent {
            kind: ClockEventKind::Resume,
            host,
            paused_for,
        });
        true
    }

    /// Coarse driver: launches the scheduler's next step if one is due.
    ///
    /// Returns the launched item. Does nothing while paused or inactive.
    pub fn on_timer(&mut self, host: HostTime, tracer: &mut Tracer<'_>) -> Option<ItemId> {
        if self.clock.is_paused() {
            return None;
        }
        let now = self.clock.scene_time(host);
        let Stage {
            registry,
            repack,
            flights,
            scheduler,
        } = self.stage.as_mut()?;

        match scheduler.poll(now, |s| registry.len(s))? {
            Step::Launch {
                source,
                destination,
                then,
            } => {
                let item = flights.launch(registry, repack, source, destination, now, tracer);
                if let Some(advance) = then {
                    trace_advance(tracer, advance, now);
                }
                item
            }
            Step::Skip(advance) => {
                trace_advance(tracer, advance, now);
                None
            }
        }
    }

    /// Frame driver: advances tweens and flights, then collects changes.
    ///
    /// Returns `None` while inactive. While paused the frame still runs but
    /// nothing moves.
    pub fn on_frame(&mut self, host: HostTime, tracer: &mut Tracer<'_>) -> Option<FrameChanges> {
        let stage = self.stage.as_mut()?;
        let now = self.clock.scene_time(host);
        self.frame_index += 1;

        stage.repack.advance(&mut stage.registry, now);
        let landed = stage
            .flights
            .tick(&mut stage.registry, &mut stage.repack, now, tracer);
        let changes = stage.registry.evaluate();

        tracer.frame_summary(&FrameSummary {
            frame_index: self.frame_index,
            host,
            scene_time: now,
            in_flight: stage.flights.len(),
            landed,
            changed_poses: changes.poses.len(),
        });
        Some(changes)
    }

    /// Launches from `source` to `destination` outside the cadence.
    ///
    /// Returns `None` if the scene is inactive or `source` is empty.
    pub fn launch(
        &mut self,
        host: HostTime,
        source: StackId,
        destination: StackId,
        tracer: &mut Tracer<'_>,
    ) -> Option<ItemId> {
        let now = self.clock.scene_time(host);
        let stage = self.stage.as_mut()?;
        stage.flights.launch(
            &mut stage.registry,
            &mut stage.repack,
            source,
            destination,
            now,
            tracer,
        )
    }

    fn relayout(&mut self) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        let params = LayoutParams::from_config(&self.config);
        let placed = layout(self.config.stack_count, self.config.item_extent, &params);
        if stage.registry.apply_layout(&placed) {
            stage.repack.snap_all(&mut stage.registry);
        }
    }
}

impl SceneLifecycle for TransferScene {
    fn on_enter(&mut self, now: HostTime) -> Result<(), ConfigError> {
        self.on_exit();
        self.config.validate()?;
        self.clock.reset();
        self.frame_index = 0;

        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let registry = Registry::populate(&self.config, &mut rng)?;
        let flights = FlightEngine::new(FlightParams::from_config(&self.config), rng.random());
        let mut scheduler = TransferScheduler::from_config(&self.config);
        scheduler.start(self.clock.scene_time(now));

        self.stage = Some(Stage {
            registry,
            repack: RepackAnimator::from_config(&self.config),
            flights,
            scheduler,
        });
        self.relayout();
        if let Some(stage) = self.stage.as_mut() {
            stage.repack.snap_all(&mut stage.registry);
        }
        Ok(())
    }

    fn on_exit(&mut self) {
        if let Some(mut stage) = self.stage.take() {
            stage.scheduler.stop();
            stage.flights.clear();
        }
    }

    fn on_resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.fit = ViewportFit::new(self.config.design_size, viewport);
        self.relayout();
    }
}

fn trace_advance(tracer: &mut Tracer<'_>, advance: Advance, at: HostTime) {
    tracer.source_advance(&SourceAdvanceEvent {
        from: advance.from,
        to: advance.to,
        reason: advance.reason,
        at,
    });
}
