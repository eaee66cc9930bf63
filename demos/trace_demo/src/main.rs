// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless transfer scene that exercises the tracing and diagnostics
//! pipeline.
//!
//! Runs the default scene for twenty simulated seconds at 60 Hz, with the
//! host "losing focus" for five seconds in the middle. Events go to both a
//! [`PrettyPrintSink`](ferry_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](ferry_debug::recorder::RecorderSink), frames go to a
//! small in-memory presenter, and the recording is exported as a Chrome
//! trace.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use kurbo::{Point, Size};

use ferry_core::backend::Presenter;
use ferry_core::config::SceneConfig;
use ferry_core::layout::ViewportFit;
use ferry_core::registry::{FrameChanges, Registry};
use ferry_core::scene::{SceneLifecycle, TransferScene};
use ferry_core::time::HostTime;
use ferry_core::trace::{
    ClockEvent, FrameSummary, LandingEvent, LaunchEvent, RepackEvent, SourceAdvanceEvent,
    TraceSink, Tracer,
};

use ferry_debug::pretty::PrettyPrintSink;
use ferry_debug::recorder::RecorderSink;

/// 16.6ms refresh interval in nanoseconds (≈60 Hz).
const REFRESH_INTERVAL_NS: u64 = 16_666_667;
const RUN_MS: u64 = 20_000;
const PAUSE_AT_MS: u64 = 8_000;
const PAUSE_FOR_MS: u64 = 5_000;

fn main() -> Result<(), Box<dyn Error>> {
    // -- sinks -------------------------------------------------------------
    let mut sinks = Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: RecorderSink::new(),
    };
    let mut presenter = PointPresenter::default();

    // -- scene -------------------------------------------------------------
    let mut scene = TransferScene::new(SceneConfig::ace_of_shadows());
    scene.on_resize(Size::new(1920.0, 1080.0));
    scene.on_enter(HostTime(0))?;

    // -- simulated loop ----------------------------------------------------
    let pause_at = HostTime::from_millis(PAUSE_AT_MS);
    let resume_at = HostTime::from_millis(PAUSE_AT_MS + PAUSE_FOR_MS);
    let end = HostTime::from_millis(RUN_MS + PAUSE_FOR_MS);
    let mut now = HostTime(0);
    let mut frames = 0_u64;

    while now <= end {
        let mut tracer = Tracer::new(&mut sinks);
        if now >= pause_at && now < resume_at {
            scene.pause(now, &mut tracer);
        } else if scene.is_paused() {
            scene.resume(now, &mut tracer);
        }

        scene.on_timer(now, &mut tracer);
        if let Some(changes) = scene.on_frame(now, &mut tracer)
            && let Some(registry) = scene.registry()
        {
            presenter.apply(registry, &scene.view_transform(), &changes);
        }
        frames += 1;
        now = HostTime(now.nanos() + REFRESH_INTERVAL_NS);
    }

    scene.on_exit();

    // -- export Chrome trace -----------------------------------------------
    let path = "ferry_trace.json";
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    ferry_debug::chrome::export(sinks.recorder.as_bytes(), &mut writer)?;

    println!(
        "Wrote {path} ({frames} frames, {} sprite updates, {} still in flight at exit)",
        presenter.updates, presenter.in_flight,
    );
    Ok(())
}

/// Forwards every event to both sinks.
#[derive(Debug)]
struct Tee {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Tee {
    fn on_launch(&mut self, e: &LaunchEvent) {
        self.pretty.on_launch(e);
        self.recorder.on_launch(e);
    }

    fn on_landing(&mut self, e: &LandingEvent) {
        self.pretty.on_landing(e);
        self.recorder.on_landing(e);
    }

    fn on_source_advance(&mut self, e: &SourceAdvanceEvent) {
        self.pretty.on_source_advance(e);
        self.recorder.on_source_advance(e);
    }

    fn on_repack(&mut self, e: &RepackEvent) {
        self.recorder.on_repack(e);
    }

    fn on_clock(&mut self, e: &ClockEvent) {
        self.pretty.on_clock(e);
        self.recorder.on_clock(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.recorder.on_frame_summary(s);
    }
}

/// Keeps a window-space position per item, standing in for a sprite tree.
#[derive(Debug, Default)]
struct PointPresenter {
    sprites: Vec<Point>,
    updates: usize,
    in_flight: usize,
}

impl Presenter for PointPresenter {
    fn apply(&mut self, registry: &Registry, view: &ViewportFit, changes: &FrameChanges) {
        if self.sprites.len() != registry.item_count() {
            self.sprites = vec![Point::ORIGIN; registry.item_count()];
        }
        let to_window = view.affine();
        for &item in changes.poses.iter().chain(&changes.reparented) {
            self.sprites[item.index()] = to_window * registry.world_pose(item).position;
            self.updates += 1;
        }
        self.in_flight = registry.in_flight_count();
    }
}
