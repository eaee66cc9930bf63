// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds.

use std::io::Write;

use ferry_core::time::{Duration, HostTime};
use ferry_core::trace::{
    ClockEvent, ClockEventKind, FrameSummary, LandingEvent, LaunchEvent, RepackEvent,
    SourceAdvanceEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    frame_summaries: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("frame_summaries", &self.frame_summaries)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            frame_summaries: false,
        }
    }

    /// Also prints a line per frame summary. Off by default; frames are
    /// frequent.
    #[must_use]
    pub fn with_frame_summaries(mut self, enabled: bool) -> Self {
        self.frame_summaries = enabled;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.nanos() as f64 / 1e6
}

fn ms_span(d: Duration) -> f64 {
    d.nanos() as f64 / 1e6
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_launch(&mut self, e: &LaunchEvent) {
        let _ = writeln!(
            self.writer,
            "[launch] {:.1}ms item={} {}->{} arc={:.1}",
            ms(e.at),
            e.item.get(),
            e.source.get(),
            e.destination.get(),
            e.arc_height,
        );
    }

    fn on_landing(&mut self, e: &LandingEvent) {
        let _ = writeln!(
            self.writer,
            "[land] {:.1}ms item={} {}->{} after {:.1}ms",
            ms(e.at),
            e.item.get(),
            e.source.get(),
            e.destination.get(),
            ms_span(e.flight_time),
        );
    }

    fn on_source_advance(&mut self, e: &SourceAdvanceEvent) {
        let _ = writeln!(
            self.writer,
            "[source] {:.1}ms {}->{} reason={:?}",
            ms(e.at),
            e.from.get(),
            e.to.get(),
            e.reason,
        );
    }

    fn on_repack(&mut self, e: &RepackEvent) {
        let _ = writeln!(
            self.writer,
            "[repack] {:.1}ms stack={} len={}",
            ms(e.at),
            e.stack.get(),
            e.len,
        );
    }

    fn on_clock(&mut self, e: &ClockEvent) {
        match e.kind {
            ClockEventKind::Pause => {
                let _ = writeln!(self.writer, "[pause] host={:.1}ms", ms(e.host));
            }
            ClockEventKind::Resume => {
                let _ = writeln!(
                    self.writer,
                    "[resume] host={:.1}ms paused_for={:.1}ms",
                    ms(e.host),
                    ms_span(e.paused_for),
                );
            }
        }
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        if !self.frame_summaries {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[frame] {} scene={:.1}ms in_flight={} landed={} poses={}",
            s.frame_index,
            ms(s.scene_time),
            s.in_flight,
            s.landed,
            s.changed_poses,
        );
    }
}
