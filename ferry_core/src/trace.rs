// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the transfer scene.
//!
//! This module provides a [`TraceSink`] trait with one method per scene
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing. When **on**,
//! each method performs a single `Option` branch before dispatching.
//!
//! Timestamps named `at` are scene time; [`ClockEvent`] and
//! [`FrameSummary`] also carry host time.

use crate::registry::{ItemId, StackId};
use crate::scheduler::AdvanceReason;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an item leaves its source stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaunchEvent {
    /// The item now in flight.
    pub item: ItemId,
    /// Stack it was taken from.
    pub source: StackId,
    /// Stack it is flying to.
    pub destination: StackId,
    /// Scene time of the launch.
    pub at: HostTime,
    /// Peak arc height chosen for this flight.
    pub arc_height: f64,
}

/// Emitted when a flight completes and the item joins its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandingEvent {
    /// The item that landed.
    pub item: ItemId,
    /// Stack it was launched from.
    pub source: StackId,
    /// Stack it joined.
    pub destination: StackId,
    /// Scene time of the landing.
    pub at: HostTime,
    /// Scene time spent in flight.
    pub flight_time: Duration,
}

/// Emitted when the scheduler moves on to a new source stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceAdvanceEvent {
    /// Previous source.
    pub from: StackId,
    /// New source.
    pub to: StackId,
    /// Why the source changed.
    pub reason: AdvanceReason,
    /// Scene time of the change.
    pub at: HostTime,
}

/// Emitted when a stack's repack animation is (re)started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepackEvent {
    /// The stack being repacked.
    pub stack: StackId,
    /// Its item count at request time.
    pub len: usize,
    /// Scene time of the request.
    pub at: HostTime,
}

/// Which clock transition a [`ClockEvent`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockEventKind {
    /// Scene time froze.
    Pause,
    /// Scene time resumed.
    Resume,
}

/// Emitted on pause and resume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockEvent {
    /// Which transition.
    pub kind: ClockEventKind,
    /// Host time of the transition.
    pub host: HostTime,
    /// Length of the pause that just ended (zero for [`ClockEventKind::Pause`]).
    pub paused_for: Duration,
}

/// Per-frame summary emitted at the end of each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSummary {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time of the frame.
    pub host: HostTime,
    /// Scene time of the frame.
    pub scene_time: HostTime,
    /// Flights still active after this frame.
    pub in_flight: usize,
    /// Flights that landed this frame.
    pub landed: usize,
    /// Items whose pose changed this frame.
    pub changed_poses: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the transfer scene.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an item is launched.
    fn on_launch(&mut self, e: &LaunchEvent) {
        _ = e;
    }

    /// Called when an item lands.
    fn on_landing(&mut self, e: &LandingEvent) {
        _ = e;
    }

    /// Called when the scheduler changes source.
    fn on_source_advance(&mut self, e: &SourceAdvanceEvent) {
        _ = e;
    }

    /// Called when a repack animation is requested.
    fn on_repack(&mut self, e: &RepackEvent) {
        _ = e;
    }

    /// Called on pause and resume.
    fn on_clock(&mut self, e: &ClockEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`LaunchEvent`].
    #[inline]
    pub fn launch(&mut self, e: &LaunchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_launch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LandingEvent`].
    #[inline]
    pub fn landing(&mut self, e: &LandingEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_landing(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SourceAdvanceEvent`].
    #[inline]
    pub fn source_advance(&mut self, e: &SourceAdvanceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_source_advance(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RepackEvent`].
    #[inline]
    pub fn repack(&mut self, e: &RepackEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_repack(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClockEvent`].
    #[inline]
    pub fn clock(&mut self, e: &ClockEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clock(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
