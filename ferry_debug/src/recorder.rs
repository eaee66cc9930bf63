// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use ferry_core::registry::{ItemId, StackId};
use ferry_core::scheduler::AdvanceReason;
use ferry_core::time::{Duration, HostTime};
use ferry_core::trace::{
    ClockEvent, ClockEventKind, FrameSummary, LandingEvent, LaunchEvent, RepackEvent,
    SourceAdvanceEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_LAUNCH: u8 = 1;
const TAG_LANDING: u8 = 2;
const TAG_SOURCE_ADVANCE: u8 = 3;
const TAG_REPACK: u8 = 4;
const TAG_CLOCK: u8 = 5;
const TAG_FRAME_SUMMARY: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_count(&mut self, v: usize) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "counts capped at u32::MAX for recording"
        )]
        self.write_u32(v.min(u32::MAX as usize) as u32);
    }

    fn write_reason(&mut self, r: AdvanceReason) {
        self.write_u8(match r {
            AdvanceReason::Empty => 0,
            AdvanceReason::MoveCap => 1,
            AdvanceReason::Drained => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_launch(&mut self, e: &LaunchEvent) {
        self.write_u8(TAG_LAUNCH);
        self.write_u32(e.item.get());
        self.write_u32(e.source.get());
        self.write_u32(e.destination.get());
        self.write_u64(e.at.nanos());
        self.write_f64(e.arc_height);
    }

    fn on_landing(&mut self, e: &LandingEvent) {
        self.write_u8(TAG_LANDING);
        self.write_u32(e.item.get());
        self.write_u32(e.source.get());
        self.write_u32(e.destination.get());
        self.write_u64(e.at.nanos());
        self.write_u64(e.flight_time.nanos());
    }

    fn on_source_advance(&mut self, e: &SourceAdvanceEvent) {
        self.write_u8(TAG_SOURCE_ADVANCE);
        self.write_u32(e.from.get());
        self.write_u32(e.to.get());
        self.write_reason(e.reason);
        self.write_u64(e.at.nanos());
    }

    fn on_repack(&mut self, e: &RepackEvent) {
        self.write_u8(TAG_REPACK);
        self.write_u32(e.stack.get());
        self.write_count(e.len);
        self.write_u64(e.at.nanos());
    }

    fn on_clock(&mut self, e: &ClockEvent) {
        self.write_u8(TAG_CLOCK);
        self.write_u8(match e.kind {
            ClockEventKind::Pause => 0,
            ClockEventKind::Resume => 1,
        });
        self.write_u64(e.host.nanos());
        self.write_u64(e.paused_for.nanos());
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u64(s.host.nanos());
        self.write_u64(s.scene_time.nanos());
        self.write_count(s.in_flight);
        self.write_count(s.landed);
        self.write_count(s.changed_poses);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`LaunchEvent`].
    Launch(LaunchEvent),
    /// A [`LandingEvent`].
    Landing(LandingEvent),
    /// A [`SourceAdvanceEvent`].
    SourceAdvance(SourceAdvanceEvent),
    /// A [`RepackEvent`].
    Repack(RepackEvent),
    /// A [`ClockEvent`].
    Clock(ClockEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_count(&mut self) -> Option<usize> {
        self.read_u32().map(|v| v as usize)
    }

    fn read_item(&mut self) -> Option<ItemId> {
        self.read_u32().map(ItemId::new)
    }

    fn read_stack(&mut self) -> Option<StackId> {
        self.read_u32().map(StackId::new)
    }

    fn read_reason(&mut self) -> Option<AdvanceReason> {
        Some(match self.read_u8()? {
            0 => AdvanceReason::Empty,
            1 => AdvanceReason::MoveCap,
            _ => AdvanceReason::Drained,
        })
    }

    fn decode_launch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Launch(LaunchEvent {
            item: self.read_item()?,
            source: self.read_stack()?,
            destination: self.read_stack()?,
            at: HostTime(self.read_u64()?),
            arc_height: self.read_f64()?,
        }))
    }

    fn decode_landing(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Landing(LandingEvent {
            item: self.read_item()?,
            source: self.read_stack()?,
            destination: self.read_stack()?,
            at: HostTime(self.read_u64()?),
            flight_time: Duration(self.read_u64()?),
        }))
    }

    fn decode_source_advance(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SourceAdvance(SourceAdvanceEvent {
            from: self.read_stack()?,
            to: self.read_stack()?,
            reason: self.read_reason()?,
            at: HostTime(self.read_u64()?),
        }))
    }

    fn decode_repack(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Repack(RepackEvent {
            stack: self.read_stack()?,
            len: self.read_count()?,
            at: HostTime(self.read_u64()?),
        }))
    }

    fn decode_clock(&mut self) -> Option<RecordedEvent> {
        let kind = match self.read_u8()? {
            0 => ClockEventKind::Pause,
            _ => ClockEventKind::Resume,
        };
        Some(RecordedEvent::Clock(ClockEvent {
            kind,
            host: HostTime(self.read_u64()?),
            paused_for: Duration(self.read_u64()?),
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            host: HostTime(self.read_u64()?),
            scene_time: HostTime(self.read_u64()?),
            in_flight: self.read_count()?,
            landed: self.read_count()?,
            changed_poses: self.read_count()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_LAUNCH => self.decode_launch(),
            TAG_LANDING => self.decode_landing(),
            TAG_SOURCE_ADVANCE => self.decode_source_advance(),
            TAG_REPACK => self.decode_repack(),
            TAG_CLOCK => self.decode_clock(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_launch() -> LaunchEvent {
        LaunchEvent {
            item: ItemId::new(17),
            source: StackId::new(0),
            destination: StackId::new(4),
            at: HostTime::from_millis(3_000),
            arc_height: 137.25,
        }
    }

    #[test]
    fn recorded_session_decodes_in_order() {
        let mut rec = RecorderSink::new();
        let launch = sample_launch();
        let landing = LandingEvent {
            item: launch.item,
            source: launch.source,
            destination: launch.destination,
            at: HostTime::from_millis(5_000),
            flight_time: Duration::from_millis(2_000),
        };
        let advance = SourceAdvanceEvent {
            from: StackId::new(0),
            to: StackId::new(1),
            reason: AdvanceReason::MoveCap,
            at: HostTime::from_millis(6_000),
        };
        let pause = ClockEvent {
            kind: ClockEventKind::Resume,
            host: HostTime::from_millis(11_000),
            paused_for: Duration::from_millis(5_000),
        };
        rec.on_launch(&launch);
        rec.on_landing(&landing);
        rec.on_source_advance(&advance);
        rec.on_clock(&pause);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            vec![
                RecordedEvent::Launch(launch),
                RecordedEvent::Landing(landing),
                RecordedEvent::SourceAdvance(advance),
                RecordedEvent::Clock(pause),
            ]
        );
    }

    #[test]
    fn repack_and_summary_keep_counts() {
        let mut rec = RecorderSink::new();
        rec.on_repack(&RepackEvent {
            stack: StackId::new(3),
            len: 13,
            at: HostTime(42),
        });
        rec.on_frame_summary(&FrameSummary {
            frame_index: 90,
            host: HostTime(7),
            scene_time: HostTime(5),
            in_flight: 2,
            landed: 1,
            changed_poses: 14,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::Repack(e) => {
                assert_eq!(e.stack, StackId::new(3));
                assert_eq!(e.len, 13);
            }
            other => panic!("expected Repack, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::FrameSummary(s) => {
                assert_eq!(s.frame_index, 90);
                assert_eq!(s.changed_poses, 14);
                assert_eq!(s.scene_time, HostTime(5));
            }
            other => panic!("expected FrameSummary, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_launch(&sample_launch());
        rec.on_launch(&sample_launch());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
