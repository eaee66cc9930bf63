// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Process 0 is the scene timeline (scene time, pauses excluded): one track
//! per source stack with a complete span per flight, plus an in-flight
//! counter. Process 1 is the host timeline and carries pause and resume.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::HashMap;
use std::io::{self, Write};

use serde_json::{Value, json};

use ferry_core::registry::ItemId;
use ferry_core::trace::LaunchEvent;

use crate::recorder::{RecordedEvent, decode};

const SCENE_PID: u32 = 0;
const HOST_PID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Each landing is paired with its launch and emitted as a complete (`"X"`)
/// span. Launches that never landed are emitted as instants.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut pending: HashMap<ItemId, LaunchEvent> = HashMap::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Launch(e) => {
                pending.insert(e.item, e);
            }
            RecordedEvent::Landing(e) => {
                let arc_height = pending.remove(&e.item).map(|l| l.arc_height);
                let start = e.at.nanos().saturating_sub(e.flight_time.nanos());
                events.push(json!({
                    "ph": "X",
                    "name": format!("item {}", e.item.get()),
                    "cat": "Flight",
                    "ts": nanos_to_us(start),
                    "dur": nanos_to_us(e.flight_time.nanos()),
                    "pid": SCENE_PID,
                    "tid": e.source.get(),
                    "args": {
                        "destination": e.destination.get(),
                        "arc_height": arc_height,
                    }
                }));
            }
            RecordedEvent::SourceAdvance(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "SourceAdvance",
                    "cat": "Scheduler",
                    "ts": nanos_to_us(e.at.nanos()),
                    "pid": SCENE_PID,
                    "tid": e.from.get(),
                    "s": "g",
                    "args": {
                        "from": e.from.get(),
                        "to": e.to.get(),
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::Repack(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Repack",
                    "cat": "Layout",
                    "ts": nanos_to_us(e.at.nanos()),
                    "pid": SCENE_PID,
                    "tid": e.stack.get(),
                    "s": "t",
                    "args": {
                        "len": e.len,
                    }
                }));
            }
            RecordedEvent::Clock(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Clock",
                    "ts": nanos_to_us(e.host.nanos()),
                    "pid": HOST_PID,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "paused_for_us": nanos_to_us(e.paused_for.nanos()),
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": "InFlight",
                    "cat": "Summary",
                    "ts": nanos_to_us(s.scene_time.nanos()),
                    "pid": SCENE_PID,
                    "args": {
                        "in_flight": s.in_flight,
                    }
                }));
            }
        }
    }

    let mut unlanded: Vec<LaunchEvent> = pending.into_values().collect();
    unlanded.sort_by_key(|l| (l.at, l.item));
    for l in unlanded {
        events.push(json!({
            "ph": "i",
            "name": format!("item {}", l.item.get()),
            "cat": "Flight",
            "ts": nanos_to_us(l.at.nanos()),
            "pid": SCENE_PID,
            "tid": l.source.get(),
            "s": "t",
            "args": {
                "destination": l.destination.get(),
                "arc_height": l.arc_height,
                "landed": false,
            }
        }));
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use ferry_core::registry::StackId;
    use ferry_core::time::{Duration, HostTime};
    use ferry_core::trace::{ClockEvent, ClockEventKind, LandingEvent, TraceSink};

    fn launch(item: u32, at_ms: u64) -> LaunchEvent {
        LaunchEvent {
            item: ItemId::new(item),
            source: StackId::new(2),
            destination: StackId::new(5),
            at: HostTime::from_millis(at_ms),
            arc_height: 125.0,
        }
    }

    #[test]
    fn landing_pairs_into_a_complete_span() {
        let mut rec = RecorderSink::new();
        rec.on_launch(&launch(9, 1_000));
        rec.on_launch(&launch(10, 2_000));
        rec.on_landing(&LandingEvent {
            item: ItemId::new(9),
            source: StackId::new(2),
            destination: StackId::new(5),
            at: HostTime::from_millis(3_000),
            flight_time: Duration::from_millis(2_000),
        });
        rec.on_clock(&ClockEvent {
            kind: ClockEventKind::Pause,
            host: HostTime::from_millis(3_100),
            paused_for: Duration::ZERO,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "X");
        assert_eq!(parsed[0]["name"], "item 9");
        assert_eq!(parsed[0]["ts"], 1_000_000.0);
        assert_eq!(parsed[0]["dur"], 2_000_000.0);
        assert_eq!(parsed[0]["tid"], 2);
        assert_eq!(parsed[0]["args"]["arc_height"], 125.0);

        assert_eq!(parsed[1]["name"], "Pause");
        assert_eq!(parsed[1]["pid"], 1);

        // Still airborne when the recording ended.
        assert_eq!(parsed[2]["ph"], "i");
        assert_eq!(parsed[2]["name"], "item 10");
        assert_eq!(parsed[2]["args"]["landed"], false);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
