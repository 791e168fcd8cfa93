// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads events from a [`Recording`](super::recorder::Recording)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//! Marker sessions become duration slices on the first track; cues, page
//! transitions and input land on their own tracks as instant events.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use marker_reveal_core::time::HostTime;

use crate::recorder::RecordedEvent;

const SESSION_TRACK: u32 = 0;
const CUE_TRACK: u32 = 1;
const PAGE_TRACK: u32 = 2;
const INPUT_TRACK: u32 = 3;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Wiring-time events are stamped at zero.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::new();

    for recorded in events {
        let ts = recorded.at().map_or(0, to_us);
        match recorded {
            RecordedEvent::EpochBegan { epoch, .. } => {
                out.push(json!({
                    "ph": "B",
                    "name": format!("session {}", epoch.serial()),
                    "cat": "Session",
                    "ts": ts,
                    "pid": 0,
                    "tid": SESSION_TRACK,
                }));
            }
            RecordedEvent::EpochCancelled {
                epoch,
                dropped_timers,
                ..
            } => {
                out.push(json!({
                    "ph": "E",
                    "name": format!("session {}", epoch.serial()),
                    "cat": "Session",
                    "ts": ts,
                    "pid": 0,
                    "tid": SESSION_TRACK,
                    "args": {
                        "dropped_timers": dropped_timers,
                    }
                }));
            }
            RecordedEvent::CueFired { epoch, cue, .. } => {
                out.push(instant(
                    cue,
                    "Cue",
                    ts,
                    CUE_TRACK,
                    json!({ "epoch": epoch.serial() }),
                ));
            }
            RecordedEvent::SequencerState { from, to, .. } => {
                out.push(instant(
                    "SequencerState",
                    "Cue",
                    ts,
                    CUE_TRACK,
                    json!({
                        "from": format!("{from:?}"),
                        "to": format!("{to:?}"),
                    }),
                ));
            }
            RecordedEvent::AcquisitionIgnored { state, .. } => {
                out.push(instant(
                    "AcquisitionIgnored",
                    "Session",
                    ts,
                    SESSION_TRACK,
                    json!({ "state": format!("{state:?}") }),
                ));
            }
            RecordedEvent::PageTransition {
                from, to, phase, ..
            } => {
                out.push(instant(
                    &format!("{} -> {}", from.name(), to.name()),
                    "Page",
                    ts,
                    PAGE_TRACK,
                    json!({ "phase": format!("{phase:?}") }),
                ));
            }
            RecordedEvent::GestureClassified { outcome, .. } => {
                out.push(instant(
                    &format!("{:?}", outcome.classification),
                    "Input",
                    ts,
                    INPUT_TRACK,
                    json!({
                        "duration_ms": outcome.duration.millis(),
                        "path_length": outcome.path_length,
                    }),
                ));
            }
            RecordedEvent::FaceResolved { face, .. } => {
                out.push(instant(
                    "FaceResolved",
                    "Input",
                    ts,
                    INPUT_TRACK,
                    json!({ "face": face.name() }),
                ));
            }
            RecordedEvent::TapUnresolved { .. } => {
                out.push(instant("TapUnresolved", "Input", ts, INPUT_TRACK, json!({})));
            }
            RecordedEvent::ActionPerformed { action, .. } => {
                out.push(instant(
                    "ActionPerformed",
                    "Input",
                    ts,
                    INPUT_TRACK,
                    json!({ "action": format!("{action:?}") }),
                ));
            }
            RecordedEvent::ActionSuppressed { key, .. } => {
                out.push(instant(
                    "ActionSuppressed",
                    "Input",
                    ts,
                    INPUT_TRACK,
                    json!({ "key": format!("{key:?}") }),
                ));
            }
            RecordedEvent::CollaboratorMissing { what } => {
                out.push(instant(
                    "CollaboratorMissing",
                    "Wiring",
                    ts,
                    SESSION_TRACK,
                    json!({ "what": what }),
                ));
            }
            RecordedEvent::CollaboratorFailed { what, error, .. } => {
                out.push(instant(
                    "CollaboratorFailed",
                    "Wiring",
                    ts,
                    SESSION_TRACK,
                    json!({ "what": what, "error": error }),
                ));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: u64, tid: u32, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": tid,
        "s": "t",
        "args": args,
    })
}

fn to_us(t: HostTime) -> u64 {
    t.millis().saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use marker_reveal_core::Experience;
    use marker_reveal_core::backend::Collaborators;
    use marker_reveal_core::config::ExperienceConfig;
    use marker_reveal_core::face::{Face, Hit};
    use marker_reveal_core::trace::Tracer;

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let sink = RecorderSink::new();
        let recording = sink.recording();
        let mut e = Experience::new(
            ExperienceConfig::business_card(),
            Collaborators::none(),
            Tracer::new(Box::new(sink)),
        )
        .unwrap();
        recording.clear();
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        e.pointer_down(HostTime(6_000), Point::new(5.0, 5.0));
        e.pointer_up(HostTime(6_040), Some(Hit::Element(Face::Left)));
        e.target_lost(HostTime(6_200));

        let mut out = Vec::new();
        export(&recording.events(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), recording.len());

        // The session opens first and closes last.
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "session 1");
        let closes: Vec<&Value> = parsed.iter().filter(|v| v["ph"] == "E").collect();
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0]["ts"], 6_200_000);

        // The tap started a page transition on the page track.
        assert!(
            parsed
                .iter()
                .any(|v| v["tid"] == PAGE_TRACK && v["args"]["phase"] == "Started")
        );
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
