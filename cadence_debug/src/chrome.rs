// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Layout:
//!
//! - each tick is a `B`/`E` duration from begin-frame to idle, with an
//!   instant marker at the deadline;
//! - actions and draws are thread-scoped instants;
//! - each submitted frame is an async span closed by its ack;
//! - state records become a `PendingSubmitFrames` counter track.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::VecDeque;
use std::io::{self, Write};

use serde_json::{Value, json};

use cadence_core::trace::FramePhase;

use crate::recorder::{RecordedEvent, decode};

const FRAME_SPAN: &str = "BeginImplFrame";

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Events without their own timestamp (draws, state records) use the most
/// recent timestamp seen before them.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events = to_events(bytes);
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// Converts recorded bytes into trace event objects.
#[must_use]
pub fn to_events(bytes: &[u8]) -> Vec<Value> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;
    let mut next_submit_id: u64 = 0;
    let mut open_submits: VecDeque<u64> = VecDeque::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Frame(e) => {
                last_ts = ns_to_us(e.timestamp);
                let args = json!({ "frame_number": e.frame_number });
                events.push(match e.phase {
                    FramePhase::BeginFrame => json!({
                        "ph": "B",
                        "name": FRAME_SPAN,
                        "cat": "Scheduler",
                        "ts": last_ts,
                        "pid": 0,
                        "tid": 0,
                        "args": args,
                    }),
                    FramePhase::Deadline => json!({
                        "ph": "i",
                        "name": "Deadline",
                        "cat": "Scheduler",
                        "ts": last_ts,
                        "pid": 0,
                        "tid": 0,
                        "s": "t",
                        "args": args,
                    }),
                    FramePhase::Idle => json!({
                        "ph": "E",
                        "name": FRAME_SPAN,
                        "cat": "Scheduler",
                        "ts": last_ts,
                        "pid": 0,
                        "tid": 0,
                        "args": args,
                    }),
                });
            }
            RecordedEvent::Action(e) => {
                last_ts = ns_to_us(e.timestamp);
                events.push(json!({
                    "ph": "i",
                    "name": e.action.as_str(),
                    "cat": "Action",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_number": e.frame_number,
                    }
                }));
            }
            RecordedEvent::Draw(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Draw",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_number": e.frame_number,
                        "action": e.action.as_str(),
                        "result": e.result.as_str(),
                        "did_submit": e.did_submit,
                    }
                }));
            }
            RecordedEvent::Submit(e) => {
                last_ts = ns_to_us(e.timestamp);
                let id = next_submit_id;
                next_submit_id += 1;
                open_submits.push_back(id);
                events.push(json!({
                    "ph": "b",
                    "name": "PendingSubmitFrame",
                    "cat": "Frame",
                    "id": id,
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_number": e.frame_number,
                        "pending_submit_frames": e.pending_submit_frames,
                    }
                }));
            }
            RecordedEvent::Ack(e) => {
                last_ts = ns_to_us(e.timestamp);
                // An ack without a recorded submit has no span to close.
                if let Some(id) = open_submits.pop_front() {
                    events.push(json!({
                        "ph": "e",
                        "name": "PendingSubmitFrame",
                        "cat": "Frame",
                        "id": id,
                        "ts": last_ts,
                        "pid": 0,
                        "tid": 0,
                        "args": {
                            "frame_number": e.frame_number,
                            "pending_submit_frames": e.pending_submit_frames,
                        }
                    }));
                }
            }
            RecordedEvent::State(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": "PendingSubmitFrames",
                    "cat": "State",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "pending": s.pending_submit_frames,
                    }
                }));
                events.push(json!({
                    "ph": "i",
                    "name": "State",
                    "cat": "State",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_number": s.frame_number,
                        "next_action": s.major.next_action.as_str(),
                        "begin_impl_frame_state": s.major.begin_impl_frame_state.as_str(),
                        "begin_main_frame_state": s.major.begin_main_frame_state.as_str(),
                        "compositor_frame_sink_state": s.major.frame_sink_state.as_str(),
                        "forced_redraw_state": s.major.forced_redraw_state.as_str(),
                        "commit_count": s.commit_count,
                        "needs_redraw": s.needs_redraw,
                        "needs_begin_main_frame": s.needs_begin_main_frame,
                    }
                }));
            }
        }
    }

    events
}

fn ns_to_us(ns: u64) -> f64 {
    ns as f64 / 1000.0
}
