// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in microseconds.

use std::io::Write;

use cadence_core::snapshot::StateSnapshot;
use cadence_core::trace::{AckEvent, ActionEvent, DrawEvent, FrameEvent, SubmitEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    snapshots: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("snapshots", &self.snapshots)
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
        Self {
            writer,
            snapshots: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            snapshots: true,
        }
    }

    /// Sets whether end-of-tick state lines are printed.
    #[must_use]
    pub fn with_snapshots(mut self, snapshots: bool) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ns_to_us(ns: u64) -> f64 {
    ns as f64 / 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame(&mut self, e: &FrameEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] #{} {} at {:.1}µs",
            e.frame_number,
            e.phase.as_str(),
            ns_to_us(e.timestamp),
        );
    }

    fn on_action(&mut self, e: &ActionEvent) {
        let _ = writeln!(
            self.writer,
            "[action] #{} {}",
            e.frame_number,
            e.action.as_str(),
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let submitted = if e.did_submit { "submitted" } else { "-" };
        let _ = writeln!(
            self.writer,
            "[draw] #{} {} -> {} {submitted}",
            e.frame_number,
            e.action.as_str(),
            e.result.as_str(),
        );
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        let _ = writeln!(
            self.writer,
            "[submit] #{} pending={} at {:.1}µs",
            e.frame_number,
            e.pending_submit_frames,
            ns_to_us(e.timestamp),
        );
    }

    fn on_ack(&mut self, e: &AckEvent) {
        let _ = writeln!(
            self.writer,
            "[ack] #{} pending={} at {:.1}µs",
            e.frame_number,
            e.pending_submit_frames,
            ns_to_us(e.timestamp),
        );
    }

    fn on_state_snapshot(&mut self, frame_number: u64, s: &StateSnapshot) {
        if !self.snapshots {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[state] #{frame_number} next={} sink={} main={} forced={} \
             commits={} pending_submits={}",
            s.major.next_action.as_str(),
            s.major.frame_sink_state.as_str(),
            s.major.begin_main_frame_state.as_str(),
            s.major.forced_redraw_state.as_str(),
            s.minor.commit_count,
            s.minor.pending_submit_frames,
        );
    }
}
