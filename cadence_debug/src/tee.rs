// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.

use cadence_core::snapshot::StateSnapshot;
use cadence_core::trace::{AckEvent, ActionEvent, DrawEvent, FrameEvent, SubmitEvent, TraceSink};

/// A [`TraceSink`] that forwards every event to `first`, then `second`.
///
/// A [`Tracer`](cadence_core::trace::Tracer) holds one sink; nest tees to
/// reach more.
#[derive(Debug)]
pub struct TeeSink<A, B> {
    /// Receives each event first.
    pub first: A,
    /// Receives each event second.
    pub second: B,
}

impl<A: TraceSink, B: TraceSink> TeeSink<A, B> {
    /// Combines two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Splits the tee back into its sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: TraceSink, B: TraceSink> TraceSink for TeeSink<A, B> {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.first.on_frame(e);
        self.second.on_frame(e);
    }

    fn on_action(&mut self, e: &ActionEvent) {
        self.first.on_action(e);
        self.second.on_action(e);
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.first.on_draw(e);
        self.second.on_draw(e);
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        self.first.on_submit(e);
        self.second.on_submit(e);
    }

    fn on_ack(&mut self, e: &AckEvent) {
        self.first.on_ack(e);
        self.second.on_ack(e);
    }

    fn on_state_snapshot(&mut self, frame_number: u64, snapshot: &StateSnapshot) {
        self.first.on_state_snapshot(frame_number, snapshot);
        self.second.on_state_snapshot(frame_number, snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecorderSink, decode};
    use cadence_core::trace::FramePhase;

    #[test]
    fn both_sinks_see_every_event() {
        let mut tee = TeeSink::new(RecorderSink::new(), RecorderSink::new());
        tee.on_frame(&FrameEvent {
            frame_number: 1,
            phase: FramePhase::Idle,
            timestamp: 5,
        });
        let (a, b) = tee.into_inner();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(decode(a.as_bytes()).count(), 1);
    }
}
