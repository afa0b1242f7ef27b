// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! State snapshots are large, so only a [`StateRecord`] summary is stored.

use cadence_core::snapshot::{MajorState, StateSnapshot};
use cadence_core::state::{
    Action, BeginImplFrameState, BeginMainFrameState, DrawResult, ForcedRedrawState,
    FrameSinkState,
};
use cadence_core::trace::{
    AckEvent, ActionEvent, DrawEvent, FrameEvent, FramePhase, SubmitEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME: u8 = 1;
const TAG_ACTION: u8 = 2;
const TAG_DRAW: u8 = 3;
const TAG_SUBMIT: u8 = 4;
const TAG_ACK: u8 = 5;
const TAG_STATE: u8 = 6;

// ---------------------------------------------------------------------------
// Enum codes
// ---------------------------------------------------------------------------

const ACTIONS: [Action; 10] = [
    Action::None,
    Action::SendBeginMainFrame,
    Action::Commit,
    Action::ActivateSyncTree,
    Action::DrawIfPossible,
    Action::DrawForced,
    Action::DrawAbort,
    Action::BeginSurfaceCreation,
    Action::PrepareTiles,
    Action::InvalidateSurface,
];

const DRAW_RESULTS: [DrawResult; 7] = [
    DrawResult::Invalid,
    DrawResult::Success,
    DrawResult::AbortedCheckerboardAnimations,
    DrawResult::AbortedMissingHighResContent,
    DrawResult::AbortedContextLost,
    DrawResult::AbortedCantDraw,
    DrawResult::AbortedDrainingPipeline,
];

const PHASES: [FramePhase; 3] = [FramePhase::BeginFrame, FramePhase::Deadline, FramePhase::Idle];

const IMPL_FRAME_STATES: [BeginImplFrameState; 3] = [
    BeginImplFrameState::Idle,
    BeginImplFrameState::InsideBeginFrame,
    BeginImplFrameState::InsideDeadline,
];

const MAIN_FRAME_STATES: [BeginMainFrameState; 4] = [
    BeginMainFrameState::Idle,
    BeginMainFrameState::Sent,
    BeginMainFrameState::Started,
    BeginMainFrameState::ReadyToCommit,
];

const SINK_STATES: [FrameSinkState; 5] = [
    FrameSinkState::None,
    FrameSinkState::Creating,
    FrameSinkState::WaitingForFirstCommit,
    FrameSinkState::WaitingForFirstActivation,
    FrameSinkState::Active,
];

const FORCED_REDRAW_STATES: [ForcedRedrawState; 4] = [
    ForcedRedrawState::Idle,
    ForcedRedrawState::WaitingForCommit,
    ForcedRedrawState::WaitingForActivation,
    ForcedRedrawState::WaitingForDraw,
];

/// Index of `value` in `table`. Every table lists all variants.
fn code_of<T: PartialEq>(table: &[T], value: &T) -> u8 {
    let idx = table.iter().position(|v| v == value).unwrap_or(0);
    #[expect(
        clippy::cast_possible_truncation,
        reason = "enum tables have fewer than 256 entries"
    )]
    let code = idx as u8;
    code
}

fn from_code<T: Copy>(table: &[T], code: u8) -> Option<T> {
    table.get(usize::from(code)).copied()
}

// ---------------------------------------------------------------------------
// StateRecord
// ---------------------------------------------------------------------------

/// The part of a [`StateSnapshot`] kept in a recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateRecord {
    /// Begin-impl-frame counter.
    pub frame_number: u64,
    /// Next action and lifecycle states.
    pub major: MajorState,
    /// Submitted frames awaiting an ack.
    pub pending_submit_frames: u32,
    /// Commits so far.
    pub commit_count: u64,
    /// A redraw is requested.
    pub needs_redraw: bool,
    /// A main frame is requested.
    pub needs_begin_main_frame: bool,
}

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

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_action(&mut self, a: Action) {
        self.write_u8(code_of(&ACTIONS, &a));
    }
}

impl TraceSink for RecorderSink {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.write_u8(TAG_FRAME);
        self.write_u64(e.frame_number);
        self.write_u8(code_of(&PHASES, &e.phase));
        self.write_u64(e.timestamp);
    }

    fn on_action(&mut self, e: &ActionEvent) {
        self.write_u8(TAG_ACTION);
        self.write_u64(e.frame_number);
        self.write_action(e.action);
        self.write_u64(e.timestamp);
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.write_u8(TAG_DRAW);
        self.write_u64(e.frame_number);
        self.write_action(e.action);
        self.write_u8(code_of(&DRAW_RESULTS, &e.result));
        self.write_bool(e.did_submit);
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        self.write_u8(TAG_SUBMIT);
        self.write_u64(e.frame_number);
        self.write_u32(e.pending_submit_frames);
        self.write_u64(e.timestamp);
    }

    fn on_ack(&mut self, e: &AckEvent) {
        self.write_u8(TAG_ACK);
        self.write_u64(e.frame_number);
        self.write_u32(e.pending_submit_frames);
        self.write_u64(e.timestamp);
    }

    fn on_state_snapshot(&mut self, frame_number: u64, snapshot: &StateSnapshot) {
        let major = &snapshot.major;
        self.write_u8(TAG_STATE);
        self.write_u64(frame_number);
        self.write_action(major.next_action);
        self.write_u8(code_of(&IMPL_FRAME_STATES, &major.begin_impl_frame_state));
        self.write_u8(code_of(&MAIN_FRAME_STATES, &major.begin_main_frame_state));
        self.write_u8(code_of(&SINK_STATES, &major.frame_sink_state));
        self.write_u8(code_of(&FORCED_REDRAW_STATES, &major.forced_redraw_state));
        self.write_u32(snapshot.minor.pending_submit_frames);
        self.write_u64(snapshot.minor.commit_count);
        self.write_bool(snapshot.minor.needs_redraw);
        self.write_bool(snapshot.minor.needs_begin_main_frame);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`FrameEvent`].
    Frame(FrameEvent),
    /// An [`ActionEvent`].
    Action(ActionEvent),
    /// A [`DrawEvent`].
    Draw(DrawEvent),
    /// A [`SubmitEvent`].
    Submit(SubmitEvent),
    /// An [`AckEvent`].
    Ack(AckEvent),
    /// A state snapshot summary.
    State(StateRecord),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record, unknown tag or unknown
/// enum code.
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

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_enum<T: Copy>(&mut self, table: &[T]) -> Option<T> {
        from_code(table, self.read_u8()?)
    }

    fn decode_frame(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Frame(FrameEvent {
            frame_number: self.read_u64()?,
            phase: self.read_enum(&PHASES)?,
            timestamp: self.read_u64()?,
        }))
    }

    fn decode_action(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Action(ActionEvent {
            frame_number: self.read_u64()?,
            action: self.read_enum(&ACTIONS)?,
            timestamp: self.read_u64()?,
        }))
    }

    fn decode_draw(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Draw(DrawEvent {
            frame_number: self.read_u64()?,
            action: self.read_enum(&ACTIONS)?,
            result: self.read_enum(&DRAW_RESULTS)?,
            did_submit: self.read_bool()?,
        }))
    }

    fn decode_submit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Submit(SubmitEvent {
            frame_number: self.read_u64()?,
            pending_submit_frames: self.read_u32()?,
            timestamp: self.read_u64()?,
        }))
    }

    fn decode_ack(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Ack(AckEvent {
            frame_number: self.read_u64()?,
            pending_submit_frames: self.read_u32()?,
            timestamp: self.read_u64()?,
        }))
    }

    fn decode_state(&mut self) -> Option<RecordedEvent> {
        let frame_number = self.read_u64()?;
        let major = MajorState {
            next_action: self.read_enum(&ACTIONS)?,
            begin_impl_frame_state: self.read_enum(&IMPL_FRAME_STATES)?,
            begin_main_frame_state: self.read_enum(&MAIN_FRAME_STATES)?,
            frame_sink_state: self.read_enum(&SINK_STATES)?,
            forced_redraw_state: self.read_enum(&FORCED_REDRAW_STATES)?,
        };
        Some(RecordedEvent::State(StateRecord {
            frame_number,
            major,
            pending_submit_frames: self.read_u32()?,
            commit_count: self.read_u64()?,
            needs_redraw: self.read_bool()?,
            needs_begin_main_frame: self.read_bool()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME => self.decode_frame(),
            TAG_ACTION => self.decode_action(),
            TAG_DRAW => self.decode_draw(),
            TAG_SUBMIT => self.decode_submit(),
            TAG_ACK => self.decode_ack(),
            TAG_STATE => self.decode_state(),
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
    use cadence_core::machine::PipelineStateMachine;
    use cadence_core::settings::SchedulerSettings;

    #[test]
    fn enum_tables_cover_every_variant() {
        for (i, a) in ACTIONS.iter().enumerate() {
            assert_eq!(usize::from(code_of(&ACTIONS, a)), i, "duplicate {a:?}");
        }
        for (i, r) in DRAW_RESULTS.iter().enumerate() {
            assert_eq!(usize::from(code_of(&DRAW_RESULTS, r)), i, "duplicate {r:?}");
        }
        assert_eq!(from_code(&ACTIONS, 10), None);
    }

    #[test]
    fn records_a_tick_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_frame(&FrameEvent {
            frame_number: 3,
            phase: FramePhase::Deadline,
            timestamp: 8_000_000,
        });
        rec.on_action(&ActionEvent {
            frame_number: 3,
            action: Action::DrawForced,
            timestamp: 8_000_000,
        });
        rec.on_draw(&DrawEvent {
            frame_number: 3,
            action: Action::DrawForced,
            result: DrawResult::Success,
            did_submit: true,
        });
        rec.on_submit(&SubmitEvent {
            frame_number: 3,
            pending_submit_frames: 1,
            timestamp: 8_000_000,
        });
        rec.on_ack(&AckEvent {
            frame_number: 4,
            pending_submit_frames: 0,
            timestamp: 20_000_000,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5);
        match &events[0] {
            RecordedEvent::Frame(e) => {
                assert_eq!(e.phase, FramePhase::Deadline);
                assert_eq!(e.timestamp, 8_000_000);
            }
            other => panic!("expected Frame, got {other:?}"),
        }
        match &events[2] {
            RecordedEvent::Draw(e) => {
                assert_eq!(e.action, Action::DrawForced);
                assert_eq!(e.result, DrawResult::Success);
                assert!(e.did_submit);
            }
            other => panic!("expected Draw, got {other:?}"),
        }
        assert!(matches!(events[3], RecordedEvent::Submit(_)));
        match &events[4] {
            RecordedEvent::Ack(e) => {
                assert_eq!(e.frame_number, 4);
                assert_eq!(e.pending_submit_frames, 0);
            }
            other => panic!("expected Ack, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_is_summarized() {
        let mut sm = PipelineStateMachine::new(SchedulerSettings::default());
        sm.set_visible(true);
        sm.set_can_draw(true);
        sm.set_needs_redraw();
        let snapshot = sm.snapshot();

        let mut rec = RecorderSink::new();
        rec.on_state_snapshot(0, &snapshot);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::State(s)] => {
                assert_eq!(s.major, snapshot.major);
                assert_eq!(s.major.next_action, Action::BeginSurfaceCreation);
                assert!(s.needs_redraw);
                assert!(!s.needs_begin_main_frame);
            }
            other => panic!("expected one State, got {other:?}"),
        }
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_frame(&FrameEvent {
            frame_number: 1,
            phase: FramePhase::BeginFrame,
            timestamp: 0,
        });
        rec.on_frame(&FrameEvent {
            frame_number: 2,
            phase: FramePhase::BeginFrame,
            timestamp: 0,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn unknown_enum_code_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_action(&ActionEvent {
            frame_number: 1,
            action: Action::Commit,
            timestamp: 0,
        });
        let mut bytes = rec.into_bytes();
        // tag (1) + frame number (8) precede the action code.
        bytes[9] = 200;
        assert_eq!(decode(&bytes).count(), 0);
    }
}
