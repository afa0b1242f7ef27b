// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the scheduling loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the [`FrameDriver`](crate::driver::FrameDriver) calls at each tick phase
//! and for every dispatched action. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Timestamps are whatever monotonic clock the driver's caller uses, in
//! nanoseconds. The core never reads a clock itself.

use crate::snapshot::StateSnapshot;
use crate::state::{Action, DrawResult};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which tick phase boundary was crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// A begin-impl-frame started the tick.
    BeginFrame,
    /// The tick's deadline fired.
    Deadline,
    /// The tick ended.
    Idle,
}

impl FramePhase {
    /// Returns a short label for logs and trace exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeginFrame => "BeginImplFrame",
            Self::Deadline => "Deadline",
            Self::Idle => "Idle",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the driver crosses a tick phase boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameEvent {
    /// Begin-impl-frame counter after the transition.
    pub frame_number: u64,
    /// Which boundary.
    pub phase: FramePhase,
    /// Caller time in nanoseconds.
    pub timestamp: u64,
}

/// Emitted for every action the driver dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionEvent {
    /// Begin-impl-frame counter.
    pub frame_number: u64,
    /// The dispatched action; never [`Action::None`].
    pub action: Action,
    /// Caller time of the enclosing phase, in nanoseconds.
    pub timestamp: u64,
}

/// Emitted after a draw action completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawEvent {
    /// Begin-impl-frame counter.
    pub frame_number: u64,
    /// One of the three draw actions.
    pub action: Action,
    /// What the draw reported.
    pub result: DrawResult,
    /// Whether a frame was submitted to the sink.
    pub did_submit: bool,
}

/// Emitted when a frame is submitted. Opens an async span closed by the
/// matching [`AckEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitEvent {
    /// Begin-impl-frame counter.
    pub frame_number: u64,
    /// Frames awaiting an ack, including this one.
    pub pending_submit_frames: u32,
    /// Caller time in nanoseconds.
    pub timestamp: u64,
}

/// Emitted when the sink acknowledges a submitted frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AckEvent {
    /// Begin-impl-frame counter when the ack arrived.
    pub frame_number: u64,
    /// Frames still awaiting an ack.
    pub pending_submit_frames: u32,
    /// Caller time in nanoseconds.
    pub timestamp: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scheduling loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a tick phase boundary is crossed.
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }

    /// Called before an action is carried out.
    fn on_action(&mut self, e: &ActionEvent) {
        _ = e;
    }

    /// Called after a draw completes.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }

    /// Called when a frame is submitted.
    fn on_submit(&mut self, e: &SubmitEvent) {
        _ = e;
    }

    /// Called when a submitted frame is acknowledged.
    fn on_ack(&mut self, e: &AckEvent) {
        _ = e;
    }

    /// Called with the full scheduling state at the end of each tick.
    fn on_state_snapshot(&mut self, frame_number: u64, snapshot: &StateSnapshot) {
        _ = (frame_number, snapshot);
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

    /// Returns `true` when events reach a sink.
    ///
    /// Lets callers skip building expensive payloads such as snapshots.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`FrameEvent`].
    #[inline]
    pub fn frame(&mut self, e: &FrameEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ActionEvent`].
    #[inline]
    pub fn action(&mut self, e: &ActionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_action(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawEvent`].
    #[inline]
    pub fn draw(&mut self, e: &DrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SubmitEvent`].
    #[inline]
    pub fn submit(&mut self, e: &SubmitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_submit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AckEvent`].
    #[inline]
    pub fn ack(&mut self, e: &AckEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_ack(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a state snapshot.
    #[inline]
    pub fn state_snapshot(&mut self, frame_number: u64, snapshot: &StateSnapshot) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_state_snapshot(frame_number, snapshot);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (frame_number, snapshot);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
