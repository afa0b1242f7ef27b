// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the scheduler and the compositor that does the work.
//!
//! The state machine only decides. Whoever embeds it provides the pieces
//! that carry decisions out:
//!
//! - **Tick source**: calls the driver's `begin_impl_frame`,
//!   `begin_impl_frame_deadline` and `begin_impl_frame_idle` from vsync or a
//!   timer. Not abstracted by a trait because setup and lifecycle differ
//!   fundamentally across platforms.
//!
//! - **Main thread**: reports begin-main-frame progress
//!   (`notify_begin_main_frame_started`, `notify_ready_to_commit`,
//!   `begin_main_frame_aborted`) through
//!   [`FrameDriver::state_machine_mut`](crate::driver::FrameDriver::state_machine_mut).
//!
//! - **Client**: implements [`PipelineClient`] to perform actions.
//!
//! # Crate boundaries
//!
//! `cadence_core` owns the decision logic, this contract and a reference
//! driver. Embedders depend on `cadence_core` and wire a client and a tick
//! source together.

use crate::state::DrawResult;

/// What a draw produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Result reported to the state machine.
    pub result: DrawResult,
    /// Whether a frame was submitted to the sink.
    pub did_submit: bool,
}

impl DrawOutcome {
    /// A successful draw that submitted a frame.
    #[must_use]
    pub const fn submitted() -> Self {
        Self {
            result: DrawResult::Success,
            did_submit: true,
        }
    }

    /// A draw that bailed with `result` and submitted nothing.
    #[must_use]
    pub const fn aborted(result: DrawResult) -> Self {
        Self {
            result,
            did_submit: false,
        }
    }
}

/// Carries out the actions chosen by
/// [`PipelineStateMachine::next_action`](crate::machine::PipelineStateMachine::next_action).
///
/// One method per action. The [`FrameDriver`](crate::driver::FrameDriver)
/// updates the state machine around each call, so implementations only do
/// the work. Real compositors and test doubles implement this trait.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_vsync(now: u64) {
///     driver.begin_impl_frame(now, &mut tracer);
///     // Main thread answers a begin-main-frame at some point:
///     driver.state_machine_mut().notify_begin_main_frame_started();
///     driver.state_machine_mut().notify_ready_to_commit();
///     driver.process_actions(&mut tracer);
///
///     driver.begin_impl_frame_deadline(now + deadline, &mut tracer);
///     driver.begin_impl_frame_idle(now + interval, &mut tracer);
/// }
/// ```
pub trait PipelineClient {
    /// Asks the main thread for a new frame.
    fn send_begin_main_frame(&mut self);

    /// Commits the main thread's frame.
    fn commit(&mut self);

    /// Promotes the pending tree to active.
    fn activate_sync_tree(&mut self);

    /// Draws, bailing out if content would checkerboard.
    ///
    /// Must not return [`DrawResult::Invalid`], [`DrawResult::AbortedCantDraw`]
    /// or [`DrawResult::AbortedContextLost`]. On a lost context, return
    /// [`DrawResult::AbortedDrainingPipeline`] and report the loss afterwards
    /// through
    /// [`FrameDriver::did_lose_frame_sink`](crate::driver::FrameDriver::did_lose_frame_sink).
    fn draw_if_possible(&mut self) -> DrawOutcome;

    /// Draws regardless of missing content.
    ///
    /// Same result restrictions as
    /// [`draw_if_possible`](Self::draw_if_possible).
    fn draw_forced(&mut self) -> DrawOutcome;

    /// Starts creating a frame sink. Completion is reported later through
    /// [`FrameDriver::did_create_frame_sink`](crate::driver::FrameDriver::did_create_frame_sink).
    fn begin_frame_sink_creation(&mut self);

    /// Runs a tile preparation pass.
    fn prepare_tiles(&mut self);

    /// Asks a synchronous-compositor host to invalidate the surface.
    fn invalidate_frame_sink(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constructors() {
        let ok = DrawOutcome::submitted();
        assert_eq!(ok.result, DrawResult::Success);
        assert!(ok.did_submit);

        let bail = DrawOutcome::aborted(DrawResult::AbortedCheckerboardAnimations);
        assert!(!bail.did_submit);
    }
}
