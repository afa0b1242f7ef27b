// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle states, actions and result codes.
//!
//! Every enum here is a plain `Copy` tag. [`as_str`](Action::as_str) methods
//! return the stable diagnostic names used by state snapshots and traces.

use core::fmt;

// ---------------------------------------------------------------------------
// Lifecycle states
// ---------------------------------------------------------------------------

/// Lifecycle of the compositor frame sink (the output surface).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FrameSinkState {
    /// No sink exists, or the previous one was lost.
    #[default]
    None,
    /// Creation has been requested but has not completed.
    Creating,
    /// The sink exists; waiting for the first commit to land.
    WaitingForFirstCommit,
    /// The first commit produced a pending tree; waiting for it to activate.
    WaitingForFirstActivation,
    /// Fully initialized and drawable.
    Active,
}

impl FrameSinkState {
    /// Returns the diagnostic name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "COMPOSITOR_FRAME_SINK_NONE",
            Self::Creating => "COMPOSITOR_FRAME_SINK_CREATING",
            Self::WaitingForFirstCommit => "COMPOSITOR_FRAME_SINK_WAITING_FOR_FIRST_COMMIT",
            Self::WaitingForFirstActivation => {
                "COMPOSITOR_FRAME_SINK_WAITING_FOR_FIRST_ACTIVATION"
            }
            Self::Active => "COMPOSITOR_FRAME_SINK_ACTIVE",
        }
    }
}

/// Where the compositor is within one vsync-driven tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BeginImplFrameState {
    /// Between ticks.
    #[default]
    Idle,
    /// The tick has begun; the deadline has not fired yet.
    InsideBeginFrame,
    /// The tick's deadline has fired; this is where draws happen.
    InsideDeadline,
}

impl BeginImplFrameState {
    /// Returns the diagnostic name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "BEGIN_IMPL_FRAME_STATE_IDLE",
            Self::InsideBeginFrame => "BEGIN_IMPL_FRAME_STATE_INSIDE_BEGIN_FRAME",
            Self::InsideDeadline => "BEGIN_IMPL_FRAME_STATE_INSIDE_DEADLINE",
        }
    }
}

/// Lifecycle of a begin-main-frame request sent to the main thread.
///
/// Transitions strictly `Idle → Sent → Started → ReadyToCommit → Idle`; the
/// main thread may also abort from `Started` straight back to `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BeginMainFrameState {
    /// No request outstanding.
    #[default]
    Idle,
    /// The request was sent but the main thread has not picked it up.
    Sent,
    /// The main thread is producing the frame.
    Started,
    /// The main thread is done; a commit can proceed.
    ReadyToCommit,
}

impl BeginMainFrameState {
    /// Returns the diagnostic name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "BEGIN_MAIN_FRAME_STATE_IDLE",
            Self::Sent => "BEGIN_MAIN_FRAME_STATE_SENT",
            Self::Started => "BEGIN_MAIN_FRAME_STATE_STARTED",
            Self::ReadyToCommit => "BEGIN_MAIN_FRAME_STATE_READY_TO_COMMIT",
        }
    }
}

/// Progress of the forced-redraw recovery after repeated checkerboarding.
///
/// Moves `Idle → WaitingForCommit → WaitingForActivation → WaitingForDraw →
/// Idle`, skipping `WaitingForActivation` when the commit made no pending
/// tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ForcedRedrawState {
    /// No forced redraw in progress.
    #[default]
    Idle,
    /// Waiting for a fresh commit with new content.
    WaitingForCommit,
    /// Waiting for that commit's pending tree to activate.
    WaitingForActivation,
    /// Waiting to draw regardless of checkerboarding.
    WaitingForDraw,
}

impl ForcedRedrawState {
    /// Returns the diagnostic name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "FORCED_REDRAW_STATE_IDLE",
            Self::WaitingForCommit => "FORCED_REDRAW_STATE_WAITING_FOR_COMMIT",
            Self::WaitingForActivation => "FORCED_REDRAW_STATE_WAITING_FOR_ACTIVATION",
            Self::WaitingForDraw => "FORCED_REDRAW_STATE_WAITING_FOR_DRAW",
        }
    }
}

// ---------------------------------------------------------------------------
// Tuning inputs
// ---------------------------------------------------------------------------

/// Which tree the tile manager favors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TreePriority {
    /// Neither tree is favored.
    SamePriorityForBothTrees,
    /// Favor the active tree so animations stay smooth.
    SmoothnessTakesPriority,
    /// Favor the pending tree so new content shows up sooner.
    #[default]
    NewContentTakesPriority,
}

impl TreePriority {
    /// Returns the diagnostic name of this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SamePriorityForBothTrees => "SAME_PRIORITY_FOR_BOTH_TREES",
            Self::SmoothnessTakesPriority => "SMOOTHNESS_TAKES_PRIORITY",
            Self::NewContentTakesPriority => "NEW_CONTENT_TAKES_PRIORITY",
        }
    }
}

/// Whether the current scroll is observed by a main-thread scroll handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollHandlerState {
    /// A main-thread handler reacts to the scroll.
    AffectsScrollHandler,
    /// No main-thread handler is involved.
    #[default]
    DoesNotAffectScrollHandler,
}

impl ScrollHandlerState {
    /// Returns the diagnostic name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AffectsScrollHandler => "SCROLL_AFFECTS_SCROLL_HANDLER",
            Self::DoesNotAffectScrollHandler => "SCROLL_DOES_NOT_AFFECT_SCROLL_HANDLER",
        }
    }
}

// ---------------------------------------------------------------------------
// Decisions and results
// ---------------------------------------------------------------------------

/// The single pipeline operation the driver should perform next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Action {
    /// Nothing to do until another event arrives.
    #[default]
    None,
    /// Ask the main thread to produce a new frame.
    SendBeginMainFrame,
    /// Commit the main thread's frame into a pending (or active) tree.
    Commit,
    /// Promote the pending tree to active.
    ActivateSyncTree,
    /// Draw, allowing the draw to be aborted on checkerboarding.
    DrawIfPossible,
    /// Draw even if content is missing.
    DrawForced,
    /// Pretend to draw so the pipeline keeps moving.
    DrawAbort,
    /// Start creating a new frame sink.
    BeginSurfaceCreation,
    /// Run a tile preparation pass.
    PrepareTiles,
    /// Ask a synchronous-compositor host to invalidate the surface.
    InvalidateSurface,
}

impl Action {
    /// Returns the diagnostic name of this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "ACTION_NONE",
            Self::SendBeginMainFrame => "ACTION_SEND_BEGIN_MAIN_FRAME",
            Self::Commit => "ACTION_COMMIT",
            Self::ActivateSyncTree => "ACTION_ACTIVATE_SYNC_TREE",
            Self::DrawIfPossible => "ACTION_DRAW_IF_POSSIBLE",
            Self::DrawForced => "ACTION_DRAW_FORCED",
            Self::DrawAbort => "ACTION_DRAW_ABORT",
            Self::BeginSurfaceCreation => "ACTION_BEGIN_COMPOSITOR_FRAME_SINK_CREATION",
            Self::PrepareTiles => "ACTION_PREPARE_TILES",
            Self::InvalidateSurface => "ACTION_INVALIDATE_COMPOSITOR_FRAME_SINK",
        }
    }

    /// Returns `true` for the three draw variants.
    #[must_use]
    pub const fn is_draw(self) -> bool {
        matches!(self, Self::DrawIfPossible | Self::DrawForced | Self::DrawAbort)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a draw, reported through
/// [`did_draw`](crate::machine::PipelineStateMachine::did_draw).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawResult {
    /// Placeholder value; never a valid report.
    Invalid,
    /// The frame was drawn.
    Success,
    /// The draw bailed because animated content would checkerboard.
    AbortedCheckerboardAnimations,
    /// The draw bailed because high-resolution content was missing.
    AbortedMissingHighResContent,
    /// The context was lost mid-draw. Not a valid report to the state machine.
    AbortedContextLost,
    /// Drawing was impossible. Not a valid report to the state machine.
    AbortedCantDraw,
    /// The draw was skipped to drain the pipeline.
    AbortedDrainingPipeline,
}

impl DrawResult {
    /// Returns the diagnostic name of this result.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID_RESULT",
            Self::Success => "DRAW_SUCCESS",
            Self::AbortedCheckerboardAnimations => "DRAW_ABORTED_CHECKERBOARD_ANIMATIONS",
            Self::AbortedMissingHighResContent => "DRAW_ABORTED_MISSING_HIGH_RES_CONTENT",
            Self::AbortedContextLost => "DRAW_ABORTED_CONTEXT_LOST",
            Self::AbortedCantDraw => "DRAW_ABORTED_CANT_DRAW",
            Self::AbortedDrainingPipeline => "DRAW_ABORTED_DRAINING_PIPELINE",
        }
    }
}

/// Why the main thread ended a begin-main-frame without a full commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitEarlyOutReason {
    /// The frame sink was lost while the main frame was in flight.
    AbortedFrameSinkLost,
    /// The compositor became invisible.
    AbortedNotVisible,
    /// Commits are being deferred.
    AbortedDeferredCommit,
    /// The main thread finished but had nothing to commit.
    FinishedNoUpdates,
}

impl CommitEarlyOutReason {
    /// Returns the diagnostic name of this reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AbortedFrameSinkLost => "ABORTED_COMPOSITOR_FRAME_SINK_LOST",
            Self::AbortedNotVisible => "ABORTED_NOT_VISIBLE",
            Self::AbortedDeferredCommit => "ABORTED_DEFERRED_COMMIT",
            Self::FinishedNoUpdates => "FINISHED_NO_UPDATES",
        }
    }
}

/// How soon the current tick's deadline should fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeadlineMode {
    /// No deadline; the synchronous compositor host drives draws.
    None,
    /// Fire the deadline right away.
    Immediate,
    /// Fire at the regular point in the frame.
    Regular,
    /// Fire late to give the main thread more time.
    Late,
    /// Wait until the active tree is ready to draw.
    BlockedOnReadyToDraw,
}

impl DeadlineMode {
    /// Returns the diagnostic name of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "BEGIN_IMPL_FRAME_DEADLINE_MODE_NONE",
            Self::Immediate => "BEGIN_IMPL_FRAME_DEADLINE_MODE_IMMEDIATE",
            Self::Regular => "BEGIN_IMPL_FRAME_DEADLINE_MODE_REGULAR",
            Self::Late => "BEGIN_IMPL_FRAME_DEADLINE_MODE_LATE",
            Self::BlockedOnReadyToDraw => "BEGIN_IMPL_FRAME_DEADLINE_MODE_BLOCKED_ON_READY_TO_DRAW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn defaults_match_a_fresh_pipeline() {
        assert_eq!(FrameSinkState::default(), FrameSinkState::None);
        assert_eq!(BeginImplFrameState::default(), BeginImplFrameState::Idle);
        assert_eq!(BeginMainFrameState::default(), BeginMainFrameState::Idle);
        assert_eq!(ForcedRedrawState::default(), ForcedRedrawState::Idle);
        assert_eq!(TreePriority::default(), TreePriority::NewContentTakesPriority);
        assert_eq!(
            ScrollHandlerState::default(),
            ScrollHandlerState::DoesNotAffectScrollHandler
        );
    }

    #[test]
    fn action_display_uses_diagnostic_name() {
        assert_eq!(Action::DrawForced.to_string(), "ACTION_DRAW_FORCED");
        assert_eq!(Action::None.to_string(), "ACTION_NONE");
    }

    #[test]
    fn only_draw_actions_are_draws() {
        assert!(Action::DrawIfPossible.is_draw());
        assert!(Action::DrawForced.is_draw());
        assert!(Action::DrawAbort.is_draw());
        assert!(!Action::Commit.is_draw());
        assert!(!Action::InvalidateSurface.is_draw());
    }
}
