// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only copy of the full scheduling state.
//!
//! [`StateSnapshot`] is produced by
//! [`PipelineStateMachine::snapshot`](crate::machine::PipelineStateMachine::snapshot)
//! for diagnostics consumers. It is split the same way the diagnostic record
//! is: `major` holds the next action and the four lifecycle states, `minor`
//! holds every counter, funnel and flag.

use crate::state::{
    Action, BeginImplFrameState, BeginMainFrameState, ForcedRedrawState, FrameSinkState,
    ScrollHandlerState, TreePriority,
};

/// Headline scheduling state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MajorState {
    /// What [`next_action`](crate::machine::PipelineStateMachine::next_action)
    /// returned when the snapshot was taken.
    pub next_action: Action,
    /// Tick phase.
    pub begin_impl_frame_state: BeginImplFrameState,
    /// Main-frame request lifecycle.
    pub begin_main_frame_state: BeginMainFrameState,
    /// Frame sink lifecycle.
    pub frame_sink_state: FrameSinkState,
    /// Forced-redraw recovery progress.
    pub forced_redraw_state: ForcedRedrawState,
}

/// Every counter, funnel and flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinorState {
    /// Commits performed, including no-update commits.
    pub commit_count: u64,
    /// Begin-impl-frames seen.
    pub current_frame_number: u64,
    /// Frame number of the last submit, if any.
    pub last_frame_number_submit_performed: Option<u64>,
    /// Frame number of the last draw, if any.
    pub last_frame_number_draw_performed: Option<u64>,
    /// Frame number of the last begin-main-frame, if any.
    pub last_frame_number_begin_main_frame_sent: Option<u64>,
    /// Frame number of the last surface invalidation, if any.
    pub last_frame_number_invalidate_performed: Option<u64>,
    /// Draw funnel.
    pub draw_funnel: bool,
    /// Send-begin-main-frame funnel.
    pub send_begin_main_frame_funnel: bool,
    /// Prepare-tiles funnel level.
    pub prepare_tiles_funnel: u32,
    /// Invalidate funnel.
    pub invalidate_funnel: bool,
    /// Checkerboarded draws in a row.
    pub consecutive_checkerboard_animations: u32,
    /// Submitted frames awaiting an ack.
    pub pending_submit_frames: u32,
    /// Frames submitted to the current sink.
    pub submit_frames_with_current_sink: u64,
    /// A redraw is requested.
    pub needs_redraw: bool,
    /// A tile preparation pass is requested.
    pub needs_prepare_tiles: bool,
    /// A main frame is requested.
    pub needs_begin_main_frame: bool,
    /// A single begin-impl-frame is requested.
    pub needs_one_begin_impl_frame: bool,
    /// Output is visible.
    pub visible: bool,
    /// The begin-frame source is paused.
    pub begin_frame_source_paused: bool,
    /// Drawing is possible.
    pub can_draw: bool,
    /// Resourceless software draws are in effect.
    pub resourceless_draw: bool,
    /// A pending tree exists.
    pub has_pending_tree: bool,
    /// The pending tree is ready to activate.
    pub pending_tree_is_ready_for_activation: bool,
    /// The active tree has not been drawn since activation.
    pub active_tree_needs_first_draw: bool,
    /// Draws wait for active-tree rasterization.
    pub wait_for_ready_to_draw: bool,
    /// At least one sink has been created.
    pub did_create_first_sink: bool,
    /// Tile manager priority.
    pub tree_priority: TreePriority,
    /// Scroll handler involvement.
    pub scroll_handler_state: ScrollHandlerState,
    /// The main thread turns frames around quickly.
    pub critical_begin_main_frame_to_activate_is_fast: bool,
    /// The main thread missed the last deadline.
    pub main_thread_missed_last_deadline: bool,
    /// The next begin-main-frame is skipped to reduce latency.
    pub skip_next_begin_main_frame_to_reduce_latency: bool,
    /// Video wants begin frames.
    pub video_needs_begin_frames: bool,
    /// Commits are deferred.
    pub defer_commits: bool,
    /// The last commit carried no updates.
    pub last_commit_had_no_updates: bool,
    /// A draw happened in the current tick.
    pub did_draw_in_last_frame: bool,
    /// A submit happened in the current tick.
    pub did_submit_in_last_frame: bool,
}

/// Complete scheduling state at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Headline state.
    pub major: MajorState,
    /// Counters, funnels and flags.
    pub minor: MinorState,
}
