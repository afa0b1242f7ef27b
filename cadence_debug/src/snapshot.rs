// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of a full [`StateSnapshot`].
//!
//! The document has two objects, `major_state` and `minor_state`, keyed by
//! the scheduler's diagnostic field names. Enum values use their `as_str`
//! names. Frame numbers that were never recorded are `-1`.

use std::io::{self, Write};

use serde_json::{Value, json};

use cadence_core::snapshot::StateSnapshot;

/// Builds the JSON document for `snapshot`.
#[must_use]
pub fn to_json(snapshot: &StateSnapshot) -> Value {
    let major = &snapshot.major;
    let minor = &snapshot.minor;
    json!({
        "major_state": {
            "next_action": major.next_action.as_str(),
            "begin_impl_frame_state": major.begin_impl_frame_state.as_str(),
            "begin_main_frame_state": major.begin_main_frame_state.as_str(),
            "compositor_frame_sink_state": major.frame_sink_state.as_str(),
            "forced_redraw_state": major.forced_redraw_state.as_str(),
        },
        "minor_state": {
            "commit_count": minor.commit_count,
            "current_frame_number": minor.current_frame_number,
            "last_frame_number_submit_performed": frame_number(minor.last_frame_number_submit_performed),
            "last_frame_number_draw_performed": frame_number(minor.last_frame_number_draw_performed),
            "last_frame_number_begin_main_frame_sent": frame_number(minor.last_frame_number_begin_main_frame_sent),
            "last_frame_number_invalidate_compositor_frame_sink_performed": frame_number(minor.last_frame_number_invalidate_performed),
            "funnel": minor.draw_funnel,
            "send_begin_main_frame_funnel": minor.send_begin_main_frame_funnel,
            "prepare_tiles_funnel": minor.prepare_tiles_funnel,
            "invalidate_compositor_frame_sink_funnel": minor.invalidate_funnel,
            "consecutive_checkerboard_animations_count": minor.consecutive_checkerboard_animations,
            "pending_submit_frames": minor.pending_submit_frames,
            "submit_frames_with_current_compositor_frame_sink": minor.submit_frames_with_current_sink,
            "needs_redraw": minor.needs_redraw,
            "needs_prepare_tiles": minor.needs_prepare_tiles,
            "needs_begin_main_frame": minor.needs_begin_main_frame,
            "needs_one_begin_impl_frame": minor.needs_one_begin_impl_frame,
            "visible": minor.visible,
            "begin_frame_source_paused": minor.begin_frame_source_paused,
            "can_draw": minor.can_draw,
            "resourceless_draw": minor.resourceless_draw,
            "has_pending_tree": minor.has_pending_tree,
            "pending_tree_is_ready_for_activation": minor.pending_tree_is_ready_for_activation,
            "active_tree_needs_first_draw": minor.active_tree_needs_first_draw,
            "wait_for_ready_to_draw": minor.wait_for_ready_to_draw,
            "did_create_and_initialize_first_compositor_frame_sink": minor.did_create_first_sink,
            "tree_priority": minor.tree_priority.as_str(),
            "scroll_handler_state": minor.scroll_handler_state.as_str(),
            "critical_begin_main_frame_to_activate_is_fast": minor.critical_begin_main_frame_to_activate_is_fast,
            "main_thread_missed_last_deadline": minor.main_thread_missed_last_deadline,
            "skip_next_begin_main_frame_to_reduce_latency": minor.skip_next_begin_main_frame_to_reduce_latency,
            "video_needs_begin_frames": minor.video_needs_begin_frames,
            "defer_commits": minor.defer_commits,
            "last_commit_had_no_updates": minor.last_commit_had_no_updates,
            "did_draw_in_last_frame": minor.did_draw_in_last_frame,
            "did_submit_in_last_frame": minor.did_submit_in_last_frame,
        },
    })
}

/// Writes the JSON document for `snapshot`, pretty-printed.
pub fn write_json(snapshot: &StateSnapshot, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &to_json(snapshot))?;
    Ok(())
}

fn frame_number(n: Option<u64>) -> Value {
    n.map_or_else(|| json!(-1), |n| json!(n))
}
