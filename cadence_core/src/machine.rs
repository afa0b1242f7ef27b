// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame scheduling decision engine.
//!
//! [`PipelineStateMachine`] holds a flat vector of scheduling signals. The
//! driver reports lifecycle events through the `on_*`, `will_*`, `did_*`,
//! `notify_*` and `set_*` mutators and then asks
//! [`next_action()`](PipelineStateMachine::next_action) what to do.
//!
//! # Priority cascade
//!
//! `next_action` checks, in order: activation, commit, draw, tile
//! preparation, begin-main-frame, surface invalidation, surface creation.
//! Finishing in-flight work always wins over starting new work, which keeps
//! at most one frame's worth of resources in the pipeline.
//!
//! # Contract violations
//!
//! Mutators called out of order panic. Continuing with an inconsistent
//! state vector would corrupt scheduling silently.

use log::{debug, trace};

use crate::funnel::{CountingFunnel, Funnel};
use crate::settings::SchedulerSettings;
use crate::snapshot::{MajorState, MinorState, StateSnapshot};
use crate::state::{
    Action, BeginImplFrameState, BeginMainFrameState, CommitEarlyOutReason, DeadlineMode,
    DrawResult, ForcedRedrawState, FrameSinkState, ScrollHandlerState, TreePriority,
};

/// Frame sinks do not support more than one submitted frame awaiting its ack.
pub const MAX_PENDING_SUBMIT_FRAMES: u32 = 1;

/// Decides which pipeline action a compositor should perform next.
///
/// See the [module docs](self) for the decision order.
///
/// # Usage
///
/// ```
/// use cadence_core::machine::PipelineStateMachine;
/// use cadence_core::settings::SchedulerSettings;
/// use cadence_core::state::Action;
///
/// let mut sm = PipelineStateMachine::new(SchedulerSettings::renderer());
/// sm.set_visible(true);
/// sm.set_can_draw(true);
/// assert_eq!(sm.next_action(), Action::BeginSurfaceCreation);
///
/// sm.will_begin_compositor_frame_sink_creation();
/// sm.did_create_and_initialize_compositor_frame_sink();
/// assert_eq!(sm.next_action(), Action::None);
/// ```
#[derive(Clone, Debug)]
pub struct PipelineStateMachine {
    settings: SchedulerSettings,

    frame_sink_state: FrameSinkState,
    begin_impl_frame_state: BeginImplFrameState,
    begin_main_frame_state: BeginMainFrameState,
    forced_redraw_state: ForcedRedrawState,

    commit_count: u64,
    current_frame_number: u64,
    last_frame_number_submit_performed: Option<u64>,
    last_frame_number_draw_performed: Option<u64>,
    last_frame_number_begin_main_frame_sent: Option<u64>,
    last_frame_number_invalidate_performed: Option<u64>,

    draw_funnel: Funnel,
    send_begin_main_frame_funnel: Funnel,
    invalidate_funnel: Funnel,
    prepare_tiles_funnel: CountingFunnel,

    consecutive_checkerboard_animations: u32,
    pending_submit_frames: u32,
    submit_frames_with_current_sink: u64,

    needs_redraw: bool,
    needs_prepare_tiles: bool,
    needs_begin_main_frame: bool,
    needs_one_begin_impl_frame: bool,
    visible: bool,
    begin_frame_source_paused: bool,
    resourceless_draw: bool,
    can_draw: bool,
    has_pending_tree: bool,
    pending_tree_is_ready_for_activation: bool,
    active_tree_needs_first_draw: bool,
    did_create_first_sink: bool,
    tree_priority: TreePriority,
    scroll_handler_state: ScrollHandlerState,
    critical_begin_main_frame_to_activate_is_fast: bool,
    main_thread_missed_last_deadline: bool,
    skip_next_begin_main_frame_to_reduce_latency: bool,
    defer_commits: bool,
    video_needs_begin_frames: bool,
    last_commit_had_no_updates: bool,
    wait_for_ready_to_draw: bool,
    did_draw_in_last_frame: bool,
    did_submit_in_last_frame: bool,
}

impl PipelineStateMachine {
    /// Creates a state machine with no frame sink, invisible and unable to
    /// draw.
    #[must_use]
    pub fn new(settings: SchedulerSettings) -> Self {
        Self {
            settings,
            frame_sink_state: FrameSinkState::None,
            begin_impl_frame_state: BeginImplFrameState::Idle,
            begin_main_frame_state: BeginMainFrameState::Idle,
            forced_redraw_state: ForcedRedrawState::Idle,
            commit_count: 0,
            current_frame_number: 0,
            last_frame_number_submit_performed: None,
            last_frame_number_draw_performed: None,
            last_frame_number_begin_main_frame_sent: None,
            last_frame_number_invalidate_performed: None,
            draw_funnel: Funnel::new(),
            // No main frame before the first begin-impl-frame.
            send_begin_main_frame_funnel: Funnel::armed(),
            invalidate_funnel: Funnel::new(),
            prepare_tiles_funnel: CountingFunnel::new(),
            consecutive_checkerboard_animations: 0,
            pending_submit_frames: 0,
            submit_frames_with_current_sink: 0,
            needs_redraw: false,
            needs_prepare_tiles: false,
            needs_begin_main_frame: false,
            needs_one_begin_impl_frame: false,
            visible: false,
            begin_frame_source_paused: false,
            resourceless_draw: false,
            can_draw: false,
            has_pending_tree: false,
            pending_tree_is_ready_for_activation: false,
            active_tree_needs_first_draw: false,
            did_create_first_sink: false,
            tree_priority: TreePriority::NewContentTakesPriority,
            scroll_handler_state: ScrollHandlerState::DoesNotAffectScrollHandler,
            critical_begin_main_frame_to_activate_is_fast: true,
            main_thread_missed_last_deadline: false,
            skip_next_begin_main_frame_to_reduce_latency: false,
            defer_commits: false,
            video_needs_begin_frames: false,
            last_commit_had_no_updates: false,
            wait_for_ready_to_draw: false,
            did_draw_in_last_frame: false,
            did_submit_in_last_frame: false,
        }
    }

    // -----------------------------------------------------------------------
    // Decision
    // -----------------------------------------------------------------------

    /// Returns the single highest-priority action to perform now.
    ///
    /// Pure: repeated calls without an intervening mutation return the same
    /// action.
    #[must_use]
    pub fn next_action(&self) -> Action {
        if self.should_activate_pending_tree() {
            return Action::ActivateSyncTree;
        }
        if self.should_commit() {
            return Action::Commit;
        }
        if self.should_draw() {
            return if self.pending_draws_should_be_aborted() {
                Action::DrawAbort
            } else if self.forced_redraw_state == ForcedRedrawState::WaitingForDraw {
                Action::DrawForced
            } else {
                Action::DrawIfPossible
            };
        }
        if self.should_prepare_tiles() {
            return Action::PrepareTiles;
        }
        if self.should_send_begin_main_frame() {
            return Action::SendBeginMainFrame;
        }
        if self.should_invalidate_compositor_frame_sink() {
            return Action::InvalidateSurface;
        }
        if self.should_begin_compositor_frame_sink_creation() {
            return Action::BeginSurfaceCreation;
        }
        Action::None
    }

    /// Whether pending draws should be aborted instead of performed.
    ///
    /// Resourceless draws can be requested by the embedder at any time, so
    /// they only abort when the sink is lost or drawing is impossible.
    /// Otherwise this is a superset of
    /// [`pending_activations_should_be_forced`](Self::pending_activations_should_be_forced):
    /// activation is blocked on drawing the active tree, and the main thread
    /// may be blocked on activation.
    #[must_use]
    pub fn pending_draws_should_be_aborted(&self) -> bool {
        let sink_lost = self.frame_sink_state == FrameSinkState::None;
        if self.resourceless_draw {
            return sink_lost || !self.can_draw;
        }
        sink_lost || !self.can_draw || !self.visible || self.begin_frame_source_paused
    }

    /// Whether pending activations should happen without waiting for
    /// readiness.
    ///
    /// Nothing drives frames without a sink, while invisible, or while the
    /// begin-frame source is paused; waiting would deadlock the main thread.
    #[must_use]
    pub fn pending_activations_should_be_forced(&self) -> bool {
        self.frame_sink_state == FrameSinkState::None
            || !self.visible
            || self.begin_frame_source_paused
    }

    /// Whether a new frame sink should be created.
    ///
    /// The pipeline must be fully drained first.
    #[must_use]
    pub fn should_begin_compositor_frame_sink_creation(&self) -> bool {
        if !self.visible {
            return false;
        }
        if self.begin_main_frame_state != BeginMainFrameState::Idle {
            return false;
        }
        if self.begin_impl_frame_state != BeginImplFrameState::Idle {
            return false;
        }
        if self.active_tree_needs_first_draw || self.has_pending_tree {
            return false;
        }
        self.frame_sink_state == FrameSinkState::None
    }

    /// Whether a draw (possibly an aborted one) should happen now.
    #[must_use]
    pub fn should_draw(&self) -> bool {
        // Abort ASAP, but only if an undrawn active tree is holding things up.
        if self.pending_draws_should_be_aborted() {
            return self.active_tree_needs_first_draw;
        }
        // Aborted draws never submit, so the funnel only guards real ones.
        if self.draw_funnel.is_armed() {
            return false;
        }
        if self.frame_sink_state != FrameSinkState::Active {
            return false;
        }
        if self.is_draw_throttled() {
            return false;
        }
        if self.begin_impl_frame_state != BeginImplFrameState::InsideDeadline {
            return false;
        }
        if self.wait_for_ready_to_draw {
            debug_assert!(
                self.settings.commit_to_active_tree,
                "wait_for_ready_to_draw is only used when committing to the active tree"
            );
            return false;
        }
        // A commit to the active tree would reclaim whatever this draw submits.
        if self.settings.commit_to_active_tree && self.commit_pending() {
            return false;
        }
        if self.forced_redraw_state == ForcedRedrawState::WaitingForDraw {
            return true;
        }
        self.needs_redraw
    }

    /// Whether the pending tree should be activated now.
    #[must_use]
    pub fn should_activate_pending_tree(&self) -> bool {
        if !self.has_pending_tree {
            return false;
        }
        // Never replace an active tree that has not been drawn yet, even when
        // forcing; the draw gets aborted first.
        if self.active_tree_needs_first_draw {
            return false;
        }
        if self.pending_activations_should_be_forced() {
            return true;
        }
        self.pending_tree_is_ready_for_activation
    }

    /// Outer gate for sending a begin-main-frame.
    #[must_use]
    pub fn could_send_begin_main_frame(&self) -> bool {
        self.needs_begin_main_frame
            && self.visible
            && !self.begin_frame_source_paused
            && !self.defer_commits
    }

    /// Whether a begin-main-frame should be sent now.
    #[must_use]
    pub fn should_send_begin_main_frame(&self) -> bool {
        if !self.could_send_begin_main_frame() {
            return false;
        }
        if self.send_begin_main_frame_funnel.is_armed() {
            return false;
        }
        if self.begin_main_frame_state != BeginMainFrameState::Idle {
            return false;
        }
        // Without main-frame-before-activation, wait for the previous tree.
        if !self.settings.main_frame_before_activation_enabled && self.has_pending_tree {
            return false;
        }
        // Wait until the previous frame is drawn, submitted and acked.
        if self.settings.commit_to_active_tree
            && (self.active_tree_needs_first_draw || self.is_draw_throttled())
        {
            return false;
        }
        if self.impl_latency_takes_priority()
            && (self.has_pending_tree || self.active_tree_needs_first_draw)
        {
            return false;
        }
        // New input may still arrive while idle. The synchronous compositor's
        // main thread is always high latency, so it may send regardless.
        if !self.settings.using_synchronous_renderer_compositor
            && self.begin_impl_frame_state == BeginImplFrameState::Idle
        {
            return false;
        }
        if self.forced_redraw_state == ForcedRedrawState::WaitingForCommit {
            return true;
        }
        if !self.has_initialized_compositor_frame_sink() {
            return false;
        }
        if !self.settings.main_frame_while_submit_frame_throttled_enabled {
            let just_submitted_in_deadline = self.begin_impl_frame_state
                == BeginImplFrameState::InsideDeadline
                && self.did_submit_in_last_frame;
            if self.is_draw_throttled() && !just_submitted_in_deadline {
                return false;
            }
        }
        !self.skip_next_begin_main_frame_to_reduce_latency
    }

    /// Whether the main frame should be committed now.
    #[must_use]
    pub fn should_commit(&self) -> bool {
        if self.begin_main_frame_state != BeginMainFrameState::ReadyToCommit {
            return false;
        }
        if self.has_pending_tree {
            debug_assert!(
                self.settings.main_frame_before_activation_enabled,
                "a second commit can only be ready with main-frame-before-activation"
            );
            return false;
        }
        debug_assert!(
            !self.settings.commit_to_active_tree || !self.active_tree_needs_first_draw,
            "cannot replace an undrawn active tree"
        );
        debug_assert!(
            !self.settings.commit_to_active_tree || !self.is_draw_throttled(),
            "commit would reclaim resources of an unacked frame"
        );
        true
    }

    /// Whether a tile preparation pass should run now.
    ///
    /// Only inside the deadline, after draws; the funnel keeps the long-run
    /// average near one pass per tick.
    #[must_use]
    pub fn should_prepare_tiles(&self) -> bool {
        if self.prepare_tiles_funnel.is_armed() {
            return false;
        }
        if self.begin_impl_frame_state != BeginImplFrameState::InsideDeadline {
            return false;
        }
        self.needs_prepare_tiles
    }

    /// Whether a synchronous-compositor host should invalidate the surface.
    #[must_use]
    pub fn should_invalidate_compositor_frame_sink(&self) -> bool {
        if self.invalidate_funnel.is_armed() {
            return false;
        }
        if !self.settings.using_synchronous_renderer_compositor {
            return false;
        }
        if self.begin_impl_frame_state != BeginImplFrameState::InsideBeginFrame {
            return false;
        }
        // Tile preparation only runs from the draw, so it needs an
        // invalidation too.
        self.needs_redraw || self.needs_prepare_tiles
    }

    // -----------------------------------------------------------------------
    // Action notifications
    // -----------------------------------------------------------------------

    /// Records that a begin-main-frame is being sent.
    pub fn will_send_begin_main_frame(&mut self) {
        assert!(
            !self.has_pending_tree || self.settings.main_frame_before_activation_enabled,
            "begin-main-frame sent while a pending tree blocks it"
        );
        assert!(self.visible, "begin-main-frame sent while invisible");
        assert!(
            !self.begin_frame_source_paused,
            "begin-main-frame sent while the begin-frame source is paused"
        );
        assert!(
            !self.send_begin_main_frame_funnel.is_armed(),
            "begin-main-frame already sent this tick"
        );
        self.begin_main_frame_state = BeginMainFrameState::Sent;
        self.needs_begin_main_frame = false;
        self.send_begin_main_frame_funnel.arm();
        self.last_frame_number_begin_main_frame_sent = Some(self.current_frame_number);
    }

    /// Records a commit. `no_updates` means the main frame changed nothing
    /// and no pending tree is created.
    pub fn will_commit(&mut self, no_updates: bool) {
        assert!(
            !self.has_pending_tree
                || (self.settings.main_frame_before_activation_enabled && no_updates),
            "commit with updates while a pending tree exists"
        );
        self.commit_count += 1;
        self.last_commit_had_no_updates = no_updates;
        self.begin_main_frame_state = BeginMainFrameState::Idle;

        if !no_updates {
            self.has_pending_tree = true;
            self.pending_tree_is_ready_for_activation = false;
            self.wait_for_ready_to_draw = self.settings.commit_to_active_tree;
        }

        if self.forced_redraw_state == ForcedRedrawState::WaitingForCommit {
            self.forced_redraw_state = if self.has_pending_tree {
                ForcedRedrawState::WaitingForActivation
            } else {
                ForcedRedrawState::WaitingForDraw
            };
        }

        if self.frame_sink_state == FrameSinkState::WaitingForFirstCommit {
            self.frame_sink_state = if self.has_pending_tree {
                FrameSinkState::WaitingForFirstActivation
            } else {
                FrameSinkState::Active
            };
        }
    }

    /// Records that the pending tree is being activated.
    pub fn will_activate(&mut self) {
        if self.frame_sink_state == FrameSinkState::WaitingForFirstActivation {
            self.frame_sink_state = FrameSinkState::Active;
        }
        if self.forced_redraw_state == ForcedRedrawState::WaitingForActivation {
            self.forced_redraw_state = ForcedRedrawState::WaitingForDraw;
        }
        self.has_pending_tree = false;
        self.pending_tree_is_ready_for_activation = false;
        self.active_tree_needs_first_draw = true;
        self.needs_redraw = true;
    }

    /// Records that a draw is about to happen.
    pub fn will_draw(&mut self) {
        assert!(!self.draw_funnel.is_armed(), "already drew this tick");
        self.will_draw_internal();
    }

    /// Records the outcome of the draw announced by [`will_draw`](Self::will_draw).
    ///
    /// # Panics
    ///
    /// Panics on [`DrawResult::Invalid`], [`DrawResult::AbortedCantDraw`] and
    /// [`DrawResult::AbortedContextLost`], which drivers must handle before
    /// reporting.
    pub fn did_draw(&mut self, result: DrawResult) {
        self.did_draw_internal(result);
    }

    /// Completes a draw without painting, as if it had succeeded.
    ///
    /// May happen at any time, including after a draw or submit this tick.
    pub fn abort_draw(&mut self) {
        self.will_draw_internal();
        self.did_draw_internal(DrawResult::AbortedDrainingPipeline);
    }

    fn will_draw_internal(&mut self) {
        // Also updated here because draws can be aborted outside the
        // deadline.
        self.main_thread_missed_last_deadline = self.commit_pending() || self.has_pending_tree;

        // Cleared before drawing since the draw may request another one.
        self.needs_redraw = false;

        self.draw_funnel.arm();
        self.active_tree_needs_first_draw = false;
        self.did_draw_in_last_frame = true;
        self.last_frame_number_draw_performed = Some(self.current_frame_number);

        if self.forced_redraw_state == ForcedRedrawState::WaitingForDraw {
            self.forced_redraw_state = ForcedRedrawState::Idle;
        }
    }

    fn did_draw_internal(&mut self, result: DrawResult) {
        match result {
            DrawResult::Invalid | DrawResult::AbortedCantDraw | DrawResult::AbortedContextLost => {
                panic!("invalid draw result reported: {}", result.as_str());
            }
            DrawResult::AbortedDrainingPipeline | DrawResult::Success => {
                self.consecutive_checkerboard_animations = 0;
                self.forced_redraw_state = ForcedRedrawState::Idle;
            }
            DrawResult::AbortedCheckerboardAnimations => {
                debug_assert!(
                    !self.did_submit_in_last_frame,
                    "checkerboarded draw reported after a submit this tick"
                );
                self.needs_begin_main_frame = true;
                self.needs_redraw = true;
                self.consecutive_checkerboard_animations += 1;

                if self.consecutive_checkerboard_animations
                    >= self.settings.max_failed_draws_before_forced
                    && self.forced_redraw_state == ForcedRedrawState::Idle
                    && self.settings.timeout_and_draw_when_animation_checkerboards
                {
                    // Forcing only makes sense once a commit brings new
                    // content.
                    debug!(
                        "forcing redraw after {} checkerboarded draws",
                        self.consecutive_checkerboard_animations
                    );
                    self.forced_redraw_state = ForcedRedrawState::WaitingForCommit;
                }
            }
            DrawResult::AbortedMissingHighResContent => {
                debug_assert!(
                    !self.did_submit_in_last_frame,
                    "missing-content draw reported after a submit this tick"
                );
                // The content may be missing pictures (needs a commit) or
                // evicted textures (may not). Commit to be safe.
                self.needs_begin_main_frame = true;
            }
        }
    }

    /// Records that tiles are about to be prepared.
    pub fn will_prepare_tiles(&mut self) {
        self.needs_prepare_tiles = false;
    }

    /// Records that a tile preparation pass finished.
    pub fn did_prepare_tiles(&mut self) {
        self.needs_prepare_tiles = false;
        self.prepare_tiles_funnel.arm();
    }

    /// Records that frame sink creation is starting.
    pub fn will_begin_compositor_frame_sink_creation(&mut self) {
        assert_eq!(
            self.frame_sink_state,
            FrameSinkState::None,
            "frame sink creation requested while a sink exists"
        );
        self.frame_sink_state = FrameSinkState::Creating;

        // The pipeline is flushed before creation to avoid corner cases.
        debug_assert_eq!(
            self.begin_main_frame_state,
            BeginMainFrameState::Idle,
            "main frame in flight during sink creation"
        );
        debug_assert!(!self.has_pending_tree, "pending tree during sink creation");
        debug_assert!(
            !self.active_tree_needs_first_draw,
            "undrawn active tree during sink creation"
        );
    }

    /// Records that a synchronous-compositor invalidation is being issued.
    pub fn will_invalidate_compositor_frame_sink(&mut self) {
        assert!(
            !self.invalidate_funnel.is_armed(),
            "already invalidated this tick"
        );
        self.invalidate_funnel.arm();
        self.last_frame_number_invalidate_performed = Some(self.current_frame_number);

        // A draw is not guaranteed to follow, and an undrawn active tree
        // blocks commits.
        self.active_tree_needs_first_draw = false;
    }

    /// Records that the frame sink finished initializing.
    pub fn did_create_and_initialize_compositor_frame_sink(&mut self) {
        assert_eq!(
            self.frame_sink_state,
            FrameSinkState::Creating,
            "frame sink initialized without being created"
        );
        self.frame_sink_state = FrameSinkState::WaitingForFirstCommit;

        if self.did_create_first_sink {
            // A recreated sink needs fresh content from the main thread.
            self.needs_begin_main_frame = true;
        }
        self.did_create_first_sink = true;
        self.pending_submit_frames = 0;
        self.submit_frames_with_current_sink = 0;
        self.main_thread_missed_last_deadline = false;
    }

    /// Records that the frame sink was lost. Ignored when no sink exists.
    pub fn did_lose_compositor_frame_sink(&mut self) {
        if matches!(
            self.frame_sink_state,
            FrameSinkState::None | FrameSinkState::Creating
        ) {
            return;
        }
        self.frame_sink_state = FrameSinkState::None;
        self.needs_redraw = false;
        self.wait_for_ready_to_draw = false;
    }

    /// Records that a frame was submitted to the sink.
    pub fn did_submit_compositor_frame(&mut self) {
        trace!("pending submit frames: {}", self.pending_submit_frames);
        assert!(
            self.pending_submit_frames < MAX_PENDING_SUBMIT_FRAMES,
            "submitted a frame while draws are throttled"
        );
        self.pending_submit_frames += 1;
        self.submit_frames_with_current_sink += 1;
        self.did_submit_in_last_frame = true;
        self.last_frame_number_submit_performed = Some(self.current_frame_number);
    }

    /// Records that the sink acknowledged a submitted frame.
    pub fn did_receive_compositor_frame_ack(&mut self) {
        trace!("pending submit frames: {}", self.pending_submit_frames);
        assert!(
            self.pending_submit_frames > 0,
            "received an ack with no frame pending"
        );
        self.pending_submit_frames -= 1;
    }

    // -----------------------------------------------------------------------
    // Tick phases
    // -----------------------------------------------------------------------

    /// Starts a new tick.
    pub fn on_begin_impl_frame(&mut self) {
        self.begin_impl_frame_state = BeginImplFrameState::InsideBeginFrame;
        self.current_frame_number += 1;

        self.last_commit_had_no_updates = false;
        self.did_draw_in_last_frame = false;
        self.did_submit_in_last_frame = false;
        self.needs_one_begin_impl_frame = false;

        self.send_begin_main_frame_funnel.disarm();
        self.invalidate_funnel.disarm();
        self.prepare_tiles_funnel.drain();
    }

    /// Enters the tick's deadline, where draws happen.
    pub fn on_begin_impl_frame_deadline(&mut self) {
        self.begin_impl_frame_state = BeginImplFrameState::InsideDeadline;
        self.draw_funnel.disarm();

        // One tile preparation per draw for the synchronous compositor.
        if self.settings.using_synchronous_renderer_compositor {
            self.prepare_tiles_funnel.drain();
        }
    }

    /// Ends the tick.
    pub fn on_begin_impl_frame_idle(&mut self) {
        self.begin_impl_frame_state = BeginImplFrameState::Idle;
        self.skip_next_begin_main_frame_to_reduce_latency = false;

        // A new or undrawn tree after the deadline means the main thread is
        // running behind.
        self.main_thread_missed_last_deadline =
            self.commit_pending() || self.has_pending_tree || self.active_tree_needs_first_draw;

        // No more ticks are coming; make sure nothing slips out meanwhile.
        if !self.begin_frame_needed() {
            self.send_begin_main_frame_funnel.arm();
        }
    }

    /// Classifies how soon the current tick's deadline should fire.
    #[must_use]
    pub fn current_begin_impl_frame_deadline_mode(&self) -> DeadlineMode {
        if self.settings.using_synchronous_renderer_compositor {
            DeadlineMode::None
        } else if self.wait_for_ready_to_draw {
            debug_assert!(
                self.settings.commit_to_active_tree,
                "wait_for_ready_to_draw is only used when committing to the active tree"
            );
            DeadlineMode::BlockedOnReadyToDraw
        } else if self.should_trigger_begin_impl_frame_deadline_immediately() {
            DeadlineMode::Immediate
        } else if self.needs_redraw {
            // Something on the compositor wants to draw; do not wait long for
            // the main thread.
            DeadlineMode::Regular
        } else {
            // Nothing to draw until a new tree arrives.
            DeadlineMode::Late
        }
    }

    /// Whether the deadline should fire immediately.
    #[must_use]
    pub fn should_trigger_begin_impl_frame_deadline_immediately(&self) -> bool {
        // Activation was just forced.
        if self.pending_activations_should_be_forced() && !self.has_pending_tree {
            return true;
        }
        // No draw can be submitted until the ack arrives anyway.
        if self.is_draw_throttled() {
            return false;
        }
        if self.active_tree_needs_first_draw {
            return true;
        }
        if !self.needs_redraw {
            return false;
        }
        // The main thread has nothing in flight, e.g. after an aborted commit.
        if !self.commit_pending() && !self.has_pending_tree {
            return true;
        }
        self.impl_latency_takes_priority()
    }

    // -----------------------------------------------------------------------
    // Main-thread notifications
    // -----------------------------------------------------------------------

    /// Records that the main thread started working on the frame.
    pub fn notify_begin_main_frame_started(&mut self) {
        assert_eq!(
            self.begin_main_frame_state,
            BeginMainFrameState::Sent,
            "main frame started without being sent"
        );
        self.begin_main_frame_state = BeginMainFrameState::Started;
    }

    /// Records that the main thread finished and is ready to commit.
    pub fn notify_ready_to_commit(&mut self) {
        assert_eq!(
            self.begin_main_frame_state,
            BeginMainFrameState::Started,
            "ready to commit without a started main frame"
        );
        self.begin_main_frame_state = BeginMainFrameState::ReadyToCommit;
        if self.settings.commit_to_active_tree {
            debug_assert!(
                self.should_commit(),
                "committing to the active tree must follow readiness immediately"
            );
        }
    }

    /// Records that the main thread ended the frame early.
    pub fn begin_main_frame_aborted(&mut self, reason: CommitEarlyOutReason) {
        assert_eq!(
            self.begin_main_frame_state,
            BeginMainFrameState::Started,
            "main frame aborted without being started"
        );
        // An abort carried no update, so the missed deadline is irrelevant.
        self.main_thread_missed_last_deadline = false;

        match reason {
            CommitEarlyOutReason::AbortedFrameSinkLost
            | CommitEarlyOutReason::AbortedNotVisible
            | CommitEarlyOutReason::AbortedDeferredCommit => {
                self.begin_main_frame_state = BeginMainFrameState::Idle;
                self.set_needs_begin_main_frame();
            }
            CommitEarlyOutReason::FinishedNoUpdates => {
                self.will_commit(true);
            }
        }
    }

    /// Marks the pending tree, if any, as ready to activate.
    pub fn notify_ready_to_activate(&mut self) {
        if self.has_pending_tree {
            self.pending_tree_is_ready_for_activation = true;
        }
    }

    /// Records that the active tree finished rasterizing.
    pub fn notify_ready_to_draw(&mut self) {
        self.wait_for_ready_to_draw = false;
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Sets output visibility.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.main_thread_missed_last_deadline = false;
        }
        self.prepare_tiles_funnel.disarm();
        self.wait_for_ready_to_draw = false;
    }

    /// Sets whether drawing is possible at all.
    pub fn set_can_draw(&mut self, can_draw: bool) {
        self.can_draw = can_draw;
    }

    /// Requests a redraw.
    pub fn set_needs_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Requests a main frame.
    pub fn set_needs_begin_main_frame(&mut self) {
        self.needs_begin_main_frame = true;
    }

    /// Requests one begin-impl-frame without any other work.
    pub fn set_needs_one_begin_impl_frame(&mut self) {
        self.needs_one_begin_impl_frame = true;
    }

    /// Requests a tile preparation pass.
    pub fn set_needs_prepare_tiles(&mut self) {
        if !self.needs_prepare_tiles {
            trace!("needs prepare tiles");
            self.needs_prepare_tiles = true;
        }
    }

    /// Sets whether commits are deferred.
    pub fn set_defer_commits(&mut self, defer_commits: bool) {
        self.defer_commits = defer_commits;
    }

    /// Sets whether the begin-frame source is paused.
    pub fn set_begin_frame_source_paused(&mut self, paused: bool) {
        self.begin_frame_source_paused = paused;
    }

    /// Sets whether draws are resourceless software draws.
    pub fn set_resourceless_software_draw(&mut self, resourceless_draw: bool) {
        self.resourceless_draw = resourceless_draw;
    }

    /// Sets whether video playback wants begin frames.
    pub fn set_video_needs_begin_frames(&mut self, video_needs_begin_frames: bool) {
        self.video_needs_begin_frames = video_needs_begin_frames;
    }

    /// Sets the tile priority and scroll handler state together.
    pub fn set_tree_priorities_and_scroll_state(
        &mut self,
        tree_priority: TreePriority,
        scroll_handler_state: ScrollHandlerState,
    ) {
        self.tree_priority = tree_priority;
        self.scroll_handler_state = scroll_handler_state;
    }

    /// Sets whether the main thread turns critical frames around quickly.
    pub fn set_critical_begin_main_frame_to_activate_is_fast(&mut self, is_fast: bool) {
        self.critical_begin_main_frame_to_activate_is_fast = is_fast;
    }

    /// Skips the next begin-main-frame of the current tick.
    pub fn set_skip_next_begin_main_frame_to_reduce_latency(&mut self) {
        trace!("skip next begin main frame to reduce latency");
        self.skip_next_begin_main_frame_to_reduce_latency = true;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether the driver should keep receiving begin frames.
    #[must_use]
    pub fn begin_frame_needed(&self) -> bool {
        if !self.has_initialized_compositor_frame_sink() {
            return false;
        }
        if !self.visible {
            return false;
        }
        self.begin_frame_required_for_action()
            || self.video_needs_begin_frames
            || self.proactive_begin_frame_wanted()
    }

    /// Cases that cannot make progress without a begin frame.
    fn begin_frame_required_for_action(&self) -> bool {
        // Forced draws follow normal draw scheduling.
        if self.forced_redraw_state == ForcedRedrawState::WaitingForDraw {
            return true;
        }
        self.needs_redraw
            || self.needs_one_begin_impl_frame
            || (self.needs_begin_main_frame && !self.defer_commits)
    }

    /// Cases that will very likely want a begin frame soon. Asking early hides
    /// the round trip to the begin-frame source.
    fn proactive_begin_frame_wanted(&self) -> bool {
        if !self.visible {
            return false;
        }
        // A quick commit will want to draw; deferred commits will not come.
        if self.commit_pending() && !self.defer_commits {
            return true;
        }
        self.has_pending_tree
            || self.needs_prepare_tiles
            || self.did_draw_in_last_frame
            || self.last_commit_had_no_updates
    }

    /// Whether the maximum number of submitted frames is awaiting acks.
    #[must_use]
    pub fn is_draw_throttled(&self) -> bool {
        self.pending_submit_frames >= MAX_PENDING_SUBMIT_FRAMES
    }

    /// Whether a frame sink exists and finished initializing.
    #[must_use]
    pub fn has_initialized_compositor_frame_sink(&self) -> bool {
        match self.frame_sink_state {
            FrameSinkState::None | FrameSinkState::Creating => false,
            FrameSinkState::WaitingForFirstCommit
            | FrameSinkState::WaitingForFirstActivation
            | FrameSinkState::Active => true,
        }
    }

    /// Whether only compositor-side updates are outstanding.
    #[must_use]
    pub fn only_impl_side_updates_expected(&self) -> bool {
        let has_impl_updates = self.needs_redraw || self.needs_one_begin_impl_frame;
        let main_updates_expected = self.needs_begin_main_frame
            || self.begin_main_frame_state != BeginMainFrameState::Idle
            || self.has_pending_tree;
        has_impl_updates && !main_updates_expected
    }

    /// Whether compositor latency wins over main-thread throughput.
    ///
    /// A fast main thread with a scroll handler is synchronized with;
    /// otherwise latency wins exactly when smoothness is prioritized.
    #[must_use]
    pub fn impl_latency_takes_priority(&self) -> bool {
        if self.scroll_handler_state == ScrollHandlerState::AffectsScrollHandler
            && self.critical_begin_main_frame_to_activate_is_fast
        {
            return false;
        }
        self.tree_priority == TreePriority::SmoothnessTakesPriority
    }

    /// Whether a begin-main-frame is in flight.
    #[must_use]
    pub fn commit_pending(&self) -> bool {
        matches!(
            self.begin_main_frame_state,
            BeginMainFrameState::Sent
                | BeginMainFrameState::Started
                | BeginMainFrameState::ReadyToCommit
        )
    }

    /// Returns a copy of every field for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            major: MajorState {
                next_action: self.next_action(),
                begin_impl_frame_state: self.begin_impl_frame_state,
                begin_main_frame_state: self.begin_main_frame_state,
                frame_sink_state: self.frame_sink_state,
                forced_redraw_state: self.forced_redraw_state,
            },
            minor: MinorState {
                commit_count: self.commit_count,
                current_frame_number: self.current_frame_number,
                last_frame_number_submit_performed: self.last_frame_number_submit_performed,
                last_frame_number_draw_performed: self.last_frame_number_draw_performed,
                last_frame_number_begin_main_frame_sent: self
                    .last_frame_number_begin_main_frame_sent,
                last_frame_number_invalidate_performed: self.last_frame_number_invalidate_performed,
                draw_funnel: self.draw_funnel.is_armed(),
                send_begin_main_frame_funnel: self.send_begin_main_frame_funnel.is_armed(),
                prepare_tiles_funnel: self.prepare_tiles_funnel.level(),
                invalidate_funnel: self.invalidate_funnel.is_armed(),
                consecutive_checkerboard_animations: self.consecutive_checkerboard_animations,
                pending_submit_frames: self.pending_submit_frames,
                submit_frames_with_current_sink: self.submit_frames_with_current_sink,
                needs_redraw: self.needs_redraw,
                needs_prepare_tiles: self.needs_prepare_tiles,
                needs_begin_main_frame: self.needs_begin_main_frame,
                needs_one_begin_impl_frame: self.needs_one_begin_impl_frame,
                visible: self.visible,
                begin_frame_source_paused: self.begin_frame_source_paused,
                can_draw: self.can_draw,
                resourceless_draw: self.resourceless_draw,
                has_pending_tree: self.has_pending_tree,
                pending_tree_is_ready_for_activation: self.pending_tree_is_ready_for_activation,
                active_tree_needs_first_draw: self.active_tree_needs_first_draw,
                wait_for_ready_to_draw: self.wait_for_ready_to_draw,
                did_create_first_sink: self.did_create_first_sink,
                tree_priority: self.tree_priority,
                scroll_handler_state: self.scroll_handler_state,
                critical_begin_main_frame_to_activate_is_fast: self
                    .critical_begin_main_frame_to_activate_is_fast,
                main_thread_missed_last_deadline: self.main_thread_missed_last_deadline,
                skip_next_begin_main_frame_to_reduce_latency: self
                    .skip_next_begin_main_frame_to_reduce_latency,
                video_needs_begin_frames: self.video_needs_begin_frames,
                defer_commits: self.defer_commits,
                last_commit_had_no_updates: self.last_commit_had_no_updates,
                did_draw_in_last_frame: self.did_draw_in_last_frame,
                did_submit_in_last_frame: self.did_submit_in_last_frame,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Returns the settings this machine was created with.
    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Returns the frame sink lifecycle state.
    #[must_use]
    pub fn frame_sink_state(&self) -> FrameSinkState {
        self.frame_sink_state
    }

    /// Returns the tick phase.
    #[must_use]
    pub fn begin_impl_frame_state(&self) -> BeginImplFrameState {
        self.begin_impl_frame_state
    }

    /// Returns the main-frame request lifecycle state.
    #[must_use]
    pub fn begin_main_frame_state(&self) -> BeginMainFrameState {
        self.begin_main_frame_state
    }

    /// Returns the forced-redraw recovery state.
    #[must_use]
    pub fn forced_redraw_state(&self) -> ForcedRedrawState {
        self.forced_redraw_state
    }

    /// Returns whether a redraw is requested.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Returns whether a main frame is requested.
    #[must_use]
    pub fn needs_begin_main_frame(&self) -> bool {
        self.needs_begin_main_frame
    }

    /// Returns whether a pending tree exists.
    #[must_use]
    pub fn has_pending_tree(&self) -> bool {
        self.has_pending_tree
    }

    /// Returns whether the active tree still needs its first draw.
    #[must_use]
    pub fn active_tree_needs_first_draw(&self) -> bool {
        self.active_tree_needs_first_draw
    }

    /// Returns the number of submitted frames awaiting an ack.
    #[must_use]
    pub fn pending_submit_frames(&self) -> u32 {
        self.pending_submit_frames
    }

    /// Returns the number of commits so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commit_count
    }

    /// Returns the number of begin-impl-frames seen.
    #[must_use]
    pub fn current_frame_number(&self) -> u64 {
        self.current_frame_number
    }

    /// Returns whether the main thread missed the last deadline.
    #[must_use]
    pub fn main_thread_missed_last_deadline(&self) -> bool {
        self.main_thread_missed_last_deadline
    }
}
