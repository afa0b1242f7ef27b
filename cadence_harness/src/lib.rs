// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated compositor pipeline for scenario tests and demos.
//!
//! [`SimulatedPipeline`] carries out every action instantly and counts what
//! it did in [`PipelineStats`]. [`run_frames`] plays the roles a real
//! embedder splits across threads: tick source, main thread, rasterizer and
//! frame sink.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use cadence_core::client::{DrawOutcome, PipelineClient};
use cadence_core::driver::FrameDriver;
use cadence_core::settings::SchedulerSettings;
use cadence_core::state::{Action, CommitEarlyOutReason, DrawResult};
use cadence_core::trace::Tracer;

/// Per-run counters.
///
/// Cumulative over the lifetime of a [`SimulatedPipeline`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames stepped by [`run_frames`], ticked or not.
    pub frames: u64,
    /// Frames skipped because no begin frame was needed.
    pub idle_frames: u64,
    /// Actions dispatched by the driver.
    pub actions: u64,
    /// Begin-main-frames sent.
    pub main_frames_sent: u64,
    /// Commits carried out.
    pub commits: u64,
    /// Pending trees activated.
    pub activations: u64,
    /// Draw attempts, forced or not.
    pub draws: u64,
    /// Draws that submitted a frame.
    pub frames_submitted: u64,
    /// Draws that bailed because animations would checkerboard.
    pub checkerboarded_draws: u64,
    /// Forced draws.
    pub forced_draws: u64,
    /// Tile preparation passes.
    pub tile_passes: u64,
    /// Synchronous-compositor invalidations.
    pub invalidations: u64,
    /// Frame sinks created.
    pub sink_creations: u64,
    /// Frame sinks lost.
    pub sink_losses: u64,
}

/// A compositor that does every piece of work instantly.
///
/// Failures are scripted: [`checkerboard_next_draws`](Self::checkerboard_next_draws)
/// makes the next draws checkerboard and
/// [`lose_context_on_next_draw`](Self::lose_context_on_next_draw) drops the
/// frame sink mid-draw.
#[derive(Clone, Debug, Default)]
pub struct SimulatedPipeline {
    main_frame_requested: bool,
    sink_creation_requested: bool,
    checkerboard_draws: u32,
    lose_context: bool,
    context_lost: bool,
    stats: PipelineStats,
    history: Vec<Action>,
}

impl SimulatedPipeline {
    /// Creates a pipeline where every draw succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `draws` non-forced draws checkerboard.
    #[must_use]
    pub fn with_checkerboard_draws(mut self, draws: u32) -> Self {
        self.checkerboard_next_draws(draws);
        self
    }

    /// Makes the next `draws` non-forced draws checkerboard.
    pub fn checkerboard_next_draws(&mut self, draws: u32) {
        self.checkerboard_draws = draws;
    }

    /// Makes the next draw lose the graphics context.
    pub fn lose_context_on_next_draw(&mut self) {
        self.lose_context = true;
    }

    /// Returns the counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Returns every client call in order.
    #[must_use]
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    fn take_main_frame_request(&mut self) -> bool {
        core::mem::take(&mut self.main_frame_requested)
    }

    fn take_sink_creation_request(&mut self) -> bool {
        core::mem::take(&mut self.sink_creation_requested)
    }

    fn take_context_loss(&mut self) -> bool {
        core::mem::take(&mut self.context_lost)
    }

    fn record_draw(&mut self, outcome: DrawOutcome) -> DrawOutcome {
        self.stats.draws += 1;
        if outcome.did_submit {
            self.stats.frames_submitted += 1;
        }
        outcome
    }
}

impl PipelineClient for SimulatedPipeline {
    fn send_begin_main_frame(&mut self) {
        self.history.push(Action::SendBeginMainFrame);
        self.stats.main_frames_sent += 1;
        self.main_frame_requested = true;
    }

    fn commit(&mut self) {
        self.history.push(Action::Commit);
        self.stats.commits += 1;
    }

    fn activate_sync_tree(&mut self) {
        self.history.push(Action::ActivateSyncTree);
        self.stats.activations += 1;
    }

    fn draw_if_possible(&mut self) -> DrawOutcome {
        self.history.push(Action::DrawIfPossible);
        let outcome = if core::mem::take(&mut self.lose_context) {
            self.context_lost = true;
            DrawOutcome::aborted(DrawResult::AbortedDrainingPipeline)
        } else if self.checkerboard_draws > 0 {
            self.checkerboard_draws -= 1;
            self.stats.checkerboarded_draws += 1;
            DrawOutcome::aborted(DrawResult::AbortedCheckerboardAnimations)
        } else {
            DrawOutcome::submitted()
        };
        self.record_draw(outcome)
    }

    fn draw_forced(&mut self) -> DrawOutcome {
        self.history.push(Action::DrawForced);
        self.stats.forced_draws += 1;
        self.record_draw(DrawOutcome::submitted())
    }

    fn begin_frame_sink_creation(&mut self) {
        self.history.push(Action::BeginSurfaceCreation);
        self.sink_creation_requested = true;
    }

    fn prepare_tiles(&mut self) {
        self.history.push(Action::PrepareTiles);
        self.stats.tile_passes += 1;
    }

    fn invalidate_frame_sink(&mut self) {
        self.history.push(Action::InvalidateSurface);
        self.stats.invalidations += 1;
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// How [`run_frames`] plays the embedder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Request a main frame at the start of every frame.
    pub continuous_main_frames: bool,
    /// Main frames commit new content. When `false` they finish with no
    /// updates.
    pub main_frame_has_updates: bool,
    /// Request a redraw at the start of every frame, like an impl-side
    /// animation.
    pub redraw_every_frame: bool,
    /// Request a tile preparation pass at the start of every frame.
    pub prepare_tiles_every_frame: bool,
    /// Tick interval in nanoseconds.
    pub frame_interval: u64,
    /// Consecutive frames without a submit, while a redraw is owed, before
    /// the run fails.
    pub stall_limit: u32,
    /// Actions one run may dispatch.
    pub action_budget: u64,
}

impl HarnessConfig {
    /// A 60 Hz page with a busy main thread.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            continuous_main_frames: true,
            main_frame_has_updates: true,
            redraw_every_frame: false,
            prepare_tiles_every_frame: false,
            frame_interval: 16_666_667,
            stall_limit: 8,
            action_budget: 1 << 16,
        }
    }

    /// A page with nothing to do.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            continuous_main_frames: false,
            ..Self::new()
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A run that stopped early.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// A redraw stayed owed without a submit for `frames` frames.
    #[error("no frame submitted for {frames} frames while a redraw was owed")]
    Stalled {
        /// Consecutive frames without progress.
        frames: u32,
    },
    /// The run dispatched more than `budget` actions.
    #[error("run dispatched more than {budget} actions")]
    ActionBudgetExceeded {
        /// The configured budget.
        budget: u64,
    },
}

/// Creates a driver around a fresh [`SimulatedPipeline`], visible and able to
/// draw.
#[must_use]
pub fn simulated_driver(settings: SchedulerSettings) -> FrameDriver<SimulatedPipeline> {
    let mut driver = FrameDriver::new(settings, SimulatedPipeline::new());
    let sm = driver.state_machine_mut();
    sm.set_visible(true);
    sm.set_can_draw(true);
    driver
}

/// Steps `frames` frames and returns the pipeline's cumulative counters.
///
/// Each frame: the previous submit is acked, per-frame requests from
/// `config` are made, a requested frame sink finishes creating, and if a
/// begin frame is needed a full tick runs. Inside the tick the main thread
/// answers at once and raster finishes before the deadline. Frames where no
/// begin frame is needed count as idle.
///
/// # Errors
///
/// [`HarnessError::Stalled`] after `config.stall_limit` frames in a row that
/// owe a redraw but submit nothing, and
/// [`HarnessError::ActionBudgetExceeded`] once this call has dispatched more
/// than `config.action_budget` actions.
pub fn run_frames(
    driver: &mut FrameDriver<SimulatedPipeline>,
    config: &HarnessConfig,
    frames: u64,
    tracer: &mut Tracer<'_>,
) -> Result<PipelineStats, HarnessError> {
    let mut actions: u64 = 0;
    let mut stalled: u32 = 0;

    for _ in 0..frames {
        let frame_start = (driver.client().stats.frames + 1) * config.frame_interval;
        let submitted_before = driver.client().stats.frames_submitted;
        let mut dispatched = 0;

        if driver.state_machine().pending_submit_frames() > 0 {
            dispatched += driver.did_receive_frame_ack(frame_start, tracer);
        }

        let sm = driver.state_machine_mut();
        if config.continuous_main_frames {
            sm.set_needs_begin_main_frame();
        }
        if config.redraw_every_frame {
            sm.set_needs_redraw();
        }
        if config.prepare_tiles_every_frame {
            sm.set_needs_prepare_tiles();
        }
        dispatched += driver.process_actions(tracer);

        if driver.client_mut().take_sink_creation_request() {
            driver.client_mut().stats.sink_creations += 1;
            dispatched += driver.did_create_frame_sink(tracer);
        }

        if driver.state_machine().begin_frame_needed() {
            dispatched += run_tick(driver, config, frame_start, tracer);
        } else {
            driver.client_mut().stats.idle_frames += 1;
        }

        let pipeline = driver.client_mut();
        pipeline.stats.frames += 1;
        pipeline.stats.actions += dispatched as u64;

        actions += dispatched as u64;
        if actions > config.action_budget {
            return Err(HarnessError::ActionBudgetExceeded {
                budget: config.action_budget,
            });
        }

        let progressed = driver.client().stats.frames_submitted > submitted_before;
        if progressed || !driver.state_machine().needs_redraw() {
            stalled = 0;
        } else {
            stalled += 1;
            if stalled >= config.stall_limit {
                return Err(HarnessError::Stalled { frames: stalled });
            }
        }
    }

    Ok(driver.client().stats())
}

fn run_tick(
    driver: &mut FrameDriver<SimulatedPipeline>,
    config: &HarnessConfig,
    frame_start: u64,
    tracer: &mut Tracer<'_>,
) -> usize {
    let mut dispatched = driver.begin_impl_frame(frame_start, tracer);

    if driver.client_mut().take_main_frame_request() {
        let sm = driver.state_machine_mut();
        sm.notify_begin_main_frame_started();
        if config.main_frame_has_updates {
            sm.notify_ready_to_commit();
        } else {
            sm.begin_main_frame_aborted(CommitEarlyOutReason::FinishedNoUpdates);
        }
        dispatched += driver.process_actions(tracer);
    }

    let sm = driver.state_machine_mut();
    sm.notify_ready_to_activate();
    sm.notify_ready_to_draw();
    dispatched += driver.process_actions(tracer);

    dispatched += driver.begin_impl_frame_deadline(frame_start + config.frame_interval / 2, tracer);
    if driver.client_mut().take_context_loss() {
        driver.client_mut().stats.sink_losses += 1;
        dispatched += driver.did_lose_frame_sink(tracer);
    }
    dispatched + driver.begin_impl_frame_idle(frame_start + config.frame_interval - 1, tracer)
}
