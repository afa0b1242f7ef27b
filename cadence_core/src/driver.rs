// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference frame loop around the state machine.
//!
//! [`FrameDriver`] owns a [`PipelineStateMachine`] and a [`PipelineClient`].
//! Tick phases and completion callbacks go in; after each one the driver
//! drains [`next_action`](PipelineStateMachine::next_action), updating the
//! state machine around every client call.
//!
//! Every entry point takes a [`Tracer`] and returns how many actions it
//! dispatched.

use log::{trace, warn};

use crate::client::PipelineClient;
use crate::machine::PipelineStateMachine;
use crate::settings::SchedulerSettings;
use crate::state::{Action, DrawResult, ForcedRedrawState};
use crate::trace::{
    AckEvent, ActionEvent, DrawEvent, FrameEvent, FramePhase, SubmitEvent, Tracer,
};

/// Upper bound on actions dispatched by one
/// [`process_actions`](FrameDriver::process_actions) pass.
///
/// Every action changes state so that it is not chosen again, so a pass
/// settles well below this. Exceeding it means some action failed to update
/// the state machine.
pub const MAX_ACTIONS_PER_PASS: usize = 32;

/// Feeds tick phases into a [`PipelineStateMachine`] and dispatches the
/// resulting actions to a [`PipelineClient`].
#[derive(Debug)]
pub struct FrameDriver<C> {
    machine: PipelineStateMachine,
    client: C,
    now: u64,
}

impl<C: PipelineClient> FrameDriver<C> {
    /// Creates a driver with a fresh state machine.
    #[must_use]
    pub fn new(settings: SchedulerSettings, client: C) -> Self {
        Self {
            machine: PipelineStateMachine::new(settings),
            client,
            now: 0,
        }
    }

    /// Starts a tick at caller time `now` (nanoseconds).
    pub fn begin_impl_frame(&mut self, now: u64, tracer: &mut Tracer<'_>) -> usize {
        self.now = now;
        self.machine.on_begin_impl_frame();
        self.emit_frame(FramePhase::BeginFrame, tracer);
        self.process_actions(tracer)
    }

    /// Fires the current tick's deadline.
    pub fn begin_impl_frame_deadline(&mut self, now: u64, tracer: &mut Tracer<'_>) -> usize {
        self.now = now;
        self.machine.on_begin_impl_frame_deadline();
        self.emit_frame(FramePhase::Deadline, tracer);
        self.process_actions(tracer)
    }

    /// Ends the current tick.
    ///
    /// Emits a state snapshot when the tracer is enabled.
    pub fn begin_impl_frame_idle(&mut self, now: u64, tracer: &mut Tracer<'_>) -> usize {
        self.now = now;
        self.machine.on_begin_impl_frame_idle();
        self.emit_frame(FramePhase::Idle, tracer);
        let dispatched = self.process_actions(tracer);
        if tracer.is_enabled() {
            let snapshot = self.machine.snapshot();
            tracer.state_snapshot(self.machine.current_frame_number(), &snapshot);
        }
        dispatched
    }

    /// Reports that frame sink creation completed.
    pub fn did_create_frame_sink(&mut self, tracer: &mut Tracer<'_>) -> usize {
        self.machine.did_create_and_initialize_compositor_frame_sink();
        self.process_actions(tracer)
    }

    /// Reports that the frame sink was lost.
    pub fn did_lose_frame_sink(&mut self, tracer: &mut Tracer<'_>) -> usize {
        warn!(
            "frame sink lost at frame {}",
            self.machine.current_frame_number()
        );
        self.machine.did_lose_compositor_frame_sink();
        self.process_actions(tracer)
    }

    /// Reports that the sink acknowledged a submitted frame.
    pub fn did_receive_frame_ack(&mut self, now: u64, tracer: &mut Tracer<'_>) -> usize {
        self.machine.did_receive_compositor_frame_ack();
        tracer.ack(&AckEvent {
            frame_number: self.machine.current_frame_number(),
            pending_submit_frames: self.machine.pending_submit_frames(),
            timestamp: now,
        });
        self.process_actions(tracer)
    }

    /// Dispatches actions until the state machine returns [`Action::None`].
    ///
    /// Call after reporting events through
    /// [`state_machine_mut`](Self::state_machine_mut).
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_ACTIONS_PER_PASS`] actions are chosen in one
    /// pass.
    pub fn process_actions(&mut self, tracer: &mut Tracer<'_>) -> usize {
        let mut dispatched = 0;
        loop {
            let action = self.machine.next_action();
            if action == Action::None {
                return dispatched;
            }
            assert!(
                dispatched < MAX_ACTIONS_PER_PASS,
                "action loop did not settle; last action was {action}"
            );
            dispatched += 1;
            trace!("frame {}: {action}", self.machine.current_frame_number());
            tracer.action(&ActionEvent {
                frame_number: self.machine.current_frame_number(),
                action,
                timestamp: self.now,
            });
            self.dispatch(action, tracer);
        }
    }

    fn dispatch(&mut self, action: Action, tracer: &mut Tracer<'_>) {
        match action {
            Action::None => {}
            Action::SendBeginMainFrame => {
                self.machine.will_send_begin_main_frame();
                self.client.send_begin_main_frame();
            }
            Action::Commit => {
                self.machine.will_commit(false);
                self.client.commit();
            }
            Action::ActivateSyncTree => {
                self.machine.will_activate();
                self.client.activate_sync_tree();
            }
            Action::DrawIfPossible | Action::DrawForced => self.draw(action, tracer),
            Action::DrawAbort => {
                self.machine.abort_draw();
                tracer.draw(&DrawEvent {
                    frame_number: self.machine.current_frame_number(),
                    action,
                    result: DrawResult::AbortedDrainingPipeline,
                    did_submit: false,
                });
            }
            Action::BeginSurfaceCreation => {
                self.machine.will_begin_compositor_frame_sink_creation();
                self.client.begin_frame_sink_creation();
            }
            Action::PrepareTiles => {
                self.machine.will_prepare_tiles();
                self.client.prepare_tiles();
                self.machine.did_prepare_tiles();
            }
            Action::InvalidateSurface => {
                self.machine.will_invalidate_compositor_frame_sink();
                self.client.invalidate_frame_sink();
            }
        }
    }

    fn draw(&mut self, action: Action, tracer: &mut Tracer<'_>) {
        self.machine.will_draw();
        let outcome = if action == Action::DrawForced {
            self.client.draw_forced()
        } else {
            self.client.draw_if_possible()
        };
        let frame_number = self.machine.current_frame_number();

        if outcome.did_submit {
            self.machine.did_submit_compositor_frame();
            tracer.submit(&SubmitEvent {
                frame_number,
                pending_submit_frames: self.machine.pending_submit_frames(),
                timestamp: self.now,
            });
        }

        let forced_before = self.machine.forced_redraw_state();
        self.machine.did_draw(outcome.result);
        if forced_before == ForcedRedrawState::Idle
            && self.machine.forced_redraw_state() == ForcedRedrawState::WaitingForCommit
        {
            warn!("frame {frame_number}: animations keep checkerboarding; forcing a redraw");
        }

        tracer.draw(&DrawEvent {
            frame_number,
            action,
            result: outcome.result,
            did_submit: outcome.did_submit,
        });
    }

    fn emit_frame(&self, phase: FramePhase, tracer: &mut Tracer<'_>) {
        tracer.frame(&FrameEvent {
            frame_number: self.machine.current_frame_number(),
            phase,
            timestamp: self.now,
        });
    }

    /// Returns the state machine.
    #[must_use]
    pub fn state_machine(&self) -> &PipelineStateMachine {
        &self.machine
    }

    /// Returns the state machine for reporting events and setting signals.
    ///
    /// Follow up with [`process_actions`](Self::process_actions).
    pub fn state_machine_mut(&mut self) -> &mut PipelineStateMachine {
        &mut self.machine
    }

    /// Returns the client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the client mutably.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Returns the caller time of the most recent tick phase.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::client::DrawOutcome;

    #[derive(Debug, Default)]
    struct RecordingClient {
        calls: Vec<Action>,
        main_frame_requested: bool,
        checkerboard: bool,
        context_lost: bool,
    }

    impl PipelineClient for RecordingClient {
        fn send_begin_main_frame(&mut self) {
            self.calls.push(Action::SendBeginMainFrame);
            self.main_frame_requested = true;
        }

        fn commit(&mut self) {
            self.calls.push(Action::Commit);
        }

        fn activate_sync_tree(&mut self) {
            self.calls.push(Action::ActivateSyncTree);
        }

        fn draw_if_possible(&mut self) -> DrawOutcome {
            self.calls.push(Action::DrawIfPossible);
            if self.context_lost {
                DrawOutcome::aborted(DrawResult::AbortedContextLost)
            } else if self.checkerboard {
                DrawOutcome::aborted(DrawResult::AbortedCheckerboardAnimations)
            } else {
                DrawOutcome::submitted()
            }
        }

        fn draw_forced(&mut self) -> DrawOutcome {
            self.calls.push(Action::DrawForced);
            DrawOutcome::submitted()
        }

        fn begin_frame_sink_creation(&mut self) {
            self.calls.push(Action::BeginSurfaceCreation);
        }

        fn prepare_tiles(&mut self) {
            self.calls.push(Action::PrepareTiles);
        }

        fn invalidate_frame_sink(&mut self) {
            self.calls.push(Action::InvalidateSurface);
        }
    }

    const FRAME: u64 = 16_666_667;

    /// Runs one tick, answering main frames and raster immediately.
    fn run_frame(driver: &mut FrameDriver<RecordingClient>, index: u64) {
        let mut tracer = Tracer::none();
        let now = index * FRAME;
        if driver.state_machine().pending_submit_frames() > 0 {
            driver.did_receive_frame_ack(now, &mut tracer);
        }
        driver.begin_impl_frame(now, &mut tracer);
        if core::mem::take(&mut driver.client_mut().main_frame_requested) {
            let sm = driver.state_machine_mut();
            sm.notify_begin_main_frame_started();
            sm.notify_ready_to_commit();
            driver.process_actions(&mut tracer);
        }
        let sm = driver.state_machine_mut();
        sm.notify_ready_to_activate();
        sm.notify_ready_to_draw();
        driver.process_actions(&mut tracer);
        driver.begin_impl_frame_deadline(now + FRAME / 2, &mut tracer);
        driver.begin_impl_frame_idle(now + FRAME - 1, &mut tracer);
    }

    fn visible_driver() -> FrameDriver<RecordingClient> {
        let mut driver = FrameDriver::new(SchedulerSettings::default(), RecordingClient::default());
        let sm = driver.state_machine_mut();
        sm.set_visible(true);
        sm.set_can_draw(true);
        driver
    }

    #[test]
    fn first_frame_runs_full_pipeline() {
        let mut driver = visible_driver();
        let mut tracer = Tracer::none();

        assert_eq!(driver.process_actions(&mut tracer), 1);
        assert_eq!(driver.did_create_frame_sink(&mut tracer), 0);

        driver.state_machine_mut().set_needs_begin_main_frame();
        run_frame(&mut driver, 1);

        assert_eq!(
            driver.client().calls,
            [
                Action::BeginSurfaceCreation,
                Action::SendBeginMainFrame,
                Action::Commit,
                Action::ActivateSyncTree,
                Action::DrawIfPossible,
            ]
        );
        assert_eq!(driver.state_machine().pending_submit_frames(), 1);
        assert_eq!(driver.state_machine().commit_count(), 1);

        driver.did_receive_frame_ack(2 * FRAME, &mut tracer);
        assert_eq!(driver.state_machine().pending_submit_frames(), 0);
    }

    #[test]
    fn idle_pass_with_nothing_to_do_dispatches_nothing() {
        let mut driver = FrameDriver::new(SchedulerSettings::default(), RecordingClient::default());
        assert_eq!(driver.process_actions(&mut Tracer::none()), 0);
        assert!(driver.client().calls.is_empty());
    }

    #[test]
    fn lost_sink_aborts_undrawn_tree_then_recreates() {
        let mut driver = visible_driver();
        let mut tracer = Tracer::none();
        driver.process_actions(&mut tracer);
        driver.did_create_frame_sink(&mut tracer);
        driver.state_machine_mut().set_needs_begin_main_frame();

        driver.begin_impl_frame(FRAME, &mut tracer);
        let sm = driver.state_machine_mut();
        sm.notify_begin_main_frame_started();
        sm.notify_ready_to_commit();
        driver.process_actions(&mut tracer);
        driver.state_machine_mut().notify_ready_to_activate();
        driver.process_actions(&mut tracer);
        assert!(driver.state_machine().active_tree_needs_first_draw());

        driver.client_mut().calls.clear();
        driver.did_lose_frame_sink(&mut tracer);
        assert!(!driver.state_machine().active_tree_needs_first_draw());
        assert!(
            driver.client().calls.is_empty(),
            "an aborted draw never reaches the client"
        );

        driver.begin_impl_frame_deadline(FRAME + FRAME / 2, &mut tracer);
        driver.begin_impl_frame_idle(2 * FRAME - 1, &mut tracer);
        assert_eq!(driver.client().calls, [Action::BeginSurfaceCreation]);
    }

    #[test]
    fn repeated_checkerboarding_leads_to_forced_draw() {
        let mut driver = visible_driver();
        let mut tracer = Tracer::none();
        driver.process_actions(&mut tracer);
        driver.did_create_frame_sink(&mut tracer);
        driver.state_machine_mut().set_needs_begin_main_frame();
        run_frame(&mut driver, 1);

        driver.client_mut().checkerboard = true;
        driver.client_mut().calls.clear();
        driver.state_machine_mut().set_needs_redraw();
        for index in 2..6 {
            run_frame(&mut driver, index);
        }

        let calls = &driver.client().calls;
        let checkerboards = calls
            .iter()
            .filter(|a| **a == Action::DrawIfPossible)
            .count();
        let forced = calls.iter().filter(|a| **a == Action::DrawForced).count();
        assert_eq!(checkerboards, 3);
        assert_eq!(forced, 1, "calls: {calls:?}");
        assert_eq!(
            driver.state_machine().forced_redraw_state(),
            ForcedRedrawState::Idle
        );
    }

    #[test]
    fn synchronous_compositor_invalidates_then_draws() {
        let mut driver = FrameDriver::new(
            SchedulerSettings::synchronous_compositor(),
            RecordingClient::default(),
        );
        let mut tracer = Tracer::none();
        let sm = driver.state_machine_mut();
        sm.set_visible(true);
        sm.set_can_draw(true);
        driver.process_actions(&mut tracer);
        driver.did_create_frame_sink(&mut tracer);
        driver.state_machine_mut().set_needs_begin_main_frame();
        run_frame(&mut driver, 1);
        assert!(driver.client().calls.contains(&Action::DrawIfPossible));

        driver.client_mut().calls.clear();
        driver.state_machine_mut().set_needs_redraw();
        run_frame(&mut driver, 2);
        assert_eq!(
            driver.client().calls,
            [Action::InvalidateSurface, Action::DrawIfPossible]
        );
    }

    #[test]
    #[should_panic(expected = "invalid draw result reported")]
    fn context_lost_result_is_rejected() {
        let mut driver = visible_driver();
        driver.client_mut().context_lost = true;
        let mut tracer = Tracer::none();
        driver.process_actions(&mut tracer);
        driver.did_create_frame_sink(&mut tracer);
        driver.state_machine_mut().set_needs_begin_main_frame();
        run_frame(&mut driver, 1);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traces_actions_and_submits() {
        use crate::snapshot::StateSnapshot;
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Sink {
            actions: Vec<Action>,
            submits: u32,
            acks: u32,
            snapshots: u32,
        }
        impl TraceSink for Sink {
            fn on_action(&mut self, e: &ActionEvent) {
                self.actions.push(e.action);
            }
            fn on_submit(&mut self, _: &SubmitEvent) {
                self.submits += 1;
            }
            fn on_ack(&mut self, _: &AckEvent) {
                self.acks += 1;
            }
            fn on_state_snapshot(&mut self, _: u64, _: &StateSnapshot) {
                self.snapshots += 1;
            }
        }

        let mut driver = visible_driver();
        let mut sink = Sink::default();
        let mut tracer = Tracer::new(&mut sink);
        driver.process_actions(&mut tracer);
        driver.did_create_frame_sink(&mut tracer);
        driver.state_machine_mut().set_needs_begin_main_frame();
        driver.begin_impl_frame(FRAME, &mut tracer);
        let sm = driver.state_machine_mut();
        sm.notify_begin_main_frame_started();
        sm.notify_ready_to_commit();
        driver.process_actions(&mut tracer);
        driver.state_machine_mut().notify_ready_to_activate();
        driver.process_actions(&mut tracer);
        driver.begin_impl_frame_deadline(FRAME + 1, &mut tracer);
        driver.begin_impl_frame_idle(FRAME + 2, &mut tracer);
        driver.did_receive_frame_ack(FRAME + 3, &mut tracer);
        drop(tracer);

        assert_eq!(sink.actions.len(), 5);
        assert_eq!(sink.submits, 1);
        assert_eq!(sink.acks, 1);
        assert_eq!(sink.snapshots, 1);
    }
}
