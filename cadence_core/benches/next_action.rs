// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decision cost of `next_action` and of a full simulated tick.

use cadence_core::machine::PipelineStateMachine;
use cadence_core::settings::SchedulerSettings;
use cadence_core::state::DrawResult;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// A machine with an active sink, drawn tree and idle tick.
fn active_machine(settings: SchedulerSettings) -> PipelineStateMachine {
    let mut sm = PipelineStateMachine::new(settings);
    sm.set_visible(true);
    sm.set_can_draw(true);
    sm.will_begin_compositor_frame_sink_creation();
    sm.did_create_and_initialize_compositor_frame_sink();
    sm.set_needs_begin_main_frame();
    sm.on_begin_impl_frame();
    sm.will_send_begin_main_frame();
    sm.notify_begin_main_frame_started();
    sm.notify_ready_to_commit();
    sm.will_commit(false);
    sm.notify_ready_to_activate();
    sm.notify_ready_to_draw();
    sm.will_activate();
    sm.on_begin_impl_frame_deadline();
    sm.will_draw();
    sm.did_draw(DrawResult::Success);
    sm.on_begin_impl_frame_idle();
    sm
}

fn bench_next_action(c: &mut Criterion) {
    let mut group = c.benchmark_group("PipelineStateMachine");

    let quiet = active_machine(SchedulerSettings::renderer());
    group.bench_function("next_action (quiet)", |b| {
        b.iter(|| black_box(black_box(&quiet).next_action()));
    });

    let mut drawing = active_machine(SchedulerSettings::renderer());
    drawing.set_needs_redraw();
    drawing.on_begin_impl_frame();
    drawing.on_begin_impl_frame_deadline();
    group.bench_function("next_action (draw pending)", |b| {
        b.iter(|| black_box(black_box(&drawing).next_action()));
    });

    let base = active_machine(SchedulerSettings::renderer());
    group.bench_function("redraw-only tick", |b| {
        b.iter(|| {
            let mut sm = base.clone();
            sm.set_needs_redraw();
            sm.on_begin_impl_frame();
            sm.on_begin_impl_frame_deadline();
            let action = sm.next_action();
            sm.will_draw();
            sm.did_draw(DrawResult::Success);
            sm.on_begin_impl_frame_idle();
            black_box(action);
        });
    });

    group.bench_function("snapshot", |b| {
        b.iter(|| black_box(black_box(&base).snapshot()));
    });

    group.finish();
}

criterion_group!(benches, bench_next_action);
criterion_main!(benches);
