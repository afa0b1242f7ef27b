// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated compositor run that exercises the tracing and diagnostics
//! pipeline.
//!
//! Drives a [`SimulatedPipeline`](cadence_harness::SimulatedPipeline) through
//! a busy page, a checkerboarding episode, a lost graphics context, an
//! impl-side animation and an idle stretch. Events go to both a
//! [`PrettyPrintSink`] on stdout and a [`RecorderSink`]; the recording is
//! exported as `trace.json` and the final state is printed as JSON.
//!
//! Set `RUST_LOG=debug` to see scheduler log lines on stderr.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use cadence_core::settings::SchedulerSettings;
use cadence_core::trace::Tracer;
use cadence_debug::pretty::PrettyPrintSink;
use cadence_debug::recorder::RecorderSink;
use cadence_debug::tee::TeeSink;
use cadence_harness::{HarnessConfig, run_frames, simulated_driver};

const TRACE_PATH: &str = "trace.json";

fn main() -> io::Result<()> {
    env_logger::init();

    let mut sinks = TeeSink::new(
        PrettyPrintSink::new(Box::new(io::stdout())).with_snapshots(false),
        RecorderSink::new(),
    );
    let mut driver = simulated_driver(SchedulerSettings::renderer());

    let busy = HarnessConfig::new();
    let animating = HarnessConfig {
        continuous_main_frames: false,
        redraw_every_frame: true,
        ..HarnessConfig::new()
    };
    let idle = HarnessConfig::idle();

    {
        let mut tracer = Tracer::new(&mut sinks);

        log::info!("busy page");
        run_frames(&mut driver, &busy, 20, &mut tracer).map_err(io::Error::other)?;

        log::info!("checkerboarding animations");
        driver.client_mut().checkerboard_next_draws(3);
        run_frames(&mut driver, &busy, 6, &mut tracer).map_err(io::Error::other)?;

        log::info!("losing the graphics context");
        driver.client_mut().lose_context_on_next_draw();
        run_frames(&mut driver, &busy, 5, &mut tracer).map_err(io::Error::other)?;

        log::info!("impl-side animation");
        run_frames(&mut driver, &animating, 10, &mut tracer).map_err(io::Error::other)?;

        log::info!("idle");
        run_frames(&mut driver, &idle, 5, &mut tracer).map_err(io::Error::other)?;
    }

    let (_, recorder) = sinks.into_inner();
    let mut writer = BufWriter::new(File::create(TRACE_PATH)?);
    cadence_debug::chrome::export(recorder.as_bytes(), &mut writer)?;
    writer.flush()?;

    let stats = driver.client().stats();
    let mut stdout = io::stdout().lock();
    cadence_debug::snapshot::write_json(&driver.state_machine().snapshot(), &mut stdout)?;
    writeln!(stdout)?;
    writeln!(
        stdout,
        "Wrote {TRACE_PATH}: {} frames, {} submitted, {} forced, {} sinks created",
        stats.frames, stats.frames_submitted, stats.forced_draws, stats.sink_creations,
    )?;
    Ok(())
}
