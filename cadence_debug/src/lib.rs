// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for cadence
//! diagnostics.
//!
//! This crate provides [`TraceSink`](cadence_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`tee::TeeSink`]: forwards every event to two sinks.
//!
//! [`snapshot`] turns a [`StateSnapshot`](cadence_core::snapshot::StateSnapshot)
//! into a JSON document.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod snapshot;
pub mod tee;
