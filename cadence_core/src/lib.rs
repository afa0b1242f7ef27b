// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic decision engine for compositor frame scheduling.
//!
//! `cadence_core` decides, once per compositor tick, which single pipeline
//! action should run next. It is `no_std` compatible, performs
//! no I/O and owns no threads: a driver reports events, then asks what to do.
//!
//! # Architecture
//!
//! ```text
//!   vsync / completion callbacks
//!       │
//!       ▼
//!   FrameDriver ──► PipelineStateMachine::on_*/did_*/will_*
//!       │                     │
//!       │                     ▼
//!       │           PipelineStateMachine::next_action() ──► Action
//!       │                                                     │
//!       ▼                                                     │
//!   PipelineClient::{commit, draw_if_possible, ...} ◄─────────┘
//! ```
//!
//! **[`machine`]**: The [`PipelineStateMachine`](machine::PipelineStateMachine):
//! a flat state vector plus an ordered cascade of guard predicates.
//!
//! **[`state`]**: Lifecycle enums, [`Action`](state::Action),
//! [`DrawResult`](state::DrawResult) and friends.
//!
//! **[`funnel`]**: At-most-once-per-tick gates.
//!
//! **[`settings`]**: Immutable [`SchedulerSettings`](settings::SchedulerSettings)
//! with presets for the common embeddings.
//!
//! **[`snapshot`]**: Read-only copy of every field, for diagnostics.
//!
//! **[`client`]**: The [`PipelineClient`](client::PipelineClient) trait a
//! compositor implements to carry out actions.
//!
//! **[`driver`]**: [`FrameDriver`](driver::FrameDriver), a reference frame
//! loop that feeds tick phases in and dispatches actions out.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[cfg(test)]
extern crate alloc;

pub mod client;
pub mod driver;
pub mod funnel;
pub mod machine;
pub mod settings;
pub mod snapshot;
pub mod state;
pub mod trace;
