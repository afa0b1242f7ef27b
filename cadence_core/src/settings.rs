// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable scheduler configuration.
//!
//! [`SchedulerSettings`] is injected into
//! [`PipelineStateMachine::new`](crate::machine::PipelineStateMachine::new)
//! and never changes afterwards. Presets cover the three embeddings the
//! decision logic distinguishes; tweak individual fields with struct-update
//! syntax:
//!
//! ```
//! use cadence_core::settings::SchedulerSettings;
//!
//! let settings = SchedulerSettings {
//!     main_frame_before_activation_enabled: true,
//!     ..SchedulerSettings::renderer()
//! };
//! assert!(!settings.commit_to_active_tree);
//! ```

/// Configuration for the [`PipelineStateMachine`](crate::machine::PipelineStateMachine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Commits land directly in the tree that is drawn; there is no separate
    /// pending tree drawn after activation.
    pub commit_to_active_tree: bool,
    /// Allow requesting the next main frame while a pending tree has not yet
    /// activated.
    pub main_frame_before_activation_enabled: bool,
    /// The embedder drives draws externally. Disables deadlines and enables
    /// surface invalidation.
    pub using_synchronous_renderer_compositor: bool,
    /// Keep sending main frames while a submitted frame awaits its ack.
    pub main_frame_while_submit_frame_throttled_enabled: bool,
    /// Consecutive checkerboarded draws tolerated before a draw is forced.
    pub max_failed_draws_before_forced: u32,
    /// Whether repeated checkerboarding escalates into a forced redraw.
    pub timeout_and_draw_when_animation_checkerboards: bool,
}

impl SchedulerSettings {
    /// Settings for a renderer compositor with a separate pending tree.
    #[must_use]
    pub const fn renderer() -> Self {
        Self {
            commit_to_active_tree: false,
            main_frame_before_activation_enabled: false,
            using_synchronous_renderer_compositor: false,
            main_frame_while_submit_frame_throttled_enabled: false,
            max_failed_draws_before_forced: 3,
            timeout_and_draw_when_animation_checkerboards: true,
        }
    }

    /// Settings for a browser-UI compositor that commits to the active tree.
    #[must_use]
    pub const fn browser() -> Self {
        Self {
            commit_to_active_tree: true,
            ..Self::renderer()
        }
    }

    /// Settings for a host that drives compositing synchronously
    /// (WebView-style embeddings).
    #[must_use]
    pub const fn synchronous_compositor() -> Self {
        Self {
            using_synchronous_renderer_compositor: true,
            ..Self::renderer()
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::renderer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_renderer() {
        assert_eq!(SchedulerSettings::default(), SchedulerSettings::renderer());
    }

    #[test]
    fn presets_differ_only_in_their_mode_flag() {
        let browser = SchedulerSettings::browser();
        assert!(browser.commit_to_active_tree);
        assert!(!browser.using_synchronous_renderer_compositor);
        assert_eq!(browser.max_failed_draws_before_forced, 3);

        let sync = SchedulerSettings::synchronous_compositor();
        assert!(sync.using_synchronous_renderer_compositor);
        assert!(!sync.commit_to_active_tree);
        assert!(sync.timeout_and_draw_when_animation_checkerboards);
    }
}
