// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! At-most-once-per-tick gates.
//!
//! A funnel is armed when its action fires and disarmed at a fixed point in
//! a later tick. While armed, the guarded action is suppressed.
//!
//! - [`Funnel`] is a plain latch.
//! - [`CountingFunnel`] accumulates one unit per fire and drains one unit per
//!   tick, so bursts average out to roughly one action per tick.

/// A boolean at-most-once gate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Funnel {
    armed: bool,
}

impl Funnel {
    /// Creates a disarmed funnel.
    #[must_use]
    pub const fn new() -> Self {
        Self { armed: false }
    }

    /// Creates a funnel that starts armed.
    #[must_use]
    pub const fn armed() -> Self {
        Self { armed: true }
    }

    /// Arms the funnel, suppressing the guarded action.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Disarms the funnel, allowing the guarded action again.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Returns `true` while the guarded action is suppressed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }
}

/// A counting gate that fills on each fire and drains once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountingFunnel {
    level: u32,
}

impl CountingFunnel {
    /// Creates an empty funnel.
    #[must_use]
    pub const fn new() -> Self {
        Self { level: 0 }
    }

    /// Adds one unit.
    pub fn arm(&mut self) {
        self.level = self.level.saturating_add(1);
    }

    /// Removes one unit, if any.
    pub fn drain(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Empties the funnel completely.
    pub fn disarm(&mut self) {
        self.level = 0;
    }

    /// Returns `true` while any unit remains.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.level > 0
    }

    /// Returns the number of undrained units.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funnel_latches_until_disarmed() {
        let mut f = Funnel::new();
        assert!(!f.is_armed());
        f.arm();
        f.arm();
        assert!(f.is_armed());
        f.disarm();
        assert!(!f.is_armed());
    }

    #[test]
    fn armed_constructor_starts_armed() {
        assert!(Funnel::armed().is_armed());
    }

    #[test]
    fn counting_funnel_needs_one_drain_per_fill() {
        let mut f = CountingFunnel::new();
        f.arm();
        f.arm();
        assert_eq!(f.level(), 2);
        f.drain();
        assert!(f.is_armed(), "one unit should remain");
        f.drain();
        assert!(!f.is_armed());
    }

    #[test]
    fn counting_funnel_drain_saturates_at_zero() {
        let mut f = CountingFunnel::new();
        f.drain();
        assert_eq!(f.level(), 0);
    }

    #[test]
    fn counting_funnel_disarm_empties() {
        let mut f = CountingFunnel::new();
        f.arm();
        f.arm();
        f.arm();
        f.disarm();
        assert!(!f.is_armed());
        assert_eq!(f.level(), 0);
    }
}
