//! The limited-resource controller.
//!
//! Periodically compares the projected number of remaining clause
//! selections (from the activation rate and the remaining time) with the
//! passive backlog. When the backlog cannot be processed, a selection
//! rehearsal predicts which clauses would still be chosen and the limits
//! tighten to their age/weight watermarks; the resulting `Tightened` event
//! drives the discard passes.

use crate::containers::PassiveClauseContainer;
use crate::options::Options;
use crate::saturation::limits::{Limits, LimitsChange};
use std::time::Duration;

/// Iterations between consecutive limit checks once checking has started.
const CHECK_INTERVAL: u64 = 100;

pub struct LrsController {
    /// Fraction of the time limit to elapse before the first check.
    first_time_check: f64,
    weight_limit_only: bool,
    next_check_at: u64,
}

impl LrsController {
    pub fn new(options: &Options) -> Self {
        LrsController {
            first_time_check: f64::from(options.lrs_first_time_check) / 100.0,
            weight_limit_only: options.lrs_weight_limit_only,
            next_check_at: 0,
        }
    }

    /// Run a limit check if one is due. Returns the limits change, if any.
    pub fn maybe_update_limits(
        &mut self,
        passive: &mut dyn PassiveClauseContainer,
        limits: &mut Limits,
        elapsed: Duration,
        time_limit: Option<Duration>,
        iterations: u64,
        activations: u64,
    ) -> Option<LimitsChange> {
        // Without a time budget there is nothing to project against.
        let time_limit = time_limit?;
        if elapsed < time_limit.mul_f64(self.first_time_check) {
            return None;
        }
        if iterations < self.next_check_at {
            return None;
        }
        self.next_check_at = iterations + CHECK_INTERVAL;

        let elapsed_secs = elapsed.as_secs_f64().max(1e-3);
        let remaining_secs = time_limit.saturating_sub(elapsed).as_secs_f64();
        if remaining_secs <= 0.0 {
            return None;
        }

        let rate = activations as f64 / elapsed_secs;
        let projected = (rate * remaining_secs).ceil() as usize;

        if projected >= passive.size_estimate() {
            // The whole backlog fits; lift any limits.
            if passive.age_limited() || passive.weight_limited() {
                passive.set_limits_to_max();
                return limits.set_limits(None, None);
            }
            return None;
        }

        passive.simulation_init();
        let mut budget = projected.max(1);
        while budget > 0 && passive.simulation_has_next() {
            passive.simulation_pop_selected();
            budget -= 1;
        }
        passive.set_limits_from_simulation();

        let age = if self.weight_limit_only {
            None
        } else {
            passive.age_limit()
        };
        limits.set_limits(age, passive.weight_limit())
    }
}
