//! Prover options, consumed at construction.
//!
//! Invalid values or combinations are rejected before any clause flows.

use crate::containers::SplitQueueConfig;
use crate::error::{Error, Result};
use crate::logic::LiteralComparisonMode;
use crate::selection::SelectionStrategy;
use std::time::Duration;

/// Flavor of the given-clause loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaturationFlavor {
    /// Children are fully forward-simplified on their way into Passive.
    Otter,
    /// Only cheap checks on the way into Passive; full simplification at
    /// selection time.
    Discount,
    /// Otter plus the limited-resource limit controller.
    #[default]
    Lrs,
}

/// How the simplification ordering ranks symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingKind {
    /// Knuth-Bendix with the interning order as precedence.
    #[default]
    Kbo,
    /// Knuth-Bendix with precedence by inverse symbol frequency in the
    /// input.
    FrequencyKbo,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub saturation_algorithm: SaturationFlavor,
    /// `(age, weight)` selection ratio of the passive queues.
    pub age_weight_ratio: (u32, u32),
    /// Comma-separated split queue ratios; enables the predicate-split
    /// passive container together with `split_queue_cutoffs`.
    pub split_queue_ratios: Option<String>,
    /// Comma-separated split queue niceness cutoffs.
    pub split_queue_cutoffs: Option<String>,
    pub split_queue_fade_in: bool,
    pub selection: SelectionStrategy,
    pub literal_comparison_mode: LiteralComparisonMode,
    pub ordering: OrderingKind,
    pub demodulation_redundancy_check: bool,
    pub forward_subsumption: bool,
    pub forward_demodulation: bool,
    pub backward_subsumption: bool,
    pub backward_demodulation: bool,
    pub condensation: bool,
    /// Initial age limit; `None` is unlimited.
    pub age_limit: Option<u32>,
    /// Initial weight limit; `None` is unlimited.
    pub weight_limit: Option<u32>,
    /// Percentage of the time limit to elapse before the first limit check.
    pub lrs_first_time_check: u32,
    /// Only tighten the weight limit, never the age limit.
    pub lrs_weight_limit_only: bool,
    pub time_limit: Option<Duration>,
    /// Bound on the number of stored clauses; exceeding it terminates with
    /// a memory-limit report.
    pub max_clauses: Option<usize>,
    /// Pop Unprocessed oldest-first instead of the stack discipline.
    pub fifo_unprocessed: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            saturation_algorithm: SaturationFlavor::default(),
            age_weight_ratio: (1, 1),
            split_queue_ratios: None,
            split_queue_cutoffs: None,
            split_queue_fade_in: false,
            selection: SelectionStrategy::default(),
            literal_comparison_mode: LiteralComparisonMode::default(),
            ordering: OrderingKind::default(),
            demodulation_redundancy_check: true,
            forward_subsumption: true,
            forward_demodulation: true,
            backward_subsumption: true,
            backward_demodulation: true,
            condensation: false,
            age_limit: None,
            weight_limit: None,
            lrs_first_time_check: 5,
            lrs_weight_limit_only: false,
            time_limit: None,
            max_clauses: None,
            fifo_unprocessed: false,
        }
    }
}

impl Options {
    /// Check option values and combinations. Called by the prover before
    /// any clause flows.
    pub fn validate(&self) -> Result<()> {
        let (age, weight) = self.age_weight_ratio;
        if age == 0 || weight == 0 {
            return Err(Error::Config(
                "both components of the age-weight ratio must be positive".into(),
            ));
        }
        if self.lrs_first_time_check > 100 {
            return Err(Error::Config(
                "the first limit check must be a percentage in [0, 100]".into(),
            ));
        }
        if self.split_queue_ratios.is_some() != self.split_queue_cutoffs.is_some() {
            return Err(Error::Config(
                "split queue ratios and cutoffs must be given together".into(),
            ));
        }
        self.split_queue_config()?;
        Ok(())
    }

    /// The parsed split queue configuration, if the split container is
    /// enabled.
    pub fn split_queue_config(&self) -> Result<Option<SplitQueueConfig>> {
        match (&self.split_queue_ratios, &self.split_queue_cutoffs) {
            (Some(ratios), Some(cutoffs)) => Ok(Some(SplitQueueConfig::parse(
                ratios,
                cutoffs,
                self.split_queue_fade_in,
            )?)),
            _ => Ok(None),
        }
    }
}
