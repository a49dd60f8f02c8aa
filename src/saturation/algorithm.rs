//! The given-clause saturation loop.
//!
//! One iteration takes a clause from Passive, forward-simplifies it,
//! activates it (literal selection, then registration with the indices
//! through the Active container's events), runs the generating inferences,
//! backward-simplifies the Active set against the newcomer, and drains
//! Unprocessed into Passive. The stop flag is inspected at the barriers
//! after selection, activation, and generation; once it is observed the
//! loop unwinds without emitting further events.

use crate::containers::{
    ActiveClauseContainer, AgeWeightPassive, ClauseEvents, PassiveClauseContainer,
    PredicateSplitPassive, UnprocessedClauseContainer,
};
use crate::error::Result;
use crate::event::Event;
use crate::index::{IndexManager, IndexTag};
use crate::logic::{Clause, ClauseArena, ClauseId, Env, FunctionId, Store, TermData};
use crate::options::{Options, OrderingKind, SaturationFlavor};
use crate::problem::UnitList;
use crate::rules::{normalize, GeneratingRule, Simplification, SimplifyingRule};
use crate::saturation::limits::{Limits, LimitsChange};
use crate::saturation::lrs::LrsController;
use crate::statistics::{ProofStep, Statistics, TerminationReason};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of forward-simplifying one clause.
enum SimplifyStatus {
    Keep,
    Discard,
    Terminate(TerminationReason),
}

/// Saturation engine for one problem.
pub struct SaturationAlgorithm {
    options: Options,
    env: Env,
    arena: ClauseArena,
    unprocessed: UnprocessedClauseContainer,
    passive: Box<dyn PassiveClauseContainer>,
    active: ActiveClauseContainer,
    limits: Limits,
    indexes: IndexManager,
    lrs: Option<LrsController>,
    statistics: Statistics,
    forward_rules: Vec<SimplifyingRule>,
    stop: Arc<AtomicBool>,
    start_time: Option<Instant>,
    /// Empty clause discovered while loading the input.
    input_refutation: Option<ClauseId>,
    /// Set once any non-redundant clause was discarded: saturation can then
    /// only report `RefutationNotFound`.
    incomplete: bool,
}

impl SaturationAlgorithm {
    pub fn new(options: Options, env: Env) -> Result<Self> {
        options.validate()?;

        let (age_ratio, weight_ratio) = options.age_weight_ratio;
        let passive: Box<dyn PassiveClauseContainer> = match options.split_queue_config()? {
            Some(config) => Box::new(PredicateSplitPassive::new(config, options.age_weight_ratio)),
            None => Box::new(AgeWeightPassive::with_limits(
                age_ratio,
                weight_ratio,
                true,
                options.age_limit,
                options.weight_limit,
            )),
        };

        let active = ActiveClauseContainer::new();
        let mut indexes = IndexManager::new();
        indexes.attach(&active.events);

        // Generating inferences always run; their indices live as long as
        // the loop.
        indexes.request(IndexTag::GeneratingLiterals, &env, &[]);
        indexes.request(IndexTag::SuperpositionSubterms, &env, &[]);
        indexes.request(IndexTag::SuperpositionLhs, &env, &[]);
        if options.forward_demodulation {
            indexes.request(IndexTag::DemodulationLhs, &env, &[]);
        }
        if options.backward_demodulation {
            indexes.request(IndexTag::DemodulationSubterms, &env, &[]);
        }

        let mut forward_rules = vec![
            SimplifyingRule::Normalization,
            SimplifyingRule::TautologyDeletion,
        ];
        if options.forward_demodulation {
            forward_rules.push(SimplifyingRule::ForwardDemodulation);
        }
        if options.forward_subsumption {
            forward_rules.push(SimplifyingRule::ForwardSubsumption);
        }
        if options.condensation {
            forward_rules.push(SimplifyingRule::Condensation);
        }

        let limits = Limits::new(options.age_limit, options.weight_limit);
        let lrs = (options.saturation_algorithm == SaturationFlavor::Lrs)
            .then(|| LrsController::new(&options));

        Ok(SaturationAlgorithm {
            unprocessed: UnprocessedClauseContainer::new(options.fifo_unprocessed),
            passive,
            active,
            limits,
            indexes,
            lrs,
            statistics: Statistics::default(),
            forward_rules,
            stop: Arc::new(AtomicBool::new(false)),
            start_time: None,
            input_refutation: None,
            incomplete: false,
            options,
            env,
            arena: ClauseArena::new(),
        })
    }

    /// Load the clausified input into Unprocessed.
    pub fn add_clauses(&mut self, units: UnitList) {
        for unit in units {
            let clause = Clause::input(unit.literals, unit.origin, &self.env.literals);
            let id = self.arena.insert(clause);
            self.statistics.initial_clauses += 1;
            if self.arena.get(id).is_empty() && self.input_refutation.is_none() {
                self.input_refutation = Some(id);
            }
            self.unprocessed.add(&mut self.arena, id);
        }
    }

    /// Request cooperative termination; takes effect at the next barrier.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// The stop flag, for signal handlers in the enclosing runtime.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run the loop to completion and report why it stopped.
    pub fn run(&mut self) -> TerminationReason {
        self.start_time = Some(Instant::now());
        if self.options.ordering == OrderingKind::FrequencyKbo {
            self.apply_frequency_precedence();
        }

        let reason = match self.input_refutation {
            Some(id) => {
                self.statistics.refutation = Some(id);
                TerminationReason::Refutation
            }
            None => self.main_loop(),
        };

        self.statistics.termination_reason = reason;
        self.statistics.final_active = self.active.len() as u64;
        self.statistics.final_passive = self.passive.size_estimate() as u64;
        info!(
            "saturation finished: {:?} after {} iterations, {} generated",
            reason, self.statistics.iterations, self.statistics.generated_clauses
        );
        reason
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Env {
        &mut self.env
    }

    pub fn clause(&self, id: ClauseId) -> &Arc<Clause> {
        self.arena.get(id)
    }

    pub fn store(&self, id: ClauseId) -> Store {
        self.arena.store(id)
    }

    // === Public event surface (observability) ===

    pub fn unprocessed_events(&self) -> &ClauseEvents {
        &self.unprocessed.events
    }

    pub fn passive_events(&self) -> &ClauseEvents {
        self.passive.events()
    }

    pub fn active_events(&self) -> &ClauseEvents {
        &self.active.events
    }

    pub fn limits_changed(&self) -> &Event<LimitsChange> {
        &self.limits.changed
    }

    /// The inference graph of the refutation, parents before children.
    /// Only available when the run ended with `Refutation`.
    pub fn refutation_proof(&self) -> Option<Vec<ProofStep>> {
        let root = self.statistics.refutation?;
        let mut reachable = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            reachable.push(id);
            stack.extend(self.arena.get(id).inference.parents.iter().copied());
        }
        // Parents are always created before their children, so id order is
        // a topological order.
        reachable.sort();
        Some(
            reachable
                .into_iter()
                .map(|id| {
                    let clause = self.arena.get(id);
                    ProofStep {
                        clause: id,
                        rule: clause.inference.rule,
                        parents: clause.inference.parents.clone(),
                    }
                })
                .collect(),
        )
    }

    // === The loop ===

    fn main_loop(&mut self) -> TerminationReason {
        if let Some(reason) = self.drain_unprocessed() {
            return reason;
        }

        loop {
            if let Some(reason) = self.check_barrier() {
                return reason;
            }

            if self.passive.is_empty() {
                if self.unprocessed.is_empty() {
                    return if self.incomplete {
                        TerminationReason::RefutationNotFound
                    } else {
                        TerminationReason::Satisfiable
                    };
                }
                if let Some(reason) = self.drain_unprocessed() {
                    return reason;
                }
                continue;
            }

            let given = self.passive.pop_selected(&mut self.arena);
            self.statistics.iterations += 1;
            if let Some(reason) = self.check_barrier() {
                return reason;
            }

            match self.forward_simplify(given.id) {
                SimplifyStatus::Keep => {}
                SimplifyStatus::Discard => {
                    self.discard(given.id);
                    continue;
                }
                SimplifyStatus::Terminate(reason) => return reason,
            }

            self.activate(given.id);
            if let Some(reason) = self.check_barrier() {
                return reason;
            }

            let worth_generating = self
                .passive
                .children_potentially_fulfil_limits(self.arena.get(given.id), &self.env.literals);
            if worth_generating {
                if let Some(reason) = self.generate(given.id) {
                    return reason;
                }
            }
            if let Some(reason) = self.check_barrier() {
                return reason;
            }

            if let Some(reason) = self.backward_simplify(given.id) {
                return reason;
            }

            if let Some(reason) = self.drain_unprocessed() {
                return reason;
            }

            if let Some(reason) = self.limit_check() {
                return reason;
            }
        }
    }

    /// Stop-flag and deadline inspection; shared by every barrier.
    fn check_barrier(&self) -> Option<TerminationReason> {
        if self.stop.load(Ordering::Relaxed) {
            return Some(TerminationReason::TimeLimit);
        }
        if let (Some(start), Some(limit)) = (self.start_time, self.options.time_limit) {
            if start.elapsed() >= limit {
                return Some(TerminationReason::TimeLimit);
            }
        }
        None
    }

    /// Take a clause out of the search space outside any container.
    fn discard(&mut self, id: ClauseId) {
        if self.arena.store(id) != Store::None {
            self.arena.set_store(id, Store::None);
        }
    }

    /// Literal selection, then the Passive-to-Active transition.
    fn activate(&mut self, id: ClauseId) {
        let (literals, selected) = self.options.selection.select(
            &self.env,
            self.arena.get(id),
            self.options.literal_comparison_mode,
        );
        self.arena.set_selection(id, literals, selected);

        self.active.add(&mut self.arena, id);
        self.indexes.process_pending(&self.env);
        self.statistics.activations += 1;

        let clause = self.arena.get(id);
        debug!(
            "activated {} (age {}, weight {}, selected {})",
            id, clause.age, clause.weight, clause.selected
        );
    }

    /// Run the generating inferences with the given clause.
    fn generate(&mut self, given: ClauseId) -> Option<TerminationReason> {
        for rule in GeneratingRule::ALL {
            let children = rule.apply(&mut self.env, &self.arena, &self.indexes, given);
            for child in children {
                if let Some(reason) = self.integrate_child(child) {
                    return Some(reason);
                }
            }
        }
        None
    }

    /// Cheap checks, then admission of a generated clause to Unprocessed.
    fn integrate_child(&mut self, child: Clause) -> Option<TerminationReason> {
        if normalize::literals_tautology(&self.env, &child.literals) {
            self.statistics.tautologies_deleted += 1;
            return None;
        }

        let id = self.arena.insert(child);
        self.statistics.generated_clauses += 1;

        if self.arena.get(id).is_empty() {
            self.statistics.refutation = Some(id);
            return Some(TerminationReason::Refutation);
        }
        if let Some(max) = self.options.max_clauses {
            if self.arena.len() >= max {
                return Some(TerminationReason::MemoryLimit);
            }
        }

        self.unprocessed.add(&mut self.arena, id);
        None
    }

    /// Apply the forward simplification pipeline to one clause. At most one
    /// rule fires; a replacement goes back through Unprocessed and the
    /// original is discarded.
    fn forward_simplify(&mut self, id: ClauseId) -> SimplifyStatus {
        let rules = self.forward_rules.clone();
        for rule in rules {
            let outcome = rule.apply_forward(
                &mut self.env,
                &self.arena,
                &self.indexes,
                &self.active,
                id,
                self.options.demodulation_redundancy_check,
            );
            match outcome {
                None => continue,
                Some(Simplification::Deleted { .. }) => {
                    if rule == SimplifyingRule::TautologyDeletion {
                        self.statistics.tautologies_deleted += 1;
                    } else {
                        self.statistics.forward_subsumed += 1;
                    }
                    return SimplifyStatus::Discard;
                }
                Some(Simplification::Replaced { clause }) => {
                    self.statistics.forward_simplified += 1;
                    if let Some(reason) = self.integrate_child(clause) {
                        return SimplifyStatus::Terminate(reason);
                    }
                    return SimplifyStatus::Discard;
                }
            }
        }
        SimplifyStatus::Keep
    }

    /// Remove Active clauses the newly activated clause makes redundant.
    fn backward_simplify(&mut self, given: ClauseId) -> Option<TerminationReason> {
        if self.options.backward_demodulation {
            let rewrites = crate::rules::demodulation::backward_demodulation(
                &mut self.env,
                &self.arena,
                &self.indexes,
                given,
            );
            for (victim, replacement) in rewrites {
                if !self.active.contains(victim) {
                    continue;
                }
                self.active.remove(&mut self.arena, victim);
                self.statistics.backward_simplified += 1;
                if let Some(reason) = self.integrate_child(replacement) {
                    return Some(reason);
                }
            }
        }

        if self.options.backward_subsumption {
            let victims = crate::rules::subsumption::backward_subsumption(
                &self.env,
                &self.arena,
                &self.active,
                given,
            );
            for victim in victims {
                if !self.active.contains(victim) {
                    continue;
                }
                self.active.remove(&mut self.arena, victim);
                self.statistics.backward_subsumed += 1;
            }
        }

        self.indexes.process_pending(&self.env);
        None
    }

    /// Move Unprocessed clauses into Passive, applying the flavor's forward
    /// checks and the admission predicates.
    fn drain_unprocessed(&mut self) -> Option<TerminationReason> {
        while let Some(cr) = self.unprocessed.pop(&mut self.arena) {
            let status = match self.options.saturation_algorithm {
                SaturationFlavor::Discount => self.cheap_check(cr.id),
                SaturationFlavor::Otter | SaturationFlavor::Lrs => self.forward_simplify(cr.id),
            };
            match status {
                SimplifyStatus::Keep => {}
                SimplifyStatus::Discard => continue,
                SimplifyStatus::Terminate(reason) => return Some(reason),
            }

            let limited = self.passive.age_limited() || self.passive.weight_limited();
            if limited {
                let clause = self.arena.get(cr.id);
                if !self.passive.fulfils_age_limit(clause)
                    && !self.passive.fulfils_weight_limit(clause)
                {
                    self.statistics.discarded_non_redundant += 1;
                    self.incomplete = true;
                    continue;
                }
            }

            self.passive.add(&mut self.arena, cr.id);
            self.statistics.passive_added += 1;
        }
        None
    }

    /// Tautology check only; the Discount flavor defers everything else to
    /// selection time.
    fn cheap_check(&mut self, id: ClauseId) -> SimplifyStatus {
        match normalize::tautology_deletion(&mut self.env, &self.arena, id) {
            Some(Simplification::Deleted { .. }) => {
                self.statistics.tautologies_deleted += 1;
                SimplifyStatus::Discard
            }
            _ => SimplifyStatus::Keep,
        }
    }

    /// Periodic limit update plus the resulting discard passes.
    fn limit_check(&mut self) -> Option<TerminationReason> {
        let controller = self.lrs.as_mut()?;
        let elapsed = self.start_time?.elapsed();
        let change = controller.maybe_update_limits(
            self.passive.as_mut(),
            &mut self.limits,
            elapsed,
            self.options.time_limit,
            self.statistics.iterations,
            self.statistics.activations,
        );

        if change == Some(LimitsChange::Tightened) {
            self.statistics.limit_tightenings += 1;
            info!(
                "limits tightened: age {:?}, weight {:?}",
                self.limits.age_limit(),
                self.limits.weight_limit()
            );

            let evicted = self.passive.on_limits_updated(&mut self.arena);
            let discarded = self.active.on_limits_updated(
                LimitsChange::Tightened,
                &mut self.arena,
                self.indexes.generating_literals(),
                &self.limits,
                &self.env.literals,
            );
            if !evicted.is_empty() || !discarded.is_empty() {
                self.incomplete = true;
            }
            self.statistics.discarded_non_redundant += (evicted.len() + discarded.len()) as u64;
            self.indexes.process_pending(&self.env);
        }
        None
    }

    /// Precedence by inverse symbol frequency over the loaded clauses.
    fn apply_frequency_precedence(&mut self) {
        let mut counts: HashMap<FunctionId, u64> = HashMap::new();
        for (_, clause) in self.arena.iter() {
            for &literal in &clause.literals {
                for &arg in self.env.literals.args(literal) {
                    count_symbols(&self.env, arg, &mut counts);
                }
            }
        }
        let mut symbols: Vec<(FunctionId, u64)> = counts.into_iter().collect();
        // Most frequent first; rarer symbols get higher precedence.
        symbols.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let precedence = symbols
            .into_iter()
            .enumerate()
            .map(|(rank, (id, _))| (id, rank as u32 + 1))
            .collect();
        self.env.ordering.set_precedence(precedence);
    }
}

fn count_symbols(env: &Env, term: crate::logic::TermId, counts: &mut HashMap<FunctionId, u64>) {
    match env.terms.data(term) {
        TermData::Var(_) => {}
        TermData::App(f, args) => {
            *counts.entry(*f).or_insert(0) += 1;
            for &arg in args {
                count_symbols(env, arg, counts);
            }
        }
    }
}
