//! Predicate-split passive container.
//!
//! A stack of age-weight queues, each tagged with a niceness cutoff and a
//! ratio. A clause is stored in every queue from its best queue (the first
//! whose cutoff admits the clause's niceness) to the last; the last cutoff
//! is 1.0, so the last queue holds every clause while no limits discard.
//! Selection is weighted round-robin over the queues with inverse-LCM
//! weights; if the chosen queue is empty the scan moves right (where the
//! storage invariant guarantees a superset) and only falls back to the left
//! when limit-driven discards have emptied the right queues.

use super::{AgeWeightPassive, ClauseEvents, PassiveClauseContainer};
use crate::logic::{Clause, ClauseArena, ClauseId, ClauseRef, LiteralBank, Store};
use crate::error::{Error, Result};

fn gcd(a: u64, b: u64) -> u64 {
    if a == 0 {
        b
    } else {
        gcd(b % a, a)
    }
}

fn lcm(a: u64, b: u64) -> u64 {
    (a * b) / gcd(a, b)
}

/// Parsed configuration of the split queues.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitQueueConfig {
    pub ratios: Vec<u32>,
    pub cutoffs: Vec<f64>,
    pub fade_in: bool,
}

impl SplitQueueConfig {
    /// Parse the two comma-separated option strings. The cutoffs must be
    /// strictly increasing within [0, 1] and end at 1.0; the ratios must be
    /// positive and as numerous as the cutoffs; fewer than two queues is an
    /// error.
    pub fn parse(ratios: &str, cutoffs: &str, fade_in: bool) -> Result<Self> {
        let ratios: Vec<u32> = ratios
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map_err(|_| Error::Config(format!("invalid split queue ratio '{}'", part)))
                    .and_then(|v| {
                        if v <= 0 {
                            Err(Error::Config(
                                "each split queue ratio must be a positive integer".into(),
                            ))
                        } else {
                            Ok(v as u32)
                        }
                    })
            })
            .collect::<Result<_>>()?;

        let cutoffs: Vec<f64> = cutoffs
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| Error::Config(format!("invalid split queue cutoff '{}'", part)))
            })
            .collect::<Result<_>>()?;

        if ratios.len() < 2 {
            return Err(Error::Config(
                "split queue ratios need at least two values (e.g. '10,1')".into(),
            ));
        }
        if ratios.len() != cutoffs.len() {
            return Err(Error::Config(
                "the number of split queue ratios must match the number of cutoffs".into(),
            ));
        }
        for (i, &cutoff) in cutoffs.iter().enumerate() {
            if !(0.0..=1.0).contains(&cutoff) {
                return Err(Error::Config(
                    "each split queue cutoff must lie in [0.0, 1.0]".into(),
                ));
            }
            if i > 0 && cutoff <= cutoffs[i - 1] {
                return Err(Error::Config(
                    "split queue cutoffs must be strictly increasing".into(),
                ));
            }
        }
        if *cutoffs.last().expect("at least two cutoffs") != 1.0 {
            return Err(Error::Config("the last split queue cutoff must be 1.0".into()));
        }

        Ok(SplitQueueConfig {
            ratios,
            cutoffs,
            fade_in,
        })
    }
}

/// Multi-queue passive container splitting clauses by niceness.
pub struct PredicateSplitPassive {
    queues: Vec<AgeWeightPassive>,
    cutoffs: Vec<f64>,
    /// Inverse-LCM weights: lcm(ratios) / ratio per queue.
    weights: Vec<i64>,
    balances: Vec<i64>,
    simulation_balances: Vec<i64>,
    fade_in: bool,
    pub events: ClauseEvents,
}

impl PredicateSplitPassive {
    pub fn new(config: SplitQueueConfig, age_weight_ratio: (u32, u32)) -> Self {
        let lcm_all = config
            .ratios
            .iter()
            .fold(1u64, |acc, &r| lcm(acc, u64::from(r)));
        let weights: Vec<i64> = config
            .ratios
            .iter()
            .map(|&r| (lcm_all / u64::from(r)) as i64)
            .collect();
        let queues = config
            .cutoffs
            .iter()
            .map(|_| {
                AgeWeightPassive::with_limits(
                    age_weight_ratio.0,
                    age_weight_ratio.1,
                    false,
                    None,
                    None,
                )
            })
            .collect();
        let balances = vec![0; weights.len()];
        PredicateSplitPassive {
            queues,
            cutoffs: config.cutoffs,
            simulation_balances: balances.clone(),
            balances,
            weights,
            fade_in: config.fade_in,
            events: ClauseEvents::new(),
        }
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Niceness of a clause, coarsened for young derivations when the
    /// fade-in schedule is on.
    pub fn niceness(&self, clause: &Clause) -> f64 {
        let th = clause.inference.th_ancestors;
        let all = clause.inference.all_ancestors;
        if self.fade_in {
            if th <= 2 {
                return 0.0;
            }
            if th == 3 && all <= 6 {
                return 0.5;
            }
            if th == 4 && all <= 5 {
                return 0.8;
            }
        }
        clause.niceness()
    }

    /// Index of the first queue whose cutoff admits the clause's niceness.
    /// The last cutoff is 1.0 and niceness is clamped, so one always exists.
    pub fn best_queue(&self, clause: &Clause) -> usize {
        let niceness = self.niceness(clause).clamp(0.0, 1.0);
        self.cutoffs
            .iter()
            .position(|&cutoff| niceness <= cutoff)
            .unwrap_or(self.cutoffs.len() - 1)
    }

    /// True iff the clause is stored in the given queue.
    pub fn queue_contains(&self, queue: usize, id: ClauseId) -> bool {
        self.queues[queue].contains(id)
    }

    /// Pick a queue by weighted round-robin and charge its balance.
    fn pick_queue(balances: &mut [i64], weights: &[i64]) -> usize {
        let queue = balances
            .iter()
            .enumerate()
            .min_by_key(|&(_, b)| *b)
            .map(|(i, _)| i)
            .expect("at least two queues");
        balances[queue] += weights[queue];
        queue
    }
}

impl PassiveClauseContainer for PredicateSplitPassive {
    fn add(&mut self, arena: &mut ClauseArena, id: ClauseId) {
        let best = self.best_queue(arena.get(id));
        for queue in &mut self.queues[best..] {
            queue.add(arena, id);
        }

        // Every queue at and right of the best queue holds the clause before
        // any observer sees `added`.
        arena.set_store(id, Store::Passive);
        self.events.added.fire(&arena.clause_ref(id));
    }

    fn remove(&mut self, arena: &mut ClauseArena, id: ClauseId) {
        debug_assert_eq!(arena.store(id), Store::Passive);
        let best = self.best_queue(arena.get(id));
        let mut found = false;
        for queue in &mut self.queues[best..] {
            found |= queue.remove_if_present(id);
        }
        assert!(found, "removed clause must be in the container");

        arena.set_store(id, Store::None);
        self.events.removed.fire(&arena.clause_ref(id));
    }

    fn pop_selected(&mut self, arena: &mut ClauseArena) -> ClauseRef {
        assert!(!self.is_empty(), "pop_selected on empty container");

        let queue = Self::pick_queue(&mut self.balances, &self.weights);

        // If the chosen queue is empty, scan right: absent limit-driven
        // discards every clause of queue i is also in queue j > i.
        let mut current = queue;
        while current < self.queues.len() && self.queues[current].is_empty() {
            current += 1;
        }
        // With limits, right queues can run dry first; fall back leftward.
        if current == self.queues.len() {
            debug_assert!(queue > 0, "rightward scan started at the first queue");
            current = queue - 1;
            while self.queues[current].is_empty() {
                debug_assert!(current > 0, "some queue must be non-empty");
                current -= 1;
            }
        }

        let popped = self.queues[current].pop_selected(arena);
        let id = popped.id;
        for queue in &mut self.queues {
            queue.remove_if_present(id);
        }

        debug_assert_eq!(arena.store(id), Store::Passive);
        arena.set_store(id, Store::Selected);
        let cr = arena.clause_ref(id);
        self.events.selected.fire(&cr);
        cr
    }

    fn is_empty(&self) -> bool {
        self.queues.iter().all(|queue| queue.is_empty())
    }

    fn size_estimate(&self) -> usize {
        // With limits the last queue can be stricter than its siblings, so
        // its size is only an estimate.
        self.queues
            .last()
            .map(|queue| queue.size_estimate())
            .unwrap_or(0)
    }

    fn simulation_init(&mut self) {
        self.simulation_balances.clear();
        self.simulation_balances.extend_from_slice(&self.balances);
        for queue in &mut self.queues {
            queue.simulation_init();
        }
    }

    fn simulation_has_next(&mut self) -> bool {
        let mut has_next = false;
        for queue in &mut self.queues {
            has_next |= queue.simulation_has_next();
        }
        has_next
    }

    fn simulation_pop_selected(&mut self) {
        let queue = Self::pick_queue(&mut self.simulation_balances, &self.weights);

        let mut current = queue;
        while current < self.queues.len() && !self.queues[current].simulation_has_next() {
            current += 1;
        }
        if current == self.queues.len() {
            debug_assert!(queue > 0, "rightward scan started at the first queue");
            current = queue - 1;
            while !self.queues[current].simulation_has_next() {
                debug_assert!(current > 0, "some queue must have a next clause");
                current -= 1;
            }
        }

        self.queues[current].simulation_pop_selected();
    }

    fn set_limits_to_max(&mut self) -> bool {
        let mut tightened = false;
        for queue in &mut self.queues {
            tightened |= queue.set_limits_to_max();
        }
        tightened
    }

    fn set_limits_from_simulation(&mut self) -> bool {
        let mut tightened = false;
        for queue in &mut self.queues {
            tightened |= queue.set_limits_from_simulation();
        }
        tightened
    }

    fn on_limits_updated(&mut self, arena: &mut ClauseArena) -> Vec<ClauseId> {
        let mut touched = Vec::new();
        for queue in &mut self.queues {
            for id in queue.on_limits_updated(arena) {
                touched.push(id);
            }
        }

        // A clause only leaves the container once every queue dropped it.
        let mut gone = Vec::new();
        for id in touched {
            if gone.contains(&id) {
                continue;
            }
            if self.queues.iter().all(|queue| !queue.contains(id)) {
                gone.push(id);
            }
        }
        for &id in &gone {
            debug_assert_eq!(arena.store(id), Store::Passive);
            arena.set_store(id, Store::None);
            self.events.removed.fire(&arena.clause_ref(id));
        }
        gone
    }

    fn age_limited(&self) -> bool {
        self.queues.iter().any(|queue| queue.age_limited())
    }

    fn weight_limited(&self) -> bool {
        self.queues.iter().any(|queue| queue.weight_limited())
    }

    fn age_limit(&self) -> Option<u32> {
        // Loosest limit across queues; any unlimited queue means unlimited.
        let mut max = None;
        for queue in &self.queues {
            match queue.age_limit() {
                None => return None,
                Some(limit) => max = Some(max.map_or(limit, |m: u32| m.max(limit))),
            }
        }
        max
    }

    fn weight_limit(&self) -> Option<u32> {
        let mut max = None;
        for queue in &self.queues {
            match queue.weight_limit() {
                None => return None,
                Some(limit) => max = Some(max.map_or(limit, |m: u32| m.max(limit))),
            }
        }
        max
    }

    fn fulfils_age_limit(&self, clause: &Clause) -> bool {
        let best = self.best_queue(clause);
        self.queues[best..]
            .iter()
            .any(|queue| queue.fulfils_age_limit(clause))
    }

    fn fulfils_weight_limit(&self, clause: &Clause) -> bool {
        let best = self.best_queue(clause);
        self.queues[best..]
            .iter()
            .any(|queue| queue.fulfils_weight_limit(clause))
    }

    fn children_potentially_fulfil_limits(&self, clause: &Clause, literals: &LiteralBank) -> bool {
        // No lower bound on a child's niceness is known, so any queue could
        // receive the children.
        self.queues
            .iter()
            .any(|queue| queue.children_potentially_fulfil_limits(clause, literals))
    }

    fn events(&self) -> &ClauseEvents {
        &self.events
    }
}
