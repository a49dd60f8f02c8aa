//! Global age/weight limits and their change event.
//!
//! The limit controller publishes `changed` whenever the limits move; a
//! `Tightened` change triggers the discard pass over the Active container.

use crate::event::Event;

/// Direction of a limits update.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LimitsChange {
    Loosened,
    Tightened,
}

/// Current age/weight limits. `None` means unlimited.
pub struct Limits {
    age_limit: Option<u32>,
    weight_limit: Option<u32>,
    pub changed: Event<LimitsChange>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits::new(None, None)
    }
}

impl Limits {
    pub fn new(age_limit: Option<u32>, weight_limit: Option<u32>) -> Self {
        Limits {
            age_limit,
            weight_limit,
            changed: Event::new(),
        }
    }

    pub fn age_limit(&self) -> Option<u32> {
        self.age_limit
    }

    pub fn weight_limit(&self) -> Option<u32> {
        self.weight_limit
    }

    pub fn age_limited(&self) -> bool {
        self.age_limit.is_some()
    }

    pub fn weight_limited(&self) -> bool {
        self.weight_limit.is_some()
    }

    /// Install new limits. Fires `changed` and returns the change kind when
    /// anything moved; a tightening on either side counts as `Tightened`.
    pub fn set_limits(
        &mut self,
        age_limit: Option<u32>,
        weight_limit: Option<u32>,
    ) -> Option<LimitsChange> {
        let tightened = tightens(self.age_limit, age_limit) || tightens(self.weight_limit, weight_limit);
        let loosened = loosens(self.age_limit, age_limit) || loosens(self.weight_limit, weight_limit);

        self.age_limit = age_limit;
        self.weight_limit = weight_limit;

        let change = if tightened {
            Some(LimitsChange::Tightened)
        } else if loosened {
            Some(LimitsChange::Loosened)
        } else {
            None
        };
        if let Some(change) = change {
            self.changed.fire(&change);
        }
        change
    }
}

fn tightens(old: Option<u32>, new: Option<u32>) -> bool {
    match (old, new) {
        (None, Some(_)) => true,
        (Some(old), Some(new)) => new < old,
        _ => false,
    }
}

fn loosens(old: Option<u32>, new: Option<u32>) -> bool {
    match (old, new) {
        (Some(_), None) => true,
        (Some(old), Some(new)) => new > old,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_set_limits_fires_changed() {
        let mut limits = Limits::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _token = limits.changed.subscribe(move |c| s.borrow_mut().push(*c));

        assert_eq!(
            limits.set_limits(Some(10), Some(50)),
            Some(LimitsChange::Tightened)
        );
        assert_eq!(
            limits.set_limits(Some(10), Some(60)),
            Some(LimitsChange::Loosened)
        );
        assert_eq!(limits.set_limits(Some(10), Some(60)), None);
        // A tightening on one side wins over a loosening on the other.
        assert_eq!(
            limits.set_limits(Some(5), None),
            Some(LimitsChange::Tightened)
        );

        assert_eq!(
            *seen.borrow(),
            vec![
                LimitsChange::Tightened,
                LimitsChange::Loosened,
                LimitsChange::Tightened
            ]
        );
    }

    #[test]
    fn test_limited_flags() {
        let mut limits = Limits::default();
        assert!(!limits.age_limited() && !limits.weight_limited());

        limits.set_limits(Some(3), None);
        assert!(limits.age_limited());
        assert!(!limits.weight_limited());
        assert_eq!(limits.age_limit(), Some(3));
    }
}
