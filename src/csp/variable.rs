use std::collections::HashSet;
use std::fmt;

use rand::Rng;

use crate::{
    csp::value::{OrderedValue, Value},
    error::{CspError, Result},
};

/// A stable integer handle to a variable stored in a [`Problem`] arena.
///
/// All derived maps and solver bookkeeping are keyed by `VarId`, so two
/// variables with identical domains are never confused with one another.
///
/// [`Problem`]: crate::csp::Problem
pub type VarId = usize;

fn linear_lookup<T: Value>(domain: &[T], value: &T) -> Option<usize> {
    domain.iter().position(|candidate| candidate == value)
}

fn binary_lookup<T: OrderedValue>(domain: &[T], value: &T) -> Option<usize> {
    domain.binary_search(value).ok()
}

/// One CSP variable: a finite domain of candidate values and at most one
/// current assignment, stored as an index into the domain.
///
/// Assignment goes through an index so identical-value duplicates are
/// impossible and reading the value back is deterministic. Every operation
/// that mutates the domain demands the variable be unassigned, so the
/// assignment index can never dangle.
///
/// The value-lookup strategy is fixed at construction: [`Variable::new`]
/// keeps first-seen order and scans linearly,
/// [`Variable::with_sorted_domain`] keeps the domain sorted and uses binary
/// search.
#[derive(Debug, Clone)]
pub struct Variable<T> {
    domain: Vec<T>,
    assigned: Option<usize>,
    lookup: fn(&[T], &T) -> Option<usize>,
}

impl<T: Value> Variable<T> {
    /// Creates a variable from a candidate set, keeping first-seen order and
    /// dropping duplicates.
    pub fn new(values: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut domain = Vec::new();
        for value in values {
            if seen.insert(value.clone()) {
                domain.push(value);
            }
        }
        if domain.is_empty() {
            return Err(CspError::EmptyDomain.into());
        }
        Ok(Self {
            domain,
            assigned: None,
            lookup: linear_lookup::<T>,
        })
    }

    /// Whether a value is currently assigned.
    pub fn is_assigned(&self) -> bool {
        self.assigned.is_some()
    }

    /// The currently assigned value.
    pub fn value(&self) -> Result<&T> {
        match self.assigned {
            Some(index) => Ok(&self.domain[index]),
            None => Err(CspError::UnassignedRead.into()),
        }
    }

    /// Like [`value`](Self::value), but `None` when unassigned.
    pub fn value_opt(&self) -> Option<&T> {
        self.assigned.map(|index| &self.domain[index])
    }

    /// Assigns `value`, which must be contained in the domain.
    pub fn assign(&mut self, value: &T) -> Result<()> {
        if self.is_assigned() {
            return Err(CspError::OverAssign.into());
        }
        let Some(index) = (self.lookup)(&self.domain, value) else {
            return Err(CspError::UncontainedValue(format!("{value:?}")).into());
        };
        self.assigned = Some(index);
        Ok(())
    }

    /// Assigns the domain value at `index`.
    pub fn assign_by_index(&mut self, index: usize) -> Result<()> {
        if self.is_assigned() {
            return Err(CspError::OverAssign.into());
        }
        if self.domain.len() <= index {
            return Err(CspError::IndexOutOfRange {
                index,
                len: self.domain.len(),
            }
            .into());
        }
        self.assigned = Some(index);
        Ok(())
    }

    /// Assigns a value selected uniformly at random from the domain and
    /// returns it.
    pub fn assign_random(&mut self, rng: &mut impl Rng) -> Result<&T> {
        if self.is_assigned() {
            return Err(CspError::OverAssign.into());
        }
        if self.domain.is_empty() {
            return Err(CspError::EmptyDomain.into());
        }
        let index = rng.random_range(0..self.domain.len());
        self.assigned = Some(index);
        Ok(&self.domain[index])
    }

    /// Clears the current assignment. Idempotent.
    pub fn unassign(&mut self) {
        self.assigned = None;
    }

    /// A read view of the current domain.
    pub fn domain(&self) -> &[T] {
        &self.domain
    }

    /// Removes the domain value at `index`. The variable must be unassigned.
    pub fn remove_from_domain(&mut self, index: usize) -> Result<()> {
        if self.is_assigned() {
            return Err(CspError::DomainAlteration.into());
        }
        if self.domain.len() <= index {
            return Err(CspError::IndexOutOfRange {
                index,
                len: self.domain.len(),
            }
            .into());
        }
        self.domain.remove(index);
        Ok(())
    }

    /// Shrinks the domain to `candidate` iff it is a strict subset of the
    /// current domain (as a set). Returns `false`, leaving the domain
    /// untouched, when `candidate` is not a subset or is not strictly
    /// smaller. The retained values keep their current relative order, so a
    /// sorted domain stays sorted.
    ///
    /// The variable must be unassigned.
    pub fn set_subset_domain(&mut self, candidate: &[T]) -> Result<bool> {
        if self.is_assigned() {
            return Err(CspError::DomainAlteration.into());
        }

        let current: HashSet<&T> = self.domain.iter().collect();
        let requested: HashSet<&T> = candidate.iter().collect();
        if !requested.iter().all(|value| current.contains(*value)) {
            return Ok(false);
        }
        if self.domain.len() <= requested.len() {
            return Ok(false);
        }

        self.domain.retain(|value| requested.contains(value));
        Ok(true)
    }

    /// Looks a value up with the strategy fixed at construction.
    pub(crate) fn domain_position(&self, value: &T) -> Option<usize> {
        (self.lookup)(&self.domain, value)
    }

    /// Overwrites the domain wholesale, preserving a live assignment by
    /// re-pointing its index at the same value. Used by solvers replaying a
    /// pre-inference snapshot; not part of the public protocol.
    pub(crate) fn restore_domain(&mut self, domain: Vec<T>) {
        if let Some(index) = self.assigned {
            let value = self.domain[index].clone();
            self.assigned = domain.iter().position(|candidate| *candidate == value);
        }
        self.domain = domain;
    }
}

impl<T: OrderedValue> Variable<T> {
    /// Creates a variable whose domain is stored sorted; value lookups use
    /// binary search. The choice is fixed for the variable's lifetime.
    pub fn with_sorted_domain(values: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut domain: Vec<T> = values.into_iter().collect();
        domain.sort();
        domain.dedup();
        if domain.is_empty() {
            return Err(CspError::EmptyDomain.into());
        }
        Ok(Self {
            domain,
            assigned: None,
            lookup: binary_lookup::<T>,
        })
    }
}

impl<T: Value> fmt::Display for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(value: ")?;
        match self.value_opt() {
            Some(value) => write!(f, "{value:?}")?,
            None => write!(f, "unassigned")?,
        }
        write!(f, ", domain:")?;
        for value in &self.domain {
            write!(f, " {value:?}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Variable;
    use crate::error::CspError;

    #[test]
    fn assignment_round_trip() {
        let mut var = Variable::new([1, 2, 3]).unwrap();
        assert!(!var.is_assigned());
        var.assign(&2).unwrap();
        assert!(var.is_assigned());
        assert_eq!(var.value().unwrap(), &2);
        var.unassign();
        var.unassign(); // idempotent
        assert!(!var.is_assigned());
    }

    #[test]
    fn value_of_unassigned_fails() {
        let var = Variable::new([1, 2, 3]).unwrap();
        let err = var.value().unwrap_err();
        assert!(matches!(err.kind(), CspError::UnassignedRead));
    }

    #[test]
    fn over_assignment_fails() {
        let mut var = Variable::new([1, 2, 3]).unwrap();
        var.assign(&1).unwrap();
        let err = var.assign(&2).unwrap_err();
        assert!(matches!(err.kind(), CspError::OverAssign));
    }

    #[test]
    fn uncontained_value_fails() {
        let mut var = Variable::new([1, 2, 3]).unwrap();
        let err = var.assign(&7).unwrap_err();
        assert!(matches!(err.kind(), CspError::UncontainedValue(_)));
    }

    #[test]
    fn assign_by_index_bounds() {
        let mut var = Variable::new(["a", "b"]).unwrap();
        let err = var.assign_by_index(2).unwrap_err();
        assert!(matches!(
            err.kind(),
            CspError::IndexOutOfRange { index: 2, len: 2 }
        ));
        var.assign_by_index(1).unwrap();
        assert_eq!(var.value().unwrap(), &"b");
    }

    #[test]
    fn empty_domain_rejected() {
        let err = Variable::<i32>::new([]).unwrap_err();
        assert!(matches!(err.kind(), CspError::EmptyDomain));
    }

    #[test]
    fn duplicates_are_dropped() {
        let var = Variable::new([3, 1, 3, 2, 1]).unwrap();
        assert_eq!(var.domain(), &[3, 1, 2]);
    }

    #[test]
    fn domain_mutation_requires_unassigned() {
        let mut var = Variable::new([1, 2, 3]).unwrap();
        var.assign(&1).unwrap();
        let err = var.remove_from_domain(0).unwrap_err();
        assert!(matches!(err.kind(), CspError::DomainAlteration));
        let err = var.set_subset_domain(&[1]).unwrap_err();
        assert!(matches!(err.kind(), CspError::DomainAlteration));
    }

    #[test]
    fn remove_from_domain_shrinks() {
        let mut var = Variable::new([1, 2, 3]).unwrap();
        var.remove_from_domain(1).unwrap();
        assert_eq!(var.domain(), &[1, 3]);
    }

    #[test]
    fn set_subset_domain_accepts_strict_subsets_only() {
        let mut var = Variable::new([1, 2, 3]).unwrap();
        // Not a subset.
        assert!(!var.set_subset_domain(&[2, 9]).unwrap());
        assert_eq!(var.domain(), &[1, 2, 3]);
        // Same size is not strictly smaller.
        assert!(!var.set_subset_domain(&[3, 2, 1]).unwrap());
        assert_eq!(var.domain(), &[1, 2, 3]);
        // Strict subset shrinks the domain.
        assert!(var.set_subset_domain(&[3, 1]).unwrap());
        assert_eq!(var.domain(), &[1, 3]);
    }

    #[test]
    fn sorted_domain_uses_binary_search() {
        let var = Variable::with_sorted_domain([9, 4, 7, 4, 1]).unwrap();
        assert_eq!(var.domain(), &[1, 4, 7, 9]);
        assert_eq!(var.domain_position(&7), Some(2));
        assert_eq!(var.domain_position(&5), None);
    }

    #[test]
    fn assign_random_draws_from_domain() {
        use rand::{rngs::StdRng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut var = Variable::new([10, 20, 30]).unwrap();
        let value = *var.assign_random(&mut rng).unwrap();
        assert!(var.domain().contains(&value));
        assert_eq!(var.value().unwrap(), &value);
    }

    #[test]
    fn display_renders_value_and_domain() {
        let mut var = Variable::new([1, 2]).unwrap();
        assert_eq!(var.to_string(), "(value: unassigned, domain: 1 2)");
        var.assign(&2).unwrap();
        assert_eq!(var.to_string(), "(value: 2, domain: 1 2)");
    }
}
