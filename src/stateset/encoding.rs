//! One-hot fact indexing
//!
//! Every fact gets a global index: variables ascending, values ascending
//! inside a variable. The same order is used by the set algebra's variable
//! order, the witness hex stream and the task snapshot's atom list.

use crate::task::{Fact, PlanningTask};

use super::tuple::Tuple;

/// Returns true for value names introduced by grounding to complete a
/// Boolean variable's domain.
pub fn is_bookkeeping_name(name: &str) -> bool {
    name.starts_with("<none of those>") || name.starts_with("NegatedAtom")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactEncoding {
    offsets: Vec<usize>,
    domain_sizes: Vec<usize>,
    /// Per variable: its last value is a bookkeeping value
    bookkeeping: Vec<bool>,
    fact_count: usize,
}

impl FactEncoding {
    pub fn new(task: &PlanningTask) -> Self {
        let mut encoding = Self::from_domains(&task.domain_sizes());
        encoding.bookkeeping = task
            .variables
            .iter()
            .map(|v| v.values.last().is_some_and(|name| is_bookkeeping_name(name)))
            .collect();
        encoding
    }

    /// Encoding for bare domain sizes, without any bookkeeping values.
    pub fn from_domains(domain_sizes: &[usize]) -> Self {
        let mut offsets = Vec::with_capacity(domain_sizes.len());
        let mut next = 0;
        for &size in domain_sizes {
            offsets.push(next);
            next += size;
        }
        Self {
            offsets,
            domain_sizes: domain_sizes.to_vec(),
            bookkeeping: vec![false; domain_sizes.len()],
            fact_count: next,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.domain_sizes.len()
    }

    pub fn domain_size(&self, var: usize) -> usize {
        self.domain_sizes[var]
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    pub fn fact_count(&self) -> usize {
        self.fact_count
    }

    pub fn index(&self, fact: Fact) -> usize {
        self.offsets[fact.var] + fact.value
    }

    /// Inverse of [`FactEncoding::index`].
    pub fn fact_at(&self, index: usize) -> Fact {
        // offsets are ascending; last offset not greater than index wins
        let var = self.offsets.partition_point(|&o| o <= index) - 1;
        Fact::new(var, index - self.offsets[var])
    }

    pub fn is_bookkeeping(&self, fact: Fact) -> bool {
        self.bookkeeping[fact.var] && fact.value + 1 == self.domain_sizes[fact.var]
    }

    pub fn mentions_bookkeeping(&self, tuple: &Tuple) -> bool {
        tuple.facts().iter().any(|f| self.is_bookkeeping(*f))
    }
}
