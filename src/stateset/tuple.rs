//! Fact tuples
//!
//! A tuple is a partial assignment: facts over pairwise distinct variables,
//! kept sorted by variable so that equal tuples compare equal.

use std::fmt;

use crate::task::Fact;

/// Sorted facts over distinct variables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tuple {
    facts: Vec<Fact>,
}

impl Tuple {
    /// Build a tuple from facts in any order.
    ///
    /// Returns `None` if two facts share a variable. Exact duplicates are
    /// collapsed.
    pub fn new(mut facts: Vec<Fact>) -> Option<Self> {
        facts.sort();
        facts.dedup();
        if facts.windows(2).any(|w| w[0].var == w[1].var) {
            return None;
        }
        Some(Self { facts })
    }

    pub fn empty() -> Self {
        Self { facts: Vec::new() }
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn contains(&self, fact: Fact) -> bool {
        self.facts.binary_search(&fact).is_ok()
    }

    /// True if every fact of `self` also occurs in `other`.
    pub fn is_subtuple_of(&self, other: &Tuple) -> bool {
        self.len() <= other.len() && self.facts.iter().all(|f| other.contains(*f))
    }

    /// True if every fact holds in the full assignment.
    pub fn holds_in(&self, state: &[usize]) -> bool {
        self.facts.iter().all(|f| f.holds_in(state))
    }

    /// Merge two tuples; `None` if they assign some variable differently.
    pub fn union(&self, other: &Tuple) -> Option<Tuple> {
        let mut facts = self.facts.clone();
        facts.extend_from_slice(&other.facts);
        Tuple::new(facts)
    }

    /// Facts of `self` that are not in `other`.
    pub fn difference(&self, other: &Tuple) -> Tuple {
        Tuple {
            facts: self
                .facts
                .iter()
                .copied()
                .filter(|f| !other.contains(*f))
                .collect(),
        }
    }

    /// All non-empty sub-tuples with at most `max_len` facts, shortest first.
    pub fn sub_tuples(&self, max_len: usize) -> Vec<Tuple> {
        let mut out = Vec::new();
        for size in 1..=max_len.min(self.len()) {
            let mut current = Vec::with_capacity(size);
            combinations(&self.facts, size, 0, &mut current, &mut out);
        }
        out
    }
}

fn combinations(
    facts: &[Fact],
    size: usize,
    start: usize,
    current: &mut Vec<Fact>,
    out: &mut Vec<Tuple>,
) {
    if current.len() == size {
        out.push(Tuple {
            facts: current.clone(),
        });
        return;
    }
    let remaining = size - current.len();
    for i in start..=facts.len().saturating_sub(remaining) {
        current.push(facts[i]);
        combinations(facts, size, i + 1, current, out);
        current.pop();
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", fact)?;
        }
        write!(f, "]")
    }
}
