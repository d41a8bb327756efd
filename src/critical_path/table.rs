//! Critical-path (h^m) cost table
//!
//! Maps every tuple of at most `m` facts to the cost of reaching it from a
//! given state, or to `Infinite` if it is unreachable. Computed by fixpoint
//! iteration over the operators; a table produced elsewhere can be loaded
//! with [`HmTable::from_entries`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stateset::Tuple;
use crate::task::{Fact, Operator, PlanningTask};

/// A tuple cost. `Finite` orders below `Infinite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cost {
    Finite(u64),
    Infinite,
}

impl Cost {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Cost::Infinite)
    }

    fn plus(self, cost: u32) -> Cost {
        match self {
            Cost::Finite(c) => Cost::Finite(c.saturating_add(u64::from(cost))),
            Cost::Infinite => Cost::Infinite,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(c) => write!(f, "{}", c),
            Cost::Infinite => write!(f, "inf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmTable {
    m: usize,
    entries: BTreeMap<Tuple, Cost>,
}

impl HmTable {
    /// Table from externally computed entries. Tuples longer than `m` are
    /// ignored.
    pub fn from_entries(m: usize, entries: impl IntoIterator<Item = (Tuple, Cost)>) -> Self {
        Self {
            m,
            entries: entries
                .into_iter()
                .filter(|(t, _)| !t.is_empty() && t.len() <= m)
                .collect(),
        }
    }

    /// Every tuple of 1..=m facts over distinct variables, in canonical order.
    pub fn all_tuples(task: &PlanningTask, m: usize) -> Vec<Tuple> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        generate(task, m, 0, &mut current, &mut out);
        out
    }

    /// Compute the table for `state` by fixpoint iteration.
    pub fn compute(task: &PlanningTask, m: usize, state: &[usize]) -> Self {
        let entries = Self::all_tuples(task, m)
            .into_iter()
            .map(|t| {
                let cost = if t.holds_in(state) {
                    Cost::Finite(0)
                } else {
                    Cost::Infinite
                };
                (t, cost)
            })
            .collect();
        let mut table = Self { m, entries };

        let operators: Vec<(&Operator, Tuple, Tuple)> = task
            .operators
            .iter()
            .filter_map(|op| {
                let pre = Tuple::new(op.preconditions.clone())?;
                let eff = Tuple::new(op.effects.iter().map(|e| e.fact).collect())?;
                Some((op, pre, eff))
            })
            .collect();

        loop {
            let mut updated = false;
            for (op, pre, eff) in &operators {
                let c1 = table.eval(pre);
                if c1.is_infinite() {
                    continue;
                }
                for partial in eff.sub_tuples(m) {
                    updated |= table.update(&partial, c1.plus(op.cost));
                    if partial.len() < m {
                        updated |= table.extend(&partial, op, pre);
                    }
                }
            }
            if !updated {
                break;
            }
        }
        table
    }

    /// Regress through `op` with extra facts that the operator leaves
    /// untouched: every larger tuple containing `partial` is reachable once
    /// the preconditions and the extra facts are.
    fn extend(&mut self, partial: &Tuple, op: &Operator, pre: &Tuple) -> bool {
        let candidates: Vec<Tuple> = self
            .entries
            .keys()
            .filter(|t| t.len() > partial.len() && partial.is_subtuple_of(t))
            .filter(|t| !t.facts().iter().any(|f| op.contradicts(*f)))
            .cloned()
            .collect();

        let mut updated = false;
        for tuple in candidates {
            let Some(extended_pre) = pre.union(&tuple.difference(partial)) else {
                continue;
            };
            let c2 = self.eval(&extended_pre);
            if !c2.is_infinite() {
                updated |= self.update(&tuple, c2.plus(op.cost));
            }
        }
        updated
    }

    fn update(&mut self, tuple: &Tuple, value: Cost) -> bool {
        match self.entries.get_mut(tuple) {
            Some(current) if value < *current => {
                *current = value;
                true
            }
            _ => false,
        }
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cost(&self, tuple: &Tuple) -> Option<Cost> {
        self.entries.get(tuple).copied()
    }

    /// Maximum cost over the sub-tuples of at most `m` facts. The empty
    /// tuple costs 0; sub-tuples missing from the table count as 0.
    pub fn eval(&self, tuple: &Tuple) -> Cost {
        tuple
            .sub_tuples(self.m)
            .iter()
            .map(|t| self.cost(t).unwrap_or(Cost::Finite(0)))
            .max()
            .unwrap_or(Cost::Finite(0))
    }

    pub fn goal_cost(&self, goal: &[Fact]) -> Cost {
        match Tuple::new(goal.to_vec()) {
            Some(t) => self.eval(&t),
            None => Cost::Infinite,
        }
    }

    /// Tuples with infinite cost, in canonical order.
    pub fn infinite_tuples(&self) -> Vec<&Tuple> {
        self.entries
            .iter()
            .filter(|(_, c)| c.is_infinite())
            .map(|(t, _)| t)
            .collect()
    }
}

fn generate(
    task: &PlanningTask,
    remaining: usize,
    first_var: usize,
    current: &mut Vec<Fact>,
    out: &mut Vec<Tuple>,
) {
    if remaining == 0 {
        return;
    }
    for var in first_var..task.num_variables() {
        for value in 0..task.domain_size(var) {
            current.push(Fact::new(var, value));
            if let Some(t) = Tuple::new(current.clone()) {
                out.push(t);
            }
            generate(task, remaining - 1, var + 1, current, out);
            current.pop();
        }
    }
}
