//! Finite-domain planning task
//!
//! Every variable takes exactly one value of its domain in every state, so a
//! state is a full assignment `state[var] = value`. Value names are the atom
//! names written to the task snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A (variable, value) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub var: usize,
    pub value: usize,
}

impl Fact {
    pub fn new(var: usize, value: usize) -> Self {
        Self { var, value }
    }

    /// Returns true if this fact holds in the full assignment.
    pub fn holds_in(&self, state: &[usize]) -> bool {
        state.get(self.var) == Some(&self.value)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}={}", self.var, self.value)
    }
}

/// A finite-domain variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// One atom name per value
    pub values: Vec<String>,
}

impl Variable {
    pub fn domain_size(&self) -> usize {
        self.values.len()
    }
}

/// An operator effect. Conditional effects are representable so that the
/// snapshot writer can refuse them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub fact: Fact,
    #[serde(default)]
    pub conditions: Vec<Fact>,
}

impl Effect {
    pub fn unconditional(fact: Fact) -> Self {
        Self {
            fact,
            conditions: Vec::new(),
        }
    }

    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: u32,
    #[serde(default)]
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Effect>,
}

fn default_cost() -> u32 {
    1
}

impl Operator {
    /// Returns true if some effect sets `var` to a value other than `value`.
    pub fn contradicts(&self, fact: Fact) -> bool {
        self.effects
            .iter()
            .any(|e| e.fact.var == fact.var && e.fact.value != fact.value)
    }
}

/// The planning task consumed by the certificate subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningTask {
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub operators: Vec<Operator>,
    pub initial_state: Vec<usize>,
    pub goal: Vec<Fact>,
}

impl PlanningTask {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn domain_size(&self, var: usize) -> usize {
        self.variables[var].domain_size()
    }

    pub fn domain_sizes(&self) -> Vec<usize> {
        self.variables.iter().map(Variable::domain_size).collect()
    }

    pub fn fact_name(&self, fact: Fact) -> &str {
        &self.variables[fact.var].values[fact.value]
    }

    pub fn initial_state(&self) -> &[usize] {
        &self.initial_state
    }

    pub fn is_goal_state(&self, state: &[usize]) -> bool {
        self.goal.iter().all(|f| f.holds_in(state))
    }

    /// The first operator with at least one conditional effect.
    pub fn first_conditional_operator(&self) -> Option<&Operator> {
        self.operators
            .iter()
            .find(|op| op.effects.iter().any(Effect::is_conditional))
    }
}
