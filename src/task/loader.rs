//! JSON task loading and validation
//!
//! The task file is the grounded output of the planner front end. It is
//! validated once on load; every later consumer assumes a well-formed task.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::errors::{TaskError, TaskResult};
use super::types::{Fact, PlanningTask};

impl PlanningTask {
    /// Load and validate a task from a JSON file.
    pub fn load(path: &Path) -> TaskResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| TaskError::io(path, e))?;
        let task: PlanningTask =
            serde_json::from_str(&content).map_err(|e| TaskError::parse(path, e))?;
        task.validate()?;
        Ok(task)
    }

    /// Parse and validate a task from a JSON string.
    pub fn from_json(json: &str) -> TaskResult<Self> {
        let task: PlanningTask = serde_json::from_str(json)
            .map_err(|e| TaskError::InvalidTask(format!("Invalid task JSON: {}", e)))?;
        task.validate()?;
        Ok(task)
    }

    /// Check every fact reference against the variable domains.
    pub fn validate(&self) -> TaskResult<()> {
        if self.variables.is_empty() {
            return Err(TaskError::InvalidTask("task has no variables".into()));
        }

        for (var, variable) in self.variables.iter().enumerate() {
            if variable.values.is_empty() {
                return Err(TaskError::InvalidTask(format!(
                    "variable {} ({}) has an empty domain",
                    var, variable.name
                )));
            }
        }

        if self.initial_state.len() != self.variables.len() {
            return Err(TaskError::InvalidTask(format!(
                "initial state assigns {} variables, task has {}",
                self.initial_state.len(),
                self.variables.len()
            )));
        }
        for (var, &value) in self.initial_state.iter().enumerate() {
            self.check_fact(Fact::new(var, value), "initial state")?;
        }

        self.check_partial_assignment(&self.goal, "goal")?;

        for op in &self.operators {
            let context = format!("operator '{}'", op.name);
            self.check_partial_assignment(&op.preconditions, &context)?;
            for effect in &op.effects {
                self.check_fact(effect.fact, &context)?;
                for condition in &effect.conditions {
                    self.check_fact(*condition, &context)?;
                }
            }
            let unconditional: Vec<Fact> = op
                .effects
                .iter()
                .filter(|e| !e.is_conditional())
                .map(|e| e.fact)
                .collect();
            self.check_partial_assignment(&unconditional, &format!("{} effects", context))?;
        }

        Ok(())
    }

    fn check_fact(&self, fact: Fact, context: &str) -> TaskResult<()> {
        let variable = self.variables.get(fact.var).ok_or_else(|| {
            TaskError::InvalidTask(format!("{}: unknown variable {}", context, fact.var))
        })?;
        if fact.value >= variable.domain_size() {
            return Err(TaskError::InvalidTask(format!(
                "{}: value {} out of range for variable {} (domain size {})",
                context,
                fact.value,
                fact.var,
                variable.domain_size()
            )));
        }
        Ok(())
    }

    fn check_partial_assignment(&self, facts: &[Fact], context: &str) -> TaskResult<()> {
        let mut seen = HashSet::new();
        for fact in facts {
            self.check_fact(*fact, context)?;
            if !seen.insert(fact.var) {
                return Err(TaskError::InvalidTask(format!(
                    "{}: variable {} assigned twice",
                    context, fact.var
                )));
            }
        }
        Ok(())
    }
}
