//! Merge-tree abstractions
//!
//! A merge tree is the factored representation of a merge-and-shrink
//! abstraction. A leaf maps the values of one task variable to abstract
//! indices; a merge node maps pairs of child indices to its own indices.
//! `None` (`null` in JSON) is the `PRUNED` index: abstract states with no
//! path to an abstract goal.
//!
//! ```json
//! {"merge": {
//!     "left":  {"leaf": {"var": 0, "lookup": [0, 1]}},
//!     "right": {"leaf": {"var": 1, "lookup": [0, 1, 2]}},
//!     "table": [[0, 1, 2], [3, 4, null]]
//! }}
//! ```

mod extractor;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::task::{PlanningTask, TaskError, TaskResult};

pub use extractor::{dead_set, indexed, MergeTreeDeadSetExtractor, Partition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeTree {
    Leaf {
        var: usize,
        lookup: Vec<Option<usize>>,
    },
    Merge {
        left: Box<MergeTree>,
        right: Box<MergeTree>,
        table: Vec<Vec<Option<usize>>>,
    },
}

impl MergeTree {
    pub fn load(path: &Path) -> TaskResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| TaskError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| TaskError::parse(path, e))
    }

    pub fn from_json(json: &str) -> TaskResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TaskError::InvalidMergeTree(format!("Invalid merge tree JSON: {}", e)))
    }

    /// Number of abstract indices this node produces.
    pub fn domain_size(&self) -> usize {
        let max = match self {
            MergeTree::Leaf { lookup, .. } => lookup.iter().flatten().max().copied(),
            MergeTree::Merge { table, .. } => table.iter().flatten().flatten().max().copied(),
        };
        max.map_or(0, |m| m + 1)
    }

    /// Task variables covered by the leaves, left to right.
    pub fn variables(&self) -> Vec<usize> {
        match self {
            MergeTree::Leaf { var, .. } => vec![*var],
            MergeTree::Merge { left, right, .. } => {
                let mut vars = left.variables();
                vars.extend(right.variables());
                vars
            }
        }
    }

    /// Check table shapes against the task and the children.
    pub fn validate(&self, task: &PlanningTask) -> TaskResult<()> {
        let vars = self.variables();
        let mut seen = HashSet::new();
        for var in &vars {
            if !seen.insert(*var) {
                return Err(TaskError::InvalidMergeTree(format!(
                    "variable {} appears in more than one leaf",
                    var
                )));
            }
        }
        self.validate_node(task)
    }

    fn validate_node(&self, task: &PlanningTask) -> TaskResult<()> {
        match self {
            MergeTree::Leaf { var, lookup } => {
                if *var >= task.num_variables() {
                    return Err(TaskError::InvalidMergeTree(format!(
                        "leaf refers to unknown variable {}",
                        var
                    )));
                }
                if lookup.len() != task.domain_size(*var) {
                    return Err(TaskError::InvalidMergeTree(format!(
                        "leaf for variable {} has {} entries, domain size is {}",
                        var,
                        lookup.len(),
                        task.domain_size(*var)
                    )));
                }
                Ok(())
            }
            MergeTree::Merge { left, right, table } => {
                left.validate_node(task)?;
                right.validate_node(task)?;
                let rows = left.domain_size();
                let columns = right.domain_size();
                if table.len() != rows {
                    return Err(TaskError::InvalidMergeTree(format!(
                        "merge table has {} rows, left child has {} indices",
                        table.len(),
                        rows
                    )));
                }
                if let Some(row) = table.iter().find(|row| row.len() != columns) {
                    return Err(TaskError::InvalidMergeTree(format!(
                        "merge table row has {} columns, right child has {} indices",
                        row.len(),
                        columns
                    )));
                }
                Ok(())
            }
        }
    }

    /// Abstract index of a full assignment; `None` if it is pruned at any
    /// level.
    pub fn abstract_index(&self, state: &[usize]) -> Option<usize> {
        match self {
            MergeTree::Leaf { var, lookup } => lookup.get(state[*var]).copied().flatten(),
            MergeTree::Merge { left, right, table } => {
                let row = left.abstract_index(state)?;
                let column = right.abstract_index(state)?;
                table.get(row)?.get(column).copied().flatten()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Fact, Variable};

    const TREE_JSON: &str = r#"{"merge": {
        "left":  {"leaf": {"var": 0, "lookup": [0, 1]}},
        "right": {"leaf": {"var": 1, "lookup": [0, 1, 2]}},
        "table": [[0, 1, 2], [3, 4, null]]
    }}"#;

    fn task() -> PlanningTask {
        PlanningTask {
            variables: vec![
                Variable {
                    name: "a".into(),
                    values: vec!["Atom a0()".into(), "Atom a1()".into()],
                },
                Variable {
                    name: "b".into(),
                    values: vec!["Atom b0()".into(), "Atom b1()".into(), "Atom b2()".into()],
                },
            ],
            operators: vec![],
            initial_state: vec![0, 0],
            goal: vec![Fact::new(1, 2)],
        }
    }

    #[test]
    fn test_parse_and_validate() {
        let tree = MergeTree::from_json(TREE_JSON).unwrap();
        tree.validate(&task()).unwrap();
        assert_eq!(tree.domain_size(), 5);
        assert_eq!(tree.variables(), vec![0, 1]);
    }

    #[test]
    fn test_abstract_index() {
        let tree = MergeTree::from_json(TREE_JSON).unwrap();
        assert_eq!(tree.abstract_index(&[0, 0]), Some(0));
        assert_eq!(tree.abstract_index(&[1, 1]), Some(4));
        assert_eq!(tree.abstract_index(&[1, 2]), None);
    }

    #[test]
    fn test_pruned_leaf_value_prunes_state() {
        let tree = MergeTree::from_json(
            r#"{"merge": {
                "left":  {"leaf": {"var": 0, "lookup": [0, null]}},
                "right": {"leaf": {"var": 1, "lookup": [0, 0, 0]}},
                "table": [[0]]
            }}"#,
        )
        .unwrap();
        tree.validate(&task()).unwrap();
        assert_eq!(tree.abstract_index(&[0, 2]), Some(0));
        assert_eq!(tree.abstract_index(&[1, 0]), None);
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let short_leaf = MergeTree::from_json(r#"{"leaf": {"var": 1, "lookup": [0, 1]}}"#).unwrap();
        assert!(short_leaf.validate(&task()).is_err());

        let bad_table = MergeTree::from_json(
            r#"{"merge": {
                "left":  {"leaf": {"var": 0, "lookup": [0, 1]}},
                "right": {"leaf": {"var": 1, "lookup": [0, 1, 2]}},
                "table": [[0, 1], [2, 3]]
            }}"#,
        )
        .unwrap();
        let err = bad_table.validate(&task()).unwrap_err();
        assert_eq!(err.code(), "CERT_MERGE_TREE_INVALID");

        let repeated = MergeTree::from_json(
            r#"{"merge": {
                "left":  {"leaf": {"var": 0, "lookup": [0, 1]}},
                "right": {"leaf": {"var": 0, "lookup": [0, 1]}},
                "table": [[0, 1], [2, 3]]
            }}"#,
        )
        .unwrap();
        assert!(repeated.validate(&task()).is_err());
    }
}
