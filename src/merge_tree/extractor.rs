//! Dead sets from merge trees
//!
//! Post-order composition over the tree. Below the root every node yields
//! one expression per abstract index (the concrete states mapped to it)
//! plus the states pruned at or below it. At the root only the pruned
//! states are accumulated; its per-index expressions are never built.

use crate::ledger::{DeadSetRef, LedgerResult, ProofLedger};
use crate::stateset::{Fact, SetAlgebra, StateSetExpr};
use crate::task::{PlanningTask, TaskResult};

use super::MergeTree;

/// Per-index expressions of a node and the states pruned at or below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub slots: Vec<StateSetExpr>,
    pub dead: StateSetExpr,
}

/// Interior mode: materialise every abstract index of `node`.
///
/// # Panics
///
/// If `node` has not passed [`MergeTree::validate`] and a merge table is
/// larger than its children's index ranges.
pub fn indexed(algebra: &mut SetAlgebra, node: &MergeTree) -> Partition {
    let mut slots = vec![StateSetExpr::EMPTY; node.domain_size()];
    let mut dead = StateSetExpr::EMPTY;

    match node {
        MergeTree::Leaf { var, lookup } => {
            for (value, index) in lookup.iter().enumerate() {
                let pinned = algebra.pinned_fact(Fact::new(*var, value));
                match index {
                    Some(i) => algebra.or_assign(&mut slots[*i], pinned),
                    None => algebra.or_assign(&mut dead, pinned),
                }
            }
        }
        MergeTree::Merge { left, right, table } => {
            let l = indexed(algebra, left);
            let r = indexed(algebra, right);
            dead = algebra.or(l.dead, r.dead);
            for (row, cells) in table.iter().enumerate() {
                for (column, index) in cells.iter().enumerate() {
                    let cell = algebra.and(l.slots[row], r.slots[column]);
                    match index {
                        Some(i) => algebra.or_assign(&mut slots[*i], cell),
                        None => algebra.or_assign(&mut dead, cell),
                    }
                }
            }
        }
    }

    Partition { slots, dead }
}

/// Root mode: the states whose abstract image is pruned.
///
/// Same precondition as [`indexed`].
pub fn dead_set(algebra: &mut SetAlgebra, root: &MergeTree) -> StateSetExpr {
    let mut dead = StateSetExpr::EMPTY;
    match root {
        MergeTree::Leaf { var, lookup } => {
            for (value, index) in lookup.iter().enumerate() {
                if index.is_none() {
                    let pinned = algebra.pinned_fact(Fact::new(*var, value));
                    algebra.or_assign(&mut dead, pinned);
                }
            }
        }
        MergeTree::Merge { left, right, table } => {
            let l = indexed(algebra, left);
            let r = indexed(algebra, right);
            dead = algebra.or(l.dead, r.dead);
            for (row, cells) in table.iter().enumerate() {
                for (column, index) in cells.iter().enumerate() {
                    if index.is_none() {
                        let cell = algebra.and(l.slots[row], r.slots[column]);
                        algebra.or_assign(&mut dead, cell);
                    }
                }
            }
        }
    }
    dead
}

/// Proves states dead with a validated merge tree.
pub struct MergeTreeDeadSetExtractor<'t> {
    tree: &'t MergeTree,
}

impl<'t> MergeTreeDeadSetExtractor<'t> {
    /// Fails if `tree` does not fit `task`.
    pub fn new(tree: &'t MergeTree, task: &PlanningTask) -> TaskResult<Self> {
        tree.validate(task)?;
        Ok(Self { tree })
    }

    pub fn tree(&self) -> &MergeTree {
        self.tree
    }

    /// Prove the pruned region dead, reusing it if it already covers
    /// `state`.
    pub fn certify(&self, ledger: &mut ProofLedger, state: &[usize]) -> LedgerResult<DeadSetRef> {
        if let Some(dead) = ledger.covering_group(state) {
            return Ok(dead);
        }
        let dead = dead_set(ledger.algebra(), self.tree);
        ledger.prove_dead_set(vec![dead])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stateset::FactEncoding;
    use crate::task::{TaskError, Variable};

    fn binary_task(vars: usize) -> PlanningTask {
        PlanningTask {
            variables: (0..vars)
                .map(|i| Variable {
                    name: format!("v{}", i),
                    values: vec!["Atom p()".into(), "Atom q()".into()],
                })
                .collect(),
            operators: vec![],
            initial_state: vec![0; vars],
            goal: vec![Fact::new(0, 1)],
        }
    }

    fn leaf(var: usize, lookup: Vec<Option<usize>>) -> MergeTree {
        MergeTree::Leaf { var, lookup }
    }

    #[test]
    fn test_leaf_partition() {
        let mut alg = SetAlgebra::new(FactEncoding::from_domains(&[3]));
        let p = indexed(&mut alg, &leaf(0, vec![Some(0), None, Some(0)]));
        assert_eq!(p.slots.len(), 1);
        assert!(alg.contains_state(p.slots[0], &[0]));
        assert!(alg.contains_state(p.slots[0], &[2]));
        assert!(!alg.contains_state(p.slots[0], &[1]));
        assert!(alg.contains_state(p.dead, &[1]));
    }

    #[test]
    fn test_root_leaf_dead_set() {
        let mut alg = SetAlgebra::new(FactEncoding::from_domains(&[3]));
        let tree = leaf(0, vec![Some(0), None, Some(1)]);
        let dead = dead_set(&mut alg, &tree);
        let expected = alg.pinned_fact(Fact::new(0, 1));
        assert_eq!(dead, expected);
    }

    #[test]
    fn test_root_mode_matches_indexed_dead() {
        let mut alg = SetAlgebra::new(FactEncoding::from_domains(&[2, 2, 2]));
        let inner = MergeTree::Merge {
            left: Box::new(leaf(0, vec![Some(0), Some(1)])),
            right: Box::new(leaf(1, vec![Some(0), None])),
            table: vec![vec![Some(0)], vec![None]],
        };
        let tree = MergeTree::Merge {
            left: Box::new(inner),
            right: Box::new(leaf(2, vec![Some(0), Some(0)])),
            table: vec![vec![None]],
        };
        let from_root = dead_set(&mut alg, &tree);
        let from_indexed = indexed(&mut alg, &tree).dead;
        assert_eq!(from_root, from_indexed);

        for a in 0..2 {
            for b in 0..2 {
                for c in 0..2 {
                    let state = [a, b, c];
                    assert_eq!(
                        alg.contains_state(from_root, &state),
                        tree.abstract_index(&state).is_none()
                    );
                }
            }
        }
    }

    #[test]
    fn test_extractor_rejects_oversized_table() {
        // three rows for a left child with two indices
        let tree = MergeTree::Merge {
            left: Box::new(leaf(0, vec![Some(0), Some(1)])),
            right: Box::new(leaf(1, vec![Some(0), Some(0)])),
            table: vec![vec![Some(0)], vec![None], vec![Some(1)]],
        };
        let err = MergeTreeDeadSetExtractor::new(&tree, &binary_task(2))
            .err()
            .unwrap();
        assert!(matches!(err, TaskError::InvalidMergeTree(_)));
    }
}
