//! Merge-Tree Dead Set Tests
//!
//! Tests that the dead set built from a merge tree:
//! - Contains exactly the states whose abstract image is pruned
//! - Accumulates pruning from leaves as well as from merge tables
//! - Is recorded once and reused for later covered states

use tempfile::TempDir;
use unsolvcert::ledger::ProofLedger;
use unsolvcert::merge_tree::{dead_set, indexed, MergeTree, MergeTreeDeadSetExtractor};
use unsolvcert::proof::{conclude_unsolvable, prove_init_dead};
use unsolvcert::stateset::{FactEncoding, SetAlgebra};
use unsolvcert::task::PlanningTask;

// =============================================================================
// Test Utilities
// =============================================================================

/// Domains 2 and 3; no operators, so only the goal state is alive.
const TASK_JSON: &str = r#"{
    "variables": [
        {"name": "a", "values": ["Atom a0()", "Atom a1()"]},
        {"name": "b", "values": ["Atom b0()", "Atom b1()", "Atom b2()"]}
    ],
    "operators": [],
    "initial_state": [1, 2],
    "goal": [{"var": 1, "value": 0}]
}"#;

/// Only the cell (1, 2) is pruned.
const TREE_JSON: &str = r#"{"merge": {
    "left":  {"leaf": {"var": 0, "lookup": [0, 1]}},
    "right": {"leaf": {"var": 1, "lookup": [0, 1, 2]}},
    "table": [[0, 1, 2], [3, 4, null]]
}}"#;

fn all_states() -> Vec<[usize; 2]> {
    let mut states = Vec::new();
    for a in 0..2 {
        for b in 0..3 {
            states.push([a, b]);
        }
    }
    states
}

fn load() -> (PlanningTask, MergeTree) {
    let task = PlanningTask::from_json(TASK_JSON).unwrap();
    let tree = MergeTree::from_json(TREE_JSON).unwrap();
    tree.validate(&task).unwrap();
    (task, tree)
}

// =============================================================================
// Dead Set Contents
// =============================================================================

#[test]
fn test_dead_set_is_exactly_the_pruned_cell() {
    let (task, tree) = load();
    let mut alg = SetAlgebra::new(FactEncoding::new(&task));
    let dead = dead_set(&mut alg, &tree);

    for state in all_states() {
        assert_eq!(
            alg.contains_state(dead, &state),
            state == [1, 2],
            "state {:?}",
            state
        );
        assert_eq!(
            alg.contains_state(dead, &state),
            tree.abstract_index(&state).is_none()
        );
    }
}

#[test]
fn test_interior_partition_is_complete() {
    let (task, tree) = load();
    let mut alg = SetAlgebra::new(FactEncoding::new(&task));
    let partition = indexed(&mut alg, &tree);

    assert_eq!(partition.slots.len(), 5);
    for state in all_states() {
        let hits: Vec<usize> = partition
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| alg.contains_state(**slot, &state))
            .map(|(i, _)| i)
            .collect();
        match tree.abstract_index(&state) {
            Some(index) => assert_eq!(hits, vec![index]),
            None => {
                assert!(hits.is_empty());
                assert!(alg.contains_state(partition.dead, &state));
            }
        }
    }
}

#[test]
fn test_leaf_pruning_reaches_root() {
    let (task, _) = load();
    let tree = MergeTree::from_json(
        r#"{"merge": {
            "left":  {"leaf": {"var": 0, "lookup": [0, 0]}},
            "right": {"leaf": {"var": 1, "lookup": [0, null, 1]}},
            "table": [[0, null]]
        }}"#,
    )
    .unwrap();
    tree.validate(&task).unwrap();

    let mut alg = SetAlgebra::new(FactEncoding::new(&task));
    let dead = dead_set(&mut alg, &tree);
    for state in all_states() {
        // b1 pruned in the leaf, b2 pruned in the table
        assert_eq!(alg.contains_state(dead, &state), state[1] != 0);
    }
}

#[test]
fn test_extractor_validates_tree_against_task() {
    let (task, _) = load();
    // leaf for b lists two values, b has three
    let tree = MergeTree::from_json(
        r#"{"merge": {
            "left":  {"leaf": {"var": 0, "lookup": [0, 1]}},
            "right": {"leaf": {"var": 1, "lookup": [0, 1]}},
            "table": [[0, 1], [2, null]]
        }}"#,
    )
    .unwrap();
    assert!(MergeTreeDeadSetExtractor::new(&tree, &task).is_err());
}

// =============================================================================
// Ledger Integration
// =============================================================================

#[test]
fn test_certify_and_reuse() {
    let temp_dir = TempDir::new().unwrap();
    let (task, tree) = load();
    let mut ledger = ProofLedger::initialize(temp_dir.path(), &task).unwrap();
    let extractor = MergeTreeDeadSetExtractor::new(&tree, &task).unwrap();

    let dead = extractor.certify(&mut ledger, &[1, 2]).unwrap();
    let knowledge = ledger.next_knowledge_id();
    let again = extractor.certify(&mut ledger, &[1, 2]).unwrap();

    assert_eq!(dead, again);
    assert_eq!(ledger.next_knowledge_id(), knowledge);
    assert_eq!(ledger.stats().groups_reused, 1);

    let init_dead = prove_init_dead(&mut ledger, dead).unwrap();
    let unsolvable = conclude_unsolvable(&mut ledger, init_dead).unwrap();
    assert_eq!(unsolvable.value() + 1, ledger.next_knowledge_id().value());
}
