//! Closing a proof
//!
//! Connects dead sets produced by the extractors to concrete states and,
//! finally, to the unsolvability statement. Each step is one atomic group.

use crate::knowledge::{Justification, Knowledge, KnowledgeId, Rule, SetId};
use crate::ledger::{DeadSetRef, LedgerResult, ProofLedger};

/// Show a single state dead through a dead set containing it.
///
/// Writes the explicit set `{state}`, `{state} ⊆ S` (b4) and
/// `Dead{{state}}` (d3). Returns the new dead reference.
pub fn prove_state_dead(
    ledger: &mut ProofLedger,
    state: &[usize],
    superset: DeadSetRef,
) -> LedgerResult<DeadSetRef> {
    let mut group = ledger.begin_group();
    let explicit = group.define_explicit(&[state.to_vec()])?;
    let k_subset = group.add_knowledge(
        Knowledge::Subset {
            left: explicit,
            right: superset.set,
        },
        Justification::basic(Rule::B4),
    )?;
    let k_dead = group.add_knowledge(
        Knowledge::Dead { set: explicit },
        Justification::new(Rule::D3, vec![k_subset, superset.knowledge]),
    )?;
    group.commit()?;

    Ok(DeadSetRef {
        set: explicit,
        knowledge: k_dead,
    })
}

/// Show the initial state dead through a dead set containing it.
pub fn prove_init_dead(ledger: &mut ProofLedger, superset: DeadSetRef) -> LedgerResult<KnowledgeId> {
    let mut group = ledger.begin_group();
    let k_subset = group.add_knowledge(
        Knowledge::Subset {
            left: SetId::INIT,
            right: superset.set,
        },
        Justification::basic(Rule::B1),
    )?;
    let k_dead = group.add_knowledge(
        Knowledge::Dead { set: SetId::INIT },
        Justification::new(Rule::D3, vec![k_subset, superset.knowledge]),
    )?;
    group.commit()?;
    Ok(k_dead)
}

/// The terminal statement. `init_dead` must be `Dead{init}`.
pub fn conclude_unsolvable(
    ledger: &mut ProofLedger,
    init_dead: KnowledgeId,
) -> LedgerResult<KnowledgeId> {
    ledger.record_knowledge(
        Knowledge::Unsolvable,
        Justification::new(Rule::D4, vec![init_dead]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerErrorCode;
    use crate::task::{Fact, PlanningTask, Variable};
    use tempfile::TempDir;

    fn task() -> PlanningTask {
        PlanningTask {
            variables: vec![Variable {
                name: "v".into(),
                values: vec!["Atom p()".into(), "Atom q()".into()],
            }],
            operators: vec![],
            initial_state: vec![0],
            goal: vec![Fact::new(0, 1)],
        }
    }

    #[test]
    fn test_full_chain() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = ProofLedger::initialize(temp_dir.path(), &task()).unwrap();

        let member = {
            let alg = ledger.algebra();
            let q = alg.fact(Fact::new(0, 1));
            alg.negate(q)
        };
        let dead = ledger.prove_dead_set(vec![member]).unwrap();
        let state_dead = prove_state_dead(&mut ledger, &[0], dead).unwrap();
        let init_dead = prove_init_dead(&mut ledger, dead).unwrap();
        let unsolvable = conclude_unsolvable(&mut ledger, init_dead).unwrap();

        assert_eq!(state_dead.set, SetId(7));
        assert_eq!(unsolvable, KnowledgeId(9));

        let content = std::fs::read_to_string(ledger.certificate_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[lines.len() - 6], "e 7 e 2 0 1 : 8 ;");
        assert_eq!(lines[lines.len() - 5], "k 5 s 7 3 b4");
        assert_eq!(lines[lines.len() - 4], "k 6 d 7 d3 5 4");
        assert_eq!(lines[lines.len() - 3], "k 7 s 2 3 b1");
        assert_eq!(lines[lines.len() - 2], "k 8 d 2 d3 7 4");
        assert_eq!(lines[lines.len() - 1], "k 9 u d4 8");
    }

    #[test]
    fn test_unsolvable_needs_dead_premise() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = ProofLedger::initialize(temp_dir.path(), &task()).unwrap();
        let err = conclude_unsolvable(&mut ledger, KnowledgeId(3)).unwrap_err();
        assert_eq!(err.code(), LedgerErrorCode::CertReferenceUndefined);
    }
}
