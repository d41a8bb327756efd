//! Dead sets from critical-path tables
//!
//! A state whose table marks some tuples unreachable lies in the set of
//! states where none of those tuples hold. That set is closed under
//! progression and, when the goal is unreachable, contains no goal state,
//! so it is proven dead with one `d6` group.
//!
//! Each group is seeded with the same-variable mutexes ("values i and j of
//! a variable hold together") in negated form, then one negated conjunction
//! per minimal unreachable tuple.

use crate::ledger::{DeadSetRef, LedgerError, LedgerResult, ProofLedger};
use crate::observability::{log_event_with_fields, Event};
use crate::stateset::{Fact, FactEncoding, StateSetExpr, Tuple};

use super::table::HmTable;

#[derive(Debug, Default)]
pub struct TupleDeadSetExtractor {
    /// Built on first use, once per task
    mutexes: Option<Mutexes>,
}

#[derive(Debug, Clone)]
struct Mutexes {
    both_hold: Vec<StateSetExpr>,
    negated: Vec<StateSetExpr>,
}

impl TupleDeadSetExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The baseline mutex sets: for every variable and every pair of
    /// distinct values, the states where both hold.
    pub fn mutex_sets(&mut self, ledger: &mut ProofLedger) -> &[StateSetExpr] {
        &self.mutexes(ledger).both_hold
    }

    fn mutexes(&mut self, ledger: &mut ProofLedger) -> &Mutexes {
        self.mutexes.get_or_insert_with(|| {
            let sizes = ledger.encoding().domain_sizes().to_vec();
            let algebra = ledger.algebra();
            let mut both_hold = Vec::new();
            let mut negated = Vec::new();
            for (var, &size) in sizes.iter().enumerate() {
                for i in 0..size {
                    for j in i + 1..size {
                        let fi = algebra.fact(Fact::new(var, i));
                        let fj = algebra.fact(Fact::new(var, j));
                        let both = algebra.and(fi, fj);
                        both_hold.push(both);
                        negated.push(algebra.negate(both));
                    }
                }
            }
            log_event_with_fields(Event::MutexesBuilt, &[("count", &both_hold.len().to_string())]);
            Mutexes { both_hold, negated }
        })
    }

    /// Prove `state` dead from its table, reusing an earlier group that
    /// already covers it.
    ///
    /// Tasks with conditional effects are refused: the table ignores effect
    /// conditions, so its infinite entries do not imply unreachability.
    pub fn certify(
        &mut self,
        ledger: &mut ProofLedger,
        table: &HmTable,
        state: &[usize],
    ) -> LedgerResult<DeadSetRef> {
        check_no_conditional_effects(ledger)?;
        if let Some(dead) = ledger.covering_group(state) {
            return Ok(dead);
        }

        let mut members = self.mutexes(ledger).negated.clone();
        let tuples = select_tuples(table, ledger.encoding());
        let algebra = ledger.algebra();
        for tuple in &tuples {
            let holds = algebra.from_tuple(tuple);
            members.push(algebra.negate(holds));
        }
        ledger.prove_dead_set(members)
    }
}

/// Fails with `CERT_UNSUPPORTED_FEATURE` if any operator of the ledger's
/// task has a conditional effect.
pub fn check_no_conditional_effects(ledger: &ProofLedger) -> LedgerResult<()> {
    match ledger.task().first_conditional_operator() {
        Some(op) => Err(LedgerError::unsupported_feature(format!(
            "operator '{}' has a conditional effect; critical-path dead ends are unreliable",
            op.name
        ))),
        None => Ok(()),
    }
}

/// Minimal unreachable tuples that mention no bookkeeping value.
///
/// Shorter tuples come first; a tuple is dropped when an already kept
/// tuple is contained in it, since the smaller one already excludes every
/// state the larger one would.
pub fn select_tuples(table: &HmTable, encoding: &FactEncoding) -> Vec<Tuple> {
    let mut infinite: Vec<&Tuple> = table.infinite_tuples();
    infinite.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let mut kept: Vec<Tuple> = Vec::new();
    for tuple in infinite {
        if kept.iter().any(|k| k.is_subtuple_of(tuple)) {
            continue;
        }
        // Unverified: whether dropping these is sound in general.
        if encoding.mentions_bookkeeping(tuple) {
            continue;
        }
        kept.push(tuple.clone());
    }
    kept
}
