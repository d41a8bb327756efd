//! Buffered certificate groups
//!
//! A group allocates ids from local cursors, checks every reference against
//! what is already defined, and buffers its lines. `commit` appends all
//! lines with a single write followed by fsync and only then advances the
//! ledger's counters. A group dropped without commit leaves no trace: no
//! bytes written, no ids consumed.

use crate::knowledge::{Justification, Knowledge, KnowledgeId, KnowledgeRecord, SetId};
use crate::observability::{log_event_with_fields, Event};
use crate::stateset::{FactEncoding, SetAlgebra, StateSetExpr};

use super::definition::{SetDefinition, SetRecord};
use super::errors::{LedgerError, LedgerResult};
use super::witness::encode_state;
use super::ProofLedger;

/// Id ranges written by a committed group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupReceipt {
    pub first_set: SetId,
    pub sets: usize,
    pub first_knowledge: KnowledgeId,
    pub knowledge: usize,
}

pub struct CertificateGroup<'a> {
    ledger: &'a mut ProofLedger,
    next_set: usize,
    next_knowledge: usize,
    lines: Vec<String>,
    records: Vec<KnowledgeRecord>,
}

impl<'a> CertificateGroup<'a> {
    pub(super) fn new(ledger: &'a mut ProofLedger) -> Self {
        let next_set = ledger.next_set_id;
        let next_knowledge = ledger.next_knowledge_id;
        Self {
            ledger,
            next_set,
            next_knowledge,
            lines: Vec::new(),
            records: Vec::new(),
        }
    }

    /// The ledger's set algebra, for building expressions inside the group.
    pub fn algebra(&mut self) -> &mut SetAlgebra {
        &mut self.ledger.algebra
    }

    pub fn encoding(&self) -> &FactEncoding {
        self.ledger.algebra.encoding()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn allocate_set_id(&mut self) -> SetId {
        let id = SetId(self.next_set);
        self.next_set += 1;
        id
    }

    fn allocate_knowledge_id(&mut self) -> KnowledgeId {
        let id = KnowledgeId(self.next_knowledge);
        self.next_knowledge += 1;
        id
    }

    /// Define a set. Every cited set must already be defined.
    pub fn define_set(&mut self, definition: SetDefinition) -> LedgerResult<SetId> {
        for cited in definition.cited_sets() {
            if cited.value() >= self.next_set {
                return Err(LedgerError::undefined_set(
                    cited.value(),
                    format!("e {} {}", self.next_set, definition),
                ));
            }
        }
        let id = self.allocate_set_id();
        self.lines.push(SetRecord { id, definition }.to_string());
        Ok(id)
    }

    /// Define a set by its canonical diagram.
    pub fn define_expr(&mut self, expr: StateSetExpr) -> LedgerResult<SetId> {
        let dump = self.ledger.algebra.dump(expr);
        self.define_set(SetDefinition::Diagram(dump))
    }

    /// Define a set by enumerating full assignments.
    pub fn define_explicit(&mut self, states: &[Vec<usize>]) -> LedgerResult<SetId> {
        let encoding = self.ledger.algebra.encoding();
        let witnesses = states.iter().map(|s| encode_state(encoding, s)).collect();
        let fact_count = encoding.fact_count();
        self.define_set(SetDefinition::Explicit {
            fact_count,
            witnesses,
        })
    }

    /// Record a statement. Cited sets and premises must already be defined
    /// and the premises must have the kinds the rule expects.
    pub fn add_knowledge(
        &mut self,
        knowledge: Knowledge,
        justification: Justification,
    ) -> LedgerResult<KnowledgeId> {
        let record = KnowledgeRecord {
            id: KnowledgeId(self.next_knowledge),
            knowledge,
            justification,
        };

        for cited in knowledge.cited_sets() {
            if cited.value() >= self.next_set {
                return Err(LedgerError::undefined_set(cited.value(), record.to_string()));
            }
        }
        if let Some(reason) = record.justification.mismatch(&knowledge) {
            return Err(LedgerError::invalid_justification(reason, record.to_string()));
        }
        let expected = record.justification.rule.premise_kinds();
        for (premise, kind) in record.justification.premises.iter().zip(expected) {
            match self.lookup(*premise) {
                None => {
                    return Err(LedgerError::undefined_knowledge(
                        premise.value(),
                        record.to_string(),
                    ))
                }
                Some(found) if found.tag() != *kind => {
                    return Err(LedgerError::invalid_justification(
                        format!(
                            "premise {} is a '{}' statement, rule {} expects '{}'",
                            premise,
                            found.tag(),
                            record.justification.rule,
                            kind
                        ),
                        record.to_string(),
                    ))
                }
                Some(_) => {}
            }
        }

        let id = self.allocate_knowledge_id();
        self.lines.push(record.to_string());
        self.records.push(record);
        Ok(id)
    }

    fn lookup(&self, id: KnowledgeId) -> Option<Knowledge> {
        let committed = self.ledger.knowledge.len();
        if id.value() < committed {
            return Some(self.ledger.knowledge[id.value()].knowledge);
        }
        self.records
            .get(id.value() - committed)
            .map(|r| r.knowledge)
    }

    /// Append all buffered lines atomically and advance the ledger.
    pub fn commit(self) -> LedgerResult<GroupReceipt> {
        let receipt = GroupReceipt {
            first_set: SetId(self.ledger.next_set_id),
            sets: self.next_set - self.ledger.next_set_id,
            first_knowledge: KnowledgeId(self.ledger.next_knowledge_id),
            knowledge: self.next_knowledge - self.ledger.next_knowledge_id,
        };
        if self.lines.is_empty() {
            return Ok(receipt);
        }

        let mut text = self.lines.join("\n");
        text.push('\n');
        self.ledger.append(text.as_bytes())?;

        self.ledger.next_set_id = self.next_set;
        self.ledger.next_knowledge_id = self.next_knowledge;
        self.ledger.knowledge.extend(self.records);
        self.ledger.stats.record_commit(receipt.sets, receipt.knowledge);

        log_event_with_fields(
            Event::GroupCommitted,
            &[
                ("first_set", &receipt.first_set.to_string()),
                ("sets", &receipt.sets.to_string()),
                ("knowledge", &receipt.knowledge.to_string()),
            ],
        );
        Ok(receipt)
    }
}
