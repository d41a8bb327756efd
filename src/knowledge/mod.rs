//! Knowledge statements
//!
//! The closed set of statements a certificate can assert about sets of
//! states, plus the inference rule and premises that justify each one.

mod ids;

use std::fmt;

use serde::Serialize;

pub use ids::{KnowledgeId, SetId};

/// A provable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Knowledge {
    /// `left ⊆ right`
    Subset { left: SetId, right: SetId },
    /// No state in `set` can reach the goal
    Dead { set: SetId },
    /// The initial state is dead
    Unsolvable,
}

impl Knowledge {
    /// Kind token used in certificate lines.
    pub fn tag(&self) -> char {
        match self {
            Knowledge::Subset { .. } => 's',
            Knowledge::Dead { .. } => 'd',
            Knowledge::Unsolvable => 'u',
        }
    }

    /// Set ids this statement refers to.
    pub fn cited_sets(&self) -> Vec<SetId> {
        match self {
            Knowledge::Subset { left, right } => vec![*left, *right],
            Knowledge::Dead { set } => vec![*set],
            Knowledge::Unsolvable => vec![],
        }
    }

    /// The dead set, if this is a `Dead` statement.
    pub fn dead_set(&self) -> Option<SetId> {
        match self {
            Knowledge::Dead { set } => Some(*set),
            _ => None,
        }
    }
}

/// Inference rules understood by the certificate checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    /// Axiom: the empty set is dead
    D1,
    /// Subset checked directly on the set definitions
    B1,
    /// Progression of S is contained in S ∪ T
    B2,
    /// Explicit state set contained in another set
    B4,
    /// Union of two dead sets is dead
    D2,
    /// Subset of a dead set is dead
    D3,
    /// Dead initial state means unsolvable
    D4,
    /// Progression closed up to dead sets, and no goal state
    D6,
}

impl Rule {
    pub fn token(&self) -> &'static str {
        match self {
            Rule::D1 => "d1",
            Rule::B1 => "b1",
            Rule::B2 => "b2",
            Rule::B4 => "b4",
            Rule::D2 => "d2",
            Rule::D3 => "d3",
            Rule::D4 => "d4",
            Rule::D6 => "d6",
        }
    }

    /// Kind tags of the premises, in citation order.
    pub fn premise_kinds(&self) -> &'static [char] {
        match self {
            Rule::D1 | Rule::B1 | Rule::B2 | Rule::B4 => &[],
            Rule::D2 => &['d', 'd'],
            Rule::D3 => &['s', 'd'],
            Rule::D4 => &['d'],
            Rule::D6 => &['s', 'd', 'd'],
        }
    }

    pub fn premise_count(&self) -> usize {
        self.premise_kinds().len()
    }

    /// The statement kind this rule concludes.
    pub fn concludes(&self) -> char {
        match self {
            Rule::B1 | Rule::B2 | Rule::B4 => 's',
            Rule::D1 | Rule::D2 | Rule::D3 | Rule::D6 => 'd',
            Rule::D4 => 'u',
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Rule plus cited knowledge ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Justification {
    pub rule: Rule,
    pub premises: Vec<KnowledgeId>,
}

impl Justification {
    pub fn new(rule: Rule, premises: Vec<KnowledgeId>) -> Self {
        Self { rule, premises }
    }

    /// A rule without premises.
    pub fn basic(rule: Rule) -> Self {
        Self::new(rule, Vec::new())
    }

    /// Returns a description of the mismatch between the rule and the
    /// statement it is attached to, if any.
    pub fn mismatch(&self, knowledge: &Knowledge) -> Option<String> {
        if self.rule.concludes() != knowledge.tag() {
            return Some(format!(
                "rule {} cannot conclude a '{}' statement",
                self.rule,
                knowledge.tag()
            ));
        }
        if self.premises.len() != self.rule.premise_count() {
            return Some(format!(
                "rule {} takes {} premises, got {}",
                self.rule,
                self.rule.premise_count(),
                self.premises.len()
            ));
        }
        None
    }
}

/// A numbered statement as written to the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeRecord {
    pub id: KnowledgeId,
    pub knowledge: Knowledge,
    pub justification: Justification,
}

impl fmt::Display for KnowledgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k {} {}", self.id, self.knowledge.tag())?;
        match self.knowledge {
            Knowledge::Subset { left, right } => write!(f, " {} {}", left, right)?,
            Knowledge::Dead { set } => write!(f, " {}", set)?,
            Knowledge::Unsolvable => {}
        }
        write!(f, " {}", self.justification.rule)?;
        for premise in &self.justification.premises {
            write!(f, " {}", premise)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lines() {
        let axiom = KnowledgeRecord {
            id: KnowledgeId(0),
            knowledge: Knowledge::Dead { set: SetId::EMPTY },
            justification: Justification::basic(Rule::D1),
        };
        assert_eq!(axiom.to_string(), "k 0 d 0 d1");

        let subset = KnowledgeRecord {
            id: KnowledgeId(4),
            knowledge: Knowledge::Subset {
                left: SetId(5),
                right: SetId(6),
            },
            justification: Justification::basic(Rule::B2),
        };
        assert_eq!(subset.to_string(), "k 4 s 5 6 b2");

        let unsolvable = KnowledgeRecord {
            id: KnowledgeId(9),
            knowledge: Knowledge::Unsolvable,
            justification: Justification::new(Rule::D4, vec![KnowledgeId(8)]),
        };
        assert_eq!(unsolvable.to_string(), "k 9 u d4 8");
    }

    #[test]
    fn test_cited_sets() {
        let k = Knowledge::Subset {
            left: SetId(3),
            right: SetId(1),
        };
        assert_eq!(k.cited_sets(), vec![SetId(3), SetId(1)]);
        assert!(Knowledge::Unsolvable.cited_sets().is_empty());
        assert_eq!(Knowledge::Dead { set: SetId(7) }.dead_set(), Some(SetId(7)));
    }

    #[test]
    fn test_premise_kinds() {
        assert_eq!(Rule::D6.premise_count(), 3);
        assert_eq!(Rule::D3.premise_kinds(), &['s', 'd']);
        assert_eq!(Rule::D1.premise_count(), 0);
        assert_eq!(Rule::D4.concludes(), 'u');
    }

    #[test]
    fn test_justification_mismatch() {
        let dead = Knowledge::Dead { set: SetId(4) };
        assert!(Justification::new(Rule::D3, vec![KnowledgeId(1), KnowledgeId(0)])
            .mismatch(&dead)
            .is_none());
        assert!(Justification::basic(Rule::D3).mismatch(&dead).is_some());
        assert!(Justification::basic(Rule::B1).mismatch(&dead).is_some());
    }
}
