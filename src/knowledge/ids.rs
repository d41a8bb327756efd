//! Set and knowledge identifiers
//!
//! Both counters start at 0 and only grow. The first three set ids and the
//! first knowledge id are fixed by the ledger on creation.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SetId(pub usize);

impl SetId {
    /// The empty set
    pub const EMPTY: SetId = SetId(0);
    /// The goal states
    pub const GOAL: SetId = SetId(1);
    /// The singleton initial state
    pub const INIT: SetId = SetId(2);

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KnowledgeId(pub usize);

impl KnowledgeId {
    /// `Dead{empty}`, recorded as an axiom when the ledger is created
    pub const EMPTY_DEAD: KnowledgeId = KnowledgeId(0);

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for KnowledgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_ids() {
        assert_eq!(SetId::EMPTY.value(), 0);
        assert_eq!(SetId::GOAL.value(), 1);
        assert_eq!(SetId::INIT.value(), 2);
        assert_eq!(KnowledgeId::EMPTY_DEAD.value(), 0);
    }

    #[test]
    fn test_display_is_bare_number() {
        assert_eq!(SetId(17).to_string(), "17");
        assert_eq!(KnowledgeId(3).to_string(), "3");
    }
}
