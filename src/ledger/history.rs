//! Previously proven dead groups
//!
//! Each group is the list of member expressions whose conjunction was
//! proven dead. A later state is already covered when it lies in every
//! member of some group; no new certificate lines are needed for it.

use crate::knowledge::{KnowledgeId, SetId};
use crate::stateset::{SetAlgebra, StateSetExpr};

/// A dead set in the certificate and the knowledge proving it dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeadSetRef {
    pub set: SetId,
    pub knowledge: KnowledgeId,
}

#[derive(Debug, Clone)]
pub struct DeadGroup {
    pub members: Vec<StateSetExpr>,
    pub conjunction: StateSetExpr,
    pub dead: DeadSetRef,
}

#[derive(Debug, Default)]
pub struct DeadGroupHistory {
    groups: Vec<DeadGroup>,
}

impl DeadGroupHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, group: DeadGroup) {
        self.groups.push(group);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[DeadGroup] {
        &self.groups
    }

    /// First group whose every member is a superset of `singleton`.
    pub fn covering(
        &self,
        algebra: &mut SetAlgebra,
        singleton: StateSetExpr,
    ) -> Option<DeadSetRef> {
        self.groups
            .iter()
            .find(|g| {
                g.members
                    .iter()
                    .all(|m| algebra.is_subset_of(singleton, *m))
            })
            .map(|g| g.dead)
    }
}
