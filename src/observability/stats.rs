//! Run statistics
//!
//! Counters only, monotonic, reset per run. Reported in the CLI response.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub sets_defined: u64,
    pub knowledge_recorded: u64,
    pub groups_committed: u64,
    pub groups_reused: u64,
    pub dead_sets_proved: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one committed group.
    pub fn record_commit(&mut self, sets: usize, knowledge: usize) {
        self.sets_defined += sets as u64;
        self.knowledge_recorded += knowledge as u64;
        self.groups_committed += 1;
    }

    pub fn record_reuse(&mut self) {
        self.groups_reused += 1;
    }

    pub fn record_dead_set(&mut self) {
        self.dead_sets_proved += 1;
    }
}
