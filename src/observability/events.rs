//! Observable events of a certificate run
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Inputs
    /// Configuration loaded
    ConfigLoaded,
    /// Task loaded and validated
    TaskLoaded,
    /// Merge tree loaded and validated
    MergeTreeLoaded,

    // Ledger
    /// Certificate opened, predefined sets and axiom written
    LedgerOpened,
    /// A leftover certificate from an earlier run was removed
    StaleOutputRemoved,
    /// A buffered group of lines was appended and synced
    GroupCommitted,
    /// A state was covered by an earlier dead group
    GroupReused,
    /// A dead set was derived and recorded
    DeadSetProved,
    /// Task snapshot written
    TaskSnapshotWritten,
    /// Completion manifest written
    ManifestWritten,
    /// All proof output was removed after a failure
    ProofDiscarded,

    // Extractors
    /// Critical-path table computed
    HmTableComputed,
    /// Baseline mutex sets built
    MutexesBuilt,

    // Outcome
    /// Unsolvability concluded
    UnsolvabilityProved,
    /// The initial state could not be shown dead
    NotProvable,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TaskLoaded => "TASK_LOADED",
            Event::MergeTreeLoaded => "MERGE_TREE_LOADED",

            Event::LedgerOpened => "LEDGER_OPENED",
            Event::StaleOutputRemoved => "STALE_OUTPUT_REMOVED",
            Event::GroupCommitted => "GROUP_COMMITTED",
            Event::GroupReused => "GROUP_REUSED",
            Event::DeadSetProved => "DEAD_SET_PROVED",
            Event::TaskSnapshotWritten => "TASK_SNAPSHOT_WRITTEN",
            Event::ManifestWritten => "MANIFEST_WRITTEN",
            Event::ProofDiscarded => "PROOF_DISCARDED",

            Event::HmTableComputed => "HM_TABLE_COMPUTED",
            Event::MutexesBuilt => "MUTEXES_BUILT",

            Event::UnsolvabilityProved => "UNSOLVABILITY_PROVED",
            Event::NotProvable => "NOT_PROVABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::GroupCommitted | Event::GroupReused | Event::MutexesBuilt => Severity::Trace,
            Event::StaleOutputRemoved | Event::ProofDiscarded | Event::NotProvable => {
                Severity::Warn
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
