//! unsolvcert - unsolvability certificates for classical planning
//!
//! Builds an independently checkable proof that a finite-domain planning
//! task has no plan. Dead sets come from a critical-path table or from a
//! merge-and-shrink merge tree; the proof ledger writes them as an
//! append-only certificate.

pub mod cli;
pub mod critical_path;
pub mod knowledge;
pub mod ledger;
pub mod merge_tree;
pub mod observability;
pub mod proof;
pub mod stateset;
pub mod task;
