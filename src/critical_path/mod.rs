//! Critical-path heuristic dead sets
//!
//! [`HmTable`] computes the h^m cost of every tuple of at most `m` facts
//! from a state; [`TupleDeadSetExtractor`] turns its unreachable tuples
//! into a dead set recorded in the ledger.

mod extractor;
mod table;

pub use extractor::{check_no_conditional_effects, select_tuples, TupleDeadSetExtractor};
pub use table::{Cost, HmTable};
