//! Boolean set algebra over states
//!
//! Sets of full assignments are represented canonically, so equality of
//! handles is equality of the denoted sets and subset tests are exact.
//!
//! Values introduced by grounding to complete a Boolean variable's domain
//! are detected here and excluded from dead-set construction by the
//! extractors.

mod algebra;
mod dump;
mod encoding;
mod tuple;

pub use crate::task::Fact;
pub use algebra::{SetAlgebra, StateSetExpr};
pub use dump::{DumpNode, NodeDump};
pub use encoding::{is_bookkeeping_name, FactEncoding};
pub use tuple::Tuple;
