//! Planning task model
//!
//! The grounded finite-domain task the certificate is about: variables with
//! named values, operators with preconditions and effects, the initial state
//! and the goal. Loaded from JSON and validated once.

mod errors;
mod loader;
mod types;

pub use errors::{TaskError, TaskResult};
pub use types::{Effect, Fact, Operator, PlanningTask, Variable};
