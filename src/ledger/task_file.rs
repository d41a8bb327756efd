//! Task snapshot writer
//!
//! Writes the STRIPS view of the task that the certificate checker reads
//! next to the certificate. Atoms are the task's facts in fact-index order.
//! Finite-domain effects become an add effect plus a delete effect for
//! every other value of the same variable.
//!
//! Conditional effects cannot be expressed; the partially written file is
//! removed before the error is returned.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::stateset::FactEncoding;
use crate::task::{Fact, PlanningTask};

use super::errors::{LedgerError, LedgerResult};

/// Write the snapshot to `path`, replacing any existing file.
pub fn write_task_snapshot(
    task: &PlanningTask,
    encoding: &FactEncoding,
    path: &Path,
) -> LedgerResult<()> {
    let file = File::create(path)
        .map_err(|e| LedgerError::io_failed_at("create task snapshot", path, e))?;
    let mut writer = BufWriter::new(file);

    match write_body(task, encoding, &mut writer) {
        Ok(Body::Complete) => {
            let file = writer.into_inner().map_err(|e| {
                LedgerError::io_failed_at("flush task snapshot", path, e.into_error())
            })?;
            file.sync_all()
                .map_err(|e| LedgerError::io_failed_at("fsync task snapshot", path, e))?;
            Ok(())
        }
        Ok(Body::ConditionalEffect(op_name)) => {
            drop(writer);
            remove_partial(path)?;
            Err(LedgerError::unsupported_feature(format!(
                "operator '{}' has a conditional effect; task snapshot removed",
                op_name
            )))
        }
        Err(e) => {
            drop(writer);
            let _ = fs::remove_file(path);
            Err(LedgerError::io_failed_at("write task snapshot", path, e))
        }
    }
}

enum Body {
    Complete,
    ConditionalEffect(String),
}

fn write_body<W: Write>(
    task: &PlanningTask,
    encoding: &FactEncoding,
    w: &mut W,
) -> std::io::Result<Body> {
    writeln!(w, "begin_atoms:{}", encoding.fact_count())?;
    for index in 0..encoding.fact_count() {
        writeln!(w, "{}", task.fact_name(encoding.fact_at(index)))?;
    }
    writeln!(w, "end_atoms")?;

    writeln!(w, "begin_init")?;
    for (var, &value) in task.initial_state().iter().enumerate() {
        writeln!(w, "{}", encoding.index(Fact::new(var, value)))?;
    }
    writeln!(w, "end_init")?;

    writeln!(w, "begin_goal")?;
    for fact in &task.goal {
        writeln!(w, "{}", encoding.index(*fact))?;
    }
    writeln!(w, "end_goal")?;

    writeln!(w, "begin_actions:{}", task.operators.len())?;
    for op in &task.operators {
        writeln!(w, "begin_action")?;
        writeln!(w, "{}", op.name)?;
        writeln!(w, "cost: {}", op.cost)?;
        for pre in &op.preconditions {
            writeln!(w, "PRE:{}", encoding.index(*pre))?;
        }
        for effect in &op.effects {
            if effect.is_conditional() {
                return Ok(Body::ConditionalEffect(op.name.clone()));
            }
            let fact = effect.fact;
            writeln!(w, "ADD:{}", encoding.index(fact))?;
            for value in 0..encoding.domain_size(fact.var) {
                if value != fact.value {
                    writeln!(w, "DEL:{}", encoding.index(Fact::new(fact.var, value)))?;
                }
            }
        }
        writeln!(w, "end_action")?;
    }
    writeln!(w, "end_actions")?;
    Ok(Body::Complete)
}

fn remove_partial(path: &Path) -> LedgerResult<()> {
    fs::remove_file(path)
        .map_err(|e| LedgerError::io_failed_at("remove partial task snapshot", path, e))
}
