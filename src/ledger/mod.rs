//! Proof ledger
//!
//! The single authority for set and knowledge ids and for everything
//! written to the proof directory:
//!
//! - `certificate.txt`: the append-only certificate
//! - `task.txt`: the task snapshot the checker reads alongside it
//! - `manifest.json`: written last, marks the proof complete
//!
//! One ledger is created per run and passed by `&mut` to every producer.
//! On creation the predefined sets `empty = 0`, `goal = 1`, `init = 2` and
//! the axiom `k 0 d 0 d1` are written before anything else.
//!
//! Lines are only ever written through a [`CertificateGroup`], one atomic
//! append per group.

mod definition;
mod errors;
mod group;
mod history;
mod manifest;
mod task_file;
mod witness;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::knowledge::{Justification, Knowledge, KnowledgeId, KnowledgeRecord, Rule, SetId};
use crate::observability::{log_event_with_fields, Event, RunStats};
use crate::stateset::{FactEncoding, SetAlgebra, StateSetExpr};
use crate::task::PlanningTask;

pub use definition::{Predefined, SetDefinition, SetRecord};
pub use errors::{LedgerError, LedgerErrorCode, LedgerResult, Severity};
pub use group::{CertificateGroup, GroupReceipt};
pub use history::{DeadGroup, DeadGroupHistory, DeadSetRef};
pub use manifest::{compute_file_checksum, format_checksum, CertificateManifest, MANIFEST_FILE};
pub use task_file::write_task_snapshot;
pub use witness::{decode_state, encode_state};

pub const CERTIFICATE_FILE: &str = "certificate.txt";
pub const TASK_FILE: &str = "task.txt";

pub struct ProofLedger {
    output_dir: PathBuf,
    certificate_path: PathBuf,
    sink: File,
    task: PlanningTask,
    algebra: SetAlgebra,
    goal: StateSetExpr,
    next_set_id: usize,
    next_knowledge_id: usize,
    knowledge: Vec<KnowledgeRecord>,
    history: DeadGroupHistory,
    stats: RunStats,
    task_snapshot_written: bool,
    /// A failed append could not be truncated away
    torn: bool,
}

impl ProofLedger {
    /// Open `<output_dir>/certificate.txt` and write the predefined block.
    ///
    /// The directory is created if absent. Output left by an earlier run is
    /// removed first, the manifest before anything else.
    pub fn initialize(output_dir: &Path, task: &PlanningTask) -> LedgerResult<Self> {
        fs::create_dir_all(output_dir)
            .map_err(|e| LedgerError::io_failed_at("create output directory", output_dir, e))?;

        for name in [MANIFEST_FILE, TASK_FILE, CERTIFICATE_FILE] {
            let path = output_dir.join(name);
            if remove_if_present(&path)? {
                log_event_with_fields(
                    Event::StaleOutputRemoved,
                    &[("path", &path.display().to_string())],
                );
            }
        }

        let certificate_path = output_dir.join(CERTIFICATE_FILE);
        let sink = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&certificate_path)
            .map_err(|e| LedgerError::io_failed_at("open certificate", &certificate_path, e))?;

        let mut algebra = SetAlgebra::new(FactEncoding::new(task));
        let mut goal = StateSetExpr::ALL;
        for fact in &task.goal {
            let f = algebra.fact(*fact);
            goal = algebra.and(goal, f);
        }

        let mut ledger = Self {
            output_dir: output_dir.to_path_buf(),
            certificate_path,
            sink,
            task: task.clone(),
            algebra,
            goal,
            next_set_id: 0,
            next_knowledge_id: 0,
            knowledge: Vec::new(),
            history: DeadGroupHistory::new(),
            stats: RunStats::new(),
            task_snapshot_written: false,
            torn: false,
        };

        let mut group = ledger.begin_group();
        for predefined in [Predefined::Empty, Predefined::Goal, Predefined::Init] {
            group.define_set(SetDefinition::Predefined(predefined))?;
        }
        group.add_knowledge(
            Knowledge::Dead {
                set: SetId::EMPTY,
            },
            Justification::basic(Rule::D1),
        )?;
        group.commit()?;

        log_event_with_fields(
            Event::LedgerOpened,
            &[("path", &ledger.certificate_path.display().to_string())],
        );
        Ok(ledger)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn certificate_path(&self) -> &Path {
        &self.certificate_path
    }

    pub fn task(&self) -> &PlanningTask {
        &self.task
    }

    pub fn algebra(&mut self) -> &mut SetAlgebra {
        &mut self.algebra
    }

    pub fn encoding(&self) -> &FactEncoding {
        self.algebra.encoding()
    }

    /// The goal states as an expression.
    pub fn goal(&self) -> StateSetExpr {
        self.goal
    }

    /// Id the next defined set will get.
    pub fn next_set_id(&self) -> SetId {
        SetId(self.next_set_id)
    }

    /// Id the next recorded knowledge will get.
    pub fn next_knowledge_id(&self) -> KnowledgeId {
        KnowledgeId(self.next_knowledge_id)
    }

    /// Every knowledge record written so far, indexed by id.
    pub fn knowledge(&self) -> &[KnowledgeRecord] {
        &self.knowledge
    }

    pub fn history(&self) -> &DeadGroupHistory {
        &self.history
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Start a buffered group of lines.
    pub fn begin_group(&mut self) -> CertificateGroup<'_> {
        CertificateGroup::new(self)
    }

    /// Define a single set in its own group.
    pub fn record_set(&mut self, definition: SetDefinition) -> LedgerResult<SetId> {
        let mut group = self.begin_group();
        let id = group.define_set(definition)?;
        group.commit()?;
        Ok(id)
    }

    /// Record a single statement in its own group.
    pub fn record_knowledge(
        &mut self,
        knowledge: Knowledge,
        justification: Justification,
    ) -> LedgerResult<KnowledgeId> {
        let mut group = self.begin_group();
        let id = group.add_knowledge(knowledge, justification)?;
        group.commit()?;
        Ok(id)
    }

    fn append(&mut self, bytes: &[u8]) -> LedgerResult<()> {
        self.append_with(|sink| sink.write_all(bytes))
    }

    /// Run `write` against the sink and fsync. On failure the certificate is
    /// truncated back to its length before the write; if that fails too the
    /// ledger refuses further appends.
    fn append_with(&mut self, write: impl FnOnce(&mut File) -> io::Result<()>) -> LedgerResult<()> {
        if self.torn {
            return Err(LedgerError::io_failed_at(
                "append to certificate",
                &self.certificate_path,
                io::Error::new(io::ErrorKind::Other, "an earlier append left a torn line"),
            ));
        }

        let committed_len = self
            .sink
            .metadata()
            .map_err(|e| LedgerError::io_failed_at("stat certificate", &self.certificate_path, e))?
            .len();

        let written = write(&mut self.sink).and_then(|()| self.sink.sync_all());
        if let Err(e) = written {
            let rolled_back = self
                .sink
                .set_len(committed_len)
                .and_then(|()| self.sink.sync_all());
            if rolled_back.is_err() {
                self.torn = true;
            }
            return Err(LedgerError::io_failed_at(
                "append to certificate",
                &self.certificate_path,
                e,
            ));
        }
        Ok(())
    }

    /// An earlier dead group containing `state`, if any.
    pub fn covering_group(&mut self, state: &[usize]) -> Option<DeadSetRef> {
        let singleton = self.algebra.from_state(state);
        let found = self.history.covering(&mut self.algebra, singleton);
        if let Some(dead) = found {
            self.stats.record_reuse();
            log_event_with_fields(
                Event::GroupReused,
                &[
                    ("set", &dead.set.to_string()),
                    ("knowledge", &dead.knowledge.to_string()),
                ],
            );
        }
        found
    }

    pub fn register_dead_group(
        &mut self,
        members: Vec<StateSetExpr>,
        conjunction: StateSetExpr,
        dead: DeadSetRef,
    ) {
        self.history.register(DeadGroup {
            members,
            conjunction,
            dead,
        });
    }

    /// Prove the conjunction of `members` dead and remember the group.
    ///
    /// The set must be closed under progression and contain no goal state;
    /// the emitted derivation is
    ///
    /// ```text
    /// e S b ...            conjunction of members
    /// e P p S 0
    /// e U u S 0
    /// k . s P U b2
    /// e I i S 1
    /// k . s I 0 b1
    /// k . d I d3 <I ⊆ empty> 0
    /// k . d S d6 <prog> 0 <I dead>
    /// ```
    pub fn prove_dead_set(&mut self, members: Vec<StateSetExpr>) -> LedgerResult<DeadSetRef> {
        let conjunction = self.algebra.and_all(&members);

        let mut group = self.begin_group();
        let s = group.define_expr(conjunction)?;
        let progression = group.define_set(SetDefinition::Progression(s))?;
        let union = group.define_set(SetDefinition::Union(s, SetId::EMPTY))?;
        let k_prog = group.add_knowledge(
            Knowledge::Subset {
                left: progression,
                right: union,
            },
            Justification::basic(Rule::B2),
        )?;
        let goal_part = group.define_set(SetDefinition::Intersection(s, SetId::GOAL))?;
        let k_goal_empty = group.add_knowledge(
            Knowledge::Subset {
                left: goal_part,
                right: SetId::EMPTY,
            },
            Justification::basic(Rule::B1),
        )?;
        let k_goal_dead = group.add_knowledge(
            Knowledge::Dead { set: goal_part },
            Justification::new(Rule::D3, vec![k_goal_empty, KnowledgeId::EMPTY_DEAD]),
        )?;
        let k_dead = group.add_knowledge(
            Knowledge::Dead { set: s },
            Justification::new(
                Rule::D6,
                vec![k_prog, KnowledgeId::EMPTY_DEAD, k_goal_dead],
            ),
        )?;
        group.commit()?;

        let dead = DeadSetRef {
            set: s,
            knowledge: k_dead,
        };
        self.register_dead_group(members, conjunction, dead);
        self.stats.record_dead_set();
        log_event_with_fields(
            Event::DeadSetProved,
            &[
                ("set", &s.to_string()),
                ("knowledge", &k_dead.to_string()),
                ("nodes", &self.algebra.node_count(conjunction).to_string()),
            ],
        );
        Ok(dead)
    }

    /// Hex witness for a full assignment.
    pub fn encode_state(&self, state: &[usize]) -> String {
        encode_state(self.algebra.encoding(), state)
    }

    pub fn decode_state(&self, hex: &str) -> LedgerResult<Vec<usize>> {
        decode_state(self.algebra.encoding(), hex)
    }

    /// Write `<output_dir>/task.txt`.
    pub fn emit_task_snapshot(&mut self) -> LedgerResult<PathBuf> {
        let path = self.output_dir.join(TASK_FILE);
        write_task_snapshot(&self.task, self.algebra.encoding(), &path)?;
        self.task_snapshot_written = true;
        log_event_with_fields(
            Event::TaskSnapshotWritten,
            &[
                ("path", &path.display().to_string()),
                ("actions", &self.task.operators.len().to_string()),
            ],
        );
        Ok(path)
    }

    /// Sync the certificate and write the completion manifest.
    pub fn finish(&mut self) -> LedgerResult<CertificateManifest> {
        self.sink
            .sync_all()
            .map_err(|e| LedgerError::io_failed_at("fsync certificate", &self.certificate_path, e))?;

        let certificate_checksum = format_checksum(compute_file_checksum(&self.certificate_path)?);
        let task_checksum = if self.task_snapshot_written {
            let path = self.output_dir.join(TASK_FILE);
            Some(format_checksum(compute_file_checksum(&path)?))
        } else {
            None
        };

        let manifest = CertificateManifest::new(
            certificate_checksum,
            task_checksum,
            self.next_set_id,
            self.next_knowledge_id,
        );
        let path = self.output_dir.join(MANIFEST_FILE);
        manifest.write_to_file(&path)?;

        log_event_with_fields(
            Event::ManifestWritten,
            &[
                ("path", &path.display().to_string()),
                ("checksum", &manifest.certificate_checksum),
            ],
        );
        Ok(manifest)
    }

    /// Remove everything this run wrote to the proof directory.
    pub fn discard(self) -> LedgerResult<()> {
        for name in [MANIFEST_FILE, TASK_FILE, CERTIFICATE_FILE] {
            remove_if_present(&self.output_dir.join(name))?;
        }
        log_event_with_fields(
            Event::ProofDiscarded,
            &[("output_dir", &self.output_dir.display().to_string())],
        );
        Ok(())
    }
}

/// Remove `path`; `Ok(false)` if it did not exist.
fn remove_if_present(path: &Path) -> LedgerResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LedgerError::io_failed_at("remove", path, e)),
    }
}

impl Drop for ProofLedger {
    fn drop(&mut self) {
        let _ = self.sink.sync_all();
    }
}
