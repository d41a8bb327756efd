//! CLI command implementations
//!
//! `certify` follows a fixed sequence:
//!
//! 1. Load and validate the configuration
//! 2. Load and validate the task (and the merge tree, if selected)
//! 3. Open the ledger; the predefined block is written
//! 4. Show the initial state dead with the selected extractor
//! 5. Conclude unsolvability
//! 6. Write the task snapshot, then the manifest
//!
//! Any failure after step 3 discards the proof directory contents so no
//! partial proof is left on disk.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::critical_path::{check_no_conditional_effects, HmTable, TupleDeadSetExtractor};
use crate::ledger::{write_task_snapshot, DeadSetRef, ProofLedger, TASK_FILE};
use crate::merge_tree::{MergeTree, MergeTreeDeadSetExtractor};
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope, Severity};
use crate::proof::{conclude_unsolvable, prove_init_dead};
use crate::stateset::FactEncoding;
use crate::task::PlanningTask;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Which extractor proves the initial state dead
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    #[default]
    CriticalPath,
    MergeTree,
}

impl ExtractorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorKind::CriticalPath => "critical_path",
            ExtractorKind::MergeTree => "merge_tree",
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Proof directory (required)
    pub output_dir: String,

    /// Task JSON (required)
    pub task_path: String,

    /// Extractor (optional, default "critical_path")
    #[serde(default)]
    pub extractor: ExtractorKind,

    /// Tuple size bound for the critical-path table (optional, default 2)
    #[serde(default = "default_m")]
    pub m: usize,

    /// Merge tree JSON (required for the merge_tree extractor)
    #[serde(default)]
    pub merge_tree_path: Option<String>,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether `certify` writes task.txt (optional, default true)
    #[serde(default = "default_write_task_snapshot")]
    pub write_task_snapshot: bool,
}

fn default_m() -> usize {
    2
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_write_task_snapshot() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.output_dir.trim().is_empty() {
            return Err(CliError::config_error("output_dir must not be empty"));
        }

        if self.task_path.trim().is_empty() {
            return Err(CliError::config_error("task_path must not be empty"));
        }

        if self.m == 0 {
            return Err(CliError::config_error("m must be >= 1"));
        }

        if self.extractor == ExtractorKind::MergeTree && self.merge_tree_path.is_none() {
            return Err(CliError::config_error(
                "merge_tree_path is required for the merge_tree extractor",
            ));
        }

        self.log_severity()?;

        Ok(())
    }

    fn log_severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn, error or fatal.",
                self.log_level
            ))
        })
    }

    /// Get output directory as Path
    pub fn output_path(&self) -> &Path {
        Path::new(&self.output_dir)
    }

    pub fn task_path(&self) -> &Path {
        Path::new(&self.task_path)
    }
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Certify { config } => certify(&config),
        Command::Snapshot { config } => snapshot(&config),
    }
}

/// Prove the configured task unsolvable.
pub fn certify(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let task = load_task(&config)?;
    let tree = match config.extractor {
        ExtractorKind::MergeTree => Some(load_merge_tree(&config, &task)?),
        ExtractorKind::CriticalPath => None,
    };

    let scope = ObservationScope::with_fields(
        "CERTIFY",
        &[
            ("extractor", config.extractor.as_str()),
            ("output_dir", &config.output_dir),
        ],
    );

    let mut ledger = match ProofLedger::initialize(config.output_path(), &task) {
        Ok(ledger) => ledger,
        Err(e) => {
            scope.fail_fatal(&e.to_string());
            return Err(e.into());
        }
    };

    match build_proof(&config, tree.as_ref(), &mut ledger) {
        Ok(data) => {
            scope.complete_with_fields(&[
                ("sets", &ledger.next_set_id().to_string()),
                ("knowledge", &ledger.next_knowledge_id().to_string()),
            ]);
            write_response(data)
        }
        Err(e) => {
            scope.fail_fatal(&e.to_string());
            if let Err(discard_err) = ledger.discard() {
                Logger::error(
                    "PROOF_DISCARD_FAILED",
                    &[("reason", &discard_err.to_string())],
                );
            }
            Err(e)
        }
    }
}

/// Write only `<output_dir>/task.txt`.
pub fn snapshot(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let task = load_task(&config)?;

    let scope = ObservationScope::with_fields("SNAPSHOT", &[("output_dir", &config.output_dir)]);

    if let Err(e) = fs::create_dir_all(config.output_path()) {
        scope.fail_fatal(&e.to_string());
        return Err(CliError::io_error(format!(
            "Failed to create output directory: {}",
            e
        )));
    }

    let encoding = FactEncoding::new(&task);
    let path = config.output_path().join(TASK_FILE);
    if let Err(e) = write_task_snapshot(&task, &encoding, &path) {
        scope.fail_fatal(&e.to_string());
        return Err(e.into());
    }

    let path_str = path.display().to_string();
    let actions = task.operators.len().to_string();
    log_event_with_fields(
        Event::TaskSnapshotWritten,
        &[("path", &path_str), ("actions", &actions)],
    );
    scope.complete_with_fields(&[("actions", &actions)]);

    write_response(json!({
        "task_snapshot": path_str,
        "facts": encoding.fact_count(),
        "actions": task.operators.len(),
    }))
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("path", &config_path.display().to_string()),
            ("extractor", config.extractor.as_str()),
        ],
    );
    Ok(config)
}

fn load_task(config: &Config) -> CliResult<PlanningTask> {
    let task = PlanningTask::load(config.task_path())?;
    log_event_with_fields(
        Event::TaskLoaded,
        &[
            ("path", &config.task_path),
            ("variables", &task.num_variables().to_string()),
            ("operators", &task.operators.len().to_string()),
        ],
    );
    Ok(task)
}

fn load_merge_tree(config: &Config, task: &PlanningTask) -> CliResult<MergeTree> {
    let path = config
        .merge_tree_path
        .as_deref()
        .ok_or_else(|| CliError::config_error("merge_tree_path is not set"))?;
    let tree = MergeTree::load(Path::new(path))?;
    tree.validate(task)?;
    log_event_with_fields(
        Event::MergeTreeLoaded,
        &[
            ("path", path),
            ("leaves", &tree.variables().len().to_string()),
        ],
    );
    Ok(tree)
}

fn build_proof(
    config: &Config,
    tree: Option<&MergeTree>,
    ledger: &mut ProofLedger,
) -> CliResult<Value> {
    let init = ledger.task().initial_state().to_vec();
    let dead = match tree {
        Some(tree) => dead_set_from_merge_tree(tree, ledger, &init)?,
        None => dead_set_from_critical_path(config.m, ledger, &init)?,
    };

    let init_dead = prove_init_dead(ledger, dead)?;
    let unsolvable = conclude_unsolvable(ledger, init_dead)?;
    log_event_with_fields(
        Event::UnsolvabilityProved,
        &[("knowledge", &unsolvable.to_string())],
    );

    let task_snapshot = if config.write_task_snapshot {
        Some(ledger.emit_task_snapshot()?.display().to_string())
    } else {
        None
    };
    let manifest = ledger.finish()?;

    Ok(json!({
        "extractor": config.extractor.as_str(),
        "certificate": ledger.certificate_path().display().to_string(),
        "task_snapshot": task_snapshot,
        "dead_set": dead.set.value(),
        "unsolvable": unsolvable.value(),
        "manifest": serde_json::to_value(&manifest)?,
        "stats": serde_json::to_value(ledger.stats())?,
    }))
}

fn dead_set_from_critical_path(
    m: usize,
    ledger: &mut ProofLedger,
    init: &[usize],
) -> CliResult<DeadSetRef> {
    check_no_conditional_effects(ledger)?;
    let table = HmTable::compute(ledger.task(), m, init);
    let unreachable = table.infinite_tuples().len();
    log_event_with_fields(
        Event::HmTableComputed,
        &[
            ("m", &m.to_string()),
            ("tuples", &table.len().to_string()),
            ("unreachable", &unreachable.to_string()),
        ],
    );

    let goal_cost = table.goal_cost(&ledger.task().goal);
    if !goal_cost.is_infinite() {
        log_event_with_fields(
            Event::NotProvable,
            &[("extractor", "critical_path"), ("goal_cost", &goal_cost.to_string())],
        );
        return Err(CliError::not_provable(format!(
            "h^{} goal cost from the initial state is {}",
            m, goal_cost
        )));
    }

    let mut extractor = TupleDeadSetExtractor::new();
    Ok(extractor.certify(ledger, &table, init)?)
}

fn dead_set_from_merge_tree(
    tree: &MergeTree,
    ledger: &mut ProofLedger,
    init: &[usize],
) -> CliResult<DeadSetRef> {
    if let Some(index) = tree.abstract_index(init) {
        log_event_with_fields(
            Event::NotProvable,
            &[("extractor", "merge_tree"), ("abstract_index", &index.to_string())],
        );
        return Err(CliError::not_provable(format!(
            "initial state maps to abstract state {}, which is not pruned",
            index
        )));
    }

    let extractor = MergeTreeDeadSetExtractor::new(tree, ledger.task())?;
    Ok(extractor.certify(ledger, init)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use crate::ledger::{CertificateManifest, CERTIFICATE_FILE, MANIFEST_FILE};
    use tempfile::TempDir;

    const UNSOLVABLE_TASK: &str = r#"{
        "variables": [
            {"name": "var0", "values": ["Atom p()", "Atom q()"]},
            {"name": "var1", "values": ["Atom r()", "Atom s()"]}
        ],
        "operators": [],
        "initial_state": [0, 0],
        "goal": [{"var": 0, "value": 1}]
    }"#;

    const SOLVABLE_TASK: &str = r#"{
        "variables": [
            {"name": "var0", "values": ["Atom p()", "Atom q()"]}
        ],
        "operators": [
            {"name": "flip", "preconditions": [], "effects": [{"fact": {"var": 0, "value": 1}}]}
        ],
        "initial_state": [0],
        "goal": [{"var": 0, "value": 1}]
    }"#;

    const CONDITIONAL_TASK: &str = r#"{
        "variables": [
            {"name": "pos", "values": ["Atom at(a)", "Atom at(b)", "Atom at(c)"]},
            {"name": "sw", "values": ["Atom x()", "Atom y()"]}
        ],
        "operators": [
            {
                "name": "go",
                "preconditions": [{"var": 0, "value": 0}],
                "effects": [
                    {"fact": {"var": 0, "value": 1}, "conditions": [{"var": 1, "value": 0}]},
                    {"fact": {"var": 0, "value": 2}, "conditions": [{"var": 1, "value": 1}]}
                ]
            }
        ],
        "initial_state": [0, 0],
        "goal": [{"var": 0, "value": 1}]
    }"#;

    fn write_config(dir: &Path, task_json: &str, extra: &str) -> std::path::PathBuf {
        let task_path = dir.join("task.json");
        fs::write(&task_path, task_json).unwrap();
        let config_path = dir.join("unsolvcert.json");
        let config = format!(
            r#"{{"output_dir": "{}", "task_path": "{}"{}}}"#,
            dir.join("proof").display(),
            task_path.display(),
            extra
        );
        fs::write(&config_path, config).unwrap();
        config_path
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), UNSOLVABLE_TASK, "");
        let config = Config::load(&path).unwrap();

        assert_eq!(config.extractor, ExtractorKind::CriticalPath);
        assert_eq!(config.m, 2);
        assert_eq!(config.log_level, "info");
        assert!(config.write_task_snapshot);
        assert!(config.merge_tree_path.is_none());
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        for extra in [
            r#", "m": 0"#,
            r#", "extractor": "merge_tree""#,
            r#", "log_level": "verbose""#,
            r#", "extractor": "landmarks""#,
        ] {
            let path = write_config(temp_dir.path(), UNSOLVABLE_TASK, extra);
            let err = Config::load(&path).unwrap_err();
            assert_eq!(*err.code(), CliErrorCode::ConfigError, "{}", extra);
        }
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_certify_writes_complete_proof() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), UNSOLVABLE_TASK, "");
        certify(&path).unwrap();

        let proof_dir = temp_dir.path().join("proof");
        let certificate = fs::read_to_string(proof_dir.join(CERTIFICATE_FILE)).unwrap();
        assert!(certificate.starts_with("e 0 c e\ne 1 c g\ne 2 c i\nk 0 d 0 d1\n"));
        assert!(certificate.lines().last().unwrap().contains(" u d4 "));
        assert!(proof_dir.join(TASK_FILE).exists());

        let manifest = CertificateManifest::read_from_file(&proof_dir.join(MANIFEST_FILE)).unwrap();
        assert!(manifest.task_checksum.is_some());
        assert_eq!(manifest.format_version, 1);
    }

    #[test]
    fn test_certify_not_provable_discards_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), SOLVABLE_TASK, "");
        let err = certify(&path).unwrap_err();

        assert_eq!(err.exit_code(), 7);
        let proof_dir = temp_dir.path().join("proof");
        assert!(!proof_dir.join(CERTIFICATE_FILE).exists());
        assert!(!proof_dir.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_certify_refuses_conditional_effects() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            temp_dir.path(),
            CONDITIONAL_TASK,
            r#", "write_task_snapshot": false"#,
        );
        let err = certify(&path).unwrap_err();

        assert_eq!(*err.code(), CliErrorCode::UnsupportedFeature);
        assert_eq!(err.exit_code(), 6);
        let proof_dir = temp_dir.path().join("proof");
        assert!(!proof_dir.join(CERTIFICATE_FILE).exists());
        assert!(!proof_dir.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_certify_with_merge_tree() {
        let temp_dir = TempDir::new().unwrap();
        let tree_path = temp_dir.path().join("tree.json");
        fs::write(
            &tree_path,
            r#"{"merge": {
                "left":  {"leaf": {"var": 0, "lookup": [null, 0]}},
                "right": {"leaf": {"var": 1, "lookup": [0, 0]}},
                "table": [[0]]
            }}"#,
        )
        .unwrap();
        let extra = format!(
            r#", "extractor": "merge_tree", "merge_tree_path": "{}", "write_task_snapshot": false"#,
            tree_path.display()
        );
        let path = write_config(temp_dir.path(), UNSOLVABLE_TASK, &extra);
        certify(&path).unwrap();

        let proof_dir = temp_dir.path().join("proof");
        assert!(proof_dir.join(CERTIFICATE_FILE).exists());
        assert!(!proof_dir.join(TASK_FILE).exists());
        let manifest = CertificateManifest::read_from_file(&proof_dir.join(MANIFEST_FILE)).unwrap();
        assert!(manifest.task_checksum.is_none());
    }

    #[test]
    fn test_snapshot_command() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), SOLVABLE_TASK, "");
        snapshot(&path).unwrap();

        let proof_dir = temp_dir.path().join("proof");
        assert!(proof_dir.join(TASK_FILE).exists());
        assert!(!proof_dir.join(CERTIFICATE_FILE).exists());
    }
}
