//! Completion manifest
//!
//! `manifest.json` is written last, after the certificate has been synced.
//! A proof directory without it is incomplete.
//!
//! Format:
//! ```json
//! {
//!   "created_at": "2026-02-04T11:30:00Z",
//!   "certificate_checksum": "crc32:deadbeef",
//!   "task_checksum": "crc32:abcd1234",
//!   "set_count": 12,
//!   "knowledge_count": 9,
//!   "format_version": 1
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::errors::{LedgerError, LedgerResult};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateManifest {
    /// RFC3339 timestamp
    pub created_at: String,

    /// CRC32 of certificate.txt (format: "crc32:XXXXXXXX")
    pub certificate_checksum: String,

    /// CRC32 of task.txt, if a task snapshot was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_checksum: Option<String>,

    pub set_count: usize,
    pub knowledge_count: usize,

    /// Manifest format version (always 1)
    pub format_version: u8,
}

impl CertificateManifest {
    pub fn new(
        certificate_checksum: impl Into<String>,
        task_checksum: Option<String>,
        set_count: usize,
        knowledge_count: usize,
    ) -> Self {
        Self {
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            certificate_checksum: certificate_checksum.into(),
            task_checksum,
            set_count,
            knowledge_count,
            format_version: 1,
        }
    }

    /// Writes the manifest as pretty JSON with fsync.
    pub fn write_to_file(&self, path: &Path) -> LedgerResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            LedgerError::io_failed(format!("Failed to serialize manifest: {}", e), e.into())
        })?;

        let mut file = File::create(path)
            .map_err(|e| LedgerError::io_failed_at("create manifest", path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| LedgerError::io_failed_at("write manifest", path, e))?;
        file.sync_all()
            .map_err(|e| LedgerError::io_failed_at("fsync manifest", path, e))?;
        Ok(())
    }

    pub fn read_from_file(path: &Path) -> LedgerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::io_failed_at("read manifest", path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            LedgerError::io_failed(format!("Failed to parse manifest: {}", e), e.into())
        })
    }
}

/// CRC32 of a whole file, read in chunks.
pub fn compute_file_checksum(path: &Path) -> LedgerResult<u32> {
    let file = File::open(path).map_err(|e| LedgerError::io_failed_at("open", path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| LedgerError::io_failed_at("read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Format: `crc32:XXXXXXXX` (lowercase hex, zero-padded)
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_checksum() {
        assert_eq!(format_checksum(0xDEADBEEF), "crc32:deadbeef");
        assert_eq!(format_checksum(0x1), "crc32:00000001");
    }

    #[test]
    fn test_file_checksum_matches_in_memory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.txt");
        std::fs::write(&path, b"e 0 c e\n").unwrap();

        let mut hasher = Hasher::new();
        hasher.update(b"e 0 c e\n");
        assert_eq!(compute_file_checksum(&path).unwrap(), hasher.finalize());
    }

    #[test]
    fn test_manifest_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE);
        let manifest = CertificateManifest::new("crc32:deadbeef", None, 5, 3);
        manifest.write_to_file(&path).unwrap();

        let read = CertificateManifest::read_from_file(&path).unwrap();
        assert_eq!(read, manifest);
        assert_eq!(read.format_version, 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&read.created_at).is_ok());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("task_checksum"));
    }
}
