//! Named-record container backing the `*_from_record` constructors.
//!
//! The container is a YAML mapping from record name (`/MOLECULE`, `/BASIS`,
//! ...) to the record payload.

use crate::status::{Status, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct RecordFile {
    path: PathBuf,
    records: BTreeMap<String, serde_yml::Value>,
}

impl RecordFile {
    pub fn open(path: &Path) -> Result<Self, Status> {
        let content = fs::read_to_string(path).map_err(|err| {
            Status::new(
                StatusCode::FILE_ACCESS,
                format!("unable to read {}: {err}", path.display()),
            )
        })?;
        let records = serde_yml::from_str::<BTreeMap<String, serde_yml::Value>>(&content)
            .map_err(|err| {
                Status::new(
                    StatusCode::RECORD_MALFORMED,
                    format!("{} is not a record container: {err}", path.display()),
                )
            })?;
        debug!(path = %path.display(), records = records.len(), "opened record file");
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T, Status> {
        let value = self.records.get(name).ok_or_else(|| {
            Status::new(
                StatusCode::RECORD_MISSING,
                format!("record {name} not found in {}", self.path.display()),
            )
        })?;
        serde_yml::from_value(value.clone()).map_err(|err| {
            Status::new(
                StatusCode::RECORD_MALFORMED,
                format!("record {name} in {}: {err}", self.path.display()),
            )
        })
    }
}

/// Opens `file` and reads a single record from it.
pub fn read_record<T: DeserializeOwned>(file: &Path, name: &str) -> Result<T, Status> {
    RecordFile::open(file)?.read(name)
}
