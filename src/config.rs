//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Lu.
//! The Lu project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Writer Configuration Module
//!
//! [`LuWriterConfig`] collects the settings shared by the file and database
//! writers. It can be built in code, or loaded from JSON or YAML:
//!
//! ```yaml
//! prefix: "out/report-"
//! suffix: "-2024"
//! create_directories: true
//! empty_schema: skip
//! conflict: replace
//! compression: gzip
//! ```
//!
//! Missing keys take their default values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LuError, Result};
use crate::staging::default_staging_dir;

/// What to do with a record type that has no persisted fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LuEmptySchemaPolicy {
    /// Accept the writes and produce no output for the type.
    #[default]
    Skip,
    /// Fail every write of the type with a schema error.
    Reject,
}

/// Insert behavior when a row collides with an existing primary key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LuConflictPolicy {
    /// Keep the existing row and drop the new one.
    #[default]
    Ignore,
    /// Replace the existing row with the new one.
    Replace,
    /// Fail the write.
    Abort,
}

impl LuConflictPolicy {
    /// SQL verb for an insert under this policy.
    pub fn insert_verb(self) -> &'static str {
        match self {
            LuConflictPolicy::Ignore => "INSERT OR IGNORE",
            LuConflictPolicy::Replace => "INSERT OR REPLACE",
            LuConflictPolicy::Abort => "INSERT",
        }
    }
}

/// Compression applied to text outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LuCompression {
    #[default]
    None,
    Gzip,
    Zstd,
}

impl LuCompression {
    /// Extension appended to the output name, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            LuCompression::None => "",
            LuCompression::Gzip => ".gz",
            LuCompression::Zstd => ".zst",
        }
    }
}

/// Configuration shared by the Lu writers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuWriterConfig {
    /// Prepended to the record type name in every output name.
    pub prefix: String,
    /// Appended to the record type name, before the extension.
    pub suffix: String,
    /// Directory for staged outputs. Defaults to the output's own directory.
    pub staging_dir: Option<PathBuf>,
    /// Create missing parent directories of the outputs.
    pub create_directories: bool,
    /// Handling of record types without persisted fields.
    pub empty_schema: LuEmptySchemaPolicy,
    /// Primary key collision handling for database outputs.
    pub conflict: LuConflictPolicy,
    /// Compression for CSV, TSV and JSON Lines outputs.
    pub compression: LuCompression,
}

impl Default for LuWriterConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            staging_dir: None,
            create_directories: false,
            empty_schema: LuEmptySchemaPolicy::Skip,
            conflict: LuConflictPolicy::Ignore,
            compression: LuCompression::None,
        }
    }
}

impl LuWriterConfig {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| LuError::validation(format!("invalid writer config JSON: {}", e)))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| LuError::validation(format!("invalid writer config YAML: {}", e)))
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn with_create_directories(mut self, create: bool) -> Self {
        self.create_directories = create;
        self
    }

    pub fn with_empty_schema(mut self, policy: LuEmptySchemaPolicy) -> Self {
        self.empty_schema = policy;
        self
    }

    pub fn with_conflict(mut self, policy: LuConflictPolicy) -> Self {
        self.conflict = policy;
        self
    }

    pub fn with_compression(mut self, compression: LuCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Output path for a record type: `prefix + name + suffix + extension`.
    pub fn output_path(&self, type_name: &str, extension: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}{}{}{}",
            self.prefix, type_name, self.suffix, extension
        ))
    }

    /// Directory that receives staged outputs for `target`.
    pub fn staging_dir_for(&self, target: &Path) -> PathBuf {
        match &self.staging_dir {
            Some(dir) => dir.clone(),
            None => default_staging_dir(target),
        }
    }
}
