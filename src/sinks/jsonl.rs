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

//! JSON Lines outputs: one object per record, keyed by label, keys sorted.

use std::io::Write;

use serde_json::{Map, Value};

use crate::config::LuWriterConfig;
use crate::errors::{LuError, Result};
use crate::schema::LuSchema;
use crate::staging::{LuOutputStream, LuStagedFile, LuStagingArea};
use crate::value::LuValueRow;
use crate::writer::{LuBackend, LuSchemaWriter};

pub struct LuJsonlBackend {
    config: LuWriterConfig,
    staging: LuStagingArea,
}

impl LuJsonlBackend {
    pub fn new(config: LuWriterConfig) -> Self {
        Self {
            staging: LuStagingArea::new(&config),
            config,
        }
    }
}

pub struct LuJsonlSink {
    staged: LuStagedFile,
    stream: LuOutputStream,
}

impl LuBackend for LuJsonlBackend {
    type Sink = LuJsonlSink;

    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn open(&mut self, schema: &LuSchema) -> Result<Self::Sink> {
        let extension = format!(".jsonl{}", self.config.compression.extension());
        let target = self.config.output_path(schema.name(), &extension);
        let (staged, file) = self.staging.stage(&target)?;
        let stream = LuOutputStream::new(file, self.config.compression)?;
        Ok(LuJsonlSink { staged, stream })
    }

    fn append(&mut self, sink: &mut Self::Sink, schema: &LuSchema, row: &LuValueRow) -> Result<()> {
        if row.len() != schema.len() {
            return Err(LuError::internal(format!(
                "row of {} values for {} fields of {}",
                row.len(),
                schema.len(),
                schema.name()
            )));
        }
        let object: Map<String, Value> = schema
            .fields()
            .iter()
            .zip(row)
            .map(|(field, value)| (field.label.clone(), value.to_json()))
            .collect();

        serde_json::to_writer(&mut sink.stream, &object)?;
        sink.stream.write_all(b"\n")?;
        Ok(())
    }

    fn publish(&mut self, sink: Self::Sink) -> Result<()> {
        let file = sink.stream.finish()?;
        let path = sink.staged.commit(file)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn discard(&mut self, sink: Self::Sink) -> Result<()> {
        let LuJsonlSink { staged, stream } = sink;
        drop(stream);
        staged.discard()
    }

    fn staging(&mut self) -> Option<&mut LuStagingArea> {
        Some(&mut self.staging)
    }
}

/// Writes each record type to its own `.jsonl` file.
pub type LuJsonlWriter = LuSchemaWriter<LuJsonlBackend>;

impl LuSchemaWriter<LuJsonlBackend> {
    /// Output names are `prefix + TypeName + suffix + ".jsonl"`.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::with_config(LuWriterConfig::new(prefix, suffix))
    }

    pub fn with_config(config: LuWriterConfig) -> Self {
        Self::with_backend(LuJsonlBackend::new(config.clone()), config)
    }
}
