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

//! CSV and TSV outputs.
//!
//! The first row holds the schema's labels; every later row holds one
//! record's values in field order, rendered as plain text.

use std::marker::PhantomData;

use csv::{Writer, WriterBuilder};

use crate::config::LuWriterConfig;
use crate::errors::{LuError, Result};
use crate::schema::LuSchema;
use crate::staging::{LuOutputStream, LuStagedFile, LuStagingArea};
use crate::value::LuValueRow;
use crate::writer::{LuBackend, LuSchemaWriter};

/// Delimiter and naming of a delimited text format.
pub trait LuDelimitedFormat {
    const NAME: &'static str;
    const DELIMITER: u8;
    const EXTENSION: &'static str;
}

/// Comma separated values.
#[derive(Debug)]
pub struct LuCsv;

impl LuDelimitedFormat for LuCsv {
    const NAME: &'static str = "csv";
    const DELIMITER: u8 = b',';
    const EXTENSION: &'static str = ".csv";
}

/// Tab separated values.
#[derive(Debug)]
pub struct LuTsv;

impl LuDelimitedFormat for LuTsv {
    const NAME: &'static str = "tsv";
    const DELIMITER: u8 = b'\t';
    const EXTENSION: &'static str = ".tsv";
}

pub struct LuDelimitedBackend<F: LuDelimitedFormat> {
    config: LuWriterConfig,
    staging: LuStagingArea,
    format: PhantomData<F>,
}

impl<F: LuDelimitedFormat> LuDelimitedBackend<F> {
    pub fn new(config: LuWriterConfig) -> Self {
        Self {
            staging: LuStagingArea::new(&config),
            config,
            format: PhantomData,
        }
    }
}

pub struct LuDelimitedSink {
    staged: LuStagedFile,
    writer: Writer<LuOutputStream>,
}

impl<F: LuDelimitedFormat> LuBackend for LuDelimitedBackend<F> {
    type Sink = LuDelimitedSink;

    fn name(&self) -> &'static str {
        F::NAME
    }

    fn open(&mut self, schema: &LuSchema) -> Result<Self::Sink> {
        let extension = format!("{}{}", F::EXTENSION, self.config.compression.extension());
        let target = self.config.output_path(schema.name(), &extension);
        let (staged, file) = self.staging.stage(&target)?;
        let stream = LuOutputStream::new(file, self.config.compression)?;

        let mut writer = WriterBuilder::new()
            .delimiter(F::DELIMITER)
            .from_writer(stream);
        writer.write_record(schema.labels())?;

        Ok(LuDelimitedSink { staged, writer })
    }

    fn append(&mut self, sink: &mut Self::Sink, _schema: &LuSchema, row: &LuValueRow) -> Result<()> {
        sink.writer
            .write_record(row.iter().map(|value| value.to_string()))?;
        Ok(())
    }

    fn publish(&mut self, sink: Self::Sink) -> Result<()> {
        let LuDelimitedSink { staged, writer } = sink;
        let stream = writer
            .into_inner()
            .map_err(|err| LuError::Io(err.error().to_string()))?;
        let file = stream.finish()?;
        let path = staged.commit(file)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn discard(&mut self, sink: Self::Sink) -> Result<()> {
        let LuDelimitedSink { staged, writer } = sink;
        drop(writer);
        staged.discard()
    }

    fn staging(&mut self) -> Option<&mut LuStagingArea> {
        Some(&mut self.staging)
    }
}

/// Writes each record type to its own `.csv` file.
pub type LuCsvWriter = LuSchemaWriter<LuDelimitedBackend<LuCsv>>;

/// Writes each record type to its own `.tsv` file.
pub type LuTsvWriter = LuSchemaWriter<LuDelimitedBackend<LuTsv>>;

impl LuSchemaWriter<LuDelimitedBackend<LuCsv>> {
    /// Output names are `prefix + TypeName + suffix + ".csv"`.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::with_config(LuWriterConfig::new(prefix, suffix))
    }

    pub fn with_config(config: LuWriterConfig) -> Self {
        Self::with_backend(LuDelimitedBackend::new(config.clone()), config)
    }
}

impl LuSchemaWriter<LuDelimitedBackend<LuTsv>> {
    /// Output names are `prefix + TypeName + suffix + ".tsv"`.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::with_config(LuWriterConfig::new(prefix, suffix))
    }

    pub fn with_config(config: LuWriterConfig) -> Self {
        Self::with_backend(LuDelimitedBackend::new(config.clone()), config)
    }
}
