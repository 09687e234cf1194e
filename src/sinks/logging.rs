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

//! Log output: one line per record, `<Type> label: value label: value`.
//!
//! Lines go to the `log` facade at a chosen level, or to any byte stream.
//! Nothing is staged, so close and cancel only report themselves when the
//! backend is verbose.

use std::fmt;
use std::io::Write;

use crate::config::LuWriterConfig;
use crate::errors::Result;
use crate::schema::LuSchema;
use crate::value::LuValueRow;
use crate::writer::{LuBackend, LuSchemaWriter};

/// Destination of log lines.
pub enum LuLogOutput {
    Log(log::Level),
    Stream(Box<dyn Write + Send>),
}

impl fmt::Debug for LuLogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuLogOutput::Log(level) => f.debug_tuple("Log").field(level).finish(),
            LuLogOutput::Stream(_) => f.write_str("Stream"),
        }
    }
}

#[derive(Debug)]
pub struct LuLogBackend {
    output: LuLogOutput,
    verbose: bool,
}

impl Default for LuLogBackend {
    fn default() -> Self {
        Self::new(LuLogOutput::Log(log::Level::Info))
    }
}

impl LuLogBackend {
    pub fn new(output: LuLogOutput) -> Self {
        Self {
            output,
            verbose: false,
        }
    }

    pub fn to_stream(stream: impl Write + Send + 'static) -> Self {
        Self::new(LuLogOutput::Stream(Box::new(stream)))
    }

    /// Also log close and cancel calls.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn emit(&mut self, line: &str) -> Result<()> {
        match &mut self.output {
            LuLogOutput::Log(level) => log::log!(*level, "{}", line),
            LuLogOutput::Stream(stream) => {
                stream.write_all(line.as_bytes())?;
                stream.write_all(b"\n")?;
                stream.flush()?;
            }
        }
        Ok(())
    }
}

/// Formats one record as a log line.
pub fn format_line(schema: &LuSchema, row: &LuValueRow) -> String {
    let mut line = format!("<{}>", schema.name());
    for (field, value) in schema.fields().iter().zip(row) {
        line.push(' ');
        line.push_str(&field.label);
        line.push(':');
        let rendered = value.to_string();
        if !rendered.is_empty() {
            line.push(' ');
            line.push_str(&rendered);
        }
    }
    line
}

impl LuBackend for LuLogBackend {
    type Sink = ();

    fn name(&self) -> &'static str {
        "log"
    }

    fn open(&mut self, _schema: &LuSchema) -> Result<Self::Sink> {
        Ok(())
    }

    fn append(&mut self, _sink: &mut Self::Sink, schema: &LuSchema, row: &LuValueRow) -> Result<()> {
        let line = format_line(schema, row);
        self.emit(&line)
    }

    fn publish(&mut self, _sink: Self::Sink) -> Result<()> {
        Ok(())
    }

    fn discard(&mut self, _sink: Self::Sink) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.verbose {
            self.emit("Called LuLogWriter.Close")?;
        }
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        if self.verbose {
            self.emit("Called LuLogWriter.Cancel")?;
        }
        Ok(())
    }
}

/// Logs every record as one line of text.
pub type LuLogWriter = LuSchemaWriter<LuLogBackend>;

impl LuSchemaWriter<LuLogBackend> {
    /// Logs through the `log` facade at info level.
    pub fn new() -> Self {
        Self::with_backend(LuLogBackend::default(), LuWriterConfig::default())
    }

    /// Writes lines to `stream`.
    pub fn to_stream(stream: impl Write + Send + 'static) -> Self {
        Self::with_backend(LuLogBackend::to_stream(stream), LuWriterConfig::default())
    }
}

impl Default for LuSchemaWriter<LuLogBackend> {
    fn default() -> Self {
        Self::new()
    }
}
