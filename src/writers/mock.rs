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

//! # Mock Writer Module
//!
//! [`LuMockWriter`] keeps everything written to it in memory, so code that
//! produces records can be tested without touching the filesystem:
//!
//! ```rust,ignore
//! use lu::writers::LuMockWriter;
//! use lu::writer::LuWriter;
//!
//! let mut writer = LuMockWriter::new();
//! writer.write(&foo)?;
//! writer.close()?;
//! assert_eq!(writer.headers["Foo"], vec!["foo_string", "foo_int"]);
//! assert_eq!(writer.data["Foo"][0]["foo_int"], "1");
//! ```
//!
//! Records go through the same schema registry as every other writer, so an
//! unsupported field is reported here too.

use std::collections::{HashMap, HashSet};

use crate::errors::{LuError, Result};
use crate::extract::extract_strings_as_map;
use crate::record::LuRecord;
use crate::schema::LuSchemaRegistry;
use crate::writer::{LuWriter, LuWriterState};

#[derive(Debug)]
pub struct LuMockWriter {
    /// Labels of each record type, keyed by type name.
    pub headers: HashMap<String, Vec<String>>,
    /// Captured rows of each record type, keyed by type name.
    pub data: HashMap<String, Vec<HashMap<String, String>>>,
    /// Type names whose rows are not captured.
    pub disable_data_capture: HashSet<String>,
    pub called_write: usize,
    pub called_close: usize,
    pub called_cancel: usize,
    registry: LuSchemaRegistry,
    state: LuWriterState,
}

impl Default for LuMockWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LuMockWriter {
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
            data: HashMap::new(),
            disable_data_capture: HashSet::new(),
            called_write: 0,
            called_close: 0,
            called_cancel: 0,
            registry: LuSchemaRegistry::new(),
            state: LuWriterState::Open,
        }
    }

    /// Stops capturing rows of the named record type.
    pub fn disable_capture(mut self, type_name: impl Into<String>) -> Self {
        self.disable_data_capture.insert(type_name.into());
        self
    }

    pub fn state(&self) -> LuWriterState {
        self.state
    }
}

impl LuWriter for LuMockWriter {
    fn write(&mut self, record: &dyn LuRecord) -> Result<()> {
        self.called_write += 1;
        if self.state.is_terminal() {
            return Err(LuError::ClosedWriter);
        }

        let registration = self.registry.register(record)?;
        let schema = registration.schema;
        let name = schema.name().to_string();
        if registration.newly_registered {
            self.headers.insert(
                name.clone(),
                schema.labels().into_iter().map(String::from).collect(),
            );
        }

        if self.disable_data_capture.contains(&name) {
            return Ok(());
        }
        let row = extract_strings_as_map(record, &schema)?;
        self.data.entry(name).or_default().push(row);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.called_close += 1;
        if !self.state.is_terminal() {
            self.state = LuWriterState::Closed;
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        self.called_cancel += 1;
        if !self.state.is_terminal() {
            self.state = LuWriterState::Cancelled;
        }
        Ok(())
    }
}
