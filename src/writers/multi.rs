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

use crate::errors::Result;
use crate::record::LuRecord;
use crate::writer::LuWriter;

/// Fans every call out to several writers.
///
/// Every inner writer is called, in order, even after one of them fails.
/// `write` reports the first error; `close` and `cancel` report the last.
#[derive(Default)]
pub struct LuMultiWriter {
    writers: Vec<Box<dyn LuWriter + Send>>,
}

impl LuMultiWriter {
    pub fn new(writers: Vec<Box<dyn LuWriter + Send>>) -> Self {
        Self { writers }
    }

    pub fn with_writer(mut self, writer: impl LuWriter + Send + 'static) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    pub fn into_inner(self) -> Vec<Box<dyn LuWriter + Send>> {
        self.writers
    }
}

impl LuWriter for LuMultiWriter {
    fn write(&mut self, record: &dyn LuRecord) -> Result<()> {
        let mut first_err = None;
        for writer in &mut self.writers {
            if let Err(err) = writer.write(record) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn close(&mut self) -> Result<()> {
        let mut last_err = None;
        for writer in &mut self.writers {
            if let Err(err) = writer.close() {
                last_err = Some(err);
            }
        }
        last_err.map_or(Ok(()), Err)
    }

    fn cancel(&mut self) -> Result<()> {
        let mut last_err = None;
        for writer in &mut self.writers {
            if let Err(err) = writer.cancel() {
                last_err = Some(err);
            }
        }
        last_err.map_or(Ok(()), Err)
    }
}
