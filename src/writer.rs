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

//! # Writer Core Module
//!
//! [`LuWriter`] is the contract every writer offers: `write` records of any
//! number of types, then `close` to publish or `cancel` to discard.
//!
//! [`LuSchemaWriter`] implements that contract once, on top of a small
//! [`LuBackend`] that knows a single output format. The core owns:
//!
//! - the schema registry, consulted on every write
//! - one sink per record type, opened on the first write of that type and
//!   reused afterwards
//! - the `Open → Closed | Cancelled` state machine
//!
//! Close and cancel visit every opened sink even when some of them fail,
//! and report the last failure seen.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{LuEmptySchemaPolicy, LuWriterConfig};
use crate::errors::{LuError, Result};
use crate::extract::extract;
use crate::record::{LuRecord, LuRecordType};
use crate::schema::{LuSchema, LuSchemaRegistry};
use crate::staging::{LuStagingAllocator, LuStagingArea};
use crate::value::LuValueRow;

/// Uniform write, close and cancel protocol.
pub trait LuWriter {
    /// Persists one record.
    fn write(&mut self, record: &dyn LuRecord) -> Result<()>;

    /// Publishes everything written so far. A no-op once closed or cancelled.
    fn close(&mut self) -> Result<()>;

    /// Discards everything written so far. A no-op once closed or cancelled.
    fn cancel(&mut self) -> Result<()>;
}

impl<W: LuWriter + ?Sized> LuWriter for Box<W> {
    fn write(&mut self, record: &dyn LuRecord) -> Result<()> {
        (**self).write(record)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn cancel(&mut self) -> Result<()> {
        (**self).cancel()
    }
}

/// One output format.
///
/// A backend opens a sink per record type. Each sink owns a staged output
/// that `publish` makes visible and `discard` deletes.
pub trait LuBackend {
    type Sink;

    /// Short format name used in logs.
    fn name(&self) -> &'static str;

    /// Creates the staged output for a schema and writes its preamble.
    fn open(&mut self, schema: &LuSchema) -> Result<Self::Sink>;

    /// Appends one row, ordered as the schema's fields.
    fn append(&mut self, sink: &mut Self::Sink, schema: &LuSchema, row: &LuValueRow) -> Result<()>;

    /// Flushes, syncs and atomically publishes the sink's output.
    fn publish(&mut self, sink: Self::Sink) -> Result<()>;

    /// Deletes the sink's output without publishing it.
    fn discard(&mut self, sink: Self::Sink) -> Result<()>;

    /// Runs after every sink was published.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs after every sink was discarded.
    fn abort(&mut self) -> Result<()> {
        Ok(())
    }

    /// Staging area, for backends that stage files.
    fn staging(&mut self) -> Option<&mut LuStagingArea> {
        None
    }
}

/// Lifecycle state of a writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LuWriterState {
    Open,
    Closed,
    Cancelled,
}

impl LuWriterState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LuWriterState::Open)
    }
}

/// Counters collected over a writer's life.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuWriteStats {
    pub records_written: usize,
    pub outputs_opened: usize,
    pub outputs_published: usize,
    pub outputs_discarded: usize,
}

struct LuSlot<S> {
    schema: Arc<LuSchema>,
    /// `None` for a type with nothing to persist.
    sink: Option<S>,
    rows: usize,
}

/// Writer core shared by every format backend.
pub struct LuSchemaWriter<B: LuBackend> {
    backend: B,
    config: LuWriterConfig,
    registry: LuSchemaRegistry,
    slots: Vec<LuSlot<B::Sink>>,
    index: HashMap<LuRecordType, usize>,
    /// Output names taken by an opened sink, keyed by type name.
    claimed: HashMap<&'static str, LuRecordType>,
    state: LuWriterState,
    stats: LuWriteStats,
}

impl<B: LuBackend> LuSchemaWriter<B> {
    pub fn with_backend(backend: B, config: LuWriterConfig) -> Self {
        Self {
            backend,
            config,
            registry: LuSchemaRegistry::new(),
            slots: Vec::new(),
            index: HashMap::new(),
            claimed: HashMap::new(),
            state: LuWriterState::Open,
            stats: LuWriteStats::default(),
        }
    }

    /// Replaces the allocator used to name staged files.
    pub fn with_allocator(mut self, allocator: impl LuStagingAllocator + 'static) -> Self {
        if let Some(staging) = self.backend.staging() {
            staging.set_allocator(Box::new(allocator));
        }
        self
    }

    pub fn state(&self) -> LuWriterState {
        self.state
    }

    pub fn stats(&self) -> &LuWriteStats {
        &self.stats
    }

    pub fn registry(&self) -> &LuSchemaRegistry {
        &self.registry
    }

    pub fn config(&self) -> &LuWriterConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn slot_for(&mut self, record: &dyn LuRecord) -> Result<usize> {
        let registration = self.registry.register(record)?;
        let schema = registration.schema;

        if schema.is_empty() && self.config.empty_schema == LuEmptySchemaPolicy::Reject {
            return Err(LuError::schema(format!(
                "record type {} has no annotated exported fields",
                schema.name()
            )));
        }
        if let Some(&slot) = self.index.get(&registration.record_type) {
            return Ok(slot);
        }

        let sink = if schema.is_empty() {
            log::debug!(
                "record type {} has no persisted fields; no {} output",
                schema.name(),
                self.backend.name()
            );
            None
        } else {
            // Outputs are named after the type: one type per name.
            if let Some(owner) = self.claimed.get(schema.name()) {
                return Err(LuError::schema(format!(
                    "record types {} and {} both write the {} output {}",
                    owner.path(),
                    registration.record_type.path(),
                    self.backend.name(),
                    schema.name()
                )));
            }
            let sink = self.backend.open(&schema)?;
            self.claimed.insert(schema.name(), registration.record_type);
            self.stats.outputs_opened += 1;
            log::debug!("opened {} output for {}", self.backend.name(), schema.name());
            Some(sink)
        };

        self.slots.push(LuSlot {
            schema,
            sink,
            rows: 0,
        });
        let slot = self.slots.len() - 1;
        self.index.insert(registration.record_type, slot);
        Ok(slot)
    }
}

impl<B: LuBackend> LuWriter for LuSchemaWriter<B> {
    fn write(&mut self, record: &dyn LuRecord) -> Result<()> {
        if self.state.is_terminal() {
            return Err(LuError::ClosedWriter);
        }

        let slot = self.slot_for(record)?;
        let slot = &mut self.slots[slot];
        let sink = match slot.sink.as_mut() {
            Some(sink) => sink,
            None => return Ok(()),
        };

        let row = extract(record, &slot.schema)?;
        self.backend.append(sink, &slot.schema, &row)?;
        slot.rows += 1;
        self.stats.records_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        self.state = LuWriterState::Closed;

        let mut last_err = None;
        for slot in self.slots.drain(..) {
            let Some(sink) = slot.sink else { continue };
            match self.backend.publish(sink) {
                Ok(()) => {
                    self.stats.outputs_published += 1;
                    log::info!(
                        "published {} output for {} ({} rows)",
                        self.backend.name(),
                        slot.schema.name(),
                        slot.rows
                    );
                }
                Err(err) => {
                    log::error!(
                        "failed to publish {} output for {}: {}",
                        self.backend.name(),
                        slot.schema.name(),
                        err
                    );
                    last_err = Some(err);
                }
            }
        }
        if let Err(err) = self.backend.finish() {
            log::error!("failed to finish {} writer: {}", self.backend.name(), err);
            last_err = Some(err);
        }
        self.index.clear();
        self.claimed.clear();

        last_err.map_or(Ok(()), Err)
    }

    fn cancel(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        self.state = LuWriterState::Cancelled;

        let mut last_err = None;
        for slot in self.slots.drain(..) {
            let Some(sink) = slot.sink else { continue };
            match self.backend.discard(sink) {
                Ok(()) => self.stats.outputs_discarded += 1,
                Err(err) => {
                    log::error!(
                        "failed to discard {} output for {}: {}",
                        self.backend.name(),
                        slot.schema.name(),
                        err
                    );
                    last_err = Some(err);
                }
            }
        }
        if let Err(err) = self.backend.abort() {
            log::error!("failed to abort {} writer: {}", self.backend.name(), err);
            last_err = Some(err);
        }
        self.index.clear();
        self.claimed.clear();

        last_err.map_or(Ok(()), Err)
    }
}

impl<B: LuBackend> Drop for LuSchemaWriter<B> {
    fn drop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        if !self.slots.is_empty() {
            log::warn!(
                "{} writer dropped while open; discarding {} output(s)",
                self.backend.name(),
                self.slots.len()
            );
        }
        let _ = self.cancel();
    }
}
