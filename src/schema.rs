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

//! # Schema Registry Module
//!
//! The registry derives, once per record type, the ordered list of persisted
//! fields and caches it under the type's identity. Every later write of the
//! same type takes the cached schema without scanning the fields again.
//!
//! Validation happens here and only here: a record type with an annotated
//! field of an unsupported kind is rejected the first time it is seen, before
//! any output is created for it, and the rejection is remembered so that
//! further writes of that type fail with the identical error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{LuError, Result};
use crate::record::{LuKind, LuRecord, LuRecordType};

/// Annotation flag marking a primary key field.
pub const PRIMARY_KEY_FLAG: &str = "pk";

/// One persisted field of a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LuFieldDescriptor {
    /// Field name as declared in the struct.
    pub exported_name: &'static str,
    /// Kind of the field's type.
    pub kind: LuKind,
    /// Column or key name used by every sink.
    pub label: String,
    /// Whether the field takes part in the primary key.
    pub primary_key: bool,
    /// Position of the field in the struct declaration.
    pub index: usize,
}

/// Ordered, immutable list of the persisted fields of one record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LuSchema {
    record_type: LuRecordType,
    fields: Vec<LuFieldDescriptor>,
}

impl LuSchema {
    pub fn record_type(&self) -> LuRecordType {
        self.record_type
    }

    pub fn name(&self) -> &'static str {
        self.record_type.name()
    }

    pub fn fields(&self) -> &[LuFieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// A schema with no fields has nothing to persist.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Output labels in field order.
    pub fn labels(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.label.as_str()).collect()
    }

    /// Labels of the primary key fields, in field order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| f.label.as_str())
            .collect()
    }
}

/// Splits an annotation into its label and primary key flag.
///
/// The label is the first comma separated segment; the field is a primary
/// key when the second segment is exactly `pk`.
pub fn parse_tag(tag: &str) -> (&str, bool) {
    let mut segments = tag.split(',');
    let label = segments.next().unwrap_or("");
    let primary_key = segments.next() == Some(PRIMARY_KEY_FLAG);
    (label, primary_key)
}

/// Outcome of registering a record.
#[derive(Clone, Debug)]
pub struct LuRegistration {
    pub record_type: LuRecordType,
    pub schema: Arc<LuSchema>,
    /// True only the first time the type is seen.
    pub newly_registered: bool,
}

/// Type-keyed cache of schemas.
#[derive(Debug, Default)]
pub struct LuSchemaRegistry {
    schemas: HashMap<LuRecordType, Arc<LuSchema>>,
    rejected: HashMap<LuRecordType, LuError>,
    scans: usize,
}

impl LuSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema for the record's type, deriving it on first sight.
    pub fn register(&mut self, record: &dyn LuRecord) -> Result<LuRegistration> {
        let record_type = record.record_type();

        if let Some(schema) = self.schemas.get(&record_type) {
            return Ok(LuRegistration {
                record_type,
                schema: Arc::clone(schema),
                newly_registered: false,
            });
        }
        if let Some(err) = self.rejected.get(&record_type) {
            return Err(err.clone());
        }

        self.scans += 1;
        match derive_schema(record_type, record) {
            Ok(schema) => {
                log::debug!(
                    "registered record type {} with {} field(s)",
                    record_type,
                    schema.len()
                );
                let schema = Arc::new(schema);
                self.schemas.insert(record_type, Arc::clone(&schema));
                Ok(LuRegistration {
                    record_type,
                    schema,
                    newly_registered: true,
                })
            }
            Err(err) => {
                self.rejected.insert(record_type, err.clone());
                Err(err)
            }
        }
    }

    /// Cached schema for a type, if it registered successfully.
    pub fn get(&self, record_type: &LuRecordType) -> Option<Arc<LuSchema>> {
        self.schemas.get(record_type).cloned()
    }

    /// Number of distinct record types registered successfully.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Number of field scans performed, one per distinct type seen.
    pub fn scans(&self) -> usize {
        self.scans
    }
}

fn derive_schema(record_type: LuRecordType, record: &dyn LuRecord) -> Result<LuSchema> {
    let mut fields = Vec::new();

    for (index, def) in record.fields().iter().enumerate() {
        let tag = match def.tag {
            Some(tag) if !tag.is_empty() => tag,
            _ => continue,
        };
        if !def.exported {
            continue;
        }
        // First offending field wins.
        if !def.kind.is_supported() {
            return Err(LuError::UnsupportedKind {
                kind: def.kind.to_string(),
                field: def.name.to_string(),
                record_type: record_type.name().to_string(),
            });
        }

        let (label, primary_key) = parse_tag(tag);
        fields.push(LuFieldDescriptor {
            exported_name: def.name,
            kind: def.kind,
            label: label.to_string(),
            primary_key,
            index,
        });
    }

    Ok(LuSchema {
        record_type,
        fields,
    })
}
