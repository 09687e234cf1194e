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

//! Value extraction: reads a record's persisted fields, in schema order.

use std::collections::HashMap;

use crate::errors::{LuError, Result};
use crate::record::LuRecord;
use crate::schema::LuSchema;
use crate::value::{LuValue, LuValueRow};

/// Reads the record's values in the schema's field order.
///
/// The schema must have been produced by the registry for this record's type.
pub fn extract(record: &dyn LuRecord, schema: &LuSchema) -> Result<LuValueRow> {
    if record.record_type() != schema.record_type() {
        return Err(LuError::schema(format!(
            "record of type {} extracted against schema of {}",
            record.record_type(),
            schema.record_type()
        )));
    }

    schema
        .fields()
        .iter()
        .map(|field| {
            record.value_at(field.index).ok_or_else(|| {
                LuError::internal(format!(
                    "no scalar value for {}.{}",
                    schema.name(),
                    field.exported_name
                ))
            })
        })
        .collect()
}

/// Reads the record's values keyed by output label.
pub fn extract_as_map(record: &dyn LuRecord, schema: &LuSchema) -> Result<HashMap<String, LuValue>> {
    let row = extract(record, schema)?;
    Ok(schema
        .fields()
        .iter()
        .map(|field| field.label.clone())
        .zip(row)
        .collect())
}

/// Reads the record's values as display strings keyed by output label.
pub fn extract_strings_as_map(
    record: &dyn LuRecord,
    schema: &LuSchema,
) -> Result<HashMap<String, String>> {
    Ok(extract_as_map(record, schema)?
        .into_iter()
        .map(|(label, value)| (label, value.to_string()))
        .collect())
}
