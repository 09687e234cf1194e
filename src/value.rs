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

//! # Scalar Value Module
//!
//! [`LuValue`] is the typed scalar read out of one record field. Every sink
//! receives the same ordered row of values and picks its own coercion:
//!
//! - text sinks (CSV, TSV, log, mock) use the `Display` form
//! - the JSON Lines sink uses [`LuValue::to_json`]
//! - the SQLite sink binds values natively
//! - the spreadsheet sink maps text, booleans and numbers to native cells

use std::fmt;

use serde_json::{Number, Value};

use crate::record::LuKind;

/// A single scalar field value.
#[derive(Clone, Debug, PartialEq)]
pub enum LuValue {
    Text(String),
    Bool(bool),
    F32(f32),
    F64(f64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
}

/// One record's values, aligned 1:1 with its schema's fields.
pub type LuValueRow = Vec<LuValue>;

impl LuValue {
    /// Kind of the value, matching the kind of the field it was read from.
    pub fn kind(&self) -> LuKind {
        match self {
            LuValue::Text(_) => LuKind::String,
            LuValue::Bool(_) => LuKind::Bool,
            LuValue::F32(_) => LuKind::F32,
            LuValue::F64(_) => LuKind::F64,
            LuValue::I8(_) => LuKind::I8,
            LuValue::I16(_) => LuKind::I16,
            LuValue::I32(_) => LuKind::I32,
            LuValue::I64(_) => LuKind::I64,
            LuValue::Isize(_) => LuKind::Isize,
            LuValue::U8(_) => LuKind::U8,
            LuValue::U16(_) => LuKind::U16,
            LuValue::U32(_) => LuKind::U32,
            LuValue::U64(_) => LuKind::U64,
            LuValue::Usize(_) => LuKind::Usize,
        }
    }

    /// True for every integer and floating point variant.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, LuValue::Text(_) | LuValue::Bool(_))
    }

    /// Converts the value into JSON.
    ///
    /// Floats go through their shortest decimal rendering so an `f32` of
    /// `1.234` is emitted as `1.234` rather than its widened `f64` expansion.
    /// NaN and infinities have no JSON form and become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            LuValue::Text(s) => Value::String(s.clone()),
            LuValue::Bool(b) => Value::Bool(*b),
            LuValue::F32(f) => float_to_json(f.is_finite(), &f.to_string()),
            LuValue::F64(f) => float_to_json(f.is_finite(), &f.to_string()),
            LuValue::I8(v) => Value::from(*v),
            LuValue::I16(v) => Value::from(*v),
            LuValue::I32(v) => Value::from(*v),
            LuValue::I64(v) => Value::from(*v),
            LuValue::Isize(v) => Value::from(*v as i64),
            LuValue::U8(v) => Value::from(*v),
            LuValue::U16(v) => Value::from(*v),
            LuValue::U32(v) => Value::from(*v),
            LuValue::U64(v) => Value::from(*v),
            LuValue::Usize(v) => Value::from(*v as u64),
        }
    }
}

fn float_to_json(finite: bool, rendered: &str) -> Value {
    if !finite {
        return Value::Null;
    }
    rendered
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl fmt::Display for LuValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuValue::Text(s) => f.write_str(s),
            LuValue::Bool(v) => write!(f, "{}", v),
            LuValue::F32(v) => write!(f, "{}", v),
            LuValue::F64(v) => write!(f, "{}", v),
            LuValue::I8(v) => write!(f, "{}", v),
            LuValue::I16(v) => write!(f, "{}", v),
            LuValue::I32(v) => write!(f, "{}", v),
            LuValue::I64(v) => write!(f, "{}", v),
            LuValue::Isize(v) => write!(f, "{}", v),
            LuValue::U8(v) => write!(f, "{}", v),
            LuValue::U16(v) => write!(f, "{}", v),
            LuValue::U32(v) => write!(f, "{}", v),
            LuValue::U64(v) => write!(f, "{}", v),
            LuValue::Usize(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(feature = "sqlite")]
impl rusqlite::types::ToSql for LuValue {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, Value as SqlValue};

        let value = match self {
            LuValue::Text(s) => return Ok(ToSqlOutput::from(s.as_str())),
            LuValue::Bool(v) => SqlValue::Integer(i64::from(*v)),
            LuValue::F32(v) => SqlValue::Real(f64::from(*v)),
            LuValue::F64(v) => SqlValue::Real(*v),
            LuValue::I8(v) => SqlValue::Integer(i64::from(*v)),
            LuValue::I16(v) => SqlValue::Integer(i64::from(*v)),
            LuValue::I32(v) => SqlValue::Integer(i64::from(*v)),
            LuValue::I64(v) => SqlValue::Integer(*v),
            LuValue::Isize(v) => SqlValue::Integer(*v as i64),
            LuValue::U8(v) => SqlValue::Integer(i64::from(*v)),
            LuValue::U16(v) => SqlValue::Integer(i64::from(*v)),
            LuValue::U32(v) => SqlValue::Integer(i64::from(*v)),
            LuValue::U64(v) => SqlValue::Integer(
                i64::try_from(*v)
                    .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?,
            ),
            LuValue::Usize(v) => SqlValue::Integer(
                i64::try_from(*v)
                    .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?,
            ),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}
