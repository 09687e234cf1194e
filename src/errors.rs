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

//! # Lu Error Module
//!
//! This module defines the error types used throughout Lu for consistent
//! error handling and reporting.
//!
//! ## Error Categories
//!
//! - **Schema errors**: a record type declares a field of an unsupported kind,
//!   or (when configured) declares no persistable fields at all. Detected once,
//!   when the type is first written, and repeated identically afterwards.
//! - **Lifecycle errors**: `write` after `close` or `cancel`. Always the same
//!   value, [`LuError::ClosedWriter`].
//! - **Resource errors**: creating, flushing, publishing or discarding a staged
//!   output failed. Returned to the caller and, during `close`/`cancel`,
//!   aggregated across every output rather than stopping at the first.
//!
//! ## Usage
//!
//! ```rust
//! use lu::errors::{Result, LuError};
//!
//! fn check(label: &str) -> Result<()> {
//!     if label.is_empty() {
//!         return Err(LuError::validation("label cannot be empty"));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Lu.
pub type Result<T> = std::result::Result<T, LuError>;

/// Canonical error enumeration for Lu.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum LuError {
    /// Errors originating from the filesystem, message kept verbatim.
    #[error("io error: {0}")]
    Io(String),

    /// `write` was called on a writer that has been closed or cancelled.
    #[error("writer is closed")]
    ClosedWriter,

    /// A field of the record type has a kind outside the supported scalar set.
    #[error("unsupported type: {kind} in {record_type}.{field}")]
    UnsupportedKind {
        kind: String,
        field: String,
        record_type: String,
    },

    /// Errors caused by a record layout the writer cannot persist.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Failures raised by a format encoder.
    #[error("{sink} sink failed: {message}")]
    Sink { sink: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors reported by the embedded SQLite database.
    #[error("sqlite error: {0}")]
    Sqlite(String),

    /// Invalid configuration values.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for LuError {
    fn from(err: io::Error) -> Self {
        LuError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LuError {
    fn from(err: serde_json::Error) -> Self {
        LuError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for LuError {
    fn from(err: serde_yaml::Error) -> Self {
        LuError::Serde(err.to_string())
    }
}

#[cfg(feature = "xlsx")]
impl From<rust_xlsxwriter::XlsxError> for LuError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        LuError::sink("xlsx", err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for LuError {
    fn from(err: rusqlite::Error) -> Self {
        LuError::Sqlite(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for LuError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(err) => LuError::Io(err.to_string()),
            other => LuError::sink("csv", format!("{:?}", other)),
        }
    }
}

impl LuError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        LuError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        LuError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct sink errors.
    pub fn sink(name: impl Into<String>, message: impl Into<String>) -> Self {
        LuError::Sink {
            sink: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        LuError::Internal(message.into())
    }
}
