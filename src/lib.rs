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

//! # Lu Core Library
//!
//! Lu persists tagged records of many types to CSV, TSV, JSON Lines,
//! spreadsheet and SQLite outputs through one write, close and cancel
//! protocol. Each record type gets its own output, created the first time a
//! record of that type is written, and nothing becomes visible at its final
//! name until the writer is closed.
//!
//! ## Module Overview
//!
//! - **record**: the `LuRecord` trait and the `lu_record!` declaration macro
//! - **value**: typed scalar values read out of records
//! - **schema**: per-type schema discovery, validation and caching
//! - **extract**: ordered and keyed value extraction
//! - **config**: writer configuration and policies
//! - **staging**: staged files, atomic publication and compressed streams
//! - **writer**: the `LuWriter` contract and the generic `LuSchemaWriter` core
//! - **sinks**: format backends (CSV, TSV, JSON Lines, xlsx, SQLite, log)
//! - **writers**: mock, discard and multi writers
//!
//! ## Feature Flags
//!
//! - `csv`: CSV and TSV writers
//! - `sqlite`: SQLite database writer
//! - `xlsx`: spreadsheet writer
//! - `compression`: gzip and zstd for text outputs
//! - `full`: all of the above (default)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lu::{lu_record, LuCsvWriter, LuWriter};
//!
//! lu_record! {
//!     pub struct Foo {
//!         #[lu("foo_string,pk")]
//!         pub name: String,
//!         #[lu("foo_int")]
//!         pub count: i64,
//!     }
//! }
//!
//! let mut writer = LuCsvWriter::new("./out/", "");
//! writer.write(&Foo { name: "a".into(), count: 1 })?;
//! writer.close()?;
//! # Ok::<(), lu::LuError>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, LuError>`. Errors are returned to the
//! caller; close and cancel attempt every output before reporting.

#![allow(non_snake_case)]

pub mod config;
pub mod errors;
pub mod extract;
pub mod record;
pub mod schema;
pub mod sinks;
pub mod staging;
pub mod value;
pub mod writer;
pub mod writers;

pub use config::{LuCompression, LuConflictPolicy, LuEmptySchemaPolicy, LuWriterConfig};
pub use errors::{LuError, Result};
pub use extract::{extract, extract_as_map, extract_strings_as_map};
pub use record::{LuField, LuFieldDef, LuKind, LuRecord, LuRecordType};
pub use schema::{LuFieldDescriptor, LuRegistration, LuSchema, LuSchemaRegistry};
pub use staging::{LuRandomStaging, LuStagedFile, LuStagingAllocator, LuStagingArea};
pub use value::{LuValue, LuValueRow};
pub use writer::{LuBackend, LuSchemaWriter, LuWriteStats, LuWriter, LuWriterState};
pub use writers::{LuDiscardWriter, LuMockWriter, LuMultiWriter};

#[cfg(feature = "csv")]
pub use sinks::{LuCsvWriter, LuTsvWriter};
pub use sinks::{LuJsonlWriter, LuLogWriter};
#[cfg(feature = "sqlite")]
pub use sinks::LuSqliteWriter;
#[cfg(feature = "xlsx")]
pub use sinks::LuExcelWriter;
