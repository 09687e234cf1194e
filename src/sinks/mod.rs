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

//! # Format Sinks Module
//!
//! Backends for [`LuSchemaWriter`](crate::writer::LuSchemaWriter), one per
//! output format. Each file backend writes one output per record type, named
//! `prefix + TypeName + suffix + extension`.
//!
//! ## Module Components
//!
//! - **Delimited** ([delimited.rs](delimited/index.html)): CSV and TSV files with a header row
//! - **JSON Lines** ([jsonl.rs](jsonl/index.html)): one JSON object per line
//! - **Spreadsheet** ([xlsx.rs](xlsx/index.html)): one workbook per type, header row frozen
//! - **SQLite** ([sqlite.rs](sqlite/index.html)): one database, one table per type
//! - **Log** ([logging.rs](logging/index.html)): one text line per record
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lu::sinks::LuCsvWriter;
//! use lu::writer::LuWriter;
//!
//! let mut writer = LuCsvWriter::new("./out/", "");
//! writer.write(&record)?;
//! writer.close()?;
//! ```

#[cfg(feature = "csv")]
pub mod delimited;
pub mod jsonl;
pub mod logging;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "xlsx")]
pub mod xlsx;

#[cfg(feature = "csv")]
pub use delimited::{LuCsv, LuCsvWriter, LuDelimitedBackend, LuDelimitedFormat, LuTsv, LuTsvWriter};
pub use jsonl::{LuJsonlBackend, LuJsonlWriter};
pub use logging::{LuLogBackend, LuLogOutput, LuLogWriter};
#[cfg(feature = "sqlite")]
pub use sqlite::{LuSqliteBackend, LuSqliteWriter};
#[cfg(feature = "xlsx")]
pub use xlsx::{LuExcelBackend, LuExcelWriter, MAX_SHEET_ROWS};
