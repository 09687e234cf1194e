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

//! # SQLite Sink Module
//!
//! Writes every record type into one SQLite database, `<filename>.sqlite`,
//! with one table per type:
//!
//! ```sql
//! CREATE TABLE "Foo" (
//!     "foo_string" TEXT NOT NULL,
//!     "foo_int" INT64 NOT NULL,
//!     PRIMARY KEY ("foo_string")
//! )
//! ```
//!
//! The database lives under a staging name until the writer is closed. All
//! inserts run inside a single transaction that is committed on close, after
//! which the database file is synced and renamed into place. Cancelling
//! rolls the transaction back and deletes the staged database.
//!
//! Primary key collisions follow [`LuConflictPolicy`].

use std::fs::OpenOptions;
use std::path::PathBuf;

use rusqlite::{params_from_iter, Connection};

use crate::config::{LuConflictPolicy, LuWriterConfig};
use crate::errors::{LuError, Result};
use crate::record::LuKind;
use crate::schema::LuSchema;
use crate::staging::{LuStagedFile, LuStagingArea};
use crate::value::LuValueRow;
use crate::writer::{LuBackend, LuSchemaWriter};

/// Pragmas applied to the staged database; durability comes from the sync
/// performed before it is published.
const WRITE_PRAGMAS: &str = r#"
PRAGMA journal_mode = MEMORY;
PRAGMA synchronous = OFF;
PRAGMA temp_store = MEMORY;
"#;

/// Column type declared for a field kind.
pub fn column_type(kind: LuKind) -> Result<&'static str> {
    Ok(match kind {
        LuKind::String => "TEXT",
        LuKind::Bool => "BOOLEAN",
        LuKind::F32 | LuKind::F64 => "REAL",
        LuKind::I8 => "INT8",
        LuKind::I16 => "INT16",
        LuKind::I32 => "INT32",
        LuKind::I64 | LuKind::Isize => "INT64",
        LuKind::U8 => "UNSIGNED INT8",
        LuKind::U16 => "UNSIGNED INT16",
        LuKind::U32 => "UNSIGNED INT32",
        LuKind::U64 | LuKind::Usize => "UNSIGNED INT64",
        other => {
            return Err(LuError::sink(
                "sqlite",
                format!("no column type for kind {}", other),
            ))
        }
    })
}

/// Double-quoted SQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE` statement for a schema.
pub fn create_table_sql(schema: &LuSchema) -> Result<String> {
    let mut lines = Vec::with_capacity(schema.len() + 1);
    for field in schema.fields() {
        lines.push(format!(
            "\t{} {} NOT NULL",
            quote_identifier(&field.label),
            column_type(field.kind)?
        ));
    }

    let keys: Vec<String> = schema
        .primary_key()
        .into_iter()
        .map(quote_identifier)
        .collect();
    if !keys.is_empty() {
        lines.push(format!("\tPRIMARY KEY ({})", keys.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE {} (\n{}\n)",
        quote_identifier(schema.name()),
        lines.join(",\n")
    ))
}

/// Parameterized insert statement for a schema.
pub fn insert_sql(schema: &LuSchema, conflict: LuConflictPolicy) -> String {
    let columns: Vec<String> = schema
        .labels()
        .into_iter()
        .map(quote_identifier)
        .collect();
    let placeholders = vec!["?"; columns.len()].join(",");
    format!(
        "{} INTO {} ({}) VALUES ({})",
        conflict.insert_verb(),
        quote_identifier(schema.name()),
        columns.join(","),
        placeholders
    )
}

struct LuSqliteDatabase {
    conn: Connection,
    staged: LuStagedFile,
}

pub struct LuSqliteBackend {
    config: LuWriterConfig,
    staging: LuStagingArea,
    target: PathBuf,
    database: Option<LuSqliteDatabase>,
}

/// One table of the staged database.
pub struct LuSqliteTable {
    name: String,
    insert: String,
}

impl LuSqliteBackend {
    /// The database is published as `<filename>.sqlite`.
    pub fn new(filename: impl Into<String>, config: LuWriterConfig) -> Self {
        Self {
            staging: LuStagingArea::new(&config),
            target: PathBuf::from(format!("{}.sqlite", filename.into())),
            config,
            database: None,
        }
    }

    fn connection(&mut self) -> Result<&Connection> {
        if self.database.is_none() {
            let (staged, file) = self.staging.stage(&self.target)?;
            drop(file);
            let conn = Connection::open(staged.staged_path())?;
            conn.execute_batch(WRITE_PRAGMAS)?;
            conn.execute_batch("BEGIN")?;
            log::debug!(
                "staged database {} at {}",
                self.target.display(),
                staged.staged_path().display()
            );
            self.database = Some(LuSqliteDatabase { conn, staged });
        }
        match &self.database {
            Some(database) => Ok(&database.conn),
            None => Err(LuError::internal("database was not staged")),
        }
    }
}

impl LuBackend for LuSqliteBackend {
    type Sink = LuSqliteTable;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn open(&mut self, schema: &LuSchema) -> Result<Self::Sink> {
        let ddl = create_table_sql(schema)?;
        let insert = insert_sql(schema, self.config.conflict);
        let conn = self.connection()?;
        conn.execute_batch(&ddl)?;
        conn.prepare_cached(&insert)?;
        Ok(LuSqliteTable {
            name: schema.name().to_string(),
            insert,
        })
    }

    fn append(&mut self, sink: &mut Self::Sink, _schema: &LuSchema, row: &LuValueRow) -> Result<()> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(&sink.insert)?;
        stmt.execute(params_from_iter(row.iter()))?;
        Ok(())
    }

    /// Tables become visible together, in [`LuBackend::finish`].
    fn publish(&mut self, sink: Self::Sink) -> Result<()> {
        log::debug!("table {} ready for commit", sink.name);
        Ok(())
    }

    fn discard(&mut self, sink: Self::Sink) -> Result<()> {
        log::debug!("table {} rolled back", sink.name);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let Some(LuSqliteDatabase { conn, staged }) = self.database.take() else {
            return Ok(());
        };
        conn.execute_batch("COMMIT")?;
        conn.close().map_err(|(_, err)| LuError::from(err))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(staged.staged_path())?;
        let path = staged.commit(file)?;
        log::info!("published database {}", path.display());
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        let Some(LuSqliteDatabase { conn, staged }) = self.database.take() else {
            return Ok(());
        };
        let closed = conn.close();
        staged.discard()?;
        closed.map_err(|(_, err)| LuError::from(err))
    }

    fn staging(&mut self) -> Option<&mut LuStagingArea> {
        Some(&mut self.staging)
    }
}

/// Writes every record type to its own table of one SQLite database.
pub type LuSqliteWriter = LuSchemaWriter<LuSqliteBackend>;

impl LuSchemaWriter<LuSqliteBackend> {
    /// The database is published as `<filename>.sqlite`.
    pub fn new(filename: impl Into<String>) -> Self {
        Self::with_config(filename, LuWriterConfig::default())
    }

    pub fn with_config(filename: impl Into<String>, config: LuWriterConfig) -> Self {
        Self::with_backend(LuSqliteBackend::new(filename, config.clone()), config)
    }
}
