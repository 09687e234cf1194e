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
//! # Spreadsheet Sink Module
//!
//! Writes one `.xlsx` workbook per record type through `rust_xlsxwriter`.
//! The workbook has a single worksheet, `Sheet1`, whose first row holds the
//! labels and stays frozen while scrolling.
//!
//! Cells are typed: text becomes a string cell, booleans a boolean cell and
//! numbers a numeric cell. NaN and infinities have no numeric cell form and
//! are written as text.
//!
//! The worksheet runs in constant memory mode: each row is flushed to a
//! scratch file in the staging directory as soon as it is complete, and the
//! workbook is packaged into the staged file when the output is published.

use std::fs::File;
use std::io::BufWriter;

use rust_xlsxwriter::{ColNum, RowNum, Workbook, Worksheet};

use crate::config::LuWriterConfig;
use crate::errors::{LuError, Result};
use crate::schema::LuSchema;
use crate::staging::{LuStagedFile, LuStagingArea};
use crate::value::{LuValue, LuValueRow};
use crate::writer::{LuBackend, LuSchemaWriter};

/// Rows a worksheet can hold, header included.
pub const MAX_SHEET_ROWS: usize = 1_048_576;

pub struct LuExcelBackend {
    config: LuWriterConfig,
    staging: LuStagingArea,
}

impl LuExcelBackend {
    pub fn new(config: LuWriterConfig) -> Self {
        Self {
            staging: LuStagingArea::new(&config),
            config,
        }
    }
}

pub struct LuExcelSink {
    staged: LuStagedFile,
    file: File,
    workbook: Workbook,
    rows: usize,
}

impl LuExcelSink {
    fn sheet(&mut self) -> Result<&mut Worksheet> {
        Ok(self.workbook.worksheet_from_index(0)?)
    }
}

fn write_cell(sheet: &mut Worksheet, row: RowNum, col: ColNum, value: &LuValue) -> Result<()> {
    match value {
        LuValue::Text(text) => {
            sheet.write_string(row, col, text)?;
        }
        LuValue::Bool(flag) => {
            sheet.write_boolean(row, col, *flag)?;
        }
        other => match number(other) {
            Some(n) if n.is_finite() => {
                sheet.write_number(row, col, n)?;
            }
            Some(n) => {
                sheet.write_string(row, col, non_finite_label(n))?;
            }
            None => {}
        },
    }
    Ok(())
}

/// Numeric cell value, `None` for text and booleans.
fn number(value: &LuValue) -> Option<f64> {
    Some(match value {
        // Shortest decimal form, so 1.234f32 stays 1.234.
        LuValue::F32(v) => v.to_string().parse().unwrap_or(f64::from(*v)),
        LuValue::F64(v) => *v,
        LuValue::I8(v) => f64::from(*v),
        LuValue::I16(v) => f64::from(*v),
        LuValue::I32(v) => f64::from(*v),
        LuValue::I64(v) => *v as f64,
        LuValue::Isize(v) => *v as f64,
        LuValue::U8(v) => f64::from(*v),
        LuValue::U16(v) => f64::from(*v),
        LuValue::U32(v) => f64::from(*v),
        LuValue::U64(v) => *v as f64,
        LuValue::Usize(v) => *v as f64,
        LuValue::Text(_) | LuValue::Bool(_) => return None,
    })
}

fn non_finite_label(v: f64) -> &'static str {
    if v.is_nan() {
        "NaN"
    } else if v > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}

impl LuBackend for LuExcelBackend {
    type Sink = LuExcelSink;

    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn open(&mut self, schema: &LuSchema) -> Result<Self::Sink> {
        let target = self.config.output_path(schema.name(), ".xlsx");
        let scratch = self.config.staging_dir_for(&target);
        let (staged, file) = self.staging.stage(&target)?;

        let mut workbook = Workbook::new();
        workbook.set_tempdir(&scratch)?;
        let sheet = workbook.add_worksheet_with_constant_memory();
        sheet.set_freeze_panes(1, 0)?;
        for (col, label) in schema.labels().into_iter().enumerate() {
            sheet.write_string(0, col as ColNum, label)?;
        }

        Ok(LuExcelSink {
            staged,
            file,
            workbook,
            rows: 1,
        })
    }

    fn append(&mut self, sink: &mut Self::Sink, schema: &LuSchema, row: &LuValueRow) -> Result<()> {
        if sink.rows >= MAX_SHEET_ROWS {
            return Err(LuError::sink(
                "xlsx",
                format!(
                    "worksheet for {} is full ({} rows)",
                    schema.name(),
                    MAX_SHEET_ROWS
                ),
            ));
        }
        let index = sink.rows as RowNum;
        let sheet = sink.sheet()?;
        for (col, value) in row.iter().enumerate() {
            write_cell(sheet, index, col as ColNum, value)?;
        }
        sink.rows += 1;
        Ok(())
    }

    fn publish(&mut self, sink: Self::Sink) -> Result<()> {
        let LuExcelSink {
            staged,
            file,
            mut workbook,
            ..
        } = sink;

        let mut writer = BufWriter::new(file);
        workbook.save_to_writer(&mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|err| LuError::Io(err.error().to_string()))?;

        let path = staged.commit(file)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn discard(&mut self, sink: Self::Sink) -> Result<()> {
        let LuExcelSink {
            staged,
            file,
            workbook,
            ..
        } = sink;
        drop(workbook);
        drop(file);
        staged.discard()
    }

    fn staging(&mut self) -> Option<&mut LuStagingArea> {
        Some(&mut self.staging)
    }
}

/// Writes each record type to its own `.xlsx` workbook.
pub type LuExcelWriter = LuSchemaWriter<LuExcelBackend>;

impl LuSchemaWriter<LuExcelBackend> {
    /// Output names are `prefix + TypeName + suffix + ".xlsx"`.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::with_config(LuWriterConfig::new(prefix, suffix))
    }

    pub fn with_config(config: LuWriterConfig) -> Self {
        Self::with_backend(LuExcelBackend::new(config.clone()), config)
    }
}
