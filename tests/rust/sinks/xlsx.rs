//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Lu.
//! The Lu project belongs to the Dunimd Team.

#[path = "../common/mod.rs"]
mod common;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use common::{
    file_names, foo, prefix_in, write_and_cancel, write_interleaved, write_sequential, BAZ_LABELS,
};
use lu::{lu_record, LuExcelWriter, LuWriter};
use tempfile::tempdir;

fn read_part(path: &Path, part: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut contents = String::new();
    archive
        .by_name(part)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    contents
}

/// Cell texts of every row of `Sheet1`.
fn read_sheet(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn expected_foo() -> Vec<Vec<String>> {
    strings(&[
        &["foo_string", "foo_int"],
        &["test 1", "1"],
        &["test 2", "2"],
        &["test 3", "3"],
    ])
}

fn expected_bar() -> Vec<Vec<String>> {
    strings(&[
        &["bar_int", "bar_string"],
        &["1", "test 1"],
        &["2", "test 2"],
        &["3", "test 3"],
    ])
}

fn expected_baz() -> Vec<Vec<String>> {
    strings(&[
        &BAZ_LABELS,
        &[
            "test 1", "true", "1.234", "9.876", "-12345", "-8", "-16", "-32", "-64", "12345", "8",
            "16", "32", "64",
        ],
    ])
}

#[test]
fn test_xlsx_sequential_writes() {
    let dir = tempdir().unwrap();
    let mut writer = LuExcelWriter::new(prefix_in(dir.path()), "-sequential");
    write_sequential(&mut writer);

    assert_eq!(read_sheet(&dir.path().join("Foo-sequential.xlsx")), expected_foo());
    assert_eq!(read_sheet(&dir.path().join("Bar-sequential.xlsx")), expected_bar());
    assert_eq!(read_sheet(&dir.path().join("Baz-sequential.xlsx")), expected_baz());
}

#[test]
fn test_xlsx_interleaved_writes() {
    let dir = tempdir().unwrap();
    let mut writer = LuExcelWriter::new(prefix_in(dir.path()), "-interleave");
    write_interleaved(&mut writer);

    assert_eq!(read_sheet(&dir.path().join("Foo-interleave.xlsx")), expected_foo());
    assert_eq!(read_sheet(&dir.path().join("Bar-interleave.xlsx")), expected_bar());
    assert_eq!(read_sheet(&dir.path().join("Baz-interleave.xlsx")), expected_baz());
}

#[test]
fn test_xlsx_cancel_leaves_nothing() {
    let dir = tempdir().unwrap();
    let mut writer = LuExcelWriter::new(prefix_in(dir.path()), "-cancel");
    write_and_cancel(&mut writer);
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn test_xlsx_header_row_is_frozen() {
    let dir = tempdir().unwrap();
    let mut writer = LuExcelWriter::new(prefix_in(dir.path()), "");
    writer.write(&foo(1)).unwrap();
    writer.close().unwrap();

    let path = dir.path().join("Foo.xlsx");
    let sheet = read_part(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"ySplit="1""#));
    assert!(sheet.contains(r#"topLeftCell="A2""#));
    assert!(sheet.contains(r#"state="frozen""#));
    assert!(read_part(&path, "xl/workbook.xml").contains(r#"name="Sheet1""#));
}

lu_record! {
    pub struct Markup {
        #[lu("html")]
        pub html: String,
        #[lu("ratio")]
        pub ratio: f64,
        #[lu("ok")]
        pub ok: bool,
    }
}

#[test]
fn test_xlsx_cell_types_and_markup() {
    let dir = tempdir().unwrap();
    let mut writer = LuExcelWriter::new(prefix_in(dir.path()), "");
    writer
        .write(&Markup {
            html: "<b>Tom & Jerry</b>".into(),
            ratio: f64::INFINITY,
            ok: false,
        })
        .unwrap();
    writer
        .write(&Markup {
            html: String::new(),
            ratio: 0.25,
            ok: true,
        })
        .unwrap();
    writer.close().unwrap();

    let path = dir.path().join("Markup.xlsx");
    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("<b>Tom & Jerry</b>".into()))
    );
    assert_eq!(range.get_value((1, 1)), Some(&Data::String("inf".into())));
    assert_eq!(range.get_value((1, 2)), Some(&Data::Bool(false)));
    assert_eq!(range.get_value((2, 1)), Some(&Data::Float(0.25)));
    assert_eq!(range.get_value((2, 2)), Some(&Data::Bool(true)));
}

#[test]
fn test_xlsx_output_staged_until_close() {
    let dir = tempdir().unwrap();
    let mut writer = LuExcelWriter::new(prefix_in(dir.path()), "");
    writer.write(&foo(1)).unwrap();
    writer.write(&foo(2)).unwrap();
    assert!(!dir.path().join("Foo.xlsx").exists());

    writer.close().unwrap();
    assert_eq!(file_names(dir.path()), vec!["Foo.xlsx"]);
    assert_eq!(read_sheet(&dir.path().join("Foo.xlsx")).len(), 3);
}
