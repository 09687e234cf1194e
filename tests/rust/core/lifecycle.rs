//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Lu.
//! The Lu project belongs to the Dunimd Team.

#[path = "../common/mod.rs"]
mod common;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use common::{bar, baz, file_names, foo, prefix_in, BadUnsupported, Qux};
use lu::{
    LuBackend, LuEmptySchemaPolicy, LuError, LuJsonlWriter, LuSchema, LuSchemaWriter,
    LuStagingAllocator, LuValueRow, LuWriteStats, LuWriter, LuWriterConfig, LuWriterState, Result,
};
use tempfile::tempdir;

mod other {
    lu::lu_record! {
        pub struct Foo {
            #[lu("other_int")]
            pub int_field: i64,
        }
    }
}

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct RecordingBackend {
    journal: Journal,
    fail_open: HashMap<&'static str, usize>,
    fail_publish: HashSet<&'static str>,
    fail_discard: HashSet<&'static str>,
}

impl LuBackend for RecordingBackend {
    type Sink = &'static str;

    fn name(&self) -> &'static str {
        "recording"
    }

    fn open(&mut self, schema: &LuSchema) -> Result<Self::Sink> {
        if let Some(remaining) = self.fail_open.get_mut(schema.name()) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(LuError::Io(format!("cannot open {}", schema.name())));
            }
        }
        self.journal
            .push(format!("open {} [{}]", schema.name(), schema.labels().join(",")));
        Ok(schema.name())
    }

    fn append(&mut self, sink: &mut Self::Sink, _schema: &LuSchema, row: &LuValueRow) -> Result<()> {
        let values: Vec<String> = row.iter().map(ToString::to_string).collect();
        self.journal
            .push(format!("append {} {}", sink, values.join(",")));
        Ok(())
    }

    fn publish(&mut self, sink: Self::Sink) -> Result<()> {
        if self.fail_publish.contains(sink) {
            return Err(LuError::Io(format!("cannot publish {}", sink)));
        }
        self.journal.push(format!("publish {}", sink));
        Ok(())
    }

    fn discard(&mut self, sink: Self::Sink) -> Result<()> {
        if self.fail_discard.contains(sink) {
            return Err(LuError::Io(format!("cannot discard {}", sink)));
        }
        self.journal.push(format!("discard {}", sink));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.journal.push("finish".to_string());
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        self.journal.push("abort".to_string());
        Ok(())
    }
}

fn recording_writer() -> (LuSchemaWriter<RecordingBackend>, Journal) {
    recording_writer_with(RecordingBackend::default(), LuWriterConfig::default())
}

fn recording_writer_with(
    backend: RecordingBackend,
    config: LuWriterConfig,
) -> (LuSchemaWriter<RecordingBackend>, Journal) {
    let journal = backend.journal.clone();
    (LuSchemaWriter::with_backend(backend, config), journal)
}

/// Hands out `.stage-<n>.tmp` names and remembers them.
#[derive(Clone, Default)]
struct CountingStaging {
    issued: Arc<Mutex<Vec<PathBuf>>>,
}

impl LuStagingAllocator for CountingStaging {
    fn allocate(&mut self, dir: &Path, _target: &Path) -> Result<PathBuf> {
        let mut issued = self.issued.lock().unwrap();
        let path = dir.join(format!(".stage-{}.tmp", issued.len()));
        issued.push(path.clone());
        Ok(path)
    }
}

#[test]
fn test_one_sink_per_type_regardless_of_interleaving() {
    let (mut writer, journal) = recording_writer();

    writer.write(&foo(1)).unwrap();
    writer.write(&bar(1)).unwrap();
    writer.write(&foo(2)).unwrap();
    writer.write(&bar(2)).unwrap();
    writer.write(&foo(3)).unwrap();
    writer.close().unwrap();

    assert_eq!(
        journal.events(),
        vec![
            "open Foo [foo_string,foo_int]",
            "append Foo test 1,1",
            "open Bar [bar_int,bar_string]",
            "append Bar 1,test 1",
            "append Foo test 2,2",
            "append Bar 2,test 2",
            "append Foo test 3,3",
            "publish Foo",
            "publish Bar",
            "finish",
        ]
    );
    assert_eq!(
        writer.stats(),
        &LuWriteStats {
            records_written: 5,
            outputs_opened: 2,
            outputs_published: 2,
            outputs_discarded: 0,
        }
    );
    assert_eq!(writer.state(), LuWriterState::Closed);
}

#[test]
fn test_repeated_close_and_cancel_are_no_ops() {
    let (mut writer, journal) = recording_writer();
    writer.write(&foo(1)).unwrap();

    writer.close().unwrap();
    let after_close = journal.events();
    writer.close().unwrap();
    writer.cancel().unwrap();
    writer.close().unwrap();

    assert_eq!(journal.events(), after_close);
    assert_eq!(writer.state(), LuWriterState::Closed);
}

#[test]
fn test_cancel_then_close_keeps_cancelled_state() {
    let (mut writer, journal) = recording_writer();
    writer.write(&foo(1)).unwrap();
    writer.write(&bar(1)).unwrap();

    writer.cancel().unwrap();
    writer.cancel().unwrap();
    writer.close().unwrap();

    let events = journal.events();
    assert_eq!(
        &events[events.len() - 3..],
        &["discard Foo", "discard Bar", "abort"]
    );
    assert!(!events.iter().any(|e| e.starts_with("publish")));
    assert_eq!(writer.state(), LuWriterState::Cancelled);
    assert_eq!(writer.stats().outputs_discarded, 2);
}

#[test]
fn test_write_after_close_fails_without_side_effects() {
    let (mut writer, journal) = recording_writer();
    writer.write(&foo(1)).unwrap();
    writer.close().unwrap();
    let before = journal.events();

    assert_eq!(writer.write(&foo(2)).unwrap_err(), LuError::ClosedWriter);
    assert_eq!(writer.write(&bar(1)).unwrap_err(), LuError::ClosedWriter);
    assert_eq!(journal.events(), before);
    assert_eq!(writer.stats().records_written, 1);
}

#[test]
fn test_write_after_cancel_fails() {
    let (mut writer, _journal) = recording_writer();
    writer.cancel().unwrap();
    assert_eq!(writer.write(&foo(1)).unwrap_err(), LuError::ClosedWriter);
}

#[test]
fn test_close_attempts_every_sink_and_returns_last_error() {
    let backend = RecordingBackend {
        fail_publish: ["Foo", "Bar"].into_iter().collect(),
        ..RecordingBackend::default()
    };
    let (mut writer, journal) = recording_writer_with(backend, LuWriterConfig::default());
    writer.write(&foo(1)).unwrap();
    writer.write(&bar(1)).unwrap();
    writer.write(&baz()).unwrap();

    let err = writer.close().unwrap_err();
    assert_eq!(err, LuError::Io("cannot publish Bar".into()));

    let events = journal.events();
    assert!(events.contains(&"publish Baz".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("finish"));
    assert_eq!(writer.stats().outputs_published, 1);
    assert_eq!(writer.state(), LuWriterState::Closed);
    assert!(writer.close().is_ok());
}

#[test]
fn test_cancel_attempts_every_sink_and_returns_last_error() {
    let backend = RecordingBackend {
        fail_discard: ["Foo"].into_iter().collect(),
        ..RecordingBackend::default()
    };
    let (mut writer, journal) = recording_writer_with(backend, LuWriterConfig::default());
    writer.write(&foo(1)).unwrap();
    writer.write(&bar(1)).unwrap();

    let err = writer.cancel().unwrap_err();
    assert_eq!(err, LuError::Io("cannot discard Foo".into()));
    let events = journal.events();
    assert!(events.contains(&"discard Bar".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("abort"));
}

#[test]
fn test_failed_open_is_retried_on_next_write() {
    let backend = RecordingBackend {
        fail_open: [("Foo", 1)].into_iter().collect(),
        ..RecordingBackend::default()
    };
    let (mut writer, journal) = recording_writer_with(backend, LuWriterConfig::default());

    let err = writer.write(&foo(1)).unwrap_err();
    assert_eq!(err, LuError::Io("cannot open Foo".into()));
    assert_eq!(writer.state(), LuWriterState::Open);

    writer.write(&foo(2)).unwrap();
    writer.close().unwrap();
    assert_eq!(
        journal.events(),
        vec![
            "open Foo [foo_string,foo_int]",
            "append Foo test 2,2",
            "publish Foo",
            "finish",
        ]
    );
}

#[test]
fn test_unsupported_type_never_opens_a_sink() {
    let (mut writer, journal) = recording_writer();
    let bad = BadUnsupported {
        name: "x".into(),
        bytes_field: vec![1],
        tags_field: vec![],
    };

    let first = writer.write(&bad).unwrap_err();
    writer.write(&foo(1)).unwrap();
    let second = writer.write(&bad).unwrap_err();

    assert_eq!(first, second);
    assert!(matches!(first, LuError::UnsupportedKind { .. }));
    assert_eq!(journal.events(), vec!["open Foo [foo_string,foo_int]", "append Foo test 1,1"]);
    writer.cancel().unwrap();
}

#[test]
fn test_empty_schema_is_skipped_by_default() {
    let (mut writer, journal) = recording_writer();
    writer.write(&Qux::new("a")).unwrap();
    writer.write(&Qux::new("b")).unwrap();
    writer.close().unwrap();

    assert_eq!(journal.events(), vec!["finish"]);
    assert_eq!(writer.stats().records_written, 0);
    assert_eq!(writer.registry().len(), 1);
}

#[test]
fn test_empty_schema_rejected_when_configured() {
    let config = LuWriterConfig::default().with_empty_schema(LuEmptySchemaPolicy::Reject);
    let (mut writer, journal) = recording_writer_with(RecordingBackend::default(), config);

    let first = writer.write(&Qux::new("a")).unwrap_err();
    let second = writer.write(&Qux::new("b")).unwrap_err();
    assert!(matches!(first, LuError::Schema { .. }));
    assert_eq!(first, second);
    assert!(first.to_string().contains("Qux"));

    writer.write(&foo(1)).unwrap();
    writer.close().unwrap();
    assert_eq!(journal.events()[0], "open Foo [foo_string,foo_int]");
}

#[test]
fn test_dropping_open_writer_cancels() {
    let (mut writer, journal) = recording_writer();
    writer.write(&foo(1)).unwrap();
    drop(writer);

    assert_eq!(
        journal.events(),
        vec![
            "open Foo [foo_string,foo_int]",
            "append Foo test 1,1",
            "discard Foo",
            "abort",
        ]
    );
}

#[test]
fn test_dropping_closed_writer_does_nothing_more() {
    let (mut writer, journal) = recording_writer();
    writer.write(&foo(1)).unwrap();
    writer.close().unwrap();
    let before = journal.events();
    drop(writer);
    assert_eq!(journal.events(), before);
}

#[test]
fn test_outputs_stay_staged_until_close() {
    let dir = tempdir().unwrap();
    let staging = CountingStaging::default();
    let mut writer = LuJsonlWriter::new(prefix_in(dir.path()), "").with_allocator(staging.clone());

    writer.write(&foo(1)).unwrap();
    writer.write(&bar(1)).unwrap();

    let staged = staging.issued.lock().unwrap().clone();
    assert_eq!(staged.len(), 2);
    assert!(staged.iter().all(|path| path.exists()));
    assert_eq!(file_names(dir.path()), vec![".stage-0.tmp", ".stage-1.tmp"]);

    writer.close().unwrap();
    assert!(staged.iter().all(|path| !path.exists()));
    assert_eq!(file_names(dir.path()), vec!["Bar.jsonl", "Foo.jsonl"]);
}

#[test]
fn test_cancel_leaves_no_output() {
    let dir = tempdir().unwrap();
    let staging = CountingStaging::default();
    let mut writer = LuJsonlWriter::new(prefix_in(dir.path()), "").with_allocator(staging.clone());

    writer.write(&foo(1)).unwrap();
    writer.cancel().unwrap();

    assert!(file_names(dir.path()).is_empty());
    assert!(!dir.path().join("Foo.jsonl").exists());
}

#[test]
fn test_failed_rename_leaves_target_absent() {
    let dir = tempdir().unwrap();
    let staging_dir = dir.path().join("staging");
    fs::create_dir(&staging_dir).unwrap();
    let missing = dir.path().join("missing");

    let config = LuWriterConfig::new(prefix_in(&missing), "").with_staging_dir(&staging_dir);
    let mut writer = LuJsonlWriter::with_config(config);
    writer.write(&foo(1)).unwrap();
    assert_eq!(file_names(&staging_dir).len(), 1);

    let err = writer.close().unwrap_err();
    assert!(matches!(err, LuError::Io(_)));
    assert!(!missing.exists());
    assert!(file_names(&staging_dir).is_empty());
}

#[test]
fn test_staging_failure_surfaces_from_write() {
    let dir = tempdir().unwrap();
    let config = LuWriterConfig::new(prefix_in(&dir.path().join("absent")), "");
    let mut writer = LuJsonlWriter::with_config(config);

    let err = writer.write(&foo(1)).unwrap_err();
    assert!(matches!(err, LuError::Io(_)));
    assert_eq!(writer.state(), LuWriterState::Open);
    writer.cancel().unwrap();
}

#[test]
fn test_same_named_types_cannot_share_an_output() {
    let (mut writer, journal) = recording_writer();
    writer.write(&foo(1)).unwrap();

    let err = writer.write(&other::Foo { int_field: 5 }).unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, LuError::Schema { .. }));
    assert!(message.contains("common::Foo"), "{}", message);
    assert!(message.contains("other::Foo"), "{}", message);

    // The clash is reported again on every write of the second type.
    assert!(writer.write(&other::Foo { int_field: 6 }).is_err());
    writer.write(&foo(2)).unwrap();
    writer.close().unwrap();

    assert_eq!(
        journal.events(),
        vec![
            "open Foo [foo_string,foo_int]",
            "append Foo test 1,1",
            "append Foo test 2,2",
            "publish Foo",
            "finish",
        ]
    );
}

#[test]
fn test_same_named_type_does_not_overwrite_published_file() {
    let dir = tempdir().unwrap();
    let mut writer = LuJsonlWriter::new(prefix_in(dir.path()), "");
    writer.write(&foo(1)).unwrap();
    assert!(writer.write(&other::Foo { int_field: 5 }).is_err());
    writer.close().unwrap();

    assert_eq!(file_names(dir.path()), vec!["Foo.jsonl"]);
    assert_eq!(
        fs::read_to_string(dir.path().join("Foo.jsonl")).unwrap(),
        "{\"foo_int\":1,\"foo_string\":\"test 1\"}\n"
    );
}
