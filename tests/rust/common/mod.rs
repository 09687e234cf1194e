//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Lu.
//! The Lu project belongs to the Dunimd Team.

//! Record fixtures and write sequences shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use lu::{lu_record, LuWriter};

lu_record! {
    #[derive(Clone, Debug, PartialEq)]
    pub struct Foo {
        #[lu("foo_string,pk")]
        pub string_field: String,
        #[lu("foo_int")]
        pub int_field: isize,
        pub ignored_field: isize,
    }
}

lu_record! {
    #[derive(Clone, Debug, PartialEq)]
    pub struct Bar {
        #[lu("bar_int,pk")]
        pub int_field: isize,
        #[lu("bar_string,pk")]
        pub string_field: String,
    }
}

lu_record! {
    #[derive(Clone, Debug, PartialEq)]
    pub struct Baz {
        #[lu("baz_string")]
        pub string_field: String,
        #[lu("baz_bool")]
        pub bool_field: bool,
        #[lu("baz_float32")]
        pub float32_field: f32,
        #[lu("baz_float64")]
        pub float64_field: f64,
        #[lu("baz_int")]
        pub int_field: isize,
        #[lu("baz_int8")]
        pub int8_field: i8,
        #[lu("baz_int16")]
        pub int16_field: i16,
        #[lu("baz_int32")]
        pub int32_field: i32,
        #[lu("baz_int64")]
        pub int64_field: i64,
        #[lu("baz_uint")]
        pub uint_field: usize,
        #[lu("baz_uint8")]
        pub uint8_field: u8,
        #[lu("baz_uint16")]
        pub uint16_field: u16,
        #[lu("baz_uint32")]
        pub uint32_field: u32,
        #[lu("baz_uint64")]
        pub uint64_field: u64,
    }
}

lu_record! {
    #[derive(Clone, Debug)]
    pub struct BadUnsupported {
        #[lu("name")]
        pub name: String,
        #[lu("bytes")]
        pub bytes_field: Vec<u8>,
        #[lu("tags")]
        pub tags_field: Vec<String>,
    }
}

lu_record! {
    #[derive(Clone, Debug)]
    pub struct Qux {
        pub untagged: String,
        #[lu("hidden")]
        private_field: i32,
    }
}

impl Qux {
    pub fn new(untagged: &str) -> Self {
        Qux {
            untagged: untagged.to_string(),
            private_field: 0,
        }
    }
}

pub const FOO_LABELS: [&str; 2] = ["foo_string", "foo_int"];
pub const BAR_LABELS: [&str; 2] = ["bar_int", "bar_string"];
pub const BAZ_LABELS: [&str; 14] = [
    "baz_string",
    "baz_bool",
    "baz_float32",
    "baz_float64",
    "baz_int",
    "baz_int8",
    "baz_int16",
    "baz_int32",
    "baz_int64",
    "baz_uint",
    "baz_uint8",
    "baz_uint16",
    "baz_uint32",
    "baz_uint64",
];
pub const BAZ_VALUES: [&str; 14] = [
    "test 1", "true", "1.234", "9.876", "-12345", "-8", "-16", "-32", "-64", "12345", "8", "16",
    "32", "64",
];

pub fn foo(n: isize) -> Foo {
    Foo {
        string_field: format!("test {}", n),
        int_field: n,
        ignored_field: 99,
    }
}

pub fn bar(n: isize) -> Bar {
    Bar {
        int_field: n,
        string_field: format!("test {}", n),
    }
}

pub fn baz() -> Baz {
    Baz {
        string_field: "test 1".to_string(),
        bool_field: true,
        float32_field: 1.234,
        float64_field: 9.876,
        int_field: -12345,
        int8_field: -8,
        int16_field: -16,
        int32_field: -32,
        int64_field: -64,
        uint_field: 12345,
        uint8_field: 8,
        uint16_field: 16,
        uint32_field: 32,
        uint64_field: 64,
    }
}

/// Three `Foo`, then three `Bar`, then one `Baz`, then close.
pub fn write_sequential(writer: &mut dyn LuWriter) {
    for n in 1..=3 {
        writer.write(&foo(n)).unwrap();
    }
    for n in 1..=3 {
        writer.write(&bar(n)).unwrap();
    }
    writer.write(&baz()).unwrap();
    writer.close().unwrap();
}

/// `Foo` and `Bar` alternating, then one `Baz`, then close.
pub fn write_interleaved(writer: &mut dyn LuWriter) {
    for n in 1..=3 {
        writer.write(&foo(n)).unwrap();
        writer.write(&bar(n)).unwrap();
    }
    writer.write(&baz()).unwrap();
    writer.close().unwrap();
}

/// One `Foo` and one `Bar`, then cancel.
pub fn write_and_cancel(writer: &mut dyn LuWriter) {
    writer.write(&foo(1)).unwrap();
    writer.write(&bar(1)).unwrap();
    writer.cancel().unwrap();
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

/// Names of the files left in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Output prefix placing every file inside `dir`.
pub fn prefix_in(dir: &Path) -> String {
    format!("{}/", dir.display())
}
