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

//! # Lu Record Module
//!
//! This module defines what a persistable record is. A record is any struct
//! implementing [`LuRecord`], which exposes a static, declaration-ordered list
//! of field descriptors and a way to read each field's current value.
//!
//! Records are normally declared with the [`lu_record!`](crate::lu_record)
//! macro. Fields carry an optional annotation of the form `label[,pk]`:
//!
//! ```rust
//! use lu::lu_record;
//!
//! lu_record! {
//!     #[derive(Clone, Debug)]
//!     pub struct Foo {
//!         #[lu("foo_string,pk")]
//!         pub name: String,
//!         #[lu("foo_int")]
//!         pub count: i64,
//!         pub scratch: i64,
//!     }
//! }
//! ```
//!
//! - `label` becomes the column or key name in every output
//! - `pk` marks the field as part of the primary key for sinks that model one
//! - fields without an annotation, and private fields, are never persisted
//!
//! ## Field Kinds
//!
//! Every field type implements [`LuField`], which reports its [`LuKind`].
//! Scalar kinds (text, booleans, floats, signed and unsigned integers) are
//! supported. Collections, options, pointers and nested records compile, but
//! are rejected when the record type is first written, with an error naming
//! the kind, the field and the record type.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::LuValue;

/// Semantic kind of a record field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LuKind {
    String,
    Bool,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    Slice,
    Array,
    Map,
    Set,
    Option,
    Pointer,
    Struct,
    Char,
    Unit,
}

impl LuKind {
    /// Returns true for the scalar kinds every sink can persist.
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            LuKind::String
                | LuKind::Bool
                | LuKind::F32
                | LuKind::F64
                | LuKind::I8
                | LuKind::I16
                | LuKind::I32
                | LuKind::I64
                | LuKind::Isize
                | LuKind::U8
                | LuKind::U16
                | LuKind::U32
                | LuKind::U64
                | LuKind::Usize
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LuKind::String => "string",
            LuKind::Bool => "bool",
            LuKind::F32 => "float32",
            LuKind::F64 => "float64",
            LuKind::I8 => "int8",
            LuKind::I16 => "int16",
            LuKind::I32 => "int32",
            LuKind::I64 => "int64",
            LuKind::Isize => "int",
            LuKind::U8 => "uint8",
            LuKind::U16 => "uint16",
            LuKind::U32 => "uint32",
            LuKind::U64 => "uint64",
            LuKind::Usize => "uint",
            LuKind::Slice => "slice",
            LuKind::Array => "array",
            LuKind::Map => "map",
            LuKind::Set => "set",
            LuKind::Option => "option",
            LuKind::Pointer => "pointer",
            LuKind::Struct => "struct",
            LuKind::Char => "char",
            LuKind::Unit => "unit",
        }
    }
}

impl fmt::Display for LuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LuFieldDef {
    /// Field name as declared in the struct.
    pub name: &'static str,
    /// Whether the field is visible outside its module.
    pub exported: bool,
    /// Kind of the field's type.
    pub kind: LuKind,
    /// Raw annotation, `None` when the field has none.
    pub tag: Option<&'static str>,
}

/// Identity of a record shape, used as the registry key.
///
/// Two record types are the same exactly when their Rust types are the same;
/// the name is carried for output naming and diagnostics only.
#[derive(Clone, Copy, Debug)]
pub struct LuRecordType {
    id: TypeId,
    name: &'static str,
    path: &'static str,
}

impl LuRecordType {
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        LuRecordType {
            id: TypeId::of::<T>(),
            name,
            path: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fully qualified type path, for telling same-named types apart.
    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for LuRecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LuRecordType {}

impl Hash for LuRecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for LuRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value that can be handed to a Lu writer.
pub trait LuRecord {
    /// Identity of the record's shape.
    fn record_type(&self) -> LuRecordType;

    /// Declared fields, in declaration order.
    fn fields(&self) -> &'static [LuFieldDef];

    /// Current value of the field at `index` in [`LuRecord::fields`].
    ///
    /// Returns `None` for an out of range index or a field whose kind has no
    /// scalar value.
    fn value_at(&self, index: usize) -> Option<LuValue>;

    fn type_name(&self) -> &'static str {
        self.record_type().name()
    }
}

macro_rules! lu_forward_record {
    ($($wrapper:ident),*) => {
        $(
            impl<R: LuRecord + ?Sized> LuRecord for $wrapper<R> {
                fn record_type(&self) -> LuRecordType {
                    (**self).record_type()
                }

                fn fields(&self) -> &'static [LuFieldDef] {
                    (**self).fields()
                }

                fn value_at(&self, index: usize) -> Option<LuValue> {
                    (**self).value_at(index)
                }
            }
        )*
    };
}

lu_forward_record!(Box, Rc, Arc);

/// Kind and scalar value of a field type.
pub trait LuField {
    const KIND: LuKind;

    /// Scalar value of the field, `None` for unsupported kinds.
    fn to_value(&self) -> Option<LuValue>;
}

macro_rules! lu_scalar_field {
    ($($ty:ty => $kind:ident, $variant:ident);* $(;)?) => {
        $(
            impl LuField for $ty {
                const KIND: LuKind = LuKind::$kind;

                fn to_value(&self) -> Option<LuValue> {
                    Some(LuValue::$variant(*self))
                }
            }
        )*
    };
}

lu_scalar_field! {
    bool => Bool, Bool;
    f32 => F32, F32;
    f64 => F64, F64;
    i8 => I8, I8;
    i16 => I16, I16;
    i32 => I32, I32;
    i64 => I64, I64;
    isize => Isize, Isize;
    u8 => U8, U8;
    u16 => U16, U16;
    u32 => U32, U32;
    u64 => U64, U64;
    usize => Usize, Usize;
}

impl LuField for String {
    const KIND: LuKind = LuKind::String;

    fn to_value(&self) -> Option<LuValue> {
        Some(LuValue::Text(self.clone()))
    }
}

impl LuField for &'static str {
    const KIND: LuKind = LuKind::String;

    fn to_value(&self) -> Option<LuValue> {
        Some(LuValue::Text((*self).to_string()))
    }
}

macro_rules! lu_rejected_field {
    ($kind:ident => $($ty:ty),* $(,)?) => {
        $(
            impl LuField for $ty {
                const KIND: LuKind = LuKind::$kind;

                fn to_value(&self) -> Option<LuValue> {
                    None
                }
            }
        )*
    };
}

lu_rejected_field!(Char => char);
lu_rejected_field!(Unit => ());

impl<T> LuField for Vec<T> {
    const KIND: LuKind = LuKind::Slice;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<T, const N: usize> LuField for [T; N] {
    const KIND: LuKind = LuKind::Array;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<K, V, S> LuField for HashMap<K, V, S> {
    const KIND: LuKind = LuKind::Map;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<K, V> LuField for BTreeMap<K, V> {
    const KIND: LuKind = LuKind::Map;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<T, S> LuField for HashSet<T, S> {
    const KIND: LuKind = LuKind::Set;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<T> LuField for BTreeSet<T> {
    const KIND: LuKind = LuKind::Set;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<T> LuField for Option<T> {
    const KIND: LuKind = LuKind::Option;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<T: ?Sized> LuField for Box<T> {
    const KIND: LuKind = LuKind::Pointer;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<T: ?Sized> LuField for Rc<T> {
    const KIND: LuKind = LuKind::Pointer;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

impl<T: ?Sized> LuField for Arc<T> {
    const KIND: LuKind = LuKind::Pointer;

    fn to_value(&self) -> Option<LuValue> {
        None
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __lu_tag {
    () => {
        ::core::option::Option::None
    };
    ([lu($tag:literal)] $($rest:tt)*) => {
        ::core::option::Option::Some($tag)
    };
    ([$($other:tt)*] $($rest:tt)*) => {
        $crate::__lu_tag!($($rest)*)
    };
}

/// Emits the struct of a `lu_record!`, keeping every field attribute except
/// the `lu` annotation.
#[doc(hidden)]
#[macro_export]
macro_rules! __lu_struct {
    (@head [$($head:tt)*] @fields [$($fields:tt)*] @todo []) => {
        $($head)* { $($fields)* }
    };
    (@head $head:tt @fields $fields:tt
     @todo [[[$($attrs:tt)*] [$($field:tt)*]] $($rest:tt)*]) => {
        $crate::__lu_struct! {
            @head $head @fields $fields
            @attrs [$($attrs)*] @keep [] @field [$($field)*]
            @todo [$($rest)*]
        }
    };
    (@head $head:tt @fields $fields:tt
     @attrs [[lu $($tag:tt)*] $($attrs:tt)*] @keep $keep:tt @field $field:tt
     @todo $todo:tt) => {
        $crate::__lu_struct! {
            @head $head @fields $fields
            @attrs [$($attrs)*] @keep $keep @field $field
            @todo $todo
        }
    };
    (@head $head:tt @fields $fields:tt
     @attrs [[$($attr:tt)*] $($attrs:tt)*] @keep [$($keep:tt)*] @field $field:tt
     @todo $todo:tt) => {
        $crate::__lu_struct! {
            @head $head @fields $fields
            @attrs [$($attrs)*] @keep [$($keep)* #[$($attr)*]] @field $field
            @todo $todo
        }
    };
    (@head $head:tt @fields [$($fields:tt)*]
     @attrs [] @keep [$($keep:tt)*] @field [$($field:tt)*]
     @todo $todo:tt) => {
        $crate::__lu_struct! {
            @head $head @fields [$($fields)* $($keep)* $($field)*,]
            @todo $todo
        }
    };
}

/// Declares a struct and implements [`LuRecord`](crate::record::LuRecord)
/// for it.
///
/// Annotate persisted fields with `#[lu("label")]` or `#[lu("label,pk")]`.
/// Other field attributes, doc comments included, are kept on the struct.
/// The struct also implements [`LuField`](crate::record::LuField) with kind
/// `struct`, so nesting it inside another record is reported as an
/// unsupported field.
#[macro_export]
macro_rules! lu_record {
    (
        $(#[$smeta:meta])*
        $svis:vis struct $name:ident {
            $(
                $(#[$($fattr:tt)*])*
                $fvis:vis $fname:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $crate::__lu_struct! {
            @head [$(#[$smeta])* $svis struct $name]
            @fields []
            @todo [$([[$([$($fattr)*])*] [$fvis $fname : $fty]])*]
        }

        impl $crate::record::LuRecord for $name {
            fn record_type(&self) -> $crate::record::LuRecordType {
                $crate::record::LuRecordType::of::<$name>(stringify!($name))
            }

            fn fields(&self) -> &'static [$crate::record::LuFieldDef] {
                const FIELDS: &[$crate::record::LuFieldDef] = &[
                    $(
                        $crate::record::LuFieldDef {
                            name: stringify!($fname),
                            exported: !stringify!($fvis).is_empty(),
                            kind: <$fty as $crate::record::LuField>::KIND,
                            tag: $crate::__lu_tag!($([$($fattr)*])*),
                        },
                    )*
                ];
                FIELDS
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn value_at(&self, index: usize) -> ::core::option::Option<$crate::value::LuValue> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return $crate::record::LuField::to_value(&self.$fname);
                    }
                    position += 1;
                )*
                ::core::option::Option::None
            }
        }

        impl $crate::record::LuField for $name {
            const KIND: $crate::record::LuKind = $crate::record::LuKind::Struct;

            fn to_value(&self) -> ::core::option::Option<$crate::value::LuValue> {
                ::core::option::Option::None
            }
        }
    };
}
