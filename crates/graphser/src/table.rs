// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Flat entry table: the encoder's output and the decoder's input.
//!
//! Position is identity. Indices `0..PRECODED_COUNT` are the implied
//! constants; entry `i` of [`Table::entries`] sits at index
//! `PRECODED_COUNT + i`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::precoded::{precoded_value, EMPTY_STRING, PRECODED_COUNT};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Type tags
// ---------------------------------------------------------------------------

pub const TAG_UNKNOWN: u8 = 0;
pub const TAG_BOOLEAN: u8 = 1;
pub const TAG_NUMBER: u8 = 2;
pub const TAG_STRING: u8 = 3;
pub const TAG_ARRAY: u8 = 4;
pub const TAG_OBJECT: u8 = 5;
pub const TAG_DATE: u8 = 6;
pub const TAG_PATTERN: u8 = 7;
pub const TAG_CALLABLE: u8 = 8;
pub const TAG_INTEGER: u8 = 9;
pub const TAG_FLOAT: u8 = 10;
pub const TAG_TEXT: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TypeTag {
    Unknown = TAG_UNKNOWN,
    Boolean = TAG_BOOLEAN,
    Number = TAG_NUMBER,
    String = TAG_STRING,
    Array = TAG_ARRAY,
    Object = TAG_OBJECT,
    Date = TAG_DATE,
    Pattern = TAG_PATTERN,
    Callable = TAG_CALLABLE,
    Integer = TAG_INTEGER,
    Float = TAG_FLOAT,
    Text = TAG_TEXT,
}

impl TypeTag {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            TAG_UNKNOWN => Ok(Self::Unknown),
            TAG_BOOLEAN => Ok(Self::Boolean),
            TAG_NUMBER => Ok(Self::Number),
            TAG_STRING => Ok(Self::String),
            TAG_ARRAY => Ok(Self::Array),
            TAG_OBJECT => Ok(Self::Object),
            TAG_DATE => Ok(Self::Date),
            TAG_PATTERN => Ok(Self::Pattern),
            TAG_CALLABLE => Ok(Self::Callable),
            TAG_INTEGER => Ok(Self::Integer),
            TAG_FLOAT => Ok(Self::Float),
            TAG_TEXT => Ok(Self::Text),
            _ => Err(Error::UnknownTypeTag(v)),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Tags whose entries are graph nodes with a stream-local id.
    pub fn is_structural(self) -> bool {
        (TAG_BOOLEAN..=TAG_CALLABLE).contains(&self.as_u8())
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Ordered `(key_index, value_index)` pairs.
pub type Pairs = Vec<(usize, usize)>;

/// One row of the table.
///
/// Every structural variant carries `properties`: own properties beyond the
/// kind's intrinsic payload, in insertion order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Entry {
    /// Opaque value, resolved through the stream's registry.
    Unknown { local_id: u32 },
    Boolean {
        id: u32,
        value: usize,
        properties: Pairs,
    },
    Number {
        id: u32,
        value: usize,
        properties: Pairs,
    },
    String {
        id: u32,
        value: usize,
        properties: Pairs,
    },
    Array {
        id: u32,
        elements: Vec<usize>,
        properties: Pairs,
    },
    Object { id: u32, properties: Pairs },
    /// `value` points at the numeric timestamp.
    Date {
        id: u32,
        value: usize,
        properties: Pairs,
    },
    /// `value` points at the `/source/flags` text.
    Pattern {
        id: u32,
        value: usize,
        properties: Pairs,
    },
    /// `value` points at the source text.
    Callable {
        id: u32,
        value: usize,
        properties: Pairs,
    },
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Entry {
    /// Empty structural entry for `tag`, filled in after its children are
    /// encoded. `None` for non-structural tags.
    pub(crate) fn placeholder(tag: TypeTag, id: u32) -> Option<Self> {
        let properties = Pairs::new();
        let value = 0;
        let entry = match tag {
            TypeTag::Boolean => Self::Boolean {
                id,
                value,
                properties,
            },
            TypeTag::Number => Self::Number {
                id,
                value,
                properties,
            },
            TypeTag::String => Self::String {
                id,
                value,
                properties,
            },
            TypeTag::Array => Self::Array {
                id,
                elements: Vec::new(),
                properties,
            },
            TypeTag::Object => Self::Object { id, properties },
            TypeTag::Date => Self::Date {
                id,
                value,
                properties,
            },
            TypeTag::Pattern => Self::Pattern {
                id,
                value,
                properties,
            },
            TypeTag::Callable => Self::Callable {
                id,
                value,
                properties,
            },
            _ => return None,
        };
        Some(entry)
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Unknown { .. } => TypeTag::Unknown,
            Self::Boolean { .. } => TypeTag::Boolean,
            Self::Number { .. } => TypeTag::Number,
            Self::String { .. } => TypeTag::String,
            Self::Array { .. } => TypeTag::Array,
            Self::Object { .. } => TypeTag::Object,
            Self::Date { .. } => TypeTag::Date,
            Self::Pattern { .. } => TypeTag::Pattern,
            Self::Callable { .. } => TypeTag::Callable,
            Self::Integer(_) => TypeTag::Integer,
            Self::Float(_) => TypeTag::Float,
            Self::Text(_) => TypeTag::Text,
        }
    }

    /// Stream-local id of a structural entry.
    pub fn id(&self) -> Option<u32> {
        match self {
            Self::Boolean { id, .. }
            | Self::Number { id, .. }
            | Self::String { id, .. }
            | Self::Array { id, .. }
            | Self::Object { id, .. }
            | Self::Date { id, .. }
            | Self::Pattern { id, .. }
            | Self::Callable { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Index of the intrinsic scalar payload (boxed value, timestamp, text).
    pub fn value(&self) -> Option<usize> {
        match self {
            Self::Boolean { value, .. }
            | Self::Number { value, .. }
            | Self::String { value, .. }
            | Self::Date { value, .. }
            | Self::Pattern { value, .. }
            | Self::Callable { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn elements(&self) -> &[usize] {
        match self {
            Self::Array { elements, .. } => elements,
            _ => &[],
        }
    }

    pub fn properties(&self) -> &[(usize, usize)] {
        match self {
            Self::Boolean { properties, .. }
            | Self::Number { properties, .. }
            | Self::String { properties, .. }
            | Self::Array { properties, .. }
            | Self::Object { properties, .. }
            | Self::Date { properties, .. }
            | Self::Pattern { properties, .. }
            | Self::Callable { properties, .. } => properties,
            _ => &[],
        }
    }

    pub(crate) fn set_value(&mut self, index: usize) {
        match self {
            Self::Boolean { value, .. }
            | Self::Number { value, .. }
            | Self::String { value, .. }
            | Self::Date { value, .. }
            | Self::Pattern { value, .. }
            | Self::Callable { value, .. } => *value = index,
            _ => {}
        }
    }

    pub(crate) fn push_element(&mut self, index: usize) {
        if let Self::Array { elements, .. } = self {
            elements.push(index);
        }
    }

    pub(crate) fn push_property(&mut self, key: usize, value: usize) {
        match self {
            Self::Boolean { properties, .. }
            | Self::Number { properties, .. }
            | Self::String { properties, .. }
            | Self::Array { properties, .. }
            | Self::Object { properties, .. }
            | Self::Date { properties, .. }
            | Self::Pattern { properties, .. }
            | Self::Callable { properties, .. } => properties.push((key, value)),
            _ => {}
        }
    }

    /// Primitive value of a scalar payload entry.
    pub fn scalar(&self) -> Option<Value> {
        match self {
            Self::Integer(n) => Some(Value::Number(*n as f64)),
            Self::Float(f) => Some(Value::Number(*f)),
            Self::Text(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Encoded graph: entries after the implied constants, plus the root index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    entries: Vec<Entry>,
    root: usize,
}

impl Table {
    pub fn new(entries: Vec<Entry>, root: usize) -> Self {
        Self { entries, root }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn root(&self) -> usize {
        self.root
    }

    /// Logical length, including the implied constants.
    pub fn len(&self) -> usize {
        PRECODED_COUNT + self.entries.len()
    }

    /// Never true: the implied constants are always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Entry stored at logical `index`; `None` for constants and past the end.
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        index
            .checked_sub(PRECODED_COUNT)
            .and_then(|i| self.entries.get(i))
    }

    /// Primitive at `index`: a constant or a scalar payload entry.
    pub fn scalar_at(&self, index: usize) -> Result<Value> {
        if let Some(value) = precoded_value(index) {
            return Ok(value);
        }
        let len = self.len();
        let entry = self
            .entry(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        entry.scalar().ok_or(Error::NotAScalar { index })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    fn is_text(&self, index: usize) -> bool {
        index == EMPTY_STRING || matches!(self.entry(index), Some(Entry::Text(_)))
    }

    /// Check every index an entry mentions: in range, intrinsic payloads
    /// are scalars, property keys are strings.
    pub fn validate(&self) -> Result<()> {
        self.check_index(self.root)?;
        for entry in &self.entries {
            if let Some(value) = entry.value() {
                self.scalar_at(value)?;
            }
            for &element in entry.elements() {
                self.check_index(element)?;
            }
            for &(key, value) in entry.properties() {
                self.check_index(key)?;
                self.check_index(value)?;
                if !self.is_text(key) {
                    return Err(Error::MalformedEntry {
                        tag: entry.tag().as_u8(),
                        reason: format!("property key at index {} is not a string", key),
                    });
                }
            }
        }
        Ok(())
    }
}
