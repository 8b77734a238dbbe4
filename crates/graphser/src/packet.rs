// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compact packet stream for entry tables.
//!
//! ## Packet layout
//!
//! ```text
//! +-----+----------------+---------------------+
//! | tag | length (int)   | payload (length ch) |
//! +-----+----------------+---------------------+
//!   1ch   1..=10 chars
//! ```
//!
//! The tag is the base-94 digit of the type tag (0..=11). Payloads:
//!
//! | Tag            | Payload                                      |
//! |----------------|----------------------------------------------|
//! | 0 Unknown      | local id                                     |
//! | 1-3, 6-8       | id, value index, (key, value) pairs          |
//! | 4 Array        | id, element count, elements, pairs           |
//! | 5 Object       | id, pairs                                    |
//! | 9 Integer      | integer                                      |
//! | 10 Float       | decimal text                                 |
//! | 11 Text        | escaped string                               |
//!
//! All integers use the variable-length codec. The stream ends with one
//! Integer packet holding the root index.

use crate::codec::{
    decode_float, decode_integer, decode_string, digit_at, digit_char, encode_float,
    encode_integer_into, encode_string_into,
};
use crate::error::{Error, Result};
use crate::table::{Entry, Pairs, Table, TypeTag};

/// Default bound on entries accepted by [`Table::from_packets`].
pub const DEFAULT_MAX_ENTRIES: usize = 1 << 24;

/// One decoded packet, borrowing its payload from the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub tag: TypeTag,
    pub payload: &'a str,
    /// Offset of the first char after this packet.
    pub next_offset: usize,
}

/// Append one packet to `out`.
pub fn frame_into(tag: TypeTag, payload: &str, out: &mut String) -> Result<()> {
    let length = i64::try_from(payload.len())
        .map_err(|_| Error::IntegerOutOfRange(payload.len() as i128))?;
    out.push(digit_char(u64::from(tag.as_u8())));
    encode_integer_into(length, out)?;
    out.push_str(payload);
    Ok(())
}

/// Frame one packet into a fresh string.
pub fn frame(tag: TypeTag, payload: &str) -> Result<String> {
    let mut out = String::with_capacity(payload.len() + 4);
    frame_into(tag, payload, &mut out)?;
    Ok(out)
}

/// Read the packet starting at byte `offset` of `text`.
pub fn unframe(text: &str, offset: usize) -> Result<Packet<'_>> {
    let raw_tag = digit_at(text, offset)?;
    let tag = TypeTag::from_u8(raw_tag as u8)?;

    let (length, width) = decode_integer(text, offset + 1)?;
    let length = usize::try_from(length).map_err(|_| Error::MalformedEntry {
        tag: tag.as_u8(),
        reason: format!("negative payload length {}", length),
    })?;

    let start = offset + 1 + width;
    let remaining = text.len().saturating_sub(start);
    if length > remaining {
        return Err(Error::LengthOverrun {
            offset,
            length,
            remaining,
        });
    }
    let end = start + length;
    let payload = text.get(start..end).ok_or_else(|| Error::MalformedEntry {
        tag: tag.as_u8(),
        reason: "payload is not printable text".into(),
    })?;

    Ok(Packet {
        tag,
        payload,
        next_offset: end,
    })
}

// ---------------------------------------------------------------------------
// Payload integer sequences
// ---------------------------------------------------------------------------

struct IntReader<'a> {
    text: &'a str,
    offset: usize,
    tag: TypeTag,
}

impl<'a> IntReader<'a> {
    fn new(text: &'a str, tag: TypeTag) -> Self {
        Self {
            text,
            offset: 0,
            tag,
        }
    }

    fn at_end(&self) -> bool {
        self.offset >= self.text.len()
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::MalformedEntry {
            tag: self.tag.as_u8(),
            reason: reason.into(),
        }
    }

    fn int(&mut self) -> Result<i64> {
        if self.at_end() {
            return Err(self.malformed("payload ended early"));
        }
        let (value, width) = decode_integer(self.text, self.offset)?;
        self.offset += width;
        Ok(value)
    }

    fn index(&mut self) -> Result<usize> {
        let value = self.int()?;
        usize::try_from(value).map_err(|_| self.malformed(format!("negative index {}", value)))
    }

    fn id(&mut self) -> Result<u32> {
        let value = self.int()?;
        u32::try_from(value).map_err(|_| self.malformed(format!("id {} out of range", value)))
    }

    fn pairs(&mut self) -> Result<Pairs> {
        let mut pairs = Pairs::new();
        while !self.at_end() {
            let key = self.index()?;
            if self.at_end() {
                return Err(self.malformed("property key without value"));
            }
            pairs.push((key, self.index()?));
        }
        Ok(pairs)
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.malformed("trailing payload"))
        }
    }
}

fn push_index(index: usize, out: &mut String) -> Result<()> {
    let value = i64::try_from(index).map_err(|_| Error::IntegerOutOfRange(index as i128))?;
    encode_integer_into(value, out)
}

fn push_pairs(pairs: &[(usize, usize)], out: &mut String) -> Result<()> {
    for &(key, value) in pairs {
        push_index(key, out)?;
        push_index(value, out)?;
    }
    Ok(())
}

fn entry_payload(entry: &Entry) -> Result<String> {
    let mut out = String::new();
    match entry {
        Entry::Unknown { local_id } => encode_integer_into(i64::from(*local_id), &mut out)?,
        Entry::Array {
            id,
            elements,
            properties,
        } => {
            encode_integer_into(i64::from(*id), &mut out)?;
            push_index(elements.len(), &mut out)?;
            for &element in elements {
                push_index(element, &mut out)?;
            }
            push_pairs(properties, &mut out)?;
        }
        Entry::Object { id, properties } => {
            encode_integer_into(i64::from(*id), &mut out)?;
            push_pairs(properties, &mut out)?;
        }
        Entry::Boolean {
            id,
            value,
            properties,
        }
        | Entry::Number {
            id,
            value,
            properties,
        }
        | Entry::String {
            id,
            value,
            properties,
        }
        | Entry::Date {
            id,
            value,
            properties,
        }
        | Entry::Pattern {
            id,
            value,
            properties,
        }
        | Entry::Callable {
            id,
            value,
            properties,
        } => {
            encode_integer_into(i64::from(*id), &mut out)?;
            push_index(*value, &mut out)?;
            push_pairs(properties, &mut out)?;
        }
        Entry::Integer(n) => encode_integer_into(*n, &mut out)?,
        Entry::Float(f) => out.push_str(&encode_float(*f)),
        Entry::Text(s) => encode_string_into(s, &mut out),
    }
    Ok(out)
}

fn parse_entry(tag: TypeTag, payload: &str) -> Result<Entry> {
    let mut reader = IntReader::new(payload, tag);
    let entry = match tag {
        TypeTag::Unknown => {
            let local_id = reader.id()?;
            reader.finish()?;
            Entry::Unknown { local_id }
        }
        TypeTag::Array => {
            let id = reader.id()?;
            let count = reader.index()?;
            if count > payload.len() {
                return Err(reader.malformed(format!("element count {} exceeds payload", count)));
            }
            let mut elements = Vec::with_capacity(count);
            for _ in 0..count {
                elements.push(reader.index()?);
            }
            Entry::Array {
                id,
                elements,
                properties: reader.pairs()?,
            }
        }
        TypeTag::Object => {
            let id = reader.id()?;
            Entry::Object {
                id,
                properties: reader.pairs()?,
            }
        }
        TypeTag::Integer => {
            let n = reader.int()?;
            reader.finish()?;
            Entry::Integer(n)
        }
        TypeTag::Float => Entry::Float(decode_float(payload)?),
        TypeTag::Text => Entry::Text(decode_string(payload)?),
        _ => {
            let id = reader.id()?;
            let value = reader.index()?;
            let mut entry = Entry::placeholder(tag, id)
                .ok_or_else(|| reader.malformed("not a structural tag"))?;
            entry.set_value(value);
            for (key, value) in reader.pairs()? {
                entry.push_property(key, value);
            }
            entry
        }
    };
    Ok(entry)
}

impl Table {
    /// Serialize as a packet stream: one packet per entry, then the root.
    pub fn to_packets(&self) -> Result<String> {
        let mut out = String::new();
        for entry in self.entries() {
            let payload = entry_payload(entry)?;
            frame_into(entry.tag(), &payload, &mut out)?;
        }
        let mut root = String::new();
        push_index(self.root(), &mut root)?;
        frame_into(TypeTag::Integer, &root, &mut out)?;
        Ok(out)
    }

    /// Parse a packet stream produced by [`Table::to_packets`].
    pub fn from_packets(text: &str) -> Result<Self> {
        Self::from_packets_bounded(text, DEFAULT_MAX_ENTRIES)
    }

    /// Parse a packet stream, rejecting more than `max_entries` entries.
    pub fn from_packets_bounded(text: &str, max_entries: usize) -> Result<Self> {
        let mut entries = Vec::new();
        let mut offset = 0;
        while offset < text.len() {
            let packet = unframe(text, offset)?;
            entries.push(parse_entry(packet.tag, packet.payload)?);
            if entries.len() > max_entries.saturating_add(1) {
                return Err(Error::TableTooLarge {
                    entries: entries.len() - 1,
                    max: max_entries,
                });
            }
            offset = packet.next_offset;
        }

        let root = match entries.pop() {
            Some(Entry::Integer(root)) => {
                usize::try_from(root).map_err(|_| Error::MalformedEntry {
                    tag: TypeTag::Integer.as_u8(),
                    reason: format!("negative root index {}", root),
                })?
            }
            _ => return Err(Error::MissingRoot),
        };
        Ok(Self::new(entries, root))
    }
}
