// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graph encoder: walks a value graph and emits a flat entry table.
//!
//! A reference's slot and id are reserved (and the object marked) before its
//! children are visited, so a child that points back at an ancestor resolves
//! to the ancestor's index instead of recursing.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::marker::MarkScope;
use crate::precoded::{classify, Class, ScalarKey, PRECODED_COUNT};
use crate::registry::OpaqueRegistry;
use crate::table::{Entry, Table, TypeTag};
use crate::value::{ObjRef, ObjectKind, OpaqueRef, Value};

/// Children of one object, copied out so no borrow is held while recursing.
struct Snapshot {
    tag: TypeTag,
    payload: Option<Value>,
    elements: Vec<Value>,
    properties: Vec<(String, Value)>,
}

impl Snapshot {
    fn of(obj: &ObjRef) -> Self {
        let body = obj.borrow();
        let (tag, payload) = match body.kind() {
            ObjectKind::Boolean(b) => (TypeTag::Boolean, Some(Value::Bool(*b))),
            ObjectKind::Number(n) => (TypeTag::Number, Some(Value::Number(*n))),
            ObjectKind::String(s) => (TypeTag::String, Some(Value::String(s.clone()))),
            ObjectKind::Array => (TypeTag::Array, None),
            ObjectKind::Plain => (TypeTag::Object, None),
            ObjectKind::Date(ms) => (TypeTag::Date, Some(Value::Number(*ms))),
            ObjectKind::Pattern(p) => (TypeTag::Pattern, Some(Value::String(p.to_text()))),
            ObjectKind::Callable(c) => {
                (TypeTag::Callable, Some(Value::String(c.source().to_string())))
            }
        };
        Self {
            tag,
            payload,
            elements: body.elements().to_vec(),
            properties: body.properties().to_vec(),
        }
    }
}

/// State of one encode pass.
pub(crate) struct Encoder<'a, R: OpaqueRegistry + ?Sized> {
    scope: MarkScope<'a>,
    registry: &'a mut R,
    next_id: &'a mut u32,
    retained: Option<&'a mut HashMap<u32, ObjRef>>,
    max_depth: usize,
    entries: Vec<Entry>,
    scalars: HashMap<ScalarKey, usize>,
    opaques: HashMap<u32, usize>,
}

impl<'a, R: OpaqueRegistry + ?Sized> Encoder<'a, R> {
    pub(crate) fn new(
        scope: MarkScope<'a>,
        registry: &'a mut R,
        next_id: &'a mut u32,
        retained: Option<&'a mut HashMap<u32, ObjRef>>,
        max_depth: usize,
    ) -> Self {
        Self {
            scope,
            registry,
            next_id,
            retained,
            max_depth,
            entries: Vec::new(),
            scalars: HashMap::new(),
            opaques: HashMap::new(),
        }
    }

    /// Encode `root` and close the pass. Marks are cleared on every path.
    pub(crate) fn finish(mut self, root: &Value) -> Result<Table> {
        let root = self.encode_value(root, 0)?;
        Ok(Table::new(std::mem::take(&mut self.entries), root))
    }

    fn next_index(&self) -> usize {
        PRECODED_COUNT + self.entries.len()
    }

    fn push(&mut self, entry: Entry) -> usize {
        let index = self.next_index();
        self.entries.push(entry);
        index
    }

    fn encode_value(&mut self, value: &Value, depth: usize) -> Result<usize> {
        match classify(value) {
            Class::Precoded(index) => Ok(index),
            Class::Scalar(key) => Ok(self.encode_scalar(key)),
            Class::Opaque(opaque) => Ok(self.encode_opaque(opaque)),
            Class::Reference(obj) => self.encode_reference(obj, depth),
        }
    }

    fn encode_scalar(&mut self, key: ScalarKey) -> usize {
        if let Some(&index) = self.scalars.get(&key) {
            return index;
        }
        let entry = match &key {
            ScalarKey::Integer(n) => Entry::Integer(*n),
            ScalarKey::Float(bits) => Entry::Float(f64::from_bits(*bits)),
            ScalarKey::Text(s) => Entry::Text(s.clone()),
        };
        let index = self.push(entry);
        self.scalars.insert(key, index);
        index
    }

    fn encode_opaque(&mut self, opaque: &OpaqueRef) -> usize {
        let local_id = self.registry.get_or_register(opaque);
        if let Some(&index) = self.opaques.get(&local_id) {
            return index;
        }
        let index = self.push(Entry::Unknown { local_id });
        self.opaques.insert(local_id, index);
        index
    }

    fn encode_reference(&mut self, obj: &ObjRef, depth: usize) -> Result<usize> {
        if let Some(index) = self.scope.index_of(obj) {
            return Ok(index);
        }
        if depth >= self.max_depth {
            return Err(Error::DepthExceeded(self.max_depth));
        }

        let id = *self.next_id;
        *self.next_id = id.wrapping_add(1);
        if let Some(retained) = self.retained.as_deref_mut() {
            retained.insert(id, obj.clone());
        }

        let snapshot = Snapshot::of(obj);
        let slot = self.next_index();
        self.scope.mark(obj, slot);
        let placeholder =
            Entry::placeholder(snapshot.tag, id).ok_or_else(|| Error::MalformedEntry {
                tag: snapshot.tag.as_u8(),
                reason: "not a structural tag".into(),
            })?;
        self.push(placeholder);
        let at = slot - PRECODED_COUNT;

        if let Some(payload) = &snapshot.payload {
            let index = self.encode_value(payload, depth + 1)?;
            self.entries[at].set_value(index);
        }
        for element in &snapshot.elements {
            let index = self.encode_value(element, depth + 1)?;
            self.entries[at].push_element(index);
        }
        for (key, value) in &snapshot.properties {
            let key_index = self.encode_value(&Value::String(key.clone()), depth + 1)?;
            let value_index = self.encode_value(value, depth + 1)?;
            self.entries[at].push_property(key_index, value_index);
        }
        Ok(slot)
    }
}
