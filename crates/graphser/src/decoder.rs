// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graph decoder: two-phase reconstruction over an index arena.
//!
//! Phase 1 allocates one value per table position: primitives, empty
//! skeletons for structural entries, live originals for registry-backed
//! positions. Phase 2 fills skeleton elements and properties from the arena
//! by index. Positions whose value came from outside the table (opaque
//! objects, retained originals) are never relinked.

use std::collections::HashMap;

use crate::compiler::{looks_like_callable, SourceCompiler};
use crate::error::{Error, Result};
use crate::precoded::{precoded_value, PRECODED_COUNT};
use crate::registry::OpaqueRegistry;
use crate::table::{Entry, Table};
use crate::value::{Callable, ObjRef, ObjectKind, OpaqueRef, Pattern, Value};

pub(crate) struct Decoder<'a, R: OpaqueRegistry + ?Sized, C: SourceCompiler + ?Sized> {
    registry: &'a R,
    compiler: &'a C,
    retained: Option<&'a HashMap<u32, ObjRef>>,
    max_entries: usize,
    max_depth: usize,
}

fn slot(arena: &[Value], index: usize) -> Result<&Value> {
    arena.get(index).ok_or(Error::IndexOutOfRange {
        index,
        len: arena.len(),
    })
}

fn malformed(entry: &Entry, reason: &str) -> Error {
    Error::MalformedEntry {
        tag: entry.tag().as_u8(),
        reason: reason.to_string(),
    }
}

impl<'a, R: OpaqueRegistry + ?Sized, C: SourceCompiler + ?Sized> Decoder<'a, R, C> {
    pub(crate) fn new(
        registry: &'a R,
        compiler: &'a C,
        retained: Option<&'a HashMap<u32, ObjRef>>,
        max_entries: usize,
        max_depth: usize,
    ) -> Self {
        Self {
            registry,
            compiler,
            retained,
            max_entries,
            max_depth,
        }
    }

    pub(crate) fn decode(&self, table: &Table) -> Result<Value> {
        if table.entries().len() > self.max_entries {
            return Err(Error::TableTooLarge {
                entries: table.entries().len(),
                max: self.max_entries,
            });
        }
        table.validate()?;
        self.check_depth(table)?;

        let mut arena: Vec<Value> = Vec::with_capacity(table.len());
        let mut local = Vec::with_capacity(table.len());
        for index in 0..PRECODED_COUNT {
            arena.push(precoded_value(index).unwrap_or(Value::Undefined));
            local.push(true);
        }

        // Phase 1: skeletons.
        for (offset, entry) in table.entries().iter().enumerate() {
            let index = PRECODED_COUNT + offset;
            let (value, was_local) = self.skeleton(table, index, entry)?;
            arena.push(value);
            local.push(was_local);
        }

        // Phase 2: relink.
        for (offset, entry) in table.entries().iter().enumerate() {
            let index = PRECODED_COUNT + offset;
            if local[index] {
                continue;
            }
            let Value::Object(obj) = slot(&arena, index)? else {
                continue;
            };
            let mut body = obj.borrow_mut();
            for &element in entry.elements() {
                body.push(slot(&arena, element)?.clone());
            }
            for &(key, value) in entry.properties() {
                let Value::String(key) = slot(&arena, key)? else {
                    return Err(malformed(entry, "property key is not a string"));
                };
                body.set(key.clone(), slot(&arena, value)?.clone());
            }
        }

        Ok(slot(&arena, table.root())?.clone())
    }

    /// Walk structural entries from the root in encoding order and reject
    /// nesting the encoder would have refused. Decoded graphs drop
    /// recursively, so this also bounds the drop depth.
    fn check_depth(&self, table: &Table) -> Result<()> {
        let mut seen = vec![false; table.len()];
        let mut stack = vec![(table.root(), 0usize)];
        while let Some((index, depth)) = stack.pop() {
            let Some(entry) = table.entry(index) else {
                continue;
            };
            if !entry.tag().is_structural() || seen[index] {
                continue;
            }
            if depth >= self.max_depth {
                return Err(Error::DepthExceeded(self.max_depth));
            }
            seen[index] = true;

            let start = stack.len();
            stack.extend(entry.elements().iter().map(|&child| (child, depth + 1)));
            stack.extend(entry.properties().iter().map(|&(_, child)| (child, depth + 1)));
            stack[start..].reverse();
        }
        Ok(())
    }

    /// Phase-1 value for one entry, and whether it is exempt from relinking.
    fn skeleton(&self, table: &Table, index: usize, entry: &Entry) -> Result<(Value, bool)> {
        if let Some(scalar) = entry.scalar() {
            return Ok((scalar, true));
        }
        if let Entry::Unknown { local_id } = entry {
            return Ok((Value::Opaque(self.resolve_opaque(*local_id, index)), true));
        }
        if let (Some(retained), Some(id)) = (self.retained, entry.id()) {
            if let Some(original) = retained.get(&id) {
                return Ok((Value::Object(original.clone()), true));
            }
        }

        let payload = match entry.value() {
            Some(value) => table.scalar_at(value)?,
            None => Value::Undefined,
        };
        let kind = match entry {
            Entry::Boolean { .. } => ObjectKind::Boolean(
                payload
                    .as_bool()
                    .ok_or_else(|| malformed(entry, "payload is not a boolean"))?,
            ),
            Entry::Number { .. } => ObjectKind::Number(
                payload
                    .as_f64()
                    .ok_or_else(|| malformed(entry, "payload is not a number"))?,
            ),
            Entry::String { .. } => ObjectKind::String(
                payload
                    .as_str()
                    .ok_or_else(|| malformed(entry, "payload is not a string"))?
                    .to_string(),
            ),
            Entry::Array { .. } => ObjectKind::Array,
            Entry::Object { .. } => ObjectKind::Plain,
            Entry::Date { .. } => ObjectKind::Date(
                payload
                    .as_f64()
                    .ok_or_else(|| malformed(entry, "timestamp is not a number"))?,
            ),
            Entry::Pattern { .. } => {
                let text = payload
                    .as_str()
                    .ok_or_else(|| malformed(entry, "pattern is not a string"))?;
                ObjectKind::Pattern(Pattern::parse(text)?)
            }
            Entry::Callable { .. } => {
                let source = payload
                    .as_str()
                    .ok_or_else(|| malformed(entry, "source is not a string"))?;
                ObjectKind::Callable(self.compile(source)?)
            }
            _ => return Err(malformed(entry, "unexpected entry kind")),
        };
        Ok((Value::Object(ObjRef::new(kind)), false))
    }

    fn resolve_opaque(&self, local_id: u32, index: usize) -> OpaqueRef {
        match self.registry.resolve(local_id) {
            Some(original) => original,
            None => {
                log::warn!(
                    "Unknown opaque id {} at table index {}, using placeholder",
                    local_id,
                    index
                );
                OpaqueRef::placeholder(local_id)
            }
        }
    }

    fn compile(&self, source: &str) -> Result<Callable> {
        if !looks_like_callable(source) {
            return Err(Error::Reconstruction(format!(
                "not a callable definition: {:?}",
                source
            )));
        }
        let compiled = self.compiler.compile(source)?;
        Ok(Callable::with_compiled(source, compiled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::SourceOnly;
    use crate::registry::LocalRegistry;

    fn decode(table: &Table) -> Result<Value> {
        let registry = LocalRegistry::new();
        Decoder::new(&registry, &SourceOnly, None, 1024, 64).decode(table)
    }

    #[test]
    fn test_root_may_be_precoded() {
        let table = Table::new(vec![], 3);
        assert!(decode(&table).unwrap().strict_eq(&Value::Bool(true)));
    }

    #[test]
    fn test_self_reference_relinked() {
        let table = Table::new(
            vec![
                Entry::Object {
                    id: 0,
                    properties: vec![(10, 9)],
                },
                Entry::Text("self".into()),
            ],
            9,
        );
        let value = decode(&table).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.get("self").unwrap().strict_eq(&value));
        obj.borrow_mut().clear();
    }

    #[test]
    fn test_bad_callable_source() {
        let table = Table::new(
            vec![
                Entry::Callable {
                    id: 0,
                    value: 10,
                    properties: vec![],
                },
                Entry::Text("alert(1)".into()),
            ],
            9,
        );
        assert!(matches!(decode(&table), Err(Error::Reconstruction(_))));
    }

    #[test]
    fn test_boxed_payload_type_checked() {
        let table = Table::new(
            vec![Entry::Boolean {
                id: 0,
                value: 7,
                properties: vec![],
            }],
            9,
        );
        assert!(matches!(
            decode(&table),
            Err(Error::MalformedEntry { tag: 1, .. })
        ));
    }

    #[test]
    fn test_table_bound() {
        let registry = LocalRegistry::new();
        let table = Table::new(vec![Entry::Integer(100), Entry::Integer(200)], 9);
        let decoder = Decoder::new(&registry, &SourceOnly, None, 1, 64);
        assert!(matches!(
            decoder.decode(&table),
            Err(Error::TableTooLarge { entries: 2, max: 1 })
        ));
    }

    #[test]
    fn test_depth_bound_follows_root() {
        // 9 -> 10 -> 11 -> 12, plus a back edge 12 -> 9.
        let link = |child| Entry::Array {
            id: 0,
            elements: vec![child],
            properties: vec![],
        };
        let table = Table::new(vec![link(10), link(11), link(12), link(9)], 9);
        let registry = LocalRegistry::new();

        let shallow = Decoder::new(&registry, &SourceOnly, None, 1024, 3);
        assert!(matches!(
            shallow.decode(&table),
            Err(Error::DepthExceeded(3))
        ));

        let deep = Decoder::new(&registry, &SourceOnly, None, 1024, 4);
        let value = deep.decode(&table).unwrap();
        let root = value.as_object().unwrap().clone();
        let mut cursor = root.clone();
        for _ in 0..4 {
            let next = cursor.element(0).unwrap().as_object().unwrap().clone();
            cursor.borrow_mut().clear();
            cursor = next;
        }
        assert!(cursor.ptr_eq(&root));
    }
}
