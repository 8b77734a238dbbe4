// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque reference registry: stream-local id to live object.

use std::collections::HashMap;

use crate::value::OpaqueRef;

/// Identity passthrough for values the engine cannot decompose.
///
/// Ids are stable for the registry's lifetime. Entries are never evicted.
pub trait OpaqueRegistry {
    /// Id of `value`, registering it under a fresh id on first sight.
    fn get_or_register(&mut self, value: &OpaqueRef) -> u32;

    /// The live object registered under `id`, if any.
    fn resolve(&self, id: u32) -> Option<OpaqueRef>;

    /// Number of registered objects.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only in-memory registry; ids start at 0 and increase by one.
#[derive(Debug, Default)]
pub struct LocalRegistry {
    by_addr: HashMap<usize, u32>,
    values: Vec<OpaqueRef>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OpaqueRegistry for LocalRegistry {
    fn get_or_register(&mut self, value: &OpaqueRef) -> u32 {
        if let Some(&id) = self.by_addr.get(&value.addr()) {
            return id;
        }
        let id = self.values.len() as u32;
        self.by_addr.insert(value.addr(), id);
        // Holding the handle keeps its address from being reused.
        self.values.push(value.clone());
        log::trace!("Registered opaque {:?} as id {}", value, id);
        id
    }

    fn resolve(&self, id: u32) -> Option<OpaqueRef> {
        self.values.get(id as usize).cloned()
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}
