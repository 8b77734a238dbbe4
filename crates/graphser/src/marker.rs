// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identity marker: per-stream key and the per-pass "visited at index N"
//! side table.
//!
//! Marks are never written into the objects themselves. They live in a map
//! keyed by object identity, valid only inside a [`MarkScope`], which clears
//! them when dropped (normal return, `?` early exit, or unwind).

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::{ALPHABET_START, BASE};
use crate::value::ObjRef;

/// Length of a stream key in printable characters.
pub const KEY_LEN: usize = 22;

static KEY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Random printable key, generated once per stream.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MarkerKey(String);

impl MarkerKey {
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let counter = KEY_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut key = String::with_capacity(KEY_LEN);
        let mut state = 0u64;
        for round in 0..KEY_LEN {
            // Re-seed every 8 chars; each u64 yields ~8 base-94 digits.
            if round % 8 == 0 {
                let mut hasher = DefaultHasher::new();
                nanos.hash(&mut hasher);
                std::process::id().hash(&mut hasher);
                counter.hash(&mut hasher);
                round.hash(&mut hasher);
                state = hasher.finish();
            }
            let digit = (state % BASE) as u8;
            state /= BASE;
            key.push(char::from(ALPHABET_START as u8 + digit));
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkerKey({})", self.0)
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-stream identity marker.
#[derive(Debug)]
pub struct IdentityMarker {
    key: MarkerKey,
    marks: HashMap<usize, usize>,
    // Keeps every marked object alive for the pass so addresses stay unique.
    pinned: Vec<ObjRef>,
}

impl IdentityMarker {
    pub fn new() -> Self {
        Self {
            key: MarkerKey::generate(),
            marks: HashMap::new(),
            pinned: Vec::new(),
        }
    }

    pub fn key(&self) -> &MarkerKey {
        &self.key
    }

    /// Open a marking pass. Marks are cleared when the scope drops.
    pub fn scope(&mut self) -> MarkScope<'_> {
        MarkScope { marker: self }
    }

    /// True when no pass is in progress and no marks are left behind.
    pub fn is_clear(&self) -> bool {
        self.marks.is_empty() && self.pinned.is_empty()
    }
}

impl Default for IdentityMarker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for one encode pass.
pub struct MarkScope<'a> {
    marker: &'a mut IdentityMarker,
}

impl MarkScope<'_> {
    /// Record `obj` at `index`. Returns the earlier index if `obj` was
    /// already visited in this pass, `None` if this is its first visit.
    pub fn mark(&mut self, obj: &ObjRef, index: usize) -> Option<usize> {
        let addr = obj.addr();
        if let Some(&seen) = self.marker.marks.get(&addr) {
            return Some(seen);
        }
        self.marker.marks.insert(addr, index);
        self.marker.pinned.push(obj.clone());
        None
    }

    pub fn index_of(&self, obj: &ObjRef) -> Option<usize> {
        self.marker.marks.get(&obj.addr()).copied()
    }

    pub fn len(&self) -> usize {
        self.marker.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marker.marks.is_empty()
    }
}

impl Drop for MarkScope<'_> {
    fn drop(&mut self) {
        self.marker.marks.clear();
        self.marker.pinned.clear();
    }
}
