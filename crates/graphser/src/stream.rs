// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream: the long-lived encode/decode context.
//!
//! A stream owns its identity marker (with a key fixed for its lifetime),
//! its opaque registry and its source compiler. Opaque objects encoded on a
//! stream decode back to the same live objects on that stream only.

use std::collections::HashMap;

use crate::compiler::{SourceCompiler, SourceOnly};
use crate::config::StreamConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::marker::{IdentityMarker, MarkerKey};
use crate::registry::{LocalRegistry, OpaqueRegistry};
use crate::table::Table;
use crate::value::{ObjRef, Value};

/// Graph-aware encode/decode context.
///
/// # Example
///
/// ```
/// use graphser::{ObjRef, Stream, Value};
///
/// let mut stream = Stream::new();
/// let obj = ObjRef::plain();
/// obj.set("hello", "world");
///
/// let table = stream.encode(&Value::from(obj)).unwrap();
/// let copy = stream.decode(&table).unwrap();
/// let hello = copy.as_object().unwrap().get("hello").unwrap();
/// assert_eq!(hello.as_str(), Some("world"));
/// ```
#[derive(Debug)]
pub struct Stream<R = LocalRegistry, C = SourceOnly> {
    config: StreamConfig,
    marker: IdentityMarker,
    registry: R,
    compiler: C,
    next_id: u32,
    retained: HashMap<u32, ObjRef>,
}

impl Stream {
    /// Stream with default configuration, an in-memory registry and the
    /// source-only compiler.
    pub fn new() -> Self {
        Self {
            config: StreamConfig::default(),
            marker: IdentityMarker::new(),
            registry: LocalRegistry::new(),
            compiler: SourceOnly,
            next_id: 0,
            retained: HashMap::new(),
        }
    }

    pub fn with_config(config: StreamConfig) -> Result<Self> {
        Self::with_parts(config, LocalRegistry::new(), SourceOnly)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: OpaqueRegistry, C: SourceCompiler> Stream<R, C> {
    /// Stream over a caller-supplied registry and compiler.
    pub fn with_parts(config: StreamConfig, registry: R, compiler: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            marker: IdentityMarker::new(),
            registry,
            compiler,
            next_id: 0,
            retained: HashMap::new(),
        })
    }

    /// Encode `value` into a flat table.
    pub fn encode(&mut self, value: &Value) -> Result<Table> {
        let retained = if self.config.retain_references {
            Some(&mut self.retained)
        } else {
            None
        };
        let encoder = Encoder::new(
            self.marker.scope(),
            &mut self.registry,
            &mut self.next_id,
            retained,
            self.config.max_depth,
        );
        let table = encoder.finish(value)?;
        log::debug!(
            "Encoded {} entries, root {} (stream {})",
            table.entries().len(),
            table.root(),
            self.marker.key()
        );
        Ok(table)
    }

    /// Rebuild a value graph from `table`.
    pub fn decode(&self, table: &Table) -> Result<Value> {
        let retained = if self.config.retain_references {
            Some(&self.retained)
        } else {
            None
        };
        let value = Decoder::new(
            &self.registry,
            &self.compiler,
            retained,
            self.config.max_entries,
            self.config.max_depth,
        )
        .decode(table)?;
        log::debug!(
            "Decoded {} entries, root {} (stream {})",
            table.entries().len(),
            table.root(),
            self.marker.key()
        );
        Ok(value)
    }

    /// Encode `value` straight to the packet stream.
    pub fn encode_packets(&mut self, value: &Value) -> Result<String> {
        self.encode(value)?.to_packets()
    }

    /// Decode a packet stream produced by [`Stream::encode_packets`].
    pub fn decode_packets(&self, text: &str) -> Result<Value> {
        let table = Table::from_packets_bounded(text, self.config.max_entries)?;
        self.decode(&table)
    }

    /// Random key fixed for this stream's lifetime.
    pub fn key(&self) -> &MarkerKey {
        self.marker.key()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// True when no marks survive from earlier passes.
    pub fn is_marker_clear(&self) -> bool {
        self.marker.is_clear()
    }

    /// Forget objects remembered for `retain_references`.
    pub fn clear_retained(&mut self) {
        self.retained.clear();
    }
}
