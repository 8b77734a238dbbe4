// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graph-aware value serializer.
//!
//! Converts an in-memory value graph (scalars, containers, boxed primitives,
//! dates, patterns, callables and opaque handles) into a flat table of
//! entries, and rebuilds an equivalent graph from it. Shared references and
//! cycles are encoded once and restored as one shared instance. Opaque values
//! keep stream-scoped identity: decoding on the same [`Stream`] returns the
//! original live object.
//!
//! # Architecture
//!
//! ```text
//!   Value graph                  Stream                        Wire
//!        |                          |                            |
//!        |--- encode(&value) ------>| classify / mark / walk     |
//!        |                          |--- Table (entries, root) -->|--- to_packets()
//!        |                          |                            |
//!        |<-- decode(&table) -------| skeletons, then relink  <--|--- from_packets()
//! ```
//!
//! # Table layout
//!
//! | Index | Contents                                  |
//! |-------|-------------------------------------------|
//! | 0..=8 | implied constants (undefined .. "")       |
//! | 9..   | entries in encode order                   |
//! | root  | trailing index of the root value          |
//!
//! # Key Features
//!
//! - **Identity, not equality**: reuse is detected by pointer identity
//! - **Printable wire form**: base-94 integers and escaped strings, packets
//!   delimited by self-describing length prefixes
//! - **Pluggable seams**: [`OpaqueRegistry`] for opaque passthrough,
//!   [`SourceCompiler`] for callable reconstruction

pub mod codec;
pub mod compiler;
pub mod config;
mod decoder;
mod encoder;
pub mod error;
pub mod marker;
pub mod packet;
pub mod precoded;
pub mod registry;
pub mod stream;
pub mod table;
pub mod value;

// Re-exports for convenience.
pub use compiler::{looks_like_callable, SourceCompiler, SourceOnly};
pub use config::StreamConfig;
pub use error::{Error, Result};
pub use marker::{IdentityMarker, MarkScope, MarkerKey};
pub use packet::{frame, frame_into, unframe, Packet};
pub use precoded::{classify, Class, PRECODED_COUNT};
pub use registry::{LocalRegistry, OpaqueRegistry};
pub use stream::Stream;
pub use table::{Entry, Table, TypeTag};
pub use value::{Callable, ObjRef, Object, ObjectKind, OpaqueRef, Pattern, Value};
