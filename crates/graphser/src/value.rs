// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory value graph.
//!
//! Primitive values (`undefined`, `null`, booleans, numbers, strings) are
//! plain data. Structural values live behind [`ObjRef`], a shared handle whose
//! identity is pointer identity: two clones of one `ObjRef` are the same
//! object, two separately built objects never are. Values the engine cannot
//! decompose travel as [`OpaqueRef`].

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

/// A value in the graph.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(ObjRef),
    Opaque(OpaqueRef),
}

impl Value {
    /// Strict equality: primitives by value (NaN is never equal), references
    /// by identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Opaque(a), Self::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Like [`Value::strict_eq`], but NaN equals NaN.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_eq(other),
        }
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&OpaqueRef> {
        match self {
            Self::Opaque(opaque) => Some(opaque),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ObjRef> for Value {
    fn from(v: ObjRef) -> Self {
        Self::Object(v)
    }
}

impl From<OpaqueRef> for Value {
    fn from(v: OpaqueRef) -> Self {
        Self::Opaque(v)
    }
}

// ---------------------------------------------------------------------------
// Structural objects
// ---------------------------------------------------------------------------

/// `/source/flags` pattern object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }

    /// Textual form `/source/flags`.
    pub fn to_text(&self) -> String {
        format!("/{}/{}", self.source, self.flags)
    }

    /// Parse `/source/flags`; flags run from the last slash to the end.
    pub fn parse(text: &str) -> Result<Self> {
        let body = text
            .strip_prefix('/')
            .ok_or_else(|| Error::InvalidPattern(text.to_string()))?;
        let split = body
            .rfind('/')
            .ok_or_else(|| Error::InvalidPattern(text.to_string()))?;
        Ok(Self::new(&body[..split], &body[split + 1..]))
    }
}

/// Callable object: its source text, plus whatever the source compiler
/// produced for it on decode.
#[derive(Clone)]
pub struct Callable {
    source: String,
    compiled: Option<Rc<dyn Any>>,
}

impl Callable {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: None,
        }
    }

    pub fn with_compiled(source: impl Into<String>, compiled: Rc<dyn Any>) -> Self {
        Self {
            source: source.into(),
            compiled: Some(compiled),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn compiled(&self) -> Option<&Rc<dyn Any>> {
        self.compiled.as_ref()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("source", &self.source)
            .field("compiled", &self.compiled.is_some())
            .finish()
    }
}

/// Structural kind of an object, with the primitive it wraps if any.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Boolean(bool),
    Number(f64),
    String(String),
    Array,
    Plain,
    /// Milliseconds since the Unix epoch; NaN for an invalid date.
    Date(f64),
    Pattern(Pattern),
    Callable(Callable),
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::Number(_) => "Number",
            Self::String(_) => "String",
            Self::Array => "Array",
            Self::Plain => "Object",
            Self::Date(_) => "Date",
            Self::Pattern(_) => "Pattern",
            Self::Callable(_) => "Callable",
        }
    }
}

/// Object body: kind, positional elements (arrays only) and own properties
/// in insertion order.
#[derive(Debug)]
pub struct Object {
    kind: ObjectKind,
    elements: Vec<Value>,
    properties: Vec<(String, Value)>,
}

/// Parse `key` as an array index below `len`.
pub(crate) fn element_index(key: &str, len: usize) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<usize>().ok().filter(|&i| i < len)
}

impl Object {
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array)
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    /// Own property, or array element for an in-range index key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if self.is_array() {
            if let Some(i) = element_index(key, self.elements.len()) {
                return self.elements.get(i);
            }
        }
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set an own property (replacing in place, keeping its position), or an
    /// array element for an in-range index key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if self.is_array() {
            if let Some(i) = element_index(&key, self.elements.len()) {
                self.elements[i] = value;
                return;
            }
        }
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((key, value)),
        }
    }

    /// Append an element. On arrays, a property stored under the new
    /// element's index key is dropped: that key now names the element.
    pub fn push(&mut self, value: Value) {
        self.elements.push(value);
        if self.is_array() {
            let key = (self.elements.len() - 1).to_string();
            self.properties.retain(|(k, _)| *k != key);
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Drop all elements and properties, breaking any cycles through this
    /// object.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.properties.clear();
    }
}

/// Shared handle to a structural object.
#[derive(Clone)]
pub struct ObjRef(Rc<RefCell<Object>>);

impl ObjRef {
    pub fn new(kind: ObjectKind) -> Self {
        Self(Rc::new(RefCell::new(Object {
            kind,
            elements: Vec::new(),
            properties: Vec::new(),
        })))
    }

    pub fn plain() -> Self {
        Self::new(ObjectKind::Plain)
    }

    pub fn array(elements: Vec<Value>) -> Self {
        let obj = Self::new(ObjectKind::Array);
        obj.0.borrow_mut().elements = elements;
        obj
    }

    pub fn boxed_bool(v: bool) -> Self {
        Self::new(ObjectKind::Boolean(v))
    }

    pub fn boxed_number(v: f64) -> Self {
        Self::new(ObjectKind::Number(v))
    }

    pub fn boxed_string(v: impl Into<String>) -> Self {
        Self::new(ObjectKind::String(v.into()))
    }

    pub fn date(millis: f64) -> Self {
        Self::new(ObjectKind::Date(millis))
    }

    pub fn pattern(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::new(ObjectKind::Pattern(Pattern::new(source, flags)))
    }

    pub fn callable(source: impl Into<String>) -> Self {
        Self::new(ObjectKind::Callable(Callable::from_source(source)))
    }

    /// Build a plain object from `(key, value)` pairs, in order.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let obj = Self::plain();
        for (k, v) in pairs {
            obj.set(k, v);
        }
        obj
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.borrow_mut().set(key, value.into());
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    pub fn element(&self, index: usize) -> Option<Value> {
        self.0.borrow().elements.get(index).cloned()
    }

    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity key; stable while any clone of this handle is alive.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for ObjRef {
    // Never descends into children: the graph may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(obj) => write!(
                f,
                "ObjRef({} @ {:#x}, {} elements, {} properties)",
                obj.kind.name(),
                self.addr(),
                obj.elements.len(),
                obj.properties.len()
            ),
            Err(_) => write!(f, "ObjRef(<borrowed> @ {:#x})", self.addr()),
        }
    }
}

// ---------------------------------------------------------------------------
// Opaque values
// ---------------------------------------------------------------------------

/// Stand-in for an opaque value whose origin stream is not the decoding one.
#[derive(Debug)]
struct Unresolved {
    id: u32,
}

/// Handle to a caller-owned value the engine cannot decompose.
///
/// Use interior mutability (`RefCell`, `Cell`) inside the payload if the
/// owner needs to change its state between encode and decode.
#[derive(Clone)]
pub struct OpaqueRef(Rc<dyn Any>);

impl OpaqueRef {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Placeholder exposing only a registry id that could not be resolved.
    pub fn placeholder(id: u32) -> Self {
        Self::new(Unresolved { id })
    }

    /// The id carried by a placeholder; `None` for live caller objects.
    pub fn unresolved_id(&self) -> Option<u32> {
        self.0.downcast_ref::<Unresolved>().map(|u| u.id)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &OpaqueRef) -> bool {
        self.addr() == other.addr()
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unresolved_id() {
            Some(id) => write!(f, "<#unknown {}>", id),
            None => write!(f, "OpaqueRef({:#x})", self.addr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_eq_semantics() {
        assert!(Value::Undefined.strict_eq(&Value::Undefined));
        assert!(!Value::Number(f64::NAN).strict_eq(&Value::Number(f64::NAN)));
        assert!(Value::Number(f64::NAN).same_value(&Value::Number(f64::NAN)));
        assert!(Value::Number(0.0).strict_eq(&Value::Number(-0.0)));
        assert!(!Value::from("1").strict_eq(&Value::from(1)));

        let a = ObjRef::plain();
        let b = ObjRef::plain();
        assert!(Value::from(a.clone()).strict_eq(&Value::from(a.clone())));
        assert!(!Value::from(a).strict_eq(&Value::from(b)));
    }

    #[test]
    fn test_set_keeps_insertion_order() {
        let obj = ObjRef::plain();
        obj.set("b", 1);
        obj.set("a", 2);
        obj.set("b", 3);
        let keys: Vec<String> = obj
            .borrow()
            .properties()
            .iter()
            .map(|(k, _)| k.clone())
            .collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(obj.get("b").and_then(|v| v.as_f64()), Some(3.0));
    }

    #[test]
    fn test_array_index_keys_address_elements() {
        let arr = ObjRef::array(vec![Value::from(1), Value::from(2)]);
        arr.set("1", "two");
        arr.set("01", "not an index");
        arr.set("5", "past the end");
        assert_eq!(
            arr.element(1).and_then(|v| v.as_str().map(String::from)),
            Some("two".to_string())
        );
        assert_eq!(arr.borrow().properties().len(), 2);
        assert_eq!(arr.borrow().len(), 2);
    }

    #[test]
    fn test_push_takes_over_index_property() {
        let arr = ObjRef::array(vec![Value::from("a")]);
        arr.set("1", "prop");
        arr.set("2", "kept");
        arr.push("elem");
        assert_eq!(
            arr.get("1").and_then(|v| v.as_str().map(String::from)),
            Some("elem".into())
        );
        let keys: Vec<String> = arr
            .borrow()
            .properties()
            .iter()
            .map(|(k, _)| k.clone())
            .collect();
        assert_eq!(keys, ["2"]);
    }

    #[test]
    fn test_pattern_text() {
        let p = Pattern::new("a/b+", "gi");
        assert_eq!(p.to_text(), "/a/b+/gi");
        assert_eq!(Pattern::parse("/a/b+/gi").unwrap(), p);
        assert_eq!(Pattern::parse("//").unwrap(), Pattern::new("", ""));
        assert!(Pattern::parse("abc").is_err());
        assert!(Pattern::parse("/abc").is_err());
    }

    #[test]
    fn test_opaque_placeholder() {
        let p = OpaqueRef::placeholder(7);
        assert_eq!(p.unresolved_id(), Some(7));
        assert_eq!(format!("{:?}", p), "<#unknown 7>");

        let live = OpaqueRef::new(RefCell::new(5u8));
        assert_eq!(live.unresolved_id(), None);
        assert!(live.ptr_eq(&live.clone()));
        assert_eq!(*live.downcast_ref::<RefCell<u8>>().unwrap().borrow(), 5);
    }

    #[test]
    fn test_debug_does_not_recurse_on_cycles() {
        let obj = ObjRef::plain();
        obj.set("self", obj.clone());
        let text = format!("{:?}", Value::from(obj.clone()));
        assert!(text.contains("Object"));
        obj.borrow_mut().clear();
    }
}
