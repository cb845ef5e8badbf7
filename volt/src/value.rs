//! The runtime tagged-union value type.
//!
//! Reference-shared variants (`List`, `Dict`, `Instance`, `Module`) carry
//! `Rc<RefCell<_>>` storage so aliasing is ordinary Rust aliasing; strings are
//! `Rc<str>` so sharing is cheap while remaining immutable. This replaces the
//! teacher's arena/heap-id model (`value.rs`'s `Ref(HeapId)` plus manual
//! `clone_with_heap`/`drop_with_heap`) with plain reference counting, per the
//! design notes' explicit allowance for that simplification.

use std::cmp::Ordering;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::exception::{ExcType, RuntimeError};
use crate::function::{BoundMethod, Function, NativeFunction};
use crate::modules::Module;
use crate::object::{Class, Instance};

pub type VList = crate::Shared<Vec<Value>>;
pub type VDict = crate::Shared<IndexMap<String, Value>>;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(VList),
    Dict(VDict),
    Func(Rc<Function>),
    BoundMethod(Rc<BoundMethod>),
    Native(Rc<NativeFunction>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    Module(Rc<Module>),
}

impl Value {
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::from(s.into()))
    }

    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(crate::shared(items))
    }

    #[must_use]
    pub fn dict(entries: IndexMap<String, Value>) -> Self {
        Value::Dict(crate::shared(entries))
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Func(_) => "function",
            Value::BoundMethod(_) => "function",
            Value::Native(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Module(_) => "module",
        }
    }

    /// Spec 4.3 truthiness table.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.borrow().is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Func(_)
            | Value::BoundMethod(_)
            | Value::Native(_)
            | Value::Class(_)
            | Value::Instance(_)
            | Value::Module(_) => true,
        }
    }

    /// `==`/`!=` and `match`-case comparison. Cross-type equality is always
    /// false; reference-shared kinds compare by identity.
    #[must_use]
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `<`/`<=`/`>`/`>=`. Numbers compare numerically, strings by code point
    /// (Rust `str` ordering agrees with code-point order for valid UTF-8).
    /// Cross-type comparison is a `TypeError`.
    pub fn compare(&self, other: &Value) -> Result<Ordering, RuntimeError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).ok_or_else(nan_error),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).ok_or_else(nan_error),
            (Value::Float(a), Value::Int(b)) => {
                a.partial_cmp(&(*b as f64)).ok_or_else(nan_error)
            }
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            _ => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("cannot compare {} and {}", self.type_name(), other.type_name()),
            )),
        }
    }
}

fn nan_error() -> RuntimeError {
    RuntimeError::new(ExcType::TypeError, "cannot compare NaN")
}

/// Walks an instance's class chain looking for `class`, used by `isinstance`.
pub(crate) fn is_instance_of(instance: &Rc<Instance>, class: &Rc<Class>) -> bool {
    let mut current = Some(Rc::clone(&instance.class));
    while let Some(c) = current {
        if Rc::ptr_eq(&c, class) {
            return true;
        }
        current = c.parent.clone();
    }
    false
}
