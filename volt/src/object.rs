//! The object system: classes and instances.
//!
//! Mirrors the shape of the teacher's `types/class.rs` (`ClassObject { name,
//! metaclass, namespace: Dict }`) stripped of the metaclass/subclass-registry
//! machinery that only matters for a bytecode VM's `type()` builtin: Volt
//! classes need just a name, an optional parent for single inheritance, and a
//! method table.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::function::Function;

#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub parent: Option<Rc<Class>>,
    pub methods: IndexMap<String, Rc<Function>>,
}

impl Class {
    /// Resolves a method by walking the parent chain (spec 4.7: "Method
    /// resolution order is the linear parent chain").
    #[must_use]
    pub fn resolve_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(f) = self.methods.get(name) {
            return Some(Rc::clone(f));
        }
        self.parent.as_ref().and_then(|p| p.resolve_method(name))
    }
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub attrs: crate::Shared<IndexMap<String, crate::value::Value>>,
}

impl Instance {
    #[must_use]
    pub fn new(class: Rc<Class>) -> Rc<Self> {
        Rc::new(Self { class, attrs: crate::shared(IndexMap::new()) })
    }
}
