//! Chained lexical scopes.
//!
//! A scope is a name->value map plus a parent pointer (spec 4.4). `this` and
//! the currently executing method's defining class are also carried on the
//! scope chain rather than passed as extra interpreter arguments everywhere,
//! since `super` needs to look them up the same way a plain variable lookup
//! walks outward.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::object::Class;
use crate::value::Value;

pub type Env = Rc<std::cell::RefCell<Scope>>;

#[derive(Debug)]
pub struct Scope {
    vars: HashMap<String, Value>,
    parent: Option<Env>,
    this: Option<Value>,
    method_class: Option<Weak<Class>>,
}

/// A chained lexical environment. The public API hands out `Env` handles
/// (`Rc<RefCell<Scope>>`) rather than owning them, since a function captures
/// its defining environment by shared reference (spec 4.4/9).
pub struct Environment;

impl Environment {
    #[must_use]
    pub fn root() -> Env {
        Rc::new(std::cell::RefCell::new(Scope {
            vars: HashMap::new(),
            parent: None,
            this: None,
            method_class: None,
        }))
    }

    #[must_use]
    pub fn child(parent: &Env) -> Env {
        Rc::new(std::cell::RefCell::new(Scope {
            vars: HashMap::new(),
            parent: Some(Rc::clone(parent)),
            this: None,
            method_class: None,
        }))
    }
}

pub trait ScopeExt {
    fn define(&self, name: &str, value: Value);
    fn get(&self, name: &str) -> Option<Value>;
    /// Rebinds `name` in the scope where it was declared; returns `false` if
    /// `name` is unbound anywhere in the chain (the caller then treats it as
    /// a fresh `set` in the innermost scope).
    fn assign(&self, name: &str, value: Value) -> bool;
    fn set_this(&self, value: Value);
    fn lookup_this(&self) -> Option<Value>;
    fn set_method_class(&self, class: &Rc<Class>);
    fn lookup_method_class(&self) -> Option<Rc<Class>>;
}

impl ScopeExt for Env {
    fn define(&self, name: &str, value: Value) {
        self.borrow_mut().vars.insert(name.to_string(), value);
    }

    fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.borrow().vars.get(name) {
            return Some(v.clone());
        }
        let parent = self.borrow().parent.clone();
        parent.and_then(|p| p.get(name))
    }

    fn assign(&self, name: &str, value: Value) -> bool {
        if self.borrow().vars.contains_key(name) {
            self.borrow_mut().vars.insert(name.to_string(), value);
            return true;
        }
        let parent = self.borrow().parent.clone();
        match parent {
            Some(p) => p.assign(name, value),
            None => false,
        }
    }

    fn set_this(&self, value: Value) {
        self.borrow_mut().this = Some(value);
    }

    fn lookup_this(&self) -> Option<Value> {
        if let Some(v) = self.borrow().this.clone() {
            return Some(v);
        }
        let parent = self.borrow().parent.clone();
        parent.and_then(|p| p.lookup_this())
    }

    fn set_method_class(&self, class: &Rc<Class>) {
        self.borrow_mut().method_class = Some(Rc::downgrade(class));
    }

    fn lookup_method_class(&self) -> Option<Rc<Class>> {
        if let Some(weak) = self.borrow().method_class.clone() {
            if let Some(c) = weak.upgrade() {
                return Some(c);
            }
        }
        let parent = self.borrow().parent.clone();
        parent.and_then(|p| p.lookup_method_class())
    }
}
