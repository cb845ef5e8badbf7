//! Closures and bound methods.
//!
//! `Function` is a drastically simplified cousin of the teacher's
//! `function.rs::Function`: no bytecode slot indices, no free-variable cell
//! tables, no async/generator flags (all Non-goals here). A closure is just
//! its parameter list, its body, and the environment it captured, exactly the
//! shape spec 4.4 describes. `defining_class` exists only to resolve `super`
//! (spec 4.5): it is filled in once, right after the owning `Class` is built.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::ast::{Block, Param};
use crate::environment::Env;
use crate::object::Class;
use crate::value::Value;

#[derive(Debug)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Rc<Block>,
    pub closure: Env,
    pub defining_class: RefCell<Option<Weak<Class>>>,
}

impl Function {
    #[must_use]
    pub fn new(name: Option<String>, params: Vec<Param>, body: Block, closure: Env) -> Rc<Self> {
        Rc::new(Self {
            name,
            params,
            body: Rc::new(body),
            closure,
            defining_class: RefCell::new(None),
        })
    }

    pub fn bind_defining_class(&self, class: &Rc<Class>) {
        *self.defining_class.borrow_mut() = Some(Rc::downgrade(class));
    }
}

#[derive(Debug)]
pub struct BoundMethod {
    pub func: Rc<Function>,
    pub receiver: Value,
}

/// A host-implemented callable (stdlib module functions). Plain `fn`
/// pointers rather than boxed closures: every native function's state (RNG,
/// clock, filesystem) lives on the `Interpreter` it is passed, mirroring the
/// teacher's enum-of-function-names-plus-factory module pattern
/// (`modules/math.rs`) without needing a matching dispatch enum here.
pub struct NativeFunction {
    pub name: &'static str,
    pub func: crate::interpreter::NativeFn,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}
