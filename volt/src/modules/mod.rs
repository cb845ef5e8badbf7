//! Standard library modules: `math`, `random`, `time`, `file`.
//!
//! Each is built by a small factory function returning a `Value::Module`,
//! matching the teacher's `modules/math.rs` pattern (an enum of function
//! names dispatched through `strum`, instantiated by a `create_module`
//! factory) adapted to fixed `fn` pointers instead of an enum, since Volt's
//! module surface is small and stable enough not to need the indirection.

mod file;
mod math;
mod random;
mod time;

use indexmap::IndexMap;
use std::rc::Rc;

use crate::function::NativeFunction;
use crate::interpreter::NativeFn;
use crate::value::Value;

#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub members: IndexMap<String, Value>,
}

pub(crate) fn native(name: &'static str, func: NativeFn) -> Value {
    Value::Native(Rc::new(NativeFunction { name, func }))
}

/// Resolves `use "NAME"` to a built-in module, or `None` if `NAME` names no
/// built-in (spec 4.2: "`use` only imports the built-ins").
pub fn lookup(name: &str) -> Option<Value> {
    let members = match name {
        "math" => math::members(),
        "random" => random::members(),
        "time" => time::members(),
        "file" => file::members(),
        _ => return None,
    };
    Some(Value::Module(Rc::new(Module { name: name.to_string(), members })))
}
