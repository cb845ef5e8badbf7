//! Built-in method tables for the three collection-ish value kinds (spec
//! 4.8): strings, lists, dicts. Each sub-module owns one `call(interpreter,
//! method_name, receiver, args)` entry point, dispatched from
//! `interpreter::expr::call_method`, mirroring the way `modules/*.rs` owns
//! one `members()` factory per stdlib module.

pub(crate) mod dict_methods;
pub(crate) mod list_methods;
pub(crate) mod string_methods;
