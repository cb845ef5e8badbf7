//! The `random` module: draws from the interpreter's seeded RNG (spec 4.9,
//! 6). Seeding via `VOLT_SEED` happens once in `Interpreter::new`.

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;

use super::native;
use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::Value;

fn arg<'a>(args: &'a [Value], i: usize) -> Result<&'a Value, RuntimeError> {
    args.get(i).ok_or_else(|| RuntimeError::new(ExcType::ArityError, format!("missing argument {i}")))
}

fn as_int(v: &Value) -> Result<i64, RuntimeError> {
    match v {
        Value::Int(n) => Ok(*n),
        other => {
            Err(RuntimeError::new(ExcType::TypeError, format!("expected an int, got {}", other.type_name())))
        }
    }
}

fn int(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let lo = as_int(arg(args, 0)?)?;
    let hi = as_int(arg(args, 1)?)?;
    if lo > hi {
        return Err(RuntimeError::new(ExcType::ValueError, "random.int: lo must not exceed hi").into());
    }
    Ok(Value::Int(interp.rng().gen_range(lo..=hi)))
}

fn float(interp: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(interp.rng().gen_range(0.0..1.0)))
}

fn bool_(interp: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(interp.rng().gen_bool(0.5)))
}

fn choice(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let Value::List(list) = arg(args, 0)? else {
        return Err(RuntimeError::new(
            ExcType::TypeError,
            format!("choice expects a list, got {}", arg(args, 0)?.type_name()),
        )
        .into());
    };
    let items = list.borrow();
    items
        .as_slice()
        .choose(interp.rng())
        .cloned()
        .ok_or_else(|| RuntimeError::new(ExcType::ValueError, "choice on an empty list").into())
}

/// Returns a new shuffled list; the source list is left untouched (spec
/// 4.9).
fn shuffle(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let Value::List(list) = arg(args, 0)? else {
        return Err(RuntimeError::new(
            ExcType::TypeError,
            format!("shuffle expects a list, got {}", arg(args, 0)?.type_name()),
        )
        .into());
    };
    let mut items = list.borrow().clone();
    items.shuffle(interp.rng());
    Ok(Value::list(items))
}

pub(super) fn members() -> IndexMap<String, Value> {
    let mut m = IndexMap::new();
    m.insert("int".to_string(), native("int", int));
    m.insert("float".to_string(), native("float", float));
    m.insert("bool".to_string(), native("bool", bool_));
    m.insert("choice".to_string(), native("choice", choice));
    m.insert("shuffle".to_string(), native("shuffle", shuffle));
    m
}
