//! Dict method table (spec 4.8). Backed by an `IndexMap`, so `keys()`/
//! `values()` observe insertion order (spec 8's dict-order invariant).

use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::{VDict, Value};

fn arg<'a>(args: &'a [Value], i: usize) -> Result<&'a Value, RuntimeError> {
    args.get(i).ok_or_else(|| RuntimeError::new(ExcType::ArityError, format!("missing argument {i}")))
}

pub(crate) fn call(
    interp: &mut Interpreter,
    name: &str,
    dict: &VDict,
    args: &[Value],
) -> EvalResult<Value> {
    Ok(match name {
        "keys" => Value::list(dict.borrow().keys().map(|k| Value::string(k.clone())).collect()),
        "values" => Value::list(dict.borrow().values().cloned().collect()),
        "has" => {
            let key = require_key(arg(args, 0)?)?;
            Value::Bool(dict.borrow().contains_key(&key))
        }
        "size" => Value::Int(dict.borrow().len() as i64),
        "merge" => {
            let Value::Dict(other) = arg(args, 0)? else {
                return Err(RuntimeError::new(
                    ExcType::TypeError,
                    format!("merge expects a dict, got {}", arg(args, 0)?.type_name()),
                )
                .into());
            };
            let mut out = dict.borrow().clone();
            for (k, v) in other.borrow().iter() {
                out.insert(k.clone(), v.clone());
            }
            Value::dict(out)
        }
        "filter" => {
            let entries: Vec<(String, Value)> =
                dict.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            let f = arg(args, 0)?.clone();
            let mut out = indexmap::IndexMap::new();
            for (k, v) in entries {
                let keep = interp.call_value(&f, vec![Value::string(k.clone()), v.clone()])?.truthy();
                if keep {
                    out.insert(k, v);
                }
            }
            Value::dict(out)
        }
        other => {
            return Err(RuntimeError::new(ExcType::TypeError, format!("dict has no method '{other}'")).into());
        }
    })
}

fn require_key(v: &Value) -> Result<String, RuntimeError> {
    match v {
        Value::Str(s) => Ok(s.to_string()),
        other => {
            Err(RuntimeError::new(ExcType::TypeError, format!("dict keys must be strings, got {}", other.type_name())))
        }
    }
}
