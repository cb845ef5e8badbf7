//! List method table (spec 4.8). Lists are reference-shared; mutators
//! mutate the underlying `Rc<RefCell<Vec<Value>>>` in place, as noted per
//! method below.

use std::cmp::Ordering;

use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::{VList, Value};

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

fn clamp(i: i64, len: usize) -> usize {
    if i < 0 { 0 } else { (i as usize).min(len) }
}

pub(crate) fn call(
    interp: &mut Interpreter,
    name: &str,
    list: &VList,
    args: &[Value],
) -> EvalResult<Value> {
    Ok(match name {
        "push" => {
            list.borrow_mut().push(arg(args, 0)?.clone());
            Value::Int(list.borrow().len() as i64)
        }
        "length" => Value::Int(list.borrow().len() as i64),
        "isEmpty" => Value::Bool(list.borrow().is_empty()),
        "sort" => {
            list.borrow_mut().sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
            Value::List(std::rc::Rc::clone(list))
        }
        "reverse" => {
            list.borrow_mut().reverse();
            Value::List(std::rc::Rc::clone(list))
        }
        "unique" => {
            let items = list.borrow();
            let mut out: Vec<Value> = Vec::new();
            for item in items.iter() {
                if !out.iter().any(|seen| seen.equals(item)) {
                    out.push(item.clone());
                }
            }
            Value::list(out)
        }
        "sum" => {
            let items = list.borrow();
            let mut int_total: i64 = 0;
            let mut float_total = 0.0;
            let mut is_float = false;
            for item in items.iter() {
                match item {
                    Value::Int(n) if !is_float => int_total += n,
                    Value::Int(n) => float_total += *n as f64,
                    Value::Float(f) => {
                        if !is_float {
                            float_total = int_total as f64;
                            is_float = true;
                        }
                        float_total += f;
                    }
                    other => {
                        return Err(RuntimeError::new(
                            ExcType::TypeError,
                            format!("cannot sum a list containing {}", other.type_name()),
                        )
                        .into());
                    }
                }
            }
            if is_float { Value::Float(float_total) } else { Value::Int(int_total) }
        }
        "includes" => {
            let needle = arg(args, 0)?;
            Value::Bool(list.borrow().iter().any(|item| item.equals(needle)))
        }
        "indexOf" => {
            let needle = arg(args, 0)?;
            match list.borrow().iter().position(|item| item.equals(needle)) {
                Some(i) => Value::Int(i as i64),
                None => Value::Int(-1),
            }
        }
        "slice" => {
            let items = list.borrow();
            let start = clamp(as_int(arg(args, 0)?)?, items.len());
            let end = clamp(as_int(arg(args, 1)?)?, items.len()).max(start);
            Value::list(items[start..end].to_vec())
        }
        "map" => {
            let items = list.borrow().clone();
            let f = arg(args, 0)?.clone();
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(interp.call_value(&f, vec![item])?);
            }
            Value::list(out)
        }
        "filter" => {
            let items = list.borrow().clone();
            let f = arg(args, 0)?.clone();
            let mut out = Vec::new();
            for item in items {
                if interp.call_value(&f, vec![item.clone()])?.truthy() {
                    out.push(item);
                }
            }
            Value::list(out)
        }
        "reduce" => {
            let items = list.borrow().clone();
            let f = arg(args, 0)?.clone();
            let mut acc = arg(args, 1)?.clone();
            for item in items {
                acc = interp.call_value(&f, vec![acc, item])?;
            }
            acc
        }
        "find" => {
            let items = list.borrow().clone();
            let f = arg(args, 0)?.clone();
            let mut found = Value::Null;
            for item in items {
                if interp.call_value(&f, vec![item.clone()])?.truthy() {
                    found = item;
                    break;
                }
            }
            found
        }
        "every" => {
            let items = list.borrow().clone();
            let f = arg(args, 0)?.clone();
            let mut all = true;
            for item in items {
                if !interp.call_value(&f, vec![item])?.truthy() {
                    all = false;
                    break;
                }
            }
            Value::Bool(all)
        }
        "some" => {
            let items = list.borrow().clone();
            let f = arg(args, 0)?.clone();
            let mut any = false;
            for item in items {
                if interp.call_value(&f, vec![item])?.truthy() {
                    any = true;
                    break;
                }
            }
            Value::Bool(any)
        }
        "join" => {
            let sep = match arg(args, 0)? {
                Value::Str(s) => s.to_string(),
                other => {
                    return Err(RuntimeError::new(
                        ExcType::TypeError,
                        format!("join separator must be a string, got {}", other.type_name()),
                    )
                    .into());
                }
            };
            let items = list.borrow().clone();
            let mut parts = Vec::with_capacity(items.len());
            for item in &items {
                parts.push(interp.stringify(item)?);
            }
            Value::string(parts.join(&sep))
        }
        other => {
            return Err(RuntimeError::new(ExcType::TypeError, format!("list has no method '{other}'")).into());
        }
    })
}
