//! String method table (spec 4.8). Strings are immutable; every method
//! returns a new value.

use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::Value;

fn arg<'a>(args: &'a [Value], i: usize) -> Result<&'a Value, RuntimeError> {
    args.get(i).ok_or_else(|| RuntimeError::new(ExcType::ArityError, format!("missing argument {i}")))
}

fn as_str(v: &Value) -> Result<&str, RuntimeError> {
    match v {
        Value::Str(s) => Ok(s),
        other => {
            Err(RuntimeError::new(ExcType::TypeError, format!("expected a string, got {}", other.type_name())))
        }
    }
}

fn as_int(v: &Value) -> Result<i64, RuntimeError> {
    match v {
        Value::Int(n) => Ok(*n),
        other => {
            Err(RuntimeError::new(ExcType::TypeError, format!("expected an int, got {}", other.type_name())))
        }
    }
}

pub(crate) fn call(
    _interp: &mut Interpreter,
    name: &str,
    s: &str,
    args: &[Value],
) -> EvalResult<Value> {
    Ok(match name {
        "trim" => Value::string(s.trim()),
        "upper" => Value::string(s.to_uppercase()),
        "lower" => Value::string(s.to_lowercase()),
        "replace" => {
            let old = as_str(arg(args, 0)?)?;
            let new = as_str(arg(args, 1)?)?;
            Value::string(s.replace(old, new))
        }
        "split" => {
            let sep = as_str(arg(args, 0)?)?;
            let parts: Vec<Value> =
                if sep.is_empty() { s.split("").filter(|p| !p.is_empty()).map(Value::string).collect() }
                else { s.split(sep).map(Value::string).collect() };
            Value::list(parts)
        }
        "startsWith" => Value::Bool(s.starts_with(as_str(arg(args, 0)?)?)),
        "endsWith" => Value::Bool(s.ends_with(as_str(arg(args, 0)?)?)),
        "indexOf" => {
            let needle = as_str(arg(args, 0)?)?;
            match s.find(needle) {
                Some(byte_idx) => Value::Int(s[..byte_idx].chars().count() as i64),
                None => Value::Int(-1),
            }
        }
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let start = clamp(as_int(arg(args, 0)?)?, chars.len());
            let end = clamp(as_int(arg(args, 1)?)?, chars.len());
            let end = end.max(start);
            Value::string(chars[start..end].iter().collect::<String>())
        }
        "repeat" => {
            let n = as_int(arg(args, 0)?)?;
            if n < 0 {
                return Err(RuntimeError::new(ExcType::ValueError, "repeat count must not be negative").into());
            }
            Value::string(s.repeat(n as usize))
        }
        "reverse" => Value::string(s.chars().rev().collect::<String>()),
        "contains" => Value::Bool(s.contains(as_str(arg(args, 0)?)?)),
        "length" => Value::Int(s.chars().count() as i64),
        "toInt" => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map(Value::Int)
                .or_else(|_| trimmed.parse::<f64>().map(|f| Value::Int(f as i64)))
                .map_err(|_| RuntimeError::new(ExcType::ValueError, format!("'{s}' is not numeric")))?
        }
        "toList" => Value::list(s.chars().map(|c| Value::string(c.to_string())).collect()),
        "padStart" => pad(s, args, true)?,
        "padEnd" => pad(s, args, false)?,
        other => {
            return Err(RuntimeError::new(ExcType::TypeError, format!("string has no method '{other}'")).into());
        }
    })
}

fn clamp(i: i64, len: usize) -> usize {
    if i < 0 { 0 } else { (i as usize).min(len) }
}

fn pad(s: &str, args: &[Value], start: bool) -> Result<Value, RuntimeError> {
    let width = as_int(arg(args, 0)?)?.max(0) as usize;
    let fill = as_str(arg(args, 1)?)?;
    let fill_char = fill.chars().next().unwrap_or(' ');
    let len = s.chars().count();
    if len >= width {
        return Ok(Value::string(s));
    }
    let pad: String = std::iter::repeat(fill_char).take(width - len).collect();
    Ok(Value::string(if start { pad + s } else { format!("{s}{pad}") }))
}
