//! The `file` module (spec 4.9): thin wrappers over `std::fs`, surfacing
//! failures as `IOError` (spec 7) instead of panicking.

use indexmap::IndexMap;

use super::native;
use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::Value;

fn arg<'a>(args: &'a [Value], i: usize) -> Result<&'a Value, RuntimeError> {
    args.get(i).ok_or_else(|| RuntimeError::new(ExcType::ArityError, format!("missing argument {i}")))
}

fn as_path(v: &Value) -> Result<&str, RuntimeError> {
    match v {
        Value::Str(s) => Ok(s),
        other => {
            Err(RuntimeError::new(ExcType::TypeError, format!("expected a path string, got {}", other.type_name())))
        }
    }
}

fn io_err(path: &str, err: std::io::Error) -> RuntimeError {
    RuntimeError::new(ExcType::IOError, format!("{path}: {err}"))
}

fn write(_interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let path = as_path(arg(args, 0)?)?;
    let text = as_path(arg(args, 1)?)?;
    std::fs::write(path, text).map_err(|e| io_err(path, e))?;
    Ok(Value::Null)
}

fn read(_interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let path = as_path(arg(args, 0)?)?;
    let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(Value::string(text))
}

fn readlines(_interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let path = as_path(arg(args, 0)?)?;
    let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let lines = text.lines().map(Value::string).collect();
    Ok(Value::list(lines))
}

fn exists(_interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let path = as_path(arg(args, 0)?)?;
    Ok(Value::Bool(std::path::Path::new(path).exists()))
}

fn size(_interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let path = as_path(arg(args, 0)?)?;
    let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
    Ok(Value::Int(meta.len() as i64))
}

fn delete(_interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let path = as_path(arg(args, 0)?)?;
    std::fs::remove_file(path).map_err(|e| io_err(path, e))?;
    Ok(Value::Null)
}

pub(super) fn members() -> IndexMap<String, Value> {
    let mut m = IndexMap::new();
    m.insert("write".to_string(), native("write", write));
    m.insert("read".to_string(), native("read", read));
    m.insert("readlines".to_string(), native("readlines", readlines));
    m.insert("exists".to_string(), native("exists", exists));
    m.insert("size".to_string(), native("size", size));
    m.insert("delete".to_string(), native("delete", delete));
    m
}
