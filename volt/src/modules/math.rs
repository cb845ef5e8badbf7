//! The `math` module: constants `pi`/`e`, plus the functions listed in
//! spec 4.9.

use indexmap::IndexMap;

use super::native;
use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::Value;

fn as_f64(v: &Value) -> Result<f64, RuntimeError> {
    match v {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("expected a number, got {}", other.type_name()),
        )),
    }
}

fn as_int(v: &Value) -> Result<i64, RuntimeError> {
    match v {
        Value::Int(n) => Ok(*n),
        other => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("expected an int, got {}", other.type_name()),
        )),
    }
}

fn arg(args: &[Value], i: usize) -> Result<&Value, RuntimeError> {
    args.get(i)
        .ok_or_else(|| RuntimeError::new(ExcType::ArityError, format!("missing argument {i}")))
}

fn sqrt(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(as_f64(arg(args, 0)?)?.sqrt()))
}

fn pow(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(as_f64(arg(args, 0)?)?.powf(as_f64(arg(args, 1)?)?)))
}

fn floor(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Int(as_f64(arg(args, 0)?)?.floor() as i64))
}

fn ceil(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Int(as_f64(arg(args, 0)?)?.ceil() as i64))
}

fn abs(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    match arg(args, 0)? {
        Value::Int(n) => Ok(Value::Int(n.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("expected a number, got {}", other.type_name()),
        )
        .into()),
    }
}

fn sin(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(as_f64(arg(args, 0)?)?.sin()))
}

fn cos(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(as_f64(arg(args, 0)?)?.cos()))
}

fn tan(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(as_f64(arg(args, 0)?)?.tan()))
}

fn log(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(as_f64(arg(args, 0)?)?.log(as_f64(arg(args, 1)?)?)))
}

fn gcd(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let mut a = as_int(arg(args, 0)?)?.abs();
    let mut b = as_int(arg(args, 1)?)?.abs();
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    Ok(Value::Int(a))
}

fn min(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let a = arg(args, 0)?;
    let b = arg(args, 1)?;
    Ok(if a.compare(b)? == std::cmp::Ordering::Greater { b.clone() } else { a.clone() })
}

fn max(_: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let a = arg(args, 0)?;
    let b = arg(args, 1)?;
    Ok(if a.compare(b)? == std::cmp::Ordering::Less { b.clone() } else { a.clone() })
}

pub(super) fn members() -> IndexMap<String, Value> {
    let mut m = IndexMap::new();
    m.insert("pi".to_string(), Value::Float(std::f64::consts::PI));
    m.insert("e".to_string(), Value::Float(std::f64::consts::E));
    m.insert("sqrt".to_string(), native("sqrt", sqrt));
    m.insert("pow".to_string(), native("pow", pow));
    m.insert("floor".to_string(), native("floor", floor));
    m.insert("ceil".to_string(), native("ceil", ceil));
    m.insert("abs".to_string(), native("abs", abs));
    m.insert("sin".to_string(), native("sin", sin));
    m.insert("cos".to_string(), native("cos", cos));
    m.insert("tan".to_string(), native("tan", tan));
    m.insert("log".to_string(), native("log", log));
    m.insert("gcd".to_string(), native("gcd", gcd));
    m.insert("min".to_string(), native("min", min));
    m.insert("max".to_string(), native("max", max));
    m
}
