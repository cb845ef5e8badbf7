//! The `time` module (spec 4.9). `elapsed`/`elapsed(t0)` are monotonic,
//! measured from `Interpreter::new`; `now`/`date`/`year`/`month` read the
//! wall clock via `chrono`.

use indexmap::IndexMap;

use super::native;
use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::Value;

fn now(_interp: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(Value::Int(secs))
}

fn date(_interp: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::string(chrono::Local::now().format("%Y-%m-%d").to_string()))
}

fn year(_interp: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    use chrono::Datelike;
    Ok(Value::Int(i64::from(chrono::Local::now().year())))
}

fn month(_interp: &mut Interpreter, _args: &[Value]) -> EvalResult<Value> {
    use chrono::Datelike;
    Ok(Value::Int(i64::from(chrono::Local::now().month())))
}

fn elapsed(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let now = interp.elapsed_secs();
    match args.first() {
        None => Ok(Value::Float(now)),
        Some(Value::Int(n)) => Ok(Value::Float(now - *n as f64)),
        Some(Value::Float(t0)) => Ok(Value::Float(now - t0)),
        Some(other) => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("elapsed expects a number, got {}", other.type_name()),
        )
        .into()),
    }
}

pub(super) fn members() -> IndexMap<String, Value> {
    let mut m = IndexMap::new();
    m.insert("now".to_string(), native("now", now));
    m.insert("date".to_string(), native("date", date));
    m.insert("year".to_string(), native("year", year));
    m.insert("month".to_string(), native("month", month));
    m.insert("elapsed".to_string(), native("elapsed", elapsed));
    m
}
