//! Expression evaluation.

use std::cmp::Ordering;
use std::rc::Rc;

use indexmap::IndexMap;

use super::Interpreter;
use crate::ast::{BinaryOp, Expr, FStringSegment, LogicalOp, UnaryOp};
use crate::environment::{Env, Environment, ScopeExt};
use crate::exception::{EvalResult, ExcType, RuntimeError};
use crate::function::Function;
use crate::value::{is_instance_of, Value};

impl<'io> Interpreter<'io> {
    pub(crate) fn eval_expr(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::string(s.clone())),
            Expr::FString(segments) => self.eval_fstring(segments, env),
            Expr::Ident(name) => env.get(name).ok_or_else(|| {
                RuntimeError::new(ExcType::NameError, format!("undefined name '{name}'")).into()
            }),
            Expr::This => env.lookup_this().ok_or_else(|| {
                RuntimeError::new(ExcType::NameError, "'this' used outside a method").into()
            }),
            Expr::ListLit(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, env)?);
                }
                Ok(Value::list(values))
            }
            Expr::DictLit(pairs) => {
                let mut map = IndexMap::new();
                for (key, value_expr) in pairs {
                    let v = self.eval_expr(value_expr, env)?;
                    map.insert(key.clone(), v);
                }
                Ok(Value::dict(map))
            }
            Expr::Lambda { params, body } => {
                let block = vec![crate::ast::Stmt::Return(Some((**body).clone()))];
                let f = Function::new(None, params.clone(), block, Rc::clone(env));
                Ok(Value::Func(f))
            }
            Expr::Unary { op, expr } => self.eval_unary(*op, expr, env),
            Expr::Binary { op, left, right } => {
                let l = self.eval_expr(left, env)?;
                let r = self.eval_expr(right, env)?;
                self.binary_op(*op, l, r)
            }
            Expr::Logical { op, left, right } => self.eval_logical(*op, left, right, env),
            Expr::Call { callee, args } => self.eval_call(callee, args, env),
            Expr::Member { target, name } => {
                let target_v = self.eval_expr(target, env)?;
                self.read_member(&target_v, name)
            }
            Expr::Index { target, index } => {
                let target_v = self.eval_expr(target, env)?;
                let index_v = self.eval_expr(index, env)?;
                self.get_index(&target_v, &index_v)
            }
            Expr::New { class, args } => {
                let class_v = self.eval_expr(class, env)?;
                let Value::Class(class) = class_v else {
                    return Err(RuntimeError::new(
                        ExcType::TypeError,
                        format!("cannot construct a {} with 'new'", class_v.type_name()),
                    )
                    .into());
                };
                let arg_vs = self.eval_args(args, env)?;
                self.instantiate(&class, arg_vs)
            }
            Expr::SuperCall { method, args } => self.eval_super_call(method, args, env),
            Expr::Isinstance { value, class } => {
                let v = self.eval_expr(value, env)?;
                let c = self.eval_expr(class, env)?;
                let Value::Class(class) = c else {
                    return Err(RuntimeError::new(
                        ExcType::TypeError,
                        format!("isinstance's second argument must be a class, got {}", c.type_name()),
                    )
                    .into());
                };
                Ok(Value::Bool(match &v {
                    Value::Instance(inst) => is_instance_of(inst, &class),
                    _ => false,
                }))
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr], env: &Env) -> EvalResult<Vec<Value>> {
        let mut out = Vec::with_capacity(args.len());
        for a in args {
            out.push(self.eval_expr(a, env)?);
        }
        Ok(out)
    }

    fn eval_fstring(&mut self, segments: &[FStringSegment], env: &Env) -> EvalResult<Value> {
        let mut out = String::new();
        for seg in segments {
            match seg {
                FStringSegment::Literal(s) => out.push_str(s),
                FStringSegment::Expr(e) => {
                    let v = self.eval_expr(e, env)?;
                    out.push_str(&self.stringify(&v)?);
                }
            }
        }
        Ok(Value::string(out))
    }

    fn eval_unary(&mut self, op: UnaryOp, expr: &Expr, env: &Env) -> EvalResult<Value> {
        let v = self.eval_expr(expr, env)?;
        match op {
            UnaryOp::Not => Ok(Value::Bool(!v.truthy())),
            UnaryOp::Neg => match v {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(RuntimeError::new(
                    ExcType::TypeError,
                    format!("cannot negate {}", other.type_name()),
                )
                .into()),
            },
        }
    }

    fn eval_logical(&mut self, op: LogicalOp, left: &Expr, right: &Expr, env: &Env) -> EvalResult<Value> {
        let l = self.eval_expr(left, env)?;
        match op {
            LogicalOp::And if !l.truthy() => Ok(l),
            LogicalOp::Or if l.truthy() => Ok(l),
            _ => self.eval_expr(right, env),
        }
    }

    /// Spec 4.3 arithmetic/comparison table. `/` always yields a `Float`
    /// (resolved Open Question, see `SPEC_FULL.md` 9); `+` coerces via
    /// stringification when either side is a string.
    pub(crate) fn binary_op(&mut self, op: BinaryOp, left: Value, right: Value) -> EvalResult<Value> {
        use BinaryOp::{Add, Div, Eq, Ge, Gt, Le, Lt, Mod, Mul, Ne, Sub};
        match op {
            Add => {
                if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                    let l = self.stringify(&left)?;
                    let r = self.stringify(&right)?;
                    return Ok(Value::string(l + &r));
                }
                numeric_op(left, right, i64::checked_add, |a, b| a + b, "+")
            }
            Sub => numeric_op(left, right, i64::checked_sub, |a, b| a - b, "-"),
            Mul => numeric_op(left, right, i64::checked_mul, |a, b| a * b, "*"),
            Div => {
                let a = require_number(&left)?;
                let b = require_number(&right)?;
                if b == 0.0 {
                    return Err(RuntimeError::new(ExcType::DivisionError, "division by zero").into());
                }
                Ok(Value::Float(a / b))
            }
            Mod => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => {
                    if *b == 0 {
                        return Err(
                            RuntimeError::new(ExcType::DivisionError, "modulus by zero").into()
                        );
                    }
                    Ok(Value::Int(a % b))
                }
                _ => {
                    let a = require_number(&left)?;
                    let b = require_number(&right)?;
                    if b == 0.0 {
                        return Err(
                            RuntimeError::new(ExcType::DivisionError, "modulus by zero").into()
                        );
                    }
                    Ok(Value::Float(a % b))
                }
            },
            Eq => Ok(Value::Bool(left.equals(&right))),
            Ne => Ok(Value::Bool(!left.equals(&right))),
            Lt => Ok(Value::Bool(left.compare(&right)? == Ordering::Less)),
            Le => Ok(Value::Bool(left.compare(&right)? != Ordering::Greater)),
            Gt => Ok(Value::Bool(left.compare(&right)? == Ordering::Greater)),
            Ge => Ok(Value::Bool(left.compare(&right)? != Ordering::Less)),
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], env: &Env) -> EvalResult<Value> {
        if let Expr::Member { target, name } = callee {
            let target_v = self.eval_expr(target, env)?;
            let arg_vs = self.eval_args(args, env)?;
            return self.call_method(target_v, name, arg_vs);
        }
        let callee_v = self.eval_expr(callee, env)?;
        let arg_vs = self.eval_args(args, env)?;
        self.call_value(&callee_v, arg_vs)
    }

    /// `target.name(args)` dispatch: instance attribute/method, or a
    /// built-in method table keyed by the value's tag (spec 4.8), or a
    /// module export (spec 4.9).
    fn call_method(&mut self, target: Value, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        match &target {
            Value::Instance(inst) => {
                let attr = inst.attrs.borrow().get(name).cloned();
                if let Some(attr) = attr {
                    return self.call_value(&attr, args);
                }
                let method = inst.class.resolve_method(name).ok_or_else(|| {
                    RuntimeError::new(
                        ExcType::NameError,
                        format!("'{}' has no method '{name}'", inst.class.name),
                    )
                })?;
                self.call_function(&method, Some(target.clone()), args)
            }
            Value::Str(s) => crate::builtins::string_methods::call(self, name, s, &args),
            Value::List(list) => crate::builtins::list_methods::call(self, name, list, &args),
            Value::Dict(dict) => {
                let stored = dict.borrow().get(name).cloned();
                match stored {
                    Some(value) => self.call_value(&value, args),
                    None => crate::builtins::dict_methods::call(self, name, dict, &args),
                }
            }
            Value::Module(m) => {
                let f = m.members.get(name).cloned().ok_or_else(|| {
                    RuntimeError::new(ExcType::NameError, format!("module '{}' has no member '{name}'", m.name))
                })?;
                self.call_value(&f, args)
            }
            other => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("{} has no method '{name}'", other.type_name()),
            )
            .into()),
        }
    }

    /// Non-call member reads: instance attribute/bound-method, `list.first`/
    /// `list.last` (the two list properties spec 4.8 lists without `()`),
    /// and dict key-read sugar (spec 4.5: "Member `.` on a dict reads ...
    /// a key of the same name").
    fn read_member(&mut self, target: &Value, name: &str) -> EvalResult<Value> {
        match target {
            Value::Instance(inst) => {
                if let Some(v) = inst.attrs.borrow().get(name).cloned() {
                    return Ok(v);
                }
                if let Some(method) = inst.class.resolve_method(name) {
                    return Ok(self.bind_method(target.clone(), method));
                }
                Err(RuntimeError::new(
                    ExcType::NameError,
                    format!("'{}' has no attribute '{name}'", inst.class.name),
                )
                .into())
            }
            Value::Dict(dict) => dict.borrow().get(name).cloned().ok_or_else(|| {
                RuntimeError::new(ExcType::IndexError, format!("no such key '{name}'")).into()
            }),
            Value::List(list) => {
                let items = list.borrow();
                match name {
                    "first" => items.first().cloned().ok_or_else(|| {
                        RuntimeError::new(ExcType::IndexError, "first() on empty list").into()
                    }),
                    "last" => items.last().cloned().ok_or_else(|| {
                        RuntimeError::new(ExcType::IndexError, "last() on empty list").into()
                    }),
                    other => Err(RuntimeError::new(
                        ExcType::TypeError,
                        format!("list has no property '{other}'"),
                    )
                    .into()),
                }
            }
            Value::Module(m) => m.members.get(name).cloned().ok_or_else(|| {
                RuntimeError::new(ExcType::NameError, format!("module '{}' has no member '{name}'", m.name))
                    .into()
            }),
            other => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("{} has no attribute '{name}'", other.type_name()),
            )
            .into()),
        }
    }

    pub(crate) fn get_index(&mut self, target: &Value, index: &Value) -> EvalResult<Value> {
        match target {
            Value::List(list) => {
                let items = list.borrow();
                let i = require_index(index)?;
                items.get(i).cloned().ok_or_else(|| {
                    RuntimeError::new(ExcType::IndexError, format!("list index {i} out of range")).into()
                })
            }
            Value::Dict(dict) => {
                let key = require_key(index)?;
                dict.borrow().get(&key).cloned().ok_or_else(|| {
                    RuntimeError::new(ExcType::IndexError, format!("no such key '{key}'")).into()
                })
            }
            other => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("{} is not indexable", other.type_name()),
            )
            .into()),
        }
    }

    pub(crate) fn set_index(&mut self, target: &Value, index: &Value, value: Value) -> EvalResult<()> {
        match target {
            Value::List(list) => {
                let i = require_index(index)?;
                let mut items = list.borrow_mut();
                if i >= items.len() {
                    return Err(
                        RuntimeError::new(ExcType::IndexError, format!("list index {i} out of range")).into()
                    );
                }
                items[i] = value;
                Ok(())
            }
            Value::Dict(dict) => {
                let key = require_key(index)?;
                dict.borrow_mut().insert(key, value);
                Ok(())
            }
            other => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("{} does not support index assignment", other.type_name()),
            )
            .into()),
        }
    }

    fn eval_super_call(&mut self, method: &str, args: &[Expr], env: &Env) -> EvalResult<Value> {
        let current_class = env.lookup_method_class().ok_or_else(|| {
            RuntimeError::new(ExcType::NameError, "'super' used outside a method")
        })?;
        let parent = current_class.parent.clone().ok_or_else(|| {
            RuntimeError::new(
                ExcType::NameError,
                format!("class '{}' has no superclass", current_class.name),
            )
        })?;
        let method_fn = parent.resolve_method(method).ok_or_else(|| {
            RuntimeError::new(ExcType::NameError, format!("superclass has no method '{method}'"))
        })?;
        let this = env.lookup_this().ok_or_else(|| {
            RuntimeError::new(ExcType::NameError, "'super' used outside a method")
        })?;
        let arg_vs = self.eval_args(args, env)?;
        self.call_function(&method_fn, Some(this), arg_vs)
    }
}

fn require_number(v: &Value) -> Result<f64, RuntimeError> {
    match v {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("expected a number, got {}", other.type_name()),
        )),
    }
}

fn numeric_op(
    left: Value,
    right: Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
    symbol: &str,
) -> EvalResult<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => match int_op(*a, *b) {
            Some(v) => Ok(Value::Int(v)),
            None => Ok(Value::Float(float_op(*a as f64, *b as f64))),
        },
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(float_op(require_number(&left)?, require_number(&right)?)))
        }
        _ => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("cannot apply '{symbol}' to {} and {}", left.type_name(), right.type_name()),
        )
        .into()),
    }
}

fn require_index(v: &Value) -> Result<usize, RuntimeError> {
    match v {
        Value::Int(n) if *n >= 0 => Ok(*n as usize),
        Value::Int(_) => {
            Err(RuntimeError::new(ExcType::IndexError, "negative indices are out of range"))
        }
        other => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("index must be an int, got {}", other.type_name()),
        )),
    }
}

fn require_key(v: &Value) -> Result<String, RuntimeError> {
    match v {
        Value::Str(s) => Ok(s.to_string()),
        other => Err(RuntimeError::new(
            ExcType::TypeError,
            format!("dict keys must be strings, got {}", other.type_name()),
        )),
    }
}
