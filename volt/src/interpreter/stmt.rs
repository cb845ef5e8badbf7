//! Statement execution.

use std::rc::Rc;

use super::Interpreter;
use crate::ast::{AssignTarget, Block, Stmt};
use crate::environment::{Env, Environment, ScopeExt};
use crate::exception::{EvalResult, ExcType, RuntimeError, Signal};
use crate::function::Function;
use crate::object::Class;
use crate::value::Value;

impl<'io> Interpreter<'io> {
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, env: &Env) -> EvalResult<()> {
        match stmt {
            Stmt::Set { target, value } => {
                let v = self.eval_expr(value, env)?;
                self.assign_target(target, v, env)
            }
            Stmt::FuncDecl { name, params, body } => {
                let f = Function::new(Some(name.clone()), params.clone(), body.clone(), Rc::clone(env));
                env.define(name, Value::Func(f));
                Ok(())
            }
            Stmt::ClassDecl { name, parent, methods } => self.exec_class_decl(name, parent.as_deref(), methods, env),
            Stmt::If { branches, else_branch } => self.exec_if(branches, else_branch.as_ref(), env),
            Stmt::While { cond, body } => self.exec_while(cond, body, env),
            Stmt::ForIn { var, iter, body } => self.exec_for_in(var, iter, body, env),
            Stmt::ForRange { var, from, to, body } => self.exec_for_range(var, from, to, body, env),
            Stmt::ForPair { first, second, iter, body } => {
                self.exec_for_pair(first, second, iter, body, env)
            }
            Stmt::Match { subject, cases, default } => self.exec_match(subject, cases, default.as_ref(), env),
            Stmt::Try { body, catch_var, catch_body, finally_body } => {
                self.exec_try(body, catch_var, catch_body, finally_body.as_deref(), env)
            }
            Stmt::Throw(expr) => {
                let v = self.eval_expr(expr, env)?;
                Err(Signal::Throw(v))
            }
            Stmt::Return(expr) => {
                let v = match expr {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Null,
                };
                Err(Signal::Return(v))
            }
            Stmt::Break => Err(Signal::Break),
            Stmt::Continue => Err(Signal::Continue),
            Stmt::Use(name) => {
                let module = crate::modules::lookup(name).ok_or_else(|| {
                    Signal::from(RuntimeError::new(
                        ExcType::NameError,
                        format!("no such built-in module '{name}'"),
                    ))
                })?;
                env.define(name, module);
                Ok(())
            }
            Stmt::Show(expr) => {
                let v = self.eval_expr(expr, env)?;
                let text = self.stringify(&v)?;
                self.show_line(&text);
                Ok(())
            }
            Stmt::Ask { prompt, target } => {
                let p = self.eval_expr(prompt, env)?;
                let prompt_text = self.stringify(&p)?;
                let line = self.show_prompt_and_read(&prompt_text).unwrap_or_default();
                env.define(target, Value::string(line));
                Ok(())
            }
            Stmt::Expr(expr) => {
                self.last_value = self.eval_expr(expr, env)?;
                Ok(())
            }
        }
    }

    fn assign_target(&mut self, target: &AssignTarget, value: Value, env: &Env) -> EvalResult<()> {
        match target {
            AssignTarget::Ident(name) => {
                if !env.assign(name, value.clone()) {
                    env.define(name, value);
                }
                Ok(())
            }
            AssignTarget::Member(target_expr, name) => {
                let target_value = self.eval_expr(target_expr, env)?;
                match target_value {
                    Value::Instance(inst) => {
                        inst.attrs.borrow_mut().insert(name.clone(), value);
                        Ok(())
                    }
                    Value::Dict(dict) => {
                        dict.borrow_mut().insert(name.clone(), value);
                        Ok(())
                    }
                    other => Err(RuntimeError::new(
                        ExcType::TypeError,
                        format!("cannot set attribute '{name}' on {}", other.type_name()),
                    )
                    .into()),
                }
            }
            AssignTarget::Index(target_expr, index_expr) => {
                let target_value = self.eval_expr(target_expr, env)?;
                let index_value = self.eval_expr(index_expr, env)?;
                self.set_index(&target_value, &index_value, value)
            }
            AssignTarget::ListPattern(names) => self.destructure_list(names, value, env),
            AssignTarget::DictPattern(names) => self.destructure_dict(names, value, env),
        }
    }

    fn destructure_list(&mut self, names: &[String], value: Value, env: &Env) -> EvalResult<()> {
        let Value::List(list) = value else {
            return Err(RuntimeError::new(
                ExcType::TypeError,
                format!("cannot destructure {} as a list", value.type_name()),
            )
            .into());
        };
        let items = list.borrow();
        for (i, name) in names.iter().enumerate() {
            let v = items.get(i).cloned().unwrap_or(Value::Null);
            env.define(name, v);
        }
        Ok(())
    }

    fn destructure_dict(&mut self, names: &[String], value: Value, env: &Env) -> EvalResult<()> {
        let Value::Dict(dict) = value else {
            return Err(RuntimeError::new(
                ExcType::TypeError,
                format!("cannot destructure {} as a dict", value.type_name()),
            )
            .into());
        };
        let borrowed = dict.borrow();
        for name in names {
            let v = borrowed.get(name).cloned().unwrap_or(Value::Null);
            env.define(name, v);
        }
        Ok(())
    }

    fn exec_if(
        &mut self,
        branches: &[(crate::ast::Expr, Block)],
        else_branch: Option<&Block>,
        env: &Env,
    ) -> EvalResult<()> {
        for (cond, body) in branches {
            if self.eval_expr(cond, env)?.truthy() {
                let scope = Environment::child(env);
                return self.exec_block(body, &scope);
            }
        }
        if let Some(body) = else_branch {
            let scope = Environment::child(env);
            return self.exec_block(body, &scope);
        }
        Ok(())
    }

    fn exec_while(&mut self, cond: &crate::ast::Expr, body: &Block, env: &Env) -> EvalResult<()> {
        while self.eval_expr(cond, env)?.truthy() {
            let scope = Environment::child(env);
            match self.exec_block(body, &scope) {
                Ok(()) => {}
                Err(Signal::Break) => break,
                Err(Signal::Continue) => continue,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_for_in(
        &mut self,
        var: &str,
        iter: &crate::ast::Expr,
        body: &Block,
        env: &Env,
    ) -> EvalResult<()> {
        let iterable = self.eval_expr(iter, env)?;
        let items = self.iterate(&iterable)?;
        for item in items {
            let scope = Environment::child(env);
            scope.define(var, item);
            match self.exec_block(body, &scope) {
                Ok(()) => {}
                Err(Signal::Break) => break,
                Err(Signal::Continue) => continue,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_for_range(
        &mut self,
        var: &str,
        from: &crate::ast::Expr,
        to: &crate::ast::Expr,
        body: &Block,
        env: &Env,
    ) -> EvalResult<()> {
        let from_v = self.require_int(self.eval_expr(from, env)?)?;
        let to_v = self.require_int(self.eval_expr(to, env)?)?;
        let mut i = from_v;
        while i < to_v {
            let scope = Environment::child(env);
            scope.define(var, Value::Int(i));
            match self.exec_block(body, &scope) {
                Ok(()) => {}
                Err(Signal::Break) => break,
                Err(Signal::Continue) => {
                    i += 1;
                    continue;
                }
                Err(other) => return Err(other),
            }
            i += 1;
        }
        Ok(())
    }

    fn require_int(&self, v: Value) -> EvalResult<i64> {
        match v {
            Value::Int(n) => Ok(n),
            other => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("for...to bounds must be integers, got {}", other.type_name()),
            )
            .into()),
        }
    }

    fn exec_for_pair(
        &mut self,
        first: &str,
        second: &str,
        iter: &crate::ast::Expr,
        body: &Block,
        env: &Env,
    ) -> EvalResult<()> {
        let iterable = self.eval_expr(iter, env)?;
        match iterable {
            Value::List(list) => {
                let items = list.borrow().clone();
                for (idx, item) in items.into_iter().enumerate() {
                    let scope = Environment::child(env);
                    scope.define(first, Value::Int(idx as i64));
                    scope.define(second, item);
                    match self.exec_block(body, &scope) {
                        Ok(()) => {}
                        Err(Signal::Break) => break,
                        Err(Signal::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Value::Dict(dict) => {
                let entries: Vec<(String, Value)> =
                    dict.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                for (k, v) in entries {
                    let scope = Environment::child(env);
                    scope.define(first, Value::string(k));
                    scope.define(second, v);
                    match self.exec_block(body, &scope) {
                        Ok(()) => {}
                        Err(Signal::Break) => break,
                        Err(Signal::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            other => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("cannot iterate pairs over {}", other.type_name()),
            )
            .into()),
        }
    }

    pub(crate) fn iterate(&mut self, value: &Value) -> EvalResult<Vec<Value>> {
        match value {
            Value::List(list) => Ok(list.borrow().clone()),
            Value::Dict(dict) => Ok(dict.borrow().keys().map(|k| Value::string(k.clone())).collect()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
            other => Err(RuntimeError::new(
                ExcType::TypeError,
                format!("{} is not iterable", other.type_name()),
            )
            .into()),
        }
    }

    fn exec_match(
        &mut self,
        subject: &crate::ast::Expr,
        cases: &[(crate::ast::Expr, Block)],
        default: Option<&Block>,
        env: &Env,
    ) -> EvalResult<()> {
        let subject_v = self.eval_expr(subject, env)?;
        for (pattern, body) in cases {
            let pattern_v = self.eval_expr(pattern, env)?;
            if subject_v.equals(&pattern_v) {
                let scope = Environment::child(env);
                return self.exec_block(body, &scope);
            }
        }
        if let Some(body) = default {
            let scope = Environment::child(env);
            return self.exec_block(body, &scope);
        }
        Ok(())
    }

    fn exec_try(
        &mut self,
        body: &Block,
        catch_var: &str,
        catch_body: &Block,
        finally_body: Option<&Block>,
        env: &Env,
    ) -> EvalResult<()> {
        let try_scope = Environment::child(env);
        let result = match self.exec_block(body, &try_scope) {
            Err(Signal::Throw(payload)) => {
                let catch_scope = Environment::child(env);
                catch_scope.define(catch_var, payload);
                self.exec_block(catch_body, &catch_scope)
            }
            other => other,
        };

        // A `finally` block's own exit replaces any in-flight signal (spec
        // 4.6); otherwise the try/catch outcome propagates unchanged.
        if let Some(finally_body) = finally_body {
            let finally_scope = Environment::child(env);
            match self.exec_block(finally_body, &finally_scope) {
                Ok(()) => result,
                finally_signal => finally_signal,
            }
        } else {
            result
        }
    }

    fn exec_class_decl(
        &mut self,
        name: &str,
        parent: Option<&str>,
        methods: &[crate::ast::MethodDecl],
        env: &Env,
    ) -> EvalResult<()> {
        let parent_class = match parent {
            Some(parent_name) => match env.get(parent_name) {
                Some(Value::Class(c)) => Some(c),
                Some(other) => {
                    return Err(RuntimeError::new(
                        ExcType::TypeError,
                        format!("{parent_name} is not a class (got {})", other.type_name()),
                    )
                    .into());
                }
                None => {
                    return Err(RuntimeError::new(
                        ExcType::NameError,
                        format!("undefined class '{parent_name}'"),
                    )
                    .into());
                }
            },
            None => None,
        };

        let mut table = indexmap::IndexMap::new();
        for m in methods {
            let f = Function::new(Some(m.name.clone()), m.params.clone(), m.body.clone(), Rc::clone(env));
            table.insert(m.name.clone(), f);
        }
        if !table.contains_key("init") {
            let f = Function::new(Some("init".to_string()), Vec::new(), Vec::new(), Rc::clone(env));
            table.insert("init".to_string(), f);
        }

        let class = Rc::new(Class { name: name.to_string(), parent: parent_class, methods: table });
        for f in class.methods.values() {
            f.bind_defining_class(&class);
        }
        env.define(name, Value::Class(class));
        Ok(())
    }
}
