//! Recursive evaluator.
//!
//! Dispatch follows expression shape: atoms are literals or identifier
//! lookups; a list expression evaluates its head and then applies it. A
//! special form receives its argument expressions unevaluated and controls
//! evaluation itself; procedures get their arguments evaluated left-to-right
//! against the current environment first.
//!
//! Scoping is by snapshot, not by parent chain: a procedure body runs in a
//! copy of the *caller's* environment at call time with the parameters
//! added. This is the language's defined (if unusual) scoping rule, so
//! nested lambdas do not capture their definition-site locals.

use std::rc::Rc;

use crate::ast::Expr;
use crate::environment::Environment;
use crate::value::Value;
use crate::EvalError;

/// Evaluate one expression in the given environment.
pub fn eval(expr: &Expr, env: &mut Environment) -> Result<Value, EvalError> {
    match expr {
        Expr::Atom(token) => eval_atom(token, env),
        Expr::List(elements) => match elements.split_first() {
            None => Err(EvalError::EmptyApplication),
            Some((operator, args)) => {
                let operator = eval(operator, env)?;
                apply(operator, args, env)
            }
        },
    }
}

/// Boolean literal, integer literal, or identifier lookup. Integers are
/// syntactically non-negative; negation happens through the `-` procedure.
fn eval_atom(token: &str, env: &Environment) -> Result<Value, EvalError> {
    match token {
        "#t" => Ok(Value::Boolean(true)),
        "#f" => Ok(Value::Boolean(false)),
        _ => {
            if let Ok(n) = token.parse::<i64>() {
                Ok(Value::Integer(n))
            } else {
                env.lookup(token)
                    .cloned()
                    .ok_or_else(|| EvalError::UnboundIdentifier(token.to_string()))
            }
        }
    }
}

fn eval_args(args: &[Expr], env: &mut Environment) -> Result<Vec<Value>, EvalError> {
    let mut evaluated = Vec::with_capacity(args.len());
    for arg in args {
        evaluated.push(eval(arg, env)?);
    }
    Ok(evaluated)
}

fn apply(operator: Value, args: &[Expr], env: &mut Environment) -> Result<Value, EvalError> {
    match operator {
        Value::Form(form) => (form.handler)(args, env),
        Value::Builtin(op) => {
            op.arity.validate(args.len())?;
            let evaluated = eval_args(args, env)?;
            (op.func)(&evaluated)
        }
        Value::Lambda { params, body } => {
            if args.len() != params.len() {
                return Err(EvalError::ArityMismatch {
                    expected: params.len(),
                    got: args.len(),
                });
            }
            let evaluated = eval_args(args, env)?;
            let mut call_env = env.snapshot();
            for (param, arg) in params.iter().zip(evaluated) {
                call_env.bind(param.clone(), arg);
            }
            eval(&body, &mut call_env)
        }
        Value::VariadicLambda { param, body } => {
            let evaluated = eval_args(args, env)?;
            let mut call_env = env.snapshot();
            call_env.bind(param, Value::list(&evaluated));
            eval(&body, &mut call_env)
        }
        other => Err(EvalError::NotCallable(other.to_string())),
    }
}

//
// Special form handlers, registered in the built-ins module.
//

/// `(define name expr)`: evaluate `expr`, then bind `name` in the
/// environment handed in — the one mutation that outlives its form, which
/// is how top-level definitions persist across expressions.
pub fn eval_define(args: &[Expr], env: &mut Environment) -> Result<Value, EvalError> {
    match args {
        [Expr::Atom(name), expr] => {
            let value = eval(expr, env)?;
            env.bind(name.clone(), value);
            Ok(Value::Nil)
        }
        [_, _] => Err(EvalError::MalformedSpecialForm(
            "define: first argument must be an identifier".to_string(),
        )),
        _ => Err(EvalError::MalformedSpecialForm(format!(
            "define: expected 2 arguments, got {}",
            args.len()
        ))),
    }
}

/// `(lambda (a b ...) body)` makes a fixed-arity procedure;
/// `(lambda args body)` makes a variadic one. The body stays unevaluated.
pub fn eval_lambda(args: &[Expr], _env: &mut Environment) -> Result<Value, EvalError> {
    match args {
        [Expr::List(params), body] => {
            let mut names = Vec::with_capacity(params.len());
            for param in params {
                match param {
                    Expr::Atom(name) => names.push(name.clone()),
                    Expr::List(_) => {
                        return Err(EvalError::MalformedSpecialForm(
                            "lambda: parameter names must be identifiers".to_string(),
                        ));
                    }
                }
            }
            Ok(Value::Lambda {
                params: names,
                body: Rc::new(body.clone()),
            })
        }
        [Expr::Atom(param), body] => Ok(Value::VariadicLambda {
            param: param.clone(),
            body: Rc::new(body.clone()),
        }),
        _ => Err(EvalError::MalformedSpecialForm(format!(
            "lambda: expected 2 arguments, got {}",
            args.len()
        ))),
    }
}

/// `(if cond conseq alt)`: exactly one of the branches is evaluated.
pub fn eval_if(args: &[Expr], env: &mut Environment) -> Result<Value, EvalError> {
    match args {
        [condition, conseq, alt] => {
            if eval_condition(condition, env, "if")? {
                eval(conseq, env)
            } else {
                eval(alt, env)
            }
        }
        _ => Err(EvalError::MalformedSpecialForm(format!(
            "if: expected 3 arguments, got {}",
            args.len()
        ))),
    }
}

/// `(cond (c1 b1) (c2 b2) ... )`: first true branch wins; the final
/// branch's condition may be the literal `else`, which matches without
/// being evaluated.
pub fn eval_cond(args: &[Expr], env: &mut Environment) -> Result<Value, EvalError> {
    let Some((last, leading)) = args.split_last() else {
        return Err(EvalError::MalformedSpecialForm(
            "cond: expected at least 1 branch".to_string(),
        ));
    };

    for branch in leading {
        let (condition, body) = cond_branch(branch)?;
        if eval_condition(condition, env, "cond")? {
            return eval(body, env);
        }
    }

    let (condition, body) = cond_branch(last)?;
    if matches!(condition, Expr::Atom(token) if token == "else") {
        return eval(body, env);
    }
    if eval_condition(condition, env, "cond")? {
        return eval(body, env);
    }
    Err(EvalError::NoBranchMatched)
}

fn cond_branch(branch: &Expr) -> Result<(&Expr, &Expr), EvalError> {
    match branch {
        Expr::List(items) if items.len() == 2 => Ok((&items[0], &items[1])),
        Expr::List(items) => Err(EvalError::MalformedSpecialForm(format!(
            "cond: expected 2 items in a branch, got {}",
            items.len()
        ))),
        Expr::Atom(_) => Err(EvalError::MalformedSpecialForm(
            "cond: branches must be list expressions".to_string(),
        )),
    }
}

fn eval_condition(condition: &Expr, env: &mut Environment, form: &str) -> Result<bool, EvalError> {
    match eval(condition, env)? {
        Value::Boolean(b) => Ok(b),
        other => Err(EvalError::TypeError(format!(
            "{form}: condition must be a boolean, got {}",
            other.type_name()
        ))),
    }
}

/// `(begin e1 e2 ...)`: one snapshot shared by every sub-expression, so
/// inner `define`s are visible to later sub-expressions but not to the
/// caller. Returns the last value, or nil if there are none.
pub fn eval_begin(args: &[Expr], env: &mut Environment) -> Result<Value, EvalError> {
    let mut begin_env = env.snapshot();
    let mut retval = Value::Nil;
    for expr in args {
        retval = eval(expr, &mut begin_env)?;
    }
    Ok(retval)
}

/// `(let ((n1 v1) (n2 v2) ...) body)`: every value expression is evaluated
/// against the outer environment — bindings have no sequential dependency —
/// then the body runs in one snapshot holding them all.
pub fn eval_let(args: &[Expr], env: &mut Environment) -> Result<Value, EvalError> {
    match args {
        [Expr::List(bindings), body] => {
            let mut let_env = env.snapshot();
            for binding in bindings {
                let (name, value_expr) = match binding {
                    Expr::List(pair) if pair.len() == 2 => match &pair[0] {
                        Expr::Atom(name) => (name, &pair[1]),
                        Expr::List(_) => {
                            return Err(EvalError::MalformedSpecialForm(
                                "let: binding names must be identifiers".to_string(),
                            ));
                        }
                    },
                    _ => {
                        return Err(EvalError::MalformedSpecialForm(
                            "let: bindings must be (name value) pairs".to_string(),
                        ));
                    }
                };
                let value = eval(value_expr, env)?;
                let_env.bind(name.clone(), value);
            }
            eval(body, &mut let_env)
        }
        [_, _] => Err(EvalError::MalformedSpecialForm(
            "let: first argument must be a binding list".to_string(),
        )),
        _ => Err(EvalError::MalformedSpecialForm(format!(
            "let: expected 2 arguments, got {}",
            args.len()
        ))),
    }
}
