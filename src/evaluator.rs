//! Tree-walking evaluation.
//!
//! `eval_program` walks the AST against an [`Environment`] and produces a
//! single [`Value`]. Integer arithmetic wraps on `i64` overflow; division by
//! zero is a runtime error. Runtime errors and `return` both travel on the
//! `Err` channel as an [`Interrupt`], so a single `?` propagates them through
//! arbitrarily nested blocks; the interrupt is resolved exactly once, at a
//! call frame or at the top of the program.

use std::collections::HashMap;
use std::rc::Rc;

mod builtins;
mod env;
mod error;
mod value;

pub use builtins::Builtin;
pub use env::Environment;
pub use error::RuntimeError;
pub use value::{Function, HashKey, HashPair, Value};

use crate::ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement};

/// Why evaluation of the current construct stopped early.
enum Interrupt {
    /// A `return` statement fired; carried upward until a call frame (or the
    /// program loop) strips it.
    Return(Value),
    /// A runtime error; carried all the way out.
    Error(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Interrupt::Error(error)
    }
}

type Outcome = Result<Value, Interrupt>;

/// Evaluates a parsed program. The result is the value of the last top-level
/// statement, or the value of the first `return` to reach the top.
pub fn eval_program(program: &Program, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    let mut result = Value::Null;
    for statement in &program.statements {
        match eval_statement(statement, env) {
            Ok(value) => result = value,
            Err(Interrupt::Return(value)) => return Ok(value),
            Err(Interrupt::Error(error)) => return Err(error),
        }
    }
    Ok(result)
}

fn eval_statement(statement: &Statement, env: &Rc<Environment>) -> Outcome {
    match statement {
        Statement::Let { name, value } => {
            let value = eval_expression(value, env)?;
            env.set(name.clone(), value.clone());
            Ok(value)
        }
        Statement::Return(value) => {
            let value = eval_expression(value, env)?;
            Err(Interrupt::Return(value))
        }
        Statement::Expression(expr) => eval_expression(expr, env),
    }
}

/// A block's value is its last statement's value. A `Return` interrupt passes
/// through untouched, which is what lets it cross nested blocks.
fn eval_block(block: &BlockStatement, env: &Rc<Environment>) -> Outcome {
    let mut result = Value::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env)?;
    }
    Ok(result)
}

fn eval_expression(expr: &Expression, env: &Rc<Environment>) -> Outcome {
    match expr {
        Expression::IntegerLiteral(value) => Ok(Value::Integer(*value)),
        Expression::BooleanLiteral(value) => Ok(Value::Boolean(*value)),
        Expression::StringLiteral(value) => Ok(Value::String(value.clone())),
        Expression::Identifier(name) => eval_identifier(name, env),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env)?;
            Ok(eval_prefix(*operator, right)?)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, env)?;
            let right = eval_expression(right, env)?;
            Ok(eval_infix(*operator, left, right)?)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env)?;
            if condition.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Ok(Value::Null)
            }
        }
        Expression::FunctionLiteral { parameters, body } => {
            // Closure capture: the function retains the environment of its
            // definition site.
            Ok(Value::Function(Rc::new(Function {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            })))
        }
        Expression::Call {
            function,
            arguments,
        } => {
            let callee = eval_expression(function, env)?;
            let args = eval_expressions(arguments, env)?;
            apply_function(callee, args)
        }
        Expression::ArrayLiteral(elements) => {
            let elements = eval_expressions(elements, env)?;
            Ok(Value::Array(Rc::new(elements)))
        }
        Expression::HashLiteral(entries) => {
            let mut pairs = HashMap::with_capacity(entries.len());
            for (key_expr, value_expr) in entries {
                let key = eval_expression(key_expr, env)?;
                let hash_key = key.hash_key().ok_or(RuntimeError::UnusableHashKey {
                    type_name: key.type_name(),
                })?;
                let value = eval_expression(value_expr, env)?;
                pairs.insert(hash_key, HashPair { key, value });
            }
            Ok(Value::Hash(Rc::new(pairs)))
        }
        Expression::Index { left, index } => {
            let left = eval_expression(left, env)?;
            let index = eval_expression(index, env)?;
            Ok(eval_index(left, index)?)
        }
    }
}

fn eval_identifier(name: &str, env: &Rc<Environment>) -> Outcome {
    if let Some(value) = env.get(name) {
        return Ok(value);
    }
    if let Some(builtin) = Builtin::from_name(name) {
        return Ok(Value::Builtin(builtin));
    }
    Err(RuntimeError::IdentifierNotFound {
        name: name.to_string(),
    }
    .into())
}

/// Left-to-right evaluation; the first interrupt wins.
fn eval_expressions(exprs: &[Expression], env: &Rc<Environment>) -> Result<Vec<Value>, Interrupt> {
    exprs
        .iter()
        .map(|expr| eval_expression(expr, env))
        .collect()
}

fn eval_prefix(operator: PrefixOperator, right: Value) -> Result<Value, RuntimeError> {
    match operator {
        PrefixOperator::Bang => Ok(Value::Boolean(!right.is_truthy())),
        PrefixOperator::Minus => match right {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
            other => Err(RuntimeError::UnknownPrefixOperator {
                operator,
                right: other.type_name(),
            }),
        },
    }
}

fn eval_infix(operator: InfixOperator, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Value::String(l), Value::String(r)) => match operator {
            InfixOperator::Plus => Ok(Value::String(format!("{l}{r}"))),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: "STRING",
                operator,
                right: "STRING",
            }),
        },
        _ => match operator {
            // Identity comparison; sound for booleans and null because they
            // are canonical, reference-based for aggregates.
            InfixOperator::Eq => Ok(Value::Boolean(identity_eq(&left, &right))),
            InfixOperator::NotEq => Ok(Value::Boolean(!identity_eq(&left, &right))),
            _ if left.type_name() != right.type_name() => Err(RuntimeError::TypeMismatch {
                left: left.type_name(),
                operator,
                right: right.type_name(),
            }),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.type_name(),
                operator,
                right: right.type_name(),
            }),
        },
    }
}

fn eval_integer_infix(operator: InfixOperator, left: i64, right: i64) -> Result<Value, RuntimeError> {
    let value = match operator {
        InfixOperator::Plus => Value::Integer(left.wrapping_add(right)),
        InfixOperator::Minus => Value::Integer(left.wrapping_sub(right)),
        InfixOperator::Asterisk => Value::Integer(left.wrapping_mul(right)),
        InfixOperator::Slash => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Value::Integer(left.wrapping_div(right))
        }
        InfixOperator::Lt => Value::Boolean(left < right),
        InfixOperator::Gt => Value::Boolean(left > right),
        InfixOperator::Eq => Value::Boolean(left == right),
        InfixOperator::NotEq => Value::Boolean(left != right),
    };
    Ok(value)
}

fn identity_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::Null, Value::Null) => true,
        (Value::Array(l), Value::Array(r)) => Rc::ptr_eq(l, r),
        (Value::Hash(l), Value::Hash(r)) => Rc::ptr_eq(l, r),
        (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
        (Value::Builtin(l), Value::Builtin(r)) => l == r,
        _ => false,
    }
}

fn apply_function(callee: Value, args: Vec<Value>) -> Outcome {
    match callee {
        Value::Function(function) => {
            if args.len() != function.parameters.len() {
                return Err(RuntimeError::WrongNumberOfArguments {
                    got: args.len(),
                    want: function.parameters.len(),
                }
                .into());
            }
            let call_env = Environment::new_enclosed(Rc::clone(&function.env));
            for (parameter, argument) in function.parameters.iter().zip(args) {
                call_env.set(parameter.clone(), argument);
            }
            match eval_block(&function.body, &call_env) {
                // This call frame strips exactly one return wrapper.
                Err(Interrupt::Return(value)) => Ok(value),
                other => other,
            }
        }
        Value::Builtin(builtin) => Ok(builtin.apply(&args)?),
        other => Err(RuntimeError::NotAFunction {
            type_name: other.type_name(),
        }
        .into()),
    }
}

fn eval_index(left: Value, index: Value) -> Result<Value, RuntimeError> {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(position)) => {
            // Out-of-range and negative indexes yield null, not an error.
            let element = usize::try_from(*position)
                .ok()
                .and_then(|position| elements.get(position));
            Ok(element.cloned().unwrap_or(Value::Null))
        }
        (Value::Hash(pairs), key) => {
            let hash_key = key.hash_key().ok_or(RuntimeError::UnusableHashKey {
                type_name: key.type_name(),
            })?;
            let value = pairs.get(&hash_key).map(|pair| pair.value.clone());
            Ok(value.unwrap_or(Value::Null))
        }
        _ => Err(RuntimeError::IndexNotSupported {
            type_name: left.type_name(),
        }),
    }
}
