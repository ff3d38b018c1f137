use thiserror::Error;

use crate::ast::{InfixOperator, PrefixOperator};

/// Typed runtime errors with the exact message templates the language
/// guarantees. Any operator, call, or index that produces one of these stops
/// evaluation of the whole program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        right: &'static str,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    #[error("identifier not found: {name}")]
    IdentifierNotFound { name: String },
    #[error("not a function: {type_name}")]
    NotAFunction { type_name: &'static str },
    #[error("index operator not supported: {type_name}")]
    IndexNotSupported { type_name: &'static str },
    #[error("unusable as hash key: {type_name}")]
    UnusableHashKey { type_name: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongNumberOfArguments { got: usize, want: usize },
    #[error("argument to `{builtin}` not supported, got {type_name}")]
    UnsupportedBuiltinArgument {
        builtin: &'static str,
        type_name: &'static str,
    },
    #[error("argument to `{builtin}` must be ARRAY, got {type_name}")]
    BuiltinArgumentNotArray {
        builtin: &'static str,
        type_name: &'static str,
    },
}
