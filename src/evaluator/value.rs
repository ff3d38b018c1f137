use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::BlockStatement;

use super::builtins::Builtin;
use super::env::Environment;

/// Runtime value model.
///
/// Aggregates sit behind `Rc`: cloning a value shares storage, which is safe
/// because the language has no mutation operators (`push` and `rest` allocate
/// fresh arrays). The two `Boolean` payloads are the canonical true/false
/// instances the language requires.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashMap<HashKey, HashPair>>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

/// A user function value: parameters, body, and the environment captured at
/// its definition site (the closure).
#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Rc<Environment>,
}

/// One entry of a hash: the original key value alongside the stored value,
/// so inspection can render the key the program wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HashKeyTag {
    Integer,
    Boolean,
    String,
}

/// Deterministic fingerprint of a hashable value: equal payloads of the same
/// variant produce equal keys, distinct variants never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    tag: HashKeyTag,
    value: u64,
}

impl Value {
    /// The stable type tag interpolated into error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::String(_) => "STRING",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
        }
    }

    /// Everything is truthy except `false` and `null`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    /// `Some` for the three hashable variants, `None` otherwise.
    pub fn hash_key(&self) -> Option<HashKey> {
        let key = match self {
            Value::Integer(value) => HashKey {
                tag: HashKeyTag::Integer,
                value: *value as u64,
            },
            Value::Boolean(value) => HashKey {
                tag: HashKeyTag::Boolean,
                value: u64::from(*value),
            },
            Value::String(value) => HashKey {
                tag: HashKeyTag::String,
                value: fnv1a(value.as_bytes()),
            },
            _ => return None,
        };
        Some(key)
    }
}

/// FNV-1a over the string bytes. Stable within a process, which is all the
/// hash containers need.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

impl PartialEq for Value {
    /// Structural equality for data, reference equality for functions.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(l), Value::Integer(r)) => l == r,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (Value::String(l), Value::String(r)) => l == r,
            (Value::Null, Value::Null) => true,
            (Value::Array(l), Value::Array(r)) => l == r,
            (Value::Hash(l), Value::Hash(r)) => l == r,
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::Builtin(l), Value::Builtin(r)) => l == r,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// The inspect form printed by the REPL.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
            Value::Null => f.write_str("null"),
            Value::Array(elements) => {
                let rendered = elements
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{rendered}]")
            }
            Value::Hash(pairs) => {
                let rendered = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{rendered}}}")
            }
            Value::Function(function) => {
                write!(
                    f,
                    "fn({}) {{\n{}\n}}",
                    function.parameters.join(", "),
                    function.body
                )
            }
            Value::Builtin(builtin) => write!(f, "builtin function {}", builtin.name()),
        }
    }
}
