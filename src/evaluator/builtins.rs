use std::rc::Rc;

use super::error::RuntimeError;
use super::value::Value;

/// Native functions available wherever an identifier lookup would otherwise
/// fail. User `let` bindings shadow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            _ => None,
        }
    }

    pub fn apply(self, args: &[Value]) -> Result<Value, RuntimeError> {
        match self {
            Builtin::Len => {
                let arg = single_argument(args)?;
                match arg {
                    Value::String(value) => Ok(Value::Integer(value.len() as i64)),
                    Value::Array(elements) => Ok(Value::Integer(elements.len() as i64)),
                    other => Err(RuntimeError::UnsupportedBuiltinArgument {
                        builtin: self.name(),
                        type_name: other.type_name(),
                    }),
                }
            }
            Builtin::First => {
                let elements = array_argument(self, single_argument(args)?)?;
                Ok(elements.first().cloned().unwrap_or(Value::Null))
            }
            Builtin::Last => {
                let elements = array_argument(self, single_argument(args)?)?;
                Ok(elements.last().cloned().unwrap_or(Value::Null))
            }
            Builtin::Rest => {
                let elements = array_argument(self, single_argument(args)?)?;
                if elements.is_empty() {
                    return Ok(Value::Null);
                }
                // Fresh allocation: must not alias the source array.
                Ok(Value::Array(Rc::new(elements[1..].to_vec())))
            }
            Builtin::Push => {
                if args.len() != 2 {
                    return Err(RuntimeError::WrongNumberOfArguments {
                        got: args.len(),
                        want: 2,
                    });
                }
                let elements = array_argument(self, &args[0])?;
                let mut extended = Vec::with_capacity(elements.len() + 1);
                extended.extend_from_slice(elements);
                extended.push(args[1].clone());
                Ok(Value::Array(Rc::new(extended)))
            }
        }
    }
}

fn single_argument(args: &[Value]) -> Result<&Value, RuntimeError> {
    if let [arg] = args {
        Ok(arg)
    } else {
        Err(RuntimeError::WrongNumberOfArguments {
            got: args.len(),
            want: 1,
        })
    }
}

fn array_argument(builtin: Builtin, arg: &Value) -> Result<&[Value], RuntimeError> {
    match arg {
        Value::Array(elements) => Ok(elements),
        other => Err(RuntimeError::BuiltinArgumentNotArray {
            builtin: builtin.name(),
            type_name: other.type_name(),
        }),
    }
}
