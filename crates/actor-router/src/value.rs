//! # Message Payloads
//!
//! Arguments travel through the router as a list of [`Value`]s, a small tagged union.
//! Handlers that want static types declare a payload type at registration time
//! (see [`Handlers::on`](crate::handler::Handlers::on)); the arguments are decoded through
//! [`FromArgs`] right before the handler runs.
//!
//! ```rust
//! use actor_router::{args, FromArgs, Value};
//!
//! let args = args!["alice", 42];
//! let (name, level): (String, i64) = FromArgs::from_args(&args).unwrap();
//! assert_eq!(name, "alice");
//! assert_eq!(level, 42);
//! assert_eq!(args[1], Value::Int(42));
//! ```

use crate::error::HandlerError;
use serde::{Deserialize, Serialize};

/// A single message argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// Name of the variant, used in decoding errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// Builds an argument list from heterogeneous values.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

/// Types that can be read out of a single [`Value`].
pub trait FromValue: Sized {
    /// Variant name reported when decoding fails.
    const KIND: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const KIND: &'static str = "any";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const KIND: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const KIND: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for i32 {
    const KIND: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for f64 {
    const KIND: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    const KIND: &'static str = "str";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for Vec<u8> {
    const KIND: &'static str = "bytes";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => Some(b.clone()),
            _ => None,
        }
    }
}

/// Decodes a whole argument list into a handler payload.
///
/// Implemented for the raw `Vec<Value>`, for `()` (arguments ignored) and for tuples of up to
/// four [`FromValue`] types, which require an exact argument count.
pub trait FromArgs: Sized {
    fn from_args(args: &[Value]) -> Result<Self, HandlerError>;
}

impl FromArgs for Vec<Value> {
    fn from_args(args: &[Value]) -> Result<Self, HandlerError> {
        Ok(args.to_vec())
    }
}

impl FromArgs for () {
    fn from_args(_: &[Value]) -> Result<Self, HandlerError> {
        Ok(())
    }
}

fn arg<T: FromValue>(args: &[Value], index: usize) -> Result<T, HandlerError> {
    let value = &args[index];
    T::from_value(value).ok_or(HandlerError::ArgumentType {
        index,
        expected: T::KIND,
        found: value.kind(),
    })
}

macro_rules! tuple_from_args {
    ($len:expr => $($idx:tt $name:ident),+) => {
        impl<$($name: FromValue),+> FromArgs for ($($name,)+) {
            fn from_args(args: &[Value]) -> Result<Self, HandlerError> {
                if args.len() != $len {
                    return Err(HandlerError::Arity {
                        expected: $len,
                        found: args.len(),
                    });
                }
                Ok(($(arg::<$name>(args, $idx)?,)+))
            }
        }
    };
}

tuple_from_args!(1 => 0 A);
tuple_from_args!(2 => 0 A, 1 B);
tuple_from_args!(3 => 0 A, 1 B, 2 C);
tuple_from_args!(4 => 0 A, 1 B, 2 C, 3 D);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_macro_converts_each_element() {
        let args = args!["x", 7, true, 1.5];
        assert_eq!(
            args,
            vec![
                Value::Str("x".into()),
                Value::Int(7),
                Value::Bool(true),
                Value::Float(1.5)
            ]
        );
        assert!(args![].is_empty());
    }

    #[test]
    fn test_tuple_decoding_checks_arity() {
        let err = <(String, i64)>::from_args(&args!["only one"]).unwrap_err();
        assert!(matches!(err, HandlerError::Arity { expected: 2, found: 1 }));
    }

    #[test]
    fn test_tuple_decoding_reports_wrong_kind() {
        let err = <(String, i64)>::from_args(&args!["name", "not a number"]).unwrap_err();
        match err {
            HandlerError::ArgumentType {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 1);
                assert_eq!(expected, "int");
                assert_eq!(found, "str");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_i32_rejects_out_of_range() {
        assert_eq!(i32::from_value(&Value::Int(i64::MAX)), None);
        assert_eq!(i32::from_value(&Value::Int(-3)), Some(-3));
    }

    #[test]
    fn test_unit_payload_ignores_arguments() {
        assert!(<()>::from_args(&args![1, 2, 3]).is_ok());
    }
}
