//! Dynamic argument values handed to theory bodies.
//!
//! Rendering is failure-proof: a host object whose description fails renders
//! as [`RENDER_FAILED`] instead of aborting the report it is embedded in.

use std::any::Any;
use std::fmt::{self, Write as _};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::signature::ParamType;

/// Placeholder rendered when a value's description fails.
pub const RENDER_FAILED: &str = "[toString failed]";

/// A host object carried through an assignment as an opaque value.
///
/// `describe` may return `Err` to signal that no rendering is available.
pub trait Describe: Any + Send + Sync + fmt::Debug {
    /// Name of the host type, used for type compatibility.
    fn type_name(&self) -> &str;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn as_any(&self) -> &dyn Any;
}

/// A concrete candidate value bound to one parameter.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Enum { type_name: String, variant: String },
    Opaque(Arc<dyn Describe>),
}

impl Value {
    pub fn opaque<D: Describe>(object: D) -> Self {
        Value::Opaque(Arc::new(object))
    }

    pub fn variant(type_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Value::Enum {
            type_name: type_name.into(),
            variant: variant.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Downcast an opaque value to its host type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The type this value was declared with, as far as it can be inferred.
    ///
    /// `Null` and empty lists infer `Any`; enum variants infer an enum type
    /// without its variant list, which still matches by name.
    pub fn param_type(&self) -> ParamType {
        match self {
            Value::Null => ParamType::Any,
            Value::Bool(_) => ParamType::Bool,
            Value::Int(_) => ParamType::Int,
            Value::Float(_) => ParamType::Float,
            Value::Str(_) => ParamType::Str,
            Value::List(items) => ParamType::List(Box::new(
                items.first().map(Value::param_type).unwrap_or(ParamType::Any),
            )),
            Value::Enum { type_name, .. } => ParamType::Enum {
                name: type_name.clone(),
                variants: Vec::new(),
            },
            Value::Opaque(object) => ParamType::Named(object.type_name().to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (
                Value::Enum {
                    type_name: ta,
                    variant: va,
                },
                Value::Enum {
                    type_name: tb,
                    variant: vb,
                },
            ) => ta == tb && va == vb,
            // Host objects have no structural equality; identity it is.
            (Value::Opaque(a), Value::Opaque(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Enum { type_name, variant } => write!(f, "{type_name}::{variant}"),
            Value::Opaque(object) => object.describe(f),
        }
    }
}

/// Render a value for diagnostics. Never fails: a describe that errors or
/// panics yields [`RENDER_FAILED`].
pub fn render_value(value: &Value) -> String {
    let rendered = catch_unwind(AssertUnwindSafe(|| {
        let mut out = String::new();
        write!(out, "{value}").map(|()| out)
    }));
    match rendered {
        Ok(Ok(out)) => out,
        Ok(Err(_)) | Err(_) => RENDER_FAILED.to_string(),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
