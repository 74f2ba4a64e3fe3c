//! Values produced and consumed by the expression evaluator.

use std::fmt;
use std::sync::Arc;

/// An object the evaluator can read members from and call methods on.
///
/// This is the only view the console has of the embedding application's
/// objects. Implementations use interior mutability if a method mutates.
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::{EvalTarget, Value};
///
/// struct Player { health: i64 }
///
/// impl EvalTarget for Player {
///     fn type_name(&self) -> &str { "Player" }
///
///     fn get(&self, name: &str) -> Option<Value> {
///         match name {
///             "health" => Some(Value::Int(self.health)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait EvalTarget: Send + Sync {
    /// Name shown when the object is printed or in error messages.
    fn type_name(&self) -> &str {
        "Object"
    }

    /// Look up a property. `None` means no such member.
    fn get(&self, name: &str) -> Option<Value>;

    /// Whether `name` is a callable method.
    fn has_method(&self, _name: &str) -> bool {
        false
    }

    /// Call a method, returning its result or an error message.
    fn call(&self, method: &str, _args: &[Value]) -> Result<Value, String> {
        Err(format!("{} has no method '{}'", self.type_name(), method))
    }
}

/// Shared reference to a live object.
pub type ObjectRef = Arc<dyn EvalTarget>;

/// A dynamically typed evaluator value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(obj) => obj.type_name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Numeric view of the value, widening ints.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Value::Str(s) => write!(f, "{s:?}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "]")
            }
            Value::Object(obj) => write!(f, "<{}>", obj.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(&obj.type_name()).finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    impl EvalTarget for Dummy {
        fn get(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Nil.to_string(), "null");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(
            Value::Array(vec![1.into(), "a".into()]).to_string(),
            r#"[1, "a"]"#
        );
        let obj: ObjectRef = Arc::new(Dummy);
        assert_eq!(Value::Object(obj).to_string(), "<Object>");
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::Str("2".into()));
    }

    #[test]
    fn test_object_identity() {
        let a: ObjectRef = Arc::new(Dummy);
        let b: ObjectRef = Arc::new(Dummy);
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(!Value::Array(Vec::new()).is_truthy());
    }
}
