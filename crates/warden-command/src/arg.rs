//! Positional command arguments and their declared kinds.

use serde_json::Value;
use warden_auth::Subject;

/// The declared kind of a positional argument.
///
/// | Kind | Accepts |
/// |------|---------|
/// | `Bool` | JSON boolean |
/// | `Integer` | JSON number with no fractional part |
/// | `Float` | any JSON number |
/// | `String` | JSON string |
/// | `Array` | JSON array |
/// | `Object` | JSON object |
/// | `Any` | any JSON value (not a subject) |
/// | `Subject` | an agent or role |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Boolean.
    Bool,
    /// Integral number.
    Integer,
    /// Any number.
    Float,
    /// Text.
    String,
    /// List.
    Array,
    /// Map.
    Object,
    /// Any JSON value.
    Any,
    /// An agent or role.
    Subject,
}

impl ArgKind {
    /// Returns `true` if `arg` satisfies this kind.
    #[must_use]
    pub fn accepts(self, arg: &Arg) -> bool {
        let Arg::Value(value) = arg else {
            return self == Self::Subject;
        };
        match self {
            Self::Bool => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
            Self::Subject => false,
        }
    }

    /// Returns the kind name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
            Self::Subject => "subject",
        }
    }
}

impl std::fmt::Display for ArgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positional argument: a JSON value or a subject.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Scalar or structured data.
    Value(Value),
    /// An agent or role.
    Subject(Subject),
}

impl Arg {
    /// Describes what this argument actually is, for error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Subject(_) => "subject",
            Self::Value(Value::Null) => "null",
            Self::Value(Value::Bool(_)) => "bool",
            Self::Value(Value::Number(n)) if n.is_f64() => "float",
            Self::Value(Value::Number(_)) => "integer",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Array(_)) => "array",
            Self::Value(Value::Object(_)) => "object",
        }
    }

    /// Returns the JSON value, if this is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Subject(_) => None,
        }
    }

    /// Returns the string, if this is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Returns the subject, if this is one.
    #[must_use]
    pub fn as_subject(&self) -> Option<&Subject> {
        match self {
            Self::Subject(subject) => Some(subject),
            Self::Value(_) => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<Subject> for Arg {
    fn from(value: Subject) -> Self {
        Self::Subject(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use warden_auth::Agent;

    #[test]
    fn scalar_kinds() {
        assert!(ArgKind::Bool.accepts(&Arg::from(true)));
        assert!(ArgKind::Integer.accepts(&Arg::from(7)));
        assert!(!ArgKind::Integer.accepts(&Arg::from(json!(1.5))));
        assert!(ArgKind::Float.accepts(&Arg::from(json!(1.5))));
        assert!(ArgKind::Float.accepts(&Arg::from(3)));
        assert!(ArgKind::String.accepts(&Arg::from("x")));
        assert!(!ArgKind::String.accepts(&Arg::from(1)));
        assert!(ArgKind::Array.accepts(&Arg::from(json!([]))));
        assert!(ArgKind::Object.accepts(&Arg::from(json!({}))));
    }

    #[test]
    fn subject_kind_is_exclusive() {
        let subject = Arg::from(Subject::from(Arc::new(Agent::system())));
        assert!(ArgKind::Subject.accepts(&subject));
        assert!(!ArgKind::Any.accepts(&subject));
        assert!(!ArgKind::Subject.accepts(&Arg::from("system")));
        assert!(ArgKind::Any.accepts(&Arg::from(json!(null))));
    }

    #[test]
    fn describe_reports_actual_kind() {
        assert_eq!(Arg::from(json!(null)).describe(), "null");
        assert_eq!(Arg::from(json!(2.5)).describe(), "float");
        assert_eq!(Arg::from(2).describe(), "integer");
        assert_eq!(
            Arg::from(Subject::from(Arc::new(Agent::guest()))).describe(),
            "subject"
        );
    }

    #[test]
    fn accessors() {
        let arg = Arg::from("hello");
        assert_eq!(arg.as_str(), Some("hello"));
        assert!(arg.as_subject().is_none());
        assert!(Arg::from(1).as_str().is_none());
    }
}
