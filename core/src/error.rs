use std::fmt;

use crate::typ::Type;

/// Recoverable failures of the call layer.
///
/// Programmer errors (rebinding to another type, calling with an empty slot, statting a
/// value that is not a function) panic instead; they are never reported through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// `Methods::named` found no method with this name.
    NotFound { name: String },
    /// A write through a handle used a value of the wrong type.
    HandleType { expected: Type, found: Type },
    /// Configuration input could not be parsed.
    Config(String),
}

impl CallError {
    pub fn not_found(name: impl Into<String>) -> Self {
        CallError::NotFound { name: name.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CallError::NotFound { .. })
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::NotFound { name } => write!(f, "not found: method '{}'", name),
            CallError::HandleType { expected, found } => {
                write!(f, "handle expects a value of type {}, got {}", expected, found)
            }
            CallError::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for CallError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_method() {
        let err = CallError::not_found("Missing");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: method 'Missing'");
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = CallError::Config("bad".into()).into();
        assert!(err.downcast_ref::<CallError>().is_some());
        assert_eq!(err.to_string(), "invalid configuration: bad");
    }
}
