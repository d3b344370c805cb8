pub mod error;

pub use error::{LongformError, Result};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for report session IDs
///
/// Prevents accidental mixing of session IDs with other string types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random ID for a new session
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_generate_is_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(SessionId::from("abc".to_string()), id);
    }
}
