use shared::{Error, Result};
use std::fmt;

/// A scalar cache key. Strings, integers, floats and booleans are the only
/// admissible key shapes; composite keys are unrepresentable by construction.
/// The backing store only ever sees the canonical string form.
#[derive(Clone, Debug, PartialEq)]
pub enum CacheKey {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CacheKey {
    /// Canonical string form used as the document identity field.
    ///
    /// Fails with `InvalidKey` when the canonical form is empty or uses
    /// characters reserved by the store's query syntax: a leading `$`
    /// (operator prefix) or an embedded NUL. Validation always runs before
    /// any I/O is attempted.
    pub fn canonical(&self) -> Result<String> {
        let canonical = match self {
            CacheKey::Str(s) => s.clone(),
            CacheKey::Int(n) => n.to_string(),
            CacheKey::Float(f) => f.to_string(),
            CacheKey::Bool(b) => b.to_string(),
        };

        if canonical.is_empty() {
            return Err(Error::InvalidKey("key must not be empty".to_string()));
        }
        if canonical.starts_with('$') {
            return Err(Error::InvalidKey(format!(
                "key '{}' starts with reserved character '$'",
                canonical
            )));
        }
        if canonical.contains('\0') {
            return Err(Error::InvalidKey(
                "key must not contain NUL".to_string(),
            ));
        }

        Ok(canonical)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        CacheKey::Str(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        CacheKey::Str(s)
    }
}

impl From<i64> for CacheKey {
    fn from(n: i64) -> Self {
        CacheKey::Int(n)
    }
}

impl From<f64> for CacheKey {
    fn from(f: f64) -> Self {
        CacheKey::Float(f)
    }
}

impl From<bool> for CacheKey {
    fn from(b: bool) -> Self {
        CacheKey::Bool(b)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Str(s) => write!(f, "{}", s),
            CacheKey::Int(n) => write!(f, "{}", n),
            CacheKey::Float(x) => write!(f, "{}", x),
            CacheKey::Bool(b) => write!(f, "{}", b),
        }
    }
}
