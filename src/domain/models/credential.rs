use serde::{Deserialize, Serialize};

/// Value object representing a hashed password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Create a new HashedPassword from an already hashed string
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Get the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext credential, alive only while the registration request is in
/// flight. Never serialized, never logged; `Debug` is redacted.
#[derive(Clone)]
pub struct PlainPassword(String);

impl PlainPassword {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlainPassword(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_password_debug_is_redacted() {
        let password = PlainPassword::new("P@ssw0rd1".to_string());
        let rendered = format!("{:?}", password);
        assert!(!rendered.contains("P@ssw0rd1"));
    }
}
