use std::fmt;

use subtle::ConstantTimeEq;

/// Shared secret embedded in moderation links.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityHash(String);

impl SecurityHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecurityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurityHash(***)")
    }
}

/// Checks hashes supplied on approve/disapprove links against the configured secret.
#[derive(Debug, Clone)]
pub struct SecurityHashValidator {
    secret: SecurityHash,
}

impl SecurityHashValidator {
    pub fn new(secret: SecurityHash) -> Self {
        Self { secret }
    }

    pub fn is_valid(&self, supplied: &str) -> bool {
        let expected = self.secret.expose().as_bytes();
        if supplied.is_empty() || expected.is_empty() {
            return false;
        }
        supplied.as_bytes().ct_eq(expected).into()
    }
}
