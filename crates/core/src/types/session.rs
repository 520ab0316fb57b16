//! Client-generated session identifier.
//!
//! The identifier correlates a browsing session's cart across requests. It is
//! created once per client process, never persisted, and carries no
//! authentication. Generation lives in the storefront crate; this module only
//! defines the format.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SessionId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("session id cannot be empty")]
    Empty,
    /// The identifier is embedded in URL paths, so only URL-safe characters
    /// are accepted.
    #[error("session id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// An opaque session identifier such as `session_k3j9x0a1b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Prefix of generated identifiers.
    pub const PREFIX: &'static str = "session_";
    /// Number of random characters after the prefix.
    pub const SUFFIX_LEN: usize = 9;
    /// Characters used for the random suffix (lowercase base 36).
    pub const ALPHABET: &'static [u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    /// Parse an existing identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains characters other
    /// than ASCII alphanumerics, `_`, and `-`.
    pub fn parse(s: &str) -> Result<Self, SessionIdError> {
        if s.is_empty() {
            return Err(SessionIdError::Empty);
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(SessionIdError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Build an identifier from positions in [`Self::ALPHABET`].
    ///
    /// Positions wrap modulo the alphabet length, so any source of random
    /// numbers can drive generation.
    #[must_use]
    pub fn from_alphabet_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut id = String::from(Self::PREFIX);
        id.extend(indices.into_iter().map(|i| {
            let pos = i % Self::ALPHABET.len();
            Self::ALPHABET.get(pos).map_or('0', |b| char::from(*b))
        }));
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_alphabet_indices_wraps() {
        let id = SessionId::from_alphabet_indices([0, 10, 35, 36]);
        assert_eq!(id.as_str(), "session_0az0");
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert!(SessionId::parse("session_abc").is_ok());
        assert_eq!(
            SessionId::parse("a/b"),
            Err(SessionIdError::InvalidCharacter('/'))
        );
        assert_eq!(SessionId::parse(""), Err(SessionIdError::Empty));
    }
}
