//! Opaque bearer tokens for API authentication.

use core::fmt;
use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`ApiToken`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token does not have the expected length.
    #[error("token must be {expected} characters")]
    InvalidLength {
        /// Expected number of characters.
        expected: usize,
    },
    /// The token contains something other than lowercase hex digits.
    #[error("token must be lowercase hexadecimal")]
    InvalidCharacter,
}

/// An API bearer token.
///
/// Tokens are 20 random bytes rendered as 40 lowercase hex characters.
/// `Debug` output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiToken(String);

impl ApiToken {
    /// Number of random bytes in a token.
    pub const BYTES: usize = 20;

    /// Length of the hex-encoded token.
    pub const LENGTH: usize = Self::BYTES * 2;

    /// Build a token from raw random bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::BYTES]) -> Self {
        let mut encoded = String::with_capacity(Self::LENGTH);
        for byte in bytes {
            // Writing to a String cannot fail.
            let _ = write!(encoded, "{byte:02x}");
        }
        Self(encoded)
    }

    /// Parse a token presented by a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 40 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, TokenError> {
        if s.len() != Self::LENGTH {
            return Err(TokenError::InvalidLength {
                expected: Self::LENGTH,
            });
        }

        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(TokenError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..4).unwrap_or_default();
        write!(f, "ApiToken({prefix}…)")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ApiToken {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApiToken> for String {
    fn from(token: ApiToken) -> Self {
        token.0
    }
}
