//! Authentication token persistence.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Storage key the token lives under.
pub const TOKEN_KEY: &str = "JWT";

/// An opaque bearer token. Presence means "authenticated".
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token string. Blank strings are not tokens.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.len() == raw.len() {
            Some(Self(raw))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Reads and writes the token through a [`KeyValueStore`].
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The persisted token, if any.
    pub fn get_token(&self) -> Result<Option<Token>, StorageError> {
        Ok(self.storage.get(TOKEN_KEY)?.and_then(Token::new))
    }

    pub fn set_token(&self, token: &Token) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token.as_str())?;
        debug!("token stored");
        Ok(())
    }

    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)?;
        debug!("token cleared");
        Ok(())
    }

    /// `Bearer <token>` when a token is present.
    pub fn authorization(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get_token()?.map(|t| t.authorization()))
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
