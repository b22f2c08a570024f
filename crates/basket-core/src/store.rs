//! Persisted cart storage abstraction.
//!
//! The cart engine writes a full snapshot after every mutation and reads it
//! once when a session opens. Storage is best-effort durability across
//! sessions; the in-memory cart stays authoritative while a session is live.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Key addressing one shopping session's cart in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Longest key accepted by storage backends, in UTF-8 bytes.
    pub const MAX_LEN: usize = 128;

    /// Parses a session key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the key is blank or its UTF-8
    /// encoding is longer than [`SessionKey::MAX_LEN`] bytes.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation(
                "session key must not be empty".to_owned(),
            ));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(DomainError::Validation(format!(
                "session key exceeds {} bytes",
                Self::MAX_LEN
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialized state of one cart as held by a [`CartStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Identifier of the cart aggregate.
    pub cart_id: Uuid,
    /// Aggregate version at the time of the snapshot.
    pub version: i64,
    /// Serialized line items, in cart order.
    pub items: serde_json::Value,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

/// Key-value store for cart snapshots.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads the snapshot stored under `key`, if any.
    async fn load(&self, key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError>;

    /// Replaces the snapshot stored under `key`.
    async fn save(&self, key: &SessionKey, snapshot: &CartSnapshot) -> Result<(), DomainError>;

    /// Removes the snapshot stored under `key`. Removing a missing key is not
    /// an error.
    async fn delete(&self, key: &SessionKey) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_parse_trims_whitespace() {
        let key = SessionKey::parse("  pos-terminal-7 ").unwrap();

        assert_eq!(key.as_str(), "pos-terminal-7");
        assert_eq!(key.to_string(), "pos-terminal-7");
    }

    #[test]
    fn test_session_key_parse_rejects_blank() {
        let result = SessionKey::parse("   ");

        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("empty")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_session_key_parse_rejects_overlong_key() {
        let raw = "k".repeat(SessionKey::MAX_LEN + 1);

        assert!(matches!(
            SessionKey::parse(raw),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_session_key_limit_counts_utf8_bytes() {
        // 43 three-byte characters: 129 bytes.
        let raw = "\u{20ac}".repeat(43);

        match SessionKey::parse(raw) {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("128 bytes")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(SessionKey::parse("\u{20ac}".repeat(42)).is_ok());
    }

    #[test]
    fn test_session_key_serializes_as_plain_string() {
        let key = SessionKey::parse("web-42").unwrap();

        let json = serde_json::to_value(&key).unwrap();

        assert_eq!(json, serde_json::json!("web-42"));
    }
}
