// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity and the session-start entry contract.

use serde::{Deserialize, Serialize};

/// Opaque session identifier.
///
/// Wraps a `String` to distinguish session ids from other string fields at
/// the type level. Generated ids use UUID v4.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a `SessionId` from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh random session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Consume the newtype, returning the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::ops::Deref for SessionId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The session-start entry contract handed to the gate by the hosting hook
/// or CLI.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRequest {
    /// The user's opening request text.
    #[serde(alias = "user_request")]
    pub prompt: String,
    pub session_id: SessionId,
    #[serde(default)]
    pub is_first_message: bool,
    /// Set by hosts that dispatch explicit commands themselves; slash
    /// prefixes in `prompt` are detected independently of this flag.
    #[serde(default)]
    pub is_explicit_command: bool,
}

impl SessionRequest {
    /// A first-message request with a generated session id.
    pub fn first(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            session_id: SessionId::generate(),
            is_first_message: true,
            is_explicit_command: false,
        }
    }
}
