use std::fmt;

use serde::{Deserialize, Serialize};

/// Portal-side identifier of the signed-in citizen or operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated session handed to the gateway explicitly; nothing looks it up ambiently.
///
/// Token issuance and renewal belong to the portal's auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    token: String,
}

impl Session {
    pub fn new(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn bearer_token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_token() {
        let session = Session::new(UserId("u-17".to_string()), "secret-token");
        let rendered = format!("{session:?}");
        assert!(rendered.contains("u-17"));
        assert!(!rendered.contains("secret-token"));
    }
}
