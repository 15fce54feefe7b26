//! Shared helpers for the wiremock-based integration tests.

use async_trait::async_trait;
use hubgate::{Result, Token, TokenSource};

/// Token source that hands out a fixed token without any network I/O.
pub struct StaticTokenSource {
    access_token: String,
}

impl StaticTokenSource {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<Token> {
        Ok(Token {
            access_token: self.access_token.clone(),
            claims: serde_json::json!({ "access_token": self.access_token }),
        })
    }
}
