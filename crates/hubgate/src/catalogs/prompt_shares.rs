//! Prompt-sharing catalog.
//!
//! The prompt-share service sits behind the same gateway but is deployed
//! without token auth; the client is simply configured with no token source
//! and no API key.

use http::Method;
use serde::Serialize;
use serde_json::json;

use crate::client::GatewayClient;
use crate::config::ClientConfig;
use crate::error::Result;

/// Fixed path prefix for the prompt-share service.
pub const PATH_PREFIX: &str = "/api/myai/v1/personal-instruction/share";

/// Channel identifier the service expects on every request.
pub const DEFAULT_CHANNEL: &str = "LeAI";

/// Catalog of prompt-sharing operations: listing, batch share, batch delete.
#[derive(Clone)]
pub struct PromptShares {
    client: GatewayClient,
    channel: String,
}

/// A share participant, derived from an email address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Participant {
    it_code: String,
    display_name: String,
    email: String,
}

impl Participant {
    /// Addresses without an `@` are not valid participants.
    fn from_email(email: &str) -> Option<Self> {
        let (it_code, _domain) = email.split_once('@')?;
        Some(Self {
            it_code: it_code.to_string(),
            display_name: it_code.to_string(),
            email: email.to_string(),
        })
    }
}

impl PromptShares {
    /// Build the catalog with the default channel; the path prefix is forced
    /// to [`PATH_PREFIX`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_channel(config, DEFAULT_CHANNEL)
    }

    /// Build the catalog for a specific channel.
    pub fn with_channel(mut config: ClientConfig, channel: impl Into<String>) -> Result<Self> {
        config.path_prefix = PATH_PREFIX.to_string();
        Ok(Self {
            client: GatewayClient::new(config, None)?,
            channel: channel.into(),
        })
    }

    /// The underlying client.
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// Release the pooled transport.
    pub fn close(&self) {
        self.client.close();
    }

    /// List the prompts a user owns, in a given language.
    pub async fn list(&self, it_code: &str, language: &str) -> Result<String> {
        let body = json!({
            "itCode": it_code,
            "channel": self.channel,
            "language": language,
        });
        self.client
            .send(Method::POST, "/list", None, Some(&body))
            .await
    }

    /// Share a batch of prompts from one user to several recipients.
    ///
    /// Recipient addresses without an `@` are skipped, matching the
    /// service's own validation.
    pub async fn share(
        &self,
        from_email: &str,
        to_emails: &[&str],
        prompt_ids: &[i64],
        message: Option<&str>,
    ) -> Result<String> {
        let share_from = Participant::from_email(from_email);
        let share_to: Vec<Participant> = to_emails
            .iter()
            .filter_map(|email| Participant::from_email(email))
            .collect();
        let prompts: Vec<serde_json::Value> = prompt_ids
            .iter()
            .map(|id| json!({ "personalInstructionId": id }))
            .collect();

        let body = json!({
            "itCode": share_from.as_ref().map(|p| p.it_code.clone()),
            "channel": self.channel,
            "shareFrom": share_from,
            "shareTo": share_to,
            "sharePromptList": prompts,
            "shareMessage": message,
        });
        self.client
            .send(Method::POST, "/batch/share/execute", None, Some(&body))
            .await
    }

    /// Delete a batch of shared prompts.
    pub async fn delete(&self, it_code: &str, language: &str, ids: &[i64]) -> Result<String> {
        let body = json!({
            "itCode": it_code,
            "channel": self.channel,
            "language": language,
            "ids": ids,
        });
        self.client
            .send(Method::POST, "/batch/share/delete", None, Some(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_derived_from_email() {
        let participant = Participant::from_email("kmadmin@example.com").unwrap();
        assert_eq!(participant.it_code, "kmadmin");
        assert_eq!(participant.email, "kmadmin@example.com");

        assert!(Participant::from_email("not-an-address").is_none());
    }

    #[test]
    fn participant_serializes_camel_case() {
        let participant = Participant::from_email("kmadmin@example.com").unwrap();
        let value = serde_json::to_value(&participant).unwrap();
        assert_eq!(value["itCode"], "kmadmin");
        assert_eq!(value["displayName"], "kmadmin");
        assert_eq!(value["email"], "kmadmin@example.com");
    }
}
