//! Personal knowledge-base Q&A catalog.

use std::sync::Arc;

use http::Method;
use serde_json::json;

use crate::client::GatewayClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::token::TokenSource;

/// Fixed path prefix for the personal knowledge-base service.
pub const PATH_PREFIX: &str = "/kb/api/myai/v1/knowledge-base/personalkb";

// The list endpoint is not paged by callers; the service expects one full
// page of up to 200 entries.
const LIST_PAGE_NO: u32 = 1;
const LIST_PAGE_SIZE: u32 = 200;

/// Catalog of personal knowledge-base operations: listing, permission
/// checks, session binding, and retrieval.
#[derive(Clone)]
pub struct PersonalKnowledgeBases {
    client: GatewayClient,
}

impl PersonalKnowledgeBases {
    /// Build the catalog; the path prefix is forced to [`PATH_PREFIX`].
    pub fn new(mut config: ClientConfig, token_source: Arc<dyn TokenSource>) -> Result<Self> {
        config.path_prefix = PATH_PREFIX.to_string();
        Ok(Self {
            client: GatewayClient::new(config, Some(token_source))?,
        })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: GatewayClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// Release the pooled transport.
    pub fn close(&self) {
        self.client.close();
    }

    /// List every knowledge base the user can access through a channel.
    pub async fn list(&self, it_code: &str, channel: &str) -> Result<String> {
        let body = json!({
            "itCode": it_code,
            "channel": channel,
            "pageNo": LIST_PAGE_NO,
            "pageSize": LIST_PAGE_SIZE,
        });
        self.client
            .send(Method::POST, "/qa/knowledgeBase/list", None, Some(&body))
            .await
    }

    /// Whether the user may access a knowledge base.
    pub async fn has_permission(&self, it_code: &str, channel: &str, kb_id: u64) -> Result<String> {
        let body = json!({
            "itCode": it_code,
            "channel": channel,
            "kbId": kb_id,
        });
        self.client
            .send(
                Method::POST,
                "/qa/knowledgeBaseId/hasPermission",
                None,
                Some(&body),
            )
            .await
    }

    /// Check which knowledge base, if any, a session is bound to.
    pub async fn bind_status(&self, session_id: &str) -> Result<String> {
        let body = json!({ "sessionId": session_id });
        self.client
            .send(
                Method::POST,
                "/qa/knowledgeBaseId/bind/check",
                None,
                Some(&body),
            )
            .await
    }

    /// Bind a session to a knowledge base.
    pub async fn bind(
        &self,
        it_code: &str,
        channel: &str,
        session_id: &str,
        kb_id: u64,
    ) -> Result<String> {
        let body = json!({
            "itCode": it_code,
            "channel": channel,
            "sessionId": session_id,
            "kbId": kb_id,
        });
        self.client
            .send(Method::POST, "/qa/knowledgeBaseId/bind", None, Some(&body))
            .await
    }

    /// Unbind a session from a knowledge base.
    pub async fn unbind(
        &self,
        it_code: &str,
        channel: &str,
        session_id: &str,
        kb_id: u64,
    ) -> Result<String> {
        let body = json!({
            "itCode": it_code,
            "channel": channel,
            "sessionId": session_id,
            "kbId": kb_id,
        });
        self.client
            .send(Method::POST, "/qa/knowledgeBaseId/unbind", None, Some(&body))
            .await
    }

    /// Retrieve from a knowledge base on behalf of the user.
    pub async fn retrieve(
        &self,
        it_code: &str,
        channel: &str,
        kb_id: u64,
        query: &str,
    ) -> Result<String> {
        let body = json!({
            "query": query,
            "knowledgeBaseId": kb_id,
            "similarityTopK": 3,
            "itCode": it_code,
            "channel": channel,
        });
        self.client
            .send(
                Method::POST,
                "/qa/knowledgeBase/retrieval",
                None,
                Some(&body),
            )
            .await
    }
}
