//! Knowledge-base management catalog.

use std::sync::Arc;

use http::{HeaderName, HeaderValue, Method};
use serde_json::json;

use crate::client::GatewayClient;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::token::TokenSource;

/// Fixed path prefix for the knowledge-base service.
pub const PATH_PREFIX: &str = "/tpass/kmverse/outerapi/v1";

const BUSINESS_UNIT: &str = "Others";
const EMBEDDING_MODEL: &str = "bge-m3";

/// Catalog of knowledge-base operations: bases, folders, documents, chunks,
/// retrieval, and permission grants.
///
/// Requires the gateway API key, the service's `km-verse-key` header, and a
/// token source for the bearer header.
#[derive(Clone)]
pub struct KnowledgeBases {
    client: GatewayClient,
}

impl KnowledgeBases {
    /// Build the catalog. The path prefix is forced to [`PATH_PREFIX`] and
    /// the `km-verse-key` header is installed as a fixed gateway header.
    pub fn new(
        mut config: ClientConfig,
        km_verse_key: impl Into<String>,
        token_source: Arc<dyn TokenSource>,
    ) -> Result<Self> {
        config.path_prefix = PATH_PREFIX.to_string();

        let mut value: HeaderValue = km_verse_key
            .into()
            .parse()
            .map_err(|_| Error::InvalidHeaderValue("km-verse-key".into()))?;
        value.set_sensitive(true);
        config
            .extra_headers
            .insert(HeaderName::from_static("km-verse-key"), value);

        Ok(Self {
            client: GatewayClient::new(config, Some(token_source))?,
        })
    }

    /// Wrap an already configured client (prefix and headers included).
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

    // ---- knowledge bases ----

    /// Create a knowledge base.
    pub async fn create(
        &self,
        project_id: u64,
        name: &str,
        description: &str,
        owner: &str,
    ) -> Result<String> {
        let body = json!({
            "businessUnit": BUSINESS_UNIT,
            "description": description,
            "knowledgeBase": name,
            "model": EMBEDDING_MODEL,
            "owner": owner,
            "projectId": project_id,
        });
        self.client
            .send(Method::POST, "/collection", None, Some(&body))
            .await
    }

    /// Update a knowledge base's owner, name, and description.
    pub async fn update(
        &self,
        kb_id: u64,
        owner: &str,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let body = json!({
            "owner": owner,
            "knowledgeBase": name,
            "description": description,
        });
        self.client
            .send(
                Method::PUT,
                &format!("/knowledgeBase/{kb_id}/updateKnowledgeBaseInfo"),
                None,
                Some(&body),
            )
            .await
    }

    /// Delete a knowledge base.
    pub async fn delete(&self, kb_id: u64) -> Result<String> {
        self.client
            .send(Method::DELETE, &format!("/knowledgeBase/{kb_id}"), None, None)
            .await
    }

    /// Page through the knowledge bases visible to a user.
    pub async fn list(
        &self,
        project_id: u64,
        it_code: &str,
        page: u32,
        rows: u32,
        keyword: &str,
    ) -> Result<String> {
        let query = [
            ("itCode", it_code.to_string()),
            ("rows", rows.to_string()),
            ("page", page.to_string()),
            ("keyword", keyword.to_string()),
        ];
        self.client
            .send(
                Method::GET,
                &format!("/knowledgeBase/{project_id}/knowledgeBases"),
                Some(&query[..]),
                None,
            )
            .await
    }

    /// Page through the knowledge bases a user created.
    pub async fn created_by_user(
        &self,
        project_id: u64,
        it_code: &str,
        page: u32,
        rows: u32,
        keyword: &str,
    ) -> Result<String> {
        let query = [
            ("itCode", it_code.to_string()),
            ("page", page.to_string()),
            ("rows", rows.to_string()),
            ("keyword", keyword.to_string()),
        ];
        self.client
            .send(
                Method::GET,
                &format!("/knowledgeBase/{project_id}/userKnowledgeBases"),
                Some(&query[..]),
                None,
            )
            .await
    }

    /// Page through the knowledge bases shared with a user through direct
    /// permission grants.
    pub async fn shared_with_user(
        &self,
        project_id: u64,
        it_code: &str,
        page: u32,
        rows: u32,
        keyword: &str,
    ) -> Result<String> {
        let query = [
            ("itCode", it_code.to_string()),
            ("page", page.to_string()),
            ("rows", rows.to_string()),
            ("keyword", keyword.to_string()),
        ];
        self.client
            .send(
                Method::GET,
                &format!("/knowledgeBase/{project_id}/direct/permission/knowledgeBases"),
                Some(&query[..]),
                None,
            )
            .await
    }

    /// Whether a user has any permission on a knowledge base.
    pub async fn has_permission(&self, kb_id: u64, it_code: &str) -> Result<String> {
        let query = [("itCode", it_code.to_string())];
        self.client
            .send(
                Method::GET,
                &format!("/knowledgeBase/{kb_id}/hasPermission"),
                Some(&query[..]),
                None,
            )
            .await
    }

    /// List the users holding permissions on a knowledge base.
    pub async fn permission_users(&self, kb_id: u64) -> Result<String> {
        self.client
            .send(
                Method::GET,
                &format!("/knowledgeBase/{kb_id}/hasPermissionUsers"),
                None,
                None,
            )
            .await
    }

    /// Grant a user a permission on a knowledge base.
    pub async fn grant_permission(
        &self,
        project_id: u64,
        kb_id: u64,
        username: &str,
        permission_type: &str,
    ) -> Result<String> {
        let body = json!({
            "projectId": project_id,
            "knowledgeBaseId": kb_id,
            "username": username,
            "permissionType": permission_type,
        });
        self.client
            .send(
                Method::POST,
                "/knowledgeBase/permission/grant",
                None,
                Some(&body),
            )
            .await
    }

    /// Revoke a user's permission on a knowledge base.
    pub async fn revoke_permission(
        &self,
        project_id: u64,
        kb_id: u64,
        username: &str,
        permission_type: &str,
    ) -> Result<String> {
        let body = json!({
            "projectId": project_id,
            "knowledgeBaseId": kb_id,
            "username": username,
            "permissionType": permission_type,
        });
        self.client
            .send(
                Method::POST,
                "/knowledgeBase/permission/revoke",
                None,
                Some(&body),
            )
            .await
    }

    // ---- folders ----

    /// Create a folder under a knowledge base.
    pub async fn create_folder(
        &self,
        kb_id: u64,
        name: &str,
        parent_folder_id: u64,
    ) -> Result<String> {
        let body = json!({
            "knowledgeBaseId": kb_id,
            "folderName": name,
            "parentFolderId": parent_folder_id,
        });
        self.client
            .send(Method::POST, "/folder", None, Some(&body))
            .await
    }

    /// Delete a folder.
    pub async fn delete_folder(&self, folder_id: u64) -> Result<String> {
        self.client
            .send(Method::DELETE, &format!("/folder/{folder_id}"), None, None)
            .await
    }

    /// Rename a folder.
    pub async fn rename_folder(&self, kb_id: u64, folder_id: u64, name: &str) -> Result<String> {
        let body = json!({ "folderName": name });
        self.client
            .send(
                Method::PUT,
                &format!("/folder/{kb_id}/{folder_id}/rename"),
                None,
                Some(&body),
            )
            .await
    }

    /// Get the folder tree of a knowledge base.
    pub async fn folders(&self, kb_id: u64) -> Result<String> {
        self.client
            .send(Method::GET, &format!("/folder/{kb_id}/getFolder"), None, None)
            .await
    }

    /// Move a document under another parent.
    pub async fn move_document(&self, doc_id: &str, parent_doc_id: &str) -> Result<String> {
        let body = json!({
            "docId": [doc_id],
            "parentDocId": parent_doc_id,
        });
        self.client
            .send(Method::POST, "/folder/move", None, Some(&body))
            .await
    }

    // ---- documents ----

    /// Page through the documents of a knowledge base.
    pub async fn documents(
        &self,
        kb_id: u64,
        page: u32,
        rows: u32,
        keyword: &str,
        parent_doc_id: &str,
    ) -> Result<String> {
        let query = [
            ("page", page.to_string()),
            ("rows", rows.to_string()),
            ("keyword", keyword.to_string()),
            ("parentDocId", parent_doc_id.to_string()),
        ];
        self.client
            .send(
                Method::GET,
                &format!("/knowledgeBase/{kb_id}/documents"),
                Some(&query[..]),
                None,
            )
            .await
    }

    /// Update a document's tag.
    pub async fn update_document_tag(&self, doc_id: &str, tag: &str) -> Result<String> {
        let body = json!({ "docId": doc_id, "tag": tag });
        self.client
            .send(Method::PUT, "/document/tag", None, Some(&body))
            .await
    }

    /// Delete several documents at once.
    pub async fn batch_delete_documents(&self, doc_ids: &[&str]) -> Result<String> {
        self.client
            .send(Method::DELETE, "/document/batch", None, Some(&doc_ids))
            .await
    }

    /// Page through a document's chunks.
    pub async fn page_chunks(&self, doc_id: &str, page: u32, page_size: u32) -> Result<String> {
        let query = [
            ("docId", doc_id.to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        self.client
            .send(Method::GET, "/document/pageChunks", Some(&query[..]), None)
            .await
    }

    // ---- chunks ----

    /// Append a chunk to a document.
    pub async fn add_chunk(&self, doc_id: &str, chunk_id: &str, text: &str) -> Result<String> {
        let body = json!({
            "docId": doc_id,
            "chunkId": chunk_id,
            "chunkText": text,
        });
        self.client
            .send(Method::POST, "/document/chunk/add", None, Some(&body))
            .await
    }

    /// Replace a chunk's text.
    pub async fn update_chunk(&self, doc_id: &str, chunk_id: &str, text: &str) -> Result<String> {
        let body = json!({
            "docId": doc_id,
            "chunkId": chunk_id,
            "chunkText": text,
        });
        self.client
            .send(Method::PUT, "/document/chunk/update", None, Some(&body))
            .await
    }

    /// Delete a chunk from a document.
    pub async fn delete_chunk(&self, doc_id: &str, chunk_id: &str) -> Result<String> {
        let body = json!({ "docId": doc_id, "chunkId": chunk_id });
        self.client
            .send(Method::DELETE, "/document/chunk/delete", None, Some(&body))
            .await
    }

    // ---- retrieval and knowledge lifecycle ----

    /// Keyword retrieval across one knowledge base.
    pub async fn retrieve(&self, project_id: u64, kb_id: u64, query: &str) -> Result<String> {
        let body = json!({
            "projectId": project_id,
            "relation": [{
                "knowledgeBaseId": kb_id,
                "docIds": [],
                "filter": "",
                "embedding": "",
            }],
            "query": query,
            "indexMode": "keyword",
            "similarityTopK": 3,
            "score": 4,
        });
        self.client
            .send(Method::POST, "/knowledge/retrieval", None, Some(&body))
            .await
    }

    /// Delete an ingested knowledge entry.
    pub async fn delete_knowledge(&self, knowledge_id: u64) -> Result<String> {
        self.client
            .send(
                Method::DELETE,
                &format!("/knowledge/delete/{knowledge_id}"),
                None,
                None,
            )
            .await
    }

    // ---- async task statuses ----

    /// Status of a tag-update task.
    pub async fn tag_update_status(&self, task_id: &str) -> Result<String> {
        let query = [("taskId", task_id.to_string())];
        self.client
            .send(Method::GET, "/task/updateTag/status", Some(&query[..]), None)
            .await
    }

    /// Status of a chunk-upload task.
    pub async fn chunk_upload_status(&self, task_id: &str) -> Result<String> {
        let query = [("taskId", task_id.to_string())];
        self.client
            .send(Method::GET, "/task/docChunk/status", Some(&query[..]), None)
            .await
    }

    /// Status of a document-deletion task.
    pub async fn document_delete_status(&self, task_id: &str) -> Result<String> {
        let query = [("taskId", task_id.to_string())];
        self.client
            .send(Method::GET, "/task/docDelete/status", Some(&query[..]), None)
            .await
    }
}
