//! HTTP client for the chat store service
//!
//! One method per endpoint, exact paths as the service exposes them. The
//! client is cheap to clone (the underlying connection pool is shared), so
//! persistence jobs can carry their own handle.

use crate::config::StoreConfig;
use crate::error::{GeniexError, Result};
use crate::session::{ChatMessage, ChatSession, ChatSummary};
use crate::store::types::{
    FolderRequest, RenameRequest, ReplyRequest, ReplyResponse, SaveChatRequest, SaveChatResponse,
    SessionRecord, SummaryRecord,
};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// Client for the chat store service
///
/// Covers both persistence endpoints and the reply-generation endpoint,
/// which the service hosts on the same base URL. When a bearer token is
/// configured every request carries an `Authorization: Bearer` header.
///
/// # Examples
///
/// ```no_run
/// use geniex::config::StoreConfig;
/// use geniex::store::ChatStoreClient;
///
/// # async fn example() -> geniex::error::Result<()> {
/// let config = StoreConfig {
///     base_url: "http://localhost:5000".to_string(),
///     ..Default::default()
/// };
/// let store = ChatStoreClient::new(&config)?;
/// let summaries = store.get_summaries("user-1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChatStoreClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl ChatStoreClient {
    /// Creates a new store client from configuration
    ///
    /// # Errors
    ///
    /// Returns `GeniexError::Store` if HTTP client initialization fails
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("geniex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeniexError::Store(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized chat store client: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /chat` — generate an assistant reply over the full history
    pub async fn generate_reply(
        &self,
        user_id: &str,
        messages: &[ChatMessage],
        language: &str,
    ) -> Result<String> {
        let body = ReplyRequest {
            user_id,
            messages,
            language,
        };
        let response = self
            .authorize(self.client.post(format!("{}/chat", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(|e| GeniexError::Reply(e.to_string()))?;
        let response = Self::check(response, "chat")
            .await
            .map_err(|e| GeniexError::Reply(e.to_string()))?;

        let reply: ReplyResponse = response
            .json()
            .await
            .map_err(|e| GeniexError::Reply(format!("Malformed reply body: {}", e)))?;
        Ok(reply.response)
    }

    /// `POST /save-chat` — create a session, returning the assigned id
    pub async fn create_chat(&self, session: &ChatSession) -> Result<String> {
        let body = SaveChatRequest {
            user_id: &session.owner_id,
            messages: &session.messages,
            timestamp: session.timestamp,
            folder: &session.folder,
            chat_id: None,
        };
        let response = self
            .authorize(self.client.post(format!("{}/save-chat", self.base_url)))
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response, "save-chat").await?;

        let saved: SaveChatResponse = response
            .json()
            .await
            .map_err(|e| GeniexError::Store(format!("Malformed save-chat body: {}", e)))?;
        Ok(saved.chat_id)
    }

    /// `PUT /update-chat/:id` — overwrite a session's stored history
    pub async fn update_chat(&self, id: &str, session: &ChatSession) -> Result<()> {
        let body = SaveChatRequest {
            user_id: &session.owner_id,
            messages: &session.messages,
            timestamp: session.timestamp,
            folder: &session.folder,
            chat_id: Some(id),
        };
        let response = self
            .authorize(
                self.client
                    .put(format!("{}/update-chat/{}", self.base_url, id)),
            )
            .json(&body)
            .send()
            .await?;
        Self::check(response, "update-chat").await?;
        Ok(())
    }

    /// `GET /get-chat/:id` — fetch one full session
    pub async fn get_chat(&self, id: &str) -> Result<ChatSession> {
        let response = self
            .authorize(self.client.get(format!("{}/get-chat/{}", self.base_url, id)))
            .send()
            .await?;
        let response = Self::check(response, "get-chat").await?;

        let record: SessionRecord = response
            .json()
            .await
            .map_err(|e| GeniexError::Store(format!("Malformed get-chat body: {}", e)))?;
        Ok(record.into())
    }

    /// `GET /get-chats/:userId` — fetch every full session of a user
    pub async fn get_chats(&self, user_id: &str) -> Result<Vec<ChatSession>> {
        let response = self
            .authorize(
                self.client
                    .get(format!("{}/get-chats/{}", self.base_url, user_id)),
            )
            .send()
            .await?;
        let response = Self::check(response, "get-chats").await?;

        let records: Vec<SessionRecord> = response
            .json()
            .await
            .map_err(|e| GeniexError::Store(format!("Malformed get-chats body: {}", e)))?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// `GET /get-chat-summaries/:userId` — fetch listing projections
    ///
    /// The raw response may contain duplicate ids; deduplication is the
    /// synchronizer's job so the client reports what the store said.
    pub async fn get_summaries(&self, user_id: &str) -> Result<Vec<ChatSummary>> {
        let response = self
            .authorize(
                self.client
                    .get(format!("{}/get-chat-summaries/{}", self.base_url, user_id)),
            )
            .send()
            .await?;
        let response = Self::check(response, "get-chat-summaries").await?;

        let records: Vec<SummaryRecord> = response
            .json()
            .await
            .map_err(|e| GeniexError::Store(format!("Malformed summaries body: {}", e)))?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// `PUT /rename-chat/:id`
    pub async fn rename_chat(&self, id: &str, title: &str) -> Result<()> {
        let response = self
            .authorize(
                self.client
                    .put(format!("{}/rename-chat/{}", self.base_url, id)),
            )
            .json(&RenameRequest { title })
            .send()
            .await?;
        Self::check(response, "rename-chat").await?;
        Ok(())
    }

    /// `DELETE /delete-chat/:id`
    pub async fn delete_chat(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(
                self.client
                    .delete(format!("{}/delete-chat/{}", self.base_url, id)),
            )
            .send()
            .await?;
        Self::check(response, "delete-chat").await?;
        Ok(())
    }

    /// `PUT /update-folder/:id`
    pub async fn update_folder(&self, id: &str, folder: &str) -> Result<()> {
        let response = self
            .authorize(
                self.client
                    .put(format!("{}/update-folder/{}", self.base_url, id)),
            )
            .json(&FolderRequest { folder })
            .send()
            .await?;
        Self::check(response, "update-folder").await?;
        Ok(())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response, endpoint: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GeniexError::Store(format!(
            "{} returned {}: {}",
            endpoint,
            status,
            body.chars().take(200).collect::<String>()
        ))
        .into())
    }
}
