//! Wire types for the chat store service
//!
//! The store speaks the field names of its own records (`_id`, `userId`);
//! these private-ish shapes keep that vocabulary at the HTTP boundary and
//! convert to the crate's session types at the edge.

use crate::session::{ChatMessage, ChatSession, ChatSummary, DEFAULT_FOLDER, UNTITLED};
use serde::{Deserialize, Serialize};

/// Body of `POST /chat` — reply generation over the full history
#[derive(Debug, Serialize)]
pub struct ReplyRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub messages: &'a [ChatMessage],
    pub language: &'a str,
}

/// Response of `POST /chat`
#[derive(Debug, Deserialize)]
pub struct ReplyResponse {
    pub response: String,
}

/// Body of `POST /save-chat` and `PUT /update-chat/:id`
#[derive(Debug, Serialize)]
pub struct SaveChatRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub messages: &'a [ChatMessage],
    pub timestamp: i64,
    pub folder: &'a str,
    #[serde(rename = "chatId", skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<&'a str>,
}

/// Response of `POST /save-chat`
#[derive(Debug, Deserialize)]
pub struct SaveChatResponse {
    #[serde(rename = "chatId")]
    pub chat_id: String,
}

/// Body of `PUT /rename-chat/:id`
#[derive(Debug, Serialize)]
pub struct RenameRequest<'a> {
    pub title: &'a str,
}

/// Body of `PUT /update-folder/:id`
#[derive(Debug, Serialize)]
pub struct FolderRequest<'a> {
    pub folder: &'a str,
}

/// Full session record as the store returns it
#[derive(Debug, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub timestamp: i64,
}

fn default_title() -> String {
    UNTITLED.to_string()
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

impl From<SessionRecord> for ChatSession {
    fn from(record: SessionRecord) -> Self {
        ChatSession {
            id: Some(record.id),
            owner_id: record.user_id,
            title: record.title,
            folder: record.folder,
            messages: record.messages,
            timestamp: record.timestamp,
        }
    }
}

/// Summary record as returned by `GET /get-chat-summaries/:userId`
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl From<SummaryRecord> for ChatSummary {
    fn from(record: SummaryRecord) -> Self {
        ChatSummary {
            id: record.id,
            title: record.title,
            folder: record.folder,
            timestamp: record.timestamp,
        }
    }
}
