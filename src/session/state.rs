//! Session data model and state reducer
//!
//! Defines the chat data model (`ChatMessage`, `ChatSession`, `ChatSummary`)
//! and `SessionState`, an immutable record transitioned by explicit named
//! events. All local mutations of the active session flow through
//! [`SessionState::apply`], which keeps the message-ordering invariant in
//! one place instead of scattered across UI handlers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters of the first user message used as a title.
pub const TITLE_MAX_LEN: usize = 30;

/// Title used for a session that has no messages yet.
pub const UNTITLED: &str = "Untitled Chat";

/// Folder assigned to sessions that were never filed anywhere.
pub const DEFAULT_FOLDER: &str = "Default";

/// Role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user
    User,
    /// Reply produced by the remote assistant
    Assistant,
    /// Locally injected notice (e.g. an inline error bubble)
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A single message within a chat session
///
/// Immutable once sent, except for the `content`/`edited` pair which is
/// changed only through the explicit edit operation on the synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier within the chat (UUID v4)
    pub id: String,
    /// Sender role
    pub role: Role,
    /// Message text
    pub content: String,
    /// Send time, epoch milliseconds
    pub timestamp: i64,
    /// Set when the content was replaced through the edit operation
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub edited: bool,
}

impl ChatMessage {
    /// Creates a new user message stamped with the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use geniex::session::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("Hello");
    /// assert_eq!(msg.role, Role::User);
    /// assert!(!msg.edited);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message stamped with the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a new system message stamped with the current time
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: now_millis(),
            edited: false,
        }
    }
}

/// One chat conversation thread with its message history
///
/// The store owns the authoritative copy; the synchronizer owns this
/// in-memory copy. `id` is `None` for an unsaved draft and is adopted from
/// the store on first persist. `messages` is append-ordered by send time
/// except for edit-triggered truncation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// Store-assigned identifier; absent for an unsaved draft
    pub id: Option<String>,
    /// Identity-provider subject that owns this session
    pub owner_id: String,
    /// Derived from the first user message, or user-renamed
    pub title: String,
    /// Folder label, `"Default"` unless the session was filed
    pub folder: String,
    /// Ordered message history
    pub messages: Vec<ChatMessage>,
    /// Last-modified time, epoch milliseconds
    pub timestamp: i64,
}

impl ChatSession {
    /// Creates an empty draft session owned by `owner_id`
    pub fn draft(owner_id: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            id: None,
            owner_id: owner_id.into(),
            title: UNTITLED.to_string(),
            folder: folder.into(),
            messages: Vec::new(),
            timestamp: now_millis(),
        }
    }
}

/// Lightweight listing projection of a session, without message bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Session identifier
    pub id: String,
    /// Session title
    pub title: String,
    /// Folder label
    pub folder: String,
    /// Last-modified time, epoch milliseconds
    pub timestamp: i64,
}

/// Named transitions of the active-session state
///
/// Every local change to the active session is expressed as one of these
/// events and applied through [`SessionState::apply`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user message was appended (optimistic update)
    UserMessage(ChatMessage),
    /// A generated assistant reply was appended
    AssistantReply(ChatMessage),
    /// An inline error bubble was appended; not persisted to the store
    ErrorNotice(ChatMessage),
    /// A message's content was replaced and everything after it discarded
    MessageEdited { id: String, content: String },
    /// The active session was renamed through the store
    TitleChanged(String),
    /// The active session was filed into another folder through the store
    FolderChanged(String),
    /// The store assigned an id to a previously unsaved draft
    IdAdopted(String),
    /// The session was successfully written to the store
    Persisted,
    /// A full session was fetched from the store and made active
    Loaded(ChatSession),
    /// The active session was replaced with an empty draft
    Reset { owner_id: String, folder: String },
}

/// Immutable state record for the active session
///
/// `dirty` tracks whether the local message history has diverged from the
/// last persisted copy; persist-before-navigate decisions key off it.
///
/// # Examples
///
/// ```
/// use geniex::session::{ChatMessage, SessionEvent, SessionState};
///
/// let state = SessionState::draft("user-1", "Default");
/// let state = state.apply(SessionEvent::UserMessage(ChatMessage::user("Hi")));
/// assert_eq!(state.session.messages.len(), 1);
/// assert!(state.dirty);
/// ```
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The active session
    pub session: ChatSession,
    /// True when local messages diverge from the last persisted copy
    pub dirty: bool,
}

impl SessionState {
    /// Creates a clean draft state
    pub fn draft(owner_id: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            session: ChatSession::draft(owner_id, folder),
            dirty: false,
        }
    }

    /// Applies an event, producing the next state
    ///
    /// Unknown message ids in `MessageEdited` leave the state unchanged;
    /// the not-found case is a silent no-op by design.
    pub fn apply(self, event: SessionEvent) -> Self {
        let mut session = self.session;
        let mut dirty = self.dirty;

        match event {
            SessionEvent::UserMessage(message) => {
                if session.messages.is_empty() {
                    session.title = derive_title(&message.content);
                }
                session.timestamp = message.timestamp;
                session.messages.push(message);
                dirty = true;
            }
            SessionEvent::AssistantReply(message) => {
                session.timestamp = message.timestamp;
                session.messages.push(message);
                dirty = true;
            }
            SessionEvent::ErrorNotice(message) => {
                // Shown inline; does not mark the session dirty so a failed
                // send never forces a persist of the error bubble.
                session.messages.push(message);
            }
            SessionEvent::MessageEdited { id, content } => {
                if let Some(index) = session.messages.iter().position(|m| m.id == id) {
                    session.messages.truncate(index + 1);
                    let message = &mut session.messages[index];
                    message.content = content;
                    message.edited = true;
                    session.timestamp = now_millis();
                    dirty = true;
                }
            }
            SessionEvent::TitleChanged(title) => {
                // Already durable via the rename endpoint; the session body
                // never carries the title, so this does not mark dirty.
                session.title = title;
            }
            SessionEvent::FolderChanged(folder) => {
                // Keeps later update-chat bodies from writing the old folder
                // back over the store's.
                session.folder = folder;
            }
            SessionEvent::IdAdopted(id) => {
                session.id = Some(id);
            }
            SessionEvent::Persisted => {
                dirty = false;
            }
            SessionEvent::Loaded(loaded) => {
                session = loaded;
                dirty = false;
            }
            SessionEvent::Reset { owner_id, folder } => {
                session = ChatSession::draft(owner_id, folder);
                dirty = false;
            }
        }

        Self { session, dirty }
    }
}

/// Derives a session title from the first user message
pub fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return UNTITLED.to_string();
    }
    trimmed.chars().take(TITLE_MAX_LEN).collect()
}

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
