//! Session state synchronization with the chat store
//!
//! [`Synchronizer`] mediates between the local in-memory session and the
//! chat store service so the two never diverge longer than one round trip.
//! It owns the active [`SessionState`], routes every store write through the
//! per-session [`PersistQueue`], and keeps the sidebar summary list fresh.
//!
//! Remote failures follow the client's failure taxonomy: validation
//! rejections are silent no-ops, reply/persist failures are logged and
//! surfaced as an inline assistant-role error bubble, and not-found edits
//! are silently ignored. Nothing here is fatal.

use crate::config::ChatConfig;
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::session::queue::PersistQueue;
use crate::session::state::{ChatMessage, ChatSummary, SessionEvent, SessionState};
use crate::store::ChatStoreClient;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Text of the inline bubble shown when reply generation fails
pub const REPLY_ERROR_NOTICE: &str =
    "The assistant could not respond. Check your connection and try again.";

/// Result of a send attempt
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Empty input or signed-out user; nothing happened
    Ignored,
    /// The assistant reply that was appended
    Delivered(ChatMessage),
    /// Reply generation failed; the appended error bubble
    Failed(ChatMessage),
}

/// Result of an edit attempt
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// Unknown message id or signed-out user; nothing happened
    Ignored,
    /// The regenerated assistant reply that was appended
    Delivered(ChatMessage),
    /// The history was truncated and persisted but regeneration failed
    Failed(ChatMessage),
}

/// Keeps local chat state consistent with the remote store
///
/// Exactly one session is active at a time. The synchronizer exclusively
/// owns the in-memory copy; the store owns the authoritative copy.
///
/// # Examples
///
/// ```no_run
/// use geniex::config::Config;
/// use geniex::identity::StaticIdentity;
/// use geniex::session::Synchronizer;
/// use geniex::store::ChatStoreClient;
///
/// # async fn example() -> geniex::error::Result<()> {
/// let config = Config::default();
/// let store = ChatStoreClient::new(&config.store)?;
/// let identity = StaticIdentity::shared(Some("user-1".to_string()));
/// let mut sync = Synchronizer::new(store, identity, &config.chat);
///
/// sync.send_message("Hello").await?;
/// # Ok(())
/// # }
/// ```
pub struct Synchronizer {
    store: ChatStoreClient,
    identity: Arc<dyn IdentityProvider>,
    queue: PersistQueue,
    state: SessionState,
    summaries: Vec<ChatSummary>,
    language: String,
    default_folder: String,
    draft_key: String,
}

impl Synchronizer {
    /// Creates a synchronizer with an empty draft session
    pub fn new(
        store: ChatStoreClient,
        identity: Arc<dyn IdentityProvider>,
        chat: &ChatConfig,
    ) -> Self {
        let owner = identity.subject().unwrap_or_default();
        Self {
            store,
            identity,
            queue: PersistQueue::new(),
            state: SessionState::draft(owner, chat.default_folder.clone()),
            summaries: Vec::new(),
            language: chat.language.clone(),
            default_folder: chat.default_folder.clone(),
            draft_key: new_draft_key(),
        }
    }

    /// The active session state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Messages of the active session, in order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.state.session.messages
    }

    /// Store id of the active session, if it has been persisted
    pub fn active_id(&self) -> Option<&str> {
        self.state.session.id.as_deref()
    }

    /// The local summary list, as of the last refresh
    pub fn summaries(&self) -> &[ChatSummary] {
        &self.summaries
    }

    /// Sends a user message and appends the generated reply
    ///
    /// No-op for empty/whitespace input or when no user is signed in.
    /// Optimistically appends the user message, asks the store to generate
    /// a reply over the full history, appends it, persists the session
    /// (create on first persist, update afterwards), then refreshes the
    /// summary list. On failure the user message stays and an inline error
    /// bubble takes the reply's place; nothing is retried.
    pub async fn send_message(&mut self, text: &str) -> Result<SendOutcome> {
        let Some(user) = self.identity.subject() else {
            tracing::debug!("send_message ignored: not signed in");
            return Ok(SendOutcome::Ignored);
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        self.apply(SessionEvent::UserMessage(ChatMessage::user(trimmed)));

        match self
            .store
            .generate_reply(&user, &self.state.session.messages, &self.language)
            .await
        {
            Ok(reply_text) => {
                let reply = ChatMessage::assistant(reply_text);
                self.apply(SessionEvent::AssistantReply(reply.clone()));
                self.persist_or_log().await;
                self.refresh_or_log().await;
                Ok(SendOutcome::Delivered(reply))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reply generation failed");
                let notice = ChatMessage::assistant(REPLY_ERROR_NOTICE);
                self.apply(SessionEvent::ErrorNotice(notice.clone()));
                Ok(SendOutcome::Failed(notice))
            }
        }
    }

    /// Replaces a message's content and redoes the conversation from there
    ///
    /// Everything after the edited message is discarded before the history
    /// is persisted and a fresh reply generated; the discarded tail is
    /// unrecoverable. Unknown ids are silent no-ops.
    pub async fn edit_message(&mut self, message_id: &str, new_content: &str) -> Result<EditOutcome> {
        let Some(user) = self.identity.subject() else {
            tracing::debug!("edit_message ignored: not signed in");
            return Ok(EditOutcome::Ignored);
        };
        if !self
            .state
            .session
            .messages
            .iter()
            .any(|m| m.id == message_id)
        {
            tracing::debug!(message_id, "edit_message ignored: unknown id");
            return Ok(EditOutcome::Ignored);
        }

        self.apply(SessionEvent::MessageEdited {
            id: message_id.to_string(),
            content: new_content.to_string(),
        });
        self.persist_or_log().await;

        match self
            .store
            .generate_reply(&user, &self.state.session.messages, &self.language)
            .await
        {
            Ok(reply_text) => {
                let reply = ChatMessage::assistant(reply_text);
                self.apply(SessionEvent::AssistantReply(reply.clone()));
                self.persist_or_log().await;
                self.refresh_or_log().await;
                Ok(EditOutcome::Delivered(reply))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reply regeneration after edit failed");
                let notice = ChatMessage::assistant(REPLY_ERROR_NOTICE);
                self.apply(SessionEvent::ErrorNotice(notice.clone()));
                Ok(EditOutcome::Failed(notice))
            }
        }
    }

    /// Persists the current session if needed and starts a fresh one
    ///
    /// Requests a new empty session from the store and adopts its id. When
    /// creation fails the client keeps a local draft; the first successful
    /// send will create the session instead.
    pub async fn create_new_chat(&mut self) -> Result<Option<String>> {
        let Some(user) = self.identity.subject() else {
            tracing::debug!("create_new_chat ignored: not signed in");
            return Ok(None);
        };
        if self.state.dirty {
            self.persist_or_log().await;
        }

        self.draft_key = new_draft_key();
        self.apply(SessionEvent::Reset {
            owner_id: user,
            folder: self.default_folder.clone(),
        });

        let store = self.store.clone();
        let snapshot = self.state.session.clone();
        let created = self
            .queue
            .run(&self.draft_key, async move { store.create_chat(&snapshot).await })
            .await;

        match created {
            Ok(id) => {
                self.apply(SessionEvent::IdAdopted(id.clone()));
                self.apply(SessionEvent::Persisted);
                self.refresh_or_log().await;
                Ok(Some(id))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Creating a new chat failed; staying on a local draft");
                Ok(None)
            }
        }
    }

    /// Makes the user's most recently updated session active, if any
    ///
    /// Used at startup so the conversation continues where it left off.
    /// Returns the resumed session's id, or `None` when the user has no
    /// stored sessions or is signed out.
    pub async fn resume_latest(&mut self) -> Result<Option<String>> {
        let Some(user) = self.identity.subject() else {
            return Ok(None);
        };
        let mut sessions = self.store.get_chats(&user).await?;
        sessions.sort_by_key(|s| s.timestamp);
        match sessions.pop() {
            Some(session) => {
                let id = session.id.clone();
                self.draft_key = new_draft_key();
                self.apply(SessionEvent::Loaded(session));
                Ok(id)
            }
            None => Ok(None),
        }
    }

    /// Persists the current session if dirty, then activates another one
    pub async fn switch_chat(&mut self, id: &str) -> Result<()> {
        if self.state.dirty {
            self.persist_or_log().await;
        }
        let session = self.store.get_chat(id).await?;
        self.draft_key = new_draft_key();
        self.apply(SessionEvent::Loaded(session));
        Ok(())
    }

    /// Renames a session and refreshes the summary list
    pub async fn rename_chat(&mut self, id: &str, title: &str) -> Result<()> {
        self.store.rename_chat(id, title).await?;
        if self.active_id() == Some(id) {
            self.apply(SessionEvent::TitleChanged(title.to_string()));
        }
        self.refresh_summaries().await?;
        Ok(())
    }

    /// Deletes a session and refreshes the summary list
    ///
    /// Callers must obtain explicit user confirmation before invoking this;
    /// the operation itself issues the request unconditionally. Deleting
    /// the active session resets the client to a fresh draft so later
    /// persists cannot resurrect the deleted record.
    pub async fn delete_chat(&mut self, id: &str) -> Result<()> {
        self.store.delete_chat(id).await?;
        if self.active_id() == Some(id) {
            let owner = self.state.session.owner_id.clone();
            self.draft_key = new_draft_key();
            self.apply(SessionEvent::Reset {
                owner_id: owner,
                folder: self.default_folder.clone(),
            });
        }
        self.refresh_summaries().await?;
        Ok(())
    }

    /// Moves a session to a folder and refreshes the summary list
    pub async fn move_chat(&mut self, id: &str, folder: &str) -> Result<()> {
        self.store.update_folder(id, folder).await?;
        if self.active_id() == Some(id) {
            self.apply(SessionEvent::FolderChanged(folder.to_string()));
        }
        self.refresh_summaries().await?;
        Ok(())
    }

    /// Replaces the local summary list with the store's, deduplicated by id
    ///
    /// The store may return duplicate ids; the last occurrence wins and
    /// first-seen order is preserved, so repeated refreshes against an
    /// unchanged store yield identical lists.
    pub async fn refresh_summaries(&mut self) -> Result<&[ChatSummary]> {
        let Some(user) = self.identity.subject() else {
            self.summaries.clear();
            return Ok(&self.summaries);
        };
        let raw = self.store.get_summaries(&user).await?;
        self.summaries = dedupe_by_id(raw);
        Ok(&self.summaries)
    }

    fn apply(&mut self, event: SessionEvent) {
        let state = std::mem::replace(&mut self.state, SessionState::draft("", ""));
        self.state = state.apply(event);
    }

    /// Writes the active session through its queue worker
    ///
    /// The queue key is the session id once one exists, otherwise a local
    /// draft key, so writes for one session never interleave.
    async fn persist_active(&mut self) -> Result<()> {
        if self.state.session.messages.is_empty() {
            return Ok(());
        }
        let store = self.store.clone();
        let snapshot = self.state.session.clone();
        let key = self
            .state
            .session
            .id
            .clone()
            .unwrap_or_else(|| self.draft_key.clone());

        let adopted = self
            .queue
            .run(&key, async move {
                match &snapshot.id {
                    Some(id) => {
                        store.update_chat(id, &snapshot).await?;
                        Ok(None)
                    }
                    None => {
                        let id = store.create_chat(&snapshot).await?;
                        Ok(Some(id))
                    }
                }
            })
            .await?;

        if let Some(id) = adopted {
            self.apply(SessionEvent::IdAdopted(id));
        }
        self.apply(SessionEvent::Persisted);
        Ok(())
    }

    async fn persist_or_log(&mut self) {
        if let Err(e) = self.persist_active().await {
            tracing::warn!(error = %e, "Persisting the session failed");
        }
    }

    async fn refresh_or_log(&mut self) {
        if let Err(e) = self.refresh_summaries().await {
            tracing::warn!(error = %e, "Refreshing summaries failed");
        }
    }
}

fn new_draft_key() -> String {
    format!("draft-{}", Uuid::new_v4())
}

/// Deduplicates summaries by id, last occurrence wins, stable order
fn dedupe_by_id(raw: Vec<ChatSummary>) -> Vec<ChatSummary> {
    let mut order = Vec::new();
    let mut latest: HashMap<String, ChatSummary> = HashMap::new();
    for summary in raw {
        if !latest.contains_key(&summary.id) {
            order.push(summary.id.clone());
        }
        latest.insert(summary.id.clone(), summary);
    }
    order
        .into_iter()
        .filter_map(|id| latest.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::identity::StaticIdentity;

    fn summary(id: &str, title: &str) -> ChatSummary {
        ChatSummary {
            id: id.to_string(),
            title: title.to_string(),
            folder: "Default".to_string(),
            timestamp: 1,
        }
    }

    fn offline_sync(subject: Option<&str>) -> Synchronizer {
        // Points at a closed port; tests below never reach the network.
        let store = ChatStoreClient::new(&StoreConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .expect("client");
        let identity = StaticIdentity::shared(subject.map(str::to_string));
        Synchronizer::new(store, identity, &ChatConfig::default())
    }

    #[test]
    fn test_dedupe_keeps_last_occurrence_stable_order() {
        let deduped = dedupe_by_id(vec![
            summary("a", "first"),
            summary("b", "second"),
            summary("a", "updated"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "a");
        assert_eq!(deduped[0].title, "updated");
        assert_eq!(deduped[1].id, "b");
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let once = dedupe_by_id(vec![summary("a", "x"), summary("b", "y"), summary("a", "z")]);
        let twice = dedupe_by_id(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dedupe_of_empty_list() {
        assert!(dedupe_by_id(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_send_empty_input_is_ignored() {
        let mut sync = offline_sync(Some("user-1"));
        let outcome = sync.send_message("   ").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Ignored));
        assert!(sync.messages().is_empty());
    }

    #[tokio::test]
    async fn test_send_signed_out_is_ignored() {
        let mut sync = offline_sync(None);
        let outcome = sync.send_message("Hello").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Ignored));
        assert!(sync.messages().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_keeps_user_message_and_adds_bubble() {
        let mut sync = offline_sync(Some("user-1"));
        let outcome = sync.send_message("Hello").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Failed(_)));
        assert_eq!(sync.messages().len(), 2);
        assert_eq!(sync.messages()[0].content, "Hello");
        assert_eq!(sync.messages()[1].content, REPLY_ERROR_NOTICE);
        assert!(sync.active_id().is_none());
    }

    #[tokio::test]
    async fn test_edit_unknown_id_is_ignored() {
        let mut sync = offline_sync(Some("user-1"));
        let outcome = sync.edit_message("missing", "new text").await.unwrap();
        assert!(matches!(outcome, EditOutcome::Ignored));
        assert!(sync.messages().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_signed_out_clears_summaries() {
        let mut sync = offline_sync(None);
        let list = sync.refresh_summaries().await.unwrap();
        assert!(list.is_empty());
    }
}
