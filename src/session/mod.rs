//! Local chat session state and its synchronization with the store
//!
//! `state` holds the data model and the event reducer, `queue` serializes
//! store writes per session, and `sync` ties both to the HTTP client.

pub mod queue;
pub mod state;
pub mod sync;

pub use queue::PersistQueue;
pub use state::{
    derive_title, now_millis, ChatMessage, ChatSession, ChatSummary, Role, SessionEvent,
    SessionState, DEFAULT_FOLDER, TITLE_MAX_LEN, UNTITLED,
};
pub use sync::{EditOutcome, SendOutcome, Synchronizer, REPLY_ERROR_NOTICE};
