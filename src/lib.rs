//! GenieX - chat client library
//!
//! This library provides the core functionality for the GenieX chat client,
//! including the session state synchronizer, the chat store HTTP client,
//! the identity seam, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: session data model, state reducer, persistence queue, and
//!   the synchronizer that keeps local state consistent with the store
//! - `store`: HTTP client and wire types for the chat store service
//! - `identity`: identity-provider seam supplying the opaque user subject
//! - `preferences`: the persisted local `theme` preference
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use geniex::config::Config;
//! use geniex::identity::StaticIdentity;
//! use geniex::session::Synchronizer;
//! use geniex::store::ChatStoreClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let store = ChatStoreClient::new(&config.store)?;
//!     let identity = StaticIdentity::shared(Some("user-1".to_string()));
//!     let mut sync = Synchronizer::new(store, identity, &config.chat);
//!
//!     sync.send_message("Hello").await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod preferences;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{GeniexError, Result};
pub use identity::{IdentityProvider, StaticIdentity};
pub use session::{ChatMessage, ChatSession, ChatSummary, Role, Synchronizer};
pub use store::ChatStoreClient;
