//! Chat store service client
//!
//! The store owns the authoritative copy of every session. This module
//! provides the HTTP client for its endpoints and the wire types that keep
//! the store's field vocabulary at the boundary.

pub mod client;
pub mod types;

pub use client::ChatStoreClient;
