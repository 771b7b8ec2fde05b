//! Core contracts for the TeraBox link bot.
//!
//! This crate holds the pieces that do not touch the network: the cookie
//! codec, the share-link extractor, the chat-facing value types and the
//! catalogue of user-visible replies.
pub mod credentials;
pub mod links;
pub mod replies;
pub mod types;

pub use credentials::{
    AUTH_MARKER, SESSION_MARKER, has_auth_marker, has_session_marker, normalize,
};
pub use links::{DOMAIN_MARKER, ShareReference, extract, mentions_domain};
pub use types::*;
