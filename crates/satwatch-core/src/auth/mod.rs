//! Authentication module for token storage and session state.
//!
//! This module provides:
//! - `TokenStore`: synchronous get/set/clear over the access/refresh pair,
//!   with in-memory, JSON-file and OS-keychain backends
//! - `SessionState`: the derived Anonymous/Authenticated state, published to
//!   frontends through `SessionMonitor`
//!
//! A session is authenticated exactly when an access token is stored. No
//! expiry is tracked locally; the server tells us by rejecting a request.

pub mod session;
pub mod store;

pub use session::{SessionMonitor, SessionState};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenKind, TokenStore};
