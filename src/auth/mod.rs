//! Credential resolution and token storage
//!
//! Three sources, tried in order: a token embedded in the inbound event,
//! a stored token refreshed via the OAuth2 refresh grant, and a static
//! fallback from configuration.

pub mod oauth;
pub mod resolver;
pub mod store;
pub mod tokens;

pub use resolver::{resolve_access_token, AuthError};
pub use store::{FileTokenStore, TokenStore};
#[cfg(test)]
pub use store::MemoryTokenStore;
pub use tokens::{TokenKind, TokenRecord};
