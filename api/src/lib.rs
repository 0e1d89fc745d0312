//! Shared REST client core for the Agora social network.
//!
//! This crate owns everything the browser UI (`client`) and the terminal
//! client (`cli`) have in common: the wire schema, the authenticated request
//! wrapper with token refresh, the observable session, and the small
//! timing primitives (debounce, polling) the views are built on.
//!
//! Nothing here touches a concrete HTTP stack or storage backend. Callers
//! plug those in through [`Transport`] and [`KeyValueStore`].

pub mod client;
pub mod config;
pub mod debounce;
pub mod endpoints;
pub mod error;
pub mod feed;
pub mod messaging;
pub mod poll;
pub mod session;
pub mod store;
pub mod timefmt;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, HttpError};
pub use session::{AuthPhase, Session, SessionSnapshot, Tokens};
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use transport::{Body, FormValue, HttpRequest, HttpResponse, Method, MultipartForm, Transport, TransportError};
