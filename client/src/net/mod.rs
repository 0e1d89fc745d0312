//! Networking modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` plugs the browser fetch stack into the shared `api::ApiClient`, and
//! `types` re-exports the wire schema for views.

pub mod api;
pub mod types;
