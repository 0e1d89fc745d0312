//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! Only the session is global. Feed, profile, and conversation state live in
//! the page that owns them (see `api::feed` and `api::messaging`).

pub mod auth;
