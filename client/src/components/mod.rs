//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the shared chrome (navbar, avatars) and the post
//! surfaces, reading the session and API handle from Leptos context.

pub mod avatar;
pub mod create_post;
pub mod navbar;
pub mod post_card;
