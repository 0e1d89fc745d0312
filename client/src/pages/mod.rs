//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates rendering details
//! to `components`.

pub mod feed;
pub mod login;
pub mod messages;
pub mod profile;
pub mod register;
