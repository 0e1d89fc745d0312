//! # client
//!
//! Leptos + WASM browser UI for the Agora social network.
//!
//! Pages, components, and the auth signal live here; HTTP, token refresh,
//! session storage rules, and list/conversation state come from the shared
//! `api` crate. The browser pieces (fetch transport, `localStorage`) are
//! compiled under the `csr` feature.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

