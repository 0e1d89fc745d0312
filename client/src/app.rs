//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    OptionalParamSegment, ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::navbar::Navbar;
use crate::net::api::connect;
use crate::pages::{
    feed::FeedPage, login::LoginPage, messages::MessagesPage, profile::ProfilePage, register::RegisterPage,
};
use crate::state::auth::AuthState;

/// Root application component.
///
/// Provides the API handle and the auth signal, mirrors session changes into
/// that signal, validates any stored token once, and sets up routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let api = connect();
    let auth = RwSignal::new(AuthState::from(&api.session().snapshot()));

    // Every login, logout, refresh failure, and profile edit lands here.
    let subscription = api.session().subscribe(move |snapshot| auth.set(AuthState::from(snapshot)));
    let api_cleanup = api.clone();
    on_cleanup(move || api_cleanup.session().unsubscribe(subscription));

    provide_context(api.clone());
    provide_context(auth);

    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        api.restore_session().await;
    });
    #[cfg(not(feature = "csr"))]
    let _ = api;

    view! {
        <Title text="agora"/>

        <Router>
            <Show when=move || auth.with(|a| a.user.is_some())>
                <Navbar/>
            </Show>
            <main class="app-main">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("register") view=RegisterPage/>
                    <Route path=StaticSegment("") view=FeedPage/>
                    <Route path=(StaticSegment("profile"), ParamSegment("id")) view=ProfilePage/>
                    <Route path=(StaticSegment("messages"), OptionalParamSegment("user_id")) view=MessagesPage/>
                </Routes>
            </main>
        </Router>
    }
}
