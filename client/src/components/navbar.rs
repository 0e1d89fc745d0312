//! Top navigation: logo, debounced people search, tabs, profile, logout.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rendered only while a user is signed in. Search uses the shared
//! `api::debounce::Debouncer`, so only the last keystroke inside the quiet
//! period reaches the server.

#[cfg(test)]
#[path = "navbar_test.rs"]
mod navbar_test;

use api::config::NAVBAR_SEARCH_DELAY_MS;
use api::debounce::Debouncer;
#[cfg(feature = "csr")]
use api::debounce::SearchOutcome;
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::components::avatar::Avatar;
use crate::net::api::use_api;
use crate::net::types::User;
use crate::state::auth::AuthState;

/// Tab highlighting: `/` matches exactly, other tabs by prefix.
pub fn is_tab_active(tab: &str, pathname: &str) -> bool {
    if tab == "/" { pathname == "/" } else { pathname.starts_with(tab) }
}

pub fn profile_href(user_id: i64) -> String {
    format!("/profile/{user_id}")
}

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();
    let location = use_location();
    let navigate = use_navigate();

    let query = RwSignal::new(String::new());
    let results = RwSignal::new(Vec::<User>::new());
    let show_dropdown = RwSignal::new(false);
    let debouncer = StoredValue::new(Debouncer::from_millis(NAVBAR_SEARCH_DELAY_MS));

    let api_search = api.clone();
    let on_input = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        query.set(value.clone());
        #[cfg(feature = "csr")]
        {
            let api = api_search.clone();
            let debouncer = debouncer.get_value();
            leptos::task::spawn_local(async move {
                match api.search_users_debounced(&debouncer, &value, gloo_timers::future::sleep).await {
                    Ok(SearchOutcome::Results(users)) => {
                        results.set(users);
                        show_dropdown.set(true);
                    }
                    Ok(SearchOutcome::Cleared) => {
                        results.set(Vec::new());
                        show_dropdown.set(false);
                    }
                    Ok(SearchOutcome::Superseded) | Err(_) => {}
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&api_search, debouncer, value);
        }
    };

    let clear_search = move || {
        debouncer.with_value(Debouncer::cancel);
        query.set(String::new());
        results.set(Vec::new());
        show_dropdown.set(false);
    };

    let go_to = {
        let navigate = navigate.clone();
        move |path: String| {
            clear_search();
            navigate(&path, NavigateOptions::default());
        }
    };

    let on_logout = {
        let api = api.clone();
        let navigate = navigate.clone();
        move |_| {
            api.logout();
            navigate("/login", NavigateOptions::default());
        }
    };

    let pathname = location.pathname;
    let tab_class = move |tab: &'static str| {
        move || if is_tab_active(tab, &pathname.get()) { "nav-tab active" } else { "nav-tab" }
    };

    let me = Signal::derive(move || auth.get().user);
    let go_home = go_to.clone();
    let go_messages = go_to.clone();
    let go_profile = go_to.clone();
    let go_result = go_to;

    view! {
        <nav class="navbar">
            <a href="/" class="navbar__logo">"agora"</a>

            <div class="navbar__search-wrap" on:focusout=move |_| show_dropdown.set(false)>
                <div class="navbar__search">
                    <input
                        placeholder="Search people"
                        prop:value=move || query.get()
                        on:input=on_input
                        on:focus=move |_| {
                            if !results.get().is_empty() {
                                show_dropdown.set(true);
                            }
                        }
                    />
                    <Show when=move || !query.get().is_empty()>
                        <button class="navbar__search-clear" on:click=move |_| clear_search()>"×"</button>
                    </Show>
                </div>
                <Show when=move || show_dropdown.get() && !results.get().is_empty()>
                    <div class="search-dropdown">
                        <div class="search-dropdown__label">"People"</div>
                        {
                            let go_result = go_result.clone();
                            move || {
                                results
                                    .get()
                                    .into_iter()
                                    .map(|u| {
                                        let href = profile_href(u.id);
                                        let go = go_result.clone();
                                        view! {
                                            // mousedown fires before the wrapper's focusout hides the list
                                            <div class="search-item" on:mousedown=move |_| go(href.clone())>
                                                <Avatar user=Some(u.clone()) size=40/>
                                                <div>
                                                    <div class="search-item__name">{u.full_name()}</div>
                                                    <div class="search-item__sub">{format!("@{}", u.username)}</div>
                                                </div>
                                            </div>
                                        }
                                    })
                                    .collect_view()
                            }
                        }
                    </div>
                </Show>
            </div>

            <div class="navbar__tabs">
                <button class=tab_class("/") title="Home" on:click=move |_| go_home("/".to_owned())>
                    "Home"
                </button>
                <button
                    class=tab_class("/messages")
                    title="Messages"
                    on:click=move |_| go_messages("/messages".to_owned())
                >
                    "Messages"
                </button>
            </div>

            <div class="navbar__right">
                <div
                    class="navbar__avatar-btn"
                    title="Profile"
                    on:click=move |_| {
                        if let Some(id) = auth.get_untracked().user_id() {
                            go_profile(profile_href(id));
                        }
                    }
                >
                    <Avatar user=me size=40/>
                </div>
                <button class="btn btn--gray btn--sm" on:click=on_logout>"Logout"</button>
            </div>
        </nav>
    }
}
