//! Login page: username + password against the token endpoint.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::net::api::use_api;
use crate::net::types::Credentials;
use crate::state::auth::AuthState;
use crate::util::auth::install_signed_in_redirect;

/// Trim the username and require both fields.
pub fn validate_login_input(username: &str, password: &str) -> Result<Credentials, &'static str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err("Enter your username and password.");
    }
    Ok(Credentials { username: username.to_owned(), password: password.to_owned() })
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();
    let navigate = use_navigate();
    install_signed_in_redirect(auth, navigate);

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let credentials = match validate_login_input(&username.get(), &password.get()) {
            Ok(c) => c,
            Err(msg) => {
                error.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        error.set(String::new());
        let api = api.clone();

        // The signed-in redirect fires once the session listener updates `auth`.
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            if let Err(e) = api.login(&credentials).await {
                error.set(e.user_message("Invalid credentials"));
            }
            busy.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (api, credentials);
            busy.set(false);
        }
    };

    view! {
        <div class="auth-page">
            <div class="auth-page__brand">
                <h1>"agora"</h1>
                <p>"Connect with friends and the world around you."</p>
            </div>
            <div class="card auth-card">
                <form class="auth-form" on:submit=on_submit>
                    <Show when=move || !error.get().is_empty()>
                        <div class="auth-error">{move || error.get()}</div>
                    </Show>
                    <input
                        class="auth-input"
                        placeholder="Username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <input
                        class="auth-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="btn btn--primary auth-submit" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Logging in…" } else { "Log In" }}
                    </button>
                </form>
                <div class="auth-divider"></div>
                <a href="/register" class="btn btn--success auth-switch">"Create new account"</a>
            </div>
        </div>
    }
}
