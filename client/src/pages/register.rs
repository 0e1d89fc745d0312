//! Registration page. Passwords are checked locally before any request.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::net::api::use_api;
use crate::net::types::Registration;
use crate::state::auth::AuthState;
use crate::util::auth::install_signed_in_redirect;

/// Trim identity fields; passwords are kept as typed.
pub fn normalize_registration(form: &Registration) -> Registration {
    Registration {
        username: form.username.trim().to_owned(),
        email: form.email.trim().to_owned(),
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        password: form.password.clone(),
        password2: form.password2.clone(),
    }
}

type Getter = fn(&Registration) -> &String;
type Setter = fn(&mut Registration, String);

fn form_input(
    form: RwSignal<Registration>,
    placeholder: &'static str,
    kind: &'static str,
    get: Getter,
    set: Setter,
) -> impl IntoView {
    view! {
        <input
            class="auth-input"
            type=kind
            placeholder=placeholder
            prop:value=move || form.with(|f| get(f).clone())
            on:input=move |ev| {
                let value = event_target_value(&ev);
                form.update(|f| set(f, value));
            }
        />
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();
    let navigate = use_navigate();
    install_signed_in_redirect(auth, navigate);

    let form = RwSignal::new(Registration::default());
    let error = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let payload = normalize_registration(&form.get());
        if let Err(msg) = payload.validate() {
            error.set(msg.to_owned());
            return;
        }
        busy.set(true);
        error.set(String::new());
        let api = api.clone();

        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            if let Err(e) = api.register(&payload).await {
                error.set(e.user_message("Registration failed"));
            }
            busy.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (api, payload);
            busy.set(false);
        }
    };

    view! {
        <div class="auth-page">
            <div class="auth-page__brand">
                <h1>"agora"</h1>
                <p>"Create a new account. It's quick and easy."</p>
            </div>
            <div class="card auth-card">
                <form class="auth-form" on:submit=on_submit>
                    <Show when=move || !error.get().is_empty()>
                        <div class="auth-error">{move || error.get()}</div>
                    </Show>
                    <div class="auth-form__row">
                        {form_input(form, "First name", "text", |f| &f.first_name, |f, v| f.first_name = v)}
                        {form_input(form, "Last name", "text", |f| &f.last_name, |f, v| f.last_name = v)}
                    </div>
                    {form_input(form, "Username", "text", |f| &f.username, |f, v| f.username = v)}
                    {form_input(form, "Email", "email", |f| &f.email, |f, v| f.email = v)}
                    {form_input(form, "New password", "password", |f| &f.password, |f, v| f.password = v)}
                    {form_input(form, "Confirm password", "password", |f| &f.password2, |f, v| f.password2 = v)}
                    <button class="btn btn--success auth-submit" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Signing up…" } else { "Sign Up" }}
                    </button>
                </form>
                <div class="auth-divider"></div>
                <a href="/login" class="auth-link">"Already have an account?"</a>
            </div>
        </div>
    }
}
