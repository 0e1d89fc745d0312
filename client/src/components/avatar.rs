//! Round user avatar with an initial-letter fallback.

#[cfg(test)]
#[path = "avatar_test.rs"]
mod avatar_test;

use api::ApiConfig;
use leptos::prelude::*;

use crate::net::types::User;

/// Resolved image URL for `user`, if they have an avatar.
pub fn avatar_src(config: &ApiConfig, user: &User) -> Option<String> {
    user.avatar.as_deref().filter(|a| !a.is_empty()).map(|a| config.media_url(a))
}

/// Inline size style; the fallback letter scales with the circle.
pub fn avatar_style(size: u32) -> String {
    let font = f64::from(size) * 0.38;
    format!("width:{size}px;height:{size}px;font-size:{font:.0}px;")
}

/// Avatar for `user`, or a `?` placeholder when absent. A broken image
/// falls back to the initial.
#[component]
pub fn Avatar(#[prop(into)] user: Signal<Option<User>>, #[prop(default = 40)] size: u32) -> impl IntoView {
    let api = crate::net::api::use_api();
    let config = api.config().clone();
    let broken = RwSignal::new(false);

    let initial = move || user.get().map_or_else(|| "?".to_owned(), |u| u.initial());
    let src = move || user.get().and_then(|u| avatar_src(&config, &u)).filter(|_| !broken.get());
    let alt = move || user.get().map(|u| u.username).unwrap_or_default();

    view! {
        <div class="avatar" style=avatar_style(size)>
            {move || match src() {
                Some(url) => {
                    view! { <img class="avatar__img" src=url alt=alt on:error=move |_| broken.set(true)/> }
                        .into_any()
                }
                None => view! { <div class="avatar-fallback">{initial}</div> }.into_any(),
            }}
        </div>
    }
}
