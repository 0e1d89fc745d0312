//! Profile page: user card, their posts, and the self-profile editor.
//!
//! SYSTEM CONTEXT
//! ==============
//! Private route at `/profile/:id`. The user and their posts load together
//! whenever the id changes; a 404 renders an explicit not-found card. Saving
//! the editor also updates the session user, which the navbar reads.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use api::feed::PostList;
use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_params_map};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::components::avatar::Avatar;
use crate::components::create_post::CreatePost;
use crate::components::post_card::PostCard;
use crate::net::api::use_api;
use crate::net::types::{Post, ProfileUpdate, Upload, User, UserId};
use crate::state::auth::AuthState;
use crate::util::auth::install_unauth_redirect;

/// Load state for the profile being viewed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileLoad {
    Loading,
    Loaded(User),
    NotFound,
    Failed,
}

pub fn parse_user_id(raw: Option<&str>) -> Option<UserId> {
    raw?.trim().parse().ok()
}

/// Whether the route still asks for `id`. A page that was navigated away
/// from (its reactive owner disposed) asks for nothing.
pub fn still_requested(requested: Memo<Option<UserId>>, id: UserId) -> bool {
    requested.try_get_untracked().flatten() == Some(id)
}

/// "Joined March 2024" from an RFC 3339 timestamp.
pub fn joined_label(created_at: Option<&str>) -> Option<String> {
    let at = OffsetDateTime::parse(created_at?, &Rfc3339).ok()?;
    Some(format!("Joined {} {}", at.month(), at.year()))
}

/// Editor fields become a full PATCH; an unchanged avatar is not re-sent.
pub fn build_profile_update(first_name: &str, last_name: &str, bio: &str, avatar: Option<Upload>) -> ProfileUpdate {
    ProfileUpdate {
        first_name: Some(first_name.trim().to_owned()),
        last_name: Some(last_name.trim().to_owned()),
        bio: Some(bio.trim().to_owned()),
        avatar,
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();
    let navigate = use_navigate();
    let params = use_params_map();
    install_unauth_redirect(auth, navigate);

    let user_id = Memo::new(move |_| params.with(|p| parse_user_id(p.get("id").as_deref())));
    let profile = RwSignal::new(ProfileLoad::Loading);
    let posts = RwSignal::new(PostList::default());
    let editing = RwSignal::new(false);

    // Memo so that profile edits (which touch `auth`) don't trigger a reload.
    let ready = Memo::new(move |_| auth.with(|a| !a.loading && a.user.is_some()));

    let api_load = api.clone();
    Effect::new(move || {
        let ready = ready.get();
        let Some(id) = user_id.get() else {
            profile.set(ProfileLoad::NotFound);
            return;
        };
        if !ready {
            return;
        }
        profile.set(ProfileLoad::Loading);
        editing.set(false);
        let api = api_load.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            let (user, list) = futures::join!(api.get_user(id), api.user_posts(id));
            // A newer navigation owns the page now, or the page is gone.
            if !still_requested(user_id, id) {
                return;
            }
            match user {
                Ok(user) => {
                    posts.set(PostList::new(list.unwrap_or_default()));
                    profile.set(ProfileLoad::Loaded(user));
                }
                Err(e) if e.is_not_found() => profile.set(ProfileLoad::NotFound),
                Err(e) => {
                    log::debug!("profile {id} failed to load: {e}");
                    profile.set(ProfileLoad::Failed);
                }
            }
        });
        #[cfg(not(feature = "csr"))]
        let _ = (api, id);
    });

    let on_created = Callback::new(move |post: Post| posts.update(|list| list.prepend(post)));
    let on_saved = Callback::new(move |user: User| {
        profile.set(ProfileLoad::Loaded(user));
        editing.set(false);
    });

    move || match profile.get() {
        ProfileLoad::Loading => view! { <div class="profile-page__loading">"Loading…"</div> }.into_any(),
        ProfileLoad::NotFound => view! { <ProfileNotFound/> }.into_any(),
        ProfileLoad::Failed => {
            view! { <div class="card profile-page__error">"Couldn't load this profile."</div> }.into_any()
        }
        ProfileLoad::Loaded(user) => {
            let is_me = auth.with(|a| a.is_self(user.id));
            let shown = Signal::derive({
                let user = user.clone();
                move || Some(user.clone())
            });
            let full_name = user.full_name();
            let handle = format!("@{}", user.username);
            let bio = user.bio.clone().filter(|b| !b.is_empty());
            let email = user.email.clone();
            let joined = joined_label(user.created_at.as_deref());
            let friends = user.friends_count.unwrap_or(0);
            let message_href = format!("/messages/{}", user.id);
            let edit_user = user.clone();

            view! {
                <div class="profile-page">
                    <div class="profile-cover"></div>
                    <div class="profile-info-bar">
                        <div class="profile-avatar-wrap">
                            <Avatar user=shown size=160/>
                        </div>
                        <div class="profile-details">
                            <h1 class="profile-name">{full_name}</h1>
                            <div class="profile-handle">{handle}</div>
                            <div class="profile-counts">
                                <span>{move || format!("{} posts", posts.with(PostList::len))}</span>
                                <span>{format!("{friends} friends")}</span>
                            </div>
                        </div>
                        <div class="profile-actions-row">
                            {if is_me {
                                view! {
                                    <button class="btn btn--gray" on:click=move |_| editing.update(|v| *v = !*v)>
                                        "Edit profile"
                                    </button>
                                }
                                    .into_any()
                            } else {
                                view! { <a class="btn btn--gray" href=message_href>"Message"</a> }.into_any()
                            }}
                        </div>
                    </div>

                    <div class="profile-body">
                        <div class="card about-card">
                            <h3>"Intro"</h3>
                            <p class="about-card__bio">
                                {bio.unwrap_or_else(|| {
                                    let hint = if is_me { "Add a bio to tell people about yourself." } else { "No bio yet." };
                                    hint.to_owned()
                                })}
                            </p>
                            {email.map(|e| view! { <div class="about-item">{e}</div> })}
                            {joined.map(|j| view! { <div class="about-item">{j}</div> })}
                        </div>

                        <div class="profile-body__posts">
                            <Show when=move || is_me && editing.get()>
                                <ProfileEditor user=edit_user.clone() on_saved=on_saved/>
                            </Show>
                            <Show when=move || is_me>
                                <CreatePost on_created=on_created/>
                            </Show>
                            <Show
                                when=move || !posts.with(PostList::is_empty)
                                fallback=|| view! { <div class="card profile-page__empty">"No posts yet."</div> }
                            >
                                <For
                                    each=move || posts.with(|list| list.posts.iter().map(|p| p.id).collect::<Vec<_>>())
                                    key=|id| *id
                                    let:post_id
                                >
                                    <PostCard post_id=post_id posts=posts/>
                                </For>
                            </Show>
                        </div>
                    </div>
                </div>
            }
            .into_any()
        }
    }
}

#[component]
fn ProfileNotFound() -> impl IntoView {
    view! {
        <div class="profile-page profile-page--missing">
            <div class="card empty-state">
                <div class="empty-state__icon">"🔍"</div>
                <h3>"User not found"</h3>
                <p>"This profile may not exist or has been removed."</p>
                <a class="btn btn--primary" href="/">"Back to Feed"</a>
            </div>
        </div>
    }
}

#[component]
fn ProfileEditor(user: User, on_saved: Callback<User>) -> impl IntoView {
    let api = use_api();
    let first_name = RwSignal::new(user.first_name.clone());
    let last_name = RwSignal::new(user.last_name.clone());
    let bio = RwSignal::new(user.bio.clone().unwrap_or_default());
    let avatar = RwSignal::new(None::<Upload>);
    let error = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let reading = RwSignal::new(false);

    let on_file = move |ev: leptos::ev::Event| {
        #[cfg(feature = "csr")]
        {
            if let Some(file) = crate::util::upload::selected_file(&ev) {
                avatar.set(None);
                reading.set(true);
                leptos::task::spawn_local(async move {
                    avatar.set(crate::util::upload::read_file(&file).await);
                    reading.set(false);
                });
            }
        }
        #[cfg(not(feature = "csr"))]
        let _ = ev;
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() || reading.get() {
            return;
        }
        let update = build_profile_update(&first_name.get(), &last_name.get(), &bio.get(), avatar.get());
        busy.set(true);
        error.set(String::new());
        let api = api.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match api.update_profile(update).await {
                Ok(user) => on_saved.run(user),
                Err(e) => error.set(e.user_message("Couldn't save your profile.")),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (api, update, on_saved);
            busy.set(false);
        }
    };

    view! {
        <form class="card profile-editor" on:submit=on_submit>
            <h3>"Edit profile"</h3>
            <Show when=move || !error.get().is_empty()>
                <div class="auth-error">{move || error.get()}</div>
            </Show>
            <input
                placeholder="First name"
                prop:value=move || first_name.get()
                on:input=move |ev| first_name.set(event_target_value(&ev))
            />
            <input
                placeholder="Last name"
                prop:value=move || last_name.get()
                on:input=move |ev| last_name.set(event_target_value(&ev))
            />
            <textarea
                placeholder="Bio"
                prop:value=move || bio.get()
                on:input=move |ev| bio.set(event_target_value(&ev))
            ></textarea>
            <label class="profile-editor__avatar">
                "Profile photo "
                <input type="file" accept="image/*" on:change=on_file/>
                <span>{move || crate::util::upload::describe(avatar.get().as_ref())}</span>
            </label>
            <button class="btn btn--primary" type="submit" disabled=move || busy.get() || reading.get()>
                {move || if busy.get() { "Saving…" } else { "Save" }}
            </button>
        </form>
    }
}
