//! Composer for new posts: text plus an optional photo.

#[cfg(test)]
#[path = "create_post_test.rs"]
mod create_post_test;

use leptos::prelude::*;

use crate::components::avatar::Avatar;
use crate::net::api::use_api;
use crate::net::types::{NewPost, Post, Upload, User};
use crate::state::auth::AuthState;

/// Prompt shown in the collapsed composer.
pub fn composer_prompt(user: Option<&User>) -> String {
    let name = user.map_or("", User::display_name);
    format!("What's on your mind, {name}?")
}

/// Post stays disabled while a chosen photo is still being read, so the
/// submitted post always matches the preview.
pub fn can_post(post: &NewPost, busy: bool, reading: bool) -> bool {
    !busy && !reading && post.is_submittable()
}

#[component]
pub fn CreatePost(on_created: Callback<Post>) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();

    let open = RwSignal::new(false);
    let content = RwSignal::new(String::new());
    let image = RwSignal::new(None::<Upload>);
    let preview = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);
    let reading = RwSignal::new(false);

    let reset = move || {
        open.set(false);
        content.set(String::new());
        image.set(None);
        preview.set(None);
    };

    let draft = move || NewPost { content: content.get(), image: image.get() };
    let prompt = move || composer_prompt(auth.get().user.as_ref());
    let me = Signal::derive(move || auth.get().user);

    let on_file = move |ev: leptos::ev::Event| {
        #[cfg(feature = "csr")]
        {
            let Some(file) = crate::util::upload::selected_file(&ev) else {
                return;
            };
            image.set(None);
            preview.set(None);
            reading.set(true);
            leptos::task::spawn_local(async move {
                let upload = crate::util::upload::read_file(&file).await;
                if upload.is_some() {
                    preview.set(crate::util::upload::preview_url(&file));
                }
                image.set(upload);
                reading.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        let _ = ev;
    };

    let on_submit = move |_| {
        let post = draft();
        if !can_post(&post, busy.get(), reading.get()) {
            return;
        }
        busy.set(true);
        let api = api.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match api.create_post(post).await {
                Ok(created) => {
                    on_created.run(created);
                    reset();
                }
                Err(e) => log::debug!("post not created: {e}"),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (api, post, on_created);
            busy.set(false);
        }
    };

    view! {
        <div class="card create-post">
            <div class="create-post__top">
                <div class="create-post__avatar">
                    <Avatar user=me/>
                </div>
                <Show
                    when=move || open.get()
                    fallback=move || {
                        view! {
                            <button class="create-post__trigger" on:click=move |_| open.set(true)>
                                {prompt}
                            </button>
                        }
                    }
                >
                    <span class="create-post__title">"Create post"</span>
                </Show>
            </div>

            <Show when=move || open.get()>
                <div class="create-post__form">
                    <textarea
                        placeholder=prompt
                        prop:value=move || content.get()
                        on:input=move |ev| content.set(event_target_value(&ev))
                    ></textarea>
                    {move || {
                        preview
                            .get()
                            .map(|src| {
                                view! {
                                    <div class="create-post__preview">
                                        <img src=src alt="preview"/>
                                        <button
                                            class="create-post__preview-remove"
                                            on:click=move |_| {
                                                image.set(None);
                                                preview.set(None);
                                            }
                                        >
                                            "✕"
                                        </button>
                                    </div>
                                }
                            })
                    }}
                    <div class="create-post__actions">
                        <label class="create-post__media-btn" title="Add photo">
                            "📷"
                            <input type="file" accept="image/*" class="hidden" on:change=on_file/>
                        </label>
                        <div class="create-post__buttons">
                            <button class="btn btn--gray btn--sm" on:click=move |_| reset()>"Cancel"</button>
                            <button
                                class="btn btn--primary btn--sm"
                                disabled=move || !can_post(&draft(), busy.get(), reading.get())
                                on:click=on_submit.clone()
                            >
                                {move || {
                                    if busy.get() {
                                        "Posting…"
                                    } else if reading.get() {
                                        "Loading photo…"
                                    } else {
                                        "Post"
                                    }
                                }}
                            </button>
                        </div>
                    </div>
                </div>
            </Show>
        </div>
    }
}
