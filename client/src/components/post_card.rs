//! One post in a feed or profile list: header, body, likes, comments.
//!
//! ERROR HANDLING
//! ==============
//! Likes, comments, and deletes fold the server's confirmed response into
//! the owning `PostList`. Failures leave the list untouched (no message).

#[cfg(test)]
#[path = "post_card_test.rs"]
mod post_card_test;

use api::feed::{PostList, can_delete_comment, can_delete_post};
use api::timefmt::time_ago;
use leptos::prelude::*;

use crate::components::avatar::Avatar;
use crate::components::navbar::profile_href;
use crate::net::api::use_api;
use crate::net::types::{Comment, Post, PostId};
use crate::state::auth::AuthState;

pub fn comments_label(count: usize) -> String {
    if count == 1 { "1 comment".to_owned() } else { format!("{count} comments") }
}

/// Which parts of the stats row are shown: likes, then comments.
pub fn stats_shown(likes: u32, comments: usize) -> (bool, bool) {
    (likes > 0, comments > 0)
}

fn relative_time(timestamp: &str) -> String {
    time_ago(timestamp, time::OffsetDateTime::now_utc())
}

#[component]
pub fn PostCard(post_id: PostId, posts: RwSignal<PostList>) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();
    let media = api.config().clone();

    let show_comments = RwSignal::new(false);
    let comment_text = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);

    let post = Memo::new(move |_| posts.with(|list| list.get(post_id).cloned()));

    let api_like = api.clone();
    let on_like = move |_| {
        let api = api_like.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match api.like_post(post_id).await {
                Ok(result) => posts.update(|list| {
                    list.apply_like(post_id, result);
                }),
                Err(e) => log::debug!("like failed: {e}"),
            }
        });
        #[cfg(not(feature = "csr"))]
        let _ = api;
    };

    let api_delete = api.clone();
    let on_delete = move |_| {
        let api = api_delete.clone();
        #[cfg(feature = "csr")]
        {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Delete this post?").ok())
                .unwrap_or(false);
            if !confirmed {
                return;
            }
            leptos::task::spawn_local(async move {
                if api.delete_post(post_id).await.is_ok() {
                    posts.update(|list| {
                        list.remove(post_id);
                    });
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        let _ = api;
    };

    let api_comment = api.clone();
    let on_comment = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let text = comment_text.get();
        if text.trim().is_empty() || submitting.get() {
            return;
        }
        submitting.set(true);
        let api = api_comment.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            if let Ok(comment) = api.add_comment(post_id, &text).await {
                posts.update(|list| {
                    list.append_comment(post_id, comment);
                });
                comment_text.set(String::new());
            }
            submitting.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (api, text);
            submitting.set(false);
        }
    };

    let delete_comment = Callback::new({
        let api = api.clone();
        move |comment_id: i64| {
            let api = api.clone();
            #[cfg(feature = "csr")]
            leptos::task::spawn_local(async move {
                if api.delete_comment(comment_id).await.is_ok() {
                    posts.update(|list| {
                        list.remove_comment(post_id, comment_id);
                    });
                }
            });
            #[cfg(not(feature = "csr"))]
            let _ = (api, comment_id);
        }
    });

    let render_comment = move |p: &Post, comment: Comment| {
        let removable = can_delete_comment(p, &comment, auth.get().user.as_ref());
        let comment_id = comment.id;
        view! {
            <div class="comment-item">
                <div class="comment-item__avatar">
                    <Avatar user=Some(comment.author.clone()) size=32/>
                </div>
                <div class="comment-item__bubble">
                    <div class="comment-item__author">{comment.author.username.clone()}</div>
                    <div class="comment-item__text">{comment.content.clone()}</div>
                </div>
                <Show when=move || removable>
                    <button
                        class="comment-item__delete"
                        title="Delete comment"
                        on:click=move |_| delete_comment.run(comment_id)
                    >
                        "✕"
                    </button>
                </Show>
            </div>
        }
    };

    let me = Signal::derive(move || auth.get().user);

    move || {
        let Some(p) = post.get() else {
            return ().into_any();
        };
        let author_href = profile_href(p.author.id);
        let is_owner = can_delete_post(&p, auth.get().user.as_ref());
        let image = p.image.as_deref().map(|i| media.media_url(i));
        let likes = p.likes_count;
        let comment_count = p.comments.len();
        let (has_likes, has_comments) = stats_shown(likes, comment_count);
        let on_like = on_like.clone();
        let on_delete = on_delete.clone();
        let on_comment = on_comment.clone();
        let comments = p.comments.clone().into_iter().map(|c| render_comment(&p, c)).collect_view();

        view! {
            <div class="card post-card">
                <div class="post-card__header">
                    <a class="post-card__avatar" href=author_href.clone()>
                        <Avatar user=Some(p.author.clone())/>
                    </a>
                    <div class="post-card__meta">
                        <a class="post-card__name" href=author_href>{p.author.display_name().to_owned()}</a>
                        <div class="post-card__time">{relative_time(&p.created_at)}</div>
                    </div>
                    <Show when=move || is_owner>
                        <button class="post-card__delete" title="Delete post" on:click=on_delete.clone()>"✕"</button>
                    </Show>
                </div>

                <div class="post-card__content">{p.content.clone()}</div>
                {image.map(|src| view! { <img class="post-card__image" src=src alt="post"/> })}

                <Show when=move || has_likes || has_comments>
                    <div class="post-card__stats">
                        <Show when=move || has_likes>
                            <span>{format!("👍 {likes}")}</span>
                        </Show>
                        <Show when=move || has_comments>
                            <span class="post-card__stats-link" on:click=move |_| show_comments.update(|v| *v = !*v)>
                                {comments_label(comment_count)}
                            </span>
                        </Show>
                    </div>
                </Show>

                <div class="post-card__actions">
                    <button class="action-btn" class:liked=p.is_liked on:click=on_like>"👍 Like"</button>
                    <button class="action-btn" on:click=move |_| show_comments.update(|v| *v = !*v)>
                        "💬 Comment"
                    </button>
                </div>

                <div class="comments-section" class:hidden=move || !show_comments.get()>
                    {comments}
                    <form class="comment-form" on:submit=on_comment>
                        <div class="comment-form__avatar">
                            <Avatar user=me size=32/>
                        </div>
                        <input
                            placeholder="Write a comment…"
                            prop:value=move || comment_text.get()
                            on:input=move |ev| comment_text.set(event_target_value(&ev))
                            disabled=move || submitting.get()
                        />
                    </form>
                </div>
            </div>
        }
        .into_any()
    }
}
