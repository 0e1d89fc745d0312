//! Home feed: composer on top, then every visible post, newest first.
//!
//! SYSTEM CONTEXT
//! ==============
//! Private route. The list lives in a page-scoped `PostList` signal that
//! post cards and the composer fold confirmed server responses into.

use api::feed::PostList;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::create_post::CreatePost;
use crate::components::post_card::PostCard;
use crate::net::api::use_api;
use crate::net::types::Post;
use crate::state::auth::AuthState;
use crate::util::auth::install_unauth_redirect;

#[component]
pub fn FeedPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();
    let navigate = use_navigate();
    install_unauth_redirect(auth, navigate);

    let posts = RwSignal::new(PostList::default());
    let loading = RwSignal::new(true);

    // Load once the session is confirmed so the first request carries a token.
    let requested = RwSignal::new(false);
    Effect::new(move || {
        let state = auth.get();
        if requested.get_untracked() || state.loading || state.user.is_none() {
            return;
        }
        requested.set(true);
        let api = api.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match api.feed().await {
                Ok(list) => posts.set(PostList::new(list)),
                Err(e) => log::debug!("feed load failed: {e}"),
            }
            loading.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = api;
            loading.set(false);
        }
    });

    let on_created = Callback::new(move |post: Post| posts.update(|list| list.prepend(post)));

    view! {
        <div class="feed-page">
            <div class="feed-page__column">
                <CreatePost on_created=on_created/>
                <Show
                    when=move || !loading.get()
                    fallback=|| view! { <div class="feed-page__loading">"Loading…"</div> }
                >
                    <Show
                        when=move || !posts.with(PostList::is_empty)
                        fallback=|| {
                            view! {
                                <div class="card feed-page__empty">
                                    <p>"No posts yet."</p>
                                    <p>"Share something or find people to follow!"</p>
                                </div>
                            }
                        }
                    >
                        <For
                            each=move || posts.with(|list| list.posts.iter().map(|p| p.id).collect::<Vec<_>>())
                            key=|id| *id
                            let:post_id
                        >
                            <PostCard post_id=post_id posts=posts/>
                        </For>
                    </Show>
                </Show>
            </div>
        </div>
    }
}
