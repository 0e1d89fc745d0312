//! Direct messages: conversation list, partner search, and the active thread.
//!
//! SYSTEM CONTEXT
//! ==============
//! Private route at `/messages` and `/messages/:user_id`. The URL selects the
//! partner; picking one from the list or search navigates there. The active
//! thread is re-fetched every `MESSAGE_POLL_INTERVAL_MS` by one poller. Its
//! handle lives in a `StoredValue`, so replacing or dropping it (partner
//! switch, page cleanup) cancels the previous loop.

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;

#[cfg(feature = "csr")]
use api::config::MESSAGE_POLL_INTERVAL_MS;
use api::config::MESSAGES_SEARCH_DELAY_MS;
use api::debounce::Debouncer;
#[cfg(feature = "csr")]
use api::debounce::SearchOutcome;
use api::messaging::{ConversationState, is_outgoing, is_sendable};
use api::poll::Poller;
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_params_map};

use crate::components::avatar::Avatar;
use crate::components::navbar::profile_href;
use crate::net::api::use_api;
use crate::net::types::{Message, User, UserId};
use crate::pages::profile::{parse_user_id, still_requested};
use crate::state::auth::AuthState;
use crate::util::auth::install_unauth_redirect;

/// The partner to open when the URL names one that isn't already active.
pub fn partner_to_open(active: Option<UserId>, requested: Option<UserId>) -> Option<UserId> {
    requested.filter(|id| active != Some(*id))
}

pub fn bubble_class(outgoing: bool) -> &'static str {
    if outgoing { "msg-bubble msg-bubble--out" } else { "msg-bubble msg-bubble--in" }
}

pub fn conversation_href(user_id: UserId) -> String {
    format!("/messages/{user_id}")
}

#[component]
pub fn MessagesPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api();
    let navigate = use_navigate();
    let params = use_params_map();
    install_unauth_redirect(auth, navigate.clone());

    let conversation = RwSignal::new(ConversationState::default());
    let poller = StoredValue::new(None::<Poller>);
    let draft = RwSignal::new(String::new());
    let sending = RwSignal::new(false);

    let search_query = RwSignal::new(String::new());
    let search_results = RwSignal::new(Vec::<User>::new());
    let debouncer = StoredValue::new(Debouncer::from_millis(MESSAGES_SEARCH_DELAY_MS));

    let ready = Memo::new(move |_| auth.with(|a| !a.loading && a.user.is_some()));
    let requested = Memo::new(move |_| params.with(|p| parse_user_id(p.get("user_id").as_deref())));

    // Activate `partner` and restart polling for it.
    let api_open = api.clone();
    let open = move |partner: User| {
        let partner_id = partner.id;
        if !conversation.try_update(|c| c.select(partner)).unwrap_or(false) {
            return;
        }
        let next = Poller::new();
        let token = next.token();
        // Dropping the previous handle stops its loop.
        poller.set_value(Some(next));

        let api = api_open.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            let interval = std::time::Duration::from_millis(MESSAGE_POLL_INTERVAL_MS);
            api.watch_conversation(partner_id, token, interval, gloo_timers::future::sleep, |id, messages| {
                conversation.update(|c| {
                    c.apply_history(id, messages);
                });
            })
            .await;
        });
        #[cfg(not(feature = "csr"))]
        let _ = (api, token, partner_id);
    };

    let api_list = api.clone();
    Effect::new(move || {
        if !ready.get() {
            return;
        }
        let api = api_list.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match api.conversations().await {
                Ok(partners) => conversation.update(|c| c.set_partners(partners)),
                Err(e) => log::debug!("conversations failed to load: {e}"),
            }
        });
        #[cfg(not(feature = "csr"))]
        let _ = api;
    });

    let api_param = api.clone();
    let open_from_url = open.clone();
    Effect::new(move || {
        let wanted = requested.get();
        if !ready.get() {
            return;
        }
        let active = conversation.with_untracked(ConversationState::active_id);
        let Some(partner_id) = partner_to_open(active, wanted) else {
            return;
        };
        // Known partners open without a lookup.
        let known = conversation.with_untracked(|c| c.partners.iter().find(|u| u.id == partner_id).cloned());
        if let Some(partner) = known {
            open_from_url(partner);
            return;
        }
        let api = api_param.clone();
        let open = open_from_url.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match api.get_user(partner_id).await {
                Ok(user) if still_requested(requested, partner_id) => open(user),
                Ok(_) => {}
                Err(e) => log::debug!("message partner {partner_id} not loaded: {e}"),
            }
        });
        #[cfg(not(feature = "csr"))]
        let _ = (api, open);
    });

    let select = {
        let navigate = navigate.clone();
        let open = open.clone();
        move |user: User| {
            debouncer.with_value(Debouncer::cancel);
            search_query.set(String::new());
            search_results.set(Vec::new());
            let href = conversation_href(user.id);
            open(user);
            navigate(&href, NavigateOptions::default());
        }
    };

    let api_search = api.clone();
    let on_search = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        search_query.set(value.clone());
        #[cfg(feature = "csr")]
        {
            let api = api_search.clone();
            let debouncer = debouncer.get_value();
            leptos::task::spawn_local(async move {
                match api.search_users_debounced(&debouncer, &value, gloo_timers::future::sleep).await {
                    Ok(SearchOutcome::Results(users)) => search_results.set(users),
                    Ok(SearchOutcome::Cleared) => search_results.set(Vec::new()),
                    Ok(SearchOutcome::Superseded) | Err(_) => {}
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&api_search, debouncer, value);
        }
    };

    let api_send = api.clone();
    let on_send = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let text = draft.get();
        let Some(partner_id) = conversation.with(ConversationState::active_id) else {
            return;
        };
        if !is_sendable(&text) || sending.get() {
            return;
        }
        sending.set(true);
        let api = api_send.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match api.send_message(partner_id, &text).await {
                Ok(message) => {
                    conversation.update(|c| {
                        c.push_sent(partner_id, message);
                    });
                    draft.set(String::new());
                }
                Err(e) => log::debug!("message not sent: {e}"),
            }
            sending.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (api, text, partner_id);
            sending.set(false);
        }
    };

    // Keep the newest message in view.
    let thread_ref = NodeRef::<leptos::html::Div>::new();
    Effect::new(move || {
        conversation.track();
        #[cfg(feature = "csr")]
        if let Some(el) = thread_ref.get() {
            el.set_scroll_top(el.scroll_height());
        }
    });

    let render_partner = {
        let select = select.clone();
        move |user: User, label: String| {
            let select = select.clone();
            let id = user.id;
            let shown = user.clone();
            view! {
                <div
                    class="conv-item"
                    class:active=move || conversation.with(|c| c.is_active(id))
                    on:click=move |_| select(user.clone())
                >
                    <div class="conv-item__avatar">
                        <Avatar user=Some(shown.clone())/>
                    </div>
                    <span class="conv-item__name">{label}</span>
                </div>
            }
        }
    };

    let render_search = render_partner.clone();
    let render_list = render_partner;

    let render_message = move |message: Message| {
        let outgoing = is_outgoing(&message, auth.get_untracked().user.as_ref());
        view! {
            <div class=bubble_class(outgoing)>
                {(!outgoing).then(|| {
                    view! {
                        <div class="msg-bubble__avatar">
                            <Avatar user=Some(message.sender.clone()) size=28/>
                        </div>
                    }
                })}
                <div class="msg-bubble__text">{message.content.clone()}</div>
            </div>
        }
    };

    view! {
        <div class="messages-page">
            <div class="messages-layout">
                <div class="conversations-list">
                    <h3>"Chats"</h3>
                    <div class="conversations-list__search">
                        <input placeholder="Search…" prop:value=move || search_query.get() on:input=on_search/>
                        {move || {
                            let render = render_search.clone();
                            let results = search_results.get();
                            (!results.is_empty())
                                .then(|| {
                                    view! {
                                        <div class="conversations-list__results">
                                            {results
                                                .into_iter()
                                                .map(|u| {
                                                    let label = u.username.clone();
                                                    render(u, label)
                                                })
                                                .collect_view()}
                                        </div>
                                    }
                                })
                        }}
                    </div>
                    {move || {
                        let render = render_list.clone();
                        conversation
                            .with(|c| c.partners.clone())
                            .into_iter()
                            .map(|u| {
                                let label = u.display_name().to_owned();
                                render(u, label)
                            })
                            .collect_view()
                    }}
                </div>

                <div class="chat-area">
                    {move || match conversation.with(|c| c.active.clone()) {
                        None => {
                            view! {
                                <div class="chat-empty">
                                    <span class="chat-empty__icon">"💬"</span>
                                    <p>"Select a conversation or search for someone to message"</p>
                                </div>
                            }
                                .into_any()
                        }
                        Some(partner) => {
                            let name = partner.display_name().to_owned();
                            let href = profile_href(partner.id);
                            view! {
                                <div class="chat-header">
                                    <div class="chat-header__avatar">
                                        <Avatar user=Some(partner.clone())/>
                                    </div>
                                    <a href=href>{name}</a>
                                </div>
                            }
                                .into_any()
                        }
                    }}
                    <Show when=move || conversation.with(|c| c.active.is_some())>
                        <div class="chat-messages" node_ref=thread_ref>
                            <Show when=move || conversation.with(|c| c.messages.is_empty())>
                                <div class="chat-messages__empty">"No messages yet. Say hi! 👋"</div>
                            </Show>
                            {move || conversation.with(|c| c.messages.clone()).into_iter().map(render_message).collect_view()}
                        </div>
                        <form class="chat-input" on:submit=on_send.clone()>
                            <input
                                placeholder="Aa"
                                prop:value=move || draft.get()
                                on:input=move |ev| draft.set(event_target_value(&ev))
                                disabled=move || sending.get()
                            />
                            <button type="submit" disabled=move || sending.get() || !is_sendable(&draft.get())>
                                "➤"
                            </button>
                        </form>
                    </Show>
                </div>
            </div>
        </div>
    }
}
