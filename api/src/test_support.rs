//! Shared fixtures for unit tests: a scripted transport and sample payloads.

use std::cell::RefCell;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::session::Session;
use crate::store::{KeyValueStore, MemoryStore};
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::types::User;

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError>>;

/// Transport that answers through a handler closure and records every
/// request it sees.
pub struct MockTransport {
    handler: Handler,
    requests: RefCell<Vec<HttpRequest>>,
    yield_before_reply: bool,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + 'static,
    {
        Self { handler: Box::new(handler), requests: RefCell::new(Vec::new()), yield_before_reply: false }
    }

    /// Yield to the executor before answering, so concurrent calls interleave.
    pub fn yielding(mut self) -> Self {
        self.yield_before_reply = true;
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// Requests whose URL ends with `suffix`.
    pub fn requests_to(&self, suffix: &str) -> Vec<HttpRequest> {
        self.requests.borrow().iter().filter(|r| r.url.ends_with(suffix)).cloned().collect()
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        if self.yield_before_reply {
            tokio::task::yield_now().await;
        }
        (self.handler)(&request)
    }
}

pub fn json(status: u16, body: &serde_json::Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status, body: body.to_string() })
}

pub fn no_content() -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status: 204, body: String::new() })
}

pub fn bearer(request: &HttpRequest) -> Option<String> {
    request.header_values("Authorization").first().map(|v| (*v).to_owned())
}

pub fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_owned(),
        email: None,
        first_name: String::new(),
        last_name: String::new(),
        avatar: None,
        bio: None,
        friends_count: None,
        created_at: None,
    }
}

pub fn user_json(id: i64, username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "first_name": "",
        "last_name": "",
        "avatar": null
    })
}

pub fn post_json(id: i64, author_id: i64, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "author": user_json(author_id, "author"),
        "content": content,
        "image": null,
        "likes_count": 0,
        "comments_count": 0,
        "comments": [],
        "is_liked": false,
        "created_at": "2024-05-01T09:00:00Z",
        "updated_at": "2024-05-01T09:00:00Z"
    })
}

pub fn comment_json(id: i64, author_id: i64, post_id: i64, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "author": user_json(author_id, "commenter"),
        "post": post_id,
        "content": content,
        "created_at": "2024-05-01T10:00:00Z"
    })
}

pub fn message_json(id: i64, sender_id: i64, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "sender": user_json(sender_id, "sender"),
        "receiver": user_json(99, "receiver"),
        "content": content,
        "is_read": false,
        "created_at": "2024-05-01T10:00:00Z"
    })
}

/// Store pre-loaded with a token pair.
pub fn store_with_tokens(access: &str, refresh: &str) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries(&[("access_token", access), ("refresh_token", refresh)]))
}

/// Client over `transport` whose session reads from `store`.
pub fn client_with_store(transport: MockTransport, store: Arc<MemoryStore>) -> ApiClient<MockTransport> {
    let store: Arc<dyn KeyValueStore> = store;
    ApiClient::new(transport, ApiConfig::default(), Session::new(store))
}
