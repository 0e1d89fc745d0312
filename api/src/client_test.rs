use super::*;
use crate::store::{ACCESS_TOKEN_KEY, KeyValueStore, MemoryStore};
use crate::test_support::{MockTransport, bearer, client_with_store, json, no_content, store_with_tokens};
use crate::transport::{FormValue, MultipartForm, TransportError};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

// =============================================================
// Headers
// =============================================================

#[tokio::test]
async fn attaches_bearer_token_exactly_once() {
    let transport = MockTransport::new(|_| json(200, &serde_json::json!({"ok": true})));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    api.request(Method::Get, "/posts/feed/", Body::Empty).await.unwrap();

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header_values("Authorization"), vec!["Bearer acc-1"]);
}

#[tokio::test]
async fn omits_authorization_without_token() {
    let transport = MockTransport::new(|_| json(200, &serde_json::json!([])));
    let api = client_with_store(transport, Arc::new(MemoryStore::new()));

    api.request(Method::Get, "/posts/feed/", Body::Empty).await.unwrap();

    assert!(api.transport().requests()[0].header_values("Authorization").is_empty());
}

#[tokio::test]
async fn json_bodies_get_json_content_type() {
    let transport = MockTransport::new(|_| json(201, &serde_json::json!({"id": 1})));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    api.request(Method::Post, "/messages/", Body::Json(serde_json::json!({"content": "hi"}))).await.unwrap();

    let request = &api.transport().requests()[0];
    assert_eq!(request.header_values("Content-Type"), vec!["application/json"]);
    assert_eq!(request.url, "http://localhost:8000/api/messages/");
}

#[tokio::test]
async fn multipart_bodies_leave_content_type_to_transport() {
    let transport = MockTransport::new(|_| json(201, &serde_json::json!({"id": 1})));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let form = MultipartForm::new().text("content", "hello");
    api.request(Method::Post, "/posts/", Body::Multipart(form)).await.unwrap();

    let request = &api.transport().requests()[0];
    assert!(request.header_values("Content-Type").is_empty());
    assert!(matches!(&request.body, Body::Multipart(f) if f.fields[0].1 == FormValue::Text("hello".to_owned())));
}

// =============================================================
// Response decoding
// =============================================================

#[tokio::test]
async fn empty_success_resolves_to_none() {
    let transport = MockTransport::new(|_| no_content());
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let result = api.request(Method::Delete, "/posts/1/", Body::Empty).await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn fetch_of_empty_body_is_an_error() {
    let transport = MockTransport::new(|_| no_content());
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let err = api.fetch::<serde_json::Value>(Method::Get, "/users/me/", Body::Empty).await.unwrap_err();
    assert!(matches!(err, ApiError::EmptyBody));
}

#[tokio::test]
async fn non_success_carries_parsed_error_body() {
    let transport = MockTransport::new(|_| json(403, &serde_json::json!({"detail": "Not your post."})));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let err = api.execute(Method::Delete, "/posts/1/", Body::Empty).await.unwrap_err();
    let http = err.http().unwrap();
    assert_eq!(http.status, 403);
    assert_eq!(http.body["detail"], "Not your post.");
}

#[tokio::test]
async fn unparseable_error_body_gets_generic_detail() {
    let transport = MockTransport::new(|_| Ok(HttpResponse { status: 500, body: "oops".to_owned() }));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let err = api.execute(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();
    assert_eq!(err.http().unwrap().body["detail"], "Unknown error");
}

#[tokio::test]
async fn transport_failure_is_reported() {
    let transport = MockTransport::new(|_| Err(TransportError::Network("offline".to_owned())));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let err = api.execute(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Network(_))));
}

// =============================================================
// Refresh and retry
// =============================================================

#[tokio::test]
async fn unauthorized_refreshes_once_and_retries_with_new_token() {
    let transport = MockTransport::new(|req| {
        if req.url.ends_with(REFRESH_PATH) {
            return json(200, &serde_json::json!({"access": "acc-2"}));
        }
        match bearer(req).as_deref() {
            Some("Bearer acc-2") => json(200, &serde_json::json!({"id": 5, "content": "retried"})),
            _ => json(401, &serde_json::json!({"detail": "Given token not valid"})),
        }
    });
    let store = store_with_tokens("acc-1", "ref-1");
    let api = client_with_store(transport, store.clone());

    let body = Body::Json(serde_json::json!({"content": "hi"}));
    let value = api.request(Method::Post, "/posts/1/comment/", body.clone()).await.unwrap().unwrap();
    assert_eq!(value["content"], "retried");

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(api.transport().requests_to(REFRESH_PATH).len(), 1);

    let refresh = &requests[1];
    assert!(refresh.header_values("Authorization").is_empty());
    assert_eq!(refresh.body, Body::Json(serde_json::json!({"refresh": "ref-1"})));

    let retry = &requests[2];
    assert_eq!(retry.method, Method::Post);
    assert_eq!(retry.url, requests[0].url);
    assert_eq!(retry.body, body);
    assert_eq!(retry.header_values("Authorization"), vec!["Bearer acc-2"]);

    assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("acc-2"));
    assert_eq!(api.session().access_token().as_deref(), Some("acc-2"));
}

#[tokio::test]
async fn retry_that_fails_again_is_not_refreshed_twice() {
    let transport = MockTransport::new(|req| {
        if req.url.ends_with(REFRESH_PATH) {
            return json(200, &serde_json::json!({"access": "acc-2"}));
        }
        json(401, &serde_json::json!({"detail": "nope"}))
    });
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let err = api.execute(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();

    assert_eq!(err.http().map(|e| e.status), Some(401));
    assert_eq!(api.transport().requests().len(), 3);
    assert_eq!(api.transport().requests_to(REFRESH_PATH).len(), 1);
}

#[tokio::test]
async fn failed_refresh_clears_session_and_abandons_call() {
    let transport = MockTransport::new(|req| {
        if req.url.ends_with(REFRESH_PATH) {
            return json(401, &serde_json::json!({"detail": "Token is blacklisted"}));
        }
        json(401, &serde_json::json!({"detail": "expired"}))
    });
    let store = store_with_tokens("acc-1", "ref-1");
    let api = client_with_store(transport, store.clone());

    let err = api.execute(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(api.transport().requests().len(), 2);
    assert!(store.is_empty());
    assert_eq!(api.session().access_token(), None);
    assert_eq!(api.session().refresh_token(), None);
    assert_eq!(api.session().phase(), crate::AuthPhase::Anonymous);
}

#[tokio::test]
async fn unauthorized_without_refresh_token_clears_session() {
    let transport = MockTransport::new(|_| json(401, &serde_json::json!({"detail": "expired"})));
    let store = Arc::new(MemoryStore::with_entries(&[("access_token", "acc-1")]));
    let api = client_with_store(transport, store.clone());

    let err = api.execute(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(api.transport().requests().len(), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn refresh_transport_failure_clears_session() {
    let transport = MockTransport::new(|req| {
        if req.url.ends_with(REFRESH_PATH) {
            return Err(TransportError::Network("offline".to_owned()));
        }
        json(401, &serde_json::json!({}))
    });
    let store = store_with_tokens("acc-1", "ref-1");
    let api = client_with_store(transport, store.clone());

    let err = api.execute(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(store.is_empty());
}

#[tokio::test]
async fn anonymous_calls_never_refresh() {
    let transport = MockTransport::new(|_| json(401, &serde_json::json!({"detail": "Invalid credentials."})));
    let store = store_with_tokens("acc-1", "ref-1");
    let api = client_with_store(transport, store.clone());

    let err = api
        .fetch_anonymous::<serde_json::Value>(Method::Post, "/auth/login/", Body::Json(serde_json::json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.http().map(|e| e.status), Some(401));
    assert_eq!(api.transport().requests().len(), 1);
    assert!(api.transport().requests()[0].header_values("Authorization").is_empty());
    assert!(!store.is_empty());
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
    let refreshes = Rc::new(Cell::new(0));
    let counter = refreshes.clone();
    let transport = MockTransport::new(move |req| {
        if req.url.ends_with(REFRESH_PATH) {
            counter.set(counter.get() + 1);
            return json(200, &serde_json::json!({"access": "acc-2"}));
        }
        match bearer(req).as_deref() {
            Some("Bearer acc-2") => json(200, &serde_json::json!({"ok": true})),
            _ => json(401, &serde_json::json!({"detail": "expired"})),
        }
    })
    .yielding();
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let (a, b) = futures::join!(
        api.request(Method::Get, "/posts/feed/", Body::Empty),
        api.request(Method::Get, "/messages/conversations/", Body::Empty),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(refreshes.get(), 1);
    let retried = api
        .transport()
        .requests()
        .iter()
        .filter(|r| bearer(r).as_deref() == Some("Bearer acc-2"))
        .count();
    assert_eq!(retried, 2);
}

// =============================================================
// Session changes during a refresh
// =============================================================

/// Client whose refresh endpoint runs `during_refresh` on the session before
/// answering with `acc-2`.
fn client_changing_session_mid_refresh(
    store: Arc<MemoryStore>,
    during_refresh: impl Fn(&Session) + 'static,
) -> ApiClient<MockTransport> {
    let store_handle: Arc<dyn KeyValueStore> = store;
    let session = Session::new(store_handle);
    let observed = session.clone();
    let transport = MockTransport::new(move |req| {
        if req.url.ends_with(REFRESH_PATH) {
            during_refresh(&observed);
            return json(200, &serde_json::json!({"access": "acc-2"}));
        }
        match bearer(req).as_deref() {
            Some("Bearer acc-2") => json(200, &serde_json::json!({"ok": true})),
            _ => json(401, &serde_json::json!({"detail": "expired"})),
        }
    });
    ApiClient::new(transport, ApiConfig::default(), session)
}

#[tokio::test]
async fn logout_during_refresh_discards_refreshed_token() {
    let store = store_with_tokens("acc-1", "ref-1");
    let api = client_changing_session_mid_refresh(store.clone(), Session::logout);

    let err = api.request(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert!(store.is_empty());
    assert_eq!(api.session().access_token(), None);
    assert_eq!(api.session().phase(), crate::AuthPhase::Anonymous);
    let retried = api.transport().requests().iter().any(|r| bearer(r).as_deref() == Some("Bearer acc-2"));
    assert!(!retried);

    let reloaded = Session::new(store);
    assert_eq!(reloaded.access_token(), None);
}

#[tokio::test]
async fn login_during_refresh_keeps_the_new_users_tokens() {
    let store = store_with_tokens("acc-1", "ref-1");
    let api = client_changing_session_mid_refresh(store.clone(), |session| {
        session.login(
            crate::test_support::user(2, "bob"),
            crate::Tokens { access: "bob-acc".to_owned(), refresh: "bob-ref".to_owned() },
        );
    });

    let err = api.request(Method::Get, "/posts/feed/", Body::Empty).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(api.session().access_token().as_deref(), Some("bob-acc"));
    assert_eq!(api.session().refresh_token().as_deref(), Some("bob-ref"));
    assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("bob-acc"));
    assert_eq!(api.session().current_user().map(|u| u.id), Some(2));
}
