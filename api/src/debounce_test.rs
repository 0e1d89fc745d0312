use super::*;
use crate::test_support::{MockTransport, client_with_store, json, store_with_tokens, user_json};
use tokio::time::sleep;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn later_ticket_supersedes_earlier() {
    let debouncer = Debouncer::from_millis(280);
    let first = debouncer.ticket();
    let second = debouncer.ticket();
    assert!(!first.is_current());
    assert!(second.is_current());
}

#[test]
fn cancel_invalidates_pending_ticket() {
    let debouncer = Debouncer::from_millis(280);
    let ticket = debouncer.ticket();
    debouncer.cancel();
    assert!(!ticket.is_current());
}

#[test]
fn clones_share_generation() {
    let debouncer = Debouncer::from_millis(300);
    let ticket = debouncer.ticket();
    let _ = debouncer.clone().ticket();
    assert!(!ticket.is_current());
}

#[test]
fn search_term_trims_and_rejects_blank() {
    assert_eq!(search_term("  ali "), Some("ali"));
    assert_eq!(search_term(" \t"), None);
    assert_eq!(search_term(""), None);
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_fires_one_search_for_last_query() {
    let transport = MockTransport::new(|_| json(200, &serde_json::json!([user_json(3, "alice")])));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));
    let debouncer = Debouncer::from_millis(280);

    let (a, al, ali) = futures::join!(
        api.search_users_debounced(&debouncer, "a", sleep),
        async {
            sleep(ms(40)).await;
            api.search_users_debounced(&debouncer, "al", sleep).await
        },
        async {
            sleep(ms(90)).await;
            api.search_users_debounced(&debouncer, "ali", sleep).await
        },
    );

    assert_eq!(a.unwrap(), SearchOutcome::Superseded);
    assert_eq!(al.unwrap(), SearchOutcome::Superseded);
    assert!(matches!(ali.unwrap(), SearchOutcome::Results(users) if users.len() == 1));

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.ends_with("/users/search/?q=ali"));
}

#[tokio::test(start_paused = true)]
async fn blank_query_clears_without_request_and_cancels_pending() {
    let transport = MockTransport::new(|_| json(200, &serde_json::json!([])));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));
    let debouncer = Debouncer::from_millis(300);

    let (typed, cleared) = futures::join!(api.search_users_debounced(&debouncer, "bob", sleep), async {
        sleep(ms(100)).await;
        api.search_users_debounced(&debouncer, "   ", sleep).await
    });

    assert_eq!(typed.unwrap(), SearchOutcome::Superseded);
    assert_eq!(cleared.unwrap(), SearchOutcome::Cleared);
    assert!(api.transport().requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn spaced_queries_each_search() {
    let transport = MockTransport::new(|_| json(200, &serde_json::json!([])));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));
    let debouncer = Debouncer::from_millis(280);

    api.search_users_debounced(&debouncer, "al", sleep).await.unwrap();
    api.search_users_debounced(&debouncer, "alice", sleep).await.unwrap();

    assert_eq!(api.transport().requests().len(), 2);
}
