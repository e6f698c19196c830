#![allow(clippy::unwrap_used, clippy::panic, missing_debug_implementations, unreachable_pub)]
use futures::future::join_all;
use reqwest::StatusCode;
use serde_json::json;
mod common;

async fn pair_rows(app: &common::TestApp, a: uuid::Uuid, b: uuid::Uuid) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM connections
         WHERE (requester_id = $1 AND recipient_id = $2) OR (requester_id = $2 AND recipient_id = $1)",
    )
    .bind(a)
    .bind(b)
    .fetch_one(&app.pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_reverse_request_conflicts() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;

    let (status, body) = app.post(&a, "/connections", json!({ "recipientId": b.id })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["requesterId"], a.id.to_string());

    let (status, body) = app.post(&b, "/connections", json!({ "recipientId": a.id })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let (status, _) = app.post(&a, "/connections", json!({ "recipientId": b.id })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(pair_rows(&app, a.id, b.id).await, 1);
}

#[tokio::test]
async fn test_cannot_connect_to_self() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;

    let (status, body) = app.post(&a, "/connections", json!({ "recipientId": a.id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_only_recipient_responds_once() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;

    let (_, body) = app.post(&a, "/connections", json!({ "recipientId": b.id })).await;
    let connection_id = common::id_of(&body);
    let path = format!("/connections/{connection_id}/response");

    let (status, _) = app.post(&a, &path, json!({ "decision": "accept" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&b, &path, json!({ "decision": "accept" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (status, _) = app.post(&b, &path, json!({ "decision": "reject" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post(&b, &format!("/connections/{}/response", uuid::Uuid::new_v4()), json!({ "decision": "accept" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejected_request_can_be_reopened_in_either_direction() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;

    let (_, body) = app.post(&a, "/connections", json!({ "recipientId": b.id })).await;
    let connection_id = common::id_of(&body);
    let (status, _) =
        app.post(&b, &format!("/connections/{connection_id}/response"), json!({ "decision": "reject" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post(&b, "/connections", json!({ "recipientId": a.id })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(common::id_of(&body), connection_id);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["requesterId"], b.id.to_string());
    assert_eq!(body["recipientId"], a.id.to_string());

    assert_eq!(pair_rows(&app, a.id, b.id).await, 1);
}

#[tokio::test]
async fn test_list_connections_with_status_filter() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let c = app.user("Cleo").await;

    let (_, with_b) = app.post(&a, "/connections", json!({ "recipientId": b.id })).await;
    app.post(&c, "/connections", json!({ "recipientId": a.id })).await;
    app.post(&b, &format!("/connections/{}/response", common::id_of(&with_b)), json!({ "decision": "accept" }))
        .await;

    let (status, all) = app.get(&a, "/connections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, accepted) = app.get(&a, "/connections?status=accepted").await;
    let accepted = accepted.as_array().unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(common::id_of(&accepted[0]), common::id_of(&with_b));

    let (_, pending) = app.get(&a, "/connections?status=pending").await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["requesterId"], c.id.to_string());
}

#[tokio::test]
async fn test_concurrent_requests_in_both_directions_leave_one_row() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;

    let requests = (0..8).map(|i| {
        let (from, to) = if i % 2 == 0 { (&a, &b) } else { (&b, &a) };
        app.post(from, "/connections", json!({ "recipientId": to.id }))
    });
    let results = join_all(requests).await;

    let created = results.iter().filter(|(status, _)| *status == StatusCode::CREATED).count();
    assert_eq!(created, 1);
    for (status, body) in results.iter().filter(|(status, _)| *status != StatusCode::CREATED) {
        assert_eq!(*status, StatusCode::CONFLICT, "{body}");
        assert_eq!(body["kind"], "conflict");
    }

    assert_eq!(pair_rows(&app, a.id, b.id).await, 1);
}
