#![allow(clippy::unwrap_used, clippy::panic, missing_debug_implementations, unreachable_pub)]
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;
mod common;

async fn resolve(app: &common::TestApp, user: &common::TestUser, body: Value) -> Uuid {
    let (status, body) = app.post(user, "/conversations", body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    common::id_of(&body)
}

async fn send(app: &common::TestApp, user: &common::TestUser, conversation_id: Uuid, content: &str) -> Value {
    let (status, body) =
        app.post(user, &format!("/conversations/{conversation_id}/messages"), json!({ "content": content })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn unread(app: &common::TestApp, user: &common::TestUser, conversation_id: Uuid) -> i64 {
    let (status, body) = app.get(user, &format!("/conversations/{conversation_id}/unread")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["unreadCount"].as_i64().unwrap()
}

#[tokio::test]
async fn test_resolution_is_order_independent() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let listing_id = app.create_listing(&a, "Piano lessons").await;

    let from_a = resolve(&app, &a, json!({ "listingId": listing_id, "counterpartId": b.id })).await;
    let from_b = resolve(&app, &b, json!({ "listingId": listing_id, "counterpartId": a.id })).await;
    assert_eq!(from_a, from_b);

    let direct_a = resolve(&app, &a, json!({ "counterpartId": b.id })).await;
    let direct_b = resolve(&app, &b, json!({ "counterpartId": a.id })).await;
    assert_eq!(direct_a, direct_b);
    assert_ne!(direct_a, from_a);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE id = ANY($1)")
        .bind(vec![from_a, direct_a])
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn test_listing_item_details_are_authoritative() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let listing_id = app.create_listing(&a, "Piano lessons").await;

    let (_, body) = app
        .post(
            &b,
            "/conversations",
            json!({ "listingId": listing_id, "counterpartId": a.id, "itemTitle": "Something else", "itemType": "x" }),
        )
        .await;
    assert_eq!(body["itemTitle"], "Piano lessons");
    assert_eq!(body["itemType"], "offer");
    assert_eq!(body["listingId"], listing_id.to_string());
    assert!(body["lastMessageAt"].is_null());

    let (_, direct) = app.post(&b, "/conversations", json!({ "counterpartId": a.id })).await;
    assert_eq!(direct["itemTitle"], "Direct message");
    assert_eq!(direct["itemType"], "direct");
    assert!(direct["listingId"].is_null());
}

#[tokio::test]
async fn test_resolve_rejects_bad_input() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;

    let (status, body) = app.post(&a, "/conversations", json!({ "counterpartId": a.id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, _) =
        app.post(&a, "/conversations", json!({ "listingId": Uuid::new_v4(), "counterpartId": b.id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_are_ordered_and_paginated() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let conversation_id = resolve(&app, &a, json!({ "counterpartId": b.id })).await;

    for i in 0..5 {
        let sender = if i % 2 == 0 { &a } else { &b };
        send(&app, sender, conversation_id, &format!("message {i}")).await;
    }

    let (status, page) = app.get(&a, &format!("/conversations/{conversation_id}/messages?limit=3")).await;
    assert_eq!(status, StatusCode::OK);
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0]["content"], "message 0");
    assert_eq!(page[2]["content"], "message 2");

    let cursor = page[2]["seq"].as_i64().unwrap();
    let (_, rest) = app.get(&a, &format!("/conversations/{conversation_id}/messages?after={cursor}")).await;
    let contents: Vec<_> = rest.as_array().unwrap().iter().map(|m| m["content"].as_str().unwrap()).collect();
    assert_eq!(contents, vec!["message 3", "message 4"]);

    let seqs: Vec<i64> = page.iter().map(|m| m["seq"].as_i64().unwrap()).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_message_rules() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let outsider = app.user("Olga").await;
    let conversation_id = resolve(&app, &a, json!({ "counterpartId": b.id })).await;
    let path = format!("/conversations/{conversation_id}/messages");

    let (status, _) = app.post(&a, &path, json!({ "content": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let too_long = "x".repeat(app.config.messaging.max_message_length + 1);
    let (status, _) = app.post(&a, &path, json!({ "content": too_long })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post(&outsider, &path, json!({ "content": "hello" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");

    let (status, _) = app.get(&outsider, &path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post(&a, &format!("/conversations/{}/messages", Uuid::new_v4()), json!({ "content": "hi" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unread_counts_and_mark_read() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let conversation_id = resolve(&app, &a, json!({ "counterpartId": b.id })).await;

    assert_eq!(unread(&app, &b, conversation_id).await, 0);

    let mut last = 0;
    for i in 0..3 {
        send(&app, &a, conversation_id, &format!("ping {i}")).await;
        let count = unread(&app, &b, conversation_id).await;
        assert!(count > last);
        last = count;
    }
    assert_eq!(last, 3);
    // A sender never has unread messages of their own.
    assert_eq!(unread(&app, &a, conversation_id).await, 0);

    let (_, messages) = app.get(&b, &format!("/conversations/{conversation_id}/messages")).await;
    assert!(messages.as_array().unwrap().iter().all(|m| m["read"] == false));

    let (status, body) = app.post(&b, &format!("/conversations/{conversation_id}/read"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["marked"], 3);
    assert_eq!(unread(&app, &b, conversation_id).await, 0);

    let (_, body) = app.post(&b, &format!("/conversations/{conversation_id}/read"), json!({})).await;
    assert_eq!(body["marked"], 0);

    let (_, messages) = app.get(&b, &format!("/conversations/{conversation_id}/messages")).await;
    assert!(messages.as_array().unwrap().iter().all(|m| m["read"] == true));
}

#[tokio::test]
async fn test_total_unread_across_conversations() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let c = app.user("Cleo").await;

    let with_b = resolve(&app, &a, json!({ "counterpartId": b.id })).await;
    let with_c = resolve(&app, &a, json!({ "counterpartId": c.id })).await;
    send(&app, &b, with_b, "one").await;
    send(&app, &b, with_b, "two").await;
    send(&app, &c, with_c, "three").await;

    let (status, body) = app.get(&a, "/unread").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["byConversation"][with_b.to_string()], 2);
    assert_eq!(body["byConversation"][with_c.to_string()], 1);
}

#[tokio::test]
async fn test_list_conversations_orders_by_activity() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let c = app.user("Cleo").await;
    let d = app.user("Dev").await;

    let quiet = resolve(&app, &a, json!({ "counterpartId": d.id })).await;
    let older = resolve(&app, &a, json!({ "counterpartId": b.id })).await;
    let newer = resolve(&app, &a, json!({ "counterpartId": c.id })).await;
    send(&app, &b, older, "first").await;
    send(&app, &c, newer, "second").await;

    let (status, body) = app.get(&a, "/conversations").await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    let ids: Vec<Uuid> = list.iter().map(common::id_of).collect();
    assert_eq!(ids, vec![newer, older, quiet]);

    assert_eq!(list[0]["counterpart"]["displayName"], "Cleo");
    assert_eq!(list[0]["lastMessage"], "second");
    assert_eq!(list[0]["lastMessageAge"], "Just now");
    assert_eq!(list[0]["unreadCount"], 1);
    assert!(list[2]["lastMessageAge"].is_null());
    assert_eq!(list[2]["unreadCount"], 0);
}

#[tokio::test]
async fn test_summary_never_moves_backwards() {
    let app = common::TestApp::spawn().await;
    let a = app.user("Ana").await;
    let b = app.user("Ben").await;
    let conversation_id = resolve(&app, &a, json!({ "counterpartId": b.id })).await;

    // A summary stamped ahead of the database clock must survive an older append.
    sqlx::query(
        "UPDATE conversations
         SET last_message_at = NOW() + INTERVAL '1 day', last_message = 'scheduled note'
         WHERE id = $1",
    )
    .bind(conversation_id)
    .execute(&app.pool)
    .await
    .unwrap();

    let summary = |list: Value| {
        list.as_array().unwrap().iter().find(|c| common::id_of(c) == conversation_id).cloned().unwrap()
    };

    let (_, before) = app.get(&a, "/conversations").await;
    let before = summary(before);
    assert_eq!(before["lastMessage"], "scheduled note");

    send(&app, &b, conversation_id, "arrives later").await;

    let (_, after) = app.get(&a, "/conversations").await;
    let after = summary(after);
    assert_eq!(after["lastMessage"], "scheduled note");
    assert_eq!(after["lastMessageAt"], before["lastMessageAt"]);
    assert_eq!(after["unreadCount"], 1);
}
