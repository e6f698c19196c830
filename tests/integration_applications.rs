#![allow(clippy::unwrap_used, clippy::panic, missing_debug_implementations, unreachable_pub)]
use futures::future::join_all;
use reqwest::StatusCode;
use serde_json::json;
mod common;

#[tokio::test]
async fn test_submit_application() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let applicant = app.user("Ben").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;

    let (status, body) = app
        .post(
            &applicant,
            &format!("/listings/{listing_id}/applications"),
            json!({ "message": "  I play every day ", "contactInfo": "ben@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["message"], "I play every day");
    assert_eq!(body["applicantId"], applicant.id.to_string());

    let (status, mine) = app.get(&applicant, "/applications").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_pending_application_conflicts() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let applicant = app.user("Ben").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;

    app.apply(&applicant, listing_id).await;

    let (status, body) =
        app.post(&applicant, &format!("/listings/{listing_id}/applications"), json!({ "message": "again" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn test_concurrent_duplicate_submissions_leave_one_pending() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let applicant = app.user("Ben").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;

    let path = format!("/listings/{listing_id}/applications");
    let results = join_all((0..5).map(|_| app.post(&applicant, &path, json!({ "message": "pick me" })))).await;

    let created = results.iter().filter(|(status, _)| *status == StatusCode::CREATED).count();
    let conflicts = results.iter().filter(|(status, _)| *status == StatusCode::CONFLICT).count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 4);
}

#[tokio::test]
async fn test_cannot_apply_to_own_listing() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;

    let (status, body) =
        app.post(&owner, &format!("/listings/{listing_id}/applications"), json!({ "message": "me" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_cannot_apply_to_closed_listing() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let applicant = app.user("Ben").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;

    app.post(&owner, &format!("/listings/{listing_id}/status"), json!({ "status": "cancelled" })).await;

    let (status, _) =
        app.post(&applicant, &format!("/listings/{listing_id}/applications"), json!({ "message": "hi" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_accept_rejects_competitors_and_starts_listing() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let x = app.user("Xavi").await;
    let y = app.user("Yara").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;
    let a1 = app.apply(&x, listing_id).await;
    let a2 = app.apply(&y, listing_id).await;

    let (status, body) = app.post(&owner, &format!("/applications/{a1}/accept"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"]["status"], "accepted");
    assert_eq!(body["listing"]["status"], "in_progress");
    assert_eq!(body["rejectedCompetitors"], 1);

    let (_, applications) = app.get(&owner, &format!("/listings/{listing_id}/applications")).await;
    let status_of = |id: uuid::Uuid| {
        applications.as_array().unwrap().iter().find(|a| common::id_of(a) == id).unwrap()["status"].clone()
    };
    assert_eq!(status_of(a1), "accepted");
    assert_eq!(status_of(a2), "rejected");

    // The rejected application no longer counts as a response.
    let (_, counts) = app.get(&owner, &format!("/listings/response-counts?ids={listing_id}")).await;
    assert_eq!(counts["counts"][listing_id.to_string()], 1);
}

#[tokio::test]
async fn test_accept_keeps_competitors_when_disabled() {
    let mut config = common::get_test_config();
    config.matching.reject_competing_applications = false;
    let app = common::TestApp::spawn_with_config(config).await;

    let owner = app.user("Ana").await;
    let x = app.user("Xavi").await;
    let y = app.user("Yara").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;
    let a1 = app.apply(&x, listing_id).await;
    let a2 = app.apply(&y, listing_id).await;

    let (status, body) = app.post(&owner, &format!("/applications/{a1}/accept"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rejectedCompetitors"], 0);

    // The listing is no longer open, so the remaining application cannot win.
    let (status, _) = app.post(&owner, &format!("/applications/{a2}/accept"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_concurrent_accepts_have_exactly_one_winner() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;

    let mut application_ids = Vec::new();
    for i in 0..6 {
        let applicant = app.user(&format!("Applicant {i}")).await;
        application_ids.push(app.apply(&applicant, listing_id).await);
    }

    let paths: Vec<String> = application_ids.iter().map(|id| format!("/applications/{id}/accept")).collect();
    let results = join_all(paths.iter().map(|path| app.post(&owner, path, json!({})))).await;

    let winners = results.iter().filter(|(status, _)| *status == StatusCode::OK).count();
    let conflicts = results.iter().filter(|(status, _)| *status == StatusCode::CONFLICT).count();
    assert_eq!(winners, 1);
    assert_eq!(conflicts, application_ids.len() - 1);

    let accepted: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE listing_id = $1 AND status = 'accepted'")
            .bind(listing_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(accepted, 1);

    let (_, listing) = app.get(&owner, &format!("/listings/{listing_id}")).await;
    assert_eq!(listing["status"], "in_progress");
}

#[tokio::test]
async fn test_only_owner_can_accept_or_reject() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let applicant = app.user("Ben").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;
    let application_id = app.apply(&applicant, listing_id).await;

    let (status, _) = app.post(&applicant, &format!("/applications/{application_id}/accept"), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post(&applicant, &format!("/applications/{application_id}/reject"), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&applicant, &format!("/listings/{listing_id}/applications")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reject_is_single_shot_and_leaves_listing_open() {
    let app = common::TestApp::spawn().await;
    let owner = app.user("Ana").await;
    let applicant = app.user("Ben").await;
    let listing_id = app.create_listing(&owner, "Guitar lessons").await;
    let application_id = app.apply(&applicant, listing_id).await;

    let (status, body) = app.post(&owner, &format!("/applications/{application_id}/reject"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let (status, _) = app.post(&owner, &format!("/applications/{application_id}/reject"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, listing) = app.get(&owner, &format!("/listings/{listing_id}")).await;
    assert_eq!(listing["status"], "open");

    // A rejected applicant may try again.
    app.apply(&applicant, listing_id).await;
}
