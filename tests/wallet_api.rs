mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::{json, Value};
use wallet_registry::Settings;

const UNKNOWN_ID: &str = "00000000-0000-4000-8000-000000000000";

#[tokio::test]
async fn create_returns_201_with_normalized_address() {
    let app = test_app();
    let (status, body) = post(
        &app,
        "/wallets",
        json!({ "address": "0x742d35Cc6634C0532925a3b844Bc454e4438f44e", "score": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["address"], "0x742d35cc6634c0532925a3b844bc454e4438f44e");
    assert_eq!(body["score"], 5);
    assert_eq!(body["is_active"], true);
    assert_eq!(body["created_at"], body["last_updated"]);
    assert!(body["id"].as_str().is_some());
}

#[tokio::test]
async fn duplicate_address_is_400_conflict() {
    let app = test_app();
    create_wallet(&app, &address(1), 5, true).await;
    let (status, body) = post(&app, "/wallets", json!({ "address": address(1), "score": 2 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "conflict");
}

#[tokio::test]
async fn invalid_address_is_400() {
    let app = test_app();
    let (status, body) = post(&app, "/wallets", json!({ "address": "0x123", "score": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_format");
}

#[tokio::test]
async fn score_out_of_range_is_422() {
    let app = test_app();
    let (status, body) = post(&app, "/wallets", json!({ "address": address(1), "score": 11 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "out_of_range");
    let (_, count) = get(&app, "/wallets/count").await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn malformed_json_is_400_bad_request() {
    let app = test_app();
    let (status, body) = post(&app, "/wallets", json!({ "score": 3 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "bad_request");
}

fn small_body_app() -> axum::Router {
    test_app_with(&Settings {
        body_limit: 256,
        ..Settings::memory()
    })
}

fn oversized_batch() -> String {
    let batch: Vec<Value> = (0..20).map(|i| json!({ "address": address(i), "score": 1 })).collect();
    Value::Array(batch).to_string()
}

#[tokio::test]
async fn body_over_limit_is_413() {
    let app = small_body_app();
    let body = oversized_batch();
    assert!(body.len() > 256);

    let (status, _) = post_raw(&app, "/wallets/bulk", body.clone(), true).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, err) = post_raw(&app, "/wallets/bulk", body, false).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_code(&err), "payload_too_large");

    let (_, count) = get(&app, "/wallets/count").await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn body_under_limit_passes_through() {
    let app = small_body_app();
    let body = json!({ "address": address(1), "score": 3 }).to_string();
    let (status, _) = post_raw(&app, "/wallets", body, true).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let app = test_app();
    let (status, body) = get(&app, &format!("/wallets/{}", UNKNOWN_ID)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");

    let (status, body) = get(&app, "/wallets/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_format");

    let (status, _) = send(&app, Method::DELETE, &format!("/wallets/{}", UNKNOWN_ID), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_then_delete() {
    let app = test_app();
    let created = create_wallet(&app, &address(7), 5, true).await;
    let id = created["id"].as_str().unwrap().to_string();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/wallets/{}", id),
        Some(json!({ "score": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["score"], 9);
    assert_eq!(updated["is_active"], true);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_ne!(updated["last_updated"], created["last_updated"]);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/wallets/{}", id),
        Some(json!({ "score": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, deleted) = send(&app, Method::DELETE, &format!("/wallets/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted_wallet"]["score"], 9);
    assert!(deleted["message"].as_str().is_some());

    let (status, _) = get(&app, &format!("/wallets/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_over_limit_persists_nothing() {
    let app = test_app();
    let batch: Vec<Value> = (0..101).map(|i| json!({ "address": address(i), "score": 1 })).collect();
    let (status, body) = post(&app, "/wallets/bulk", Value::Array(batch)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "batch_too_large");
    let (_, count) = get(&app, "/wallets/count").await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn bulk_is_all_or_nothing() {
    let app = test_app();
    create_wallet(&app, &address(3), 2, true).await;
    let batch: Vec<Value> = (1..=5).map(|i| json!({ "address": address(i), "score": 4 })).collect();
    let (status, body) = post(&app, "/wallets/bulk", Value::Array(batch)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "conflict");
    let (_, count) = get(&app, "/wallets/count").await;
    assert_eq!(count["count"], 1);
}

#[tokio::test]
async fn bulk_returns_201_with_ids_in_order() {
    let app = test_app();
    let batch: Vec<Value> = (1..=3).map(|i| json!({ "address": address(i), "score": i })).collect();
    let (status, body) = post(&app, "/wallets/bulk", Value::Array(batch)).await;
    assert_eq!(status, StatusCode::CREATED);
    let ids = body["inserted_ids"].as_array().unwrap();
    assert_eq!(ids.len(), 3);
    for (i, id) in ids.iter().enumerate() {
        let (_, wallet) = get(&app, &format!("/wallets/{}", id.as_str().unwrap())).await;
        assert_eq!(wallet["address"], address(i as u32 + 1));
    }
}

#[tokio::test]
async fn list_filters_sorts_and_pages() {
    let app = test_app();
    for (i, (score, active)) in [(7, true), (9, true), (6, false), (2, true), (6, true)].iter().enumerate() {
        create_wallet(&app, &address(i as u32 + 1), *score, *active).await;
    }

    let (status, body) = get(&app, "/wallets?active_only=true&min_score=6&sort_by=score&sort_order=1").await;
    assert_eq!(status, StatusCode::OK);
    let scores: Vec<i64> = body.as_array().unwrap().iter().map(|w| w["score"].as_i64().unwrap()).collect();
    assert_eq!(scores, vec![6, 7, 9]);

    let (_, body) = get(&app, "/wallets?sort_by=score&sort_order=-1&limit=2&offset=1").await;
    let scores: Vec<i64> = body.as_array().unwrap().iter().map(|w| w["score"].as_i64().unwrap()).collect();
    assert_eq!(scores, vec![7, 6]);

    let (_, body) = get(&app, "/wallets?min_score=8&max_score=3").await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = get(&app, "/wallets?limit=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "out_of_range");

    let (status, _) = get(&app, "/wallets?sort_order=2").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = get(&app, "/wallets?sort_by=nonsense").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn count_honours_filter() {
    let app = test_app();
    create_wallet(&app, &address(1), 8, true).await;
    create_wallet(&app, &address(2), 8, false).await;
    create_wallet(&app, &address(3), 1, true).await;

    let (_, all) = get(&app, "/wallets/count").await;
    assert_eq!(all["count"], 3);
    let (_, filtered) = get(&app, "/wallets/count?active_only=true&min_score=5").await;
    assert_eq!(filtered["count"], 1);
}

#[tokio::test]
async fn search_by_address() {
    let app = test_app();
    let created = create_wallet(&app, &address(0xabc), 4, true).await;
    let upper = address(0xabc).to_uppercase().replacen("0X", "0x", 1);

    let (status, body) = get(&app, &format!("/wallets/search/by-address?address={}", upper)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    let (status, _) = get(&app, &format!("/wallets/search/by-address?address={}", address(1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/wallets/search/by-address?address=0xabc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_format");

    let (status, _) = get(&app, "/wallets/search/by-address").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn service_endpoints() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "database": "memory" }));

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "wallet-registry");
    assert_eq!(body["database"], "memory");

    let (status, body) = get(&app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/wallets/{id}"].is_object());
    assert!(body["paths"]["/wallets/bulk"]["post"].is_object());
}
