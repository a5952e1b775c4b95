//! Route-level tests exercising the guards and the error envelope

use axum::{body::Body, Router};
use barkeep::{
    auth::{Authority, Jwt},
    routes::{self, AppState},
    store::DrinkStore,
};
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

mod common;

use common::{authority_with, claims_with_permissions, good_claims, TestKey};

fn app(authority: Authority) -> (Router, DrinkStore) {
    let store = DrinkStore::with_seed_data();
    let router = routes::router(AppState {
        authority,
        store: store.clone(),
    });

    (router, store)
}

fn bearer(token: &Jwt) -> String {
    format!("Bearer {}", token.as_str())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn drinks_are_public_and_short() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));

    let response = app
        .oneshot(Request::get("/drinks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["drinks"][0]["title"], "water");
    assert_eq!(body["drinks"][0]["recipe"][0]["color"], "blue");
    assert!(body["drinks"][0]["recipe"][0].get("name").is_none());
}

#[tokio::test]
async fn drink_details_require_a_token() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));

    let response = app
        .oneshot(Request::get("/drinks-detail").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "error": 401,
            "message": "authorization header is expected",
        })
    );
}

#[tokio::test]
async fn drink_details_reject_malformed_headers() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));

    let response = app
        .oneshot(
            Request::get("/drinks-detail")
                .header(header::AUTHORIZATION, "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], 401);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn drink_details_show_the_full_recipe() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["get:drinks-detail"]));

    let response = app
        .oneshot(
            Request::get("/drinks-detail")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "water");
}

#[tokio::test]
async fn missing_permission_is_forbidden() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["post:drinks"]));

    let response = app
        .oneshot(
            Request::get("/drinks-detail")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "error": 403,
            "message": "permission not granted",
        })
    );
}

#[tokio::test]
async fn missing_permissions_claim_is_forbidden() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));
    let token = key.sign(&good_claims());

    let response = app
        .oneshot(
            Request::get("/drinks-detail")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "permissions claim is missing from token");
}

#[tokio::test]
async fn creating_a_drink_requires_and_honors_the_permission() {
    let key = TestKey::generate("key-1");
    let (app, store) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["post:drinks"]));

    let new_drink = serde_json::json!({
        "title": "matcha latte",
        "recipe": [
            {"name": "matcha", "color": "green", "parts": 1},
            {"name": "milk", "color": "white", "parts": 3},
        ],
    });

    let response = app
        .oneshot(
            Request::post("/drinks")
                .header(header::AUTHORIZATION, bearer(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(new_drink.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["drinks"][0]["id"], 2);
    assert_eq!(body["drinks"][0]["title"], "matcha latte");

    assert_eq!(store.list().len(), 2);
}

#[tokio::test]
async fn creating_a_drink_rejects_unusable_bodies() {
    let key = TestKey::generate("key-1");
    let (app, store) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["post:drinks"]));

    let response = app
        .oneshot(
            Request::post("/drinks")
                .header(header::AUTHORIZATION, bearer(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": 7}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "error": 422,
            "message": "unprocessable",
        })
    );
    assert_eq!(store.list().len(), 1);
}

#[tokio::test]
async fn patching_a_drink_is_partial() {
    let key = TestKey::generate("key-1");
    let (app, store) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["patch:drinks"]));

    let response = app
        .oneshot(
            Request::patch("/drinks/1")
                .header(header::AUTHORIZATION, bearer(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": "sparkling water"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["drinks"][0]["title"], "sparkling water");
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "water");

    assert_eq!(store.get(1).unwrap().title, "sparkling water");
}

#[tokio::test]
async fn patching_a_missing_drink_is_not_found() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["patch:drinks"]));

    let response = app
        .oneshot(
            Request::patch("/drinks/999")
                .header(header::AUTHORIZATION, bearer(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": "ghost"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "error": 404,
            "message": "resource not found",
        })
    );
}

#[tokio::test]
async fn deleting_a_drink_returns_its_id() {
    let key = TestKey::generate("key-1");
    let (app, store) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["delete:drinks"]));

    let response = app
        .clone()
        .oneshot(
            Request::delete("/drinks/1")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({"success": true, "delete": 1}));
    assert!(store.list().is_empty());

    // Deleting it again is a 404, not a silent success.
    let response = app
        .oneshot(
            Request::delete("/drinks/1")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutations_reject_tokens_lacking_the_matching_permission() {
    let key = TestKey::generate("key-1");
    let (app, store) = app(authority_with(&[&key]));
    let token = key.sign(&claims_with_permissions(&["get:drinks-detail"]));

    let response = app
        .oneshot(
            Request::delete("/drinks/1")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.list().len(), 1);
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let key = TestKey::generate("key-1");
    let (app, _) = app(authority_with(&[&key]));

    let response = app
        .oneshot(Request::get("/espresso").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 404);
}
