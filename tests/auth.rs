mod common;

use common::{auth_headers, register_and_login, spawn_app};
use reqwest::{Client, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_register_user() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/auth/register", app.base_url))
        .json(&json!({
            "email": "john@example.com",
            "name": "John Doe",
            "password": "Muzion15pass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(
        body["message"].as_str(),
        Some("User registered successfully")
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = spawn_app().await;
    let client = Client::new();

    let payload = json!({
        "email": "dup@example.com",
        "name": "First",
        "password": "Muzion15pass"
    });

    let response = client
        .post(format!("{}/api/auth/register", app.base_url))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/auth/register", app.base_url))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_bad_payloads() {
    let app = spawn_app().await;
    let client = Client::new();

    //Not an email
    let response = client
        .post(format!("{}/api/auth/register", app.base_url))
        .json(&json!({
            "email": "not-an-email",
            "name": "John",
            "password": "Muzion15pass"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    //Password too short
    let response = client
        .post(format!("{}/api/auth/register", app.base_url))
        .json(&json!({
            "email": "short@example.com",
            "name": "John",
            "password": "abc"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_profile() {
    let app = spawn_app().await;
    let client = Client::new();

    let token = register_and_login(&client, &app.base_url, "jane@example.com", "Muzion15pass").await;

    let response = client
        .get(format!("{}/api/profile", app.base_url))
        .headers(auth_headers(&token))
        .send()
        .await
        .expect("Failed to send profile request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse profile JSON");
    assert_eq!(body["email"].as_str(), Some("jane@example.com"));
    //Everyone registers as a buyer.
    assert_eq!(body["role"].as_str(), Some("buyer"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = spawn_app().await;
    let client = Client::new();

    register_and_login(&client, &app.base_url, "jack@example.com", "Muzion15pass").await;

    let response = client
        .post(format!("{}/api/auth/login", app.base_url))
        .json(&json!({
            "email": "jack@example.com",
            "password": "wrong-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/cart", app.base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/api/cart", app.base_url))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_buyer_cannot_reach_admin_routes() {
    let app = spawn_app().await;
    let client = Client::new();

    let token = register_and_login(&client, &app.base_url, "mallory@example.com", "Muzion15pass").await;

    let response = client
        .get(format!("{}/api/admin/stats", app.base_url))
        .headers(auth_headers(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
