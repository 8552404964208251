#![allow(dead_code)]

use reqwest::{header, Client, StatusCode};
use sea_orm::Database;
use serde_json::json;
use std::sync::Arc;
use tempfile::NamedTempFile;

use rust_lavka::entities::{SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD};
use rust_lavka::{create_api_router, primary_setup, setup_schema};

pub struct TestApp {
    pub base_url: String,
    //Keeps the sqlite file alive for the duration of the test.
    _db_file: NamedTempFile,
}

//Spawns the whole router on an ephemeral port against a throwaway sqlite
//database, seeded the same way the server binary seeds itself.
pub async fn spawn_app() -> TestApp {
    std::env::set_var("SECRET", "integration-test-secret");

    let db_file = NamedTempFile::new().expect("Failed to create temp db file");
    let database_url = format!("sqlite://{}?mode=rwc", db_file.path().display());

    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    setup_schema(&db).await;

    let shared_db = Arc::new(db);
    primary_setup(shared_db.clone()).await;

    let app = create_api_router(shared_db);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    TestApp {
        base_url: format!("http://{}", addr),
        _db_file: db_file,
    }
}

pub fn auth_headers(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Failed to create Authorization header"),
    );
    headers
}

pub async fn login(client: &Client, base_url: &str, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login response JSON");
    body["token"]
        .as_str()
        .expect("Token not found in login response")
        .to_string()
}

pub async fn register_and_login(
    client: &Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> String {
    let response = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({
            "email": email,
            "name": "Test User",
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CREATED);

    login(client, base_url, email, password).await
}

pub async fn admin_login(client: &Client, base_url: &str) -> String {
    login(client, base_url, SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD).await
}

//Walks a fresh buyer through the whole promotion pipeline and returns a
//seller token.
pub async fn make_seller(client: &Client, base_url: &str, email: &str, password: &str) -> String {
    let buyer_token = register_and_login(client, base_url, email, password).await;

    let response = client
        .post(format!("{}/api/seller-application", base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({
            "message": format!("application from {}", email)
        }))
        .send()
        .await
        .expect("Failed to send application request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let admin_token = admin_login(client, base_url).await;
    let application_id = find_application_id(client, base_url, &admin_token, email).await;

    let response = client
        .post(format!(
            "{}/api/admin/seller-applications/{}/review",
            base_url, application_id
        ))
        .headers(auth_headers(&admin_token))
        .json(&json!({
            "action": "approve"
        }))
        .send()
        .await
        .expect("Failed to send review request");
    assert_eq!(response.status(), StatusCode::OK);

    //The old token carries the buyer role and is stale now.
    login(client, base_url, email, password).await
}

pub async fn find_application_id(
    client: &Client,
    base_url: &str,
    admin_token: &str,
    applicant_email: &str,
) -> i64 {
    let response = client
        .get(format!(
            "{}/api/admin/seller-applications?status=pending",
            base_url
        ))
        .headers(auth_headers(admin_token))
        .send()
        .await
        .expect("Failed to list applications");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse applications JSON");
    let marker = format!("application from {}", applicant_email);
    body.as_array()
        .expect("Applications response is not an array")
        .iter()
        .find(|application| application["message"].as_str() == Some(marker.as_str()))
        .and_then(|application| application["id"].as_i64())
        .expect("Application not found")
}

pub async fn create_product(
    client: &Client,
    base_url: &str,
    seller_token: &str,
    name: &str,
    price: f32,
    stock: i32,
) -> i64 {
    let response = client
        .post(format!("{}/api/seller/products", base_url))
        .headers(auth_headers(seller_token))
        .json(&json!({
            "name": name,
            "description": "A test product",
            "price": price,
            "category": "misc",
            "stock": stock
        }))
        .send()
        .await
        .expect("Failed to send create product request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse create product response JSON");
    body["product_id"]
        .as_i64()
        .expect("product_id not found in response")
}
