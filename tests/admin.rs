mod common;

use common::{
    admin_login, auth_headers, create_product, make_seller, register_and_login, spawn_app,
};
use reqwest::{Client, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_stats_counts_and_delivered_revenue() {
    let app = spawn_app().await;
    let client = Client::new();

    let seller_token = make_seller(&client, &app.base_url, "seller@example.com", "Muzion15pass").await;
    let product_id = create_product(&client, &app.base_url, &seller_token, "Bagel", 3.5, 10).await;

    let buyer_token =
        register_and_login(&client, &app.base_url, "buyer@example.com", "Muzion15pass").await;
    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"product_id": product_id, "quantity": 2}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/orders", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"shipping_address": "1 Test Lane"}))
        .send()
        .await
        .expect("Failed to send place order request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse order JSON")["order_id"]
        .as_i64()
        .expect("order_id missing");

    let admin_token = admin_login(&client, &app.base_url).await;

    //Revenue only counts delivered orders, so it starts at zero.
    let response = client
        .get(format!("{}/api/admin/stats", app.base_url))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send stats request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse stats JSON");
    assert_eq!(body["users"]["admins"].as_u64(), Some(1));
    assert_eq!(body["users"]["sellers"].as_u64(), Some(1));
    assert_eq!(body["users"]["buyers"].as_u64(), Some(1));
    assert_eq!(body["products"].as_u64(), Some(1));
    assert_eq!(body["orders"].as_u64(), Some(1));
    assert!((body["revenue"].as_f64().unwrap() - 0.0).abs() < 0.001);

    let response = client
        .patch(format!("{}/api/admin/orders/{}", app.base_url, order_id))
        .headers(auth_headers(&admin_token))
        .json(&json!({"status": "delivered"}))
        .send()
        .await
        .expect("Failed to send patch order request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/admin/stats", app.base_url))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send stats request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse stats JSON");
    assert!((body["revenue"].as_f64().unwrap() - 7.0).abs() < 0.001);
}

#[tokio::test]
async fn test_admin_user_listing_and_filters() {
    let app = spawn_app().await;
    let client = Client::new();

    register_and_login(&client, &app.base_url, "first@example.com", "Muzion15pass").await;
    register_and_login(&client, &app.base_url, "second@example.com", "Muzion15pass").await;

    let admin_token = admin_login(&client, &app.base_url).await;

    let response = client
        .get(format!("{}/api/admin/users", app.base_url))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send users request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse users JSON");
    assert_eq!(body.as_array().unwrap().len(), 3);

    let response = client
        .get(format!("{}/api/admin/users?role=buyer", app.base_url))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send users request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse users JSON");
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = client
        .get(format!("{}/api/admin/users?query=first", app.base_url))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send users request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse users JSON");
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"].as_str(), Some("first@example.com"));
}

#[tokio::test]
async fn test_admin_can_patch_role_directly() {
    let app = spawn_app().await;
    let client = Client::new();

    register_and_login(&client, &app.base_url, "lucky@example.com", "Muzion15pass").await;
    let admin_token = admin_login(&client, &app.base_url).await;

    let response = client
        .get(format!("{}/api/admin/users?query=lucky", app.base_url))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send users request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse users JSON");
    let user_id = body.as_array().unwrap()[0]["id"].as_i64().expect("id missing");

    let response = client
        .patch(format!("{}/api/admin/users/{}", app.base_url, user_id))
        .headers(auth_headers(&admin_token))
        .json(&json!({"role": "seller"}))
        .send()
        .await
        .expect("Failed to send patch user request");
    assert_eq!(response.status(), StatusCode::OK);

    let token = common::login(&client, &app.base_url, "lucky@example.com", "Muzion15pass").await;
    let response = client
        .get(format!("{}/api/profile", app.base_url))
        .headers(auth_headers(&token))
        .send()
        .await
        .expect("Failed to send profile request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse profile JSON");
    assert_eq!(body["role"].as_str(), Some("seller"));
}

#[tokio::test]
async fn test_admin_delete_user() {
    let app = spawn_app().await;
    let client = Client::new();

    register_and_login(&client, &app.base_url, "leaving@example.com", "Muzion15pass").await;
    let admin_token = admin_login(&client, &app.base_url).await;

    let response = client
        .get(format!("{}/api/admin/users?query=leaving", app.base_url))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send users request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse users JSON");
    let user_id = body.as_array().unwrap()[0]["id"].as_i64().expect("id missing");

    let response = client
        .delete(format!("{}/api/admin/users/{}", app.base_url, user_id))
        .headers(auth_headers(&admin_token))
        .send()
        .await
        .expect("Failed to send delete user request");
    assert_eq!(response.status(), StatusCode::OK);

    //Deleted users cannot log in anymore.
    let response = client
        .post(format!("{}/api/auth/login", app.base_url))
        .json(&json!({
            "email": "leaving@example.com",
            "password": "Muzion15pass"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_create_user_with_role() {
    let app = spawn_app().await;
    let client = Client::new();

    let admin_token = admin_login(&client, &app.base_url).await;

    let response = client
        .post(format!("{}/api/admin/users", app.base_url))
        .headers(auth_headers(&admin_token))
        .json(&json!({
            "email": "staff@example.com",
            "name": "Staff Seller",
            "password": "Muzion15pass",
            "role": "seller"
        }))
        .send()
        .await
        .expect("Failed to send create user request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let token = common::login(&client, &app.base_url, "staff@example.com", "Muzion15pass").await;
    let response = client
        .get(format!("{}/api/profile", app.base_url))
        .headers(auth_headers(&token))
        .send()
        .await
        .expect("Failed to send profile request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse profile JSON");
    assert_eq!(body["role"].as_str(), Some("seller"));
}
