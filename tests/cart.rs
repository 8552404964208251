mod common;

use common::{auth_headers, create_product, make_seller, register_and_login, spawn_app};
use reqwest::{Client, StatusCode};
use serde_json::json;

async fn get_cart_items(
    client: &Client,
    base_url: &str,
    token: &str,
) -> (Vec<serde_json::Value>, f64) {
    let response = client
        .get(format!("{}/api/cart", base_url))
        .headers(auth_headers(token))
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    let items = body["items"]
        .as_array()
        .expect("Cart items is not an array")
        .clone();
    let total = body["total"].as_f64().expect("Cart total is not a number");
    (items, total)
}

#[tokio::test]
async fn test_repeat_add_merges_into_one_row() {
    let app = spawn_app().await;
    let client = Client::new();

    let seller_token = make_seller(&client, &app.base_url, "seller@example.com", "Muzion15pass").await;
    let product_id = create_product(&client, &app.base_url, &seller_token, "Bagel", 3.5, 100).await;

    let buyer_token =
        register_and_login(&client, &app.base_url, "buyer@example.com", "Muzion15pass").await;

    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"product_id": product_id, "quantity": 1}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"product_id": product_id, "quantity": 2}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::OK);

    let (items, total) = get_cart_items(&client, &app.base_url, &buyer_token).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"].as_i64(), Some(3));
    assert!((total - 10.5).abs() < 0.001);
}

#[tokio::test]
async fn test_variants_get_their_own_rows() {
    let app = spawn_app().await;
    let client = Client::new();

    let seller_token = make_seller(&client, &app.base_url, "seller@example.com", "Muzion15pass").await;
    let product_id =
        create_product(&client, &app.base_url, &seller_token, "T-Shirt", 12.0, 100).await;

    let buyer_token =
        register_and_login(&client, &app.base_url, "buyer@example.com", "Muzion15pass").await;

    for size in ["M", "L"] {
        let response = client
            .post(format!("{}/api/cart", app.base_url))
            .headers(auth_headers(&buyer_token))
            .json(&json!({"product_id": product_id, "quantity": 1, "size": size}))
            .send()
            .await
            .expect("Failed to send add product request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    //Same size again merges instead of adding a third row.
    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"product_id": product_id, "quantity": 1, "size": "M"}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::OK);

    let (items, _) = get_cart_items(&client, &app.base_url, &buyer_token).await;
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_add_missing_product() {
    let app = spawn_app().await;
    let client = Client::new();

    let buyer_token =
        register_and_login(&client, &app.base_url, "buyer@example.com", "Muzion15pass").await;

    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"product_id": 9999, "quantity": 1}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_rejects_non_positive_quantity() {
    let app = spawn_app().await;
    let client = Client::new();

    let seller_token = make_seller(&client, &app.base_url, "seller@example.com", "Muzion15pass").await;
    let product_id = create_product(&client, &app.base_url, &seller_token, "Bagel", 3.5, 100).await;

    let buyer_token =
        register_and_login(&client, &app.base_url, "buyer@example.com", "Muzion15pass").await;

    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"product_id": product_id, "quantity": 0}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_and_zero_deletes_entry() {
    let app = spawn_app().await;
    let client = Client::new();

    let seller_token = make_seller(&client, &app.base_url, "seller@example.com", "Muzion15pass").await;
    let product_id = create_product(&client, &app.base_url, &seller_token, "Bagel", 3.5, 100).await;

    let buyer_token =
        register_and_login(&client, &app.base_url, "buyer@example.com", "Muzion15pass").await;

    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"product_id": product_id, "quantity": 1}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let (items, _) = get_cart_items(&client, &app.base_url, &buyer_token).await;
    let entry_id = items[0]["id"].as_i64().expect("Cart entry id missing");

    let response = client
        .patch(format!("{}/api/cart/items/{}", app.base_url, entry_id))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"quantity": 5}))
        .send()
        .await
        .expect("Failed to send patch cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let (items, _) = get_cart_items(&client, &app.base_url, &buyer_token).await;
    assert_eq!(items[0]["quantity"].as_i64(), Some(5));

    //Quantity zero drops the row entirely.
    let response = client
        .patch(format!("{}/api/cart/items/{}", app.base_url, entry_id))
        .headers(auth_headers(&buyer_token))
        .json(&json!({"quantity": 0}))
        .send()
        .await
        .expect("Failed to send patch cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let (items, _) = get_cart_items(&client, &app.base_url, &buyer_token).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_cannot_touch_someone_elses_cart_entry() {
    let app = spawn_app().await;
    let client = Client::new();

    let seller_token = make_seller(&client, &app.base_url, "seller@example.com", "Muzion15pass").await;
    let product_id = create_product(&client, &app.base_url, &seller_token, "Bagel", 3.5, 100).await;

    let owner_token =
        register_and_login(&client, &app.base_url, "owner@example.com", "Muzion15pass").await;
    let intruder_token =
        register_and_login(&client, &app.base_url, "intruder@example.com", "Muzion15pass").await;

    let response = client
        .post(format!("{}/api/cart", app.base_url))
        .headers(auth_headers(&owner_token))
        .json(&json!({"product_id": product_id, "quantity": 1}))
        .send()
        .await
        .expect("Failed to send add product request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let (items, _) = get_cart_items(&client, &app.base_url, &owner_token).await;
    let entry_id = items[0]["id"].as_i64().expect("Cart entry id missing");

    let response = client
        .delete(format!("{}/api/cart/items/{}", app.base_url, entry_id))
        .headers(auth_headers(&intruder_token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
