use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::entities::{
    cart_item::{self, Entity as CartEntity},
    order::{self, Entity as OrderEntity},
    order_item::{self, Entity as OrderItemEntity},
    product::{self, Entity as ProductEntity},
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn orders_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/orders", get(get_orders).post(place_order))
        .route("/orders/:id", get(get_order))
        .layer(Extension(db))
}

//ROUTES
//The whole checkout is one transaction: stock checks and decrements, the
//order row, its line snapshots and the cart clearing land together or not
//at all.
async fn place_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PlaceOrder>,
) -> impl IntoResponse {
    let user_id = claims.user_id;

    if payload.shipping_address.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Shipping address is required"
            })),
        );
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    let entries = match CartEntity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .all(&txn)
        .await
    {
        Ok(entries) => entries,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    };

    if entries.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Cart is empty"
            })),
        );
    }

    let mut total: f32 = 0.0;
    let mut lines: Vec<order_item::ActiveModel> = Vec::with_capacity(entries.len());

    for entry in &entries {
        let product = match ProductEntity::find_by_id(entry.product_id).one(&txn).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": format!("Product {} is no longer available", entry.product_id)
                    })),
                );
            }
            Err(_) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error."
                    })),
                );
            }
        };

        //Stock may never go negative, so a short cart line kills the whole
        //checkout before anything is written.
        if product.stock < entry.quantity {
            let _ = txn.rollback().await;
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": format!("Not enough stock for '{}'", product.name)
                })),
            );
        }

        let product_name = product.name.clone();
        let new_stock = product.stock - entry.quantity;
        let mut product: product::ActiveModel = product.into();
        product.stock = Set(new_stock);
        if product.update(&txn).await.is_err() {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }

        //Line items keep the price captured when the entry went into the
        //cart, not the current catalog price.
        total += entry.price * entry.quantity as f32;
        lines.push(order_item::ActiveModel {
            product_id: Set(Some(entry.product_id)),
            product_name: Set(product_name),
            quantity: Set(entry.quantity),
            price: Set(entry.price),
            ..Default::default()
        });
    }

    let new_order = order::ActiveModel {
        user_id: Set(user_id),
        total: Set(total),
        status: Set(order::Status::Created),
        shipping_address: Set(payload.shipping_address),
        payment_method: Set(payload.payment_method.unwrap_or_else(|| "cod".to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let order_id = match OrderEntity::insert(new_order).exec(&txn).await {
        Ok(result) => result.last_insert_id,
        Err(err) => {
            debug!(error = %err, "Failed to insert order");
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    };

    for mut line in lines {
        line.order_id = Set(order_id);
        if OrderItemEntity::insert(line).exec(&txn).await.is_err() {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    }

    if CartEntity::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(&txn)
        .await
        .is_err()
    {
        let _ = txn.rollback().await;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        );
    }

    match txn.commit().await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Order placed successfully",
                "order_id": order_id,
                "total": total
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        ),
    }
}

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    match OrderEntity::find()
        .filter(order::Column::UserId.eq(claims.user_id))
        .order_by_desc(order::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let order = match OrderEntity::find_by_id(id)
        .filter(order::Column::UserId.eq(claims.user_id))
        .one(&*db)
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No order with {} id was found.", id)
                })),
            )
                .into_response();
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    match OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(&*db)
        .await
    {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "order": order,
                "items": items
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

//Structs
#[derive(Deserialize, Debug)]
struct PlaceOrder {
    shipping_address: String,
    payment_method: Option<String>,
}
