use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::{cart_item, cart_item::Entity as CartEntity, product};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_product))
        .route("/cart/items/:id", patch(patch_entry).delete(remove_product))
        .layer(Extension(db))
}

//A row is matched by the whole variant key, not just the product.
fn entry_condition(user_id: i32, product_id: i32, size: &Option<String>, color: &Option<String>) -> Condition {
    let mut condition = Condition::all()
        .add(cart_item::Column::UserId.eq(user_id))
        .add(cart_item::Column::ProductId.eq(product_id));

    condition = match size {
        Some(size) => condition.add(cart_item::Column::Size.eq(size.clone())),
        None => condition.add(cart_item::Column::Size.is_null()),
    };
    condition = match color {
        Some(color) => condition.add(cart_item::Column::Color.eq(color.clone())),
        None => condition.add(cart_item::Column::Color.is_null()),
    };

    condition
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let user_id = claims.user_id;
    match CartEntity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .all(&*db)
        .await
    {
        Ok(entries) => {
            let total: f32 = entries
                .iter()
                .map(|entry| entry.price * entry.quantity as f32)
                .sum();
            (
                StatusCode::OK,
                Json(json!({
                    "items": entries,
                    "total": total
                })),
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddProduct>,
) -> impl IntoResponse {
    let user_id = claims.user_id;

    if payload.quantity <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Quantity should be greater than 0"
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

    let product = match product::Entity::find_by_id(payload.product_id)
        .one(&txn)
        .await
    {
        Ok(Some(product)) => product,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No product with {} id was found", payload.product_id)
                })),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    };

    //A matching row gets its quantity bumped instead of a duplicate insert.
    if let Ok(Some(entry)) = CartEntity::find()
        .filter(entry_condition(
            user_id,
            payload.product_id,
            &payload.size,
            &payload.color,
        ))
        .one(&txn)
        .await
    {
        let mut entry: cart_item::ActiveModel = entry.into();
        entry.quantity = Set(entry.quantity.unwrap() + payload.quantity);
        let result = entry.update(&txn).await.map(|_| ());
        return match result {
            Ok(_) => {
                let _ = txn.commit().await;
                (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Resource patched successfully"
                    })),
                )
            }
            Err(_) => {
                let _ = txn.rollback().await;
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Failed to patch this resource"
                    })),
                )
            }
        };
    }

    let new_entry = cart_item::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(payload.product_id),
        quantity: Set(payload.quantity),
        size: Set(payload.size),
        color: Set(payload.color),
        //Price is captured now; later catalog edits do not touch the cart.
        price: Set(product.price),
        ..Default::default()
    };
    match CartEntity::insert(new_entry).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Added successfully"
                })),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
        },
        Err(_) => {
            let _ = txn.rollback().await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
        }
    }
}

async fn remove_product(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let user_id = claims.user_id;
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

    match CartEntity::find_by_id(id)
        .filter(cart_item::Column::UserId.eq(user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let entry: cart_item::ActiveModel = entry.into();
            let result = entry.delete(&txn).await;
            match result {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource deleted successfully"
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to delete this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No related entry with {} id was found.", id)
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

async fn patch_entry(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCart>,
) -> impl IntoResponse {
    let user_id = claims.user_id;

    if payload.quantity < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Quantity should not be negative"
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

    match CartEntity::find_by_id(id)
        .filter(cart_item::Column::UserId.eq(user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let mut entry: cart_item::ActiveModel = entry.into();

            let result: Result<(), DbErr> = match payload.quantity {
                //Zero empties the row out of the cart entirely.
                0 => entry.delete(&txn).await.map(|_| ()),
                _ => {
                    entry.quantity = Set(payload.quantity);
                    entry.update(&txn).await.map(|_| ())
                }
            };
            match result {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully"
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to patch this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No related entry with {} id was found.", id)
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

//Structs
#[derive(Deserialize, Debug)]
struct AddProduct {
    product_id: i32,
    quantity: i32,
    size: Option<String>,
    color: Option<String>,
}

#[derive(Deserialize)]
struct PatchCart {
    quantity: i32,
}
