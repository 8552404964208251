use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::entities::{
    product::{self, Entity as ProductEntity},
    product_image::{self, Entity as ProductImageEntity},
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn seller_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", get(get_own_products).post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .layer(Extension(db))
}

//Sellers touch their own rows only, an admin passes for any row.
fn is_owner_or_admin(product: &product::Model, claims: &Claims) -> bool {
    product.seller_id == claims.user_id || claims.role == "admin"
}

//Images are replaced wholesale: drop every row, reinsert the new list in
//payload order.
async fn replace_images(
    txn: &DatabaseTransaction,
    product_id: i32,
    urls: &[String],
) -> Result<(), DbErr> {
    ProductImageEntity::delete_many()
        .filter(product_image::Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;

    for (position, url) in urls.iter().enumerate() {
        let new_image = product_image::ActiveModel {
            product_id: Set(product_id),
            url: Set(url.clone()),
            display_order: Set(position as i32),
            ..Default::default()
        };
        ProductImageEntity::insert(new_image).exec(txn).await?;
    }

    Ok(())
}

//ROUTES
async fn get_own_products(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let mut finder = ProductEntity::find();

    if claims.role != "admin" {
        finder = finder.filter(product::Column::SellerId.eq(claims.user_id));
    }

    match finder
        .order_by_desc(product::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateProduct>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() || payload.price < 0.0 || payload.stock < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid name, price or stock"
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

    let new_product = product::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category),
        stock: Set(payload.stock),
        seller_id: Set(claims.user_id),
        specification: Set(payload.specification),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let product_id = match ProductEntity::insert(new_product).exec(&txn).await {
        Ok(result) => result.last_insert_id,
        Err(err) => {
            debug!(error = %err, "Failed to insert product");
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    if let Some(images) = payload.images {
        if replace_images(&txn, product_id, &images).await.is_err() {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    }

    match txn.commit().await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Product created successfully",
                "product_id": product_id
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

async fn update_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProduct>,
) -> impl IntoResponse {
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

    let result = ProductEntity::find_by_id(id).one(&txn).await;
    match result {
        Ok(Some(model)) => {
            if !is_owner_or_admin(&model, &claims) {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "error": "You can only manage your own products"
                    })),
                );
            }

            let mut model: product::ActiveModel = model.into();

            if let Some(name) = payload.name {
                model.name = Set(name);
            }
            if let Some(description) = payload.description {
                model.description = Set(description);
            }
            if let Some(price) = payload.price {
                if price < 0.0 {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Price should not be negative"
                        })),
                    );
                }
                model.price = Set(price);
            }
            if let Some(category) = payload.category {
                model.category = Set(category);
            }
            if let Some(stock) = payload.stock {
                if stock < 0 {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Stock should not be negative"
                        })),
                    );
                }
                model.stock = Set(stock);
            }
            if let Some(specification) = payload.specification {
                model.specification = Set(Some(specification));
            }

            let result = model.update(&txn).await.map(|_| ());
            let result = match (result, payload.images) {
                (Ok(_), Some(images)) => replace_images(&txn, id, &images).await,
                (result, _) => result,
            };

            match result {
                Ok(_) => match txn.commit().await {
                    Ok(_) => (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully."
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
                "error": format!("No product with {} id was found.", id)
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

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
        }
    };

    let result = ProductEntity::find_by_id(id).one(&txn).await;
    match result {
        Ok(Some(model)) => {
            if !is_owner_or_admin(&model, &claims) {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "error": "You can only manage your own products"
                    })),
                );
            }

            //Child image rows go in the same transaction as the product.
            let result = ProductImageEntity::delete_many()
                .filter(product_image::Column::ProductId.eq(id))
                .exec(&txn)
                .await
                .map(|_| ());
            let result = match result {
                Ok(_) => {
                    let model: product::ActiveModel = model.into();
                    model.delete(&txn).await.map(|_| ())
                }
                Err(err) => Err(err),
            };

            match result {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource deleted successfully."
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
                "error": format!("No product with {} id was found.", id)
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
#[derive(Deserialize, Clone, Debug)]
struct CreateProduct {
    name: String,
    description: String,
    price: f32,
    category: String,
    stock: i32,
    specification: Option<String>,
    images: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct UpdateProduct {
    name: Option<String>,
    description: Option<String>,
    price: Option<f32>,
    category: Option<String>,
    stock: Option<i32>,
    specification: Option<String>,
    images: Option<Vec<String>>,
}
