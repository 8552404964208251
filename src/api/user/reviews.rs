use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    product::{self, Entity as ProductEntity},
    review::{self, Entity as ReviewEntity},
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn reviews_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/:id", patch(patch_review).delete(delete_review))
        .layer(Extension(db))
}

//The denormalized product columns always follow the review table, inside
//the same transaction as the triggering write.
async fn recompute_product_rating(
    txn: &DatabaseTransaction,
    product_id: i32,
) -> Result<(), DbErr> {
    let reviews = ReviewEntity::find()
        .filter(review::Column::ProductId.eq(product_id))
        .all(txn)
        .await?;

    let review_count = reviews.len() as i32;
    let rating = if review_count == 0 {
        0.0
    } else {
        reviews.iter().map(|review| review.rating as f32).sum::<f32>() / review_count as f32
    };

    let product = ProductEntity::find_by_id(product_id)
        .one(txn)
        .await?
        .ok_or(DbErr::RecordNotFound(format!(
            "Product {} not found",
            product_id
        )))?;

    let mut product: product::ActiveModel = product.into();
    product.rating = Set(rating);
    product.review_count = Set(review_count);
    product.update(txn).await.map(|_| ())
}

//ROUTES
async fn create_review(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReview>,
) -> impl IntoResponse {
    if payload.rating < 1 || payload.rating > 5 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Rating should be between 1 and 5"
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

    match ProductEntity::find_by_id(payload.product_id).one(&txn).await {
        Ok(Some(_)) => {}
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
    }

    match ReviewEntity::find()
        .filter(review::Column::ProductId.eq(payload.product_id))
        .filter(review::Column::UserId.eq(claims.user_id))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "You have already reviewed this product"
                })),
            );
        }
        Ok(None) => {}
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    }

    let new_review = review::ActiveModel {
        product_id: Set(payload.product_id),
        user_id: Set(claims.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    if ReviewEntity::insert(new_review).exec(&txn).await.is_err() {
        let _ = txn.rollback().await;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        );
    }

    if recompute_product_rating(&txn, payload.product_id)
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
                "message": "Review added successfully"
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

async fn patch_review(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchReview>,
) -> impl IntoResponse {
    if let Some(rating) = payload.rating {
        if !(1..=5).contains(&rating) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Rating should be between 1 and 5"
                })),
            );
        }
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

    match ReviewEntity::find_by_id(id)
        .filter(review::Column::UserId.eq(claims.user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let product_id = entry.product_id;
            let mut entry: review::ActiveModel = entry.into();

            if let Some(rating) = payload.rating {
                entry.rating = Set(rating);
            }
            if let Some(comment) = payload.comment {
                entry.comment = Set(comment);
            }

            let result = entry.update(&txn).await.map(|_| ());
            let result = match result {
                Ok(_) => recompute_product_rating(&txn, product_id).await,
                Err(err) => Err(err),
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

async fn delete_review(
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
            );
        }
    };

    match ReviewEntity::find_by_id(id)
        .filter(review::Column::UserId.eq(claims.user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let product_id = entry.product_id;
            let entry: review::ActiveModel = entry.into();

            let result = entry.delete(&txn).await.map(|_| ());
            let result = match result {
                Ok(_) => recompute_product_rating(&txn, product_id).await,
                Err(err) => Err(err),
            };

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

//Structs
#[derive(Deserialize, Debug)]
struct CreateReview {
    product_id: i32,
    rating: i32,
    comment: String,
}

#[derive(Deserialize)]
struct PatchReview {
    rating: Option<i32>,
    comment: Option<String>,
}
