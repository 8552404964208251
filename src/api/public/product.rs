use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    product::{self, Entity as ProductEntity},
    product_image::{self, Entity as ProductImageEntity},
    review::{self, Entity as ReviewEntity},
};

//ROUTERS
pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id/reviews", get(get_product_reviews))
        .layer(Extension(db))
}

//ROUTES
async fn get_products(
    Query(params): Query<GetProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let mut half_result = ProductEntity::find();

    if let Some(category) = params.category {
        half_result = half_result.filter(product::Column::Category.eq(category));
    }

    if let Some(min) = params.min {
        half_result = half_result.filter(product::Column::Price.gte(min));
    }

    if let Some(max) = params.max {
        half_result = half_result.filter(product::Column::Price.lte(max));
    }

    if let Some(query) = params.query {
        let condition = Condition::any()
            .add(product::Column::Name.contains(query.clone()))
            .add(product::Column::Description.contains(query));
        half_result = half_result.filter(condition);
    }

    let result = half_result
        .order_by_desc(product::Column::CreatedAt)
        .all(&*db)
        .await;
    match result {
        Ok(products) => {
            let response: Vec<PublicProductResponse> = products
                .into_iter()
                .map(PublicProductResponse::new)
                .collect();
            (StatusCode::OK, Json(response)).into_response()
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

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let result = ProductEntity::find_by_id(id).one(&*db).await;
    let product = match result {
        Ok(Some(prod)) => prod,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No product with {} id was found.", id)
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

    let images = match ProductImageEntity::find()
        .filter(product_image::Column::ProductId.eq(id))
        .order_by_asc(product_image::Column::DisplayOrder)
        .all(&*db)
        .await
    {
        Ok(images) => images,
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

    let reviews = match ReviewEntity::find()
        .filter(review::Column::ProductId.eq(id))
        .order_by_desc(review::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(reviews) => reviews,
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

    (
        StatusCode::OK,
        Json(json!({
            "product": PublicProductResponse::new(product),
            "images": images,
            "reviews": reviews,
        })),
    )
        .into_response()
}

async fn get_product_reviews(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ProductEntity::find_by_id(id).one(&*db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No product with {} id was found.", id)
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
    }

    match ReviewEntity::find()
        .filter(review::Column::ProductId.eq(id))
        .order_by_desc(review::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(reviews) => (StatusCode::OK, Json(reviews)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

//structs
#[derive(Deserialize)]
struct GetProductsQuery {
    category: Option<String>,
    min: Option<f32>,
    max: Option<f32>,
    query: Option<String>,
}

#[derive(Serialize)]
pub struct PublicProductResponse {
    id: i32,
    name: String,
    description: String,
    price: f32,
    category: String,
    stock: i32,
    seller_id: i32,
    specification: Option<String>,
    rating: f32,
    review_count: i32,
}

impl PublicProductResponse {
    pub fn new(value: product::Model) -> PublicProductResponse {
        PublicProductResponse {
            id: value.id,
            name: value.name,
            description: value.description,
            price: value.price,
            category: value.category,
            stock: value.stock,
            seller_id: value.seller_id,
            specification: value.specification,
            rating: value.rating,
            review_count: value.review_count,
        }
    }
}
