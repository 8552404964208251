use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    order::{self, Entity as OrderEntity, Status},
    product::Entity as ProductEntity,
    user::{self, Entity as UserEntity, Role},
};

//ROUTERS
pub fn admin_stats_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .layer(Extension(db))
}

//ROUTES
//Read-only aggregation, any database error surfaces as a plain 500.
async fn get_stats(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    let admins = UserEntity::find()
        .filter(user::Column::Role.eq(Role::Admin))
        .count(&*db)
        .await;
    let sellers = UserEntity::find()
        .filter(user::Column::Role.eq(Role::Seller))
        .count(&*db)
        .await;
    let buyers = UserEntity::find()
        .filter(user::Column::Role.eq(Role::Buyer))
        .count(&*db)
        .await;
    let products = ProductEntity::find().count(&*db).await;
    let orders = OrderEntity::find().count(&*db).await;

    let delivered = OrderEntity::find()
        .filter(order::Column::Status.eq(Status::Delivered))
        .all(&*db)
        .await;

    match (admins, sellers, buyers, products, orders, delivered) {
        (Ok(admins), Ok(sellers), Ok(buyers), Ok(products), Ok(orders), Ok(delivered)) => {
            let revenue: f32 = delivered.iter().map(|order| order.total).sum();
            (
                StatusCode::OK,
                Json(json!({
                    "users": {
                        "admins": admins,
                        "sellers": sellers,
                        "buyers": buyers,
                    },
                    "products": products,
                    "orders": orders,
                    "revenue": revenue,
                })),
            )
                .into_response()
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}
