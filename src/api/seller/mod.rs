pub mod product;
pub mod upload;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use product::seller_product_router;
use upload::upload_router;

pub fn seller_api_router(db: Arc<DatabaseConnection>) -> Router {
    let seller_product_router = seller_product_router(db.clone());
    let upload_router = upload_router();

    Router::new()
        .nest("/", seller_product_router)
        .nest("/", upload_router)
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                roles: vec![Role::Seller, Role::Admin],
            },
            auth_middleware,
        ))
}
