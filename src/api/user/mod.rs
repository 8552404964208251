pub mod cart;
pub mod orders;
pub mod profile;
pub mod reviews;
pub mod seller_application;
pub mod wishlist;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use cart::cart_router;
use orders::orders_router;
use profile::profile_router;
use reviews::reviews_router;
use seller_application::seller_application_router;
use wishlist::wishlist_router;

//Any authenticated account. Ownership scoping happens inside the handlers.
pub fn user_api_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .nest("/", cart_router(db.clone()))
        .nest("/", orders_router(db.clone()))
        .nest("/", wishlist_router(db.clone()))
        .nest("/", reviews_router(db.clone()))
        .nest("/", seller_application_router(db.clone()))
        .nest("/", profile_router(db.clone()))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                roles: vec![Role::Admin, Role::Seller, Role::Buyer],
            },
            auth_middleware,
        ))
}
