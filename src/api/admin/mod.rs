pub mod orders;
pub mod seller_applications;
pub mod stats;
pub mod users;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use orders::admin_orders_router;
use seller_applications::admin_applications_router;
use stats::admin_stats_router;
use users::admin_users_router;

pub fn admin_api_router(db: Arc<DatabaseConnection>) -> Router {
    let admin_users_router = admin_users_router(db.clone());
    let admin_applications_router = admin_applications_router(db.clone());
    let admin_orders_router = admin_orders_router(db.clone());
    let admin_stats_router = admin_stats_router(db.clone());

    Router::new()
        .nest("/", admin_users_router)
        .nest("/", admin_applications_router)
        .nest("/", admin_orders_router)
        .nest("/", admin_stats_router)
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                roles: vec![Role::Admin],
            },
            auth_middleware,
        ))
}
