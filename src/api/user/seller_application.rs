use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::seller_application::{
    self, ApplicationStatus, Entity as ApplicationEntity,
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn seller_application_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route(
            "/seller-application",
            get(get_own_applications).post(submit_application),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_own_applications(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    match ApplicationEntity::find()
        .filter(seller_application::Column::UserId.eq(claims.user_id))
        .order_by_desc(seller_application::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn submit_application(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitApplication>,
) -> impl IntoResponse {
    //Sellers and admins have nothing to apply for.
    if claims.role != "buyer" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Only buyers can apply to become sellers"
            })),
        );
    }

    if payload.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Message is required"
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

    //One pending application per user. A rejected one stays as history and
    //a new submission gets its own row.
    match ApplicationEntity::find()
        .filter(seller_application::Column::UserId.eq(claims.user_id))
        .filter(seller_application::Column::Status.eq(ApplicationStatus::Pending))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "You already have a pending application"
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

    let new_application = seller_application::ActiveModel {
        user_id: Set(claims.user_id),
        status: Set(ApplicationStatus::Pending),
        message: Set(payload.message),
        reviewed_by: Set(None),
        review_note: Set(None),
        created_at: Set(Utc::now()),
        reviewed_at: Set(None),
        ..Default::default()
    };

    match ApplicationEntity::insert(new_application).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Application submitted successfully"
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

//Structs
#[derive(Deserialize, Debug)]
struct SubmitApplication {
    message: String,
}
