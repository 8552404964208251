use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
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
    seller_application::{self, ApplicationStatus, Entity as ApplicationEntity},
    user::{self, Entity as UserEntity, Role},
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn admin_applications_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/seller-applications", get(get_applications))
        .route("/seller-applications/:id/review", post(review_application))
        .layer(Extension(db))
}

//ROUTES
async fn get_applications(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Query(query): Query<ApplicationsQuery>,
) -> impl IntoResponse {
    let mut finder = ApplicationEntity::find();

    if let Some(status) = query.status {
        finder = finder.filter(seller_application::Column::Status.eq(status));
    }

    match finder
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

//Approval flips the application row and the applicant's role in one
//transaction, so a failed promotion leaves the application pending.
async fn review_application(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReviewApplication>,
) -> impl IntoResponse {
    let approve = match payload.action.as_str() {
        "approve" => true,
        "reject" => false,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Action should be 'approve' or 'reject'"
                })),
            );
        }
    };

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

    let application = match ApplicationEntity::find_by_id(id).one(&txn).await {
        Ok(Some(application)) => application,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No application with {} id was found.", id)
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

    //Pending is the only reviewable state, both outcomes are terminal.
    if application.status != ApplicationStatus::Pending {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "Application has already been reviewed"
            })),
        );
    }

    let applicant_id = application.user_id;
    let mut application: seller_application::ActiveModel = application.into();
    application.status = Set(if approve {
        ApplicationStatus::Approved
    } else {
        ApplicationStatus::Rejected
    });
    application.reviewed_by = Set(Some(claims.user_id));
    application.review_note = Set(payload.note);
    application.reviewed_at = Set(Some(Utc::now()));

    if let Err(err) = application.update(&txn).await {
        debug!(error = %err, "Failed to update application");
        let _ = txn.rollback().await;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        );
    }

    if approve {
        let applicant = match UserEntity::find_by_id(applicant_id).one(&txn).await {
            Ok(Some(applicant)) => applicant,
            Ok(None) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": "Applicant no longer exists"
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

        let mut applicant: user::ActiveModel = applicant.into();
        applicant.role = Set(Role::Seller);
        if applicant.update(&txn).await.is_err() {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    }

    let message = if approve {
        "Application approved"
    } else {
        "Application rejected"
    };
    match txn.commit().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "message": message
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
struct ReviewApplication {
    action: String,
    note: Option<String>,
}

#[derive(Deserialize)]
struct ApplicationsQuery {
    status: Option<ApplicationStatus>,
}
