use axum::{
    extract::Multipart,
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use tokio::fs as tokio_fs;
use uuid::Uuid;

use crate::middleware::logging::{to_response, ApiError};

//Routers
pub fn upload_router() -> Router {
    Router::new().route("/upload", post(upload))
}

//Routes
async fn upload(mut multipart: Multipart) -> Response {
    loop {
        match multipart.next_field().await.unwrap_or(None) {
            Some(field) => {
                let content_type = match field.content_type() {
                    Some(content_type) => content_type.to_owned(),
                    None => {
                        let tmp = "Content type is not set.";
                        return to_response(
                            (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                            Err(ApiError::General(tmp.to_string())),
                        );
                    }
                };

                let file_extension = match allowed_content_types().get(content_type.as_str()) {
                    Some(&ext) => ext.to_owned(),
                    None => {
                        let tmp = "Unsupported content type.";
                        return to_response(
                            (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                            Err(ApiError::General(tmp.to_string())),
                        );
                    }
                };

                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(err) => {
                        return to_response(
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({
                                    "error": "Failed to read file bytes."
                                })),
                            ),
                            Err(ApiError::General(format!("Multipart error: {err}"))),
                        );
                    }
                };
                if data.len() > get_file_size_limit() {
                    let tmp = "Payload too large";
                    return to_response(
                        (
                            StatusCode::PAYLOAD_TOO_LARGE,
                            Json(json!({
                                "error": tmp
                            })),
                        ),
                        Err(ApiError::General(tmp.to_string())),
                    );
                }

                let upload_dir = get_upload_dir();
                if let Err(err) = tokio_fs::create_dir_all(&upload_dir).await {
                    return to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Failed to upload file to the server"
                            })),
                        ),
                        Err(ApiError::General(err.to_string())),
                    );
                }

                let file_name = format!("{}.{}", Uuid::new_v4(), file_extension);
                return match tokio_fs::write(format!("{}/{}", upload_dir, file_name), data).await {
                    Ok(_) => to_response(
                        (
                            StatusCode::CREATED,
                            Json(json!({
                                "message": "File uploaded successfully.",
                                "url": format!("/api/uploads/{}", file_name)
                            })),
                        ),
                        Ok(()),
                    ),
                    Err(err) => to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Failed to upload file to the server"
                            })),
                        ),
                        Err(ApiError::General(err.to_string())),
                    ),
                };
            }
            None => {
                let tmp = "Expected a file field";
                return to_response(
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": tmp
                        })),
                    ),
                    Err(ApiError::General(tmp.to_string())),
                );
            }
        }
    }
}

//utils
fn allowed_content_types() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/webp", "webp"),
    ])
}

fn get_file_size_limit() -> usize {
    std::env::var("FILE_SIZE_LIMIT")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(5 * 1024 * 1024)
}

pub fn get_upload_dir() -> String {
    std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string())
}
