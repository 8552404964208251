use axum::routing::get;
use axum::{
    extract::Path,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tokio_util::io::ReaderStream;

use crate::api::seller::upload::get_upload_dir;

//Served names are uuid-dot-extension, written by the seller upload route.
static UPLOAD_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9-]{36}\.[a-z]{3,4}$").unwrap());

pub fn uploads_router() -> Router {
    Router::new().route("/uploads/:file_name", get(serve_upload))
}

pub async fn serve_upload(Path(file_name): Path<String>) -> impl IntoResponse {
    if !UPLOAD_NAME_REGEX.is_match(&file_name) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid file name"
            })),
        ));
    }

    let path = format!("{}/{}", get_upload_dir(), file_name);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(_) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Not found"
                })),
            ))
        }
    };

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    Ok((headers, body))
}
