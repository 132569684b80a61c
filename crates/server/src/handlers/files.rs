//! File upload, download, listing, delete, and info handlers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use depot_core::api::{DeleteResponse, FileEntry, ListResponse, UploadResponse};
use futures::StreamExt;
use time::OffsetDateTime;

/// Header carrying the proposed filename on uploads.
const FILENAME_HEADER: &str = "x-filename";

/// `POST /api/upload`
///
/// Raw body, filename from the `X-Filename` header. Without the header the
/// upload gets a generated timestamp name.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let proposed = match headers.get(FILENAME_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| ApiError::BadRequest("X-Filename header is not valid UTF-8".to_string()))?
            .to_string(),
        None => format!("upload_{}", OffsetDateTime::now_utc().unix_timestamp()),
    };

    let row = state.depot.store_file(&proposed, body).await?;

    Ok(Json(UploadResponse {
        name: row.filename,
        size_bytes: row.size_bytes as u64,
        content_hash: row.content_hash,
    }))
}

/// `GET /api/download/{name}`
///
/// Streams the file in bounded chunks with an attachment disposition.
pub async fn download(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let (record, stream) = state.depot.open_download(&name).await?;

    let body_stream = stream.map(|result| result.map_err(|e| std::io::Error::other(e.to_string())));

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (CONTENT_LENGTH, record.size_bytes.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", record.filename),
            ),
        ],
        Body::from_stream(body_stream),
    )
        .into_response())
}

/// `GET /api/files`
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<ListResponse>> {
    let files = state.depot.list_files().await?;
    Ok(Json(ListResponse { files }))
}

/// `DELETE /api/files/{name}`
pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let name = state.depot.delete_file(&name).await?;
    Ok(Json(DeleteResponse { name }))
}

/// `GET /api/info/{name}`
pub async fn file_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<FileEntry>> {
    let entry = state.depot.file_info(&name).await?;
    Ok(Json(entry))
}
