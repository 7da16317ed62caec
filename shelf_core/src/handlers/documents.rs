use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use tokio_util::io::ReaderStream;

use crate::{
    error::{AppError, Result},
    notice::{FlashRedirect, Notice},
    views::{self, IndexPage},
    AppState,
};

const UPLOAD_FIELD: &str = "file";

pub async fn list_documents(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let documents = state.registry.list_documents().await;
    let (jar, notice) = Notice::take(jar);
    let registry_config = state.registry.config();

    let page = views::index_page(&IndexPage {
        app_name: &state.app_name,
        documents: &documents,
        notice: notice.as_ref(),
        extension: &registry_config.extension,
        max_upload_bytes: registry_config.max_upload_bytes,
    });

    (jar, page)
}

pub async fn download_document(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let document = state.registry.resolve_for_download(&name).await?;
    let (file, length) = state.registry.open(&document).await?;

    let mut headers = HeaderMap::new();

    let content_type = mime_guess::from_path(&document.name).first_or(mime::APPLICATION_OCTET_STREAM);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    // Sanitized names are plain ASCII without quotes, so no escaping is needed.
    let disposition = format!("attachment; filename=\"{}\"", document.name);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(|e| AppError::Other(e.into()))?,
    );

    tracing::info!("Streaming document {} ({} bytes)", document.name, length);

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((StatusCode::OK, headers, body).into_response())
}

pub async fn delete_document(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(name): Path<String>,
) -> Result<FlashRedirect> {
    let deleted = state.registry.delete_document(&name).await?;

    Ok(Notice::success(format!("File \"{}\" deleted successfully!", deleted)).flash(jar))
}

/// Upload failures never produce an error page: every validation or write
/// problem is reported back on the listing page. Only an oversized body is
/// answered with 413.
pub async fn upload_document(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<FlashRedirect> {
    let max_size = state.registry.config().max_upload_bytes;
    check_content_length(&headers, max_size)?;

    let notice = receive_upload(&state, multipart, max_size).await?;
    Ok(notice.flash(jar))
}

async fn receive_upload(state: &AppState, mut multipart: Multipart, max_size: u64) -> Result<Notice> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(AppError::PayloadTooLarge { size: max_size + 1, max_size });
            }
            Err(e) => {
                tracing::warn!("Failed to read multipart field: {}", e);
                return Ok(Notice::error("No file selected"));
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let raw_name = field.file_name().unwrap_or("").to_string();
        if raw_name.is_empty() {
            return Ok(Notice::error("No file selected"));
        }

        let notice = match state.registry.store_upload(&raw_name, field).await {
            Ok(stored) => Notice::success(format!("File \"{}\" uploaded successfully!", stored)),
            Err(e) if e.is_validation() => {
                tracing::warn!("Rejected upload {:?}: {}", raw_name, e);
                Notice::error(e.notice())
            }
            Err(e) => {
                tracing::error!("Error while uploading {:?}: {}", raw_name, e);
                Notice::error(e.notice())
            }
        };

        return Ok(notice);
    }

    Ok(Notice::error("No file selected"))
}

fn check_content_length(headers: &HeaderMap, max_size: u64) -> Result<()> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(size) if size > max_size => Err(AppError::PayloadTooLarge { size, max_size }),
        _ => Ok(()),
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound("No route matched".to_string())
}
