use crate::error::{AppError, Result};
use crate::handlers::parse_code;
use crate::model::{ShortenRequest, UrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

pub async fn create_url_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlResponse>)> {
    let Json(request) = request.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let params = request.into_params(state.validator())?;

    let record = state.shortener().shorten(params).await?;
    info!(code = %record.code, "shortened url");

    Ok((
        StatusCode::CREATED,
        Json(UrlResponse::from_record(record, state.base_url())),
    ))
}

pub async fn get_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlResponse>> {
    let code = parse_code(short_code)?;
    let record = state.shortener().details(&code).await?;
    Ok(Json(UrlResponse::from_record(record, state.base_url())))
}

pub async fn delete_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let code = parse_code(short_code)?;
    let deleted = state.shortener().delete(&code).await;

    // the cache may outlive the row, so drop it even when the row is gone
    let was_cached = state.redirector().invalidate(&code).await?;
    debug!(code = %code, was_cached, "dropped cached url after delete");

    deleted?;
    Ok(StatusCode::NO_CONTENT)
}
