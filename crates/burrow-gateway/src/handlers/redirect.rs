use crate::error::{AppError, Result};
use crate::handlers::parse_code;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use burrow_core::url::with_default_scheme;
use tracing::{debug, info};

/// Lets browsers and CDNs keep the redirect for an hour.
pub const REDIRECT_CACHE_CONTROL: &str = "public, max-age=3600";

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    info!(code = %short_code, "redirecting short code");
    let code = parse_code(short_code)?;

    let long_url = state.redirector().resolve(&code).await?;
    let target = with_default_scheme(&long_url);
    let location = HeaderValue::from_str(&target)
        .map_err(|e| AppError::Internal(format!("stored url is not a valid header: {e}")))?;

    debug!(code = %code, location = %target, "redirect resolved");
    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [
            (LOCATION, location),
            (CACHE_CONTROL, HeaderValue::from_static(REDIRECT_CACHE_CONTROL)),
        ],
    )
        .into_response())
}
