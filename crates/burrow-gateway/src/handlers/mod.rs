mod health;
mod redirect;
mod url;

pub use health::health_handler;
pub use redirect::redirect_handler;
pub use url::{create_url_handler, delete_url_handler, get_url_handler};

use crate::error::AppError;
use burrow_core::ShortCode;

/// Parses a code taken from the request path.
///
/// Strings that can never be a short code are reported as not found, the
/// same as well-formed codes nobody has allocated.
fn parse_code(raw: String) -> Result<ShortCode, AppError> {
    ShortCode::new(raw.as_str()).map_err(|_| AppError::NotFound(raw))
}
