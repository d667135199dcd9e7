use crate::error::AppError;
use burrow_core::UrlRecord;
use burrow_shortener::ShortenParams;
use jiff::Timestamp;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_VALID_FOR_DAYS: u32 = 1;
pub const MAX_VALID_FOR_DAYS: u32 = 365;

/// Optional http(s) scheme, dotted host ending in a TLD of two or more
/// letters, optional port and path.
const URL_PATTERN: &str = r"^(https?://)?[a-zA-Z0-9]([a-zA-Z0-9_-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9_-]*[a-zA-Z0-9])?)*\.[a-zA-Z]{2,}(:[0-9]{1,5})?(/.*)?$";

/// Checks long URLs submitted for shortening.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    pattern: Regex,
}

impl UrlValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(URL_PATTERN)?,
        })
    }

    pub fn is_valid(&self, url: &str) -> bool {
        !url.trim().is_empty() && self.pattern.is_match(url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub url: String,
    pub valid_for_days: Option<u32>,
}

impl ShortenRequest {
    /// Validates the request and normalizes the URL to lower case.
    pub fn into_params(self, validator: &UrlValidator) -> Result<ShortenParams, AppError> {
        if !validator.is_valid(&self.url) {
            return Err(AppError::InvalidRequest("Not a valid URL".to_string()));
        }

        if let Some(days) = self.valid_for_days {
            if !(MIN_VALID_FOR_DAYS..=MAX_VALID_FOR_DAYS).contains(&days) {
                return Err(AppError::InvalidRequest(format!(
                    "validForDays must be between {MIN_VALID_FOR_DAYS} and {MAX_VALID_FOR_DAYS}, got {days}"
                )));
            }
        }

        Ok(ShortenParams {
            long_url: self.url.to_lowercase(),
            valid_for_days: self.valid_for_days,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

impl UrlResponse {
    pub fn from_record(record: UrlRecord, base_url: &str) -> Self {
        Self {
            short_url: record.code.to_url(base_url),
            short_code: record.code.to_string(),
            original_url: record.long_url,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}
