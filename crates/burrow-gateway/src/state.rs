use std::sync::Arc;

use burrow_redirector::Redirector;
use burrow_shortener::Shortener;
use typed_builder::TypedBuilder;

use crate::model::UrlValidator;

#[derive(Clone, TypedBuilder)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    redirector: Arc<dyn Redirector>,
    /// Public base URL short links are built from.
    #[builder(setter(into))]
    base_url: Arc<str>,
    validator: Arc<UrlValidator>,
}

impl AppState {
    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn validator(&self) -> &UrlValidator {
        &self.validator
    }
}
