use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};

pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "fr"];
pub const DEFAULT_LANGUAGE: &str = "en";

/// Language picked from the `Accept-Language` header among the supported ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLanguage(String);

impl UserLanguage {
    pub fn from_header(header: &str) -> Self {
        let mut ranges = header
            .split(',')
            .filter_map(|item| {
                let mut parts = item.trim().split(';');
                let tag = parts.next()?.trim();
                if tag.is_empty() {
                    return None;
                }

                let quality = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                    .unwrap_or(1.0);

                Some((tag, quality))
            })
            .collect::<Vec<_>>();

        // stable: equal weights keep header order
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

        let language = ranges
            .into_iter()
            .filter(|(_, quality)| *quality > 0.0)
            .find_map(|(tag, _)| {
                let primary = tag.split('-').next()?.to_ascii_lowercase();
                SUPPORTED_LANGUAGES
                    .iter()
                    .find(|supported| **supported == primary)
            })
            .unwrap_or(&DEFAULT_LANGUAGE);

        Self(language.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserLanguage {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_owned())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for UserLanguage {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        Ok(Self::from_header(header))
    }
}
