//! Brand URL classification.
//!
//! Maps a raw brand URL onto the platform it points at. Classification is
//! total: anything that is not a recognised store listing or map place is
//! [`SourceType::Unknown`].

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};

static STORE_LISTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://play\.google\.com/store/apps/details(?:[?#]|$)")
        .expect("store listing pattern is valid")
});

static MAP_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.google\.[a-z.]+/maps/place/[^/]+/@[-\d.,z]+/data=")
        .expect("map place pattern is valid")
});

static PLACE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/maps/place/([^/]+)/").expect("place token pattern is valid")
});

/// Platform a brand URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// App store listing page.
    StoreApp,
    /// Map place page.
    MapPlace,
    Unknown,
}

impl SourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::StoreApp => "store_app",
            SourceType::MapPlace => "map_place",
            SourceType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw URL string. Never fails.
#[must_use]
pub fn classify_url(raw: &str) -> SourceType {
    let raw = raw.trim();
    if STORE_LISTING.is_match(raw) {
        SourceType::StoreApp
    } else if MAP_PLACE.is_match(raw) {
        SourceType::MapPlace
    } else {
        SourceType::Unknown
    }
}

/// Extract the app identifier from a store listing URL's `id` query parameter.
///
/// Returns `None` when the URL does not parse or the parameter is absent or empty.
#[must_use]
pub fn extract_app_id(raw: &str) -> Option<String> {
    let url = reqwest::Url::parse(raw.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Extract the human-readable place token from a map place URL.
///
/// `+` separators are turned back into spaces and percent escapes decoded.
#[must_use]
pub fn extract_place_token(raw: &str) -> Option<String> {
    let captures = PLACE_TOKEN.captures(raw)?;
    let token = captures.get(1)?.as_str().replace('+', " ");
    let decoded = percent_decode_str(&token).decode_utf8_lossy().into_owned();
    Some(decoded).filter(|t| !t.trim().is_empty())
}
