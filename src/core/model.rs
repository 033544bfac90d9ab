// Web2Text Console - core/model.rs
//
// Transport DTOs mirroring the backend schema. Pure data definitions with
// no I/O, no UI. The backend owns every lifecycle; this layer only carries
// records between the wire and the views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// =============================================================================
// Log events (live stream)
// =============================================================================

/// A single event from the `/ws/logs` stream, plus events the console
/// synthesises locally (connected/disconnected markers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Human-readable message text.
    pub message: String,

    /// Severity level as emitted by the worker.
    #[serde(default)]
    pub level: Level,

    /// Free-form structured payload attached by the worker.
    #[serde(default)]
    pub extra: Value,

    /// Receipt timestamp. The worker rarely stamps frames itself, so a
    /// missing value is filled with the local receipt time at decode.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Build a locally synthesised event (connection markers and the like).
    pub fn local(message: impl Into<String>, level: Level) -> Self {
        Self {
            message: message.into(),
            level,
            extra: Value::Null,
            timestamp: Utc::now(),
        }
    }

    /// True when `extra` carries a non-empty payload worth rendering.
    pub fn has_extra(&self) -> bool {
        match &self.extra {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }
}

/// Severity levels emitted by the worker over the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

impl Level {
    /// All variants in display order.
    pub fn all() -> &'static [Level] {
        &[Level::Info, Level::Warning, Level::Error, Level::Success]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Success => "Success",
        }
    }

    /// Bracketed tag for the console column (e.g. `[ERROR]`).
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Warning => "[WARNING]",
            Level::Error => "[ERROR]",
            Level::Success => "[SUCCESS]",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Sites
// =============================================================================

/// How the worker discovers pages for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStrategy {
    #[default]
    Sitemap,
    Rss,
    Links,
}

impl CrawlStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            CrawlStrategy::Sitemap => "sitemap",
            CrawlStrategy::Rss => "rss",
            CrawlStrategy::Links => "links",
        }
    }
}

/// A configured content source tracked by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    #[serde(default)]
    pub sitemap_url: Option<String>,
    #[serde(default)]
    pub rss_url: Option<String>,
    #[serde(default)]
    pub crawl_strategy: CrawlStrategy,
    #[serde(default)]
    pub rate_limit_ms: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Pages indexed for this site.
    #[serde(default)]
    pub pages_count: u64,
    /// Pages discovered but not yet processed.
    #[serde(default)]
    pub pending_count: u64,
    /// Backend-supplied warning about a misconfigured discovery source.
    #[serde(default)]
    pub config_warning: Option<String>,
}

/// Body of `POST /sites/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteCreate {
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    pub crawl_strategy: CrawlStrategy,
}

/// Body of `PATCH /sites/{id}`. All fields optional; only set fields change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rss_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_strategy: Option<CrawlStrategy>,
}

impl SiteUpdate {
    /// Update that only flips the enabled flag.
    pub fn enabled(value: bool) -> Self {
        Self {
            enabled: Some(value),
            ..Default::default()
        }
    }
}

// =============================================================================
// Feed pages
// =============================================================================

/// Processing state of a scraped page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    New,
    Processed,
    Failed,
    Skipped,
}

/// How a page URL was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    Sitemap,
    Rss,
    Links,
    Manual,
}

impl DiscoverySource {
    pub fn label(&self) -> &'static str {
        match self {
            DiscoverySource::Sitemap => "sitemap",
            DiscoverySource::Rss => "rss",
            DiscoverySource::Links => "links",
            DiscoverySource::Manual => "manual",
        }
    }
}

/// Extracted text plus metadata for one scrape of a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub id: String,
    pub extracted_text: String,
    /// Wire key carries a trailing underscore (the backend aliases its
    /// reserved `metadata` attribute).
    #[serde(default, rename = "metadata_")]
    pub metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl PageContent {
    /// How the backend verified the published date, when recorded.
    pub fn date_source(&self) -> Option<&str> {
        self.metadata.get("date_source").and_then(Value::as_str)
    }
}

/// A single scraped content record, as returned by the feed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDetail {
    pub id: String,
    pub site_id: String,
    pub url: String,
    pub canonical_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
    pub status: PageStatus,
    pub discovered_via: DiscoverySource,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub latest_content: Option<PageContent>,
}

impl PageDetail {
    /// Best display date: publication date, falling back to scrape time.
    pub fn display_date(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.scraped_at)
    }
}

/// Pagination envelope returned by `GET /feed/new`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    pub items: Vec<PageDetail>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Query parameters for `GET /feed/new`.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    /// Lower bound on scrape/discovery time.
    pub since: DateTime<Utc>,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Restrict to one site; `None` queries all sites.
    pub site_id: Option<String>,
    /// Server-side title/content search; empty string sends nothing.
    pub search: String,
}

impl FeedQuery {
    /// Default query: last 24 hours, first page.
    pub fn recent(page_size: u32) -> Self {
        Self {
            since: Utc::now()
                - chrono::Duration::hours(crate::util::constants::DEFAULT_FEED_LOOKBACK_HOURS),
            page: 1,
            page_size,
            site_id: None,
            search: String::new(),
        }
    }

    /// Serialise into query pairs for the feed endpoint.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("since", self.since.to_rfc3339()),
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(ref site_id) = self.site_id {
            pairs.push(("site_id", site_id.clone()));
        }
        if !self.search.trim().is_empty() {
            pairs.push(("search", self.search.trim().to_string()));
        }
        pairs
    }

    /// Clamp the page number into `1..=total_pages` once the total is known.
    pub fn clamp_page(&mut self, total_pages: u32) {
        if total_pages > 0 && self.page > total_pages {
            self.page = total_pages;
        }
        if self.page == 0 {
            self.page = 1;
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// A backend key/value setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

// =============================================================================
// API keys
// =============================================================================

/// A backend-issued credential. Only the non-secret prefix is ever listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub prefix: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Response of key creation: the listing record plus the one-time secret.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedApiKey {
    #[serde(flatten)]
    pub record: ApiKey,
    /// Full secret, revealed exactly once at creation.
    pub key: String,
}

// =============================================================================
// Auth
// =============================================================================

/// Response of `GET /auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_lowercase_wire_values() {
        for (raw, expected) in [
            ("\"info\"", Level::Info),
            ("\"warning\"", Level::Warning),
            ("\"error\"", Level::Error),
            ("\"success\"", Level::Success),
        ] {
            let level: Level = serde_json::from_str(raw).unwrap();
            assert_eq!(level, expected);
        }
    }

    #[test]
    fn site_update_skips_unset_fields() {
        let body = serde_json::to_value(SiteUpdate::enabled(false)).unwrap();
        assert_eq!(body, serde_json::json!({ "enabled": false }));
    }

    #[test]
    fn feed_query_omits_empty_filters() {
        let query = FeedQuery::recent(50);
        let pairs = query.to_pairs();
        assert!(pairs.iter().any(|(k, _)| *k == "since"));
        assert!(pairs.iter().any(|(k, v)| *k == "page" && v == "1"));
        assert!(pairs.iter().any(|(k, v)| *k == "page_size" && v == "50"));
        assert!(!pairs.iter().any(|(k, _)| *k == "site_id"));
        assert!(!pairs.iter().any(|(k, _)| *k == "search"));
    }

    #[test]
    fn feed_query_clamps_page_to_total() {
        let mut query = FeedQuery::recent(50);
        query.page = 9;
        query.clamp_page(3);
        assert_eq!(query.page, 3);

        // Unknown total leaves the page alone.
        query.page = 9;
        query.clamp_page(0);
        assert_eq!(query.page, 9);

        query.page = 0;
        query.clamp_page(3);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn page_content_reads_aliased_metadata_key() {
        let raw = serde_json::json!({
            "id": "c1",
            "extracted_text": "body text",
            "metadata_": { "date_source": "json-ld" },
            "created_at": "2026-01-10T12:00:00Z"
        });
        let content: PageContent = serde_json::from_value(raw).unwrap();
        assert_eq!(
            content.metadata.get("date_source"),
            Some(&Value::String("json-ld".to_string()))
        );
        assert_eq!(content.date_source(), Some("json-ld"));
    }

    #[test]
    fn generated_key_flattens_listing_record() {
        let raw = serde_json::json!({
            "id": "4be6e3cd-0000-0000-0000-000000000000",
            "name": "ci",
            "prefix": "Ab12Cd34",
            "created_at": "2026-01-10T12:00:00Z",
            "is_active": true,
            "key": "Ab12Cd34-the-full-secret"
        });
        let generated: GeneratedApiKey = serde_json::from_value(raw).unwrap();
        assert_eq!(generated.record.prefix, "Ab12Cd34");
        assert_eq!(generated.key, "Ab12Cd34-the-full-secret");
    }
}
