// Web2Text Console - api/client.rs
//
// Blocking REST client for the backend. One method per endpoint; all
// responses funnel through `check` so a 401 always surfaces as
// `ApiError::Unauthorized` and other failures carry the backend's detail
// string. Authentication is cookie-based: the shared cookie store picks
// up the session cookie set by /auth/login and sends it on every call.
//
// The client is cheap to clone (reqwest pools internally) and is cloned
// into the background thread of each dispatched request.

use crate::core::model::{
    ApiKey, FeedPage, GeneratedApiKey, SessionUser, Setting, Site, SiteCreate, SiteUpdate,
};
use crate::util::constants::{HTTP_TIMEOUT_SECS, LOG_STREAM_PATH, MAX_FRAME_PREVIEW};
use crate::util::error::ApiError;
use reqwest::blocking::Response;
use reqwest::StatusCode;
use std::time::Duration;

/// REST client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given base URL (e.g. `http://localhost:8000`).
    ///
    /// The URL is validated up front so a typo fails at startup rather
    /// than on the first request.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let trimmed = base_url.trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed).map_err(|_| ApiError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let http = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|source| ApiError::Network { source })?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Derive the WebSocket URL of the log stream from the HTTP base URL.
    pub fn log_stream_url(&self) -> String {
        format!("{}{}", self.base_url.replacen("http", "ws", 1), LOG_STREAM_PATH)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a response to the typed failure taxonomy.
    fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }
        Ok(resp)
    }

    fn send_err(source: reqwest::Error) -> ApiError {
        ApiError::Network { source }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with form-encoded credentials. On success the backend sets
    /// the session cookie, captured by the cookie store.
    pub fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/logout"))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?;
        Ok(())
    }

    /// Probe the current session. `Unauthorized` means "show the login gate".
    pub fn me(&self) -> Result<SessionUser, ApiError> {
        let resp = self
            .http
            .get(self.url("/auth/me"))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "session",
            source,
        })
    }

    // =========================================================================
    // Sites
    // =========================================================================

    pub fn list_sites(&self) -> Result<Vec<Site>, ApiError> {
        let resp = self
            .http
            .get(self.url("/sites/"))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "site list",
            source,
        })
    }

    pub fn create_site(&self, site: &SiteCreate) -> Result<Site, ApiError> {
        let resp = self
            .http
            .post(self.url("/sites/"))
            .json(site)
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "created site",
            source,
        })
    }

    /// PATCH a site; the backend echoes the updated record, which the
    /// caller uses to reconcile its optimistic copy.
    pub fn update_site(&self, id: &str, update: &SiteUpdate) -> Result<Site, ApiError> {
        let resp = self
            .http
            .patch(self.url(&format!("/sites/{id}")))
            .json(update)
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "updated site",
            source,
        })
    }

    pub fn delete_site(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/sites/{id}")))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?;
        Ok(())
    }

    /// Trigger an immediate scrape run for one site.
    pub fn run_site(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/sites/{id}/run")))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?;
        Ok(())
    }

    // =========================================================================
    // Feed
    // =========================================================================

    pub fn feed(&self, query: &crate::core::model::FeedQuery) -> Result<FeedPage, ApiError> {
        let resp = self
            .http
            .get(self.url("/feed/new"))
            .query(&query.to_pairs())
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "feed page",
            source,
        })
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn setting(&self, key: &str) -> Result<Setting, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/settings/{key}")))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "setting",
            source,
        })
    }

    pub fn save_setting(&self, key: &str, value: &str) -> Result<Setting, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/settings/{key}")))
            .json(&serde_json::json!({ "value": value }))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "saved setting",
            source,
        })
    }

    // =========================================================================
    // API keys
    // =========================================================================

    pub fn list_api_keys(&self) -> Result<Vec<ApiKey>, ApiError> {
        let resp = self
            .http
            .get(self.url("/api-keys"))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "key list",
            source,
        })
    }

    /// Create a key. The response is the only time the full secret is
    /// revealed; listings show the prefix thereafter.
    pub fn generate_api_key(&self, name: &str) -> Result<GeneratedApiKey, ApiError> {
        let resp = self
            .http
            .post(self.url("/api-keys"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?.json().map_err(|source| ApiError::Decode {
            context: "generated key",
            source,
        })
    }

    pub fn revoke_api_key(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api-keys/{id}")))
            .send()
            .map_err(Self::send_err)?;
        Self::check(resp)?;
        Ok(())
    }
}

/// Pull the human-readable detail out of an error body.
///
/// The backend wraps errors as `{"detail": "..."}`; anything else is
/// passed through truncated.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_FRAME_PREVIEW {
        let head: String = trimmed.chars().take(MAX_FRAME_PREVIEW).collect();
        format!("{head}…")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(matches!(
            ApiClient::new("ftp://example.com"),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/sites/"), "http://localhost:8000/sites/");
    }

    #[test]
    fn derives_ws_url_from_http_base() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(client.log_stream_url(), "ws://localhost:8000/ws/logs");

        let tls = ApiClient::new("https://scraper.example.com").unwrap();
        assert_eq!(tls.log_stream_url(), "wss://scraper.example.com/ws/logs");
    }

    #[test]
    fn extract_detail_prefers_backend_detail_field() {
        assert_eq!(
            extract_detail(r#"{"detail":"Setting not found"}"#),
            "Setting not found"
        );
        assert_eq!(extract_detail("plain text error"), "plain text error");
    }

    #[test]
    fn extract_detail_truncates_long_bodies() {
        let body = "x".repeat(MAX_FRAME_PREVIEW + 50);
        let detail = extract_detail(&body);
        assert!(detail.chars().count() == MAX_FRAME_PREVIEW + 1);
        assert!(detail.ends_with('…'));
    }
}
