// Web2Text Console - app/state.rs
//
// Application state. One struct per view plus the session gate and the
// cross-view status line. Owned by the eframe::App implementation.
//
// Panels communicate outward through request members (request_load,
// request_toggle, ...) which gui.rs drains into dispatcher calls each
// frame. Mutations are applied optimistically here and reconciled
// against the server-echoed record when the response lands.

use crate::core::model::{
    ApiKey, FeedQuery, GeneratedApiKey, Level, PageDetail, SessionUser, Site, SiteCreate,
    SiteUpdate,
};
use crate::core::stream::LogBuffer;
use std::collections::HashMap;

// =============================================================================
// Session gate
// =============================================================================

/// Explicit session state, derived once at startup from `GET /auth/me`
/// and re-checked through a single gate before any protected view renders.
#[derive(Debug, Clone, Default)]
pub enum Session {
    /// Startup probe still in flight.
    #[default]
    Unknown,

    /// No valid session cookie; the login form is the only route.
    Anonymous,

    /// Cookie accepted by the backend.
    Authenticated(SessionUser),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::Authenticated(user) => Some(&user.username),
            _ => None,
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// The navigable views of the console shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Feed,
    Sites,
    Logs,
    Settings,
    ApiKeys,
}

impl View {
    pub fn all() -> &'static [View] {
        &[
            View::Feed,
            View::Sites,
            View::Logs,
            View::Settings,
            View::ApiKeys,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Feed => "Content Dashboard",
            View::Sites => "Site Management",
            View::Logs => "System Logs",
            View::Settings => "Global Configuration",
            View::ApiKeys => "API Keys",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            View::Feed => "Recently scraped content",
            View::Sites => "Source configurations",
            View::Logs => "Live worker events",
            View::Settings => "System-wide settings",
            View::ApiKeys => "Issued credentials",
        }
    }

    pub fn nav_label(&self) -> &'static str {
        match self {
            View::Feed => "Feed",
            View::Sites => "Sites",
            View::Logs => "Logs",
            View::Settings => "Settings",
            View::ApiKeys => "API Keys",
        }
    }
}

// =============================================================================
// Per-view state
// =============================================================================

/// Feed view: server-side query plus the current page of results.
#[derive(Debug)]
pub struct FeedState {
    pub query: FeedQuery,
    /// Currently selected lookback preset, in hours. Kept alongside the
    /// absolute `query.since` so the picker can show its selection.
    pub lookback_hours: i64,
    pub items: Vec<PageDetail>,
    pub total: u64,
    pub total_pages: u32,
    pub loading: bool,
    /// Record opened in the full-text modal.
    pub selected: Option<PageDetail>,
    pub error: Option<String>,
    pub request_load: bool,
}

impl FeedState {
    fn new(page_size: u32) -> Self {
        Self {
            query: FeedQuery::recent(page_size),
            lookback_hours: crate::util::constants::DEFAULT_FEED_LOOKBACK_HOURS,
            items: Vec::new(),
            total: 0,
            total_pages: 0,
            loading: false,
            selected: None,
            error: None,
            request_load: false,
        }
    }

    /// Apply a lookback preset: recompute the absolute `since` bound,
    /// return to page 1, and re-query.
    pub fn set_lookback(&mut self, hours: i64) {
        self.lookback_hours = hours;
        self.query.since = chrono::Utc::now() - chrono::Duration::hours(hours);
        self.query.page = 1;
        self.request_load = true;
    }
}

/// Edit-modal working copy for one site.
#[derive(Debug, Clone)]
pub struct SiteEdit {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub sitemap_url: String,
}

impl SiteEdit {
    pub fn from_site(site: &Site) -> Self {
        Self {
            id: site.id.clone(),
            name: site.name.clone(),
            base_url: site.base_url.clone(),
            sitemap_url: site.sitemap_url.clone().unwrap_or_default(),
        }
    }
}

/// Sites view: list, add form, edit modal, and pending mutations.
#[derive(Debug, Default)]
pub struct SitesState {
    pub sites: Vec<Site>,
    pub loading: bool,
    pub show_form: bool,
    pub new_site: SiteCreate,
    pub editing: Option<SiteEdit>,
    /// (id, name) awaiting delete confirmation.
    pub confirm_delete: Option<(String, String)>,
    pub error: Option<String>,
    pub request_load: bool,
    pub request_create: Option<SiteCreate>,
    pub request_update: Option<(String, SiteUpdate)>,
    pub request_run: Option<String>,
    pub request_delete: Option<String>,
}

/// Connection state of the live log stream, rendered as the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnState {
    /// Logs view not mounted.
    #[default]
    Idle,
    Connecting,
    Live,
    Reconnecting {
        attempt: u32,
    },
    Disconnected,
}

/// Logs view: bounded live buffer plus display filters.
#[derive(Debug, Default)]
pub struct LogsState {
    pub buffer: LogBuffer,
    pub conn: ConnState,
    /// Local display filter; `None` shows every level.
    pub level_filter: Option<Level>,
    pub autoscroll: bool,
}

/// Settings view: one editable value per worker setting key.
#[derive(Debug, Default)]
pub struct SettingsState {
    pub values: HashMap<String, String>,
    pub loading: bool,
    pub error: Option<String>,
    /// Key of the most recently saved setting, for inline feedback.
    pub saved: Option<String>,
    pub request_load: bool,
    pub request_save: Option<(String, String)>,
}

/// API keys view: listing plus the generate modal with its one-time
/// secret reveal.
#[derive(Debug, Default)]
pub struct KeysState {
    pub keys: Vec<ApiKey>,
    pub loading: bool,
    pub show_generate: bool,
    pub new_name: String,
    pub generated: Option<GeneratedApiKey>,
    pub copied: bool,
    /// (id, name) awaiting revoke confirmation.
    pub confirm_revoke: Option<(String, String)>,
    pub error: Option<String>,
    pub request_load: bool,
    pub request_generate: Option<String>,
    pub request_revoke: Option<String>,
}

/// Login form state.
#[derive(Debug, Default)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub in_flight: bool,
    pub error: Option<String>,
    pub request_login: bool,
}

// =============================================================================
// AppState
// =============================================================================

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    pub session: Session,
    pub view: View,
    /// Mount generation. Bumped on every view switch and session reset;
    /// responses stamped with an older generation are dropped, which is
    /// what suppresses callbacks for an unmounted view.
    pub generation: u64,

    pub feed: FeedState,
    pub sites: SitesState,
    pub logs: LogsState,
    pub settings: SettingsState,
    pub keys: KeysState,
    pub login: LoginState,

    /// Status bar message.
    pub status_message: String,
    pub request_logout: bool,
}

impl AppState {
    pub fn new(page_size: u32) -> Self {
        Self {
            session: Session::Unknown,
            view: View::default(),
            generation: 0,
            feed: FeedState::new(page_size),
            sites: SitesState::default(),
            logs: LogsState {
                autoscroll: true,
                ..Default::default()
            },
            settings: SettingsState::default(),
            keys: KeysState::default(),
            login: LoginState::default(),
            status_message: "Connecting to backend…".to_string(),
            request_logout: false,
        }
    }

    /// Switch views, invalidating responses addressed to the old mount.
    /// Returns the previous view so the caller can tear down its resources.
    pub fn set_view(&mut self, view: View) -> View {
        let previous = self.view;
        if view != previous {
            self.view = view;
            self.generation += 1;
            // Responses for the old mount are dropped, so its loading
            // flags would otherwise stay set forever.
            self.clear_loading();
        }
        previous
    }

    fn clear_loading(&mut self) {
        self.feed.loading = false;
        self.sites.loading = false;
        self.settings.loading = false;
        self.keys.loading = false;
    }

    /// Reset to the login gate. Called on logout and whenever any response
    /// comes back `Unauthorized`.
    pub fn reset_session(&mut self) {
        self.session = Session::Anonymous;
        self.generation += 1;
        self.login = LoginState::default();
        self.feed.items.clear();
        self.feed.selected = None;
        self.feed.loading = false;
        self.feed.error = None;
        self.sites = SitesState::default();
        self.settings = SettingsState::default();
        self.keys = KeysState::default();
        self.logs.buffer.clear();
        self.logs.conn = ConnState::Idle;
    }

    // =========================================================================
    // Optimistic mutations + reconciliation
    // =========================================================================

    /// Flip a site's enabled flag locally and return the value to send in
    /// the PATCH. The server echo arriving later overwrites the record.
    pub fn toggle_site(&mut self, id: &str) -> Option<bool> {
        let site = self.sites.sites.iter_mut().find(|s| s.id == id)?;
        site.enabled = !site.enabled;
        Some(site.enabled)
    }

    /// Replace the local record with the server-echoed one.
    pub fn reconcile_site(&mut self, site: Site) {
        if let Some(existing) = self.sites.sites.iter_mut().find(|s| s.id == site.id) {
            *existing = site;
        } else {
            self.sites.sites.push(site);
        }
    }

    /// Drop a site locally; the confirm dialog already happened.
    pub fn remove_site(&mut self, id: &str) {
        self.sites.sites.retain(|s| s.id != id);
    }

    /// Mark a key inactive locally. Listings refreshed from the backend
    /// only contain active keys, so the record disappears on next load.
    pub fn revoke_key(&mut self, id: &str) {
        if let Some(key) = self.keys.keys.iter_mut().find(|k| k.id == id) {
            key.is_active = false;
        }
    }

    /// Keys still shown as usable credentials.
    pub fn active_keys(&self) -> impl Iterator<Item = &ApiKey> {
        self.keys.keys.iter().filter(|k| k.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_site(id: &str, enabled: bool) -> Site {
        Site {
            id: id.to_string(),
            name: format!("site {id}"),
            base_url: "https://example.com".to_string(),
            enabled,
            sitemap_url: None,
            rss_url: None,
            crawl_strategy: Default::default(),
            rate_limit_ms: None,
            user_agent: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            pages_count: 0,
            pending_count: 0,
            config_warning: None,
        }
    }

    fn make_key(id: &str) -> ApiKey {
        ApiKey {
            id: id.to_string(),
            name: format!("key {id}"),
            prefix: "abcd1234".to_string(),
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[test]
    fn toggling_twice_returns_original_value() {
        let mut state = AppState::new(50);
        state.sites.sites.push(make_site("a", true));

        assert_eq!(state.toggle_site("a"), Some(false));
        assert_eq!(state.toggle_site("a"), Some(true));
        assert!(state.sites.sites[0].enabled);
    }

    #[test]
    fn toggle_of_unknown_site_is_a_no_op() {
        let mut state = AppState::new(50);
        assert_eq!(state.toggle_site("ghost"), None);
    }

    #[test]
    fn reconcile_overwrites_optimistic_copy() {
        let mut state = AppState::new(50);
        state.sites.sites.push(make_site("a", true));
        state.toggle_site("a");

        // Server echo disagrees (e.g. another admin re-enabled it).
        let echo = make_site("a", true);
        state.reconcile_site(echo);
        assert!(state.sites.sites[0].enabled);
        assert_eq!(state.sites.sites.len(), 1);
    }

    #[test]
    fn revoked_key_no_longer_listed_as_active() {
        let mut state = AppState::new(50);
        state.keys.keys.push(make_key("k1"));
        state.keys.keys.push(make_key("k2"));

        state.revoke_key("k1");
        let active: Vec<_> = state.active_keys().map(|k| k.id.clone()).collect();
        assert_eq!(active, vec!["k2"]);
    }

    #[test]
    fn view_switch_bumps_generation() {
        let mut state = AppState::new(50);
        let before = state.generation;
        state.set_view(View::Logs);
        assert_eq!(state.generation, before + 1);

        // Switching to the current view is not a remount.
        state.set_view(View::Logs);
        assert_eq!(state.generation, before + 1);
    }

    #[test]
    fn lookback_preset_reaches_query_pairs() {
        let mut state = AppState::new(50);
        state.feed.query.page = 4;

        state.feed.set_lookback(168);
        assert!(state.feed.request_load);
        assert_eq!(state.feed.query.page, 1);

        let pairs = state.feed.query.to_pairs();
        let since = pairs
            .iter()
            .find(|(k, _)| *k == "since")
            .map(|(_, v)| v.clone())
            .unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(&since).unwrap();
        let age = Utc::now().signed_duration_since(parsed);
        assert!(age >= chrono::Duration::hours(167));
        assert!(age <= chrono::Duration::hours(169));
    }

    #[test]
    fn view_switch_clears_stale_loading_flags() {
        let mut state = AppState::new(50);
        state.feed.loading = true;
        state.keys.loading = true;

        state.set_view(View::Sites);
        assert!(!state.feed.loading);
        assert!(!state.keys.loading);
    }

    #[test]
    fn session_reset_clears_protected_state() {
        let mut state = AppState::new(50);
        state.session = Session::Authenticated(SessionUser {
            username: "admin".to_string(),
        });
        state.sites.sites.push(make_site("a", true));
        state.keys.keys.push(make_key("k1"));
        let generation = state.generation;

        state.reset_session();
        assert!(!state.session.is_authenticated());
        assert!(state.sites.sites.is_empty());
        assert!(state.keys.keys.is_empty());
        assert!(state.generation > generation);
    }
}
