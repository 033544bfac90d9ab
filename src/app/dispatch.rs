// Web2Text Console - app/dispatch.rs
//
// Background REST request dispatch.
//
// Architecture:
//   - `Dispatcher` lives on the UI thread and spawns one short-lived
//     background thread per request, each holding a clone of the
//     `ApiClient` (shared connection pool + cookie store).
//   - Results come back as typed `ApiPayload` messages over an mpsc
//     channel; the UI thread polls the channel each frame.
//   - Every event is stamped with the mount generation current at spawn
//     time. `poll` drops events from an older generation, which is what
//     suppresses in-flight callbacks after a view unmounts. The underlying
//     request itself is not cancelled, only its result ignored.

use crate::api::ApiClient;
use crate::core::model::{
    ApiKey, FeedPage, FeedQuery, GeneratedApiKey, SessionUser, Setting, Site, SiteCreate,
    SiteUpdate,
};
use crate::util::constants::MAX_API_MESSAGES_PER_FRAME;
use crate::util::error::ApiError;
use std::sync::mpsc;

// =============================================================================
// Messages
// =============================================================================

/// One completed REST call, typed per operation.
#[derive(Debug)]
pub enum ApiPayload {
    Session(Result<SessionUser, ApiError>),
    LoginDone(Result<(), ApiError>),
    LogoutDone(Result<(), ApiError>),

    Sites(Result<Vec<Site>, ApiError>),
    SiteCreated(Result<Site, ApiError>),
    SiteUpdated(Result<Site, ApiError>),
    SiteDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    RunTriggered {
        id: String,
        result: Result<(), ApiError>,
    },

    Feed(Result<FeedPage, ApiError>),

    Setting {
        key: String,
        result: Result<Setting, ApiError>,
    },
    SettingSaved {
        key: String,
        result: Result<Setting, ApiError>,
    },

    Keys(Result<Vec<ApiKey>, ApiError>),
    KeyGenerated(Result<GeneratedApiKey, ApiError>),
    KeyRevoked {
        id: String,
        result: Result<(), ApiError>,
    },
}

impl ApiPayload {
    /// True when the carried result is a 401. The GUI gate resets the
    /// session on any such event, regardless of which view asked.
    pub fn is_unauthorized(&self) -> bool {
        fn unauth<T>(result: &Result<T, ApiError>) -> bool {
            matches!(result, Err(ApiError::Unauthorized))
        }
        match self {
            // A 401 from the session probe or login is the gate's normal
            // "not signed in" answer, not a session expiry.
            ApiPayload::Session(_) | ApiPayload::LoginDone(_) | ApiPayload::LogoutDone(_) => false,
            ApiPayload::Sites(r) => unauth(r),
            ApiPayload::SiteCreated(r) | ApiPayload::SiteUpdated(r) => unauth(r),
            ApiPayload::SiteDeleted { result, .. }
            | ApiPayload::RunTriggered { result, .. }
            | ApiPayload::KeyRevoked { result, .. } => unauth(result),
            ApiPayload::Feed(r) => unauth(r),
            ApiPayload::Setting { result, .. } | ApiPayload::SettingSaved { result, .. } => {
                unauth(result)
            }
            ApiPayload::Keys(r) => unauth(r),
            ApiPayload::KeyGenerated(r) => unauth(r),
        }
    }
}

struct ApiEvent {
    generation: u64,
    payload: ApiPayload,
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Spawns REST requests on background threads and collects their results.
pub struct Dispatcher {
    client: ApiClient,
    tx: mpsc::Sender<ApiEvent>,
    rx: mpsc::Receiver<ApiEvent>,
}

impl Dispatcher {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { client, tx, rx }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn spawn<F>(&self, generation: u64, job: F)
    where
        F: FnOnce(&ApiClient) -> ApiPayload + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let payload = job(&client);
            // UI channel closed means the app is shutting down.
            let _ = tx.send(ApiEvent {
                generation,
                payload,
            });
        });
    }

    /// Drain completed requests without blocking, dropping events from a
    /// mount generation older than `current`. Bounded per frame so a
    /// burst cannot stall the render loop.
    pub fn poll(&self, current: u64) -> Vec<ApiPayload> {
        let mut payloads = Vec::new();
        while payloads.len() < MAX_API_MESSAGES_PER_FRAME {
            match self.rx.try_recv() {
                Ok(event) if event.generation == current => payloads.push(event.payload),
                Ok(event) => {
                    tracing::debug!(
                        stale = event.generation,
                        current,
                        "Dropping response for unmounted view"
                    );
                }
                Err(_) => break,
            }
        }
        payloads
    }

    // =========================================================================
    // Operations
    // =========================================================================

    pub fn probe_session(&self, generation: u64) {
        self.spawn(generation, |c| ApiPayload::Session(c.me()));
    }

    pub fn login(&self, generation: u64, username: String, password: String) {
        self.spawn(generation, move |c| {
            ApiPayload::LoginDone(c.login(&username, &password))
        });
    }

    pub fn logout(&self, generation: u64) {
        self.spawn(generation, |c| ApiPayload::LogoutDone(c.logout()));
    }

    pub fn load_sites(&self, generation: u64) {
        self.spawn(generation, |c| ApiPayload::Sites(c.list_sites()));
    }

    pub fn create_site(&self, generation: u64, site: SiteCreate) {
        self.spawn(generation, move |c| {
            ApiPayload::SiteCreated(c.create_site(&site))
        });
    }

    pub fn update_site(&self, generation: u64, id: String, update: SiteUpdate) {
        self.spawn(generation, move |c| {
            ApiPayload::SiteUpdated(c.update_site(&id, &update))
        });
    }

    pub fn delete_site(&self, generation: u64, id: String) {
        self.spawn(generation, move |c| {
            let result = c.delete_site(&id);
            ApiPayload::SiteDeleted { id, result }
        });
    }

    pub fn run_site(&self, generation: u64, id: String) {
        self.spawn(generation, move |c| {
            let result = c.run_site(&id);
            ApiPayload::RunTriggered { id, result }
        });
    }

    pub fn load_feed(&self, generation: u64, query: FeedQuery) {
        self.spawn(generation, move |c| ApiPayload::Feed(c.feed(&query)));
    }

    pub fn load_setting(&self, generation: u64, key: String) {
        self.spawn(generation, move |c| {
            let result = c.setting(&key);
            ApiPayload::Setting { key, result }
        });
    }

    pub fn save_setting(&self, generation: u64, key: String, value: String) {
        self.spawn(generation, move |c| {
            let result = c.save_setting(&key, &value);
            ApiPayload::SettingSaved { key, result }
        });
    }

    pub fn load_keys(&self, generation: u64) {
        self.spawn(generation, |c| ApiPayload::Keys(c.list_api_keys()));
    }

    pub fn generate_key(&self, generation: u64, name: String) {
        self.spawn(generation, move |c| {
            ApiPayload::KeyGenerated(c.generate_api_key(&name))
        });
    }

    pub fn revoke_key(&self, generation: u64, id: String) {
        self.spawn(generation, move |c| {
            let result = c.revoke_api_key(&id);
            ApiPayload::KeyRevoked { id, result }
        });
    }
}
