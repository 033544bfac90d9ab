// Web2Text Console - gui.rs
//
// Top-level eframe::App implementation.
// Wires the panels to the REST dispatcher and the log stream manager:
// every frame it drains completed requests and stream progress, then
// drains the request members panels set, then renders.
//
// The session gate lives here: until the backend confirms a session
// the only reachable surface is the login form, and any protected
// response coming back 401 resets the gate.

use crate::api::ApiClient;
use crate::app::dispatch::{ApiPayload, Dispatcher};
use crate::app::state::{AppState, ConnState, Session, View};
use crate::app::stream::{StreamManager, StreamProgress};
use crate::core::model::{Level, LogEvent};
use crate::ui::{panels, theme};
use crate::util::constants::{APP_NAME, STREAM_READ_TIMEOUT_MS, WORKER_SETTING_KEYS};
use crate::util::error::ApiError;
use std::time::Duration;

/// The Web2Text Console application.
pub struct ConsoleApp {
    pub state: AppState,
    pub dispatcher: Dispatcher,
    pub stream: StreamManager,
}

impl ConsoleApp {
    /// Create the application and fire the startup session probe.
    pub fn new(state: AppState, client: ApiClient) -> Self {
        let dispatcher = Dispatcher::new(client);
        dispatcher.probe_session(state.generation);
        Self {
            state,
            dispatcher,
            stream: StreamManager::new(),
        }
    }

    // =========================================================================
    // Response handling
    // =========================================================================

    fn apply_payload(&mut self, payload: ApiPayload) {
        // Any 401 on a protected call means the cookie expired server-side.
        if payload.is_unauthorized() {
            tracing::info!("Session rejected by backend, returning to login");
            self.teardown_stream();
            self.state.reset_session();
            self.state.login.error = Some("Session expired, please sign in again.".to_string());
            return;
        }

        match payload {
            ApiPayload::Session(Ok(user)) => {
                tracing::info!(username = %user.username, "Session confirmed");
                self.state.status_message = format!("Signed in as {}", user.username);
                self.state.session = Session::Authenticated(user);
                self.state.login = Default::default();
                self.enter_view(self.state.view);
            }
            ApiPayload::Session(Err(e)) => {
                match e {
                    ApiError::Unauthorized => {
                        self.state.status_message = "Please sign in.".to_string();
                    }
                    other => {
                        self.state.status_message = format!("Backend unreachable: {other}");
                    }
                }
                self.state.session = Session::Anonymous;
            }

            ApiPayload::LoginDone(Ok(())) => {
                // Cookie is set; confirm and fetch the username.
                self.dispatcher.probe_session(self.state.generation);
            }
            ApiPayload::LoginDone(Err(e)) => {
                self.state.login.in_flight = false;
                self.state.login.error = Some(match e {
                    ApiError::Unauthorized => "Invalid username or password.".to_string(),
                    other => format!("Login failed: {other}"),
                });
            }

            // Logout outcome is irrelevant, the local session is gone either way.
            ApiPayload::LogoutDone(_) => {
                self.teardown_stream();
                self.state.reset_session();
                self.state.status_message = "Signed out.".to_string();
            }

            ApiPayload::Sites(result) => {
                self.state.sites.loading = false;
                match result {
                    Ok(sites) => {
                        self.state.sites.error = None;
                        self.state.sites.sites = sites;
                    }
                    Err(e) => self.state.sites.error = Some(e.to_string()),
                }
            }
            ApiPayload::SiteCreated(result) => match result {
                Ok(site) => {
                    self.state.status_message = format!("Site \"{}\" created.", site.name);
                    self.state.reconcile_site(site);
                }
                Err(e) => self.state.sites.error = Some(format!("Create failed: {e}")),
            },
            ApiPayload::SiteUpdated(result) => match result {
                Ok(site) => self.state.reconcile_site(site),
                Err(e) => {
                    // Roll back the optimistic copy by reloading the listing.
                    self.state.sites.error = Some(format!("Update failed: {e}"));
                    self.state.sites.request_load = true;
                }
            },
            ApiPayload::SiteDeleted { id, result } => match result {
                Ok(()) => {
                    self.state.status_message = "Site deleted.".to_string();
                    let _ = id;
                }
                Err(e) => {
                    self.state.sites.error = Some(format!("Delete failed: {e}"));
                    self.state.sites.request_load = true;
                }
            },
            ApiPayload::RunTriggered { id, result } => match result {
                Ok(()) => {
                    let name = self
                        .state
                        .sites
                        .sites
                        .iter()
                        .find(|s| s.id == id)
                        .map(|s| s.name.clone())
                        .unwrap_or(id);
                    self.state.status_message = format!("Scrape queued for \"{name}\".");
                }
                Err(e) => self.state.sites.error = Some(format!("Run failed: {e}")),
            },

            ApiPayload::Feed(result) => {
                self.state.feed.loading = false;
                match result {
                    Ok(page) => {
                        self.state.feed.error = None;
                        self.state.feed.items = page.items;
                        self.state.feed.total = page.total;
                        self.state.feed.total_pages = page.total_pages;
                        self.state.feed.query.page = page.page;
                        self.state.feed.query.clamp_page(page.total_pages);
                    }
                    Err(e) => self.state.feed.error = Some(e.to_string()),
                }
            }

            ApiPayload::Setting { key, result } => {
                self.state.settings.loading = false;
                match result {
                    Ok(setting) => {
                        self.state.settings.values.insert(key, setting.value);
                    }
                    // A key the backend has never stored reads as empty.
                    Err(ApiError::Http { status: 404, .. }) => {
                        self.state.settings.values.entry(key).or_default();
                    }
                    Err(e) => self.state.settings.error = Some(e.to_string()),
                }
            }
            ApiPayload::SettingSaved { key, result } => match result {
                Ok(setting) => {
                    self.state.settings.error = None;
                    self.state.settings.values.insert(key.clone(), setting.value);
                    self.state.settings.saved = Some(key);
                }
                Err(e) => self.state.settings.error = Some(format!("Save failed: {e}")),
            },

            ApiPayload::Keys(result) => {
                self.state.keys.loading = false;
                match result {
                    Ok(keys) => {
                        self.state.keys.error = None;
                        self.state.keys.keys = keys;
                    }
                    Err(e) => self.state.keys.error = Some(e.to_string()),
                }
            }
            ApiPayload::KeyGenerated(result) => match result {
                Ok(generated) => {
                    self.state.keys.error = None;
                    self.state.keys.keys.push(generated.record.clone());
                    self.state.keys.copied = false;
                    self.state.keys.generated = Some(generated);
                }
                Err(e) => self.state.keys.error = Some(format!("Generate failed: {e}")),
            },
            ApiPayload::KeyRevoked { id, result } => match result {
                Ok(()) => {
                    self.state.status_message = "API key revoked.".to_string();
                    let _ = id;
                }
                Err(e) => {
                    self.state.keys.error = Some(format!("Revoke failed: {e}"));
                    self.state.keys.request_load = true;
                }
            },
        }
    }

    fn apply_stream_progress(&mut self, progress: StreamProgress) {
        match progress {
            StreamProgress::Connected => {
                self.state.logs.conn = ConnState::Live;
                self.state
                    .logs
                    .buffer
                    .push(LogEvent::local("Connected to log stream", Level::Success));
            }
            StreamProgress::Event(event) => {
                self.state.logs.buffer.push(event);
            }
            StreamProgress::Malformed { reason, preview } => {
                self.state.logs.buffer.push(LogEvent::local(
                    format!("Dropped malformed frame ({reason}): {preview}"),
                    Level::Warning,
                ));
            }
            StreamProgress::Reconnecting { attempt, delay } => {
                self.state.logs.conn = ConnState::Reconnecting { attempt };
                self.state.logs.buffer.push(LogEvent::local(
                    format!(
                        "Reconnecting (attempt {attempt}) in {:.1}s…",
                        delay.as_secs_f64()
                    ),
                    Level::Info,
                ));
            }
            StreamProgress::Disconnected { reason } => {
                self.state.logs.conn = ConnState::Disconnected;
                self.state
                    .logs
                    .buffer
                    .push(LogEvent::local(format!("Stream lost: {reason}"), Level::Error));
            }
            StreamProgress::Stopped => {
                self.state.logs.conn = ConnState::Disconnected;
            }
        }
    }

    // =========================================================================
    // Request-member drain
    // =========================================================================

    fn drain_requests(&mut self) {
        let generation = self.state.generation;

        if self.state.login.request_login {
            self.state.login.request_login = false;
            self.state.login.in_flight = true;
            self.dispatcher.login(
                generation,
                self.state.login.username.trim().to_string(),
                self.state.login.password.clone(),
            );
        }

        if self.state.request_logout {
            self.state.request_logout = false;
            self.dispatcher.logout(generation);
        }

        if self.state.feed.request_load {
            self.state.feed.request_load = false;
            self.state.feed.loading = true;
            self.state.feed.error = None;
            self.dispatcher
                .load_feed(generation, self.state.feed.query.clone());
        }

        if self.state.sites.request_load {
            self.state.sites.request_load = false;
            self.state.sites.loading = true;
            self.dispatcher.load_sites(generation);
        }
        if let Some(site) = self.state.sites.request_create.take() {
            self.dispatcher.create_site(generation, site);
        }
        if let Some((id, update)) = self.state.sites.request_update.take() {
            self.dispatcher.update_site(generation, id, update);
        }
        if let Some(id) = self.state.sites.request_run.take() {
            self.dispatcher.run_site(generation, id);
        }
        if let Some(id) = self.state.sites.request_delete.take() {
            // Optimistic removal; a failed DELETE reloads the listing.
            self.state.remove_site(&id);
            self.dispatcher.delete_site(generation, id);
        }

        if self.state.settings.request_load {
            self.state.settings.request_load = false;
            self.state.settings.loading = true;
            self.state.settings.error = None;
            self.state.settings.saved = None;
            for key in WORKER_SETTING_KEYS {
                self.dispatcher.load_setting(generation, key.to_string());
            }
        }
        if let Some((key, value)) = self.state.settings.request_save.take() {
            self.dispatcher.save_setting(generation, key, value);
        }

        if self.state.keys.request_load {
            self.state.keys.request_load = false;
            self.state.keys.loading = true;
            self.dispatcher.load_keys(generation);
        }
        if let Some(name) = self.state.keys.request_generate.take() {
            self.dispatcher.generate_key(generation, name);
        }
        if let Some(id) = self.state.keys.request_revoke.take() {
            // Optimistic deactivation; a failed revoke reloads the listing.
            self.state.revoke_key(&id);
            self.dispatcher.revoke_key(generation, id);
        }
    }

    // =========================================================================
    // View lifecycle
    // =========================================================================

    /// Queue the loads a freshly mounted view needs.
    fn enter_view(&mut self, view: View) {
        match view {
            View::Feed => {
                self.state.feed.request_load = true;
                // The site filter dropdown needs the sites listing.
                self.state.sites.request_load = true;
            }
            View::Sites => self.state.sites.request_load = true,
            View::Logs => self.start_stream(),
            View::Settings => self.state.settings.request_load = true,
            View::ApiKeys => self.state.keys.request_load = true,
        }
    }

    fn start_stream(&mut self) {
        self.state.logs.conn = ConnState::Connecting;
        self.stream.start(self.dispatcher.client().log_stream_url());
    }

    fn teardown_stream(&mut self) {
        if self.stream.is_active() {
            self.stream.stop();
        }
        self.state.logs.conn = ConnState::Idle;
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render_shell(&mut self, ctx: &egui::Context) {
        let mut switch_to: Option<View> = None;

        egui::SidePanel::left("nav")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading(APP_NAME);
                if let Some(username) = self.state.session.username() {
                    ui.label(egui::RichText::new(username).small().weak());
                }
                ui.add_space(8.0);
                ui.separator();

                for view in View::all() {
                    let selected = self.state.view == *view;
                    if ui.selectable_label(selected, view.nav_label()).clicked() && !selected {
                        switch_to = Some(*view);
                    }
                }

                ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                    ui.add_space(8.0);
                    if ui.button("Sign out").clicked() {
                        self.state.request_logout = true;
                    }
                    ui.separator();
                });
            });

        if let Some(view) = switch_to {
            let previous = self.state.set_view(view);
            if previous == View::Logs {
                self.teardown_stream();
            }
            self.enter_view(view);
        }

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(theme::STATUS_BAR_HEIGHT)
            .frame(egui::Frame::NONE.fill(theme::STATUS_BG))
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.add_space(8.0);
                    ui.colored_label(theme::STATUS_TEXT, &self.state.status_message);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.state.view.title());
            ui.label(egui::RichText::new(self.state.view.subtitle()).weak());
            ui.add_space(6.0);
            ui.separator();

            match self.state.view {
                View::Feed => panels::feed::render(ui, &mut self.state),
                View::Sites => panels::sites::render(ui, &mut self.state),
                View::Logs => panels::logs::render(ui, &mut self.state),
                View::Settings => panels::settings::render(ui, &mut self.state),
                View::ApiKeys => panels::api_keys::render(ui, &mut self.state),
            }
        });
    }

    fn render_gate(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| match self.state.session {
            Session::Unknown => {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.4);
                    ui.spinner();
                    ui.label("Checking session…");
                });
            }
            _ => panels::login::render(ui, &mut self.state),
        });
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Completed REST requests. Stale-generation responses were already
        // dropped inside poll().
        let payloads = self.dispatcher.poll(self.state.generation);
        let had_payloads = !payloads.is_empty();
        for payload in payloads {
            self.apply_payload(payload);
        }

        // Live stream progress.
        let progress = self.stream.poll_progress();
        let had_progress = !progress.is_empty();
        for msg in progress {
            self.apply_stream_progress(msg);
        }

        // Requests queued by panels last frame.
        self.drain_requests();

        if self.state.session.is_authenticated() {
            self.render_shell(ctx);
        } else {
            if self.stream.is_active() {
                self.teardown_stream();
            }
            self.render_gate(ctx);
        }

        // Keep polling while anything is in flight; egui only repaints on
        // input otherwise and background results would sit unread.
        let busy = had_payloads
            || had_progress
            || self.stream.is_active()
            || self.state.login.in_flight
            || matches!(self.state.session, Session::Unknown)
            || self.state.feed.loading
            || self.state.sites.loading
            || self.state.settings.loading
            || self.state.keys.loading;
        if busy {
            ctx.request_repaint_after(Duration::from_millis(STREAM_READ_TIMEOUT_MS));
        }
    }
}
