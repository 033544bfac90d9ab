// Web2Text Console - ui/panels/feed.rs
//
// Content feed: server-paginated listing of recently scraped pages with
// search, per-site filtering, and a full-text reader modal.
//
// All filtering is server-side. Changing any control re-queries page 1;
// the pager walks within the current filter set.

use crate::app::state::AppState;
use crate::core::model::{PageDetail, PageStatus};
use crate::ui::theme;
use crate::util::constants;

/// Render the feed view.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    render_controls(ui, state);
    ui.separator();

    if let Some(ref error) = state.feed.error {
        ui.colored_label(theme::ERROR_TEXT, error);
        ui.add_space(4.0);
    }

    if state.feed.loading && state.feed.items.is_empty() {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.spinner();
            ui.label(egui::RichText::new("Loading feed…").weak());
        });
        return;
    }

    if state.feed.items.is_empty() {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("No content in the selected window.").weak());
        });
    } else {
        render_items(ui, state);
    }

    render_pager(ui, state);
    render_reader(ui.ctx(), state);
}

fn render_controls(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        // Server-side search, submitted on Enter.
        let search = ui.add(
            egui::TextEdit::singleline(&mut state.feed.query.search)
                .hint_text("Search title and text…")
                .desired_width(240.0),
        );
        if search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            state.feed.query.page = 1;
            state.feed.request_load = true;
        }

        // Lookback window driving the server-side "since" bound.
        let lookback_label = constants::FEED_LOOKBACK_PRESETS
            .iter()
            .find(|(hours, _)| *hours == state.feed.lookback_hours)
            .map(|(_, label)| *label)
            .unwrap_or("Custom");
        egui::ComboBox::from_id_salt("feed_lookback")
            .selected_text(lookback_label)
            .show_ui(ui, |ui| {
                for (hours, label) in constants::FEED_LOOKBACK_PRESETS {
                    let selected = state.feed.lookback_hours == *hours;
                    if ui.selectable_label(selected, *label).clicked() && !selected {
                        state.feed.set_lookback(*hours);
                    }
                }
            });

        // Site filter, populated from the sites listing.
        let selected_name = state
            .feed
            .query
            .site_id
            .as_ref()
            .and_then(|id| state.sites.sites.iter().find(|s| &s.id == id))
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "All sites".to_string());
        egui::ComboBox::from_id_salt("feed_site_filter")
            .selected_text(selected_name)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(state.feed.query.site_id.is_none(), "All sites")
                    .clicked()
                {
                    state.feed.query.site_id = None;
                    state.feed.query.page = 1;
                    state.feed.request_load = true;
                }
                for site in &state.sites.sites {
                    let selected = state.feed.query.site_id.as_deref() == Some(site.id.as_str());
                    if ui.selectable_label(selected, &site.name).clicked() {
                        state.feed.query.site_id = Some(site.id.clone());
                        state.feed.query.page = 1;
                        state.feed.request_load = true;
                    }
                }
            });

        if ui.button("Refresh").clicked() {
            state.feed.request_load = true;
        }

        if state.feed.loading {
            ui.spinner();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                egui::RichText::new(format!("{} records", state.feed.total))
                    .small()
                    .weak(),
            );
        });
    });
}

fn render_items(ui: &mut egui::Ui, state: &mut AppState) {
    let pager_reserve = theme::STATUS_BAR_HEIGHT + 8.0;
    let mut open: Option<PageDetail> = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height(ui.available_height() - pager_reserve)
        .show(ui, |ui| {
            for item in &state.feed.items {
                let title = item.title.as_deref().unwrap_or(&item.url);
                let response = ui
                    .scope(|ui| {
                        ui.horizontal(|ui| {
                            ui.label(status_badge(item.status));
                            ui.label(egui::RichText::new(title).strong());
                        });
                        ui.horizontal(|ui| {
                            if let Some(ref site_name) = item.site_name {
                                ui.label(egui::RichText::new(site_name).small());
                                ui.label(egui::RichText::new("·").small().weak());
                            }
                            if let Some(date) = item.display_date() {
                                ui.label(
                                    egui::RichText::new(
                                        date.format("%Y-%m-%d %H:%M").to_string(),
                                    )
                                    .small()
                                    .weak(),
                                );
                                ui.label(egui::RichText::new("·").small().weak());
                            }
                            ui.label(
                                egui::RichText::new(&item.canonical_url)
                                    .small()
                                    .weak()
                                    .monospace(),
                            );
                        });
                        if let Some(ref error) = item.error {
                            ui.colored_label(
                                theme::ERROR_TEXT,
                                egui::RichText::new(error).small(),
                            );
                        }
                    })
                    .response;

                if response.interact(egui::Sense::click()).clicked() {
                    open = Some(item.clone());
                }
                ui.separator();
            }
        });

    if let Some(item) = open {
        state.feed.selected = Some(item);
    }
}

fn render_pager(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        let can_prev = state.feed.query.page > 1 && !state.feed.loading;
        if ui.add_enabled(can_prev, egui::Button::new("◀ Prev")).clicked() {
            state.feed.query.page -= 1;
            state.feed.request_load = true;
        }

        ui.label(format!(
            "Page {} of {}",
            state.feed.query.page,
            state.feed.total_pages.max(1)
        ));

        let can_next = state.feed.query.page < state.feed.total_pages && !state.feed.loading;
        if ui.add_enabled(can_next, egui::Button::new("Next ▶")).clicked() {
            state.feed.query.page += 1;
            state.feed.request_load = true;
        }
    });
}

/// Full-text reader modal for the selected record.
fn render_reader(ctx: &egui::Context, state: &mut AppState) {
    let Some(ref item) = state.feed.selected else {
        return;
    };
    let item = item.clone();

    let mut open = true;
    egui::Window::new(item.title.as_deref().unwrap_or("Untitled"))
        .open(&mut open)
        .collapsible(false)
        .default_width(640.0)
        .max_height(480.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(status_badge(item.status));
                ui.label(egui::RichText::new(format!("via {}", item.discovered_via.label())).weak());
                if let Some(http_status) = item.http_status {
                    ui.label(egui::RichText::new(format!("HTTP {http_status}")).weak());
                }
                // How the backend verified the published date, when it says.
                if let Some(source) = item
                    .latest_content
                    .as_ref()
                    .and_then(|content| content.date_source())
                {
                    ui.label(
                        egui::RichText::new(format!("date via {source}"))
                            .small()
                            .weak(),
                    );
                }
            });
            ui.hyperlink(&item.url);
            ui.separator();

            match item.latest_content {
                Some(ref content) if !content.extracted_text.is_empty() => {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, true])
                        .show(ui, |ui| {
                            ui.label(&content.extracted_text);
                        });
                }
                _ => {
                    ui.label(egui::RichText::new("No extracted text for this record.").weak());
                }
            }
        });

    if !open {
        state.feed.selected = None;
    }
}

fn status_badge(status: PageStatus) -> egui::RichText {
    match status {
        PageStatus::New => egui::RichText::new("NEW").small().color(theme::ACCENT_OK),
        PageStatus::Processed => egui::RichText::new("PROCESSED").small().color(theme::MUTED),
        PageStatus::Failed => egui::RichText::new("FAILED").small().color(theme::ERROR_TEXT),
        PageStatus::Skipped => egui::RichText::new("SKIPPED").small().color(theme::MUTED),
    }
}
