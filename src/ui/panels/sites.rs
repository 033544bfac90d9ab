// Web2Text Console - ui/panels/sites.rs
//
// Site management: listing, add form, edit modal, enable toggle, manual
// run trigger, and delete confirmation.
//
// The enabled toggle is optimistic: the row flips immediately and the
// PATCH is queued through a request member; the server echo reconciles
// the record when it lands.

use crate::app::state::{AppState, SiteEdit};
use crate::core::model::{CrawlStrategy, SiteCreate, SiteUpdate};
use crate::ui::theme;

/// Render the sites view.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("＋ Add site").clicked() {
            state.sites.show_form = true;
            state.sites.new_site = SiteCreate {
                enabled: true,
                ..Default::default()
            };
        }
        if ui.button("Refresh").clicked() {
            state.sites.request_load = true;
        }
        if state.sites.loading {
            ui.spinner();
        }
    });

    if let Some(ref error) = state.sites.error {
        ui.colored_label(theme::ERROR_TEXT, error);
    }
    ui.separator();

    if state.sites.sites.is_empty() && !state.sites.loading {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("No sites configured yet.").weak());
        });
    } else {
        render_table(ui, state);
    }

    render_add_form(ui.ctx(), state);
    render_edit_modal(ui.ctx(), state);
    render_delete_confirm(ui.ctx(), state);
}

fn render_table(ui: &mut egui::Ui, state: &mut AppState) {
    // Row actions are collected first; applying them needs &mut state
    // while the loop borrows the site list.
    let mut toggle: Option<String> = None;
    let mut run: Option<String> = None;
    let mut edit: Option<SiteEdit> = None;
    let mut delete: Option<(String, String)> = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("sites_table")
                .num_columns(6)
                .striped(true)
                .min_row_height(theme::ROW_HEIGHT + 6.0)
                .show(ui, |ui| {
                    ui.label(egui::RichText::new("Site").strong());
                    ui.label(egui::RichText::new("Strategy").strong());
                    ui.label(egui::RichText::new("Pages").strong());
                    ui.label(egui::RichText::new("Pending").strong());
                    ui.label(egui::RichText::new("Enabled").strong());
                    ui.label("");
                    ui.end_row();

                    for site in &state.sites.sites {
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&site.name).strong());
                                if let Some(ref warning) = site.config_warning {
                                    ui.label(egui::RichText::new("⚠").color(theme::ERROR_TEXT))
                                        .on_hover_text(warning);
                                }
                            });
                            ui.label(
                                egui::RichText::new(&site.base_url)
                                    .small()
                                    .weak()
                                    .monospace(),
                            );
                        });
                        ui.label(site.crawl_strategy.label());
                        ui.label(site.pages_count.to_string());
                        ui.label(site.pending_count.to_string());

                        let mut enabled = site.enabled;
                        if ui.checkbox(&mut enabled, "").changed() {
                            toggle = Some(site.id.clone());
                        }

                        ui.horizontal(|ui| {
                            if ui
                                .small_button("Run")
                                .on_hover_text("Queue a scrape of this site now")
                                .clicked()
                            {
                                run = Some(site.id.clone());
                            }
                            if ui.small_button("Edit").clicked() {
                                edit = Some(SiteEdit::from_site(site));
                            }
                            if ui.small_button("Delete").clicked() {
                                delete = Some((site.id.clone(), site.name.clone()));
                            }
                        });
                        ui.end_row();
                    }
                });
        });

    if let Some(id) = toggle {
        if let Some(new_value) = state.toggle_site(&id) {
            state.sites.request_update = Some((id, SiteUpdate::enabled(new_value)));
        }
    }
    if let Some(id) = run {
        state.sites.request_run = Some(id);
    }
    if let Some(working) = edit {
        state.sites.editing = Some(working);
    }
    if let Some(target) = delete {
        state.sites.confirm_delete = Some(target);
    }
}

fn render_add_form(ctx: &egui::Context, state: &mut AppState) {
    if !state.sites.show_form {
        return;
    }

    let mut open = true;
    egui::Window::new("Add site")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(theme::FORM_WIDTH)
        .show(ctx, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut state.sites.new_site.name);
            ui.add_space(4.0);

            ui.label("Base URL");
            ui.text_edit_singleline(&mut state.sites.new_site.base_url);
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Discovery:");
                strategy_combo(ui, "new_site_strategy", &mut state.sites.new_site.crawl_strategy);
                ui.checkbox(&mut state.sites.new_site.enabled, "Enabled");
            });
            ui.add_space(8.0);

            let valid = !state.sites.new_site.name.trim().is_empty()
                && state.sites.new_site.base_url.starts_with("http");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(valid, egui::Button::new("Create")).clicked() {
                    state.sites.request_create = Some(state.sites.new_site.clone());
                    state.sites.show_form = false;
                }
                if ui.button("Cancel").clicked() {
                    state.sites.show_form = false;
                }
            });
        });

    if !open {
        state.sites.show_form = false;
    }
}

fn render_edit_modal(ctx: &egui::Context, state: &mut AppState) {
    let Some(working) = state.sites.editing.as_mut() else {
        return;
    };

    let mut open = true;
    let mut submit = false;
    let mut cancel = false;

    egui::Window::new("Edit site")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(theme::FORM_WIDTH)
        .show(ctx, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut working.name);
            ui.add_space(4.0);

            ui.label("Base URL");
            ui.add_enabled(false, egui::TextEdit::singleline(&mut working.base_url));
            ui.label(
                egui::RichText::new("The base URL identifies the site and cannot change.")
                    .small()
                    .weak(),
            );
            ui.add_space(4.0);

            ui.label("Sitemap URL (optional)");
            ui.text_edit_singleline(&mut working.sitemap_url);
            ui.add_space(8.0);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let valid = !working.name.trim().is_empty();
                submit = ui.add_enabled(valid, egui::Button::new("Save")).clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });

    if submit {
        let working = state.sites.editing.take();
        if let Some(working) = working {
            let update = SiteUpdate {
                name: Some(working.name.trim().to_string()),
                sitemap_url: if working.sitemap_url.trim().is_empty() {
                    None
                } else {
                    Some(working.sitemap_url.trim().to_string())
                },
                ..Default::default()
            };
            state.sites.request_update = Some((working.id, update));
        }
    } else if cancel || !open {
        state.sites.editing = None;
    }
}

fn render_delete_confirm(ctx: &egui::Context, state: &mut AppState) {
    let Some((id, name)) = state.sites.confirm_delete.clone() else {
        return;
    };

    let mut open = true;
    egui::Window::new("Delete site?")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "Delete \"{name}\" and all of its indexed pages? This cannot be undone."
            ));
            ui.add_space(8.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .button(egui::RichText::new("Delete").color(theme::ERROR_TEXT))
                    .clicked()
                {
                    state.sites.request_delete = Some(id);
                    state.sites.confirm_delete = None;
                }
                if ui.button("Cancel").clicked() {
                    state.sites.confirm_delete = None;
                }
            });
        });

    if !open {
        state.sites.confirm_delete = None;
    }
}

fn strategy_combo(ui: &mut egui::Ui, id: &str, strategy: &mut CrawlStrategy) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(strategy.label())
        .show_ui(ui, |ui| {
            for candidate in [CrawlStrategy::Sitemap, CrawlStrategy::Rss, CrawlStrategy::Links] {
                ui.selectable_value(strategy, candidate, candidate.label());
            }
        });
}
