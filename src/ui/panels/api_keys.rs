// Web2Text Console - ui/panels/api_keys.rs
//
// API key management: listing of active credentials, generation with
// the one-time secret reveal, and revocation with confirmation.
//
// The full secret exists client-side only inside the reveal modal and
// is discarded when the modal closes. Listings only ever carry the
// prefix.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the API keys view.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("＋ Generate key").clicked() {
            state.keys.show_generate = true;
            state.keys.new_name.clear();
        }
        if ui.button("Refresh").clicked() {
            state.keys.request_load = true;
        }
        if state.keys.loading {
            ui.spinner();
        }
    });
    if let Some(ref error) = state.keys.error {
        ui.colored_label(theme::ERROR_TEXT, error);
    }
    ui.separator();

    render_table(ui, state);
    render_generate_form(ui.ctx(), state);
    render_reveal_modal(ui.ctx(), state);
    render_revoke_confirm(ui.ctx(), state);
}

fn render_table(ui: &mut egui::Ui, state: &mut AppState) {
    let active: Vec<_> = state.active_keys().cloned().collect();
    if active.is_empty() && !state.keys.loading {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("No active API keys.").weak());
        });
        return;
    }

    let mut revoke: Option<(String, String)> = None;

    egui::Grid::new("api_keys_table")
        .num_columns(4)
        .striped(true)
        .min_row_height(theme::ROW_HEIGHT + 4.0)
        .show(ui, |ui| {
            ui.label(egui::RichText::new("Name").strong());
            ui.label(egui::RichText::new("Key").strong());
            ui.label(egui::RichText::new("Created").strong());
            ui.label("");
            ui.end_row();

            for key in &active {
                ui.label(&key.name);
                ui.label(egui::RichText::new(format!("{}…", key.prefix)).monospace());
                ui.label(key.created_at.format("%Y-%m-%d").to_string());
                if ui.small_button("Revoke").clicked() {
                    revoke = Some((key.id.clone(), key.name.clone()));
                }
                ui.end_row();
            }
        });

    if let Some(target) = revoke {
        state.keys.confirm_revoke = Some(target);
    }
}

fn render_generate_form(ctx: &egui::Context, state: &mut AppState) {
    if !state.keys.show_generate {
        return;
    }

    let mut open = true;
    egui::Window::new("Generate API key")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(theme::FORM_WIDTH)
        .show(ctx, |ui| {
            ui.label("Key name");
            ui.text_edit_singleline(&mut state.keys.new_name);
            ui.label(
                egui::RichText::new("A label for your records, e.g. the consuming service.")
                    .small()
                    .weak(),
            );
            ui.add_space(8.0);

            let valid = !state.keys.new_name.trim().is_empty();
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(valid, egui::Button::new("Generate")).clicked() {
                    state.keys.request_generate =
                        Some(state.keys.new_name.trim().to_string());
                    state.keys.show_generate = false;
                }
                if ui.button("Cancel").clicked() {
                    state.keys.show_generate = false;
                }
            });
        });

    if !open {
        state.keys.show_generate = false;
    }
}

/// One-time secret reveal. Closing this modal is the last time the full
/// key is available anywhere.
fn render_reveal_modal(ctx: &egui::Context, state: &mut AppState) {
    let Some(ref generated) = state.keys.generated else {
        return;
    };
    let name = generated.record.name.clone();
    let secret = generated.key.clone();

    let mut dismiss = false;
    egui::Window::new(format!("Key \"{name}\" created"))
        .collapsible(false)
        .resizable(false)
        .default_width(theme::FORM_WIDTH)
        .show(ctx, |ui| {
            ui.colored_label(
                theme::ERROR_TEXT,
                "Copy this key now. It will not be shown again.",
            );
            ui.add_space(6.0);

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&secret).monospace());
            });
            ui.add_space(6.0);

            ui.horizontal(|ui| {
                if ui.button("Copy to clipboard").clicked() {
                    ui.ctx().copy_text(secret.clone());
                    state.keys.copied = true;
                }
                if state.keys.copied {
                    ui.colored_label(theme::ACCENT_OK, "Copied");
                }
            });
            ui.add_space(8.0);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                dismiss = ui.button("Done").clicked();
            });
        });

    if dismiss {
        state.keys.generated = None;
        state.keys.copied = false;
    }
}

fn render_revoke_confirm(ctx: &egui::Context, state: &mut AppState) {
    let Some((id, name)) = state.keys.confirm_revoke.clone() else {
        return;
    };

    let mut open = true;
    egui::Window::new("Revoke API key?")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "Revoke \"{name}\"? Clients using this key will stop working immediately."
            ));
            ui.add_space(8.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .button(egui::RichText::new("Revoke").color(theme::ERROR_TEXT))
                    .clicked()
                {
                    state.keys.request_revoke = Some(id);
                    state.keys.confirm_revoke = None;
                }
                if ui.button("Cancel").clicked() {
                    state.keys.confirm_revoke = None;
                }
            });
        });

    if !open {
        state.keys.confirm_revoke = None;
    }
}
