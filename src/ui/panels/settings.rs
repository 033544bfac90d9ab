// Web2Text Console - ui/panels/settings.rs
//
// Global worker configuration. Each setting key is fetched and saved
// individually through /settings/{key}; the editable set is fixed in
// util::constants so a backend with extra keys does not surprise the form.

use crate::app::state::AppState;
use crate::ui::theme;
use crate::util::constants::WORKER_SETTING_KEYS;

/// Human label and hint for each known setting key.
fn describe(key: &str) -> (&'static str, &'static str) {
    match key {
        "scrape_interval_minutes" => (
            "Scrape interval (minutes)",
            "How often the worker wakes up to process pending pages.",
        ),
        "lookback_days" => (
            "Lookback window (days)",
            "How far back discovery looks for content worth indexing.",
        ),
        _ => ("Setting", ""),
    }
}

/// Render the settings view.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("Refresh").clicked() {
            state.settings.request_load = true;
        }
        if state.settings.loading {
            ui.spinner();
        }
    });
    if let Some(ref error) = state.settings.error {
        ui.colored_label(theme::ERROR_TEXT, error);
    }
    ui.separator();

    for key in WORKER_SETTING_KEYS {
        let (label, hint) = describe(key);

        ui.label(egui::RichText::new(label).strong());
        if !hint.is_empty() {
            ui.label(egui::RichText::new(hint).small().weak());
        }

        let value = state.settings.values.entry(key.to_string()).or_default();
        let mut save = false;
        ui.horizontal(|ui| {
            let field = ui.add(egui::TextEdit::singleline(value).desired_width(120.0));
            if field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                save = true;
            }
            let valid = value.trim().parse::<u64>().is_ok();
            if ui.add_enabled(valid, egui::Button::new("Save")).clicked() {
                save = true;
            }
            if !valid && !value.trim().is_empty() {
                ui.colored_label(theme::ERROR_TEXT, "Must be a whole number");
            }
            if state.settings.saved.as_deref() == Some(*key) {
                ui.colored_label(theme::ACCENT_OK, "Saved");
            }
        });

        if save {
            let trimmed = state
                .settings
                .values
                .get(*key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default();
            if trimmed.parse::<u64>().is_ok() {
                state.settings.saved = None;
                state.settings.request_save = Some((key.to_string(), trimmed));
            }
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(4.0);
    }

    ui.label(
        egui::RichText::new("Changes take effect on the worker's next cycle.")
            .small()
            .italics()
            .weak(),
    );
}
