// Web2Text Console - ui/panels/logs.rs
//
// Live log viewer: connection badge, level filter, and the bounded
// event buffer. The buffer itself is fed by gui.rs from the stream
// manager; this panel only displays it.

use crate::app::state::AppState;
use crate::core::model::Level;
use crate::ui::theme;
use crate::util::constants::MAX_LOG_ENTRIES;

/// Render the logs view.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        // Connection badge.
        let colour = theme::conn_colour(&state.logs.conn);
        ui.label(egui::RichText::new("●").color(colour));
        ui.label(theme::conn_label(&state.logs.conn));

        ui.separator();

        // Display-side level filter; the stream itself is unfiltered.
        let filter_label = state
            .logs
            .level_filter
            .map(|l| l.label())
            .unwrap_or("All levels");
        egui::ComboBox::from_id_salt("log_level_filter")
            .selected_text(filter_label)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(state.logs.level_filter.is_none(), "All levels")
                    .clicked()
                {
                    state.logs.level_filter = None;
                }
                for level in Level::all() {
                    let selected = state.logs.level_filter == Some(*level);
                    if ui.selectable_label(selected, level.label()).clicked() {
                        state.logs.level_filter = Some(*level);
                    }
                }
            });

        ui.checkbox(&mut state.logs.autoscroll, "Follow");

        if ui.button("Clear").clicked() {
            state.logs.buffer.clear();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "{} / {} events",
                    state.logs.buffer.len(),
                    MAX_LOG_ENTRIES
                ))
                .small()
                .weak(),
            );
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(state.logs.autoscroll)
        .show(ui, |ui| {
            let filter = state.logs.level_filter;
            for event in state.logs.buffer.iter() {
                if let Some(wanted) = filter {
                    if event.level != wanted {
                        continue;
                    }
                }

                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(
                            event
                                .timestamp
                                .with_timezone(&chrono::Local)
                                .format("%H:%M:%S")
                                .to_string(),
                        )
                        .monospace()
                        .weak(),
                    );
                    ui.label(
                        egui::RichText::new(event.level.tag())
                            .monospace()
                            .color(theme::level_colour(&event.level)),
                    );
                    ui.label(&event.message);
                });

                if event.has_extra() {
                    ui.indent(("extra", event.timestamp), |ui| {
                        ui.label(
                            egui::RichText::new(event.extra.to_string())
                                .small()
                                .monospace()
                                .weak(),
                        );
                    });
                }
            }

            if state.logs.buffer.is_empty() {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("Waiting for worker events…").weak());
                });
            }
        });
}
