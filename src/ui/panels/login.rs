// Web2Text Console - ui/panels/login.rs
//
// Login gate. Rendered as the whole central panel while the session is
// Anonymous; every other view is unreachable until the backend accepts
// the credentials and sets its session cookie.

use crate::app::state::AppState;
use crate::ui::theme;
use crate::util::constants::APP_NAME;

/// Render the login form.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading(APP_NAME);
        ui.label(egui::RichText::new("Sign in to continue").weak());
        ui.add_space(16.0);

        ui.allocate_ui_with_layout(
            egui::vec2(theme::LOGIN_FORM_WIDTH, 0.0),
            egui::Layout::top_down(egui::Align::Min),
            |ui| {
                ui.label("Username");
                let username = ui.add(
                    egui::TextEdit::singleline(&mut state.login.username)
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(6.0);

                ui.label("Password");
                let password = ui.add(
                    egui::TextEdit::singleline(&mut state.login.password)
                        .password(true)
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(10.0);

                let fields_filled =
                    !state.login.username.trim().is_empty() && !state.login.password.is_empty();
                let submit_via_enter = (username.lost_focus() || password.lost_focus())
                    && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let label = if state.login.in_flight {
                    "Signing in…"
                } else {
                    "Sign in"
                };
                let clicked = ui
                    .add_enabled(
                        fields_filled && !state.login.in_flight,
                        egui::Button::new(label).min_size(egui::vec2(theme::LOGIN_FORM_WIDTH, 28.0)),
                    )
                    .clicked();

                if (clicked || (submit_via_enter && fields_filled)) && !state.login.in_flight {
                    state.login.error = None;
                    state.login.request_login = true;
                }

                if let Some(ref error) = state.login.error {
                    ui.add_space(8.0);
                    ui.colored_label(theme::ERROR_TEXT, error);
                }
            },
        );
    });
}
