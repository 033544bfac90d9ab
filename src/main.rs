// Web2Text Console - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation (debug mode support)
// 3. config.toml loading and validation
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use web2text_console::api;
pub use web2text_console::app;
pub use web2text_console::core;
pub use web2text_console::platform;
pub use web2text_console::ui;
pub use web2text_console::util;

use clap::Parser;
use crate::util::constants;

/// Web2Text Console - Admin console for the Web2Text scraping backend.
///
/// Browse scraped content, manage sites, watch the worker's live log
/// stream, and administer settings and API keys.
#[derive(Parser, Debug)]
#[command(name = "web2text-console", version, about)]
struct Cli {
    /// Backend base URL (overrides config.toml).
    server: Option<String>,

    /// Feed records per page.
    #[arg(short = 'n', long = "page-size")]
    page_size: Option<u32>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config must be read before logging so [logging] level can apply.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&platform_paths.config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "Web2Text Console starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    // Precedence: CLI > config.toml > built-in default.
    let server_url = cli
        .server
        .as_deref()
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or(config.server_url);
    let page_size = cli
        .page_size
        .unwrap_or(config.page_size)
        .clamp(constants::MIN_PAGE_SIZE, constants::MAX_PAGE_SIZE);

    let client = match api::ApiClient::new(&server_url) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(url = %server_url, error = %e, "Invalid backend URL");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(url = %server_url, page_size, "Ready to launch GUI");

    let state = app::state::AppState::new(page_size);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                constants::APP_NAME,
                constants::APP_VERSION
            ))
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::ConsoleApp::new(state, client)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch {}: {e}", constants::APP_NAME);
        std::process::exit(1);
    }
}
