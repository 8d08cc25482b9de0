mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::TableExplorerApp;
use eframe::egui;
use table_explorer::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::error!("Falling back to default config: {e:#}");
        AppConfig::default()
    });
    let startup_file = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.default_file.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Table Explorer",
        options,
        Box::new(move |_cc| {
            let mut app = TableExplorerApp::new(config);
            if let Some(path) = startup_file {
                ui::panels::open_path(&mut app.state, &path);
            }
            Ok(Box::new(app))
        }),
    )
}
