use eframe::egui;
use geoview_items::app::MapApp;
use geoview_items::config::AppConfig;
use std::path::PathBuf;

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> eframe::Result {
    // Log to stderr (run with `RUST_LOG=debug` for move traces).
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Usage: geoview-items [config.json]");
            std::process::exit(1);
        }
    };

    let title = "GeoView items: drag and drop";
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(MapApp::new(config)))),
    )
}
