use eframe::{egui, NativeOptions};
use egui::ViewportBuilder;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wakfu_meter::gui::MeterApp;
use wakfu_meter::log::resolve_log_path;
use wakfu_meter::parsing::{Meter, SessionRecap};
use wakfu_meter::utils::JsonPersistence;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wakfu_meter=info")),
        )
        .init();

    // State files live next to the executable's working directory
    let storage = JsonPersistence::new(".");
    let settings = storage.load_settings();
    let reference = storage.load_reference();

    let log_path = resolve_log_path(std::env::args_os().nth(1).map(PathBuf::from), settings.log_path.as_deref());
    tracing::info!(path = %log_path.display(), "using chat log");

    let meter = Meter::new(settings, reference)
        .with_roster(storage.load_roster())
        .with_history(storage.load_history())
        .with_tracker(storage.load_tracker())
        .with_live(storage.load_live())
        .with_progress(Box::new(SessionRecap::new(storage.load_session())))
        .with_persistence(Box::new(storage));

    let native_options = NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([420.0, 360.0])
            .with_min_inner_size([300.0, 200.0])
            .with_max_inner_size([1600.0, 1200.0])
            .with_resizable(true)
            .with_decorations(false)
            .with_always_on_top(),
        ..Default::default()
    };

    let app = MeterApp::new(meter, log_path);

    eframe::run_native(
        "Wakfu Meter",
        native_options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
