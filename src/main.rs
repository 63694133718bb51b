mod ui;
mod engine;
mod model;

use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "earth_online=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ui::settings_io::load_settings();
    tracing::info!(provider = settings.llm.provider.label(), model = %settings.llm.model, "starting Earth Online");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("地球 Online")
            .with_inner_size([520.0, 860.0])
            .with_min_inner_size([380.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Earth Online",
        options,
        Box::new(move |cc| {
            ui::fonts::install_cjk_font(&cc.egui_ctx);
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ui::app::EarthOnlineApp::new(cc.egui_ctx.clone(), settings)))
        }),
    )
}
