mod backend_bridge;
mod controller;
mod media;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use clap::Parser;
use client_core::{load_settings, view::APP_TITLE};
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::GalleryApp;

#[derive(Parser, Debug)]
#[command(name = "aura-vault", about = "Desktop gallery for an Aura Vault backend")]
struct Args {
    /// Backend root, e.g. http://localhost:8000. Overrides gallery.toml and env.
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let settings = load_settings().with_base_url_override(args.base_url);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(GalleryApp::new(cmd_tx, ui_rx)))),
    )
}
