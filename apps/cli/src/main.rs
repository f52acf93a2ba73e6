use std::{fmt::Write as _, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, GalleryBody, GalleryController, GalleryView, PhotoClient, UploadOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vault", about = "List and upload photos on an Aura Vault backend")]
struct Args {
    /// Backend root, e.g. http://localhost:8000. Overrides gallery.toml and env.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the gallery.
    List,
    /// Upload an image, then show the gallery.
    Upload {
        file: PathBuf,
        /// Defaults to the file name.
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings().with_base_url_override(args.base_url);
    let client = Arc::new(PhotoClient::from_settings(&settings)?);
    tracing::info!(base_url = %client.base_url(), "using photo backend");
    let controller = GalleryController::new(client.clone());

    controller.load_photos().await;

    if let Command::Upload { file, title } = args.command {
        match controller.upload_photo_from_path(Some(&file), title).await {
            UploadOutcome::Inserted(id) => println!("Uploaded photo #{id}."),
            UploadOutcome::Reloaded => println!("Uploaded; gallery reloaded."),
            UploadOutcome::Failed(_) | UploadOutcome::NoFile | UploadOutcome::AlreadyUploading => {}
        }
    }

    let state = controller.snapshot().await;
    let view = GalleryView::from_state(&state);
    print!(
        "{}",
        render_text(&view, |image| client
            .resolve_image_url(image)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| image.to_string()))
    );

    Ok(if state.error_message().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn render_text(view: &GalleryView, resolve_image: impl Fn(&str) -> String) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  [{}]", view.title, view.upload_label);
    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {error}");
    }
    let _ = writeln!(out);

    match &view.body {
        GalleryBody::Grid(cards) => {
            for card in cards {
                let heading = card
                    .meta
                    .as_ref()
                    .and_then(|meta| meta.title.as_deref())
                    .unwrap_or("(untitled)");
                let _ = writeln!(out, "#{:<6} {heading}", card.id.to_string());
                if let Some(date) = card.meta.as_ref().and_then(|meta| meta.uploaded_at.as_deref()) {
                    let _ = writeln!(out, "        {date}");
                }
                let _ = writeln!(out, "        {}", resolve_image(&card.image));
            }
        }
        body => {
            if let Some(text) = body.status_text() {
                let _ = writeln!(out, "{text}");
            }
        }
    }
    out
}
