//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{GalleryController, GalleryEvent, PhotoClient, Settings};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::media::decode_preview_image;

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = match PhotoClient::from_settings(&settings) {
                Ok(client) => Arc::new(client),
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("invalid photo backend url: {err}");
                    return;
                }
            };
            let controller = GalleryController::new(client.clone());
            spawn_state_forwarder(&controller, ui_tx.clone());

            tracing::info!(base_url = %client.base_url(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info(format!("Connected to {}", client.base_url())));

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::LoadPhotos => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move {
                            controller.load_photos().await;
                        });
                    }
                    BackendCommand::UploadPhoto { path } => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move {
                            controller.upload_photo_from_path(Some(&path), None).await;
                        });
                    }
                    BackendCommand::FetchThumbnail { photo_id, image } => {
                        let client = Arc::clone(&client);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match client.fetch_image(&image).await {
                                Ok(bytes) => {
                                    match tokio::task::spawn_blocking(move || {
                                        decode_preview_image(&bytes)
                                    })
                                    .await
                                    {
                                        Ok(Ok(image)) => UiEvent::ThumbnailLoaded { photo_id, image },
                                        Ok(Err(reason)) => {
                                            UiEvent::ThumbnailFailed { photo_id, reason }
                                        }
                                        Err(err) => UiEvent::ThumbnailFailed {
                                            photo_id,
                                            reason: format!("thumbnail decode task failed: {err}"),
                                        },
                                    }
                                }
                                Err(err) => UiEvent::ThumbnailFailed {
                                    photo_id,
                                    reason: err.to_string(),
                                },
                            };
                            deliver_ui_event(&ui_tx, event).await;
                        });
                    }
                }
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

/// Hands a result to the UI, waiting for queue space instead of dropping it.
/// Thumbnail cards stay in `Loading` until their result arrives.
async fn deliver_ui_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            tracing::debug!("ui event queue full; waiting for space");
            let ui_tx = ui_tx.clone();
            if let Ok(Err(err)) = tokio::task::spawn_blocking(move || ui_tx.send(event)).await {
                tracing::debug!("ui event queue closed: {err}");
            }
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui event queue closed; dropping event");
        }
    }
}

/// Forwards every controller state transition to the UI queue.
fn spawn_state_forwarder(controller: &Arc<GalleryController>, ui_tx: Sender<UiEvent>) {
    let mut events = controller.subscribe_events();
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        loop {
            let state = match events.recv().await {
                Ok(GalleryEvent::StateChanged(state)) => state,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "gallery event forwarder lagged; resyncing");
                    controller.snapshot().await
                }
                Err(RecvError::Closed) => break,
            };
            if ui_tx.send(UiEvent::GalleryUpdated(state)).is_err() {
                break;
            }
        }
    });
}
