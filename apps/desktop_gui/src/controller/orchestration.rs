//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            Err(UiError::from_message(
                UiErrorContext::CommandQueue,
                "UI command queue is full; please retry",
            ))
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "ui->backend command queue disconnected");
            Err(UiError::from_message(
                UiErrorContext::CommandQueue,
                "Backend command processor disconnected (possible startup/runtime failure); restart the app",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crossbeam_channel::bounded;

    use super::*;
    use crate::controller::events::UiErrorCategory;

    #[test]
    fn queues_commands_in_order() {
        let (tx, rx) = bounded(4);
        dispatch_backend_command(&tx, BackendCommand::LoadPhotos).expect("queued");
        dispatch_backend_command(
            &tx,
            BackendCommand::UploadPhoto {
                path: PathBuf::from("/tmp/photo.png"),
            },
        )
        .expect("queued");

        assert_eq!(rx.try_recv().map(|cmd| cmd.name()), Ok("load_photos"));
        assert_eq!(rx.try_recv().map(|cmd| cmd.name()), Ok("upload_photo"));
    }

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (tx, rx) = bounded(1);
        dispatch_backend_command(&tx, BackendCommand::LoadPhotos).expect("queued");
        let full = dispatch_backend_command(&tx, BackendCommand::LoadPhotos).expect_err("full");
        assert!(full.message().contains("queue is full"));

        drop(rx);
        let gone = dispatch_backend_command(&tx, BackendCommand::LoadPhotos).expect_err("gone");
        assert_eq!(gone.category(), UiErrorCategory::Transport);
    }
}
