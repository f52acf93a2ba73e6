use super::*;
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::protocol::PhotoListing;
use tokio::sync::oneshot;

struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<T, String>,
}

#[derive(Default)]
struct FakePhotoService {
    listings: Mutex<VecDeque<Scripted<PhotoListing>>>,
    creations: Mutex<VecDeque<Scripted<CreatedPhoto>>>,
    uploaded_titles: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl FakePhotoService {
    async fn script_list(&self, gate: Option<oneshot::Receiver<()>>, result: Result<PhotoListing, String>) {
        self.listings
            .lock()
            .await
            .push_back(Scripted { gate, result });
    }

    async fn script_create(&self, gate: Option<oneshot::Receiver<()>>, result: Result<CreatedPhoto, String>) {
        self.creations
            .lock()
            .await
            .push_back(Scripted { gate, result });
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoService for FakePhotoService {
    async fn list_photos(&self) -> Result<PhotoListing> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.listings.lock().await.pop_front();
        let Some(Scripted { gate, result }) = next else {
            return Ok(listing(Vec::new()));
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result.map_err(|message| anyhow!(message))
    }

    async fn create_photo(&self, request: UploadRequest) -> Result<CreatedPhoto> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded_titles.lock().await.push(request.title);
        let next = self.creations.lock().await.pop_front();
        let Some(Scripted { gate, result }) = next else {
            return Ok(CreatedPhoto::Unknown);
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result.map_err(|message| anyhow!(message))
    }
}

fn photo(id: i64, title: &str) -> Photo {
    Photo {
        id: PhotoId::Number(id),
        title: Some(title.to_string()),
        image: format!("/media/{id}.jpg"),
        uploaded_at: None,
    }
}

fn listing(photos: Vec<Photo>) -> PhotoListing {
    PhotoListing::Photos { photos, skipped: 0 }
}

fn setup() -> (Arc<FakePhotoService>, Arc<GalleryController>) {
    let service = Arc::new(FakePhotoService::default());
    let controller = GalleryController::new(service.clone());
    (service, controller)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition was not reached in time");
}

fn drain_states(rx: &mut broadcast::Receiver<GalleryEvent>) -> Vec<GalleryState> {
    let mut states = Vec::new();
    while let Ok(GalleryEvent::StateChanged(state)) = rx.try_recv() {
        states.push(state);
    }
    states
}

#[tokio::test]
async fn starts_idle_and_empty() {
    let (_, controller) = setup();
    assert_eq!(controller.snapshot().await, GalleryState::default());
}

#[tokio::test]
async fn load_replaces_photos_in_server_order() {
    let (service, controller) = setup();
    service
        .script_list(None, Ok(listing(vec![photo(3, "C"), photo(1, "A")])))
        .await;

    let outcome = controller.load_photos().await;

    assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
    let state = controller.snapshot().await;
    assert_eq!(state.photos, vec![photo(3, "C"), photo(1, "A")]);
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn load_coerces_non_sequence_to_empty() {
    let (service, controller) = setup();
    service.script_list(None, Ok(listing(vec![photo(1, "A")]))).await;
    service.script_list(None, Ok(PhotoListing::NotASequence)).await;

    controller.load_photos().await;
    let outcome = controller.load_photos().await;

    assert_eq!(outcome, LoadOutcome::Loaded { count: 0 });
    assert!(controller.snapshot().await.photos.is_empty());
}

#[tokio::test]
async fn load_publishes_in_progress_then_idle_state() {
    let (service, controller) = setup();
    service.script_list(None, Ok(listing(vec![photo(1, "A")]))).await;
    let mut rx = controller.subscribe_events();

    controller.load_photos().await;

    let states = drain_states(&mut rx);
    assert_eq!(states.len(), 2);
    assert!(states[0].loading);
    assert_eq!(states[0].error, None);
    assert!(states[0].photos.is_empty());
    assert!(!states[1].loading);
    assert_eq!(states[1].photos, vec![photo(1, "A")]);
}

#[tokio::test]
async fn load_failure_sets_error_and_keeps_previous_photos() {
    let (service, controller) = setup();
    service.script_list(None, Ok(listing(vec![photo(1, "A")]))).await;
    service
        .script_list(None, Err("connection refused".to_string()))
        .await;
    service.script_list(None, Ok(listing(vec![photo(2, "B")]))).await;

    controller.load_photos().await;
    let outcome = controller.load_photos().await;

    assert_eq!(outcome, LoadOutcome::Failed("connection refused".to_string()));
    let state = controller.snapshot().await;
    assert_eq!(state.error.as_deref(), Some("connection refused"));
    assert_eq!(state.photos, vec![photo(1, "A")]);
    assert!(!state.loading);

    let mut rx = controller.subscribe_events();
    controller.load_photos().await;
    let states = drain_states(&mut rx);
    assert_eq!(states[0].error, None, "error is cleared when a load starts");
    assert_eq!(controller.snapshot().await.error, None);
}

#[tokio::test]
async fn load_failure_without_message_uses_fallback() {
    let (service, controller) = setup();
    service.script_list(None, Err(String::new())).await;

    controller.load_photos().await;

    assert_eq!(
        controller.snapshot().await.error.as_deref(),
        Some(LOAD_FAILURE_FALLBACK)
    );
}

#[tokio::test]
async fn stale_load_response_is_discarded() {
    let (service, controller) = setup();
    let (release_first, first_gate) = oneshot::channel();
    service
        .script_list(Some(first_gate), Ok(listing(vec![photo(1, "old")])))
        .await;
    service
        .script_list(None, Ok(listing(vec![photo(2, "new")])))
        .await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load_photos().await }
    });
    wait_until(|| service.list_calls() == 1).await;
    assert!(controller.snapshot().await.loading);

    let second = controller.load_photos().await;
    assert_eq!(second, LoadOutcome::Loaded { count: 1 });

    release_first.send(()).expect("release first load");
    assert_eq!(first.await.expect("join"), LoadOutcome::Superseded);

    let state = controller.snapshot().await;
    assert_eq!(state.photos, vec![photo(2, "new")]);
    assert!(!state.loading);
}

#[tokio::test]
async fn upload_prepends_created_photo_without_reload() {
    let (service, controller) = setup();
    service
        .script_list(None, Ok(listing(vec![photo(2, "B"), photo(1, "A")])))
        .await;
    controller.load_photos().await;

    let created = Photo {
        id: PhotoId::Number(42),
        title: Some("photo.png".to_string()),
        image: "/u/42.jpg".to_string(),
        uploaded_at: None,
    };
    service
        .script_create(None, Ok(CreatedPhoto::Created(created.clone())))
        .await;

    let outcome = controller
        .upload_photo(Some(UploadRequest::new("photo.png", b"png".to_vec())))
        .await;

    assert_eq!(outcome, UploadOutcome::Inserted(PhotoId::Number(42)));
    let state = controller.snapshot().await;
    assert_eq!(state.photos, vec![created, photo(2, "B"), photo(1, "A")]);
    assert!(!state.uploading);
    assert_eq!(state.error, None);
    assert_eq!(service.list_calls(), 1, "no reload after a well-formed create");
    assert_eq!(
        *service.uploaded_titles.lock().await,
        vec!["photo.png".to_string()]
    );
}

#[tokio::test]
async fn upload_with_unknown_response_reloads_the_list() {
    let (service, controller) = setup();
    service.script_list(None, Ok(listing(vec![photo(1, "A")]))).await;
    controller.load_photos().await;

    service.script_create(None, Ok(CreatedPhoto::Unknown)).await;
    service
        .script_list(None, Ok(listing(vec![photo(9, "server copy"), photo(1, "A")])))
        .await;

    let outcome = controller
        .upload_photo(Some(UploadRequest::new("photo.png", vec![1])))
        .await;

    assert_eq!(outcome, UploadOutcome::Reloaded);
    assert_eq!(service.list_calls(), 2);
    let state = controller.snapshot().await;
    assert_eq!(state.photos, vec![photo(9, "server copy"), photo(1, "A")]);
    assert!(!state.uploading);
    assert!(!state.loading);
}

#[tokio::test]
async fn upload_network_error_sets_message_and_keeps_photos() {
    let (service, controller) = setup();
    service.script_list(None, Ok(listing(vec![photo(1, "A")]))).await;
    controller.load_photos().await;
    service
        .script_create(None, Err("error sending request: network unreachable".to_string()))
        .await;

    let outcome = controller
        .upload_photo(Some(UploadRequest::new("photo.png", vec![1])))
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::Failed("error sending request: network unreachable".to_string())
    );
    let state = controller.snapshot().await;
    assert_eq!(
        state.error.as_deref(),
        Some("error sending request: network unreachable")
    );
    assert_eq!(state.photos, vec![photo(1, "A")]);
    assert!(!state.uploading);
}

#[tokio::test]
async fn upload_failure_without_message_uses_fallback() {
    let (service, controller) = setup();
    service.script_create(None, Err("  ".to_string())).await;

    controller
        .upload_photo(Some(UploadRequest::new("photo.png", vec![1])))
        .await;

    assert_eq!(
        controller.snapshot().await.error.as_deref(),
        Some(UPLOAD_FAILURE_FALLBACK)
    );
}

#[tokio::test]
async fn upload_without_file_is_a_no_op() {
    let (service, controller) = setup();
    let mut rx = controller.subscribe_events();

    assert_eq!(controller.upload_photo(None).await, UploadOutcome::NoFile);
    assert_eq!(
        controller.upload_photo_from_path(None, None).await,
        UploadOutcome::NoFile
    );

    assert_eq!(service.create_calls(), 0);
    assert!(drain_states(&mut rx).is_empty());
}

#[tokio::test]
async fn upload_clears_previous_error_when_it_starts() {
    let (service, controller) = setup();
    service.script_list(None, Err("offline".to_string())).await;
    controller.load_photos().await;
    assert!(controller.snapshot().await.error.is_some());

    let (release, gate) = oneshot::channel();
    service
        .script_create(Some(gate), Ok(CreatedPhoto::Created(photo(5, "E"))))
        .await;
    let upload = tokio::spawn({
        let controller = controller.clone();
        async move {
            controller
                .upload_photo(Some(UploadRequest::new("e.png", vec![1])))
                .await
        }
    });
    wait_until(|| service.create_calls() == 1).await;

    let in_flight = controller.snapshot().await;
    assert!(in_flight.uploading);
    assert_eq!(in_flight.error, None);

    release.send(()).expect("release upload");
    upload.await.expect("join");
    assert!(!controller.snapshot().await.uploading);
}

#[tokio::test]
async fn second_upload_while_one_is_in_flight_is_rejected() {
    let (service, controller) = setup();
    let (release, gate) = oneshot::channel();
    service
        .script_create(Some(gate), Ok(CreatedPhoto::Created(photo(7, "G"))))
        .await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move {
            controller
                .upload_photo(Some(UploadRequest::new("g.png", vec![1])))
                .await
        }
    });
    wait_until(|| service.create_calls() == 1).await;

    let second = controller
        .upload_photo(Some(UploadRequest::new("h.png", vec![2])))
        .await;
    assert_eq!(second, UploadOutcome::AlreadyUploading);
    assert_eq!(service.create_calls(), 1);

    release.send(()).expect("release upload");
    assert_eq!(
        first.await.expect("join"),
        UploadOutcome::Inserted(PhotoId::Number(7))
    );
    let state = controller.snapshot().await;
    assert_eq!(state.photos, vec![photo(7, "G")]);
    assert!(!state.uploading);
}

#[tokio::test]
async fn upload_from_unreadable_path_reports_error() {
    let (service, controller) = setup();

    let outcome = controller
        .upload_photo_from_path(Some(Path::new("/definitely/not/here.png")), None)
        .await;

    assert!(matches!(outcome, UploadOutcome::Failed(message) if message.contains("here.png")));
    assert_eq!(service.create_calls(), 0);
    let state = controller.snapshot().await;
    assert!(!state.uploading);
    assert!(state.error_message().is_some());
}
