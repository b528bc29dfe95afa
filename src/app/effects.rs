use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;

use crate::app::model::Effect;
use crate::app::{App, Message, Model};
use crate::image::{LARGE_MAX_PX, THUMBNAIL_MAX_PX, decode_scaled};
use crate::pagination::PageResponse;
use crate::source::{PhotoSource, fetch_page};

/// Concurrent image downloads.
const MAX_IMAGE_DOWNLOADS: usize = 6;

/// Runs effects on a background runtime and hands results back as messages.
pub(super) struct Executor<S: PhotoSource> {
    runtime: Runtime,
    source: Arc<S>,
    downloads: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
}

/// Decrements the in-flight count when a task finishes, however it ends.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn start(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S: PhotoSource> Executor<S> {
    pub(super) fn new(source: S) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("photogrid-fetch")
            .enable_all()
            .build()
            .context("Failed to start fetch runtime")?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            runtime,
            source: Arc::new(source),
            downloads: Arc::new(Semaphore::new(MAX_IMAGE_DOWNLOADS)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            tx,
            rx,
        })
    }

    /// Whether any spawned task has not reported back yet.
    pub(super) fn has_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Next finished result, if one is waiting.
    pub(super) fn try_recv(&self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    pub(super) fn dispatch(&self, effect: Effect) {
        let guard = InFlight::start(&self.in_flight);
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        match effect {
            Effect::FetchPage(request) => {
                self.runtime.spawn(async move {
                    let _guard = guard;
                    let result = fetch_page(source.as_ref(), &request.page).await;
                    let _ = tx.send(Message::PageLoaded(PageResponse::new(request, result)));
                });
            }
            Effect::FetchThumbnail {
                generation,
                photo_id,
                url,
            } => {
                let downloads = Arc::clone(&self.downloads);
                self.runtime.spawn(async move {
                    let _guard = guard;
                    let result = download(source.as_ref(), &downloads, &url, THUMBNAIL_MAX_PX).await;
                    let _ = tx.send(Message::ThumbnailLoaded {
                        generation,
                        photo_id,
                        result,
                    });
                });
            }
            Effect::FetchLarge { photo_id, url } => {
                let downloads = Arc::clone(&self.downloads);
                self.runtime.spawn(async move {
                    let _guard = guard;
                    let result = download(source.as_ref(), &downloads, &url, LARGE_MAX_PX).await;
                    let _ = tx.send(Message::LargeImageLoaded { photo_id, result });
                });
            }
        }
    }
}

async fn download<S: PhotoSource>(
    source: &S,
    downloads: &Semaphore,
    url: &str,
    max_px: u32,
) -> Result<image::DynamicImage, String> {
    let bytes = {
        let _permit = downloads
            .acquire()
            .await
            .map_err(|_| "download queue closed".to_string())?;
        source.fetch_image(url).await.map_err(|err| err.to_string())?
    };
    // Decoding is CPU bound; keep it off the workers that run page fetches.
    tokio::task::spawn_blocking(move || decode_scaled(&bytes, max_px))
        .await
        .map_err(|err| format!("decode task failed: {err}"))?
        .map_err(|err| err.to_string())
}

impl App {
    /// Hand every effect queued on the model to the executor.
    pub(super) fn handle_message_side_effects<S: PhotoSource>(
        model: &mut Model,
        executor: &Executor<S>,
    ) {
        for effect in model.take_effects() {
            tracing::debug!(?effect, "dispatching effect");
            executor.dispatch(effect);
        }
    }
}
