use crate::{FetchError, TileSource};
use futures::FutureExt;
use futures::future::BoxFuture;
use hexmap_common::TileImage;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

/// In-memory tile source for tests and headless runs.
///
/// Each path can be given a latency in executor polls, which makes
/// concurrent completion order controllable without timers.
#[derive(Debug, Default)]
pub struct MemoryTileSource {
    images: HashMap<String, TileImage>,
    latency: HashMap<String, u32>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, image: TileImage) {
        self.images.insert(path.into(), image);
    }

    /// Make fetches of `path` yield `polls` times before completing.
    pub fn set_latency(&mut self, path: impl Into<String>, polls: u32) {
        self.latency.insert(path.into(), polls);
    }

    /// Paths requested so far, in the order `fetch` was called.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl TileSource for MemoryTileSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<TileImage, FetchError>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.to_string());
        }
        let polls = self.latency.get(path).copied().unwrap_or(0);
        async move {
            for _ in 0..polls {
                YieldNow::default().await;
            }
            self.images
                .get(path)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(path.to_string()))
        }
        .boxed()
    }
}

/// Returns `Pending` once, waking itself so the executor polls again.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
