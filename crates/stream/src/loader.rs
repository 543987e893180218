use futures::channel::mpsc::UnboundedSender;
use futures::stream::{FuturesUnordered, StreamExt};
use hexmap_assets::{FetchError, TilePathScheme, TileSource};
use hexmap_common::{LoadMode, TileImage, TileKey};
use std::collections::HashSet;

/// Notification from a running [`LoaderQueue`].
#[derive(Debug)]
pub enum LoadEvent {
    /// One fetch settled. Failures are reported here too; the queue keeps going.
    Loaded {
        generation: u64,
        key: TileKey,
        result: Result<TileImage, FetchError>,
    },
    /// Every fetch has settled. Always the last event, emitted exactly once.
    Done { generation: u64, summary: LoadSummary },
}

impl LoadEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LoadEvent::Loaded { generation, .. } | LoadEvent::Done { generation, .. } => {
                *generation
            }
        }
    }
}

/// Outcome counts of one queue run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl LoadSummary {
    fn record<T, E>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.loaded += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// One-shot queue of tile image fetches.
///
/// Sequential mode awaits each fetch before issuing the next one, so events
/// follow request order. Concurrent mode issues every fetch up front and
/// reports them in completion order.
///
/// [`run`](Self::run) consumes the queue and the queue cannot be cloned, so a
/// key list is fetched at most once:
///
/// ```compile_fail
/// fn requires_clone<T: Clone>() {}
/// requires_clone::<hexmap_stream::LoaderQueue>();
/// ```
#[derive(Debug)]
pub struct LoaderQueue {
    keys: Vec<TileKey>,
    mode: LoadMode,
    generation: u64,
    paths: TilePathScheme,
}

impl LoaderQueue {
    /// Build a queue. Repeated keys are dropped, keeping the first occurrence.
    pub fn new(
        keys: impl IntoIterator<Item = TileKey>,
        mode: LoadMode,
        generation: u64,
        paths: TilePathScheme,
    ) -> Self {
        let mut seen = HashSet::new();
        let keys = keys
            .into_iter()
            .filter(|key| {
                let fresh = seen.insert(*key);
                if !fresh {
                    tracing::debug!(%key, "dropping duplicate tile key");
                }
                fresh
            })
            .collect();
        Self {
            keys,
            mode,
            generation,
            paths,
        }
    }

    pub fn keys(&self) -> &[TileKey] {
        &self.keys
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Fetch every key, handing each event to `sink`. Returns the summary
    /// also carried by the final `Done` event.
    pub async fn run<S, F>(self, source: &S, mut sink: F) -> LoadSummary
    where
        S: TileSource + ?Sized,
        F: FnMut(LoadEvent),
    {
        let generation = self.generation;
        let mut summary = LoadSummary {
            requested: self.keys.len(),
            ..LoadSummary::default()
        };
        tracing::debug!(
            generation,
            mode = ?self.mode,
            requested = summary.requested,
            "loader queue started"
        );

        let mut settle = |key: TileKey, result: Result<TileImage, FetchError>| {
            summary.record(&result);
            if let Err(e) = &result {
                tracing::warn!(%key, error = %e, "tile fetch failed");
            }
            sink(LoadEvent::Loaded {
                generation,
                key,
                result,
            });
        };

        match self.mode {
            LoadMode::Sequential => {
                for &key in &self.keys {
                    let path = self.paths.path_for(key);
                    let result = source.fetch(&path).await;
                    settle(key, result);
                }
            }
            LoadMode::Concurrent => {
                let paths = &self.paths;
                let mut in_flight: FuturesUnordered<_> = self
                    .keys
                    .iter()
                    .map(|&key| {
                        let path = paths.path_for(key);
                        async move {
                            let result = source.fetch(&path).await;
                            (key, result)
                        }
                    })
                    .collect();
                while let Some((key, result)) = in_flight.next().await {
                    settle(key, result);
                }
            }
        }

        tracing::trace!(
            generation,
            loaded = summary.loaded,
            failed = summary.failed,
            "loader queue done"
        );
        sink(LoadEvent::Done {
            generation,
            summary,
        });
        summary
    }

    /// [`run`](Self::run) with events forwarded into a channel.
    ///
    /// A dropped receiver does not stop the queue; remaining events are discarded.
    pub async fn run_into_channel<S>(self, source: &S, tx: UnboundedSender<LoadEvent>) -> LoadSummary
    where
        S: TileSource + ?Sized,
    {
        self.run(source, |event| {
            if tx.unbounded_send(event).is_err() {
                tracing::debug!("load event receiver dropped");
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::executor::block_on;
    use hexmap_assets::MemoryTileSource;
    use hexmap_common::TileId;

    fn scheme() -> TilePathScheme {
        TilePathScheme::default()
    }

    fn key(col: u32, row: u32) -> TileKey {
        TileKey::Tile(TileId::new(col, row))
    }

    fn source_with(keys: &[TileKey]) -> MemoryTileSource {
        let mut source = MemoryTileSource::new();
        for &k in keys {
            source.insert(scheme().path_for(k), TileImage::filled(2, 2, [1, 2, 3, 255]));
        }
        source
    }

    fn collect(queue: LoaderQueue, source: &MemoryTileSource) -> (Vec<LoadEvent>, LoadSummary) {
        let mut events = Vec::new();
        let summary = block_on(queue.run(source, |e| events.push(e)));
        (events, summary)
    }

    fn loaded_keys(events: &[LoadEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                LoadEvent::Loaded { key, .. } => Some(key.to_string()),
                LoadEvent::Done { .. } => None,
            })
            .collect()
    }

    #[test]
    fn sequential_preserves_request_order() {
        let keys = [key(0, 0), key(1, 0), key(0, 1)];
        let mut source = source_with(&keys);
        // the first tile is the slowest; order must not change
        source.set_latency(scheme().path_for(keys[0]), 4);

        let queue = LoaderQueue::new(keys, LoadMode::Sequential, 1, scheme());
        let (events, summary) = collect(queue, &source);

        assert_eq!(loaded_keys(&events), vec!["0-0", "1-0", "0-1"]);
        assert_eq!(events.len(), 4);
        assert!(matches!(events[3], LoadEvent::Done { generation: 1, .. }));
        assert_eq!(
            summary,
            LoadSummary {
                requested: 3,
                loaded: 3,
                failed: 0
            }
        );
        assert_eq!(
            source.requests(),
            vec![
                "assets/map/map top down-0-0.png",
                "assets/map/map top down-1-0.png",
                "assets/map/map top down-0-1.png",
            ]
        );
    }

    #[test]
    fn concurrent_reports_in_completion_order() {
        let keys = [key(0, 0), key(1, 0), key(0, 1)];
        let mut source = source_with(&keys);
        source.set_latency(scheme().path_for(keys[0]), 6);
        source.set_latency(scheme().path_for(keys[2]), 2);

        let queue = LoaderQueue::new(keys, LoadMode::Concurrent, 7, scheme());
        let (events, _) = collect(queue, &source);

        assert_eq!(loaded_keys(&events), vec!["1-0", "0-1", "0-0"]);
        assert!(events.iter().all(|e| e.generation() == 7));
    }

    #[test]
    fn concurrent_failure_still_reports_every_tile_then_done() {
        let keys = [key(0, 0), key(1, 0), key(0, 1)];
        // 1-0 is missing from the source
        let source = source_with(&[keys[0], keys[2]]);

        let queue = LoaderQueue::new(keys, LoadMode::Concurrent, 1, scheme());
        let (events, summary) = collect(queue, &source);

        assert_eq!(events.len(), 4);
        assert!(
            events[..3]
                .iter()
                .all(|e| matches!(e, LoadEvent::Loaded { .. }))
        );
        assert!(matches!(events[3], LoadEvent::Done { .. }));
        let failed: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, LoadEvent::Loaded { result: Err(_), .. }))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn sequential_failure_continues() {
        let keys = [key(0, 0), key(1, 0)];
        let source = source_with(&keys[1..]);
        let queue = LoaderQueue::new(keys, LoadMode::Sequential, 1, scheme());
        let (events, summary) = collect(queue, &source);

        assert!(matches!(
            &events[0],
            LoadEvent::Loaded {
                result: Err(FetchError::NotFound(_)),
                ..
            }
        ));
        assert!(matches!(&events[1], LoadEvent::Loaded { result: Ok(_), .. }));
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn duplicate_keys_fetched_once() {
        let keys = [key(2, 2), key(1, 1), key(2, 2), TileKey::Base, TileKey::Base];
        let queue = LoaderQueue::new(keys, LoadMode::Sequential, 1, scheme());
        assert_eq!(queue.keys(), &[key(2, 2), key(1, 1), TileKey::Base]);

        let source = source_with(queue.keys());
        let (_, summary) = collect(queue, &source);
        assert_eq!(summary.requested, 3);
        assert_eq!(source.requests().len(), 3);
    }

    #[test]
    fn empty_queue_emits_only_done() {
        let queue = LoaderQueue::new([], LoadMode::Concurrent, 3, scheme());
        assert!(queue.is_empty());
        let (events, summary) = collect(queue, &MemoryTileSource::new());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LoadEvent::Done { generation: 3, .. }));
        assert_eq!(summary, LoadSummary::default());
    }

    #[test]
    fn channel_receives_all_events() {
        let keys = [key(0, 0), TileKey::Base];
        let source = source_with(&keys);
        let (tx, rx) = mpsc::unbounded();

        let queue = LoaderQueue::new(keys, LoadMode::Concurrent, 2, scheme());
        let summary = block_on(queue.run_into_channel(&source, tx));
        assert_eq!(summary.loaded, 2);

        let events: Vec<LoadEvent> = block_on(rx.collect());
        assert_eq!(events.len(), 3);
        assert!(matches!(events.last(), Some(LoadEvent::Done { .. })));
        assert_eq!(
            source.requests().last().map(String::as_str),
            Some("assets/map/map top down-base.png")
        );
    }

    #[test]
    fn dropped_receiver_does_not_stop_queue() {
        let keys = [key(0, 0)];
        let source = source_with(&keys);
        let (tx, rx) = mpsc::unbounded();
        drop(rx);
        let queue = LoaderQueue::new(keys, LoadMode::Sequential, 1, scheme());
        let summary = block_on(queue.run_into_channel(&source, tx));
        assert_eq!(summary.loaded, 1);
    }
}
