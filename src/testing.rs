//! Channel-backed collaborator fakes shared by the unit tests.

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

use crate::data::{BeaconId, BeaconSnapshot, GeoPoint, Item, LocationState, Proximity};
use crate::error::{Error, Result};
use crate::search::SearchState;
use crate::sources::{BeaconScanner, CatalogSource, LocationMonitor, SearchSources};

pub fn item(minor: u16) -> Item {
    let mut item = Item::new(
        BeaconId::new(uuid::Uuid::nil(), 1, minor),
        format!("Installation {}", minor),
    );
    item.location = Some(GeoPoint::new(51.184, 7.043));
    item
}

pub fn reading(minor: u16, proximity: Proximity) -> BeaconSnapshot {
    BeaconSnapshot::new(BeaconId::new(uuid::Uuid::nil(), 1, minor), proximity)
}

/// Catalog that resolves with a fixed result, optionally after a gate opens.
pub struct FakeCatalog {
    result: std::result::Result<Vec<Item>, String>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn ok(items: Vec<Item>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(items),
            gate: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(reason.to_string()),
            gate: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// A catalog whose fetch stays pending until `gate` is notified.
    pub fn gated(items: Vec<Item>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(items),
            gate: Some(gate),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_all_items(&self) -> Result<Vec<Item>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result
            .clone()
            .map_err(|reason| Error::CatalogFetch { reason })
    }
}

/// Generic fake for an infinite, restartable upstream sequence.
///
/// Every subscription gets its own channel; tests push values into a
/// specific subscription and close it to simulate completion.
pub struct FakeStream<T> {
    senders: Mutex<Vec<mpsc::UnboundedSender<T>>>,
}

impl<T: Send + 'static> FakeStream<T> {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }

    fn subscribe(&self) -> BoxStream<'static, T> {
        let (tx, rx) = mpsc::unbounded();
        self.senders.lock().push(tx);
        rx.boxed()
    }

    /// Number of subscriptions opened so far.
    pub fn subscriptions(&self) -> usize {
        self.senders.lock().len()
    }

    /// Deliver a value on subscription `index`. Returns false if it is gone.
    pub fn emit_on(&self, index: usize, value: T) -> bool {
        self.senders
            .lock()
            .get(index)
            .map(|tx| tx.unbounded_send(value).is_ok())
            .unwrap_or(false)
    }

    /// Deliver a value on the newest subscription.
    pub fn emit(&self, value: T) -> bool {
        let latest = self.subscriptions().saturating_sub(1);
        self.emit_on(latest, value)
    }

    /// Complete the newest subscription.
    pub fn finish(&self) {
        if let Some(tx) = self.senders.lock().last() {
            tx.close_channel();
        }
    }
}

pub type FakeLocation = FakeStream<LocationState>;
pub type FakeBeacons = FakeStream<Result<Vec<BeaconSnapshot>>>;

impl LocationMonitor for FakeLocation {
    fn location_states(&self, _items: &[Item]) -> BoxStream<'static, LocationState> {
        self.subscribe()
    }
}

impl BeaconScanner for FakeBeacons {
    fn find_beacons(&self) -> BoxStream<'static, Result<Vec<BeaconSnapshot>>> {
        self.subscribe()
    }
}

/// All fakes of one search session.
pub struct Fakes {
    pub catalog: Arc<FakeCatalog>,
    pub location: Arc<FakeLocation>,
    pub beacons: Arc<FakeBeacons>,
}

impl Fakes {
    pub fn with_catalog(catalog: Arc<FakeCatalog>) -> Self {
        Self {
            catalog,
            location: Arc::new(FakeStream::new()),
            beacons: Arc::new(FakeStream::new()),
        }
    }

    pub fn sources(&self) -> SearchSources {
        SearchSources::new(
            self.catalog.clone(),
            self.location.clone(),
            self.beacons.clone(),
        )
    }
}

/// Wait until the transition stream yields `expected`.
pub async fn wait_for_state(rx: &mut broadcast::Receiver<SearchState>, expected: SearchState) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(state) if state == expected => return,
                Ok(_) => continue,
                Err(e) => panic!("transition stream closed: {}", e),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {}", expected));
}

/// Collect the next `count` transitions.
pub async fn next_states(
    rx: &mut broadcast::Receiver<SearchState>,
    count: usize,
) -> Vec<SearchState> {
    let mut states = Vec::with_capacity(count);
    for _ in 0..count {
        let state = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for transition")
            .expect("transition stream closed");
        states.push(state);
    }
    states
}

/// Let spawned subscription tasks drain their channels.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}
