//! The beacon search state machine.
//!
//! [`SearchStateMachine`] owns one search session: the catalog fetch, the
//! location subscription and the ranging subscription. Each subscription is a
//! spawned task that forwards upstream values into the session; the session
//! lock serializes them with caller operations, so every input is handled
//! against a consistent state.

use futures::stream::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::callback::CallbackHandle;
use crate::config::SearchConfig;
use crate::data::{GeoPoint, Item, ItemCatalog};
use crate::search::actions::SearchActions;
use crate::search::core::{CoreOptions, Effect, Input, SearchCore, SubscriptionId};
use crate::search::state::SearchState;
use crate::sources::SearchSources;

/// Capacity of the transition channel.
const TRANSITION_CHANNEL_CAPACITY: usize = 64;

/// Core state plus the tasks backing its subscriptions.
struct Session {
    core: SearchCore,
    tasks: HashMap<SubscriptionId, JoinHandle<()>>,
}

struct Shared {
    session: Mutex<Session>,
    sources: SearchSources,
    actions: Arc<dyn SearchActions>,
    skip_first_snapshot: bool,
    state_tx: watch::Sender<SearchState>,
    matches_tx: watch::Sender<Vec<Item>>,
    transitions_tx: broadcast::Sender<SearchState>,
}

impl Shared {
    /// Feed one input through the core and carry out its effects.
    fn dispatch(self: &Arc<Self>, input: Input) {
        let dismiss = {
            let mut session = self.session.lock();
            let effects = session.core.handle(input);

            let mut dismiss = false;
            for effect in effects {
                if effect == Effect::Dismiss {
                    dismiss = true;
                } else {
                    self.apply(&mut session, effect);
                }
            }
            dismiss
        };

        // Host callbacks run outside the session lock so they may call back in.
        if dismiss {
            info!("Dismissing beacon search");
            self.actions.dismiss();
        }
    }

    fn apply(self: &Arc<Self>, session: &mut Session, effect: Effect) {
        match effect {
            Effect::Publish(state) => {
                self.state_tx.send_replace(state);
                let _ = self.transitions_tx.send(state);
            }
            Effect::PublishMatches(matches) => {
                debug!("Publishing {} matches", matches.len());
                self.matches_tx.send_replace(matches);
            }
            Effect::FetchCatalog(id) => {
                let shared = Arc::clone(self);
                let catalog = self.sources.catalog.clone();
                let handle = tokio::spawn(async move {
                    let result = catalog.fetch_all_items().await;
                    shared.dispatch(Input::CatalogFetched { id, result });
                });
                session.tasks.insert(id, handle);
            }
            Effect::WatchLocation { id, items } => {
                info!("Monitoring location for {} geo-tagged items", items.len());
                let mut states = self.sources.location.location_states(&items);
                let shared = Arc::clone(self);
                let handle = tokio::spawn(async move {
                    while let Some(state) = states.next().await {
                        shared.dispatch(Input::LocationUpdate { id, state });
                    }
                    shared.dispatch(Input::LocationFinished { id });
                });
                session.tasks.insert(id, handle);
            }
            Effect::StartRanging(id) => {
                let mut batches = self.sources.beacons.find_beacons();
                if self.skip_first_snapshot {
                    batches = batches.skip(1).boxed();
                }
                let shared = Arc::clone(self);
                let handle = tokio::spawn(async move {
                    while let Some(result) = batches.next().await {
                        let failed = result.is_err();
                        shared.dispatch(Input::BeaconsRanged { id, result });
                        if failed {
                            return;
                        }
                    }
                    shared.dispatch(Input::RangingFinished { id });
                });
                session.tasks.insert(id, handle);
            }
            Effect::Cancel(id) => {
                if let Some(handle) = session.tasks.remove(&id) {
                    handle.abort();
                }
            }
            Effect::Dismiss => {}
        }
    }
}

/// Orchestrates catalog fetch, geofencing and beacon ranging into a single
/// [`SearchState`] plus a ranked match list.
///
/// All operations are fire-and-forget: upstream failures surface as
/// [`SearchState::Error`], never as a returned error. Operations spawn tasks
/// and must be called from within a tokio runtime.
///
/// Dropping the machine tears down every subscription.
pub struct SearchStateMachine {
    shared: Arc<Shared>,
    web_link: Option<Url>,
    default_event_location: GeoPoint,
    callback_counter: AtomicU64,
}

impl SearchStateMachine {
    /// Create a machine in the `Loading` state. Nothing is fetched until
    /// [`start`](Self::start) is called.
    pub fn new(
        sources: SearchSources,
        actions: Arc<dyn SearchActions>,
        config: &SearchConfig,
    ) -> Self {
        let options = CoreOptions {
            auto_scan_in_range: config.auto_scan_in_range,
        };
        let (state_tx, _) = watch::channel(SearchState::Loading);
        let (matches_tx, _) = watch::channel(Vec::new());
        let (transitions_tx, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);

        let web_link = match config.web_link() {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Invalid web link {}: {}", config.web_link, e);
                None
            }
        };

        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session {
                    core: SearchCore::new(options),
                    tasks: HashMap::new(),
                }),
                sources,
                actions,
                skip_first_snapshot: config.skip_first_snapshot,
                state_tx,
                matches_tx,
                transitions_tx,
            }),
            web_link,
            default_event_location: config.default_event_location,
            callback_counter: AtomicU64::new(0),
        }
    }

    // === Operations ===

    /// Fetch the item catalog. A no-op while a fetch is already in flight or
    /// once the catalog has loaded; after a failed fetch it retries.
    ///
    /// On success with a non-empty catalog, location monitoring starts
    /// immediately.
    pub fn start(&self) {
        self.shared.dispatch(Input::Start);
    }

    /// Start location monitoring if the catalog is non-empty and no location
    /// subscription is active.
    pub fn monitor_location(&self) {
        self.shared.dispatch(Input::MonitorLocation);
    }

    /// Start beacon ranging. A no-op with an empty catalog; while ranging is
    /// already active it only moves the state back to `Scanning`.
    pub fn find_beacons(&self) {
        self.shared.dispatch(Input::FindBeacons);
    }

    /// Stop ranging, keeping the current matches.
    pub fn cancel_find_beacons(&self) {
        self.shared.dispatch(Input::CancelFindBeacons);
    }

    /// Restart location monitoring after the user returns from the OS
    /// permission settings.
    pub fn did_open_device_settings(&self) {
        self.shared.dispatch(Input::DidOpenDeviceSettings);
    }

    /// Stop ranging and every other subscription, then ask the host to
    /// dismiss the screen.
    pub fn close(&self) {
        self.shared.dispatch(Input::Close);
    }

    /// Tear down every subscription without dismissing.
    pub fn shutdown(&self) {
        self.shared.dispatch(Input::Shutdown);
    }

    // === Navigation ===

    /// Show the details of the match at `index`.
    ///
    /// Returns false if there is no such match.
    pub fn select_match(&self, index: usize) -> bool {
        match self.match_at(index) {
            Some(item) => {
                debug!("Showing details for {}", item.id);
                self.shared.actions.show_details(item);
                true
            }
            None => false,
        }
    }

    /// Open the project website. A no-op if the configured link is invalid.
    pub fn open_web(&self) {
        if let Some(url) = &self.web_link {
            self.shared.actions.show_web_view(url.clone());
        }
    }

    /// Send the user to the OS permission settings.
    ///
    /// Call [`did_open_device_settings`](Self::did_open_device_settings) once
    /// control returns.
    pub fn open_device_settings(&self) {
        self.shared.actions.open_device_settings();
    }

    // === Read model ===

    /// Current state.
    pub fn state(&self) -> SearchState {
        *self.shared.state_tx.borrow()
    }

    /// Current ranked matches, closest first.
    pub fn matches(&self) -> Vec<Item> {
        self.shared.matches_tx.borrow().clone()
    }

    /// Number of current matches.
    pub fn match_count(&self) -> usize {
        self.shared.matches_tx.borrow().len()
    }

    /// The match at `index`, if any.
    pub fn match_at(&self, index: usize) -> Option<Item> {
        self.shared.matches_tx.borrow().get(index).cloned()
    }

    /// Last reported search region center, or the configured default.
    pub fn event_location(&self) -> GeoPoint {
        self.shared
            .session
            .lock()
            .core
            .region_center()
            .unwrap_or(self.default_event_location)
    }

    /// Snapshot of the fetched catalog.
    pub fn catalog(&self) -> ItemCatalog {
        self.shared.session.lock().core.catalog().clone()
    }

    /// Check if a ranging subscription is active.
    pub fn is_ranging(&self) -> bool {
        self.shared.session.lock().core.is_ranging()
    }

    /// Check if a location subscription is active.
    pub fn is_monitoring_location(&self) -> bool {
        self.shared.session.lock().core.is_monitoring_location()
    }

    // === Observation ===

    /// Observe the current state. The receiver sees the latest value first.
    pub fn subscribe_state(&self) -> watch::Receiver<SearchState> {
        self.shared.state_tx.subscribe()
    }

    /// Observe the ranked match list. The receiver sees the latest value first.
    pub fn subscribe_matches(&self) -> watch::Receiver<Vec<Item>> {
        self.shared.matches_tx.subscribe()
    }

    /// Observe every transition from now on.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<SearchState> {
        self.shared.transitions_tx.subscribe()
    }

    /// Register a callback invoked on every transition.
    pub fn on_state_changed<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(SearchState) + Send + Sync + 'static,
    {
        let callback_id = self.callback_counter.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.shared.transitions_tx.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(state) => callback(state),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("State callback lagged, skipped {} transitions", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        CallbackHandle::new(callback_id, move || {
            handle.abort();
        })
    }
}

impl Drop for SearchStateMachine {
    fn drop(&mut self) {
        self.shared.dispatch(Input::Shutdown);
    }
}
