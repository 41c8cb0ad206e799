//! Transition logic of the search state machine.
//!
//! [`SearchCore`] is synchronous and performs no I/O. Every caller operation
//! and every upstream delivery is fed in as an [`Input`]; the core updates
//! its state and returns the [`Effect`]s the driver has to carry out.

use tracing::{debug, info, trace, warn};

use crate::data::{BeaconSnapshot, GeoPoint, Item, ItemCatalog, LocationState};
use crate::error::{ErrorKind, Result};
use crate::search::matching::rank_matches;
use crate::search::state::SearchState;

/// Identifies one upstream subscription.
pub(crate) type SubscriptionId = u64;

/// Everything the core reacts to.
#[derive(Debug)]
pub(crate) enum Input {
    Start,
    MonitorLocation,
    FindBeacons,
    CancelFindBeacons,
    DidOpenDeviceSettings,
    Close,
    Shutdown,
    CatalogFetched {
        id: SubscriptionId,
        result: Result<Vec<Item>>,
    },
    LocationUpdate {
        id: SubscriptionId,
        state: LocationState,
    },
    LocationFinished {
        id: SubscriptionId,
    },
    BeaconsRanged {
        id: SubscriptionId,
        result: Result<Vec<BeaconSnapshot>>,
    },
    RangingFinished {
        id: SubscriptionId,
    },
}

/// Work the driver performs on behalf of the core.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    /// Publish a new state value.
    Publish(SearchState),
    /// Publish a new ranked match list.
    PublishMatches(Vec<Item>),
    /// Spawn the one-shot catalog fetch.
    FetchCatalog(SubscriptionId),
    /// Subscribe to location states for the given items.
    WatchLocation {
        id: SubscriptionId,
        items: Vec<Item>,
    },
    /// Subscribe to beacon ranging.
    StartRanging(SubscriptionId),
    /// Tear down a subscription. A no-op for one that already ended.
    Cancel(SubscriptionId),
    /// Hand control back to the host for dismissal.
    Dismiss,
}

/// Options that influence transitions.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CoreOptions {
    /// Start ranging as soon as the user enters the search region.
    pub auto_scan_in_range: bool,
}

/// State and subscription bookkeeping of one search session.
#[derive(Debug, Default)]
pub(crate) struct SearchCore {
    options: CoreOptions,
    state: SearchState,
    catalog: ItemCatalog,
    catalog_loaded: bool,
    region_center: Option<GeoPoint>,
    next_id: SubscriptionId,
    catalog_fetch: Option<SubscriptionId>,
    location: Option<SubscriptionId>,
    ranging: Option<SubscriptionId>,
}

impl SearchCore {
    pub fn new(options: CoreOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn region_center(&self) -> Option<GeoPoint> {
        self.region_center
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn is_ranging(&self) -> bool {
        self.ranging.is_some()
    }

    pub fn is_monitoring_location(&self) -> bool {
        self.location.is_some()
    }

    /// Apply one input and return the resulting effects in order.
    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        let mut effects = Vec::new();

        match input {
            Input::Start => self.start(&mut effects),
            Input::MonitorLocation => self.monitor_location(&mut effects),
            Input::FindBeacons => self.find_beacons(&mut effects),
            Input::CancelFindBeacons => self.cancel_ranging(&mut effects),
            Input::DidOpenDeviceSettings => self.restart_location(&mut effects),
            Input::Close => {
                self.cancel_all(&mut effects);
                effects.push(Effect::Dismiss);
            }
            Input::Shutdown => self.cancel_all(&mut effects),
            Input::CatalogFetched { id, result } => {
                self.on_catalog_fetched(id, result, &mut effects)
            }
            Input::LocationUpdate { id, state } => {
                self.on_location_update(id, state, &mut effects)
            }
            Input::LocationFinished { id } => self.on_location_finished(id, &mut effects),
            Input::BeaconsRanged { id, result } => {
                self.on_beacons_ranged(id, result, &mut effects)
            }
            Input::RangingFinished { id } => self.on_ranging_finished(id, &mut effects),
        }

        effects
    }

    fn next_subscription(&mut self) -> SubscriptionId {
        self.next_id += 1;
        self.next_id
    }

    /// Move to `new` unless already there. Returns whether the state changed.
    fn transition(&mut self, new: SearchState, effects: &mut Vec<Effect>) -> bool {
        if self.state == new {
            trace!("Suppressed redundant transition to {}", new);
            return false;
        }

        debug!("Search state changed: {} -> {}", self.state, new);
        self.state = new;
        effects.push(Effect::Publish(new));
        true
    }

    fn start(&mut self, effects: &mut Vec<Effect>) {
        if self.catalog_fetch.is_some() {
            debug!("Catalog fetch already in flight, ignoring start");
            return;
        }

        if self.catalog_loaded {
            debug!("Catalog already loaded, ignoring start");
            return;
        }

        info!("Starting beacon search session");
        self.transition(SearchState::Loading, effects);

        let id = self.next_subscription();
        self.catalog_fetch = Some(id);
        effects.push(Effect::FetchCatalog(id));
    }

    fn monitor_location(&mut self, effects: &mut Vec<Effect>) {
        if self.catalog.is_empty() {
            debug!("Catalog is empty, not monitoring location");
            return;
        }

        if self.location.is_some() {
            debug!("Location monitoring already active");
            return;
        }

        let id = self.next_subscription();
        self.location = Some(id);
        let items = self.catalog.geo_tagged().cloned().collect();
        effects.push(Effect::WatchLocation { id, items });
    }

    fn restart_location(&mut self, effects: &mut Vec<Effect>) {
        let Some(old) = self.location.take() else {
            debug!("No location subscription to restart");
            return;
        };

        info!("Restarting location monitoring after device settings");
        effects.push(Effect::Cancel(old));
        self.monitor_location(effects);
    }

    fn find_beacons(&mut self, effects: &mut Vec<Effect>) {
        if self.catalog.is_empty() {
            debug!("Catalog is empty, not ranging");
            return;
        }

        if self.ranging.is_some() {
            debug!("Ranging already active");
            self.transition(SearchState::Scanning, effects);
            return;
        }

        let id = self.next_subscription();
        self.ranging = Some(id);
        info!("Starting beacon ranging");
        self.transition(SearchState::Scanning, effects);
        effects.push(Effect::StartRanging(id));
    }

    fn cancel_ranging(&mut self, effects: &mut Vec<Effect>) {
        if let Some(id) = self.ranging.take() {
            info!("Stopping beacon ranging");
            effects.push(Effect::Cancel(id));
        }
    }

    fn cancel_all(&mut self, effects: &mut Vec<Effect>) {
        self.cancel_ranging(effects);
        if let Some(id) = self.location.take() {
            effects.push(Effect::Cancel(id));
        }
        if let Some(id) = self.catalog_fetch.take() {
            effects.push(Effect::Cancel(id));
        }
    }

    fn on_catalog_fetched(
        &mut self,
        id: SubscriptionId,
        result: Result<Vec<Item>>,
        effects: &mut Vec<Effect>,
    ) {
        if self.catalog_fetch != Some(id) {
            trace!("Dropping result of stale catalog fetch {}", id);
            return;
        }
        self.catalog_fetch = None;
        effects.push(Effect::Cancel(id));

        match result {
            Ok(items) => {
                info!("Catalog loaded with {} items", items.len());
                self.catalog.replace(items);
                self.catalog_loaded = true;
                self.transition(SearchState::FinishedLoading, effects);
                self.monitor_location(effects);
            }
            Err(e) => {
                warn!("Catalog fetch failed: {}", e);
                self.transition(SearchState::FinishedLoading, effects);
                self.transition(SearchState::Error(ErrorKind::CatalogFetchFailed), effects);
            }
        }
    }

    fn on_location_update(
        &mut self,
        id: SubscriptionId,
        location: LocationState,
        effects: &mut Vec<Effect>,
    ) {
        if self.location != Some(id) {
            trace!("Dropping {} from stale location subscription {}", location, id);
            return;
        }

        match location {
            LocationState::NoPermission => {
                self.transition(SearchState::NoPermission, effects);
            }
            LocationState::OutOfGeoRange { center } => {
                self.region_center = Some(center);
                self.transition(SearchState::OutOfGeoRange { center }, effects);
                self.cancel_ranging(effects);
            }
            LocationState::InGeoRange { center } => {
                self.region_center = Some(center);
                let entered = self.transition(SearchState::InGeoRange { center }, effects);
                if entered && self.options.auto_scan_in_range {
                    self.find_beacons(effects);
                }
            }
            LocationState::DidRangeBeacon => {
                if self.state == SearchState::Scanning {
                    self.transition(SearchState::DidRangeBeacon, effects);
                }
            }
            LocationState::Initializing | LocationState::UpdatingLocation => {}
        }
    }

    fn on_location_finished(&mut self, id: SubscriptionId, effects: &mut Vec<Effect>) {
        if self.location != Some(id) {
            return;
        }

        debug!("Location monitoring completed");
        self.location = None;
        effects.push(Effect::Cancel(id));
        self.transition(SearchState::FinishedScanning, effects);
    }

    fn on_beacons_ranged(
        &mut self,
        id: SubscriptionId,
        result: Result<Vec<BeaconSnapshot>>,
        effects: &mut Vec<Effect>,
    ) {
        if self.ranging != Some(id) {
            trace!("Dropping batch from stale ranging subscription {}", id);
            return;
        }

        match result {
            Ok(batch) => {
                trace!("Ranged {} beacons", batch.len());
                let matches = rank_matches(self.catalog.items(), &batch);
                effects.push(Effect::PublishMatches(matches));
            }
            Err(e) => {
                warn!("Beacon ranging failed: {}", e);
                self.ranging = None;
                effects.push(Effect::Cancel(id));
                self.transition(SearchState::FinishedScanning, effects);
                self.transition(
                    SearchState::Error(ErrorKind::BeaconScanningFailed),
                    effects,
                );
            }
        }
    }

    fn on_ranging_finished(&mut self, id: SubscriptionId, effects: &mut Vec<Effect>) {
        if self.ranging != Some(id) {
            return;
        }

        debug!("Beacon ranging completed");
        self.ranging = None;
        effects.push(Effect::Cancel(id));
        self.transition(SearchState::FinishedScanning, effects);
    }
}
