//! Simulated walk: a visitor enters the exhibition and approaches two
//! installations while beacons are ranged.
//!
//! Run with: cargo run --example simulated_walk

use artwald_beacon_search::{
    BeaconId, BeaconScanner, BeaconSnapshot, CatalogSource, GeoPoint, Item, LocationMonitor,
    LocationState, Proximity, Result, SearchActions, SearchConfig, SearchSources,
    SearchStateMachine,
};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const BEACON_UUID: uuid::Uuid = uuid::Uuid::from_u128(0xf7826da6_4fa2_4e98_8024_bc5b71e0893e);

fn installation(minor: u16, title: &str) -> Item {
    let mut item = Item::new(BeaconId::new(BEACON_UUID, 100, minor), title);
    item.location = Some(GeoPoint::new(51.1843 + f64::from(minor) * 0.0001, 7.0429));
    item
}

struct SimulatedCatalog;

#[async_trait::async_trait]
impl CatalogSource for SimulatedCatalog {
    async fn fetch_all_items(&self) -> Result<Vec<Item>> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(vec![
            installation(1, "Waldgeist"),
            installation(2, "Lichtung"),
            installation(3, "Baumhaus"),
        ])
    }
}

struct SimulatedLocation;

impl LocationMonitor for SimulatedLocation {
    fn location_states(&self, items: &[Item]) -> BoxStream<'static, LocationState> {
        let center = items
            .iter()
            .find_map(|item| item.location)
            .unwrap_or_default();
        let states = vec![
            LocationState::Initializing,
            LocationState::UpdatingLocation,
            LocationState::OutOfGeoRange { center },
            LocationState::InGeoRange { center },
        ];
        stream::iter(states)
            .then(|state| async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                state
            })
            .chain(stream::pending())
            .boxed()
    }
}

struct SimulatedBeacons;

impl BeaconScanner for SimulatedBeacons {
    fn find_beacons(&self) -> BoxStream<'static, Result<Vec<BeaconSnapshot>>> {
        let reading = |minor, proximity| {
            BeaconSnapshot::new(BeaconId::new(BEACON_UUID, 100, minor), proximity).with_rssi(-70)
        };
        let batches = vec![
            vec![reading(2, Proximity::Far)],
            vec![reading(2, Proximity::Near), reading(1, Proximity::Far)],
            vec![reading(1, Proximity::Near), reading(2, Proximity::Immediate)],
            vec![reading(1, Proximity::Immediate), reading(9, Proximity::Near)],
        ];
        stream::iter(batches)
            .then(|batch| async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(batch)
            })
            .chain(stream::pending())
            .boxed()
    }
}

struct PrintActions;

impl SearchActions for PrintActions {
    fn show_details(&self, item: Item) {
        println!("-> details for {} ({})", item.title, item.proximity());
    }

    fn show_web_view(&self, url: Url) {
        println!("-> web view {}", url);
    }

    fn dismiss(&self) {
        println!("-> search dismissed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("artwald_beacon_search=debug".parse().unwrap()),
        )
        .init();

    let config = SearchConfig {
        auto_scan_in_range: true,
        ..SearchConfig::default()
    };
    config.validate()?;

    let sources = SearchSources::new(
        Arc::new(SimulatedCatalog),
        Arc::new(SimulatedLocation),
        Arc::new(SimulatedBeacons),
    );
    let search = SearchStateMachine::new(sources, Arc::new(PrintActions), &config);

    let _handle = search.on_state_changed(|state| {
        println!("State: {}", state);
    });

    let mut matches = search.subscribe_matches();
    tokio::spawn(async move {
        while matches.changed().await.is_ok() {
            let ranked = matches.borrow().clone();
            println!("Matches:");
            for item in ranked {
                println!("  {:<10} {}", item.title, item.proximity());
            }
        }
    });

    println!("Starting search near {:?}", search.event_location());
    search.start();

    tokio::time::sleep(Duration::from_secs(7)).await;

    println!("\nClosest match: {:?}", search.match_at(0).map(|m| m.title));
    search.select_match(0);
    search.open_web();
    search.close();

    Ok(())
}
