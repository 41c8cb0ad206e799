//! Merging ranging batches into the ranked match list.

use crate::data::{BeaconSnapshot, Item, Proximity};

/// Build the ranked match list for one ranging batch.
///
/// Keeps the catalog items whose beacon minor appears in `batch`, copies the
/// proximity of the first reading with that minor onto each, and sorts the
/// result closest first. Ties keep catalog order.
///
/// Items are matched on the minor value only; UUID and major are ignored.
/// Two deployments sharing minors would cross-match. This mirrors the
/// catalog convention that minors are unique per forest, but it is a suspect
/// key and should not be widened without confirming the deployment layout.
pub fn rank_matches(items: &[Item], batch: &[BeaconSnapshot]) -> Vec<Item> {
    let mut matches: Vec<Item> = items
        .iter()
        .filter(|item| batch.iter().any(|reading| reading.minor() == item.minor()))
        .map(|item| {
            let mut matched = item.clone();
            let proximity = batch
                .iter()
                .find(|reading| reading.minor() == item.minor())
                .map(|reading| reading.proximity)
                .unwrap_or(Proximity::Unknown);
            matched.set_proximity(proximity);
            matched
        })
        .collect();

    matches.sort_by_key(|item| item.proximity().rank());
    matches
}
