use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::{
    data::{observation::Observation, panel::Panel},
    util::date_utils::days_inclusive,
};

/// Removes repeated (scheme, date) observations, keeping the last one in input order.
///
/// Survivors keep their relative order. Returns the new panel and the number
/// of rows removed.
#[instrument(level = "debug", skip(panel), fields(rows = panel.len()))]
pub fn deduplicate(panel: &Panel) -> (Panel, usize) {
    let mut last_seen: HashMap<(&str, NaiveDate), usize> = HashMap::with_capacity(panel.len());
    for (idx, obs) in panel.observations().iter().enumerate() {
        last_seen.insert(obs.key(), idx);
    }

    let kept: Vec<Observation> = panel
        .observations()
        .iter()
        .enumerate()
        .filter(|(idx, obs)| last_seen.get(&obs.key()) == Some(idx))
        .map(|(_, obs)| obs.clone())
        .collect();

    let removed = panel.len() - kept.len();
    if removed > 0 {
        info!("Removed {} duplicate observations", removed);
    }
    (panel.with_observations(kept), removed)
}

/// Resamples every scheme onto consecutive calendar days between its first and
/// last observation, forward-filling each inserted day from the latest real one.
///
/// The result is ordered by scheme name, then date. If a date still occurs
/// more than once the last occurrence is used. Returns the new panel and the
/// number of inserted days.
#[instrument(level = "debug", skip(panel), fields(rows = panel.len()))]
pub fn fill_gaps(panel: &Panel) -> (Panel, usize) {
    let mut groups: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in panel.observations() {
        groups.entry(obs.scheme_name.as_str()).or_default().push(obs);
    }

    let mut filled = Vec::with_capacity(panel.len());
    let mut inserted = 0;
    for (scheme, mut group) in groups {
        group.sort_by_key(|obs| obs.date_valued);
        let (first, last) = match (group.first(), group.last()) {
            (Some(first), Some(last)) => (first.date_valued, last.date_valued),
            _ => continue,
        };

        let mut cursor = 0;
        let mut latest: Option<&Observation> = None;
        let mut scheme_inserted = 0;
        for day in days_inclusive(first, last) {
            let mut real = None;
            while cursor < group.len() && group[cursor].date_valued == day {
                real = Some(group[cursor]);
                cursor += 1;
            }
            match (real, latest) {
                (Some(obs), _) => {
                    filled.push(obs.clone());
                    latest = Some(obs);
                }
                (None, Some(previous)) => {
                    filled.push(previous.carried_to(day));
                    scheme_inserted += 1;
                }
                // The first day is always a real observation
                (None, None) => {}
            }
        }
        if scheme_inserted > 0 {
            debug!("Inserted {} days for {} ({} to {})", scheme_inserted, scheme, first, last);
        }
        inserted += scheme_inserted;
    }

    info!("Gap filling inserted {} days, panel now has {} rows", inserted, filled.len());
    (panel.with_observations(filled), inserted)
}
