use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::NeighbourScope,
    data::{observation::Observation, panel::Panel},
    util::math_utils::quantile,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlierReport {
    /// Upper Tukey fence of the historical segment, `None` when the segment is empty.
    pub upper_bound: Option<f64>,
    pub flagged: usize,
    pub replaced: usize,
}

/// `Q3 + multiplier * (Q3 - Q1)` of the net asset values dated before `cutoff`.
pub fn upper_fence(observations: &[Observation], cutoff: NaiveDate, multiplier: f64) -> Option<f64> {
    let historical: Vec<f64> = observations
        .iter()
        .filter(|obs| obs.date_valued < cutoff)
        .map(|obs| obs.net_asset_value)
        .collect();
    let q1 = quantile(&historical, 0.25)?;
    let q3 = quantile(&historical, 0.75)?;
    Some(q3 + multiplier * (q3 - q1))
}

/// Replaces upward spikes in the pre-cutoff segment with the mean of their neighbours.
///
/// Neighbours are taken in table order, either across the whole table or only
/// among rows of the same scheme. A flagged row without both neighbours keeps
/// its value. Rows are processed top to bottom, so a replacement is visible to
/// the next flagged row.
#[instrument(level = "debug", skip(panel), fields(rows = panel.len()))]
pub fn resolve_outliers(
    panel: &Panel,
    cutoff: NaiveDate,
    multiplier: f64,
    scope: NeighbourScope,
) -> (Panel, OutlierReport) {
    let mut observations = panel.observations().to_vec();
    let Some(upper_bound) = upper_fence(&observations, cutoff, multiplier) else {
        debug!("No observations before {}; outlier check skipped", cutoff);
        return (panel.clone(), OutlierReport::default());
    };

    let flagged: Vec<usize> = observations
        .iter()
        .enumerate()
        .filter(|(_, obs)| obs.date_valued < cutoff && obs.net_asset_value > upper_bound)
        .map(|(idx, _)| idx)
        .collect();

    let mut replaced = 0;
    for &idx in &flagged {
        let neighbours = match scope {
            NeighbourScope::Table => table_neighbours(observations.len(), idx),
            NeighbourScope::Scheme => scheme_neighbours(&observations, idx),
        };
        let Some((prev, next)) = neighbours else {
            warn!(
                "Outlier {} for {} on {} has no neighbours on both sides; left unchanged",
                observations[idx].net_asset_value,
                observations[idx].scheme_name,
                observations[idx].date_valued
            );
            continue;
        };
        let substitute = (observations[prev].net_asset_value + observations[next].net_asset_value) / 2.0;
        debug!(
            "Replacing outlier {} for {} on {} with {}",
            observations[idx].net_asset_value,
            observations[idx].scheme_name,
            observations[idx].date_valued,
            substitute
        );
        observations[idx].net_asset_value = substitute;
        replaced += 1;
    }

    info!(
        "Outlier fence {:.4}: {} flagged, {} replaced",
        upper_bound,
        flagged.len(),
        replaced
    );
    let report = OutlierReport {
        upper_bound: Some(upper_bound),
        flagged: flagged.len(),
        replaced,
    };
    (panel.with_observations(observations), report)
}

fn table_neighbours(len: usize, idx: usize) -> Option<(usize, usize)> {
    if idx == 0 || idx + 1 >= len {
        None
    } else {
        Some((idx - 1, idx + 1))
    }
}

fn scheme_neighbours(observations: &[Observation], idx: usize) -> Option<(usize, usize)> {
    let scheme = &observations[idx].scheme_name;
    let prev = observations[..idx]
        .iter()
        .rposition(|obs| &obs.scheme_name == scheme)?;
    let next = observations[idx + 1..]
        .iter()
        .position(|obs| &obs.scheme_name == scheme)?;
    Some((prev, idx + 1 + next))
}
