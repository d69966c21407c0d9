use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    data::{
        observation::{Metrics, Observation},
        panel::Panel,
    },
    error::FundError,
    util::math_utils::{mean, sample_std_deviation},
};

/// Trailing window over the last `period` values of a series.
///
/// Statistics use the defined values currently in the window, so a window
/// that is not yet full still produces a result (minimum of one value).
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    window: VecDeque<Option<f64>>,
}

impl RollingWindow {
    pub fn new(period: usize) -> Result<Self, FundError> {
        if period == 0 {
            return Err(FundError::ConfigError(
                "Rolling window period must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            period,
            window: VecDeque::with_capacity(period),
        })
    }

    pub fn push(&mut self, value: Option<f64>) {
        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    pub fn mean(&self) -> Option<f64> {
        mean(&self.values())
    }

    /// Sample standard deviation. Undefined with fewer than two defined values.
    pub fn std_dev(&self) -> Option<f64> {
        sample_std_deviation(&self.values())
    }

    fn values(&self) -> Vec<Option<f64>> {
        self.window.iter().copied().collect()
    }
}

/// Sale price minus repurchase price.
pub fn profit(obs: &Observation) -> Option<f64> {
    Some(obs.sale_price_per_unit? - obs.repurchase_price_unit?)
}

/// Profit as a percentage of the sale price. Undefined for a zero sale price.
pub fn profit_margin(obs: &Observation) -> Option<f64> {
    let sale = obs.sale_price_per_unit?;
    if sale == 0.0 {
        return None;
    }
    Some(profit(obs)? / sale * 100.0)
}

/// Percentage change from `previous` to `current`. Undefined if either is
/// missing or `previous` is zero.
pub fn percent_change(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    let previous = previous?;
    let current = current?;
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Computes every derived metric.
///
/// The panel is sorted by (scheme, date) first; grouped metrics never look
/// across a scheme boundary.
#[instrument(level = "debug", skip(panel), fields(rows = panel.len()))]
pub fn compute_metrics(panel: &Panel, window: usize) -> Result<Panel, FundError> {
    let sorted = panel.sorted();
    let mut observations = Vec::with_capacity(sorted.len());

    for group in sorted.groups() {
        let mut nav_window = RollingWindow::new(window)?;
        let mut return_window = RollingWindow::new(window)?;
        let mut previous_nav_per_unit: Option<f64> = None;

        for (position, obs) in group.iter().enumerate() {
            let daily_return = if position == 0 {
                None
            } else {
                percent_change(previous_nav_per_unit, obs.nav_per_unit)
            };
            previous_nav_per_unit = obs.nav_per_unit;

            nav_window.push(Some(obs.net_asset_value));
            return_window.push(daily_return);

            observations.push(Observation {
                metrics: Metrics {
                    profit: profit(obs),
                    profit_margin: profit_margin(obs),
                    daily_return,
                    nav_ma7: nav_window.mean(),
                    volatility_7d: return_window.std_dev(),
                },
                ..obs.clone()
            });
        }
        if let Some(first) = group.first() {
            debug!("Computed metrics for {} over {} days", first.scheme_name, group.len());
        }
    }

    info!("Computed metrics for {} rows", observations.len());
    Ok(sorted.with_observations(observations))
}

/// Mean profit margin of one scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemeMargin {
    pub scheme_name: String,
    /// `None` when no row of the scheme has a defined margin.
    pub average_margin: Option<f64>,
}

/// Average profit margin per scheme, highest first. Undefined averages sort last.
pub fn average_profit_margin(panel: &Panel) -> Vec<SchemeMargin> {
    let sorted = panel.sorted();
    let mut margins: Vec<SchemeMargin> = sorted
        .groups()
        .filter_map(|group| {
            let first = group.first()?;
            let values: Vec<Option<f64>> = group.iter().map(|o| o.metrics.profit_margin).collect();
            Some(SchemeMargin {
                scheme_name: first.scheme_name.clone(),
                average_margin: mean(&values),
            })
        })
        .collect();
    margins.sort_by(|a, b| match (a.average_margin, b.average_margin) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    margins
}
