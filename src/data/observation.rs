use chrono::NaiveDate;
use derive_builder::Builder;

/// A pass-through value of a column the pipeline has no dedicated field for.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Renders the cell the way it is written back to CSV. Missing is empty.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Missing => String::new(),
        }
    }
}

/// Derived analytics of one observation. `None` means undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub profit: Option<f64>,
    pub profit_margin: Option<f64>,
    pub daily_return: Option<f64>,
    pub nav_ma7: Option<f64>,
    pub volatility_7d: Option<f64>,
}

/// One valuation of one scheme on one day.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into))]
pub struct Observation {
    pub scheme_name: String,
    pub date_valued: NaiveDate,
    pub net_asset_value: f64,
    #[builder(default)]
    pub nav_per_unit: Option<f64>,
    #[builder(default)]
    pub sale_price_per_unit: Option<f64>,
    #[builder(default)]
    pub repurchase_price_unit: Option<f64>,
    #[builder(default)]
    pub outstanding_units: Option<f64>,
    /// Values of the panel's extra columns, aligned with `Panel::extra_columns`.
    #[builder(default)]
    pub extra: Vec<Cell>,
    #[builder(default)]
    pub metrics: Metrics,
}

impl Observation {
    /// Copy of this observation moved to another day, used for forward-filling.
    pub fn carried_to(&self, date: NaiveDate) -> Self {
        Self {
            date_valued: date,
            ..self.clone()
        }
    }

    /// The (scheme, date) key that identifies an observation in a panel.
    pub fn key(&self) -> (&str, NaiveDate) {
        (self.scheme_name.as_str(), self.date_valued)
    }
}
