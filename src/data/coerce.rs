use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    data::{
        observation::{Cell, Metrics, Observation},
        panel::Panel,
        schema,
        table::RawTable,
    },
    error::FundError,
    util::date_utils::parse_day_first,
};

/// A column after the generic numeric pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Text(Vec<String>),
}

impl Column {
    /// Numeric view of the column. Text cells go through the same cleaning
    /// as the generic pass and become `None` when they still do not parse.
    pub fn to_floats(&self) -> Vec<Option<f64>> {
        match self {
            Column::Numeric(values) => values.clone(),
            Column::Text(values) => values.iter().map(|v| parse_number(v)).collect(),
        }
    }

    fn cell(&self, row: usize) -> Cell {
        match self {
            Column::Numeric(values) => values[row].map(Cell::Number).unwrap_or(Cell::Missing),
            Column::Text(values) if values[row].is_empty() => Cell::Missing,
            Column::Text(values) => Cell::Text(values[row].clone()),
        }
    }

    fn text(&self, row: usize) -> String {
        match self {
            Column::Numeric(values) => values[row].map(|v| v.to_string()).unwrap_or_default(),
            Column::Text(values) => values[row].clone(),
        }
    }
}

/// What the coercion stage did to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoercionReport {
    pub rows_read: usize,
    pub dropped_missing_scheme: usize,
    pub dropped_missing_date: usize,
    pub dropped_missing_nav: usize,
    /// Columns left as text because no value in them parsed as a number.
    pub text_columns: Vec<String>,
}

impl CoercionReport {
    pub fn rows_dropped(&self) -> usize {
        self.dropped_missing_scheme + self.dropped_missing_date + self.dropped_missing_nav
    }
}

/// Strips thousands separators and surrounding whitespace, then parses.
///
/// `NaN` and infinity spellings count as missing.
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned = value.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a column to numbers if at least one of its values parses.
///
/// A column where nothing parses is kept as the original text.
pub fn coerce_column(values: Vec<String>) -> Column {
    let parsed: Vec<Option<f64>> = values.iter().map(|v| parse_number(v)).collect();
    if parsed.iter().any(Option::is_some) {
        Column::Numeric(parsed)
    } else {
        Column::Text(values)
    }
}

/// Runs the generic numeric pass over every column except the identifier
/// columns (scheme name and valuation date), which have their own parsing.
pub fn coerce_columns(table: RawTable) -> (Vec<String>, Vec<Column>) {
    let (headers, values) = table.into_columns();
    let columns = headers
        .iter()
        .zip(values)
        .map(|(header, values)| {
            if header == schema::SCHEME_NAME || header == schema::DATE_VALUED {
                Column::Text(values)
            } else {
                coerce_column(values)
            }
        })
        .collect();
    (headers, columns)
}

fn require(headers: &[String], name: &str) -> Result<usize, FundError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| FundError::MissingColumn {
            column: name.to_string(),
        })
}

/// Turns a table with normalized headers into a panel of typed observations.
///
/// Rows without a scheme name, a parseable valuation date or a net asset value
/// are dropped; every other unparseable cell becomes missing.
#[instrument(level = "debug", skip(table, date_formats), fields(rows = table.len()))]
pub fn coerce(table: RawTable, date_formats: &[String]) -> Result<(Panel, CoercionReport), FundError> {
    for column in schema::MANDATORY_COLUMNS {
        require(table.headers(), column)?;
    }

    let rows_read = table.len();
    let (headers, columns) = coerce_columns(table);

    let scheme_idx = require(&headers, schema::SCHEME_NAME)?;
    let date_idx = require(&headers, schema::DATE_VALUED)?;
    let nav = columns[require(&headers, schema::NET_ASSET_VALUE)?].to_floats();
    let nav_per_unit = columns[require(&headers, schema::NAV_PER_UNIT)?].to_floats();
    let sale = columns[require(&headers, schema::SALE_PRICE_PER_UNIT)?].to_floats();
    let repurchase = columns[require(&headers, schema::REPURCHASE_PRICE_UNIT)?].to_floats();
    let outstanding = columns[require(&headers, schema::OUTSTANDING_UNITS)?].to_floats();

    let mut text_columns = Vec::new();
    for (header, column) in headers.iter().zip(&columns) {
        if matches!(column, Column::Text(_)) && header != schema::SCHEME_NAME && header != schema::DATE_VALUED {
            if schema::FLOAT_COLUMNS.contains(&header.as_str()) || header == schema::NAV_PER_UNIT {
                warn!("Column {} has no numeric values; all of its cells are missing", header);
            } else {
                debug!("Column {} kept as text", header);
            }
            text_columns.push(header.clone());
        }
    }

    // Extra columns: anything not mapped to a field, first occurrence of a name, never a derived metric
    let mut extra_columns: Vec<String> = Vec::new();
    let mut extra_indices: Vec<usize> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if schema::MANDATORY_COLUMNS.contains(&header.as_str()) {
            continue;
        }
        if schema::DERIVED_COLUMNS.contains(&header.as_str()) {
            debug!("Ignoring derived column {} in input", header);
            continue;
        }
        if extra_columns.contains(header) {
            warn!("Duplicate column {} after normalization; keeping the first", header);
            continue;
        }
        extra_columns.push(header.clone());
        extra_indices.push(idx);
    }

    let mut report = CoercionReport {
        rows_read,
        text_columns,
        ..Default::default()
    };
    let mut observations = Vec::with_capacity(rows_read);
    for row in 0..rows_read {
        let scheme_name = columns[scheme_idx].text(row);
        if scheme_name.trim().is_empty() {
            report.dropped_missing_scheme += 1;
            continue;
        }
        let date_valued: NaiveDate = match parse_day_first(&columns[date_idx].text(row), date_formats) {
            Some(date) => date,
            None => {
                debug!("Dropping row {}: unparseable date {:?}", row, columns[date_idx].text(row));
                report.dropped_missing_date += 1;
                continue;
            }
        };
        let net_asset_value = match nav[row] {
            Some(v) => v,
            None => {
                debug!("Dropping row {}: missing net asset value", row);
                report.dropped_missing_nav += 1;
                continue;
            }
        };
        observations.push(Observation {
            scheme_name,
            date_valued,
            net_asset_value,
            nav_per_unit: nav_per_unit[row],
            sale_price_per_unit: sale[row],
            repurchase_price_unit: repurchase[row],
            outstanding_units: outstanding[row],
            extra: extra_indices.iter().map(|&idx| columns[idx].cell(row)).collect(),
            metrics: Metrics::default(),
        });
    }

    info!(
        "Coerced {} rows: kept {}, dropped {} (scheme {}, date {}, nav {})",
        report.rows_read,
        observations.len(),
        report.rows_dropped(),
        report.dropped_missing_scheme,
        report.dropped_missing_date,
        report.dropped_missing_nav
    );
    Ok((Panel::new(extra_columns, observations), report))
}
