use std::{fs::File, io::Write, path::Path};

use csv::WriterBuilder;
use tracing::{debug, info};

use crate::{
    data::{observation::Observation, schema},
    error::FundError,
};

/// The analytics table: observations plus the names of their pass-through columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    extra_columns: Vec<String>,
    observations: Vec<Observation>,
}

impl Panel {
    pub fn new(extra_columns: Vec<String>, observations: Vec<Observation>) -> Self {
        Self {
            extra_columns,
            observations,
        }
    }

    /// A panel with the same extra columns but different rows.
    pub fn with_observations(&self, observations: Vec<Observation>) -> Self {
        Self {
            extra_columns: self.extra_columns.clone(),
            observations,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Stable sort by scheme name, then date.
    pub fn sorted(&self) -> Self {
        let mut observations = self.observations.clone();
        observations.sort_by(|a, b| a.key().cmp(&b.key()));
        self.with_observations(observations)
    }

    /// Runs of consecutive observations sharing a scheme name.
    ///
    /// On a sorted panel this yields exactly one slice per scheme.
    pub fn groups(&self) -> impl Iterator<Item = &[Observation]> {
        self.observations
            .chunk_by(|a, b| a.scheme_name == b.scheme_name)
    }

    /// Distinct scheme names in order of first appearance.
    pub fn scheme_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for obs in &self.observations {
            if !names.contains(&obs.scheme_name.as_str()) {
                names.push(&obs.scheme_name);
            }
        }
        names
    }

    /// All observations of one scheme, in panel order.
    pub fn scheme(&self, name: &str) -> Vec<&Observation> {
        self.observations
            .iter()
            .filter(|obs| obs.scheme_name == name)
            .collect()
    }

    /// Column names in export order: canonical inputs, extras, derived metrics.
    pub fn export_headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = [
            schema::SCHEME_NAME,
            schema::DATE_VALUED,
            schema::NAV_PER_UNIT,
            schema::SALE_PRICE_PER_UNIT,
            schema::REPURCHASE_PRICE_UNIT,
            schema::OUTSTANDING_UNITS,
            schema::NET_ASSET_VALUE,
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();
        headers.extend(self.extra_columns.iter().cloned());
        headers.extend(schema::DERIVED_COLUMNS.iter().map(|h| h.to_string()));
        headers
    }

    /// Writes the panel as CSV. Dates use `date_format`, undefined values are empty.
    pub fn write_csv<W: Write>(&self, writer: W, date_format: &str) -> Result<(), FundError> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(self.export_headers())?;
        for obs in &self.observations {
            let mut record = vec![
                obs.scheme_name.clone(),
                obs.date_valued.format(date_format).to_string(),
                optional_field(obs.nav_per_unit),
                optional_field(obs.sale_price_per_unit),
                optional_field(obs.repurchase_price_unit),
                optional_field(obs.outstanding_units),
                obs.net_asset_value.to_string(),
            ];
            record.extend(obs.extra.iter().map(|cell| cell.to_field()));
            record.extend([
                optional_field(obs.metrics.profit),
                optional_field(obs.metrics.profit_margin),
                optional_field(obs.metrics.daily_return),
                optional_field(obs.metrics.nav_ma7),
                optional_field(obs.metrics.volatility_7d),
            ]);
            writer.write_record(&record)?;
        }
        writer.flush()?;
        debug!("Wrote {} panel rows", self.observations.len());
        Ok(())
    }

    pub fn write_csv_file<P: AsRef<Path>>(&self, path: P, date_format: &str) -> Result<(), FundError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.write_csv(file, date_format)?;
        info!("Panel written to {}", path.display());
        Ok(())
    }
}

fn optional_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::observation::{Cell, ObservationBuilder};
    use chrono::NaiveDate;

    fn obs(scheme: &str, day: u32, nav: f64) -> Observation {
        ObservationBuilder::default()
            .scheme_name(scheme)
            .date_valued(NaiveDate::from_ymd_opt(2015, 3, day).unwrap())
            .net_asset_value(nav)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sorted_and_groups() {
        let panel = Panel::new(
            vec![],
            vec![
                obs("Wekeza", 2, 1.0),
                obs("Umoja", 3, 2.0),
                obs("Wekeza", 1, 3.0),
                obs("Umoja", 1, 4.0),
            ],
        );
        let sorted = panel.sorted();
        let groups: Vec<&[Observation]> = sorted.groups().collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].scheme_name, "Umoja");
        assert_eq!(groups[0][0].net_asset_value, 4.0);
        assert_eq!(groups[1][0].net_asset_value, 3.0);
        assert_eq!(groups[1][1].net_asset_value, 1.0);
        // The input panel is left untouched
        assert_eq!(panel.observations()[0].scheme_name, "Wekeza");
    }

    #[test]
    fn test_scheme_filter_and_names() {
        let panel = Panel::new(
            vec![],
            vec![obs("B", 1, 1.0), obs("A", 1, 2.0), obs("B", 2, 3.0)],
        );
        assert_eq!(panel.scheme_names(), vec!["B", "A"]);
        let b: Vec<f64> = panel.scheme("B").iter().map(|o| o.net_asset_value).collect();
        assert_eq!(b, vec![1.0, 3.0]);
        assert!(panel.scheme("C").is_empty());
    }

    #[test]
    fn test_write_csv() {
        let mut row = obs("Umoja, Fund", 4, 1234.5);
        row.nav_per_unit = Some(10.0);
        row.extra = vec![Cell::Missing];
        row.metrics.nav_ma7 = Some(1234.5);
        let panel = Panel::new(vec!["Remarks".to_string()], vec![row]);

        let mut buffer = Vec::new();
        panel.write_csv(&mut buffer, "%d-%m-%Y").unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "SchemeName,DateValued,NavPerUnit,SalePricePerUnit,RepurchasePriceUnit,\
             OutstandingNumberofUnits,NetAssetValue,Remarks,Profit,ProfitMargin,\
             DailyReturn,NAV_MA7,7DVolatility"
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"Umoja, Fund\",04-03-2015,10,,,,1234.5,,,,,1234.5,"
        );
    }

    #[test]
    fn test_write_csv_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("panel.csv");
        let panel = Panel::new(vec![], vec![obs("Umoja", 1, 1.0)]);
        panel.write_csv_file(&path, "%d-%m-%Y").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
