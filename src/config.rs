use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Write as _},
    path::Path,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_yaml::from_reader;
use tracing::{debug, info, instrument};

use crate::error::FundError;

/// Which rows count as the "previous" and "next" neighbour of a flagged outlier.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeighbourScope {
    /// Adjacent rows of the whole table, regardless of scheme.
    #[default]
    Table,
    /// Adjacent rows of the same scheme, in table order.
    Scheme,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    #[serde(rename = "outlier-cutoff")]
    pub outlier_cutoff: String,
    #[serde(rename = "iqr-multiplier")]
    pub iqr_multiplier: f64,
    #[serde(rename = "neighbour-scope")]
    pub neighbour_scope: NeighbourScope,
    #[serde(rename = "rolling-window")]
    pub rolling_window: usize,
    #[serde(rename = "date-formats")]
    pub date_formats: Vec<String>,
    pub renames: BTreeMap<String, String>,
}

const DEFAULT_DATA: &str = r#"
outlier-cutoff: "2016-01-01"
iqr-multiplier: 1.5
neighbour-scope: table
rolling-window: 7
date-formats:
  - "%d-%m-%Y"
renames:
  SalePriceperUnit: SalePricePerUnit
"#;

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            outlier_cutoff: "2016-01-01".to_string(),
            iqr_multiplier: 1.5,
            neighbour_scope: NeighbourScope::Table,
            rolling_window: 7,
            date_formats: vec!["%d-%m-%Y".to_string()],
            renames: BTreeMap::from([(
                "SalePriceperUnit".to_string(),
                "SalePricePerUnit".to_string(),
            )]),
        }
    }
}

impl PipelineConfig {
    /// Reads the configuration from a YAML file.
    ///
    /// If the file does not exist, it creates a default configuration file.
    ///
    /// # Arguments
    ///
    /// * `filename` - Optional path to the configuration file.
    ///
    /// # Returns
    ///
    /// A `Result` containing the validated `PipelineConfig` on success.
    #[instrument(level = "info", skip(filename))]
    pub fn read_config<P: AsRef<Path>>(filename: Option<P>) -> Result<Self, FundError> {
        let path = filename
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| Path::new("fundscope.yml").to_path_buf());

        info!(path = %path.display(), "Reading configuration");

        if !path.exists() {
            info!(
                "Config file does not exist. Creating default config at {}",
                path.display()
            );
            let mut file = File::create(&path)?;
            file.write_all(DEFAULT_DATA.as_bytes())?;
            debug!("Default configuration file created");
            return Ok(PipelineConfig::default());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let config: Self = from_reader(reader)?;
        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Checks the invariants the pipeline stages rely on.
    pub fn validate(&self) -> Result<(), FundError> {
        if self.rolling_window == 0 {
            return Err(FundError::ConfigError(
                "rolling-window must be at least 1".to_string(),
            ));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(FundError::ConfigError(format!(
                "iqr-multiplier must be a non-negative number, got {}",
                self.iqr_multiplier
            )));
        }
        if self.date_formats.is_empty() {
            return Err(FundError::ConfigError(
                "date-formats must name at least one format".to_string(),
            ));
        }
        self.cutoff()?;
        Ok(())
    }

    /// Converts the outlier cutoff to a `NaiveDate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is not in `YYYY-MM-DD` form.
    pub fn cutoff(&self) -> Result<NaiveDate, FundError> {
        let date = NaiveDate::parse_from_str(&self.outlier_cutoff, "%Y-%m-%d")?;
        Ok(date)
    }
}
