use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    clean::{
        outliers::{resolve_outliers, OutlierReport},
        resample::{deduplicate, fill_gaps},
    },
    config::PipelineConfig,
    data::{
        coerce::{coerce, CoercionReport},
        encoding::decode,
        panel::Panel,
        schema::normalize_headers,
        table::RawTable,
    },
    error::FundError,
    metrics::compute_metrics,
};

/// Per-stage counts of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Detected input encoding, `None` when the run did not start from bytes.
    pub encoding: Option<String>,
    pub coercion: CoercionReport,
    pub outliers: OutlierReport,
    pub duplicates_removed: usize,
    pub days_inserted: usize,
    pub schemes: usize,
    pub rows_out: usize,
}

/// The cleaning and analytics pipeline: raw CSV in, analytics panel out.
///
/// Each stage takes the previous stage's panel by reference and returns a new one.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    cutoff: NaiveDate,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, FundError> {
        config.validate()?;
        let cutoff = config.cutoff()?;
        Ok(Self { config, cutoff })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Format used when writing dates back out, the first configured one.
    pub fn date_format(&self) -> &str {
        self.config
            .date_formats
            .first()
            .map(String::as_str)
            .unwrap_or(crate::util::date_utils::DAY_FIRST_FORMAT)
    }

    #[instrument(level = "info", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<(Panel, PipelineReport), FundError> {
        let bytes = std::fs::read(path.as_ref())?;
        info!("Read {} bytes", bytes.len());
        self.run_bytes(&bytes)
    }

    /// Detects the text encoding, then runs the pipeline on the decoded text.
    pub fn run_bytes(&self, bytes: &[u8]) -> Result<(Panel, PipelineReport), FundError> {
        let decoded = decode(bytes);
        info!("Decoded input as {}", decoded.encoding);
        let (panel, mut report) = self.run_csv(&decoded.text)?;
        report.encoding = Some(decoded.encoding.to_string());
        Ok((panel, report))
    }

    pub fn run_csv(&self, text: &str) -> Result<(Panel, PipelineReport), FundError> {
        let table = RawTable::from_csv_str(text)?;
        self.run_table(table)
    }

    /// Normalizes headers and coerces types, then hands over to [`Pipeline::run_panel`].
    pub fn run_table(&self, table: RawTable) -> Result<(Panel, PipelineReport), FundError> {
        let headers = normalize_headers(table.headers(), &self.config.renames);
        let table = table.with_headers(headers);
        let (panel, coercion) = coerce(table, &self.config.date_formats)?;
        let (panel, mut report) = self.run_panel(&panel)?;
        report.coercion = coercion;
        Ok((panel, report))
    }

    /// Outlier resolution, deduplication, gap filling and metrics on a typed panel.
    pub fn run_panel(&self, panel: &Panel) -> Result<(Panel, PipelineReport), FundError> {
        let (panel, outliers) = resolve_outliers(
            panel,
            self.cutoff,
            self.config.iqr_multiplier,
            self.config.neighbour_scope,
        );
        let (panel, duplicates_removed) = deduplicate(&panel);
        let (panel, days_inserted) = fill_gaps(&panel);
        let panel = compute_metrics(&panel, self.config.rolling_window)?;

        let report = PipelineReport {
            encoding: None,
            coercion: CoercionReport::default(),
            outliers,
            duplicates_removed,
            days_inserted,
            schemes: panel.groups().count(),
            rows_out: panel.len(),
        };
        info!(
            "Pipeline finished: {} schemes, {} rows",
            report.schemes, report.rows_out
        );
        Ok((panel, report))
    }
}
