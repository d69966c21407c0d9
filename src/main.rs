use std::{error::Error, fs::File, io::BufWriter};

use clap::Parser;
use fundscope::{
    args::Args,
    config::PipelineConfig,
    logging::setup_tracing,
    metrics::{average_profit_margin, SchemeMargin},
    pipeline::{Pipeline, PipelineReport},
};
use serde::Serialize;
use tracing::{info, warn, Level};

#[derive(Debug, Serialize)]
struct Summary {
    report: PipelineReport,
    profit_margins: Vec<SchemeMargin>,
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let console_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let _guard = setup_tracing(&args.log_dir, console_level)?;

    let config = PipelineConfig::read_config(args.config.as_ref())?;
    let pipeline = Pipeline::new(config)?;
    let (panel, report) = pipeline.run_file(&args.input)?;
    info!(
        "Loaded {} rows ({} dropped), {} outliers replaced, {} duplicates removed, {} days filled",
        report.coercion.rows_read,
        report.coercion.rows_dropped(),
        report.outliers.replaced,
        report.duplicates_removed,
        report.days_inserted
    );

    if let Some(path) = &args.output {
        panel.write_csv_file(path, pipeline.date_format())?;
    }

    let profit_margins = average_profit_margin(&panel);
    for margin in &profit_margins {
        info!(
            "{:<40} average profit margin {}%",
            margin.scheme_name,
            fmt_opt(margin.average_margin)
        );
    }

    if let Some(name) = &args.scheme {
        let rows = panel.scheme(name);
        if rows.is_empty() {
            warn!("Scheme {:?} not found in panel", name);
        }
        for obs in rows {
            info!(
                "{} NAV {:.2} MA7 {} return {} volatility {} margin {}",
                obs.date_valued,
                obs.net_asset_value,
                fmt_opt(obs.metrics.nav_ma7),
                fmt_opt(obs.metrics.daily_return),
                fmt_opt(obs.metrics.volatility_7d),
                fmt_opt(obs.metrics.profit_margin)
            );
        }
    }

    if let Some(path) = &args.summary {
        let summary = Summary {
            report,
            profit_margins,
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &summary)?;
        info!("Summary written to {}", path.display());
    }
    Ok(())
}
