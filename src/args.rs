use std::path::PathBuf;

use clap::Parser;

/// Clean a scraped fund valuation CSV and derive per-scheme analytics.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Raw CSV produced by the scraper
    #[arg(short, long, env = "FUNDSCOPE_INPUT", default_value = "data/data.csv")]
    pub input: PathBuf,
    /// YAML configuration; a default file is created if it does not exist
    #[arg(short, long, env = "FUNDSCOPE_CONFIG")]
    pub config: Option<PathBuf>,
    /// Where to write the analytics panel as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Where to write the run report and profit margin summary as JSON
    #[arg(short, long)]
    pub summary: Option<PathBuf>,
    /// Log the analytics of a single scheme
    #[arg(long)]
    pub scheme: Option<String>,
    /// Directory for the per-run log file
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
    /// Also print DEBUG output to the console
    #[arg(short, long)]
    pub verbose: bool,
}
