use crate::loader::{DegeneratePolicy, NormalizeOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Regional GDP analysis and prediction in the terminal")]
pub struct Settings {
    /// Country indicators CSV to analyse.
    #[arg(long, default_value = "countries of the world.csv")]
    pub data: PathBuf,
    /// Exported regression model (JSON with `intercept` and `coefficients`).
    #[arg(long, default_value = "gdp_model.json")]
    pub model: PathBuf,
    /// What to do when a region has no values to impute a column from.
    #[arg(long, value_enum, default_value_t = DegeneratePolicy::Skip)]
    pub fill_policy: DegeneratePolicy,
    /// Directory the report CSVs and summary.json are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Rows shown in each console preview.
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,
    /// Rows of the normalized table shown in the data overview.
    #[arg(long, default_value_t = 10)]
    pub overview_rows: usize,
    /// Region used for the top-literacy view.
    #[arg(long, default_value = "ASIA (EX. NEAR EAST)")]
    pub focus_region: String,
}

impl Settings {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions { degenerate: self.fill_policy }
    }
}
