// Entry point and menu-driven dashboard.
//
// - Option [1] loads the CSV and prints the region/country counts.
// - Option [2] normalizes the data and prints every regional view,
//   exporting each one to the output directory.
// - Option [3] predicts GDP per capita from typed-in features.
use clap::Parser;
use gdp_dashboard::config::Settings;
use gdp_dashboard::loader::{self, NormalizeReport};
use gdp_dashboard::model::{self, LinearModel, Predictor};
use gdp_dashboard::reports::{self, DEFAULT_TOP_N};
use gdp_dashboard::types::{CategoryCounts, Dataset, RegionValue};
use gdp_dashboard::util::{format_int, format_number};
use gdp_dashboard::{init_logging, output, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

// The raw upload is kept between menu choices so the dashboard can be
// rebuilt without re-reading the file.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<(Dataset, CategoryCounts)>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(settings: &Settings) {
    let loaded = loader::load_csv(&settings.data)
        .and_then(|(data, report)| loader::count_categories(&data).map(|counts| (data, report, counts)));
    match loaded {
        Ok((data, load_report, counts)) => {
            println!(
                "File uploaded successfully! ({} rows, {} columns, {} numeric)",
                format_int(load_report.total_rows),
                format_int(load_report.total_columns),
                format_int(load_report.numeric_columns)
            );
            println!("Total Regions: {}", counts.regions);
            println!("Total Countries: {}", counts.countries);
            println!("Countries per Region:\n");
            output::preview_table_rows(&counts.per_region, counts.per_region.len());
            state().data = Some((data, counts));
        }
        Err(e) => eprintln!("Failed to load file: {}\n", e),
    }
}

fn print_region_values(title: &str, values: &BTreeMap<String, f64>) {
    println!("{}\n", title);
    let rows = RegionValue::rows(values);
    output::preview_table_rows(&rows, rows.len());
}

fn show_dashboard(settings: &Settings, data: Dataset, counts: &CategoryCounts) -> Result<()> {
    let (data, normalized): (Dataset, NormalizeReport) = loader::normalize(data, &settings.normalize_options())?;
    let out = &settings.out_dir;
    let preview = settings.preview_rows;

    println!("Data Overview\n");
    let (headers, head) = output::dataset_head(&data, settings.overview_rows);
    output::preview_records(&headers, &head, settings.overview_rows);

    let medians = reports::regional_medians(&data)?;
    output::write_csv(out.join("regional_medians.csv"), &medians)?;
    println!("Median GDP, Literacy & Agriculture by Region\n");
    output::preview_table_rows(&medians, medians.len());

    let aggregate = reports::regional_aggregate(&data)?;
    let records = output::aggregate_records(&aggregate);
    output::write_records(out.join("regional_aggregate.csv"), &aggregate.columns, &records)?;
    println!("Data Aggregation by Region\n");
    output::preview_records(&aggregate.columns, &records, preview);

    let top20 = reports::top20_by_gdp(&data)?;
    output::write_csv(out.join("top20_gdp.csv"), &top20)?;
    println!("Top 20 Countries by GDP Per Capita\n");
    output::preview_table_rows(&top20, top20.len());

    print_region_values("Literacy by Region (mean %)", &reports::literacy_by_region(&data)?);
    print_region_values(
        "Infant Mortality Rate by Region (per 1000 births)",
        &reports::infant_mortality_by_region(&data)?,
    );
    print_region_values("Population by Region", &reports::population_by_region(&data)?);
    print_region_values("Mean GDP per Capita by Region", &reports::mean_gdp_by_region(&data)?);

    let matrix = reports::correlation_matrix(&data);
    let (corr_headers, corr_rows) = output::correlation_records(&matrix);
    output::write_records(out.join("correlation.csv"), &corr_headers, &corr_rows)?;
    println!("Correlation of Numerical Features ({} columns)\n", matrix.columns.len());
    output::preview_records(&corr_headers, &corr_rows, preview);

    let literate = reports::filter_top_by_literacy(&data, &settings.focus_region, DEFAULT_TOP_N)?;
    println!("Top {} Countries by Literacy in {}\n", DEFAULT_TOP_N, settings.focus_region);
    output::preview_table_rows(&literate, literate.len());

    println!("Top {} Countries per Region by GDP\n", DEFAULT_TOP_N);
    for (region, rows) in reports::top_n_by_gdp_per_region(&data, DEFAULT_TOP_N)? {
        println!("{} Region", region);
        output::preview_table_rows(&rows, rows.len());
    }

    let summary = reports::generate_summary(&data, counts, &normalized)?;
    output::write_json(out.join("summary.json"), &summary)?;
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_countries\": {}, \"imputed_cells\": {}, \"mean_gdp_per_capita\": {}}}\n",
        summary.total_countries,
        summary.imputed_cells,
        format_number(summary.mean_gdp_per_capita, 2)
    );
    Ok(())
}

fn handle_dashboard(settings: &Settings) {
    let loaded = state().data.clone();
    let Some((data, counts)) = loaded else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    if let Err(e) = show_dashboard(settings, data, &counts) {
        eprintln!("Error generating dashboard: {}\n", e);
    }
}

fn handle_predict(settings: &Settings) {
    let input = prompt("Enter Input Features (comma-separated): ");
    let prediction = model::parse_features(&input)
        .and_then(|features| LinearModel::load(&settings.model)?.predict(&features));
    match prediction {
        Ok(gdp) => println!("Predicted GDP Per Capita: ${}\n", format_number(gdp, 2)),
        Err(e) => eprintln!("{}\n", e),
    }
}

fn main() {
    init_logging();
    let settings = Settings::parse();
    loop {
        println!("Global GDP Analysis & Prediction");
        println!("[1] Load the file");
        println!("[2] Show Analysis Dashboard");
        println!("[3] Predict GDP\n");
        let choice = prompt("Enter choice: ");
        match choice.as_str() {
            "1" => handle_load(&settings),
            "2" | "3" => {
                println!();
                if choice == "2" {
                    handle_dashboard(&settings);
                } else {
                    handle_predict(&settings);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}
