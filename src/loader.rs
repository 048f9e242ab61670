use crate::error::{DashboardError, Result};
use crate::types::{
    is_identifier, CategoryCounts, Column, ColumnData, ColumnKind, Dataset, RegionCount, COUNTRY,
    REGION,
};
use crate::util::{is_missing_token, max_mode, median, parse_f64_safe, parse_f64_stripped};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub text_columns: usize,
}

/// What to do when a region has no values at all for a column that needs
/// imputing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DegeneratePolicy {
    /// Leave the cells missing.
    #[default]
    Skip,
    /// Fail with `DegenerateGroup`.
    Error,
    /// Use the statistic of the whole column instead.
    Global,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub degenerate: DegeneratePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub coerced_columns: usize,
    pub imputed_cells: usize,
    pub unfilled_cells: usize,
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<(Dataset, LoadReport)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let (dataset, report) = read_csv(file)?;
    info!(
        "Loaded {} rows x {} columns from {:?}",
        report.total_rows, report.total_columns, path
    );
    Ok((dataset, report))
}

/// Parse CSV text into a `Dataset`.
///
/// Identifier columns are kept as trimmed text. Every other column is stored
/// as numbers when all of its non-missing cells already parse as plain
/// floats, and as raw text otherwise.
pub fn read_csv<R: Read>(reader: R) -> Result<(Dataset, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        for (idx, cells) in raw.iter_mut().enumerate() {
            let cell = record
                .get(idx)
                .filter(|s| !is_missing_token(s))
                .map(|s| s.to_string());
            cells.push(cell);
        }
    }

    let mut numeric_columns = 0usize;
    let columns: Vec<Column> = headers
        .iter()
        .zip(raw)
        .map(|(name, cells)| {
            if is_identifier(name) {
                let trimmed = cells
                    .into_iter()
                    .map(|c| c.map(|s| s.trim().to_string()))
                    .collect();
                return Column::text(name, trimmed);
            }
            let parsed: Option<Vec<Option<f64>>> = cells
                .iter()
                .map(|c| match c {
                    None => Some(None),
                    Some(s) => parse_f64_safe(Some(s.as_str())).map(Some),
                })
                .collect();
            match parsed {
                Some(values) => {
                    numeric_columns += 1;
                    Column::number(name, values)
                }
                None => Column::text(name, cells),
            }
        })
        .collect();

    let dataset = Dataset::new(columns)?;
    let report = LoadReport {
        total_rows: dataset.row_count(),
        total_columns: headers.len(),
        numeric_columns,
        text_columns: headers.len() - numeric_columns,
    };
    Ok((dataset, report))
}

/// Distinct regions, distinct countries, and the number of rows per region.
pub fn count_categories(dataset: &Dataset) -> Result<CategoryCounts> {
    let regions = dataset.texts(REGION)?;
    let countries = dataset.texts(COUNTRY)?;

    let distinct_countries: HashSet<&str> = countries.iter().flatten().map(|s| s.as_str()).collect();

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for region in regions.iter().flatten() {
        let e = counts.entry(region.as_str()).or_insert_with(|| {
            order.push(region.as_str());
            0
        });
        *e += 1;
    }

    let mut per_region: Vec<RegionCount> = order
        .into_iter()
        .map(|region| RegionCount {
            region: region.to_string(),
            countries: counts[region],
        })
        .collect();
    // Stable: equal counts keep first-seen order.
    per_region.sort_by(|a, b| b.countries.cmp(&a.countries));

    Ok(CategoryCounts {
        regions: per_region.len(),
        countries: distinct_countries.len(),
        per_region,
    })
}

/// Coerce text columns to numbers and fill missing cells from their region.
///
/// Coercion strips every comma before parsing and applies to all columns
/// except identifiers and integer-preserving columns. Imputation then runs
/// per column: `Climate` takes the region's max-mode, everything else the
/// region's median. Both statistics come from the values present before the
/// column is filled.
pub fn normalize(mut dataset: Dataset, options: &NormalizeOptions) -> Result<(Dataset, NormalizeReport)> {
    let mut report = NormalizeReport::default();

    let names: Vec<String> = dataset.column_names().iter().map(|s| s.to_string()).collect();
    for name in &names {
        let kind = ColumnKind::of(name);
        let column = dataset.column(name)?;
        if !kind.is_coerced() {
            continue;
        }
        if let ColumnData::Text(cells) = &column.data {
            let coerced = coerce_column(name, cells)?;
            debug!("Coerced column {:?} from text to numbers", name);
            dataset.replace_column(coerced)?;
            report.coerced_columns += 1;
        }
    }

    let regions = dataset.texts(REGION)?;
    if let Some(row) = regions.iter().position(|r| r.is_none()) {
        return Err(DashboardError::MissingRegion { row: row + 1 });
    }
    let groups = dataset.group_by_region()?;

    for name in &names {
        let kind = ColumnKind::of(name);
        if kind == ColumnKind::Identifier {
            continue;
        }
        let column = dataset.column(name)?;
        if column.data.missing_count() == 0 {
            continue;
        }
        let values = match &column.data {
            ColumnData::Number(values) => values,
            ColumnData::Text(_) => return Err(DashboardError::NotNumeric(name.clone())),
        };
        let (filled, imputed, unfilled) = impute_column(name, kind, values, &groups, options)?;
        debug!("Imputed {} cells in {:?} ({} left missing)", imputed, name, unfilled);
        report.imputed_cells += imputed;
        report.unfilled_cells += unfilled;
        dataset.replace_column(filled)?;
    }

    info!(
        "Normalized {} rows: {} columns coerced, {} cells imputed, {} left missing",
        dataset.row_count(),
        report.coerced_columns,
        report.imputed_cells,
        report.unfilled_cells
    );
    Ok((dataset, report))
}

fn coerce_column(name: &str, cells: &[Option<String>]) -> Result<Column> {
    let mut values = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        let value = match cell {
            None => None,
            Some(raw) => Some(parse_f64_stripped(raw).ok_or_else(|| DashboardError::Parse {
                column: name.to_string(),
                row: row + 1,
                value: raw.clone(),
            })?),
        };
        values.push(value);
    }
    Ok(Column::number(name, values))
}

fn group_statistic(kind: ColumnKind, present: Vec<f64>) -> Option<f64> {
    match kind {
        ColumnKind::Categorical => max_mode(&present),
        _ => median(present),
    }
}

/// Two passes: region -> fill value, then map every row through that lookup.
fn impute_column(
    name: &str,
    kind: ColumnKind,
    values: &[Option<f64>],
    groups: &BTreeMap<String, Vec<usize>>,
    options: &NormalizeOptions,
) -> Result<(Column, usize, usize)> {
    let mut global: Option<Option<f64>> = None;
    let mut fill: HashMap<&str, f64> = HashMap::new();

    for (region, rows) in groups {
        let present: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
        if present.len() == rows.len() {
            continue;
        }
        let stat = match group_statistic(kind, present) {
            Some(stat) => Some(stat),
            None => match options.degenerate {
                DegeneratePolicy::Skip => {
                    warn!("Region {:?} has no values for {:?}; leaving cells missing", region, name);
                    None
                }
                DegeneratePolicy::Error => {
                    return Err(DashboardError::DegenerateGroup {
                        column: name.to_string(),
                        region: region.clone(),
                    })
                }
                DegeneratePolicy::Global => *global.get_or_insert_with(|| {
                    group_statistic(kind, values.iter().flatten().copied().collect())
                }),
            },
        };
        if let Some(stat) = stat {
            fill.insert(region.as_str(), stat);
        }
    }

    let mut region_of_row: Vec<&str> = vec![""; values.len()];
    for (region, rows) in groups {
        for &r in rows {
            region_of_row[r] = region.as_str();
        }
    }

    let (mut imputed, mut unfilled) = (0usize, 0usize);
    let filled: Vec<Option<f64>> = values
        .iter()
        .zip(&region_of_row)
        .map(|(cell, region)| match cell {
            Some(v) => Some(*v),
            None => {
                let v = fill.get(region).copied();
                if v.is_some() {
                    imputed += 1;
                } else {
                    unfilled += 1;
                }
                v
            }
        })
        .collect();
    Ok((Column::number(name, filled), imputed, unfilled))
}
