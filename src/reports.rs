use crate::error::Result;
use crate::loader::NormalizeReport;
use crate::types::{
    aggregated_columns, AggValue, AggregateRow, AggregateTable, CategoryCounts, ColumnData,
    CorrelationMatrix, Dataset, RankedCountry, RegionMedianRow, Reducer, SummaryStats, AGRICULTURE,
    COUNTRY, GDP, INFANT_MORTALITY, LITERACY, POPULATION, REGION,
};
use crate::util::{average, display_cell, median, pearson, round_to};
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const TOP_GDP_COUNT: usize = 20;
pub const DEFAULT_TOP_N: usize = 5;

/// Collapse the cells of `column` at `rows` with one reducer.
///
/// Numeric reducers skip missing cells: a sum over nothing is 0 and a mean
/// over nothing is NaN. `JoinStrings` keeps every row, in row order.
pub fn reduce(dataset: &Dataset, column: &str, rows: &[usize], reducer: Reducer) -> Result<AggValue> {
    match reducer {
        Reducer::Sum => {
            let values = dataset.numbers(column)?;
            Ok(AggValue::Number(rows.iter().filter_map(|&r| values[r]).sum()))
        }
        Reducer::Mean => {
            let values = dataset.numbers(column)?;
            let present: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
            Ok(AggValue::Number(average(&present)))
        }
        Reducer::JoinStrings => {
            let parts: Vec<String> = match &dataset.column(column)?.data {
                ColumnData::Text(cells) => rows
                    .iter()
                    .map(|&r| cells[r].clone().unwrap_or_else(|| "nan".to_string()))
                    .collect(),
                ColumnData::Number(cells) => rows.iter().map(|&r| display_cell(cells[r])).collect(),
            };
            Ok(AggValue::Text(parts.join(", ")))
        }
    }
}

/// One reduced value of `column` per region.
pub fn group_reduce(dataset: &Dataset, column: &str, reducer: Reducer) -> Result<BTreeMap<String, AggValue>> {
    // Fail on a missing column even when there are no rows to reduce.
    dataset.column(column)?;
    let mut out = BTreeMap::new();
    for (region, rows) in dataset.group_by_region()? {
        let value = reduce(dataset, column, &rows, reducer)?;
        out.insert(region, value);
    }
    Ok(out)
}

fn numeric_by_region(dataset: &Dataset, column: &str, reducer: Reducer) -> Result<BTreeMap<String, f64>> {
    Ok(group_reduce(dataset, column, reducer)?
        .into_iter()
        .map(|(region, value)| (region, value.as_number().unwrap_or(f64::NAN)))
        .collect())
}

pub fn group_mean(dataset: &Dataset, column: &str) -> Result<BTreeMap<String, f64>> {
    numeric_by_region(dataset, column, Reducer::Mean)
}

pub fn group_sum(dataset: &Dataset, column: &str) -> Result<BTreeMap<String, f64>> {
    numeric_by_region(dataset, column, Reducer::Sum)
}

fn rounded(map: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    map.into_iter().map(|(k, v)| (k, round_to(v, 2))).collect()
}

pub fn literacy_by_region(dataset: &Dataset) -> Result<BTreeMap<String, f64>> {
    Ok(rounded(group_mean(dataset, LITERACY)?))
}

pub fn infant_mortality_by_region(dataset: &Dataset) -> Result<BTreeMap<String, f64>> {
    Ok(rounded(group_mean(dataset, INFANT_MORTALITY)?))
}

pub fn population_by_region(dataset: &Dataset) -> Result<BTreeMap<String, f64>> {
    group_sum(dataset, POPULATION)
}

pub fn mean_gdp_by_region(dataset: &Dataset) -> Result<BTreeMap<String, f64>> {
    group_mean(dataset, GDP)
}

/// Median GDP per capita, literacy and agriculture for every region.
pub fn regional_medians(dataset: &Dataset) -> Result<Vec<RegionMedianRow>> {
    let gdp = dataset.numbers(GDP)?;
    let literacy = dataset.numbers(LITERACY)?;
    let agriculture = dataset.numbers(AGRICULTURE)?;
    let med = |values: &[Option<f64>], rows: &[usize]| {
        median(rows.iter().filter_map(|&r| values[r]).collect()).unwrap_or(f64::NAN)
    };

    let rows = dataset
        .group_by_region()?
        .into_iter()
        .map(|(region, rows)| RegionMedianRow {
            gdp_per_capita: med(gdp, &rows),
            literacy: med(literacy, &rows),
            agriculture: med(agriculture, &rows),
            region,
        })
        .collect();
    Ok(rows)
}

/// Every column of the rule table reduced per region, `Region` first.
pub fn regional_aggregate(dataset: &Dataset) -> Result<AggregateTable> {
    for (name, _) in aggregated_columns() {
        dataset.column(name)?;
    }
    let mut columns = vec![REGION.to_string()];
    columns.extend(aggregated_columns().map(|(name, _)| name.to_string()));

    let mut rows = Vec::new();
    for (region, members) in dataset.group_by_region()? {
        let values = aggregated_columns()
            .map(|(name, reducer)| reduce(dataset, name, &members, reducer))
            .collect::<Result<Vec<_>>>()?;
        rows.push(AggregateRow { region, values });
    }
    debug!("Aggregated {} regions over {} columns", rows.len(), columns.len() - 1);
    Ok(AggregateTable { columns, rows })
}

/// Descending by value with missing values last; ties keep row order.
fn cmp_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn ranked(
    dataset: &Dataset,
    mut rows: Vec<usize>,
    key: &[Option<f64>],
    n: usize,
    drop_missing: bool,
) -> Result<Vec<RankedCountry>> {
    let countries = dataset.texts(COUNTRY)?;
    let regions = dataset.texts(REGION)?;
    let gdp = dataset.numbers(GDP).ok();
    let literacy = dataset.numbers(LITERACY).ok();

    if drop_missing {
        rows.retain(|&r| key[r].is_some());
    }
    // `sort_by` is stable, so equal keys stay in their original order.
    rows.sort_by(|&a, &b| cmp_desc(key[a], key[b]));

    Ok(rows
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, r)| RankedCountry {
            rank: idx + 1,
            country: countries[r].clone().unwrap_or_default(),
            region: regions[r].clone().unwrap_or_default(),
            gdp_per_capita: gdp.and_then(|v| v[r]),
            literacy: literacy.and_then(|v| v[r]),
        })
        .collect())
}

/// The twenty richest countries by GDP per capita.
pub fn top20_by_gdp(dataset: &Dataset) -> Result<Vec<RankedCountry>> {
    let key = dataset.numbers(GDP)?;
    let rows = (0..dataset.row_count()).collect();
    ranked(dataset, rows, key, TOP_GDP_COUNT, false)
}

/// The `n` richest countries inside each region.
pub fn top_n_by_gdp_per_region(dataset: &Dataset, n: usize) -> Result<BTreeMap<String, Vec<RankedCountry>>> {
    let key = dataset.numbers(GDP)?;
    let mut out = BTreeMap::new();
    for (region, rows) in dataset.group_by_region()? {
        let top = ranked(dataset, rows, key, n, true)?;
        out.insert(region, top);
    }
    Ok(out)
}

/// The `n` most literate countries of one region. Region labels are compared
/// with surrounding whitespace removed on both sides.
pub fn filter_top_by_literacy(dataset: &Dataset, region_label: &str, n: usize) -> Result<Vec<RankedCountry>> {
    let key = dataset.numbers(LITERACY)?;
    let label = region_label.trim();
    let rows: Vec<usize> = dataset
        .texts(REGION)?
        .iter()
        .enumerate()
        .filter(|(_, region)| region.as_deref().map(str::trim) == Some(label))
        .map(|(r, _)| r)
        .collect();
    ranked(dataset, rows, key, n, true)
}

/// Pearson coefficients between every pair of numeric columns.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let numeric: Vec<(&str, &[Option<f64>])> = dataset
        .columns()
        .iter()
        .filter_map(|c| match &c.data {
            ColumnData::Number(values) => Some((c.name.as_str(), values.as_slice())),
            ColumnData::Text(_) => None,
        })
        .collect();

    let values: Vec<Vec<f64>> = numeric
        .iter()
        .enumerate()
        .map(|(i, (_, xs))| {
            numeric
                .iter()
                .enumerate()
                .map(|(j, (_, ys))| {
                    let r = pearson(xs, ys);
                    if i == j && !r.is_nan() {
                        1.0
                    } else {
                        r
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}

pub fn generate_summary(dataset: &Dataset, counts: &CategoryCounts, normalized: &NormalizeReport) -> Result<SummaryStats> {
    let gdp = dataset.numbers(GDP)?;
    let present: Vec<f64> = gdp.iter().flatten().copied().collect();
    let max_gdp_country = top20_by_gdp(dataset)?
        .into_iter()
        .find(|row| row.gdp_per_capita.is_some())
        .map(|row| row.country);
    Ok(SummaryStats {
        total_rows: dataset.row_count(),
        total_regions: counts.regions,
        total_countries: counts.countries,
        coerced_columns: normalized.coerced_columns,
        imputed_cells: normalized.imputed_cells,
        unfilled_cells: normalized.unfilled_cells,
        max_gdp_country,
        mean_gdp_per_capita: average(&present),
    })
}
