use crate::error::{DashboardError, Result};
use crate::util::{format_f64, format_opt};
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

pub const REGION: &str = "Region";
pub const COUNTRY: &str = "Country";
pub const POPULATION: &str = "Population";
pub const AREA: &str = "Area (sq. mi.)";
pub const GDP: &str = "GDP ($ per capita)";
pub const LITERACY: &str = "Literacy (%)";
pub const AGRICULTURE: &str = "Agriculture";
pub const CLIMATE: &str = "Climate";
pub const INFANT_MORTALITY: &str = "Infant mortality (per 1000 births)";

/// How a column is treated by normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `Region`, `Country`: kept as text, never coerced or imputed.
    Identifier,
    /// Kept as loaded (no string-to-float pass), median-imputed.
    IntegerPreserve,
    /// Coerced, then filled with the per-region max-mode.
    Categorical,
    /// Coerced, then filled with the per-region median.
    Numeric,
}

impl ColumnKind {
    /// Columns missing from the rule table are plain numeric indicators.
    pub fn of(name: &str) -> Self {
        COLUMN_RULES
            .iter()
            .find(|rule| rule.name == name)
            .map(|rule| rule.kind)
            .unwrap_or(ColumnKind::Numeric)
    }

    pub fn is_coerced(self) -> bool {
        matches!(self, ColumnKind::Categorical | ColumnKind::Numeric)
    }
}

/// Per-region reducer used by the regional aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Mean,
    JoinStrings,
}

pub struct ColumnRule {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// `None` for the group key, which is never reduced.
    pub reducer: Option<Reducer>,
}

const fn rule(name: &'static str, kind: ColumnKind, reducer: Reducer) -> ColumnRule {
    ColumnRule { name, kind, reducer: Some(reducer) }
}

/// Column policy table, in the order the regional aggregate reports them.
pub const COLUMN_RULES: &[ColumnRule] = &[
    ColumnRule { name: REGION, kind: ColumnKind::Identifier, reducer: None },
    rule(COUNTRY, ColumnKind::Identifier, Reducer::JoinStrings),
    rule(POPULATION, ColumnKind::IntegerPreserve, Reducer::Sum),
    rule(AREA, ColumnKind::IntegerPreserve, Reducer::Sum),
    rule("Pop. Density (per sq. mi.)", ColumnKind::Numeric, Reducer::Mean),
    rule("Coastline (coast/area ratio)", ColumnKind::Numeric, Reducer::Mean),
    rule("Net migration", ColumnKind::Numeric, Reducer::Mean),
    rule(INFANT_MORTALITY, ColumnKind::Numeric, Reducer::Mean),
    rule(GDP, ColumnKind::Numeric, Reducer::Mean),
    rule(LITERACY, ColumnKind::Numeric, Reducer::Mean),
    rule("Phones (per 1000)", ColumnKind::Numeric, Reducer::Mean),
    rule("Arable (%)", ColumnKind::Numeric, Reducer::Mean),
    rule("Crops (%)", ColumnKind::Numeric, Reducer::Mean),
    rule("Other (%)", ColumnKind::Numeric, Reducer::Mean),
    rule(CLIMATE, ColumnKind::Categorical, Reducer::JoinStrings),
    rule("Birthrate", ColumnKind::Numeric, Reducer::Mean),
    rule("Deathrate", ColumnKind::Numeric, Reducer::Mean),
    rule(AGRICULTURE, ColumnKind::Numeric, Reducer::Mean),
    rule("Industry", ColumnKind::Numeric, Reducer::Mean),
    rule("Service", ColumnKind::Numeric, Reducer::Mean),
];

/// Rules of the columns the regional aggregate reduces, with their reducer.
pub fn aggregated_columns() -> impl Iterator<Item = (&'static str, Reducer)> {
    COLUMN_RULES
        .iter()
        .filter_map(|rule| rule.reducer.map(|reducer| (rule.name, reducer)))
}

pub fn is_identifier(name: &str) -> bool {
    ColumnKind::of(name) == ColumnKind::Identifier
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Number(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Number(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Number(_))
    }

    /// Cell rendered for display; missing cells are empty.
    pub fn cell(&self, row: usize) -> String {
        match self {
            ColumnData::Text(v) => v.get(row).cloned().flatten().unwrap_or_default(),
            ColumnData::Number(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(|x| x.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn text(name: &str, values: Vec<Option<String>>) -> Self {
        Column { name: name.to_string(), data: ColumnData::Text(values) }
    }

    pub fn number(name: &str, values: Vec<Option<f64>>) -> Self {
        Column { name: name.to_string(), data: ColumnData::Number(values) }
    }
}

fn check_rows(column: &Column, expected: usize) -> Result<()> {
    let got = column.data.len();
    if got != expected {
        return Err(DashboardError::RaggedColumn {
            column: column.name.clone(),
            expected,
            got,
        });
    }
    Ok(())
}

/// Rectangular, column-major table with one row per country.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build a table from columns of equal length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        for column in &columns {
            check_rows(column, rows)?;
        }
        Ok(Dataset { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DashboardError::ColumnNotFound(name.to_string()))
    }

    pub fn texts(&self, name: &str) -> Result<&[Option<String>]> {
        match &self.column(name)?.data {
            ColumnData::Text(v) => Ok(v),
            ColumnData::Number(_) => Err(DashboardError::NotText(name.to_string())),
        }
    }

    pub fn numbers(&self, name: &str) -> Result<&[Option<f64>]> {
        match &self.column(name)?.data {
            ColumnData::Number(v) => Ok(v),
            ColumnData::Text(_) => Err(DashboardError::NotNumeric(name.to_string())),
        }
    }

    /// Swap in a new version of an existing column.
    pub fn replace_column(&mut self, column: Column) -> Result<()> {
        check_rows(&column, self.rows)?;
        let slot = self
            .columns
            .iter_mut()
            .find(|c| c.name == column.name)
            .ok_or_else(|| DashboardError::ColumnNotFound(column.name.clone()))?;
        *slot = column;
        Ok(())
    }

    /// Row indices per region label, regions in ascending order and rows in
    /// their original order. Rows without a region are left out.
    pub fn group_by_region(&self) -> Result<BTreeMap<String, Vec<usize>>> {
        let regions = self.texts(REGION)?;
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row, region) in regions.iter().enumerate() {
            if let Some(region) = region {
                groups.entry(region.clone()).or_default().push(row);
            }
        }
        Ok(groups)
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionCount {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Countries")]
    #[tabled(rename = "Countries")]
    pub countries: usize,
}

/// Output of `count_categories`.
#[derive(Debug, Clone)]
pub struct CategoryCounts {
    pub regions: usize,
    pub countries: usize,
    /// Rows per region, most frequent first; ties keep first-seen order.
    pub per_region: Vec<RegionCount>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionMedianRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "GDP ($ per capita)")]
    #[tabled(rename = "GDP ($ per capita)", display_with = "format_f64")]
    pub gdp_per_capita: f64,
    #[serde(rename = "Literacy (%)")]
    #[tabled(rename = "Literacy (%)", display_with = "format_f64")]
    pub literacy: f64,
    #[serde(rename = "Agriculture")]
    #[tabled(rename = "Agriculture", display_with = "format_f64")]
    pub agriculture: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RankedCountry {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "GDP ($ per capita)")]
    #[tabled(rename = "GDP ($ per capita)", display_with = "format_opt")]
    pub gdp_per_capita: Option<f64>,
    #[serde(rename = "Literacy (%)")]
    #[tabled(rename = "Literacy (%)", display_with = "format_opt")]
    pub literacy: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionValue {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value", display_with = "format_f64")]
    pub value: f64,
}

impl RegionValue {
    pub fn rows(map: &BTreeMap<String, f64>) -> Vec<RegionValue> {
        map.iter()
            .map(|(region, value)| RegionValue { region: region.clone(), value: *value })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggValue {
    Number(f64),
    Text(String),
}

impl AggValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AggValue::Number(v) => Some(*v),
            AggValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AggValue::Text(s) => Some(s),
            AggValue::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregateRow {
    pub region: String,
    pub values: Vec<AggValue>,
}

/// Regional aggregate with `Region` as an ordinary leading column.
#[derive(Debug, Clone)]
pub struct AggregateTable {
    /// `Region` followed by one header per aggregated column.
    pub columns: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn value(&self, region: &str, column: &str) -> Option<&AggValue> {
        let idx = self.columns.iter().skip(1).position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.region == region)
            .and_then(|r| r.values.get(idx))
    }
}

/// Square matrix of pairwise Pearson coefficients.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_rows: usize,
    pub total_regions: usize,
    pub total_countries: usize,
    pub coerced_columns: usize,
    pub imputed_cells: usize,
    pub unfilled_cells: usize,
    pub max_gdp_country: Option<String>,
    pub mean_gdp_per_capita: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(n: usize) -> Column {
        Column::text(REGION, (0..n).map(|_| Some("A".to_string())).collect())
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = Dataset::new(vec![
            regions(3),
            Column::number("Birthrate", vec![Some(1.0), Some(2.0)]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::RaggedColumn { ref column, expected: 3, got: 2 } if column == "Birthrate"
        ));
    }

    #[test]
    fn replace_column_keeps_row_count() {
        let mut ds = Dataset::new(vec![
            regions(3),
            Column::number("Birthrate", vec![Some(1.0), None, Some(3.0)]),
        ])
        .unwrap();
        let err = ds
            .replace_column(Column::number("Birthrate", vec![Some(1.0)]))
            .unwrap_err();
        assert!(matches!(err, DashboardError::RaggedColumn { expected: 3, got: 1, .. }));
        assert_eq!(ds.numbers("Birthrate").unwrap()[1], None);

        ds.replace_column(Column::number("Birthrate", vec![Some(1.0), Some(2.0), Some(3.0)]))
            .unwrap();
        assert_eq!(ds.numbers("Birthrate").unwrap()[1], Some(2.0));
    }

    #[test]
    fn rule_table_classifies_every_column() {
        assert_eq!(ColumnKind::of(REGION), ColumnKind::Identifier);
        assert_eq!(ColumnKind::of(COUNTRY), ColumnKind::Identifier);
        assert_eq!(ColumnKind::of(POPULATION), ColumnKind::IntegerPreserve);
        assert_eq!(ColumnKind::of(CLIMATE), ColumnKind::Categorical);
        assert_eq!(ColumnKind::of("Happiness"), ColumnKind::Numeric);
        // The group key is never reduced.
        assert!(aggregated_columns().all(|(name, _)| name != REGION));
        assert_eq!(aggregated_columns().count(), COLUMN_RULES.len() - 1);
    }
}
