use crate::error::Result;
use crate::types::{AggValue, AggregateTable, CorrelationMatrix, Dataset};
use crate::util::format_number;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Header row plus string records, for tables whose columns are only known
/// at runtime.
pub fn write_records<P: AsRef<Path>>(path: P, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(headers)?;
    for r in rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn preview_records(headers: &[String], rows: &[Vec<String>], max_rows: usize) {
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(headers.to_vec());
    for r in rows.iter().take(max_rows) {
        builder.push_record(r.clone());
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// First `n` rows of the dataset as display strings.
pub fn dataset_head(dataset: &Dataset, n: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = dataset.column_names().iter().map(|s| s.to_string()).collect();
    let rows = (0..dataset.row_count().min(n))
        .map(|r| dataset.columns().iter().map(|c| c.data.cell(r)).collect())
        .collect();
    (headers, rows)
}

pub fn aggregate_records(table: &AggregateTable) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.region.clone()];
            cells.extend(row.values.iter().map(|v| match v {
                AggValue::Number(x) => format_number(*x, 2),
                AggValue::Text(s) => s.clone(),
            }));
            cells
        })
        .collect()
}

/// Correlation matrix with a leading column naming each row.
pub fn correlation_records(matrix: &CorrelationMatrix) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec![String::new()];
    headers.extend(matrix.columns.iter().cloned());
    let rows = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(name, values)| {
            let mut cells = vec![name.clone()];
            cells.extend(values.iter().map(|v| format_number(*v, 2)));
            cells
        })
        .collect();
    (headers, rows)
}
