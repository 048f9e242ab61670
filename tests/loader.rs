mod common;

use common::{assert_close, normalized_countries, raw_countries, TestWorkspace, COUNTRIES_CSV};
use gdp_dashboard::loader::{count_categories, load_csv, normalize, read_csv, NormalizeOptions};
use gdp_dashboard::types::{AGRICULTURE, CLIMATE, COUNTRY, GDP, LITERACY, REGION};
use gdp_dashboard::util::median;
use gdp_dashboard::DashboardError;

#[test]
fn load_csv_reads_file_from_disk() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("countries.csv", COUNTRIES_CSV);
    let (dataset, report) = load_csv(&path).expect("load");
    assert_eq!(dataset.row_count(), 7);
    assert_eq!(report.total_columns, 20);
    // Country, Region and the comma-formatted density column stay textual.
    assert_eq!(report.text_columns, 3);
    assert_eq!(report.numeric_columns, 17);
}

#[test]
fn load_csv_missing_file_is_io_error() {
    let workspace = TestWorkspace::new();
    let err = load_csv(workspace.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, DashboardError::Io(_)));
}

#[test]
fn counts_regions_countries_and_rows_per_region() {
    let counts = count_categories(&raw_countries()).expect("counts");
    assert_eq!(counts.regions, 3);
    assert_eq!(counts.countries, 7);
    let per_region: Vec<(&str, usize)> = counts
        .per_region
        .iter()
        .map(|r| (r.region.as_str(), r.countries))
        .collect();
    assert_eq!(per_region, vec![("ASIA", 3), ("EUROPE", 3), ("AFRICA", 1)]);
}

#[test]
fn count_categories_requires_region_column() {
    let (dataset, _) = read_csv("Country,GDP ($ per capita)\nX,1\n".as_bytes()).unwrap();
    let err = count_categories(&dataset).unwrap_err();
    assert!(matches!(err, DashboardError::ColumnNotFound(c) if c == REGION));
}

#[test]
fn normalization_leaves_no_missing_cells() {
    let dataset = normalized_countries();
    for column in dataset.columns() {
        assert_eq!(column.data.missing_count(), 0, "column {:?}", column.name);
    }
}

#[test]
fn median_imputation_uses_the_rows_region() {
    let raw = raw_countries();
    let dataset = normalized_countries();
    let regions = raw.texts(REGION).unwrap();

    for name in [GDP, LITERACY, AGRICULTURE] {
        let before = raw.numbers(name).unwrap();
        let after = dataset.numbers(name).unwrap();
        for (row, cell) in before.iter().enumerate() {
            if cell.is_some() {
                assert_eq!(after[row], *cell);
                continue;
            }
            let expected = median(
                before
                    .iter()
                    .zip(regions)
                    .filter(|(_, r)| *r == &regions[row])
                    .filter_map(|(v, _)| *v)
                    .collect(),
            )
            .unwrap();
            assert_close(after[row].unwrap(), expected);
        }
    }

    assert_eq!(dataset.numbers(GDP).unwrap()[2], Some(1350.0));
    assert_eq!(dataset.numbers(LITERACY).unwrap()[1], Some(63.0));
    assert_eq!(dataset.numbers(LITERACY).unwrap()[5], Some(98.5));
}

#[test]
fn climate_mode_tie_takes_larger_value() {
    // Beta sits in ASIA where the climates seen are 1 and 2 once each.
    let dataset = normalized_countries();
    assert_eq!(dataset.numbers(CLIMATE).unwrap()[1], Some(2.0));

    let csv = "Country,Region,Climate\nA,R,1\nB,R,1\nC,R,2\nD,R,2\nE,R,\n";
    let (raw, _) = read_csv(csv.as_bytes()).unwrap();
    let (dataset, report) = normalize(raw, &NormalizeOptions::default()).unwrap();
    assert_eq!(dataset.numbers(CLIMATE).unwrap()[4], Some(2.0));
    assert_eq!(report.imputed_cells, 1);
}

#[test]
fn comma_separated_numbers_are_coerced() {
    let dataset = normalized_countries();
    let density = dataset.numbers("Pop. Density (per sq. mi.)").unwrap();
    assert_eq!(density[0], Some(1200.5));
}

#[test]
fn region_and_country_labels_are_trimmed() {
    let dataset = raw_countries();
    let regions = dataset.texts(REGION).unwrap();
    assert!(regions.iter().flatten().all(|r| r == r.trim()));
    assert_eq!(dataset.texts(COUNTRY).unwrap()[0].as_deref(), Some("Alpha"));
}

#[test]
fn normalize_twice_changes_nothing() {
    let once = normalized_countries();
    let (twice, report) = normalize(once.clone(), &NormalizeOptions::default()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(report.coerced_columns, 0);
    assert_eq!(report.imputed_cells, 0);
}

#[test]
fn integer_preserving_text_column_is_not_coerced() {
    let csv = "Country,Region,Population\nX,A,\"1,000\"\nY,A,2000\n";
    let (raw, _) = read_csv(csv.as_bytes()).unwrap();
    let (dataset, report) = normalize(raw, &NormalizeOptions::default()).unwrap();
    assert_eq!(report.coerced_columns, 0);
    assert!(!dataset.column("Population").unwrap().data.is_numeric());
}

#[test]
fn scenario_from_three_rows() {
    let csv = "Region,Country,GDP ($ per capita)\nA,X,10\nA,Y,\nB,Z,30\n";
    let (raw, _) = read_csv(csv.as_bytes()).unwrap();
    let (dataset, _) = normalize(raw, &NormalizeOptions::default()).unwrap();
    assert_eq!(
        dataset.numbers(GDP).unwrap(),
        &[Some(10.0), Some(10.0), Some(30.0)]
    );
}
