use chrono::NaiveDate;
use revenue_forecast::data::{DataLoader, RevenueSeries};
use revenue_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Helper function to create a simple revenue CSV
fn create_sample_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(file, "date,revenue").unwrap();
    writeln!(file, "2023-01-01,100000.0").unwrap();
    writeln!(file, "2023-02-01,103000.0").unwrap();
    writeln!(file, "2023-03-01,101500.0").unwrap();
    writeln!(file, "2023-04-01,104200.0").unwrap();

    file
}

#[test]
fn test_loader_from_csv() {
    let file = create_sample_csv();
    let frame = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(frame.len(), 4);
    assert!(!frame.is_empty());
    assert_eq!(frame.date_column(), "date");
    assert_eq!(frame.revenue_column(), "revenue");
}

#[test]
fn test_loader_missing_file() {
    let result = DataLoader::from_csv("/nonexistent/revenue.csv");

    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_records_parse_dates_and_values() {
    let file = create_sample_csv();
    let frame = DataLoader::from_csv(file.path()).unwrap();

    let records = frame.records().unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0], (date(2023, 1, 1), 100000.0));
    assert_eq!(records[3], (date(2023, 4, 1), 104200.0));
}

#[test]
fn test_column_detection_by_name() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "month,region,amount").unwrap();
    writeln!(file, "2023-01-01,north,5000").unwrap();
    writeln!(file, "2023-02-01,north,5200").unwrap();

    let frame = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(frame.date_column(), "month");
    assert_eq!(frame.revenue_column(), "amount");
}

#[test]
fn test_revenue_fallback_to_numeric_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,sales").unwrap();
    writeln!(file, "2023-01-01,5000").unwrap();
    writeln!(file, "2023-02-01,5200").unwrap();

    let frame = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(frame.revenue_column(), "sales");
    let records = frame.records().unwrap();
    assert_eq!(records[1].1, 5200.0);
}

#[test]
fn test_no_date_column_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "region,amount").unwrap();
    writeln!(file, "north,5000").unwrap();

    let result = DataLoader::from_csv(file.path());

    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_from_records_roundtrip() {
    let dates = vec![date(2023, 1, 1), date(2023, 2, 1)];
    let frame = DataLoader::from_records(dates.clone(), vec![100.0, 110.0]).unwrap();

    let records = frame.records().unwrap();

    assert_eq!(records[0].0, dates[0]);
    assert_eq!(records[1], (dates[1], 110.0));
}

#[test]
fn test_from_records_length_mismatch() {
    let result = DataLoader::from_records(vec![date(2023, 1, 1)], vec![1.0, 2.0]);

    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_null_revenue_becomes_nan() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,revenue").unwrap();
    writeln!(file, "2023-01-01,100.0").unwrap();
    writeln!(file, "2023-02-01,").unwrap();
    writeln!(file, "2023-03-01,120.0").unwrap();

    let frame = DataLoader::from_csv(file.path()).unwrap();
    let records = frame.records().unwrap();

    assert_eq!(records.len(), 3);
    assert!(records[1].1.is_nan());
}

#[test]
fn test_resample_from_unordered_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,revenue").unwrap();
    writeln!(file, "2023-03-10,120.0").unwrap();
    writeln!(file, "2023-01-05,100.0").unwrap();
    writeln!(file, "2023-02-28,110.0").unwrap();

    let frame = DataLoader::from_csv(file.path()).unwrap();
    let series = RevenueSeries::resample_monthly(&frame.records().unwrap()).unwrap();

    assert_eq!(
        series.dates(),
        &[date(2023, 1, 1), date(2023, 2, 1), date(2023, 3, 1)]
    );
    assert_eq!(series.values(), &[100.0, 110.0, 120.0]);
}
