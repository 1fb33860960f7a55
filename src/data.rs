//! Tabular revenue input and the monthly series it is resampled into

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Tabular revenue data with a date column and a revenue column
#[derive(Debug, Clone)]
pub struct RevenueFrame {
    /// Data frame containing the raw records
    df: DataFrame,
    /// Name of the date column
    date_column: String,
    /// Name of the revenue column
    revenue_column: String,
}

/// Loader for tabular revenue data
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load revenue records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<RevenueFrame> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::detect_and_create_frame(df)
    }

    /// Create revenue data from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<RevenueFrame> {
        Self::detect_and_create_frame(df)
    }

    /// Create revenue data from dates and values (for testing)
    pub fn from_records(dates: Vec<NaiveDate>, revenues: Vec<f64>) -> Result<RevenueFrame> {
        if dates.len() != revenues.len() {
            return Err(ForecastError::DataError(format!(
                "Date count ({}) doesn't match revenue count ({})",
                dates.len(),
                revenues.len()
            )));
        }

        let date_series = Series::new(
            "date",
            dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect::<Vec<String>>(),
        );
        let revenue_series = Series::new("revenue", revenues);

        let df = DataFrame::new(vec![date_series, revenue_series])?;

        Ok(RevenueFrame {
            df,
            date_column: "date".to_string(),
            revenue_column: "revenue".to_string(),
        })
    }

    /// Detect date and revenue columns in a DataFrame and create a RevenueFrame
    fn detect_and_create_frame(df: DataFrame) -> Result<RevenueFrame> {
        let date_column = Self::detect_date_column(&df)?;
        let revenue_column = Self::detect_revenue_column(&df, &date_column)?;

        Ok(RevenueFrame {
            df,
            date_column,
            revenue_column,
        })
    }

    /// Detect the date column in a DataFrame
    fn detect_date_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date")
                || lower_name.contains("month")
                || lower_name.contains("time")
            {
                return Ok(name.to_string());
            }
        }

        // Fall back to the first temporal column
        if let Some(col) = df.get_columns().iter().find(|c| c.dtype().is_temporal()) {
            return Ok(col.name().to_string());
        }

        Err(ForecastError::DataError(
            "No date column found in data".to_string(),
        ))
    }

    /// Detect the revenue column in a DataFrame
    fn detect_revenue_column(df: &DataFrame, date_column: &str) -> Result<String> {
        let column_names = df.get_column_names();

        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("revenue")
                || lower_name.contains("amount")
                || lower_name.contains("value")
            {
                return Ok(name.to_string());
            }
        }

        // Fall back to the first numeric column that is not the date column
        for col in df.get_columns() {
            if col.name() != date_column && col.dtype().is_numeric() {
                return Ok(col.name().to_string());
            }
        }

        Err(ForecastError::DataError(
            "No revenue column found in data".to_string(),
        ))
    }
}

impl RevenueFrame {
    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the date column name
    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Get the revenue column name
    pub fn revenue_column(&self) -> &str {
        &self.revenue_column
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check whether the frame is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Extract (date, revenue) pairs in input order.
    ///
    /// Rows with a null date are dropped; a null revenue becomes NaN so
    /// the gap survives resampling as a missing marker.
    pub fn records(&self) -> Result<Vec<(NaiveDate, f64)>> {
        let dates = self.parse_dates()?;
        let revenues = self.revenue_values()?;

        Ok(dates
            .into_iter()
            .zip(revenues)
            .filter_map(|(date, revenue)| date.map(|d| (d, revenue)))
            .collect())
    }

    /// Parse the date column into calendar dates
    fn parse_dates(&self) -> Result<Vec<Option<NaiveDate>>> {
        let col = self.df.column(&self.date_column)?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .map(|opt| opt.map(parse_date).transpose())
                .collect(),
            DataType::Date => Ok(col
                .date()?
                .into_iter()
                .map(|opt| opt.and_then(days_from_epoch))
                .collect()),
            DataType::Datetime(unit, _) => {
                let divisor = match unit {
                    TimeUnit::Nanoseconds => 1_000_000_000,
                    TimeUnit::Microseconds => 1_000_000,
                    TimeUnit::Milliseconds => 1_000,
                };
                Ok(col
                    .datetime()?
                    .into_iter()
                    .map(|opt| {
                        opt.and_then(|ts| {
                            NaiveDateTime::from_timestamp_opt(ts / divisor, 0).map(|dt| dt.date())
                        })
                    })
                    .collect())
            }
            other => Err(ForecastError::DataError(format!(
                "Date column '{}' has unsupported type {:?}",
                self.date_column, other
            ))),
        }
    }

    /// Get the revenue column as f64 values, nulls mapped to NaN
    fn revenue_values(&self) -> Result<Vec<f64>> {
        let col = self.df.column(&self.revenue_column)?;

        let float_col = col.cast(&DataType::Float64).map_err(|_| {
            ForecastError::DataError(format!(
                "Revenue column '{}' cannot be converted to f64",
                self.revenue_column
            ))
        })?;

        Ok(float_col
            .f64()?
            .into_iter()
            .map(|opt| opt.unwrap_or(f64::NAN))
            .collect())
    }
}

/// Parse a calendar date from its textual form
fn parse_date(text: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    NaiveDate::parse_from_str(text, "%Y/%m/%d").map_err(ForecastError::from)
}

/// Convert days since the Unix epoch into a calendar date
fn days_from_epoch(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days as i64))
}

/// A revenue series aligned to a fixed monthly cadence.
///
/// Dates are month starts, strictly increasing with no gaps in the
/// index; months missing from the input carry NaN values.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl RevenueSeries {
    /// Create a series from aligned dates and values
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Date count ({}) doesn't match value count ({})",
                dates.len(),
                values.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::DataError(
                "Series dates must be strictly increasing".to_string(),
            ));
        }

        Ok(Self { dates, values })
    }

    /// Resample raw records to a monthly cadence.
    ///
    /// Dates snap to the first of their month, records sort by date,
    /// duplicate months keep the last value seen, and the index runs
    /// continuously from the first month to the last with NaN filling
    /// months absent from the input.
    pub fn resample_monthly(records: &[(NaiveDate, f64)]) -> Result<Self> {
        if records.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot resample an empty record set".to_string(),
            ));
        }

        let mut snapped: Vec<(NaiveDate, f64)> = records
            .iter()
            .map(|&(date, value)| (month_start(date), value))
            .collect();
        snapped.sort_by_key(|&(date, _)| date);

        let first = snapped[0].0;
        let last = snapped[snapped.len() - 1].0;
        let span = (month_index(last) - month_index(first)) as usize + 1;

        let mut dates = Vec::with_capacity(span);
        let mut values = vec![f64::NAN; span];

        let mut current = first;
        for _ in 0..span {
            dates.push(current);
            current = current + Months::new(1);
        }

        for (date, value) in snapped {
            let offset = (month_index(date) - month_index(first)) as usize;
            values[offset] = value;
        }

        Ok(Self { dates, values })
    }

    /// Get the series dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the series values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Length of the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The last date in the series, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// First-order differencing: each value replaced by the change from
    /// its predecessor, dropping the leading undefined entry.
    pub fn difference(&self) -> Self {
        let values: Vec<f64> = self.values.windows(2).map(|w| w[1] - w[0]).collect();
        let dates = self.dates.iter().skip(1).copied().collect();

        Self { dates, values }
    }
}

/// Snap a date to the first day of its month
pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    // with_day(1) cannot fail for a valid date
    date.with_day(1).unwrap()
}

/// Monotone month counter used for cadence arithmetic
pub(crate) fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
