//! # Revenue Forecast
//!
//! A Rust library for fitting ARIMA models to monthly revenue data,
//! producing multi-step forecasts and reporting accuracy against
//! held-out data.
//!
//! ## Features
//!
//! - Tabular data handling (date + revenue columns, CSV or DataFrame)
//! - Monthly resampling with augmented Dickey-Fuller differencing
//! - ARIMA(p, d, q) estimation by conditional least squares
//! - Dated forecasts and MAPE evaluation on held-out windows
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use revenue_forecast::{ArimaOrder, DataLoader, RevenueForecaster};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Three years of monthly revenue
//!     let dates: Vec<NaiveDate> = (0..36)
//!         .map(|i| NaiveDate::from_ymd_opt(2021 + i / 12, (i % 12) as u32 + 1, 1).unwrap())
//!         .collect();
//!     let revenues: Vec<f64> = (0..36).map(|i| 100_000.0 + 2_500.0 * i as f64).collect();
//!     let data = DataLoader::from_records(dates, revenues)?;
//!
//!     // Fit ARIMA(1,1,1) and forecast a year ahead
//!     let mut forecaster = RevenueForecaster::new(ArimaOrder::default());
//!     forecaster.train(&data)?;
//!
//!     let forecast = forecaster.predict(12)?;
//!     assert_eq!(forecast.predicted_values.len(), 12);
//!     assert_eq!(forecast.forecast_dates.len(), 12);
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod optim;
pub mod stationarity;

// Re-export commonly used types
pub use crate::data::{DataLoader, RevenueFrame, RevenueSeries};
pub use crate::error::ForecastError;
pub use crate::forecaster::{ArimaOrder, Evaluation, ForecastOutput, RevenueForecaster};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
