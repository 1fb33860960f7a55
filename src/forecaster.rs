//! Revenue forecasting pipeline: preprocess, train, predict, evaluate

use crate::data::{month_index, RevenueFrame, RevenueSeries};
use crate::error::{ForecastError, Result};
use crate::metrics;
use crate::models::arima::{ArimaModel, TrainedArima};
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::stationarity::adf_test;
use chrono::{Months, NaiveDate};
use serde::Serialize;

/// Default number of months forecast by `predict`
pub const DEFAULT_FORECAST_STEPS: usize = 12;

/// ARIMA order triple (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ArimaOrder {
    /// Create a new order triple
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Multi-step forecast with calendar dates
#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutput {
    /// Forecasted values on the training scale
    pub predicted_values: Vec<f64>,
    /// ISO dates (YYYY-MM-DD) of the forecast points
    pub forecast_dates: Vec<String>,
    /// Confidence intervals; `predict` leaves these absent
    pub confidence_intervals: Option<Vec<(f64, f64)>>,
}

/// Accuracy report against held-out data
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Mean absolute percentage error, 0-100 scale
    pub mape: f64,
    /// Observed test values
    pub actual_values: Vec<f64>,
    /// Model predictions for the same dates
    pub predicted_values: Vec<f64>,
    /// ISO dates shared by both lists
    pub dates: Vec<String>,
}

/// Forecasting model for a single monthly revenue series.
///
/// One instance owns one fitted model; instances share no state, so
/// concurrent forecasting across series means one forecaster per
/// series. Training records whether the series was differenced and
/// `evaluate` reuses that decision on the test data, keeping both on
/// the same scale.
#[derive(Debug, Clone)]
pub struct RevenueForecaster {
    /// Configured ARIMA order, fixed for the forecaster's lifetime
    order: ArimaOrder,
    /// Preprocessed series the model was last trained on
    history: Option<RevenueSeries>,
    /// Whether training applied first-order differencing
    differenced: bool,
    /// Fitted model handle; None until a successful train
    fitted: Option<TrainedArima>,
}

impl RevenueForecaster {
    /// Create a forecaster with the given ARIMA order
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            order,
            history: None,
            differenced: false,
            fitted: None,
        }
    }

    /// The configured order
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// The preprocessed training series, once trained
    pub fn history(&self) -> Option<&RevenueSeries> {
        self.history.as_ref()
    }

    /// Whether a fitted model is available
    pub fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    /// ADF unit-root check: true iff the series is stationary at the
    /// 5% level. Deterministic for a given series.
    pub fn stationarity_check(&self, series: &RevenueSeries) -> bool {
        adf_test(series.values(), None).is_stationary()
    }

    /// Resample raw records to a monthly cadence and difference once
    /// if the result fails the stationarity check.
    pub fn preprocess(&self, data: &RevenueFrame) -> Result<RevenueSeries> {
        let series = RevenueSeries::resample_monthly(&data.records()?)?;

        if self.stationarity_check(&series) {
            Ok(series)
        } else {
            Ok(series.difference())
        }
    }

    /// Train the model: preprocess, store the series as history, fit
    /// ARIMA with the configured order, and return the fitted handle.
    ///
    /// Estimation failures propagate and leave the previous state
    /// untouched; on success the prior handle is fully replaced.
    pub fn train(&mut self, data: &RevenueFrame) -> Result<&TrainedArima> {
        let resampled = RevenueSeries::resample_monthly(&data.records()?)?;
        let differenced = !self.stationarity_check(&resampled);
        let series = if differenced {
            resampled.difference()
        } else {
            resampled
        };

        let model = ArimaModel::new(self.order.p, self.order.d, self.order.q);
        let fitted = model.train(series.values())?;

        self.history = Some(series);
        self.differenced = differenced;
        Ok(self.fitted.insert(fitted))
    }

    /// Forecast `steps` future months.
    ///
    /// Values are on the training (preprocessed) scale; dates continue
    /// the monthly cadence from the end of the training series.
    /// Confidence intervals stay absent here; use
    /// `predict_with_intervals` to fill them.
    pub fn predict(&self, steps: usize) -> Result<ForecastOutput> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotTrained)?;

        let result = fitted.forecast(steps)?;
        Ok(ForecastOutput {
            predicted_values: result.values().to_vec(),
            forecast_dates: self.future_dates(steps)?,
            confidence_intervals: None,
        })
    }

    /// Forecast with symmetric confidence intervals at `level`
    pub fn predict_with_intervals(&self, steps: usize, level: f64) -> Result<ForecastOutput> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotTrained)?;

        let result = fitted.forecast_with_intervals(steps, level)?;
        Ok(ForecastOutput {
            predicted_values: result.values().to_vec(),
            forecast_dates: self.future_dates(steps)?,
            confidence_intervals: result.intervals().map(|iv| iv.to_vec()),
        })
    }

    /// Evaluate the fitted model on held-out data.
    ///
    /// The test data is resampled and transformed with the decision
    /// recorded at training time. Test dates inside the training range
    /// get in-sample one-step predictions; dates after it get
    /// out-of-sample forecasts at the matching horizon.
    pub fn evaluate(&self, test_data: &RevenueFrame) -> Result<Evaluation> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotTrained)?;
        let history = self.history.as_ref().ok_or(ForecastError::NotTrained)?;

        let mut test_series = RevenueSeries::resample_monthly(&test_data.records()?)?;
        if self.differenced {
            test_series = test_series.difference();
        }
        if test_series.is_empty() {
            return Err(ForecastError::DataError(
                "No test observations left after preprocessing".to_string(),
            ));
        }

        let first_train = history.dates()[0];
        let last_train = history.last_date().ok_or(ForecastError::NotTrained)?;

        let max_horizon = test_series
            .dates()
            .iter()
            .map(|&d| month_index(d) - month_index(last_train))
            .max()
            .unwrap_or(0);
        let future = if max_horizon > 0 {
            fitted.forecast(max_horizon as usize)?.values().to_vec()
        } else {
            vec![]
        };
        let in_sample = fitted.in_sample_predictions();

        let mut actual_values = Vec::with_capacity(test_series.len());
        let mut predicted_values = Vec::with_capacity(test_series.len());
        let mut dates = Vec::with_capacity(test_series.len());

        for (&date, &value) in test_series.dates().iter().zip(test_series.values()) {
            let horizon = month_index(date) - month_index(last_train);
            let prediction = if horizon >= 1 {
                future[horizon as usize - 1]
            } else {
                let offset = month_index(date) - month_index(first_train);
                if offset < 0 {
                    return Err(ForecastError::DataError(format!(
                        "Test date {} precedes the training window",
                        date
                    )));
                }
                in_sample[offset as usize]
            };

            actual_values.push(value);
            predicted_values.push(prediction);
            dates.push(date.format("%Y-%m-%d").to_string());
        }

        let mape = metrics::mape(&actual_values, &predicted_values)?;

        Ok(Evaluation {
            mape,
            actual_values,
            predicted_values,
            dates,
        })
    }

    /// ISO dates continuing the monthly cadence after the history end
    fn future_dates(&self, steps: usize) -> Result<Vec<String>> {
        let last = self
            .history
            .as_ref()
            .and_then(RevenueSeries::last_date)
            .ok_or(ForecastError::NotTrained)?;

        let mut dates = Vec::with_capacity(steps);
        let mut current: NaiveDate = last;
        for _ in 0..steps {
            current = current + Months::new(1);
            dates.push(current.format("%Y-%m-%d").to_string());
        }
        Ok(dates)
    }
}
