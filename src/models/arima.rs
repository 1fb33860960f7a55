//! ARIMA model (AutoRegressive Integrated Moving Average)

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::optim::{minimize, SimplexOptions};
use statrs::distribution::{ContinuousCDF, Normal};

/// ARIMA model specification with order (p, d, q)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
}

/// ARIMA model fitted to a series
#[derive(Debug, Clone)]
pub struct TrainedArima {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// Estimated AR coefficients
    ar: Vec<f64>,
    /// Estimated MA coefficients
    ma: Vec<f64>,
    /// Estimated intercept on the differenced scale
    intercept: f64,
    /// Training series on the input scale
    train_values: Vec<f64>,
    /// Training series after d differences
    diff_values: Vec<f64>,
    /// Residuals on the differenced scale
    residuals: Vec<f64>,
    /// Residual variance
    residual_variance: f64,
    /// Akaike information criterion
    aic: f64,
    /// Bayesian information criterion
    bic: f64,
}

impl ArimaModel {
    /// Create a new ARIMA model with the given order
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
        }
    }

    /// Conditional sum of squared one-step errors for candidate
    /// parameters, the objective of the estimation.
    fn conditional_sum_of_squares(
        diff_series: &[f64],
        p: usize,
        q: usize,
        ar: &[f64],
        ma: &[f64],
        intercept: f64,
    ) -> f64 {
        let n = diff_series.len();
        let start = p.max(q);

        let mut residuals = vec![0.0; n];
        let mut css = 0.0;

        for t in start..n {
            let mut pred = intercept;
            for i in 0..p {
                pred += ar[i] * (diff_series[t - 1 - i] - intercept);
            }
            for i in 0..q {
                pred += ma[i] * residuals[t - 1 - i];
            }

            let error = diff_series[t] - pred;
            residuals[t] = error;
            css += error * error;
        }

        css
    }

    /// Estimate intercept, AR and MA coefficients on the differenced series
    fn estimate(&self, diff_series: &[f64]) -> (f64, Vec<f64>, Vec<f64>) {
        let p = self.p;
        let q = self.q;
        let mean = diff_series.iter().sum::<f64>() / diff_series.len() as f64;

        if p == 0 && q == 0 {
            return (mean, vec![], vec![]);
        }

        let mut initial = vec![0.0; 1 + p + q];
        initial[0] = mean;
        for i in 0..p {
            initial[1 + i] = 0.1 / (i + 1) as f64;
        }
        for i in 0..q {
            initial[1 + p + i] = 0.1 / (i + 1) as f64;
        }

        // Coefficient bounds keep the fit inside the
        // stationarity/invertibility region
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-0.99, 0.99)).take(p + q));

        let outcome = minimize(
            |params| {
                Self::conditional_sum_of_squares(
                    diff_series,
                    p,
                    q,
                    &params[1..1 + p],
                    &params[1 + p..],
                    params[0],
                )
            },
            &initial,
            &bounds,
            SimplexOptions::default(),
        );

        let intercept = outcome.point[0];
        let ar = outcome.point[1..1 + p].to_vec();
        let ma = outcome.point[1 + p..].to_vec();
        (intercept, ar, ma)
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArima;

    fn train(&self, series: &[f64]) -> Result<TrainedArima> {
        let min_len = self.d + self.p.max(self.q) + 2;
        if series.len() < min_len {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data for {}. Need at least {} observations, got {}.",
                self.name,
                min_len,
                series.len()
            )));
        }

        let diff_values = difference(series, self.d);
        let (intercept, ar, ma) = self.estimate(&diff_values);

        // Residuals and one-step predictions on the differenced scale
        let n = diff_values.len();
        let start = self.p.max(self.q);
        let mut residuals = vec![0.0; n];
        for t in start..n {
            let mut pred = intercept;
            for i in 0..self.p {
                pred += ar[i] * (diff_values[t - 1 - i] - intercept);
            }
            for i in 0..self.q {
                pred += ma[i] * residuals[t - 1 - i];
            }
            residuals[t] = diff_values[t] - pred;
        }

        let n_eff = (n - start) as f64;
        let residual_variance = residuals[start..].iter().map(|r| r * r).sum::<f64>() / n_eff;

        let k = (self.p + self.q + 1) as f64;
        let log_likelihood = -0.5
            * n_eff
            * (1.0 + residual_variance.max(f64::MIN_POSITIVE).ln()
                + (2.0 * std::f64::consts::PI).ln());
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n_eff.ln();

        Ok(TrainedArima {
            name: self.name.clone(),
            p: self.p,
            d: self.d,
            ar,
            ma,
            intercept,
            train_values: series.to_vec(),
            diff_values,
            residuals,
            residual_variance,
            aic,
            bic,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedArima {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        let values = self.forecast_values(horizons);
        ForecastResult::new(values, horizons)
    }

    fn in_sample_predictions(&self) -> Vec<f64> {
        let start = self.p.max(self.ma.len());

        self.train_values
            .iter()
            .enumerate()
            .map(|(t, &actual)| {
                // Residual index aligned with the differenced series;
                // warm-up entries fall back to the observed value
                if t < self.d {
                    return actual;
                }
                let k = t - self.d;
                if k < start {
                    actual
                } else {
                    actual - self.residuals[k]
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArima {
    /// Estimated AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// Estimated MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Estimated intercept on the differenced scale
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Variance of the fit residuals
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Akaike information criterion of the fit
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion of the fit
    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Forecast with symmetric confidence intervals at the given level
    pub fn forecast_with_intervals(&self, horizons: usize, level: f64) -> Result<ForecastResult> {
        if level <= 0.0 || level >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }

        let values = self.forecast_values(horizons);

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::EstimationError(e.to_string()))?;
        let z = normal.inverse_cdf((1.0 + level) / 2.0);

        // Forecast variance accumulates with the horizon
        let intervals = values
            .iter()
            .enumerate()
            .map(|(h, &v)| {
                let se = (self.residual_variance * (h + 1) as f64).sqrt();
                (v - z * se, v + z * se)
            })
            .collect();

        ForecastResult::new_with_intervals(values, horizons, intervals)
    }

    /// Iterate the AR/MA recursion past the end of the training series
    /// and integrate the result back to the input scale.
    fn forecast_values(&self, horizons: usize) -> Vec<f64> {
        if horizons == 0 {
            return vec![];
        }

        let p = self.p;
        let q = self.ma.len();

        let mut extended = self.diff_values.clone();
        let mut shocks = self.residuals.clone();

        for _ in 0..horizons {
            let t = extended.len();
            let mut pred = self.intercept;
            for i in 0..p {
                if t > i {
                    pred += self.ar[i] * (extended[t - 1 - i] - self.intercept);
                }
            }
            for i in 0..q {
                if t > i {
                    pred += self.ma[i] * shocks[t - 1 - i];
                }
            }
            extended.push(pred);
            shocks.push(0.0); // future shocks are zero in expectation
        }

        let forecast_diff = extended[self.diff_values.len()..].to_vec();
        integrate(&forecast_diff, &self.train_values, self.d)
    }
}

/// Apply d rounds of first-order differencing
fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Reverse d rounds of differencing for values extending `original`
fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || differenced.is_empty() {
        return differenced.to_vec();
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let seed = *difference(original, level).last().unwrap_or(&0.0);

        let mut cumsum = seed;
        for value in &mut result {
            cumsum += *value;
            *value = cumsum;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_and_integrate_roundtrip() {
        let original = vec![10.0, 12.0, 15.0, 19.0, 24.0];
        let future_diffs = vec![6.0, 7.0];

        let integrated = integrate(&future_diffs, &original, 1);

        assert_relative_eq!(integrated[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 37.0, epsilon = 1e-10);
    }

    #[test]
    fn fit_ar1_recovers_persistence() {
        // y_t = 0.7 * y_{t-1} + deterministic shock
        let mut series = vec![10.0];
        for i in 1..100 {
            series.push(0.7 * series[i - 1] + (i as f64 * 0.1).sin());
        }

        let fitted = ArimaModel::new(1, 0, 0).train(&series).unwrap();

        assert_eq!(fitted.ar_coefficients().len(), 1);
        assert!(fitted.ar_coefficients()[0] > 0.3);
    }

    #[test]
    fn trend_series_forecast_continues_trend() {
        let series: Vec<f64> = (0..50).map(|i| 10.0 + 2.0 * i as f64).collect();

        let fitted = ArimaModel::new(1, 1, 0).train(&series).unwrap();
        let forecast = fitted.forecast(5).unwrap();

        assert_eq!(forecast.horizons(), 5);
        assert!(forecast.values()[0] > series.last().unwrap() - 5.0);
    }

    #[test]
    fn insufficient_data_is_rejected() {
        let result = ArimaModel::new(2, 1, 1).train(&[1.0, 2.0, 3.0]);

        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    }

    #[test]
    fn zero_horizon_forecast_is_empty() {
        let series: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let fitted = ArimaModel::new(1, 1, 1).train(&series).unwrap();

        let forecast = fitted.forecast(0).unwrap();

        assert_eq!(forecast.horizons(), 0);
        assert!(forecast.values().is_empty());
    }

    #[test]
    fn in_sample_predictions_match_training_length() {
        let series: Vec<f64> = (0..40)
            .map(|i| 100.0 + i as f64 + (i as f64 * 0.5).sin())
            .collect();
        let fitted = ArimaModel::new(1, 1, 1).train(&series).unwrap();

        let predictions = fitted.in_sample_predictions();

        assert_eq!(predictions.len(), series.len());
        // Warm-up entries echo the observations
        assert_eq!(predictions[0], series[0]);
    }

    #[test]
    fn intervals_widen_with_horizon() {
        let series: Vec<f64> = (0..50)
            .map(|i| 10.0 + 0.5 * i as f64 + (i as f64 * 0.3).sin())
            .collect();
        let fitted = ArimaModel::new(1, 1, 1).train(&series).unwrap();

        let forecast = fitted.forecast_with_intervals(5, 0.95).unwrap();
        let intervals = forecast.intervals().unwrap();

        for (i, (lo, hi)) in intervals.iter().enumerate() {
            assert!(lo.is_finite() && hi.is_finite());
            assert!(hi >= lo);
            if i > 0 {
                let prev = intervals[i - 1].1 - intervals[i - 1].0;
                assert!(hi - lo >= prev - 1e-12);
            }
        }
    }

    #[test]
    fn information_criteria_are_finite() {
        let series: Vec<f64> = (0..50).map(|i| 10.0 + (i as f64 * 0.3).sin()).collect();
        let fitted = ArimaModel::new(1, 0, 1).train(&series).unwrap();

        assert!(fitted.aic().is_finite());
        assert!(fitted.bic().is_finite());
        // BIC penalizes harder than AIC once ln(n) > 2
        assert!(fitted.bic() > fitted.aic());
    }
}
