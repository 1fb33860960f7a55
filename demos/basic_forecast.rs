use chrono::NaiveDate;
use revenue_forecast::forecaster::DEFAULT_FORECAST_STEPS;
use revenue_forecast::{ArimaOrder, DataLoader, RevenueForecaster};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Revenue Forecast: Basic Example");
    println!("===============================\n");

    // Four years of monthly revenue with growth and a seasonal swing
    println!("Creating sample data...");
    let months: Vec<NaiveDate> = (0..48)
        .map(|i| NaiveDate::from_ymd_opt(2020 + i / 12, (i % 12) as u32 + 1, 1).unwrap())
        .collect();
    let revenues: Vec<f64> = (0..48)
        .map(|i| {
            let trend = 250_000.0 + 4_000.0 * i as f64;
            let seasonal = 15_000.0 * (i as f64 * std::f64::consts::TAU / 12.0).sin();
            trend + seasonal
        })
        .collect();

    // Hold out the final year for evaluation
    let train_data = DataLoader::from_records(months[..36].to_vec(), revenues[..36].to_vec())?;
    let test_data = DataLoader::from_records(months[36..].to_vec(), revenues[36..].to_vec())?;
    println!("Sample data created: 36 training months, 12 held out\n");

    // Fit ARIMA(1,1,1)
    println!("Training model...");
    let mut forecaster = RevenueForecaster::new(ArimaOrder::new(1, 1, 1));
    let fitted = forecaster.train(&train_data)?;
    println!(
        "Model trained: AR {:?}, MA {:?}, AIC {:.2}\n",
        fitted.ar_coefficients(),
        fitted.ma_coefficients(),
        fitted.aic()
    );

    // Forecast the next year
    println!("Generating 12-month forecast...");
    let forecast = forecaster.predict(DEFAULT_FORECAST_STEPS)?;
    for (date, value) in forecast.forecast_dates.iter().zip(&forecast.predicted_values) {
        println!("  {}: {:.2}", date, value);
    }

    // Evaluate against the held-out year
    println!("\nEvaluating on held-out data...");
    let evaluation = forecaster.evaluate(&test_data)?;
    println!("MAPE: {:.2}%", evaluation.mape);

    println!("\nAs JSON:");
    println!("{}", serde_json::to_string_pretty(&forecast)?);

    Ok(())
}
