pub mod analysis_period;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod read_rainfall_file;
pub mod report;
pub mod weather;

use crate::analysis_period::AnalysisPeriod;
use crate::core::catchment::{compute_daily_capture, CatchmentSurface};
use crate::core::demand::DemandSchedule;
use crate::core::tank::simulate;
use crate::core::tariff::TariffSchedule;
use crate::errors::{RwhError, ValidationError, WeatherFetchError};
use crate::input::{ingest_request, ReportRequest};
use crate::output::Output;
use crate::report::{assemble_report, Report};
use crate::weather::{DailyRainfall, OpenMeteoArchive, RainfallProvider};
use chrono::Utc;
use std::io::Read;
use tracing::info;

/// One-call entry point: fetch daily rainfall for the requested period,
/// compute daily capture, simulate storage against demand, price the offset
/// and assemble the report.
///
/// Validation and the roof/tariff lookups run before the provider is
/// contacted, so a malformed request never reaches the network.
pub fn run_report(
    request: &ReportRequest,
    provider: &impl RainfallProvider,
) -> Result<Report, RwhError> {
    request.validate()?;
    let surface = CatchmentSurface::from_spec(&request.roof)?;
    let tariff = TariffSchedule::for_connection_type(&request.demand.connection_type)?;

    let period = match request.period {
        Some(period) => period,
        None => AnalysisPeriod::trailing_year(Utc::now().date_naive()),
    };
    info!(
        "fetching daily rainfall for ({}, {}) over {} to {}",
        request.location.lat, request.location.lon, period.start, period.end
    );
    let fetched = provider.fetch_daily_rainfall(request.location.lat, request.location.lon, &period)?;
    let series = fetched.gap_filled(&period);
    series.validate().map_err(|err| {
        WeatherFetchError::new(
            anyhow::Error::new(err).context("provider returned invalid rainfall depths"),
        )
    })?;

    calculate(request, &surface, &tariff, &period, &series)
}

/// Entry point for callers that already hold a rainfall series, e.g. one read
/// from a CSV file. When the request names no period, the series' own
/// calendar span is used; either way the series is gap-filled to one entry
/// per day and validated here.
pub fn run_report_with_series(
    request: &ReportRequest,
    rainfall: &DailyRainfall,
) -> Result<Report, RwhError> {
    request.validate()?;
    let surface = CatchmentSurface::from_spec(&request.roof)?;
    let tariff = TariffSchedule::for_connection_type(&request.demand.connection_type)?;

    let period = match request.period {
        Some(period) => period,
        None => rainfall.period().ok_or_else(|| {
            ValidationError::new("rainfall series is empty and the request names no period")
        })?,
    };
    let series = rainfall.gap_filled(&period);
    series.validate()?;

    calculate(request, &surface, &tariff, &period, &series)
}

fn calculate(
    request: &ReportRequest,
    surface: &CatchmentSurface,
    tariff: &TariffSchedule,
    period: &AnalysisPeriod,
    series: &DailyRainfall,
) -> Result<Report, RwhError> {
    let schedule = DemandSchedule::from_profile(&request.demand);
    let daily_capture = compute_daily_capture(series, surface);
    let balances = simulate(&daily_capture, &schedule, request.tank_capacity_liters())?;
    Ok(assemble_report(
        request, surface, tariff, &schedule, period, &balances,
    ))
}

/// Run a calculation from a request JSON stream and write the monthly table
/// and summary through the given output. When no rainfall series is supplied,
/// the Open-Meteo archive is queried.
pub fn run_project(
    input: impl Read,
    output: impl Output,
    rainfall_data: Option<DailyRainfall>,
) -> anyhow::Result<Report> {
    let request = ingest_request(input).map_err(RwhError::from)?;

    let report = match rainfall_data {
        Some(series) => run_report_with_series(&request, &series),
        None => run_report(&request, &OpenMeteoArchive::default()),
    }?;

    if !output.is_noop() {
        write_monthly_csv(&report, &output)?;
        write_summary_json(&report, &output)?;
    }

    Ok(report)
}

fn write_monthly_csv(report: &Report, output: &impl Output) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("monthly", "csv")?;
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    for month in &report.monthly_data {
        writer.serialize(month)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_summary_json(report: &Report, output: &impl Output) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("summary", "json")?;
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_period::AnalysisPeriod;
    use crate::errors::RwhError;
    use crate::output::SinkOutput;
    use crate::weather::RainfallDay;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};
    use rstest::*;
    use serde_json::json;
    use std::cell::Cell;

    fn request_json() -> serde_json::Value {
        json!({
            "roof": {"area_m2": 120.0},
            "location": {"lat": 12.9716, "lon": 77.5946},
            "demand": {"monthly_demand_liters": 32000.0},
            "tank": {"capacity_liters": 20000.0},
            "period": {"start": "2024-06-01", "end": "2024-06-30"}
        })
    }

    fn series_over(period: &AnalysisPeriod, rain_mm: impl Fn(u64) -> f64) -> DailyRainfall {
        DailyRainfall::new(
            (0..period.total_days() as u64)
                .map(|i| RainfallDay {
                    date: period.start + Days::new(i),
                    rain_mm: rain_mm(i),
                })
                .collect(),
        )
    }

    /// Stand-in provider so runs stay offline and deterministic.
    #[derive(Debug)]
    struct CannedProvider {
        rain_mm: f64,
        called: Cell<bool>,
    }

    impl CannedProvider {
        fn new(rain_mm: f64) -> Self {
            Self {
                rain_mm,
                called: Cell::new(false),
            }
        }
    }

    impl RainfallProvider for CannedProvider {
        fn fetch_daily_rainfall(
            &self,
            _lat: f64,
            _lon: f64,
            period: &AnalysisPeriod,
        ) -> Result<DailyRainfall, WeatherFetchError> {
            self.called.set(true);
            Ok(series_over(period, |_| self.rain_mm))
        }
    }

    /// Provider whose upstream is down.
    #[derive(Debug)]
    struct UnreachableProvider;

    impl RainfallProvider for UnreachableProvider {
        fn fetch_daily_rainfall(
            &self,
            _lat: f64,
            _lon: f64,
            _period: &AnalysisPeriod,
        ) -> Result<DailyRainfall, WeatherFetchError> {
            Err(WeatherFetchError::new(anyhow::anyhow!(
                "connection timed out"
            )))
        }
    }

    #[rstest]
    fn should_run_a_report_end_to_end() {
        let request = ingest_request(request_json().to_string().as_bytes()).unwrap();
        let report = run_report(&request, &CannedProvider::new(10.)).unwrap();
        assert_eq!(report.monthly_data.len(), 1);
        assert_eq!(report.daily_data_count, 30);
        // every day: (10 - 1.5)mm × 120m² × 0.8 × 0.9
        assert_relative_eq!(
            report.summary.totals.captured_liters,
            30. * 734.4,
            max_relative = 1e-12
        );
        assert!(report.summary.totals.savings_rs > 0.);
    }

    #[rstest]
    fn should_not_contact_the_provider_for_an_invalid_request() {
        let mut invalid = request_json();
        invalid["roof"]["area_m2"] = json!(-1.0);
        let request = ingest_request(invalid.to_string().as_bytes()).unwrap();
        let provider = CannedProvider::new(10.);
        let result = run_report(&request, &provider);
        assert!(matches!(result, Err(RwhError::InvalidRequest(_))));
        assert!(!provider.called.get());
    }

    #[rstest]
    fn should_surface_fetch_failure_as_weather_error() {
        let request = ingest_request(request_json().to_string().as_bytes()).unwrap();
        let result = run_report(&request, &UnreachableProvider);
        assert!(matches!(result, Err(RwhError::WeatherFetch(_))));
    }

    #[rstest]
    fn should_derive_the_period_from_a_supplied_series() {
        let mut value = request_json();
        value.as_object_mut().unwrap().remove("period");
        let request = ingest_request(value.to_string().as_bytes()).unwrap();
        let period = AnalysisPeriod::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
        )
        .unwrap();
        let report =
            run_report_with_series(&request, &series_over(&period, |i| (i % 4) as f64))
                .unwrap();
        assert_eq!(report.monthly_data.len(), 2);
        assert_eq!(report.daily_data_count, 61);
    }

    #[rstest]
    fn should_reject_a_supplied_series_with_negative_depths() {
        let request = ingest_request(request_json().to_string().as_bytes()).unwrap();
        let period = request.period.unwrap();
        let series = series_over(&period, |i| if i == 3 { -1. } else { 0. });
        let result = run_report_with_series(&request, &series);
        assert!(matches!(result, Err(RwhError::InvalidRequest(_))));
    }

    #[rstest]
    fn should_run_a_project_from_json_through_a_sink() {
        let period = AnalysisPeriod::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();
        let report = run_project(
            request_json().to_string().as_bytes(),
            SinkOutput,
            Some(series_over(&period, |_| 4.)),
        )
        .unwrap();
        assert!(report.success);
    }
}
