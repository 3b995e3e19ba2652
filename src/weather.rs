use crate::analysis_period::AnalysisPeriod;
use crate::errors::{ValidationError, WeatherFetchError};
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// The historical archive trails real time; the default analysis window ends
/// this many days before today.
pub const ARCHIVE_PUBLICATION_DELAY_DAYS: u64 = 5;

const ARCHIVE_ENDPOINT: &str = "https://archive-api.open-meteo.com/v1/archive";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainfallDay {
    pub date: NaiveDate,
    pub rain_mm: f64,
}

/// A daily precipitation series, the supply side of the harvest calculation.
/// Consumed read-only once built.
#[derive(Clone, Debug, Default)]
pub struct DailyRainfall {
    days: Vec<RainfallDay>,
}

impl DailyRainfall {
    pub fn new(days: Vec<RainfallDay>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[RainfallDay] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The calendar span of the series, regardless of the order entries
    /// arrived in.
    pub fn period(&self) -> Option<AnalysisPeriod> {
        let start = self.days.iter().map(|day| day.date).min()?;
        let end = self.days.iter().map(|day| day.date).max()?;
        Some(AnalysisPeriod { start, end })
    }

    /// One entry per calendar day of the period, in order. Days the source
    /// series omits are filled with 0 mm; days outside the period are
    /// dropped.
    pub fn gap_filled(&self, period: &AnalysisPeriod) -> DailyRainfall {
        let by_date: HashMap<NaiveDate, f64> = self
            .days
            .iter()
            .map(|day| (day.date, day.rain_mm))
            .collect();
        DailyRainfall::new(
            period
                .days()
                .map(|date| RainfallDay {
                    date,
                    rain_mm: by_date.get(&date).copied().unwrap_or(0.),
                })
                .collect(),
        )
    }

    /// Rainfall depths must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for day in &self.days {
            if !day.rain_mm.is_finite() || day.rain_mm < 0. {
                return Err(ValidationError::new(format!(
                    "rainfall depth for {} is invalid: {} mm",
                    day.date, day.rain_mm
                )));
            }
        }
        Ok(())
    }
}

/// The upstream collaborator supplying the daily precipitation series. The
/// fetch is the sole I/O boundary of a report run: blocking, with a timeout,
/// and never retried here.
pub trait RainfallProvider {
    fn fetch_daily_rainfall(
        &self,
        lat: f64,
        lon: f64,
        period: &AnalysisPeriod,
    ) -> Result<DailyRainfall, WeatherFetchError>;
}

/// Client for the Open-Meteo historical weather archive.
#[derive(Debug)]
pub struct OpenMeteoArchive {
    endpoint: String,
    agent: ureq::Agent,
}

impl Default for OpenMeteoArchive {
    fn default() -> Self {
        Self::new(ARCHIVE_ENDPOINT)
    }
}

impl OpenMeteoArchive {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build(),
        }
    }
}

impl RainfallProvider for OpenMeteoArchive {
    fn fetch_daily_rainfall(
        &self,
        lat: f64,
        lon: f64,
        period: &AnalysisPeriod,
    ) -> Result<DailyRainfall, WeatherFetchError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("latitude", &lat.to_string())
            .query("longitude", &lon.to_string())
            .query("start_date", &period.start.to_string())
            .query("end_date", &period.end.to_string())
            .query("daily", "rain_sum")
            .query("timezone", "auto")
            .query("cell_selection", "land")
            .call()
            .map_err(|err| {
                WeatherFetchError::new(
                    anyhow!(err)
                        .context(format!("requesting daily rainfall for ({lat}, {lon})")),
                )
            })?;
        let payload: ArchiveResponse = response
            .into_json()
            .map_err(|err| WeatherFetchError::new(anyhow!(err).context("malformed archive response")))?;
        payload.into_series().map_err(WeatherFetchError::new)
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    time: Vec<NaiveDate>,
    /// The archive reports a null rather than omitting a day it has no
    /// observation for; nulls become dry days, the same policy as gaps.
    rain_sum: Vec<Option<f64>>,
}

impl ArchiveResponse {
    fn into_series(self) -> anyhow::Result<DailyRainfall> {
        let ArchiveDaily { time, rain_sum } = self.daily;
        if time.len() != rain_sum.len() {
            return Err(anyhow!(
                "archive returned {} dates but {} rainfall values",
                time.len(),
                rain_sum.len()
            ));
        }
        let series = DailyRainfall::new(
            time.into_iter()
                .zip(rain_sum)
                .map(|(date, rain_mm)| RainfallDay {
                    date,
                    rain_mm: rain_mm.unwrap_or(0.),
                })
                .collect(),
        );
        series
            .validate()
            .context("archive returned invalid rainfall depths")?;
        Ok(series)
    }
}
