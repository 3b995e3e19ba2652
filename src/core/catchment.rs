use crate::core::units::LITRES_PER_MM_PER_SQUARE_METRE;
use crate::errors::{RwhError, UnknownRoofTypeError, ValidationError};
use crate::input::{RoofSpec, RoofType};
use crate::weather::DailyRainfall;
use chrono::NaiveDate;

// Roof runoff coefficients (typical values; IS 15797 and the NM OSE guide
// give ranges, these sit at the conservative end).
const RUNOFF_COEFF_CONCRETE: f64 = 0.80;
const RUNOFF_COEFF_TILE: f64 = 0.70;
const RUNOFF_COEFF_METAL: f64 = 0.90;
const RUNOFF_COEFF_CGI: f64 = 0.90;
const RUNOFF_COEFF_ASBESTOS: f64 = 0.80;

/// A roof resolved into the numbers the capture calculation needs: catchment
/// area, runoff coefficient for its material, collection losses and the
/// first-flush depth discarded per rain day.
#[derive(Clone, Copy, Debug)]
pub struct CatchmentSurface {
    area_m2: f64,
    runoff_coefficient: f64,
    collection_efficiency: f64,
    first_flush_mm: f64,
}

impl CatchmentSurface {
    /// Resolves the runoff coefficient for the roof material. A roof type
    /// outside the supported enumeration is an error; no default coefficient
    /// is substituted.
    pub fn from_spec(spec: &RoofSpec) -> Result<Self, RwhError> {
        let runoff_coefficient = match &spec.roof_type {
            RoofType::Concrete => RUNOFF_COEFF_CONCRETE,
            RoofType::Tile => RUNOFF_COEFF_TILE,
            RoofType::Metal => RUNOFF_COEFF_METAL,
            RoofType::Cgi => RUNOFF_COEFF_CGI,
            RoofType::Asbestos => RUNOFF_COEFF_ASBESTOS,
            RoofType::Custom => spec.custom_coefficient.ok_or_else(|| {
                ValidationError::new(
                    "custom_coefficient must be provided when roof_type is 'custom'",
                )
            })?,
            RoofType::Other(name) => return Err(UnknownRoofTypeError::new(name).into()),
        };
        Ok(Self {
            area_m2: spec.area_m2,
            runoff_coefficient,
            collection_efficiency: spec.collection_efficiency,
            first_flush_mm: spec.first_flush_mm,
        })
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub fn runoff_coefficient(&self) -> f64 {
        self.runoff_coefficient
    }

    pub fn collection_efficiency(&self) -> f64 {
        self.collection_efficiency
    }

    pub fn first_flush_mm(&self) -> f64 {
        self.first_flush_mm
    }

    /// Captured litres for one day's rainfall: the first flush is discarded,
    /// the remainder runs off at the material's coefficient and is collected
    /// at the configured efficiency. 1 mm over 1 m² is 1 litre.
    pub fn captured_liters(&self, rain_mm: f64) -> f64 {
        let effective_mm = (rain_mm - self.first_flush_mm).max(0.);
        effective_mm
            * LITRES_PER_MM_PER_SQUARE_METRE
            * self.area_m2
            * self.runoff_coefficient
            * self.collection_efficiency
    }
}

/// One day of supply after the roof: what fell and what reached storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DailyCapture {
    pub date: NaiveDate,
    pub rain_mm: f64,
    pub captured_liters: f64,
}

/// Applies the capture calculation to each day of a (validated) rainfall
/// series, preserving order.
pub fn compute_daily_capture(
    rainfall: &DailyRainfall,
    surface: &CatchmentSurface,
) -> Vec<DailyCapture> {
    rainfall
        .days()
        .iter()
        .map(|day| DailyCapture {
            date: day.date,
            rain_mm: day.rain_mm,
            captured_liters: surface.captured_liters(day.rain_mm),
        })
        .collect()
}
