use crate::analysis_period::AnalysisPeriod;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use std::io::Read;

pub fn ingest_request(json: impl Read) -> Result<ReportRequest, ValidationError> {
    serde_json::from_reader(json)
        .map_err(|err| ValidationError::new(format!("report request could not be parsed: {err}")))
}

/// One calculation request. Immutable once a report run starts; every run
/// operates on its own copy of these inputs.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportRequest {
    pub roof: RoofSpec,
    pub location: Location,
    pub demand: DemandProfile,
    pub tank: Option<TankSpec>,
    pub period: Option<AnalysisPeriod>,
}

impl ReportRequest {
    /// Checks every numeric range before any external call is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.roof.validate()?;
        self.location.validate()?;
        self.demand.validate()?;
        if let Some(tank) = &self.tank {
            tank.validate()?;
        }
        if let Some(period) = &self.period {
            period.validate()?;
        }
        Ok(())
    }

    /// Capacity of the storage tank when one is configured and enabled.
    pub fn tank_capacity_liters(&self) -> Option<f64> {
        self.tank
            .as_ref()
            .filter(|tank| tank.enabled)
            .map(|tank| tank.capacity_liters)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(-90. ..=90.).contains(&self.lat) {
            return Err(ValidationError::new(format!(
                "latitude must be within [-90, 90], got {}",
                self.lat
            )));
        }
        if !(-180. ..=180.).contains(&self.lon) {
            return Err(ValidationError::new(format!(
                "longitude must be within [-180, 180], got {}",
                self.lon
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoofSpec {
    pub area_m2: f64,
    #[serde(default)]
    pub roof_type: RoofType,
    /// Piping/filter losses between roof and storage.
    #[serde(default = "default_collection_efficiency")]
    pub collection_efficiency: f64,
    /// Rainfall depth discarded per rain day before collection starts.
    #[serde(default = "default_first_flush_mm")]
    pub first_flush_mm: f64,
    /// Runoff coefficient to use when `roof_type` is `custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_coefficient: Option<f64>,
}

fn default_collection_efficiency() -> f64 {
    0.9
}

fn default_first_flush_mm() -> f64 {
    1.5
}

impl RoofSpec {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.area_m2.is_finite() || self.area_m2 <= 0. {
            return Err(ValidationError::new(format!(
                "roof area_m2 must be a positive number of square metres, got {}",
                self.area_m2
            )));
        }
        if !(0. ..=1.).contains(&self.collection_efficiency) {
            return Err(ValidationError::new(format!(
                "collection_efficiency must be within [0, 1], got {}",
                self.collection_efficiency
            )));
        }
        if !self.first_flush_mm.is_finite() || self.first_flush_mm < 0. {
            return Err(ValidationError::new(format!(
                "first_flush_mm must be zero or more, got {}",
                self.first_flush_mm
            )));
        }
        if let Some(coefficient) = self.custom_coefficient {
            if !coefficient.is_finite() || coefficient <= 0. || coefficient > 1. {
                return Err(ValidationError::new(format!(
                    "custom_coefficient must be within (0, 1], got {coefficient}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize_enum_str, PartialEq, Serialize_enum_str)]
#[serde(rename_all = "snake_case")]
pub enum RoofType {
    Concrete,
    Tile,
    Metal,
    /// Corrugated galvanised iron.
    Cgi,
    Asbestos,
    /// Requires `custom_coefficient` on the `RoofSpec`.
    Custom,
    #[serde(other)]
    Other(String),
}

impl Default for RoofType {
    fn default() -> Self {
        Self::Concrete
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DemandProfile {
    pub monthly_demand_liters: f64,
    #[serde(default)]
    pub connection_type: ConnectionType,
}

impl DemandProfile {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.monthly_demand_liters.is_finite() || self.monthly_demand_liters <= 0. {
            return Err(ValidationError::new(format!(
                "monthly_demand_liters must be a positive number of litres, got {}",
                self.monthly_demand_liters
            )));
        }
        Ok(())
    }
}

/// BWSSB connection category selecting the tariff table.
#[derive(Clone, Debug, Deserialize_enum_str, PartialEq, Serialize_enum_str)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Domestic,
    NonDomestic,
    #[serde(other)]
    Other(String),
}

impl Default for ConnectionType {
    fn default() -> Self {
        Self::Domestic
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TankSpec {
    #[serde(default = "default_tank_enabled")]
    pub enabled: bool,
    pub capacity_liters: f64,
}

fn default_tank_enabled() -> bool {
    true
}

impl TankSpec {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && (!self.capacity_liters.is_finite() || self.capacity_liters <= 0.) {
            return Err(ValidationError::new(format!(
                "tank capacity_liters must be a positive number of litres, got {}",
                self.capacity_liters
            )));
        }
        Ok(())
    }
}
