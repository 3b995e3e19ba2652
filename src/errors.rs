use thiserror::Error;

#[derive(Debug, Error)]
pub enum RwhError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] ValidationError),
    #[error("Daily rainfall could not be retrieved: {0}")]
    WeatherFetch(#[from] WeatherFetchError),
    #[error("{0}")]
    UnknownRoofType(#[from] UnknownRoofTypeError),
    #[error("{0}")]
    UnknownTariff(#[from] UnknownTariffError),
    #[error("Error identified during RWH calculation: {0}")]
    FailureInCalculation(#[from] ComputationError),
}

/// An error raised for malformed input, before any external call is made.
#[derive(Clone, Debug, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// An error raised when the upstream rainfall provider is unreachable, times
/// out, or returns a payload the engine cannot use. Carries the underlying
/// cause; the engine itself never retries.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct WeatherFetchError {
    error: anyhow::Error,
}

impl WeatherFetchError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// An error representing a roof type outside the supported enumeration. No
/// default coefficient is substituted.
#[derive(Clone, Debug, Error)]
#[error("Unknown roof type '{0}'")]
pub struct UnknownRoofTypeError(String);

impl UnknownRoofTypeError {
    pub(crate) fn new(roof_type: &str) -> Self {
        Self(roof_type.to_string())
    }
}

/// An error representing a connection type with no tariff schedule.
#[derive(Clone, Debug, Error)]
#[error("No tariff schedule for connection type '{0}'")]
pub struct UnknownTariffError(String);

impl UnknownTariffError {
    pub(crate) fn new(connection_type: &str) -> Self {
        Self(connection_type.to_string())
    }
}

/// An invariant violation caught mid-pipeline, e.g. a storage level leaving
/// its bounds. Treated as an internal defect and always fatal.
#[derive(Clone, Debug, Error)]
#[error("{0}")]
pub struct ComputationError(String);

impl ComputationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
