/// Unit constants and conversions for the harvest calculation.
///
/// The rule-of-thumb conversion at the heart of the model: 1 mm of rain
/// falling on 1 m² of catchment is 1 litre of water.
pub const LITRES_PER_MM_PER_SQUARE_METRE: f64 = 1.;

pub const LITRES_PER_KILOLITRE: u32 = 1_000;

/// Mean length of a calendar month in days, used to spread a monthly demand
/// figure uniformly over daily simulation steps.
pub const MEAN_DAYS_PER_MONTH: f64 = 30.437;

pub fn litres_to_kilolitres(litres: f64) -> f64 {
    litres / LITRES_PER_KILOLITRE as f64
}
