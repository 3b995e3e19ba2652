use crate::core::units::MEAN_DAYS_PER_MONTH;
use crate::input::DemandProfile;

/// A monthly demand figure spread uniformly over daily simulation steps.
/// Built from an already-validated profile, so the derived daily figure is
/// always positive.
#[derive(Clone, Copy, Debug)]
pub struct DemandSchedule {
    monthly_demand_liters: f64,
    daily_demand_liters: f64,
}

impl DemandSchedule {
    pub fn from_profile(profile: &DemandProfile) -> Self {
        Self {
            monthly_demand_liters: profile.monthly_demand_liters,
            daily_demand_liters: profile.monthly_demand_liters / MEAN_DAYS_PER_MONTH,
        }
    }

    pub fn monthly_demand_liters(&self) -> f64 {
        self.monthly_demand_liters
    }

    pub fn daily_demand_liters(&self) -> f64 {
        self.daily_demand_liters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ConnectionType;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn should_spread_monthly_demand_over_a_mean_month() {
        let schedule = DemandSchedule::from_profile(&DemandProfile {
            monthly_demand_liters: 32_000.,
            connection_type: ConnectionType::Domestic,
        });
        assert_relative_eq!(schedule.daily_demand_liters(), 32_000. / 30.437);
        assert_relative_eq!(schedule.monthly_demand_liters(), 32_000.);
    }
}
