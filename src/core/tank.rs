use crate::core::catchment::DailyCapture;
use crate::core::demand::DemandSchedule;
use crate::errors::ComputationError;
use chrono::NaiveDate;

// Numerical slack allowed on the level-bounds invariant before a violation
// is treated as an internal defect.
const LEVEL_EPSILON: f64 = 1e-9;

/// An object to represent a rainwater storage tank.
///
/// Daily mass balance, starting empty, with the level bounded to
/// `[0, capacity]`. Each step takes inflow first (spill above capacity is
/// lost as overflow), then draws demand down to the stored level.
#[derive(Clone, Debug)]
pub struct StorageTank {
    capacity_liters: f64,
    level_liters: f64,
}

impl StorageTank {
    pub fn new(capacity_liters: f64) -> Self {
        Self {
            capacity_liters,
            level_liters: 0.,
        }
    }

    pub fn level_liters(&self) -> f64 {
        self.level_liters
    }

    /// Advance the tank by one day.
    pub fn step(
        &mut self,
        inflow_liters: f64,
        demand_liters: f64,
    ) -> Result<TankStep, ComputationError> {
        let unconstrained = self.level_liters + inflow_liters;
        let overflow_liters = (unconstrained - self.capacity_liters).max(0.);
        self.level_liters = unconstrained.min(self.capacity_liters);

        let delivered_liters = self.level_liters.min(demand_liters);
        self.level_liters -= delivered_liters;
        let unmet_demand_liters = demand_liters - delivered_liters;

        self.check_bounds()?;

        Ok(TankStep {
            delivered_liters,
            overflow_liters,
            unmet_demand_liters,
            level_liters: self.level_liters,
        })
    }

    fn check_bounds(&self) -> Result<(), ComputationError> {
        if self.level_liters < -LEVEL_EPSILON
            || self.level_liters > self.capacity_liters + LEVEL_EPSILON
        {
            return Err(ComputationError::new(format!(
                "tank level {} litres left bounds [0, {}]",
                self.level_liters, self.capacity_liters
            )));
        }
        Ok(())
    }
}

/// The outcome of one simulated tank day.
#[derive(Clone, Copy, Debug)]
pub struct TankStep {
    pub delivered_liters: f64,
    pub overflow_liters: f64,
    pub unmet_demand_liters: f64,
    pub level_liters: f64,
}

/// One day of the supply/demand balance, for either storage model.
#[derive(Clone, Copy, Debug)]
pub struct DailyBalance {
    pub date: NaiveDate,
    pub rain_mm: f64,
    pub captured_liters: f64,
    /// Harvested water delivered against demand (the billing offset).
    pub offset_liters: f64,
    pub overflow_liters: f64,
    pub unmet_demand_liters: f64,
    pub demand_liters: f64,
    /// End-of-day stored level; absent for the direct-offset model.
    pub tank_level_liters: Option<f64>,
}

/// Simulate the full period one day at a time. With a tank the daily
/// transition is capture-then-consume; without one the direct-offset model
/// applies: captured water offsets that day's demand and the excess is lost.
pub fn simulate(
    daily_capture: &[DailyCapture],
    schedule: &DemandSchedule,
    tank_capacity_liters: Option<f64>,
) -> Result<Vec<DailyBalance>, ComputationError> {
    let demand_liters = schedule.daily_demand_liters();
    match tank_capacity_liters {
        Some(capacity) => {
            let mut tank = StorageTank::new(capacity);
            daily_capture
                .iter()
                .map(|day| {
                    let step = tank.step(day.captured_liters, demand_liters)?;
                    Ok(DailyBalance {
                        date: day.date,
                        rain_mm: day.rain_mm,
                        captured_liters: day.captured_liters,
                        offset_liters: step.delivered_liters,
                        overflow_liters: step.overflow_liters,
                        unmet_demand_liters: step.unmet_demand_liters,
                        demand_liters,
                        tank_level_liters: Some(step.level_liters),
                    })
                })
                .collect()
        }
        None => Ok(daily_capture
            .iter()
            .map(|day| {
                let offset_liters = day.captured_liters.min(demand_liters);
                DailyBalance {
                    date: day.date,
                    rain_mm: day.rain_mm,
                    captured_liters: day.captured_liters,
                    offset_liters,
                    overflow_liters: 0.,
                    unmet_demand_liters: demand_liters - offset_liters,
                    demand_liters,
                    tank_level_liters: None,
                }
            })
            .collect()),
    }
}

/// Fraction of simulated days on which demand was fully met, in [0, 1]. An
/// empty series counts as no reliable days.
pub fn reliability(balances: &[DailyBalance]) -> f64 {
    if balances.is_empty() {
        return 0.;
    }
    balances
        .iter()
        .filter(|balance| balance.unmet_demand_liters == 0.)
        .count() as f64
        / balances.len() as f64
}

/// Fraction of total demand met by harvested water over the period.
pub fn coverage(balances: &[DailyBalance]) -> f64 {
    let total_demand: f64 = balances.iter().map(|balance| balance.demand_liters).sum();
    if total_demand == 0. {
        return 0.;
    }
    balances
        .iter()
        .map(|balance| balance.offset_liters)
        .sum::<f64>()
        / total_demand
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::MEAN_DAYS_PER_MONTH;
    use crate::input::{ConnectionType, DemandProfile};
    use approx::assert_relative_eq;
    use chrono::Days;
    use rstest::*;

    fn capture_series(daily_liters: &[f64]) -> Vec<DailyCapture> {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        daily_liters
            .iter()
            .enumerate()
            .map(|(i, &captured_liters)| DailyCapture {
                date: start + Days::new(i as u64),
                rain_mm: 0.,
                captured_liters,
            })
            .collect()
    }

    #[fixture]
    fn schedule() -> DemandSchedule {
        DemandSchedule::from_profile(&DemandProfile {
            monthly_demand_liters: 32_000.,
            connection_type: ConnectionType::Domestic,
        })
    }

    #[rstest]
    fn should_cap_level_and_record_overflow(schedule: DemandSchedule) {
        // 25 000 litres arrive on day one of a 30-day month, into a 20 000
        // litre tank that starts empty
        let mut inflows = vec![25_000.];
        inflows.extend(vec![0.; 29]);
        let balances = simulate(&capture_series(&inflows), &schedule, Some(20_000.)).unwrap();

        let daily_demand = 32_000. / MEAN_DAYS_PER_MONTH;
        let first = &balances[0];
        assert_relative_eq!(first.overflow_liters, 5_000.);
        assert_relative_eq!(
            first.tank_level_liters.unwrap(),
            20_000. - daily_demand
        );

        // the stored 20 000 litres run out partway through the month
        let total_offset: f64 = balances.iter().map(|b| b.offset_liters).sum();
        let total_unmet: f64 = balances.iter().map(|b| b.unmet_demand_liters).sum();
        assert_relative_eq!(total_offset, 20_000., max_relative = 1e-9);
        assert_relative_eq!(
            total_unmet,
            30. * daily_demand - 20_000.,
            max_relative = 1e-9
        );
        assert_relative_eq!(balances.last().unwrap().tank_level_liters.unwrap(), 0.);

        // 19 full-delivery days before the tank runs dry
        assert_relative_eq!(reliability(&balances), 19. / 30.);
    }

    #[rstest]
    fn should_keep_level_within_bounds_on_every_step(schedule: DemandSchedule) {
        let inflows: Vec<f64> = (0..60).map(|i| (i % 7) as f64 * 3_000.).collect();
        let balances = simulate(&capture_series(&inflows), &schedule, Some(10_000.)).unwrap();
        for balance in &balances {
            let level = balance.tank_level_liters.unwrap();
            assert!((0. ..=10_000.).contains(&level));
        }
    }

    #[rstest]
    fn should_report_reliability_within_unit_range(schedule: DemandSchedule) {
        let inflows: Vec<f64> = (0..45).map(|i| if i % 3 == 0 { 4_000. } else { 0. }).collect();
        let balances = simulate(&capture_series(&inflows), &schedule, Some(6_000.)).unwrap();
        let reliability = reliability(&balances);
        assert!((0. ..=1.).contains(&reliability));
    }

    #[rstest]
    fn should_offset_directly_without_a_tank(schedule: DemandSchedule) {
        let daily_demand = 32_000. / MEAN_DAYS_PER_MONTH;
        let balances = simulate(
            &capture_series(&[500., 2_000., 0.]),
            &schedule,
            None,
        )
        .unwrap();

        // captured below demand offsets in full
        assert_relative_eq!(balances[0].offset_liters, 500.);
        assert_relative_eq!(balances[0].unmet_demand_liters, daily_demand - 500.);
        // captured above demand is clipped, the excess is not stored
        assert_relative_eq!(balances[1].offset_liters, daily_demand);
        assert_relative_eq!(balances[1].unmet_demand_liters, 0.);
        // dry day leaves demand fully unmet
        assert_relative_eq!(balances[2].offset_liters, 0.);
        assert_relative_eq!(balances[2].unmet_demand_liters, daily_demand);
        assert!(balances.iter().all(|b| b.tank_level_liters.is_none()));
    }

    #[rstest]
    fn should_carry_water_across_days(schedule: DemandSchedule) {
        let daily_demand = 32_000. / MEAN_DAYS_PER_MONTH;
        // same inflows as the direct-offset case, but with storage the
        // surplus from the wet day serves the dry day
        let balances = simulate(
            &capture_series(&[500., 2_000., 0.]),
            &schedule,
            Some(20_000.),
        )
        .unwrap();
        assert_relative_eq!(balances[1].offset_liters, daily_demand);
        let carried = 500. + 2_000. - daily_demand - 500.;
        assert_relative_eq!(balances[2].offset_liters, carried, max_relative = 1e-12);
    }

    #[rstest]
    fn should_measure_coverage_as_offset_share_of_demand(schedule: DemandSchedule) {
        let daily_demand = 32_000. / MEAN_DAYS_PER_MONTH;
        let balances = simulate(&capture_series(&[500., 0.]), &schedule, None).unwrap();
        assert_relative_eq!(coverage(&balances), 500. / (2. * daily_demand));
    }

    #[rstest]
    fn should_step_a_tank_through_fill_and_drain() {
        let mut tank = StorageTank::new(1_000.);
        let fill = tank.step(1_500., 200.).unwrap();
        assert_relative_eq!(fill.overflow_liters, 500.);
        assert_relative_eq!(fill.delivered_liters, 200.);
        assert_relative_eq!(tank.level_liters(), 800.);

        let drain = tank.step(0., 1_000.).unwrap();
        assert_relative_eq!(drain.delivered_liters, 800.);
        assert_relative_eq!(drain.unmet_demand_liters, 200.);
        assert_relative_eq!(tank.level_liters(), 0.);
    }
}
