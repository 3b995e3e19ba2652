use crate::analysis_period::{month_start, AnalysisPeriod};
use crate::core::catchment::CatchmentSurface;
use crate::core::demand::DemandSchedule;
use crate::core::tank::{coverage, reliability, DailyBalance};
use crate::core::tariff::TariffSchedule;
use crate::input::{ConnectionType, Location, ReportRequest, RoofType};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

/// One calendar month of the analysis, in chronological order within the
/// report. Derived data only; never independently mutated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyResult {
    /// First day of the month.
    pub month: NaiveDate,
    pub rain_mm: f64,
    pub rain_days: usize,
    pub captured_liters: f64,
    pub offset_liters: f64,
    pub overflow_liters: f64,
    pub unmet_demand_liters: f64,
    pub baseline_bill_rs: f64,
    pub net_bill_rs: f64,
    pub savings_rs: f64,
}

/// The response payload of one calculation run. Not persisted anywhere; it
/// only exists as the returned structure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub monthly_data: Vec<MonthlyResult>,
    pub daily_data_count: usize,
    pub success: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub coords: Location,
    pub period: AnalysisPeriod,
    pub roof: RoofSummary,
    pub tank: TankSummary,
    pub billing: BillingSummary,
    pub totals: Totals,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoofSummary {
    pub area_m2: f64,
    pub roof_type: RoofType,
    pub runoff_coeff: f64,
    pub collection_efficiency: f64,
    pub first_flush_mm: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TankSummary {
    pub enabled: bool,
    pub capacity_liters: Option<f64>,
    /// Fraction of simulated days on which demand was fully met.
    pub reliability: f64,
    /// Fraction of total demand met by harvested water.
    pub coverage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BillingSummary {
    pub connection_type: ConnectionType,
    pub baseline_total_rs: f64,
    pub net_total_rs: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Totals {
    pub captured_liters: f64,
    pub offset_liters: f64,
    pub overflow_liters: f64,
    pub unmet_demand_liters: f64,
    pub savings_rs: f64,
}

#[derive(Default)]
struct MonthAccumulator {
    rain_mm: f64,
    rain_days: usize,
    captured_liters: f64,
    offset_liters: f64,
    overflow_liters: f64,
    unmet_demand_liters: f64,
}

/// Merges the daily balance series, the tariff and the request echo into the
/// final report. Pure data transformation: every calendar month in the input
/// appears exactly once, chronologically, and totals are exact sums — no
/// rounding happens here, currency formatting is the presentation layer's.
pub fn assemble_report(
    request: &ReportRequest,
    surface: &CatchmentSurface,
    tariff: &TariffSchedule,
    schedule: &DemandSchedule,
    period: &AnalysisPeriod,
    balances: &[DailyBalance],
) -> Report {
    let mut months: IndexMap<NaiveDate, MonthAccumulator> = IndexMap::new();
    for balance in balances {
        let month = months.entry(month_start(balance.date)).or_default();
        month.rain_mm += balance.rain_mm;
        if balance.rain_mm > 0. {
            month.rain_days += 1;
        }
        month.captured_liters += balance.captured_liters;
        month.offset_liters += balance.offset_liters;
        month.overflow_liters += balance.overflow_liters;
        month.unmet_demand_liters += balance.unmet_demand_liters;
    }

    let monthly_demand_liters = schedule.monthly_demand_liters();
    let monthly_data: Vec<MonthlyResult> = months
        .into_iter()
        .map(|(month, accumulated)| {
            let billing = tariff.monthly_billing(monthly_demand_liters, accumulated.offset_liters);
            MonthlyResult {
                month,
                rain_mm: accumulated.rain_mm,
                rain_days: accumulated.rain_days,
                captured_liters: accumulated.captured_liters,
                offset_liters: accumulated.offset_liters,
                overflow_liters: accumulated.overflow_liters,
                unmet_demand_liters: accumulated.unmet_demand_liters,
                baseline_bill_rs: billing.baseline.total_rs,
                net_bill_rs: billing.net.total_rs,
                savings_rs: billing.savings_rs,
            }
        })
        .collect();

    let mut totals = Totals::default();
    let mut baseline_total_rs = 0.;
    let mut net_total_rs = 0.;
    for month in &monthly_data {
        totals.captured_liters += month.captured_liters;
        totals.offset_liters += month.offset_liters;
        totals.overflow_liters += month.overflow_liters;
        totals.unmet_demand_liters += month.unmet_demand_liters;
        totals.savings_rs += month.savings_rs;
        baseline_total_rs += month.baseline_bill_rs;
        net_total_rs += month.net_bill_rs;
    }

    Report {
        summary: Summary {
            coords: request.location,
            period: *period,
            roof: RoofSummary {
                area_m2: surface.area_m2(),
                roof_type: request.roof.roof_type.clone(),
                runoff_coeff: surface.runoff_coefficient(),
                collection_efficiency: surface.collection_efficiency(),
                first_flush_mm: surface.first_flush_mm(),
            },
            tank: TankSummary {
                enabled: request.tank_capacity_liters().is_some(),
                capacity_liters: request.tank_capacity_liters(),
                reliability: reliability(balances),
                coverage: coverage(balances),
            },
            billing: BillingSummary {
                connection_type: request.demand.connection_type.clone(),
                baseline_total_rs,
                net_total_rs,
            },
            totals,
        },
        daily_data_count: balances.len(),
        monthly_data,
        success: true,
        message: "Rainwater harvesting analysis completed successfully".into(),
    }
}
