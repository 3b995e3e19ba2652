use crate::core::units::litres_to_kilolitres;
use crate::errors::UnknownTariffError;
use crate::input::ConnectionType;
use serde::Serialize;

/// This module carries the BWSSB monthly tariff slabs (₹ per kL of water,
/// plus a sanitary charge and a meter fee), per the schedule published in
/// March 2025.

#[derive(Clone, Copy, Debug)]
enum SanitaryCharge {
    /// Flat ₹ amount for the slab, pro-rated by the share of the slab span
    /// actually consumed so the charge stays usage-linked.
    Flat(f64),
    /// Fraction of the slab's water tariff, applied per kL.
    FractionOfTariff(f64),
}

#[derive(Clone, Copy, Debug)]
struct TariffSlab {
    /// Inclusive upper bound of monthly consumption the slab covers.
    upper_liters: f64,
    water_rs_per_kl: f64,
    sanitary: SanitaryCharge,
    meter_fee_rs: f64,
}

const DOMESTIC_SLABS: [TariffSlab; 4] = [
    TariffSlab {
        upper_liters: 8_000.,
        water_rs_per_kl: 7.,
        sanitary: SanitaryCharge::Flat(14.),
        meter_fee_rs: 100.,
    },
    TariffSlab {
        upper_liters: 25_000.,
        water_rs_per_kl: 11.,
        sanitary: SanitaryCharge::FractionOfTariff(0.25),
        meter_fee_rs: 50.,
    },
    TariffSlab {
        upper_liters: 50_000.,
        water_rs_per_kl: 26.,
        sanitary: SanitaryCharge::FractionOfTariff(0.25),
        meter_fee_rs: 75.,
    },
    TariffSlab {
        upper_liters: f64::INFINITY,
        water_rs_per_kl: 45.,
        sanitary: SanitaryCharge::FractionOfTariff(0.25),
        meter_fee_rs: 150.,
    },
];

const NON_DOMESTIC_SLABS: [TariffSlab; 5] = [
    TariffSlab {
        upper_liters: 10_000.,
        water_rs_per_kl: 50.,
        sanitary: SanitaryCharge::FractionOfTariff(0.25),
        meter_fee_rs: 50.,
    },
    TariffSlab {
        upper_liters: 25_000.,
        water_rs_per_kl: 57.,
        sanitary: SanitaryCharge::Flat(0.),
        meter_fee_rs: 75.,
    },
    TariffSlab {
        upper_liters: 50_000.,
        water_rs_per_kl: 65.,
        sanitary: SanitaryCharge::Flat(0.),
        meter_fee_rs: 100.,
    },
    TariffSlab {
        upper_liters: 75_000.,
        water_rs_per_kl: 76.,
        sanitary: SanitaryCharge::Flat(0.),
        meter_fee_rs: 125.,
    },
    TariffSlab {
        upper_liters: f64::INFINITY,
        water_rs_per_kl: 87.,
        sanitary: SanitaryCharge::Flat(0.),
        meter_fee_rs: 175.,
    },
];

/// Itemised monthly water bill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BillBreakdown {
    pub water_rs: f64,
    pub sanitary_rs: f64,
    pub meter_fee_rs: f64,
    pub total_rs: f64,
}

/// The slab table for one connection category.
#[derive(Clone, Copy, Debug)]
pub struct TariffSchedule {
    slabs: &'static [TariffSlab],
}

impl TariffSchedule {
    /// Fails fast for a connection type with no published table; no fallback
    /// schedule is substituted.
    pub fn for_connection_type(
        connection_type: &ConnectionType,
    ) -> Result<Self, UnknownTariffError> {
        match connection_type {
            ConnectionType::Domestic => Ok(Self {
                slabs: &DOMESTIC_SLABS,
            }),
            ConnectionType::NonDomestic => Ok(Self {
                slabs: &NON_DOMESTIC_SLABS,
            }),
            ConnectionType::Other(name) => Err(UnknownTariffError::new(name)),
        }
    }

    /// Bill for one month's metered consumption. Water and sanitary charges
    /// accrue slab by slab; the meter fee is that of the highest slab
    /// reached.
    pub fn monthly_bill(&self, liters: f64) -> BillBreakdown {
        let mut water_rs = 0.;
        let mut sanitary_rs = 0.;
        let mut remaining = liters.max(0.);
        let mut lower = 0.;

        for slab in self.slabs {
            let span = remaining.min(slab.upper_liters - lower);
            if span > 0. {
                let kl = litres_to_kilolitres(span);
                water_rs += slab.water_rs_per_kl * kl;
                sanitary_rs += match slab.sanitary {
                    SanitaryCharge::FractionOfTariff(fraction) => {
                        slab.water_rs_per_kl * fraction * kl
                    }
                    SanitaryCharge::Flat(amount) => {
                        let span_kl = litres_to_kilolitres(slab.upper_liters - lower);
                        amount * (kl / span_kl.max(1.))
                    }
                };
                remaining -= span;
            }
            lower = slab.upper_liters;
            if remaining <= 0. {
                break;
            }
        }

        let meter_fee_rs = self.meter_fee_for(liters);
        BillBreakdown {
            water_rs,
            sanitary_rs,
            meter_fee_rs,
            total_rs: water_rs + sanitary_rs + meter_fee_rs,
        }
    }

    fn meter_fee_for(&self, liters: f64) -> f64 {
        self.slabs
            .iter()
            .find(|slab| slab.upper_liters >= liters)
            .map(|slab| slab.meter_fee_rs)
            .unwrap_or(0.)
    }

    /// Baseline bill (no harvesting) against the net bill after the month's
    /// offset; the offset can at most zero the metered consumption.
    pub fn monthly_billing(&self, monthly_demand_liters: f64, offset_liters: f64) -> MonthlyBilling {
        let baseline = self.monthly_bill(monthly_demand_liters);
        let net = self.monthly_bill((monthly_demand_liters - offset_liters).max(0.));
        MonthlyBilling {
            savings_rs: baseline.total_rs - net.total_rs,
            baseline,
            net,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MonthlyBilling {
    pub baseline: BillBreakdown,
    pub net: BillBreakdown,
    pub savings_rs: f64,
}
