/// All cost, rate, and sizing parameters for one optimization run.
///
/// Passed explicitly into the capacity model and the sweep driver; nothing is
/// read from globals.
#[derive(Debug, Clone)]
pub struct SizingConfig {
    pub array_cost: f64,    // $/kW installed
    pub tax_modifier: f64,  // fraction of array cost left after tax credit
    pub battery_cost: f64,  // $/kWh installed
    pub retail_rate: f64,   // current $/kWh
    pub rate_growth: f64,   // avg. growth factor/yr
    pub system_lifespan: usize, // yrs
    pub roof_area: f64,     // m^2
    pub area_per_kw: f64,   // m^2/kW
    pub outage_horizon_hours: usize, // window length the battery must sustain
    pub min_charge_fraction: f64, // reserve floor as a fraction of capacity
    pub big_m: f64,         // relaxation bound for binary-gated flows
    pub battery_capacity_max: Option<f64>, // optional cap on storage size, kWh
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            array_cost: 2900.0,
            tax_modifier: 0.74,
            battery_cost: 345.0,
            retail_rate: 0.134,
            rate_growth: 1.03,
            system_lifespan: 25,
            roof_area: 30.0,
            area_per_kw: 5.181,
            outage_horizon_hours: 24,
            min_charge_fraction: 0.5,
            big_m: 1_000_000.0,
            battery_capacity_max: None,
        }
    }
}

impl SizingConfig {
    /// Value of one kWh of annual production over the system lifespan:
    /// the retail rate compounded year by year at the growth factor.
    pub fn lifetime_energy_value(&self) -> f64 {
        (0..self.system_lifespan)
            .map(|year| self.retail_rate * self.rate_growth.powi(year as i32))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_energy_value_compounds_rate_growth() {
        let config = SizingConfig {
            retail_rate: 1.0,
            rate_growth: 1.0,
            system_lifespan: 3,
            ..SizingConfig::default()
        };
        assert_eq!(config.lifetime_energy_value(), 3.0);

        let growing = SizingConfig {
            retail_rate: 1.0,
            rate_growth: 2.0,
            system_lifespan: 3,
            ..SizingConfig::default()
        };
        // 1 + 2 + 4
        assert_eq!(growing.lifetime_energy_value(), 7.0);
    }
}
