use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, Solver,
    SolverModel, Variable,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sizing::config::SizingConfig;

/// Why a single window solve produced no solution.
///
/// `NoOptimum` is a legitimate optimization outcome (the window is infeasible
/// or the model unbounded); `Engine` means the backend itself misbehaved.
#[derive(Debug, Error)]
pub enum SolveFailure {
    #[error("the window admits no optimal solution")]
    NoOptimum,

    #[error("solver backend failed: {0}")]
    Engine(String),
}

/// Per-hour battery state over one window, as solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryTrajectory {
    pub charge_level: Vec<f64>,
    pub charge_in: Vec<f64>,
    pub charge_out: Vec<f64>,
    pub charging: Vec<bool>,
    pub discharging: Vec<bool>,
}

impl BatteryTrajectory {
    /// The worst-window LP carries no per-hour state.
    pub fn empty() -> Self {
        Self {
            charge_level: Vec::new(),
            charge_in: Vec::new(),
            charge_out: Vec::new(),
            charging: Vec::new(),
            discharging: Vec::new(),
        }
    }
}

/// Optimal sizing for one window. Never constructed from a non-optimal solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSolution {
    pub objective: f64,
    pub solar_capacity_kw: f64,
    pub battery_capacity_kwh: f64,
    pub trajectory: BatteryTrajectory,
}

/// Decision variables for one hour of the window, indexed by hour offset.
struct HourVariables {
    charge_level: Vec<Variable>,
    charge_in: Vec<Variable>,
    charge_out: Vec<Variable>,
    charging: Vec<Variable>,
    discharging: Vec<Variable>,
}

/// Builds and solves the sizing program for one aligned
/// (production, usage) window pair.
///
/// `annual_production_per_kw` is the annual energy yield of one installed kW
/// (the production series total); `annual_usage` is the annual consumption
/// total. Both enter the sizing constraints and the objective, not the
/// per-hour battery state.
pub struct CapacityModel<'a> {
    config: &'a SizingConfig,
    annual_production_per_kw: f64,
    annual_usage: f64,
}

impl<'a> CapacityModel<'a> {
    pub fn new(config: &'a SizingConfig, annual_production_per_kw: f64, annual_usage: f64) -> Self {
        Self {
            config,
            annual_production_per_kw,
            annual_usage,
        }
    }

    /// Net lifetime value of one installed kW: energy savings over the system
    /// lifespan minus the tax-adjusted up-front cost.
    fn array_value_per_kw(&self) -> f64 {
        -self.config.tax_modifier * self.config.array_cost
            + self.config.lifetime_energy_value() * self.annual_production_per_kw
    }

    /// Solve the full mixed-integer sizing program for one window.
    ///
    /// `production` is per-kW hourly yield, `usage` hourly consumption; the
    /// two slices are index-aligned and of equal length.
    pub fn solve_window<S>(
        &self,
        production: &[f64],
        usage: &[f64],
        solver: S,
    ) -> Result<WindowSolution, SolveFailure>
    where
        S: Solver,
        S::Model: SolverModel<Error = ResolutionError>,
    {
        debug_assert_eq!(production.len(), usage.len());
        let horizon = usage.len();
        let cfg = self.config;

        let mut vars = ProblemVariables::new();
        let solar_capacity = vars.add(variable().min(0.0));
        let battery_capacity = vars.add(variable().min(0.0));
        let hours = HourVariables {
            charge_level: vars.add_vector(variable().min(0.0), horizon),
            charge_in: vars.add_vector(variable().min(0.0), horizon),
            charge_out: vars.add_vector(variable().min(0.0), horizon),
            charging: vars.add_vector(variable().binary(), horizon),
            discharging: vars.add_vector(variable().binary(), horizon),
        };

        let objective: Expression = self.array_value_per_kw() * solar_capacity
            - cfg.battery_cost * battery_capacity;
        let mut model = vars.maximise(objective).using(solver);

        // Sizing constraints, independent of the hour.
        model = model.with(constraint!(
            self.annual_production_per_kw * solar_capacity <= self.annual_usage
        ));
        model = model.with(constraint!(
            cfg.area_per_kw * solar_capacity <= cfg.roof_area
        ));
        if let Some(max_kwh) = cfg.battery_capacity_max {
            model = model.with(constraint!(battery_capacity <= max_kwh));
        }

        for t in 0..horizon {
            // The battery enters the outage fully charged, so the level
            // preceding hour 0 is the capacity itself.
            let prev: Expression = if t == 0 {
                battery_capacity.into()
            } else {
                hours.charge_level[t - 1].into()
            };

            // Flow availability: stored energy is production in excess of
            // consumption (gated on the charging flag); shortfall must be
            // covered by discharge.
            model = model.with(constraint!(
                hours.charge_in[t]
                    <= production[t] * solar_capacity - usage[t] * hours.charging[t]
            ));
            model = model.with(constraint!(
                hours.charge_out[t] >= usage[t] - production[t] * solar_capacity
            ));

            // Capacity bounds with the reserve floor.
            model = model.with(constraint!(
                hours.charge_level[t] >= cfg.min_charge_fraction * battery_capacity
            ));
            model = model.with(constraint!(hours.charge_level[t] <= battery_capacity));

            // Discharge feasibility.
            model = model.with(constraint!(hours.charge_out[t] <= prev.clone()));
            model = model.with(constraint!(
                hours.charge_out[t] <= cfg.big_m * hours.discharging[t]
            ));

            // Charge feasibility.
            model = model.with(constraint!(
                hours.charge_in[t] <= battery_capacity - prev.clone()
            ));
            model = model.with(constraint!(
                hours.charge_in[t] <= cfg.big_m * hours.charging[t]
            ));

            model = model.with(constraint!(
                hours.charging[t] + hours.discharging[t] <= 1
            ));

            // Closed energy balance: no unmodeled slack in the recurrence.
            if t == 0 {
                model = model.with(constraint!(hours.charge_level[0] == battery_capacity));
            } else {
                model = model.with(constraint!(
                    hours.charge_level[t]
                        == hours.charge_level[t - 1] + hours.charge_in[t] - hours.charge_out[t]
                ));
            }
        }

        match model.solve() {
            Ok(solution) => Ok(self.extract(&solution, solar_capacity, battery_capacity, &hours)),
            Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => {
                Err(SolveFailure::NoOptimum)
            }
            Err(other) => Err(SolveFailure::Engine(format!("{other:?}"))),
        }
    }

    /// Solve the cheap single-window LP: instead of modeling the battery hour
    /// by hour, require the battery to absorb the window's whole deficit
    /// (`battery >= usage_sum - production_sum * solar`).
    pub fn solve_worst_window<S>(
        &self,
        production: &[f64],
        usage: &[f64],
        solver: S,
    ) -> Result<WindowSolution, SolveFailure>
    where
        S: Solver,
        S::Model: SolverModel<Error = ResolutionError>,
    {
        let production_sum: f64 = production.iter().sum();
        let usage_sum: f64 = usage.iter().sum();
        let cfg = self.config;

        let mut vars = ProblemVariables::new();
        let solar_capacity = vars.add(variable().min(0.0));
        let battery_capacity = vars.add(variable().min(0.0));

        let objective: Expression = self.array_value_per_kw() * solar_capacity
            - cfg.battery_cost * battery_capacity;
        let mut model = vars.maximise(objective).using(solver);

        model = model.with(constraint!(
            self.annual_production_per_kw * solar_capacity <= self.annual_usage
        ));
        model = model.with(constraint!(
            cfg.area_per_kw * solar_capacity <= cfg.roof_area
        ));
        if let Some(max_kwh) = cfg.battery_capacity_max {
            model = model.with(constraint!(battery_capacity <= max_kwh));
        }
        model = model.with(constraint!(
            battery_capacity + production_sum * solar_capacity >= usage_sum
        ));

        match model.solve() {
            Ok(solution) => {
                let solar = solution.value(solar_capacity);
                let battery = solution.value(battery_capacity);
                Ok(WindowSolution {
                    objective: self.objective_value(solar, battery),
                    solar_capacity_kw: solar,
                    battery_capacity_kwh: battery,
                    trajectory: BatteryTrajectory::empty(),
                })
            }
            Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => {
                Err(SolveFailure::NoOptimum)
            }
            Err(other) => Err(SolveFailure::Engine(format!("{other:?}"))),
        }
    }

    /// The objective is affine in the two capacities, so its value is
    /// recomputed from them rather than queried from the backend.
    fn objective_value(&self, solar_kw: f64, battery_kwh: f64) -> f64 {
        self.array_value_per_kw() * solar_kw - self.config.battery_cost * battery_kwh
    }

    fn extract(
        &self,
        solution: &impl Solution,
        solar_capacity: Variable,
        battery_capacity: Variable,
        hours: &HourVariables,
    ) -> WindowSolution {
        let values = |vars: &[Variable]| -> Vec<f64> {
            vars.iter().map(|&v| solution.value(v)).collect()
        };
        let flags = |vars: &[Variable]| -> Vec<bool> {
            vars.iter().map(|&v| solution.value(v) > 0.5).collect()
        };
        let solar = solution.value(solar_capacity);
        let battery = solution.value(battery_capacity);
        WindowSolution {
            objective: self.objective_value(solar, battery),
            solar_capacity_kw: solar,
            battery_capacity_kwh: battery,
            trajectory: BatteryTrajectory {
                charge_level: values(&hours.charge_level),
                charge_in: values(&hours.charge_in),
                charge_out: values(&hours.charge_out),
                charging: flags(&hours.charging),
                discharging: flags(&hours.discharging),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rate parameters chosen so a kW of array has positive lifetime value even
    // on tiny synthetic datasets.
    fn test_config() -> SizingConfig {
        SizingConfig {
            retail_rate: 50.0,
            rate_growth: 1.0,
            system_lifespan: 1,
            area_per_kw: 1.0,
            roof_area: 100.0,
            ..SizingConfig::default()
        }
    }

    #[test]
    fn balanced_window_needs_no_battery() {
        // Production matches usage every hour and the net-metering cap binds
        // exactly at 1 kW.
        let config = test_config();
        let production = vec![1.0; 24];
        let usage = vec![1.0; 24];
        let model = CapacityModel::new(&config, 8760.0, 8760.0);

        let solution = model
            .solve_window(&production, &usage, good_lp::scip)
            .unwrap();
        assert!((solution.solar_capacity_kw - 1.0).abs() < 1e-4);
        assert!(solution.battery_capacity_kwh.abs() < 1e-4);
    }

    #[test]
    fn larger_roof_never_shrinks_the_array() {
        let production = vec![1.0; 6];
        let usage = vec![0.1; 6];

        let mut small = test_config();
        small.roof_area = 2.0;
        let mut large = small.clone();
        large.roof_area = 5.0;

        // Net-metering cap well above the area cap so the roof binds.
        let solar_small = CapacityModel::new(&small, 1400.0, 14000.0)
            .solve_window(&production, &usage, good_lp::scip)
            .unwrap()
            .solar_capacity_kw;
        let solar_large = CapacityModel::new(&large, 1400.0, 14000.0)
            .solve_window(&production, &usage, good_lp::scip)
            .unwrap()
            .solar_capacity_kw;

        assert!(solar_large >= solar_small - 1e-6);
        assert!((solar_small - 2.0).abs() < 1e-4);
        assert!((solar_large - 5.0).abs() < 1e-4);
    }

    #[test]
    fn deficit_window_respects_floor_and_mutual_exclusion() {
        // No production at all: the battery must carry four hours of load
        // while staying above the 50% reserve floor.
        let config = SizingConfig {
            area_per_kw: 1.0,
            roof_area: 100.0,
            ..SizingConfig::default()
        };
        let production = vec![0.0; 4];
        let usage = vec![1.0; 4];
        let model = CapacityModel::new(&config, 0.0, 4.0);

        let solution = model
            .solve_window(&production, &usage, good_lp::scip)
            .unwrap();

        let capacity = solution.battery_capacity_kwh;
        let floor = config.min_charge_fraction * capacity;
        let eps = 1e-5;
        for t in 0..4 {
            let level = solution.trajectory.charge_level[t];
            assert!(level >= floor - eps, "hour {t}: level {level} below floor {floor}");
            assert!(level <= capacity + eps, "hour {t}: level {level} above capacity");
            assert!(
                !(solution.trajectory.charging[t] && solution.trajectory.discharging[t]),
                "hour {t}: charging and discharging at once"
            );
        }
        // Full at hour 0, then three hours of discharge down to the floor.
        assert!((capacity - 6.0).abs() < 1e-3);
    }

    #[test]
    fn capped_battery_makes_a_shortfall_window_infeasible() {
        let config = SizingConfig {
            roof_area: 0.0,
            battery_capacity_max: Some(0.0),
            ..SizingConfig::default()
        };
        let model = CapacityModel::new(&config, 0.0, 5.0);

        let result = model.solve_window(&[0.0], &[5.0], good_lp::scip);
        assert!(matches!(result, Err(SolveFailure::NoOptimum)));
    }

    #[test]
    fn worst_window_lp_sizes_battery_to_the_deficit() {
        let config = SizingConfig {
            roof_area: 0.0,
            ..SizingConfig::default()
        };
        let model = CapacityModel::new(&config, 0.0, 9.0);

        let solution = model
            .solve_worst_window(&[0.0, 0.0], &[4.0, 5.0], good_lp::scip)
            .unwrap();
        assert!(solution.solar_capacity_kw.abs() < 1e-6);
        assert!((solution.battery_capacity_kwh - 9.0).abs() < 1e-4);
        assert!(solution.trajectory.charge_level.is_empty());
    }
}
