pub mod plot;

use crate::sizing::config::SizingConfig;
use crate::sizing::scenario::Scenario;

/// Render one scenario as the human-readable summary block.
pub fn format_scenario(config: &SizingConfig, scenario: &Scenario, annual_usage: f64) -> String {
    let solution = &scenario.solution;
    let solar_price = solution.solar_capacity_kw * config.array_cost;
    let battery_price = solution.battery_capacity_kwh * config.battery_cost;

    let mut out = String::new();
    out.push_str(&format!(
        "=== {} (window starting hour {}) ===\n",
        scenario.name, scenario.window_index
    ));
    out.push_str(&format!("Total annual energy usage: {:.3} kWh\n", annual_usage));
    out.push_str(&format!(
        "Objective value = ${:.2} saved over {} year span.\n",
        solution.objective, config.system_lifespan
    ));
    out.push_str(&format!("Solar Capacity = {:.3} kW\n", solution.solar_capacity_kw));
    out.push_str(&format!(
        "Battery Capacity = {:.3} kWh\n",
        solution.battery_capacity_kwh
    ));
    out.push_str(&format!("Cost of solar modules = ${:.2}\n", solar_price));
    out.push_str(&format!("Cost of batteries = ${:.2}\n", battery_price));
    out
}

pub fn print_scenario(config: &SizingConfig, scenario: &Scenario, annual_usage: f64) {
    println!("{}", format_scenario(config, scenario, annual_usage));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::model::{BatteryTrajectory, WindowSolution};

    #[test]
    fn summary_includes_capacities_and_costs() {
        let config = SizingConfig::default();
        let scenario = Scenario {
            name: "worst_case",
            window_index: 8487,
            solution: WindowSolution {
                objective: 1234.5,
                solar_capacity_kw: 2.0,
                battery_capacity_kwh: 10.0,
                trajectory: BatteryTrajectory::empty(),
            },
        };

        let text = format_scenario(&config, &scenario, 9000.0);
        assert!(text.contains("worst_case"));
        assert!(text.contains("hour 8487"));
        assert!(text.contains("Solar Capacity = 2.000 kW"));
        assert!(text.contains("Battery Capacity = 10.000 kWh"));
        // 2 kW at $2900/kW and 10 kWh at $345/kWh.
        assert!(text.contains("$5800.00"));
        assert!(text.contains("$3450.00"));
    }
}
