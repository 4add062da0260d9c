use plotters::prelude::*;

use crate::sizing::model::BatteryTrajectory;
use crate::sizing::sweep::SweepResult;

/// Plot the battery charge level across one window, with the capacity and
/// reserve floor drawn as reference lines.
pub fn plot_charge_trajectory(
    trajectory: &BatteryTrajectory,
    battery_capacity: f64,
    min_charge_fraction: f64,
    title: &str,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let hours = trajectory.charge_level.len();
    let y_max = (battery_capacity * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..hours.max(1) as f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Hour of window")
        .y_desc("Charge level (kWh)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            trajectory
                .charge_level
                .iter()
                .enumerate()
                .map(|(i, &level)| (i as f64, level)),
            &BLUE,
        ))?
        .label("Charge level")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(
            (0..hours).map(|i| (i as f64, battery_capacity)),
            &BLACK,
        ))?
        .label("Capacity")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLACK));

    chart
        .draw_series(LineSeries::new(
            (0..hours).map(|i| (i as f64, battery_capacity * min_charge_fraction)),
            &RED,
        ))?
        .label("Reserve floor")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Plot the required battery capacity for every solved window start.
pub fn plot_battery_distribution(
    result: &SweepResult,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = result
        .battery_capacity_kwh
        .iter()
        .flatten()
        .fold(0f64, |a, &b| a.max(b))
        .max(1.0)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Required battery capacity per window", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..result.len().max(1) as f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Window start hour")
        .y_desc("Battery capacity (kWh)")
        .draw()?;

    chart.draw_series(
        result
            .battery_capacity_kwh
            .iter()
            .enumerate()
            .filter_map(|(i, capacity)| capacity.map(|c| (i as f64, c)))
            .map(|(x, y)| Circle::new((x, y), 2, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}
