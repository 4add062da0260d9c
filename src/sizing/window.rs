use crate::error::SizingError;
use crate::input::TimeSeries;

/// Reject horizons the series cannot support. A horizon longer than the year
/// would silently truncate; zero-length windows have no meaning either.
pub fn check_horizon(len: usize, horizon: usize) -> Result<(), SizingError> {
    if horizon == 0 || horizon > len {
        return Err(SizingError::HorizonOutOfRange { horizon, len });
    }
    Ok(())
}

/// The `horizon` consecutive samples starting at `start`, treating the series
/// as cyclic: indices wrap past year-end back to year-start.
pub fn cyclic_window(values: &[f64], start: usize, horizon: usize) -> Vec<f64> {
    (0..horizon)
        .map(|offset| values[(start + offset) % values.len()])
        .collect()
}

/// Start index of the window with the largest `sum(usage) - sum(production)`
/// deficit. This is the single window the heuristic mode solves against.
pub fn max_deficit_start(
    production: &TimeSeries,
    usage: &TimeSeries,
    horizon: usize,
) -> Result<usize, SizingError> {
    check_horizon(production.len(), horizon)?;

    let mut best_start = 0;
    let mut best_deficit = f64::NEG_INFINITY;
    for start in 0..usage.len() {
        let usage_sum: f64 = cyclic_window(usage.values(), start, horizon).iter().sum();
        let production_sum: f64 = cyclic_window(production.values(), start, horizon)
            .iter()
            .sum();
        let deficit = usage_sum - production_sum;
        if deficit > best_deficit {
            best_deficit = deficit;
            best_start = start;
        }
    }
    Ok(best_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_wraps_past_year_end() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        // Start at the last sample: the rest of the window comes from the
        // beginning of the series.
        assert_eq!(cyclic_window(&values, 9, 4), vec![9.0, 0.0, 1.0, 2.0]);
        assert_eq!(cyclic_window(&values, 0, 3), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn every_start_yields_a_full_window() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        for start in 0..values.len() {
            assert_eq!(cyclic_window(&values, start, 3).len(), 3);
        }
    }

    #[test]
    fn oversized_horizon_is_a_configuration_error() {
        assert!(matches!(
            check_horizon(10, 11),
            Err(SizingError::HorizonOutOfRange { horizon: 11, len: 10 })
        ));
        assert!(matches!(
            check_horizon(10, 0),
            Err(SizingError::HorizonOutOfRange { horizon: 0, len: 10 })
        ));
        assert!(check_horizon(10, 10).is_ok());
    }

    #[test]
    fn deficit_locator_finds_the_worst_span() {
        let production = TimeSeries::new(vec![0.0; 8]);
        let usage = TimeSeries::new(vec![0.0, 0.0, 0.0, 4.0, 5.0, 0.0, 0.0, 0.0]);
        assert_eq!(max_deficit_start(&production, &usage, 2).unwrap(), 3);
    }

    #[test]
    fn deficit_locator_accounts_for_production() {
        let production = TimeSeries::new(vec![0.0, 0.0, 10.0, 10.0]);
        let usage = TimeSeries::new(vec![5.0, 5.0, 6.0, 6.0]);
        // The later span uses more but produces far more; the deficit peaks at
        // the start of the series.
        assert_eq!(max_deficit_start(&production, &usage, 2).unwrap(), 0);
    }
}
