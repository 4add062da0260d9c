use crate::error::SizingError;
use crate::sizing::model::WindowSolution;
use crate::sizing::sweep::SweepResult;

/// A named window picked out of a sweep for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    pub window_index: usize,
    pub solution: WindowSolution,
}

/// The three reporting scenarios, ranked by required battery capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet {
    pub worst: Scenario,
    pub best: Scenario,
    pub median: Scenario,
}

impl ScenarioSet {
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        [&self.worst, &self.best, &self.median].into_iter()
    }
}

/// Pick the windows demanding the largest, smallest, and median battery.
///
/// Unsolved windows are excluded. The median of an even count is the
/// lower-middle element of the sorted order. Fails only if no window at all
/// was solved.
pub fn select_scenarios(result: &SweepResult) -> Result<ScenarioSet, SizingError> {
    let mut solved: Vec<(usize, f64)> = result
        .battery_capacity_kwh
        .iter()
        .enumerate()
        .filter_map(|(index, capacity)| capacity.map(|c| (index, c)))
        .collect();
    if solved.is_empty() {
        return Err(SizingError::NoScenarios);
    }

    let mut worst = solved[0];
    let mut best = solved[0];
    for &(index, capacity) in &solved[1..] {
        if capacity > worst.1 {
            worst = (index, capacity);
        }
        if capacity < best.1 {
            best = (index, capacity);
        }
    }

    solved.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let median = solved[(solved.len() - 1) / 2];

    let scenario = |name: &'static str, (index, _): (usize, f64)| -> Result<Scenario, SizingError> {
        Ok(Scenario {
            name,
            window_index: index,
            solution: result.solution(index).ok_or(SizingError::NoScenarios)?,
        })
    };
    Ok(ScenarioSet {
        worst: scenario("worst_case", worst)?,
        best: scenario("best_case", best)?,
        median: scenario("median_case", median)?,
    })
}
