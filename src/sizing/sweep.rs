use good_lp::{ResolutionError, Solver, SolverModel};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::error::SizingError;
use crate::input::TimeSeries;
use crate::sizing::config::SizingConfig;
use crate::sizing::model::{BatteryTrajectory, CapacityModel, SolveFailure, WindowSolution};
use crate::sizing::window::{check_horizon, cyclic_window, max_deficit_start};

/// How much of the year to solve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    /// One mixed-integer solve per window start, every hour of the year.
    FullYear,
    /// A single LP against the window with the largest usage deficit.
    WorstWindow,
}

/// Per-window results of a sweep, as parallel arrays keyed by window start
/// index. Unsolved windows (infeasible, or a backend failure) hold `None`.
///
/// This is also the on-disk cache format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub horizon: usize,
    pub objective: Vec<Option<f64>>,
    pub solar_capacity_kw: Vec<Option<f64>>,
    pub battery_capacity_kwh: Vec<Option<f64>>,
    pub trajectories: Vec<Option<BatteryTrajectory>>,
}

impl SweepResult {
    fn empty(horizon: usize, len: usize) -> Self {
        Self {
            horizon,
            objective: vec![None; len],
            solar_capacity_kw: vec![None; len],
            battery_capacity_kwh: vec![None; len],
            trajectories: vec![None; len],
        }
    }

    fn set(&mut self, index: usize, solution: WindowSolution) {
        self.objective[index] = Some(solution.objective);
        self.solar_capacity_kw[index] = Some(solution.solar_capacity_kw);
        self.battery_capacity_kwh[index] = Some(solution.battery_capacity_kwh);
        self.trajectories[index] = Some(solution.trajectory);
    }

    /// Number of window start indices covered by the sweep.
    pub fn len(&self) -> usize {
        self.objective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objective.is_empty()
    }

    /// Reassemble the solution for one window, if it was solved.
    pub fn solution(&self, index: usize) -> Option<WindowSolution> {
        Some(WindowSolution {
            objective: self.objective.get(index).copied().flatten()?,
            solar_capacity_kw: self.solar_capacity_kw.get(index).copied().flatten()?,
            battery_capacity_kwh: self.battery_capacity_kwh.get(index).copied().flatten()?,
            trajectory: self.trajectories.get(index)?.clone()?,
        })
    }

    pub fn solved_count(&self) -> usize {
        self.objective.iter().filter(|o| o.is_some()).count()
    }

    pub fn unsolved_count(&self) -> usize {
        self.len() - self.solved_count()
    }
}

/// Drives the capacity model across the year and aggregates per-window
/// solutions, optionally persisting them so a rerun skips the solves.
pub struct ScenarioSweeper<'a> {
    config: &'a SizingConfig,
    production: &'a TimeSeries,
    usage: &'a TimeSeries,
    cache_path: Option<PathBuf>,
}

impl<'a> ScenarioSweeper<'a> {
    pub fn new(
        config: &'a SizingConfig,
        production: &'a TimeSeries,
        usage: &'a TimeSeries,
    ) -> Self {
        Self {
            config,
            production,
            usage,
            cache_path: None,
        }
    }

    /// Persist full-year sweeps to `path` and reload them on a later run.
    /// Delete the file to force recomputation after a parameter change.
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn run<S>(&self, mode: SweepMode, solver: S) -> Result<SweepResult, SizingError>
    where
        S: Solver + Copy + Send + Sync,
        S::Model: SolverModel<Error = ResolutionError>,
    {
        if self.production.len() != self.usage.len() {
            return Err(SizingError::SeriesLengthMismatch {
                production: self.production.len(),
                usage: self.usage.len(),
            });
        }
        let horizon = self.config.outage_horizon_hours;
        check_horizon(self.usage.len(), horizon)?;

        match mode {
            SweepMode::FullYear => self.run_full_year(solver),
            SweepMode::WorstWindow => self.run_worst_window(solver),
        }
    }

    fn model(&self) -> CapacityModel<'_> {
        CapacityModel::new(self.config, self.production.total(), self.usage.total())
    }

    fn run_full_year<S>(&self, solver: S) -> Result<SweepResult, SizingError>
    where
        S: Solver + Copy + Send + Sync,
        S::Model: SolverModel<Error = ResolutionError>,
    {
        let n = self.usage.len();
        let horizon = self.config.outage_horizon_hours;

        if let Some(cached) = self.load_cached(n, horizon) {
            info!(windows = cached.len(), "loaded sweep from cache, skipping solves");
            return Ok(cached);
        }

        let model = self.model();
        let started = Instant::now();
        let progress = ProgressBar::new(n as u64);
        let outcomes: Vec<Result<WindowSolution, SolveFailure>> = (0..n)
            .into_par_iter()
            .map(|start| {
                let production = cyclic_window(self.production.values(), start, horizon);
                let usage = cyclic_window(self.usage.values(), start, horizon);
                let outcome = model.solve_window(&production, &usage, solver);
                progress.inc(1);
                outcome
            })
            .collect();
        progress.finish();

        let mut result = SweepResult::empty(horizon, n);
        let mut infeasible = 0usize;
        let mut failed = 0usize;
        for (start, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(solution) => result.set(start, solution),
                Err(SolveFailure::NoOptimum) => {
                    infeasible += 1;
                    warn!(window = start, "window has no optimal solution, skipping");
                }
                Err(SolveFailure::Engine(message)) => {
                    failed += 1;
                    warn!(window = start, %message, "solver backend failed for window");
                }
            }
        }
        info!(
            solved = result.solved_count(),
            infeasible,
            failed,
            elapsed_s = started.elapsed().as_secs_f64(),
            "full-year sweep complete"
        );

        self.store_cached(&result);
        Ok(result)
    }

    fn run_worst_window<S>(&self, solver: S) -> Result<SweepResult, SizingError>
    where
        S: Solver,
        S::Model: SolverModel<Error = ResolutionError>,
    {
        let n = self.usage.len();
        let horizon = self.config.outage_horizon_hours;
        let start = max_deficit_start(self.production, self.usage, horizon)?;
        info!(window = start, "solving single worst-deficit window");

        let production = cyclic_window(self.production.values(), start, horizon);
        let usage = cyclic_window(self.usage.values(), start, horizon);

        let mut result = SweepResult::empty(horizon, n);
        match self.model().solve_worst_window(&production, &usage, solver) {
            Ok(solution) => result.set(start, solution),
            Err(SolveFailure::NoOptimum) => {
                warn!(window = start, "worst-deficit window has no optimal solution");
            }
            Err(SolveFailure::Engine(message)) => return Err(SizingError::Engine(message)),
        }
        Ok(result)
    }

    /// A readable cache that matches the current dataset shape is a hit;
    /// anything else (absent, corrupt, stale shape) is a miss.
    fn load_cached(&self, len: usize, horizon: usize) -> Option<SweepResult> {
        let path = self.cache_path.as_deref()?;
        if !path.exists() {
            return None;
        }
        match read_sweep_cache(path) {
            Ok(cached) if cached.len() == len && cached.horizon == horizon => Some(cached),
            Ok(_) => {
                warn!(path = %path.display(), "sweep cache does not match dataset, recomputing");
                None
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "sweep cache unreadable, recomputing");
                None
            }
        }
    }

    fn store_cached(&self, result: &SweepResult) {
        let Some(path) = self.cache_path.as_deref() else {
            return;
        };
        if let Err(error) = write_sweep_cache(path, result) {
            warn!(path = %path.display(), %error, "failed to persist sweep cache");
        }
    }
}

pub fn read_sweep_cache(path: &Path) -> anyhow::Result<SweepResult> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn write_sweep_cache(path: &Path, result: &SweepResult) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), result)?;
    Ok(())
}
