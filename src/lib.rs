pub mod error;
pub mod input;
pub mod report;
pub mod sizing;

// Re-export commonly used items for convenience
pub use error::SizingError;
pub use input::{read_pvwatts, read_usage, TimeSeries};
pub use sizing::{
    select_scenarios, BatteryTrajectory, CapacityModel, Scenario, ScenarioSet, ScenarioSweeper,
    SizingConfig, SolveFailure, SweepMode, SweepResult, WindowSolution,
};
