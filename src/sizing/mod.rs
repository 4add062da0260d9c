pub mod config;
pub mod model;
pub mod scenario;
pub mod sweep;
pub mod window;

pub use config::SizingConfig;
pub use model::{BatteryTrajectory, CapacityModel, SolveFailure, WindowSolution};
pub use scenario::{select_scenarios, Scenario, ScenarioSet};
pub use sweep::{ScenarioSweeper, SweepMode, SweepResult};
