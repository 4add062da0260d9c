pub mod time_series;

pub use time_series::{read_pvwatts, read_usage, TimeSeries};
