use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One year of hourly samples with a precomputed annual total.
///
/// Immutable once constructed; both the sweep driver and the capacity model
/// only ever read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    values: Vec<f64>,
    total: f64,
}

impl TimeSeries {
    /// Build a series whose total is the sum of its samples.
    pub fn new(values: Vec<f64>) -> Self {
        let total = values.iter().sum();
        Self { values, total }
    }

    /// Build a series with an externally supplied annual total (PVWatts files
    /// carry the total as a trailing row rather than leaving it to be summed).
    pub fn with_total(values: Vec<f64>, total: f64) -> Self {
        Self { values, total }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Number of header lines before the hourly rows in a PVWatts export.
const PVWATTS_HEADER_LINES: usize = 18;
/// Number of header lines before the hourly rows in a utility usage export.
const USAGE_HEADER_LINES: usize = 6;

/// Read hourly per-kW production from a PVWatts hourly CSV export.
///
/// The last column holds production in W; values are converted to kW. The
/// final data row is the annual total, not an hourly sample, and becomes the
/// series total.
pub fn read_pvwatts(path: impl AsRef<Path>) -> Result<TimeSeries> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut production = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
        if line_num < PVWATTS_HEADER_LINES || line.trim().is_empty() {
            continue;
        }
        let field = line
            .rsplit(',')
            .next()
            .with_context(|| format!("Empty row on line {}", line_num + 1))?;
        let watts: f64 = field.trim().parse().with_context(|| {
            format!(
                "Could not parse production value on line {}: '{}'",
                line_num + 1,
                field
            )
        })?;
        production.push(watts / 1000.0);
    }

    // Trailing row is the annual total.
    let total = production
        .pop()
        .context("PVWatts file contains no data rows")?;
    Ok(TimeSeries::with_total(production, total))
}

/// Read hourly consumption (kWh) from a utility usage CSV export.
///
/// The kWh reading sits in the third column from the end of each row.
pub fn read_usage(path: impl AsRef<Path>) -> Result<TimeSeries> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut usage = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
        if line_num < USAGE_HEADER_LINES || line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 3 {
            anyhow::bail!(
                "Invalid usage row on line {}: expected at least 3 columns, got {}",
                line_num + 1,
                fields.len()
            );
        }
        let field = fields[fields.len() - 3];
        let kwh: f64 = field.trim().parse().with_context(|| {
            format!(
                "Could not parse usage value on line {}: '{}'",
                line_num + 1,
                field
            )
        })?;
        usage.push(kwh);
    }

    if usage.is_empty() {
        anyhow::bail!("Usage file contains no data rows");
    }
    Ok(TimeSeries::new(usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn series_total_is_sum_of_samples() {
        let series = TimeSeries::new(vec![1.0, 2.5, 0.5]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.total(), 4.0);
    }

    #[test]
    fn pvwatts_loader_skips_header_and_pops_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pvwatts_hourly.csv");
        let mut file = File::create(&path).unwrap();
        for i in 0..18 {
            writeln!(file, "header {i},meta").unwrap();
        }
        // Hourly rows in W, then the annual-total row.
        writeln!(file, "1,1,0,500").unwrap();
        writeln!(file, "1,2,0,1500").unwrap();
        writeln!(file, "Total,,,2000").unwrap();
        drop(file);

        let series = read_pvwatts(&path).unwrap();
        assert_eq!(series.values(), &[0.5, 1.5]);
        assert_eq!(series.total(), 2.0);
    }

    #[test]
    fn usage_loader_reads_third_column_from_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.csv");
        let mut file = File::create(&path).unwrap();
        for i in 0..6 {
            writeln!(file, "header {i}").unwrap();
        }
        writeln!(file, "2021-01-01,00:00,1.25,x,y").unwrap();
        writeln!(file, "2021-01-01,01:00,0.75,x,y").unwrap();
        drop(file);

        let series = read_usage(&path).unwrap();
        assert_eq!(series.values(), &[1.25, 0.75]);
        assert_eq!(series.total(), 2.0);
    }

    #[test]
    fn malformed_usage_row_is_a_data_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.csv");
        let mut file = File::create(&path).unwrap();
        for i in 0..6 {
            writeln!(file, "header {i}").unwrap();
        }
        writeln!(file, "2021-01-01,00:00,not-a-number,x,y").unwrap();
        drop(file);

        assert!(read_usage(&path).is_err());
    }
}
