//! Recorded datasets for the `classify` command
//!
//! Two layouts are accepted:
//!
//! ```text
//! size,time            {"sizes": [1, 2, 4], "times": [0.5, 1.1, 2.0]}
//! 1,0.5
//! 2,1.1
//! ```
//!
//! CSV may start with a header line; blank lines and `#` comments are skipped.

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizes and matching times, in file order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Input sizes
    pub sizes: Vec<f64>,
    /// Times, one per size
    pub times: Vec<f64>,
}

impl Dataset {
    /// Read and parse a dataset file
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|message| CliError::dataset(path, message))
    }

    /// Parse dataset text, JSON if it starts with `{`, CSV otherwise
    pub fn parse(content: &str) -> Result<Self, String> {
        let dataset = if content.trim_start().starts_with('{') {
            serde_json::from_str(content).map_err(|e| e.to_string())?
        } else {
            Self::parse_csv(content)?
        };
        if dataset.sizes.len() != dataset.times.len() {
            return Err(format!(
                "{} sizes but {} times",
                dataset.sizes.len(),
                dataset.times.len()
            ));
        }
        Ok(dataset)
    }

    fn parse_csv(content: &str) -> Result<Self, String> {
        let mut dataset = Self::default();
        let mut seen_row = false;
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let [size, time] = fields.as_slice() else {
                return Err(format!("line {}: expected two columns", index + 1));
            };
            match (size.parse::<f64>(), time.parse::<f64>()) {
                (Ok(size), Ok(time)) if !(size.is_finite() && time.is_finite()) => {
                    return Err(format!("line {}: value is not finite", index + 1));
                }
                (Ok(size), Ok(time)) => {
                    dataset.sizes.push(size);
                    dataset.times.push(time);
                }
                // Header
                _ if !seen_row => {}
                _ => return Err(format!("line {}: not a number", index + 1)),
            }
            seen_row = true;
        }
        Ok(dataset)
    }

    /// Number of points
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether the dataset has no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
