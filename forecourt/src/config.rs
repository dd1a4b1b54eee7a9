use std::convert::TryFrom;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::VehicleCategory;

/// Invalid simulation configuration. These are detected before the simulation starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Duration is neither a number of milliseconds nor a human-readable duration.
    #[error("invalid simulation duration `{0}`: expected milliseconds or a duration such as `90s`")]
    InvalidDuration(String),
    /// Duration is zero.
    #[error("simulation duration must be positive")]
    ZeroDuration,
    /// Queue cannot hold any vehicles.
    #[error("maximum queue length must be positive")]
    ZeroQueueLength,
    /// Dispense rate is zero, negative, not a number, or so low that filling up a tank takes
    /// longer than the clock can represent.
    #[error("dispense rate must be a positive number of litres per millisecond, got {0}")]
    InvalidDispenseRate(f64),
    /// Arrival gaps are zero or the range is inverted.
    #[error("invalid arrival gap range: [{min}ms, {max}ms]")]
    InvalidArrivalGap {
        /// Minimum gap.
        min: u64,
        /// Maximum gap.
        max: u64,
    },
    /// Sweep period is zero.
    #[error("sweep period must be positive")]
    ZeroSweepPeriod,
    /// There are no pumps.
    #[error("forecourt must have at least one lane with at least one pump")]
    EmptyTopology,
    /// Config file cannot be opened.
    #[error("unable to read config file: {}", path.display())]
    Io {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid JSON or has fields of wrong types.
    #[error("unable to parse config file")]
    Parse(#[from] serde_json::Error),
}

/// Simulation duration given either as a number of milliseconds or as a human-readable duration.
///
/// ```
/// # use std::time::Duration;
/// # use forecourt::DurationArg;
/// let arg: DurationArg = "60000".parse().unwrap();
/// assert_eq!(arg.0, Duration::from_secs(60));
/// let arg: DurationArg = "1m 30s".parse().unwrap();
/// assert_eq!(arg.0, Duration::from_secs(90));
/// assert!("soon".parse::<DurationArg>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationArg(pub Duration);

impl FromStr for DurationArg {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let duration = match s.parse::<u64>() {
            Ok(millis) => Duration::from_millis(millis),
            Err(_) => humantime::parse_duration(s)
                .map_err(|_| ConfigError::InvalidDuration(s.to_string()))?,
        };
        if duration == Duration::default() {
            Err(ConfigError::ZeroDuration)
        } else {
            Ok(DurationArg(duration))
        }
    }
}

/// Upper bound on a single service time. Completions are scheduled relative to the current time,
/// which must leave enough room for the sum to stay representable.
#[allow(clippy::cast_precision_loss)]
const MAX_SERVICE_SECS: f64 = (u64::MAX / 2) as f64;

/// Parameters of a simulation run. All times are in milliseconds.
///
/// Fields missing in a config file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// How long the simulation runs.
    pub duration_ms: u64,
    /// Maximum number of vehicles waiting in the queue.
    pub max_queue_length: usize,
    /// How long a vehicle waits in the queue before leaving.
    pub max_queue_wait_ms: u64,
    /// Litres dispensed by a pump per millisecond.
    pub dispense_rate: f64,
    /// Minimum time between two arrivals.
    pub min_arrival_gap_ms: u64,
    /// Maximum time between two arrivals.
    pub max_arrival_gap_ms: u64,
    /// Time between two queue sweeps.
    pub sweep_period_ms: u64,
    /// Number of lanes.
    pub lanes: usize,
    /// Number of pumps in each lane.
    pub pumps_per_lane: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 60_000,
            max_queue_length: 5,
            max_queue_wait_ms: 2000,
            dispense_rate: 0.0015,
            min_arrival_gap_ms: 1500,
            max_arrival_gap_ms: 2200,
            sweep_period_ms: 500,
            lanes: 3,
            pumps_per_lane: 3,
        }
    }
}

impl SimulationConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. The loaded configuration is not
    /// validated; see [`SimulationConfig::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Overrides the duration of the simulation.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration does not fit in 64-bit milliseconds.
    pub fn with_duration(mut self, duration: Duration) -> Result<Self, ConfigError> {
        self.duration_ms = u64::try_from(duration.as_millis()).map_err(|_| {
            ConfigError::InvalidDuration(humantime::format_duration(duration).to_string())
        })?;
        Ok(self)
    }

    /// Checks that the configuration describes a simulation that can run.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.max_queue_length == 0 {
            return Err(ConfigError::ZeroQueueLength);
        }
        if !(self.dispense_rate.is_finite()
            && self.dispense_rate > 0.0
            && self.longest_service_secs() < MAX_SERVICE_SECS)
        {
            return Err(ConfigError::InvalidDispenseRate(self.dispense_rate));
        }
        if self.min_arrival_gap_ms == 0 || self.min_arrival_gap_ms > self.max_arrival_gap_ms {
            return Err(ConfigError::InvalidArrivalGap {
                min: self.min_arrival_gap_ms,
                max: self.max_arrival_gap_ms,
            });
        }
        if self.sweep_period_ms == 0 {
            return Err(ConfigError::ZeroSweepPeriod);
        }
        if self.lanes == 0 || self.pumps_per_lane == 0 {
            return Err(ConfigError::EmptyTopology);
        }
        Ok(())
    }

    /// Seconds it takes to fill up the largest tank from empty.
    fn longest_service_secs(&self) -> f64 {
        let capacity = VehicleCategory::ALL
            .iter()
            .map(|category| category.tank_capacity())
            .max()
            .unwrap_or_default();
        f64::from(capacity) / self.dispense_rate / 1000.0
    }

    /// How long the simulation runs.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// How long a vehicle waits in the queue before leaving.
    #[must_use]
    pub fn max_queue_wait(&self) -> Duration {
        Duration::from_millis(self.max_queue_wait_ms)
    }

    /// Time between two queue sweeps.
    #[must_use]
    pub fn sweep_period(&self) -> Duration {
        Duration::from_millis(self.sweep_period_ms)
    }
}
