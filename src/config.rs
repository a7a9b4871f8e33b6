//! Network configuration
//!
//! The initial topology and agent state are static input, read once before
//! the loop starts. Everything is validated up front so that a running tick
//! never has to deal with a zero capacity or an out-of-range green time.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::simulation::{
    check_inflow, Coord, InflowError, InflowRange, LightId, LightStatus, RandomSource, RoadSegment,
    SegmentId, SegmentStatus, SimWorld, TrafficLight, DEFAULT_LIGHT_INFLOW,
    DEFAULT_SEGMENT_INFLOW, MAX_GREEN_TIME, MIN_GREEN_TIME, SEGMENT_OVERFLOW_ALLOWANCE,
};

/// Errors raised while loading or validating a network configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse network config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("agent with an empty id")]
    EmptyId,

    #[error("duplicate segment id '{id}'")]
    DuplicateSegment { id: String },

    #[error("duplicate light id '{id}'")]
    DuplicateLight { id: String },

    #[error("segment '{id}' has invalid capacity {capacity}, must be positive")]
    InvalidCapacity { id: String, capacity: i64 },

    #[error("segment '{id}' has invalid length {length}, must be positive")]
    InvalidLength { id: String, length: i64 },

    #[error("segment '{id}' starts with {count} vehicles, outside [0, {max}]")]
    VehicleCountOutOfRange { id: String, count: i64, max: i64 },

    #[error("segment '{id}' has invalid average speed {speed}")]
    InvalidSpeed { id: String, speed: f64 },

    #[error("light '{id}' has green time {green_time}s, outside [20, 90]")]
    GreenTimeOutOfRange { id: String, green_time: i64 },

    #[error("light '{id}' has invalid queue {queue}, must not be negative")]
    InvalidQueue { id: String, queue: i64 },

    #[error(transparent)]
    Inflow(#[from] InflowError),
}

/// Loop parameters; every field has a default
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    pub segment_inflow: InflowRange,
    pub light_inflow: InflowRange,
    pub tick_interval_ms: u64,
    /// Fixed seed for a replayable run
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            segment_inflow: DEFAULT_SEGMENT_INFLOW,
            light_inflow: DEFAULT_LIGHT_INFLOW,
            tick_interval_ms: 2000,
            seed: None,
        }
    }
}

impl SimulationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentConfig {
    pub id: String,
    pub name: String,
    pub length: i64,
    pub capacity: i64,
    pub vehicle_count: i64,
    pub avg_speed: f64,
    pub status: SegmentStatus,
    pub start: Coord,
    pub end: Coord,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightConfig {
    pub id: String,
    pub location: String,
    pub green_time: i64,
    pub queue: i64,
    pub status: LightStatus,
    pub position: Coord,
}

/// Ordered segment and light records plus loop settings
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub segments: Vec<SegmentConfig>,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
}

impl NetworkConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: NetworkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check every record. The first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_inflow(self.simulation.segment_inflow, self.simulation.light_inflow)?;

        let mut seen = HashSet::new();
        for segment in &self.segments {
            if segment.id.is_empty() {
                return Err(ConfigError::EmptyId);
            }
            if !seen.insert(segment.id.as_str()) {
                return Err(ConfigError::DuplicateSegment {
                    id: segment.id.clone(),
                });
            }
            segment.validate()?;
        }

        let mut seen = HashSet::new();
        for light in &self.lights {
            if light.id.is_empty() {
                return Err(ConfigError::EmptyId);
            }
            if !seen.insert(light.id.as_str()) {
                return Err(ConfigError::DuplicateLight {
                    id: light.id.clone(),
                });
            }
            light.validate()?;
        }

        Ok(())
    }

    /// Validate and build the world the loop will own
    pub fn build_world<R: RandomSource>(&self, rng: R) -> Result<SimWorld<R>, ConfigError> {
        self.validate()?;

        // Casts below are in range: validate() bounds every value.
        let segments = self
            .segments
            .iter()
            .map(|s| {
                RoadSegment::new(
                    SegmentId(s.id.clone()),
                    s.name.clone(),
                    s.length as u32,
                    s.capacity as u32,
                    (s.start, s.end),
                    s.vehicle_count as u32,
                    s.avg_speed,
                    s.status,
                )
            })
            .collect();

        let lights = self
            .lights
            .iter()
            .map(|l| {
                TrafficLight::new(
                    LightId(l.id.clone()),
                    l.location.clone(),
                    l.position,
                    l.green_time as u32,
                    l.queue as u32,
                    l.status,
                )
            })
            .collect();

        let world = SimWorld::new(segments, lights, rng)
            .with_inflow(self.simulation.segment_inflow, self.simulation.light_inflow)?;
        Ok(world)
    }

    /// The reference network: five roads and four signalised junctions in central Yogyakarta
    pub fn yogyakarta() -> Self {
        let tugu = Coord::new(-7.7829, 110.3670);
        let malioboro_end = Coord::new(-7.8003, 110.3652);
        let gramedia = Coord::new(-7.7836, 110.3777);
        let gejayan_affandi = Coord::new(-7.7754, 110.3916);
        let kaliurang_ringroad = Coord::new(-7.7521, 110.3919);
        let jombor = Coord::new(-7.7483, 110.3619);

        let segment = |id: &str,
                       name: &str,
                       length: i64,
                       capacity: i64,
                       vehicle_count: i64,
                       avg_speed: f64,
                       status: SegmentStatus,
                       start: Coord,
                       end: Coord| SegmentConfig {
            id: id.to_string(),
            name: name.to_string(),
            length,
            capacity,
            vehicle_count,
            avg_speed,
            status,
            start,
            end,
        };

        let light = |id: &str,
                     location: &str,
                     green_time: i64,
                     queue: i64,
                     status: LightStatus,
                     position: Coord| LightConfig {
            id: id.to_string(),
            location: location.to_string(),
            green_time,
            queue,
            status,
            position,
        };

        Self {
            simulation: SimulationSettings::default(),
            segments: vec![
                segment("S1", "Jl. Malioboro", 900, 450, 380, 12.0, SegmentStatus::Congested, tugu, malioboro_end),
                segment("S2", "Jl. Sudirman", 1200, 600, 210, 35.0, SegmentStatus::Flowing, tugu, gramedia),
                segment("S3", "Jl. Gejayan", 1500, 700, 520, 18.0, SegmentStatus::Congested, gramedia, gejayan_affandi),
                segment("S4", "Jl. Kaliurang", 2000, 900, 300, 40.0, SegmentStatus::Flowing, gramedia, kaliurang_ringroad),
                segment("S5", "Jl. Magelang", 2500, 1100, 850, 15.0, SegmentStatus::Gridlocked, tugu, jombor),
            ],
            lights: vec![
                light("TL1", "Malioboro - A. Dahlan", 45, 120, LightStatus::Draining, malioboro_end),
                light("TL2", "Sudirman - Colombo", 35, 80, LightStatus::Stable, gramedia),
                light("TL3", "Gejayan - Affandi", 50, 150, LightStatus::Draining, gejayan_affandi),
                light("TL4", "Kaliurang - Ringroad", 40, 90, LightStatus::Flowing, kaliurang_ringroad),
            ],
        }
    }
}

impl SegmentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity <= 0 || self.capacity > i64::from(u32::MAX - SEGMENT_OVERFLOW_ALLOWANCE) {
            return Err(ConfigError::InvalidCapacity {
                id: self.id.clone(),
                capacity: self.capacity,
            });
        }
        if self.length <= 0 || self.length > i64::from(u32::MAX) {
            return Err(ConfigError::InvalidLength {
                id: self.id.clone(),
                length: self.length,
            });
        }
        let max = self.capacity + i64::from(SEGMENT_OVERFLOW_ALLOWANCE);
        if !(0..=max).contains(&self.vehicle_count) {
            return Err(ConfigError::VehicleCountOutOfRange {
                id: self.id.clone(),
                count: self.vehicle_count,
                max,
            });
        }
        if !self.avg_speed.is_finite() || self.avg_speed < 0.0 {
            return Err(ConfigError::InvalidSpeed {
                id: self.id.clone(),
                speed: self.avg_speed,
            });
        }
        Ok(())
    }
}

impl LightConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(i64::from(MIN_GREEN_TIME)..=i64::from(MAX_GREEN_TIME)).contains(&self.green_time) {
            return Err(ConfigError::GreenTimeOutOfRange {
                id: self.id.clone(),
                green_time: self.green_time,
            });
        }
        if self.queue < 0 || self.queue > i64::from(u32::MAX) {
            return Err(ConfigError::InvalidQueue {
                id: self.id.clone(),
                queue: self.queue,
            });
        }
        Ok(())
    }
}
