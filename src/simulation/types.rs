//! Core types for the traffic agent simulation
//!
//! Identifiers, coordinates, status tiers and the signal colors handed to
//! the rendering side. Nothing in here knows how anything is drawn.

use serde::Deserialize;

/// Vehicle count a segment may hold beyond its nominal capacity
pub const SEGMENT_OVERFLOW_ALLOWANCE: u32 = 200;

/// Shortest green phase a light may be set to, in seconds
pub const MIN_GREEN_TIME: u32 = 20;

/// Longest green phase a light may be set to, in seconds
pub const MAX_GREEN_TIME: u32 = 90;

/// Identifier of a road segment (e.g. "S1")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentId(pub String);

/// Identifier of a traffic light (e.g. "TL1")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LightId(pub String);

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl std::fmt::Display for LightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Congestion tier of a road segment, derived from density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Flowing,
    Congested,
    Gridlocked,
}

impl SegmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SegmentStatus::Flowing => "Flowing",
            SegmentStatus::Congested => "Congested",
            SegmentStatus::Gridlocked => "Gridlocked",
        }
    }
}

/// Queue tier of a traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightStatus {
    Flowing,
    Stable,
    Draining,
}

impl LightStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LightStatus::Flowing => "Flowing",
            LightStatus::Stable => "Stable",
            LightStatus::Draining => "Draining",
        }
    }
}

/// Color signal emitted alongside a status for the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl SignalColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalColor::Green => "green",
            SignalColor::Yellow => "yellow",
            SignalColor::Orange => "orange",
            SignalColor::Red => "red",
        }
    }
}

/// Clamp a (possibly negative) vehicle count into `[0, capacity + 200]`
pub fn clamp_vehicle_count(count: i64, capacity: u32) -> u32 {
    let ceiling = i64::from(capacity) + i64::from(SEGMENT_OVERFLOW_ALLOWANCE);
    u32::try_from(count.clamp(0, ceiling)).unwrap_or(u32::MAX)
}

/// Clamp a green time into `[MIN_GREEN_TIME, MAX_GREEN_TIME]`
pub fn clamp_green_time(green_time: i64) -> u32 {
    green_time.clamp(i64::from(MIN_GREEN_TIME), i64::from(MAX_GREEN_TIME)) as u32
}

/// Inclusive integer range an inflow draw is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InflowRange {
    pub min: i64,
    pub max: i64,
}

impl InflowRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Check the range is non-empty and within `±MAX_INFLOW_MAGNITUDE`
    pub fn check(&self, which: &'static str) -> Result<(), InflowError> {
        if self.min > self.max {
            return Err(InflowError::Empty {
                which,
                min: self.min,
                max: self.max,
            });
        }
        if self.min < -MAX_INFLOW_MAGNITUDE || self.max > MAX_INFLOW_MAGNITUDE {
            return Err(InflowError::OutOfBounds {
                which,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Largest absolute inflow a single draw may produce
pub const MAX_INFLOW_MAGNITUDE: i64 = u32::MAX as i64;

/// A segment or light inflow range that cannot drive a tick
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InflowError {
    #[error("{which} inflow range is empty: min {min} > max {max}")]
    Empty {
        which: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{which} inflow range [{min}, {max}] exceeds the u32 range")]
    OutOfBounds {
        which: &'static str,
        min: i64,
        max: i64,
    },

    #[error("light inflow cannot be negative (min {min})")]
    NegativeArrivals { min: i64 },
}

/// Check both inflow ranges a world draws from each tick
pub fn check_inflow(segment: InflowRange, light: InflowRange) -> Result<(), InflowError> {
    segment.check("segment")?;
    light.check("light")?;
    if light.min < 0 {
        return Err(InflowError::NegativeArrivals { min: light.min });
    }
    Ok(())
}
