//! Road segment agent
//!
//! A segment watches its own vehicle count and reclassifies itself every
//! tick. Speed follows the tier's target speed through an exponential moving
//! average, so crossing a threshold never makes the speed jump.

use log::{trace, warn};

use super::random::RandomSource;
use super::types::{clamp_vehicle_count, Coord, SegmentId, SegmentStatus, SignalColor};

/// Density above which a segment is gridlocked
pub const GRIDLOCK_DENSITY: f64 = 0.85;
/// Density above which a segment is congested
pub const CONGESTION_DENSITY: f64 = 0.65;

/// Target speed range (km/h) while gridlocked
pub const GRIDLOCKED_SPEED: (f64, f64) = (5.0, 15.0);
/// Target speed range (km/h) while congested
pub const CONGESTED_SPEED: (f64, f64) = (15.0, 25.0);
/// Target speed range (km/h) while flowing
pub const FLOWING_SPEED: (f64, f64) = (30.0, 45.0);

/// Weight kept from the previous average speed each tick
pub const SPEED_SMOOTHING: f64 = 0.8;
/// Weight given to the freshly drawn target speed each tick
pub const TARGET_SPEED_WEIGHT: f64 = 0.2;

/// Outcome of one `update_state` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentUpdate {
    pub status: SegmentStatus,
    pub color: SignalColor,
    pub density: f64,
    pub target_speed: f64,
    pub avg_speed: f64,
}

/// Classify a density into its status tier, color and target speed range
pub fn classify_density(density: f64) -> (SegmentStatus, SignalColor, (f64, f64)) {
    if density > GRIDLOCK_DENSITY {
        (SegmentStatus::Gridlocked, SignalColor::Red, GRIDLOCKED_SPEED)
    } else if density > CONGESTION_DENSITY {
        (SegmentStatus::Congested, SignalColor::Orange, CONGESTED_SPEED)
    } else {
        (SegmentStatus::Flowing, SignalColor::Green, FLOWING_SPEED)
    }
}

/// A road segment in the simulated network
#[derive(Debug, Clone)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub name: String,
    /// Length in meters
    pub length: u32,
    /// Nominal vehicle capacity, always non-zero
    pub capacity: u32,
    pub endpoints: (Coord, Coord),
    pub vehicle_count: u32,
    /// Average speed in km/h
    pub avg_speed: f64,
    pub status: SegmentStatus,
    /// Color from the last update
    pub color: SignalColor,
}

impl RoadSegment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SegmentId,
        name: impl Into<String>,
        length: u32,
        capacity: u32,
        endpoints: (Coord, Coord),
        vehicle_count: u32,
        avg_speed: f64,
        status: SegmentStatus,
    ) -> Self {
        let color = match status {
            SegmentStatus::Flowing => SignalColor::Green,
            SegmentStatus::Congested => SignalColor::Orange,
            SegmentStatus::Gridlocked => SignalColor::Red,
        };
        Self {
            id,
            name: name.into(),
            length,
            capacity,
            endpoints,
            vehicle_count: clamp_vehicle_count(i64::from(vehicle_count), capacity),
            avg_speed,
            status,
            color,
        }
    }

    /// Vehicle count relative to capacity. Derived on demand, never stored.
    pub fn density(&self) -> f64 {
        f64::from(self.vehicle_count) / f64::from(self.capacity)
    }

    /// Add a signed inflow to the vehicle count, clamped to `[0, capacity + 200]`
    pub fn apply_inflow(&mut self, delta: i64) {
        let count = i64::from(self.vehicle_count).saturating_add(delta);
        self.vehicle_count = clamp_vehicle_count(count, self.capacity);
    }

    /// Reclassify the segment from its current density and move the average
    /// speed a fifth of the way towards a target drawn from the tier's range.
    pub fn update_state<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> SegmentUpdate {
        let density = self.density();
        let (status, color, (low, high)) = classify_density(density);
        let target_speed = rng.float_range(low, high);

        self.avg_speed = SPEED_SMOOTHING * self.avg_speed + TARGET_SPEED_WEIGHT * target_speed;

        if status == SegmentStatus::Gridlocked && self.status != SegmentStatus::Gridlocked {
            warn!("Segment {} ({}) is gridlocked at density {:.2}", self.id, self.name, density);
        }
        self.status = status;
        self.color = color;

        trace!(
            "Segment {}: density={:.3} status={} target={:.1} avg={:.1}",
            self.id,
            density,
            status.label(),
            target_speed,
            self.avg_speed
        );

        SegmentUpdate {
            status,
            color,
            density,
            target_speed,
            avg_speed: self.avg_speed,
        }
    }
}
