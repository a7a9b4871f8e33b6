//! Adaptive traffic light agent
//!
//! Standalone implementation: the light only sees its own queue and green
//! time. Queue bands are evaluated fresh every tick with no memory of the
//! previous band, so a queue sitting right on a threshold can flip status
//! from one tick to the next.

use log::trace;

use super::random::RandomSource;
use super::types::{clamp_green_time, Coord, LightId, LightStatus, SignalColor};

/// Queue length at or above which the green phase is extended
pub const CRITICAL_QUEUE: u32 = 120;
/// Queue length below which the green phase is shortened
pub const LOW_QUEUE: u32 = 40;

/// Seconds added to the green phase when draining a critical queue
pub const GREEN_EXTENSION: i64 = 10;
/// Seconds removed from the green phase when the queue is low
pub const GREEN_REDUCTION: i64 = 5;

/// Outflow efficiency range; the upper bound is exclusive
pub const OUTFLOW_EFFICIENCY: (f64, f64) = (0.5, 1.0);

/// What the controller did to the green phase this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreenAdjustment {
    Extend,
    Shorten,
    Hold,
}

impl GreenAdjustment {
    pub fn symbol(&self) -> &'static str {
        match self {
            GreenAdjustment::Extend => "++green",
            GreenAdjustment::Shorten => "--green",
            GreenAdjustment::Hold => "hold",
        }
    }
}

/// Outcome of one `decide_action` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightDecision {
    pub action: GreenAdjustment,
    pub status: LightStatus,
    pub color: SignalColor,
    pub previous_green: u32,
    pub green_time: u32,
    pub cars_cleared: u32,
    pub queue: u32,
}

/// Vehicles released during a green phase of `green_time` seconds at the given efficiency
pub fn cars_cleared(green_time: u32, efficiency: f64) -> u32 {
    (f64::from(green_time) * efficiency).floor() as u32
}

/// A traffic light controlling one junction
#[derive(Debug, Clone)]
pub struct TrafficLight {
    pub id: LightId,
    pub location: String,
    pub position: Coord,
    /// Green phase in seconds, always within `[20, 90]`
    pub green_time: u32,
    /// Vehicles waiting at the light
    pub queue: u32,
    pub status: LightStatus,
    /// Color from the last decision
    pub color: SignalColor,
}

impl TrafficLight {
    pub fn new(
        id: LightId,
        location: impl Into<String>,
        position: Coord,
        green_time: u32,
        queue: u32,
        status: LightStatus,
    ) -> Self {
        let color = match status {
            LightStatus::Flowing => SignalColor::Green,
            LightStatus::Stable => SignalColor::Yellow,
            LightStatus::Draining => SignalColor::Red,
        };
        Self {
            id,
            location: location.into(),
            position,
            green_time: clamp_green_time(i64::from(green_time)),
            queue,
            status,
            color,
        }
    }

    /// Vehicles arriving at the light since the last tick
    pub fn add_arrivals(&mut self, arrivals: u32) {
        self.queue = self.queue.saturating_add(arrivals);
    }

    /// Adapt the green phase to the current queue, then release vehicles.
    ///
    /// The adjustment is picked from the queue band; the outflow is a random
    /// fraction in `[0.5, 1.0)` of the (new) green time.
    pub fn decide_action<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> LightDecision {
        let previous_green = self.green_time;

        let (action, status, color) = if self.queue >= CRITICAL_QUEUE {
            self.green_time = clamp_green_time(i64::from(self.green_time) + GREEN_EXTENSION);
            (GreenAdjustment::Extend, LightStatus::Draining, SignalColor::Red)
        } else if self.queue < LOW_QUEUE {
            self.green_time = clamp_green_time(i64::from(self.green_time) - GREEN_REDUCTION);
            (GreenAdjustment::Shorten, LightStatus::Flowing, SignalColor::Green)
        } else {
            (GreenAdjustment::Hold, LightStatus::Stable, SignalColor::Yellow)
        };
        self.status = status;
        self.color = color;

        let efficiency = rng.float_range(OUTFLOW_EFFICIENCY.0, OUTFLOW_EFFICIENCY.1);
        let cleared = cars_cleared(self.green_time, efficiency);
        self.queue = self.queue.saturating_sub(cleared);

        trace!(
            "Light {}: {} green {}s -> {}s, cleared {}, queue {}",
            self.id,
            action.symbol(),
            previous_green,
            self.green_time,
            cleared,
            self.queue
        );

        LightDecision {
            action,
            status,
            color,
            previous_green,
            green_time: self.green_time,
            cars_cleared: cleared,
            queue: self.queue,
        }
    }
}
