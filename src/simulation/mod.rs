//! Traffic agent simulation core
//!
//! Road segment and traffic light agents plus the loop that advances them.
//! Nothing in here renders anything: each tick produces a value-type
//! snapshot that is handed to a `SnapshotObserver`.

mod random;
mod road_segment;
mod snapshot;
mod traffic_light;
mod types;
mod world;

pub use random::{FixedRandom, RandomSource, StdRandom};
pub use road_segment::{
    classify_density, RoadSegment, SegmentUpdate, CONGESTED_SPEED, CONGESTION_DENSITY,
    FLOWING_SPEED, GRIDLOCKED_SPEED, GRIDLOCK_DENSITY, SPEED_SMOOTHING, TARGET_SPEED_WEIGHT,
};
pub use snapshot::{LightSnapshot, SegmentSnapshot, Snapshot, SnapshotObserver};
pub use traffic_light::{
    cars_cleared, GreenAdjustment, LightDecision, TrafficLight, CRITICAL_QUEUE, GREEN_EXTENSION,
    GREEN_REDUCTION, LOW_QUEUE, OUTFLOW_EFFICIENCY,
};
pub use types::{
    check_inflow, clamp_green_time, clamp_vehicle_count, Coord, InflowError, InflowRange, LightId,
    LightStatus, SegmentId, SegmentStatus, SignalColor, MAX_GREEN_TIME, MAX_INFLOW_MAGNITUDE,
    MIN_GREEN_TIME, SEGMENT_OVERFLOW_ALLOWANCE,
};
pub use world::{
    LoopState, SimWorld, SimulationLoop, TickReport, DEFAULT_LIGHT_INFLOW, DEFAULT_SEGMENT_INFLOW,
    DEFAULT_TICK_INTERVAL,
};
