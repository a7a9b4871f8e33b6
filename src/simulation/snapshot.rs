//! Read-only views of agent state handed to the rendering side each tick

use super::road_segment::RoadSegment;
use super::traffic_light::TrafficLight;
use super::types::{LightId, LightStatus, SegmentId, SegmentStatus, SignalColor};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSnapshot {
    pub id: SegmentId,
    pub name: String,
    pub status: SegmentStatus,
    pub color: SignalColor,
    pub avg_speed: f64,
}

impl From<&RoadSegment> for SegmentSnapshot {
    fn from(segment: &RoadSegment) -> Self {
        Self {
            id: segment.id.clone(),
            name: segment.name.clone(),
            status: segment.status,
            color: segment.color,
            avg_speed: segment.avg_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightSnapshot {
    pub id: LightId,
    pub location: String,
    pub status: LightStatus,
    pub color: SignalColor,
    pub green_time: u32,
    pub queue: u32,
}

impl From<&TrafficLight> for LightSnapshot {
    fn from(light: &TrafficLight) -> Self {
        Self {
            id: light.id.clone(),
            location: light.location.clone(),
            status: light.status,
            color: light.color,
            green_time: light.green_time,
            queue: light.queue,
        }
    }
}

/// Full state of every agent after a tick, in configuration order
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Number of ticks completed; 0 is the configured initial state
    pub tick: u64,
    pub segments: Vec<SegmentSnapshot>,
    pub lights: Vec<LightSnapshot>,
}

/// Receives a fresh snapshot after every tick.
///
/// Each snapshot replaces the previous one entirely. Publishing is
/// fire-and-forget: the loop never waits on, or hears back from, an observer.
pub trait SnapshotObserver {
    fn publish(&mut self, snapshot: &Snapshot);
}

/// Keeps every published snapshot
impl SnapshotObserver for Vec<Snapshot> {
    fn publish(&mut self, snapshot: &Snapshot) {
        self.push(snapshot.clone());
    }
}

/// Discards snapshots
impl SnapshotObserver for () {
    fn publish(&mut self, _snapshot: &Snapshot) {}
}
