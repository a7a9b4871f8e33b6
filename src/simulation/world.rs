//! Simulation world and the periodic loop that drives it
//!
//! `SimWorld` owns the two ordered agent collections and the random source.
//! `SimulationLoop` advances the world one tick at a time, hands every
//! resulting snapshot to an observer and sleeps between ticks.

use log::{debug, info};
use std::time::Duration;

use super::random::{RandomSource, StdRandom};
use super::road_segment::{RoadSegment, SegmentUpdate};
use super::snapshot::{LightSnapshot, SegmentSnapshot, Snapshot, SnapshotObserver};
use super::traffic_light::{LightDecision, TrafficLight};
use super::types::{check_inflow, InflowError, InflowRange, SegmentStatus};

/// Default signed inflow range applied to every segment each tick
pub const DEFAULT_SEGMENT_INFLOW: InflowRange = InflowRange::new(-30, 50);

/// Default arrival range added to every light's queue each tick
pub const DEFAULT_LIGHT_INFLOW: InflowRange = InflowRange::new(10, 60);

/// Default pause between ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Per-agent results of a single tick, in configuration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub segments: Vec<SegmentUpdate>,
    pub lights: Vec<LightDecision>,
}

/// The simulated network: road segments, traffic lights and the random source
pub struct SimWorld<R = StdRandom> {
    /// All road segments, in configuration order
    pub segments: Vec<RoadSegment>,

    /// All traffic lights, in configuration order
    pub lights: Vec<TrafficLight>,

    /// Signed inflow drawn for each segment per tick
    segment_inflow: InflowRange,

    /// Arrivals drawn for each light per tick
    light_inflow: InflowRange,

    /// Ticks completed so far
    tick: u64,

    rng: R,
}

impl<R: RandomSource> SimWorld<R> {
    pub fn new(segments: Vec<RoadSegment>, lights: Vec<TrafficLight>, rng: R) -> Self {
        Self {
            segments,
            lights,
            segment_inflow: DEFAULT_SEGMENT_INFLOW,
            light_inflow: DEFAULT_LIGHT_INFLOW,
            tick: 0,
            rng,
        }
    }

    /// Replace the inflow ranges. Both are checked before the world accepts them.
    pub fn with_inflow(
        mut self,
        segment_inflow: InflowRange,
        light_inflow: InflowRange,
    ) -> Result<Self, InflowError> {
        check_inflow(segment_inflow, light_inflow)?;
        self.segment_inflow = segment_inflow;
        self.light_inflow = light_inflow;
        Ok(self)
    }

    pub fn segment_inflow(&self) -> InflowRange {
        self.segment_inflow
    }

    pub fn light_inflow(&self) -> InflowRange {
        self.light_inflow
    }

    /// Number of ticks completed
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Advance the world by one tick.
    ///
    /// Segments are perturbed and updated first, one after another, then
    /// lights. Each agent draws its inflow before running its own rule.
    pub fn tick(&mut self) -> TickReport {
        let mut segment_updates = Vec::with_capacity(self.segments.len());
        for segment in &mut self.segments {
            let delta = self
                .rng
                .int_inclusive(self.segment_inflow.min, self.segment_inflow.max);
            segment.apply_inflow(delta);
            segment_updates.push(segment.update_state(&mut self.rng));
        }

        let mut light_decisions = Vec::with_capacity(self.lights.len());
        for light in &mut self.lights {
            let arrivals = self
                .rng
                .int_inclusive(self.light_inflow.min, self.light_inflow.max)
                .max(0);
            light.add_arrivals(u32::try_from(arrivals).unwrap_or(u32::MAX));
            light_decisions.push(light.decide_action(&mut self.rng));
        }

        self.tick += 1;
        self.log_tick_summary();

        TickReport {
            tick: self.tick,
            segments: segment_updates,
            lights: light_decisions,
        }
    }

    /// Read-only view of every agent as of the last completed tick
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            segments: self.segments.iter().map(SegmentSnapshot::from).collect(),
            lights: self.lights.iter().map(LightSnapshot::from).collect(),
        }
    }

    fn log_tick_summary(&self) {
        let count = |status: SegmentStatus| self.segments.iter().filter(|s| s.status == status).count();
        let total_queue: u64 = self.lights.iter().map(|l| u64::from(l.queue)).sum();
        debug!(
            "Tick {}: {} flowing, {} congested, {} gridlocked, total queue {}",
            self.tick,
            count(SegmentStatus::Flowing),
            count(SegmentStatus::Congested),
            count(SegmentStatus::Gridlocked),
            total_queue
        );
    }
}

/// Lifecycle of the simulation loop. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Drives a `SimWorld` forward and publishes a snapshot after every tick
pub struct SimulationLoop<R, O> {
    world: SimWorld<R>,
    observer: O,
    interval: Duration,
    state: LoopState,
}

impl<R: RandomSource, O: SnapshotObserver> SimulationLoop<R, O> {
    pub fn new(world: SimWorld<R>, observer: O) -> Self {
        Self {
            world,
            observer,
            interval: DEFAULT_TICK_INTERVAL,
            state: LoopState::Running,
        }
    }

    /// Pause between ticks
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn world(&self) -> &SimWorld<R> {
        &self.world
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Give back the world and the observer
    pub fn into_parts(self) -> (SimWorld<R>, O) {
        (self.world, self.observer)
    }

    /// Run one tick and publish the resulting snapshot. Does nothing once stopped.
    pub fn step(&mut self) -> Option<TickReport> {
        if self.state == LoopState::Stopped {
            return None;
        }
        let report = self.world.tick();
        let snapshot = self.world.snapshot();
        self.observer.publish(&snapshot);
        Some(report)
    }

    /// Tick, publish, sleep, repeat.
    ///
    /// With `max_ticks` of `None` this only returns when the process is
    /// terminated. Otherwise the loop stops after that many ticks, without
    /// sleeping after the last one, and returns the number of ticks run.
    pub fn run(&mut self, max_ticks: Option<u64>) -> u64 {
        info!(
            "Simulation running: {} segments, {} lights, {}ms per tick",
            self.world.segments.len(),
            self.world.lights.len(),
            self.interval.as_millis()
        );

        let mut ticks_run = 0;
        while self.state == LoopState::Running {
            if max_ticks.is_some_and(|limit| ticks_run >= limit) {
                break;
            }
            self.step();
            ticks_run += 1;

            if max_ticks.is_some_and(|limit| ticks_run >= limit) {
                break;
            }
            if !self.interval.is_zero() {
                std::thread::sleep(self.interval);
            }
        }

        self.state = LoopState::Stopped;
        info!("Simulation stopped after {} ticks", ticks_run);
        ticks_run
    }
}
