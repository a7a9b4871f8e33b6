use std::process::Command;
use std::time::Duration;

use traffic_agents::config::NetworkConfig;
use traffic_agents::render::ConsolePanel;
use traffic_agents::simulation::{
    FixedRandom, InflowError, InflowRange, LightStatus, LoopState, RandomSource, SegmentStatus,
    SimulationLoop, Snapshot, StdRandom, CONGESTED_SPEED, FLOWING_SPEED, MAX_GREEN_TIME,
    MIN_GREEN_TIME, OUTFLOW_EFFICIENCY,
};

/// A single draw request seen by `RecordingRandom`
#[derive(Debug, Clone, Copy, PartialEq)]
enum Draw {
    Int(i64, i64),
    Float(f64, f64),
}

/// Answers every draw with the range minimum and remembers what was asked
#[derive(Default)]
struct RecordingRandom {
    draws: Vec<Draw>,
}

impl RandomSource for RecordingRandom {
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64 {
        self.draws.push(Draw::Int(min, max));
        min
    }

    fn float_range(&mut self, min: f64, max: f64) -> f64 {
        self.draws.push(Draw::Float(min, max));
        min
    }
}

fn run_recorded(seed: u64, ticks: u64) -> Vec<Snapshot> {
    let world = NetworkConfig::yogyakarta()
        .build_world(StdRandom::seeded(seed))
        .expect("built-in network is valid");
    let mut sim = SimulationLoop::new(world, Vec::new()).with_interval(Duration::ZERO);
    sim.run(Some(ticks));
    sim.into_parts().1
}

/// With every draw at its minimum the first tick is fully predictable
#[test]
fn test_first_tick_with_minimum_draws() {
    let mut world = NetworkConfig::yogyakarta()
        .build_world(FixedRandom::minimum())
        .expect("built-in network is valid");

    let report = world.tick();
    assert_eq!(report.tick, 1);

    // Every segment loses 30 vehicles
    let counts: Vec<u32> = world.segments.iter().map(|s| s.vehicle_count).collect();
    assert_eq!(counts, vec![350, 180, 490, 270, 820]);

    let statuses: Vec<SegmentStatus> = report.segments.iter().map(|u| u.status).collect();
    assert_eq!(
        statuses,
        vec![
            SegmentStatus::Congested,
            SegmentStatus::Flowing,
            SegmentStatus::Congested,
            SegmentStatus::Flowing,
            SegmentStatus::Congested,
        ]
    );

    // Every light gains 10 arrivals, then clears half its green time
    let lights: Vec<(LightStatus, u32, u32)> = world
        .lights
        .iter()
        .map(|l| (l.status, l.green_time, l.queue))
        .collect();
    assert_eq!(
        lights,
        vec![
            (LightStatus::Draining, 55, 103),
            (LightStatus::Stable, 35, 73),
            (LightStatus::Draining, 60, 130),
            (LightStatus::Stable, 40, 80),
        ]
    );
}

/// Each segment draws (inflow, target speed), then each light draws (arrivals, efficiency)
#[test]
fn test_tick_draw_order() {
    let mut world = NetworkConfig::yogyakarta()
        .build_world(RecordingRandom::default())
        .expect("built-in network is valid");
    world.tick();

    let congested = Draw::Float(CONGESTED_SPEED.0, CONGESTED_SPEED.1);
    let flowing = Draw::Float(FLOWING_SPEED.0, FLOWING_SPEED.1);
    let inflow = Draw::Int(-30, 50);
    let arrivals = Draw::Int(10, 60);
    let efficiency = Draw::Float(OUTFLOW_EFFICIENCY.0, OUTFLOW_EFFICIENCY.1);

    let expected = vec![
        inflow, congested, // S1
        inflow, flowing, // S2
        inflow, congested, // S3
        inflow, flowing, // S4
        inflow, congested, // S5
        arrivals, efficiency, // TL1
        arrivals, efficiency, // TL2
        arrivals, efficiency, // TL3
        arrivals, efficiency, // TL4
    ];
    assert_eq!(world.rng().draws, expected);

    world.tick();
    assert_eq!(world.rng().draws.len(), 2 * expected.len());
}

#[test]
fn test_world_rejects_unchecked_inflow() {
    let world = || {
        NetworkConfig::yogyakarta()
            .build_world(FixedRandom::minimum())
            .expect("built-in network is valid")
    };

    let err = world()
        .with_inflow(InflowRange::new(5, -5), InflowRange::new(10, 60))
        .err()
        .expect("empty segment range is rejected");
    assert!(matches!(err, InflowError::Empty { which: "segment", .. }));

    let err = world()
        .with_inflow(InflowRange::new(-30, 50), InflowRange::new(-1, 60))
        .err()
        .expect("negative arrivals are rejected");
    assert_eq!(err, InflowError::NegativeArrivals { min: -1 });

    let err = world()
        .with_inflow(InflowRange::new(0, i64::MAX), InflowRange::new(10, 60))
        .err()
        .expect("oversized range is rejected");
    assert!(matches!(err, InflowError::OutOfBounds { .. }));

    let accepted = world()
        .with_inflow(InflowRange::new(-5, 5), InflowRange::new(0, 3))
        .expect("valid ranges are accepted");
    assert_eq!(accepted.segment_inflow(), InflowRange::new(-5, 5));
    assert_eq!(accepted.light_inflow(), InflowRange::new(0, 3));
}

#[test]
fn test_snapshot_keeps_configuration_order() {
    let snapshots = run_recorded(1, 1);
    let snapshot = &snapshots[0];

    let segment_ids: Vec<&str> = snapshot.segments.iter().map(|s| s.id.0.as_str()).collect();
    assert_eq!(segment_ids, vec!["S1", "S2", "S3", "S4", "S5"]);

    let light_ids: Vec<&str> = snapshot.lights.iter().map(|l| l.id.0.as_str()).collect();
    assert_eq!(light_ids, vec!["TL1", "TL2", "TL3", "TL4"]);
}

#[test]
fn test_same_seed_replays_same_run() {
    let first = run_recorded(42, 25);
    let second = run_recorded(42, 25);
    assert_eq!(first.len(), 25);
    assert_eq!(first, second);
}

#[test]
fn test_bounded_run_stops() {
    let world = NetworkConfig::yogyakarta()
        .build_world(StdRandom::seeded(3))
        .expect("built-in network is valid");
    let mut sim = SimulationLoop::new(world, Vec::new()).with_interval(Duration::ZERO);

    assert_eq!(sim.state(), LoopState::Running);
    assert_eq!(sim.run(Some(3)), 3);
    assert_eq!(sim.state(), LoopState::Stopped);
    assert!(sim.step().is_none());

    let ticks: Vec<u64> = sim.observer().iter().map(|s| s.tick).collect();
    assert_eq!(ticks, vec![1, 2, 3]);
    assert_eq!(sim.world().tick_count(), 3);
}

#[test]
fn test_invariants_hold_over_long_run() {
    let mut world = NetworkConfig::yogyakarta()
        .build_world(StdRandom::seeded(7))
        .expect("built-in network is valid");

    for _ in 0..500 {
        world.tick();
        for segment in &world.segments {
            assert!(segment.vehicle_count <= segment.capacity + 200);
            assert!(segment.avg_speed >= 0.0);
        }
        for light in &world.lights {
            assert!((MIN_GREEN_TIME..=MAX_GREEN_TIME).contains(&light.green_time));
        }
    }
}

#[test]
fn test_saturating_inflow_caps_vehicle_count() {
    let mut world = NetworkConfig::yogyakarta()
        .build_world(FixedRandom::new(1.0))
        .expect("built-in network is valid");

    for _ in 0..100 {
        world.tick();
    }
    for segment in &world.segments {
        assert_eq!(segment.vehicle_count, segment.capacity + 200);
        assert_eq!(segment.status, SegmentStatus::Gridlocked);
    }
}

#[test]
fn test_console_panel_redraws_each_tick() {
    let world = NetworkConfig::yogyakarta()
        .build_world(FixedRandom::minimum())
        .expect("built-in network is valid");
    let mut sim =
        SimulationLoop::new(world, ConsolePanel::new(Vec::new())).with_interval(Duration::ZERO);
    sim.run(Some(2));

    let (_, panel) = sim.into_parts();
    let text = String::from_utf8(panel.into_inner()).expect("panel writes utf-8");
    assert_eq!(text.matches("--- Road Segments ---").count(), 2);
    assert!(text.contains("=== Tick 2 ==="));
    assert!(text.contains("S1   Jl. Malioboro"));
    assert!(text.contains("TL1: Malioboro - A. Dahlan"));
    assert!(text.contains("green: 55s | Draining (red)"));
}

/// Test that the binary runs a bounded simulation and draws the panel
#[test]
fn test_binary_runs_bounded_simulation() {
    let output = Command::new(env!("CARGO_BIN_EXE_traffic_agents"))
        .args(["--ticks", "3", "--interval-ms", "0", "--seed", "11"])
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to execute simulation");

    assert!(
        output.status.success(),
        "Simulation failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Tick 1 ==="));
    assert!(stdout.contains("=== Tick 3 ==="));
    assert!(!stdout.contains("=== Tick 4 ==="));
    assert!(stdout.contains("Jl. Malioboro"));
    assert!(stdout.contains("TL4: Kaliurang - Ringroad"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Random seed: 11"), "stderr: {}", stderr);
    assert!(
        stderr.contains("Simulation stopped after 3 ticks"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_binary_reads_config_file() {
    let config = concat!(env!("CARGO_MANIFEST_DIR"), "/config/yogyakarta.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_traffic_agents"))
        .args(["--config", config, "--ticks", "1", "--interval-ms", "0", "--quiet"])
        .output()
        .expect("Failed to execute simulation");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());
}

#[test]
fn test_binary_rejects_invalid_config() {
    let path = std::env::temp_dir().join(format!("traffic_agents_bad_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
[[segments]]
id = "S1"
name = "Broken"
length = 100
capacity = 0
vehicle_count = 0
avg_speed = 10.0
status = "flowing"
start = { lat = 0.0, lon = 0.0 }
end = { lat = 0.0, lon = 1.0 }
"#,
    )
    .expect("write temp config");

    let output = Command::new(env!("CARGO_BIN_EXE_traffic_agents"))
        .args(["--ticks", "1", "--interval-ms", "0", "--config"])
        .arg(&path)
        .output()
        .expect("Failed to execute simulation");
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid capacity 0"), "stderr: {}", stderr);
}
