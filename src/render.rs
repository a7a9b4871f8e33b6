//! Console rendering of simulation snapshots
//!
//! A text panel in the spirit of a live dashboard: one block per tick with
//! a row per road segment and per traffic light. Each block is drawn from
//! the snapshot alone, so nothing carries over from the previous tick.

use log::warn;
use std::io::{self, Stdout, Write};

use crate::simulation::{Snapshot, SnapshotObserver};

/// Writes a text panel for every published snapshot
pub struct ConsolePanel<W = Stdout> {
    out: W,
}

impl ConsolePanel<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsolePanel<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "=== Tick {} ===", snapshot.tick)?;

        writeln!(out, "--- Road Segments ---")?;
        for segment in &snapshot.segments {
            writeln!(
                out,
                "  {:<4} {:<20} {:>3} km/h | {} ({})",
                segment.id,
                segment.name,
                // Panel shows whole km/h, truncated
                segment.avg_speed as u32,
                segment.status.label(),
                segment.color.as_str()
            )?;
        }

        writeln!(out, "--- Traffic Lights ---")?;
        for light in &snapshot.lights {
            writeln!(
                out,
                "  {}: {:<24} queue: {:>4} vehicles | green: {:>2}s | {} ({})",
                light.id,
                light.location,
                light.queue,
                light.green_time,
                light.status.label(),
                light.color.as_str()
            )?;
        }
        writeln!(out)?;
        out.flush()
    }
}

impl<W: Write> SnapshotObserver for ConsolePanel<W> {
    fn publish(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.draw(snapshot) {
            warn!("Failed to draw tick {}: {}", snapshot.tick, e);
        }
    }
}
