//! Traffic Agents Library
//!
//! A rule-based simulation of road segments and adaptive traffic lights
//! that can run headless or feed snapshots to any renderer.

pub mod config;
pub mod render;
pub mod simulation;
