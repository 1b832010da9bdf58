//! Headless scene runner.
//!
//! Loads a scene, steps the emitter manager at a fixed timestep and reports
//! pool statistics as it goes.

use crate::config::EngineConfig;
use crate::scene::Scene;
use crate::timing::StepTiming;
use anyhow::{Context, Result};
use ember_kernel::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tracing::{debug, info};

/// Totals at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Frames stepped
    pub frames: u32,
    /// Simulated time in milliseconds
    pub elapsed_ms: f64,
    /// Final pool statistics
    pub stats: ManagerStats,
    /// Most particles alive at once
    pub peak_alive: usize,
}

/// Load the configured scene and run it.
pub fn run(mut config: EngineConfig) -> Result<RunSummary> {
    config.validate();

    info!("Configuration loaded:");
    info!("  Timestep: {:.3} ms", config.timestep_ms);
    info!("  Frames: {}", config.frame_count);
    info!("  Scene: {}", config.scene_path.display());

    let scene = Scene::load(&config.scene_path)
        .with_context(|| format!("loading scene {}", config.scene_path.display()))?;
    simulate(&config, &scene)
}

/// Step `scene` for the configured number of frames.
pub fn simulate(config: &EngineConfig, scene: &Scene) -> Result<RunSummary> {
    let mut manager = scene.build(config.seed);
    manager.set_time_scale(config.time_scale);

    let mut timing = StepTiming::default();
    let mut peak_alive = 0;
    let mut time = 0.0_f64;

    for frame in 1..=config.frame_count {
        time += f64::from(config.timestep_ms);

        timing.begin();
        manager.update(time, config.timestep_ms);
        if config.depth_sort {
            for (_, emitter) in manager.emitters_mut() {
                emitter.depth_sort();
            }
        }
        timing.end();

        let stats = manager.stats();
        peak_alive = peak_alive.max(stats.alive);

        if config.report_interval > 0 && frame % config.report_interval == 0 {
            info!(
                "Frame {frame}: {} alive, {} pooled, step avg {:.3} ms",
                format_count(stats.alive),
                format_count(stats.dead),
                timing.average_ms()
            );
        }
    }

    let stats = manager.stats();
    info!(
        "Run complete: {} frames, {} alive, peak {}, worst step {:.3} ms",
        config.frame_count,
        format_count(stats.alive),
        format_count(peak_alive),
        timing.worst_ms()
    );

    if let Some(path) = &config.describe_path {
        let contents = serde_json::to_string_pretty(&describe_all(&manager))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
            .with_context(|| format!("writing descriptions to {}", path.display()))?;
        debug!("Wrote emitter descriptions to {}", path.display());
    }

    let summary = RunSummary {
        frames: config.frame_count,
        elapsed_ms: manager.elapsed(),
        stats,
        peak_alive,
    };
    manager.destroy();
    Ok(summary)
}

/// Current configuration of every emitter, in a form a scene can reload.
fn describe_all(manager: &EmitterManager) -> Value {
    let emitters: Vec<Value> = manager.emitters().map(|(_, emitter)| emitter.describe()).collect();
    json!({ "emitters": emitters })
}

/// Formats a count with commas for readability.
fn format_count(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(frames: u32) -> EngineConfig {
        EngineConfig {
            timestep_ms: 10.0,
            frame_count: frames,
            seed: Some(1),
            report_interval: 0,
            ..EngineConfig::default()
        }
    }

    fn scene(json: &str) -> Scene {
        Scene::parse(json).unwrap()
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_steady_flow_reaches_equilibrium() {
        // One particle every 10 ms living 100 ms keeps about ten alive.
        let scene = scene(r#"{ "emitters": [{ "frequency": 10, "lifespan": 100 }] }"#);
        let summary = simulate(&config(100), &scene).unwrap();
        assert_eq!(summary.frames, 100);
        assert!((summary.elapsed_ms - 1000.0).abs() < 1e-6);
        assert!((9..=11).contains(&summary.stats.alive), "alive = {}", summary.stats.alive);
        assert!(summary.peak_alive >= summary.stats.alive);
    }

    #[test]
    fn test_max_particles_caps_run() {
        let scene = scene(r#"{ "emitters": [{ "frequency": 0, "quantity": 5, "lifespan": 10000, "maxParticles": 12 }] }"#);
        let summary = simulate(&config(20), &scene).unwrap();
        assert_eq!(summary.stats.alive, 12);
        assert_eq!(summary.peak_alive, 12);
    }

    #[test]
    fn test_depth_sorted_run() {
        let scene = scene(
            r#"{ "emitters": [{ "y": {"min": 0, "max": 500}, "frequency": 0, "lifespan": 10000 }] }"#,
        );
        let mut config = config(10);
        config.depth_sort = true;
        let summary = simulate(&config, &scene).unwrap();
        assert_eq!(summary.stats.alive, 10);
    }

    #[test]
    fn test_describe_output_reloads() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let out = temp_dir.path().join("out").join("describe.json");
        let scene = scene(r#"{ "emitters": [{ "name": "fire", "speed": 100, "lifespan": 500 }] }"#);
        let mut config = config(5);
        config.describe_path = Some(out.clone());
        simulate(&config, &scene).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        let reloaded = Scene::parse(&written).unwrap();
        assert_eq!(reloaded.emitters.len(), 1);
        assert_eq!(reloaded.emitters[0]["name"], "fire");
        assert_eq!(reloaded.emitters[0]["lifespan"], 500.0);
    }

    #[test]
    fn test_run_missing_scene_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = config(1);
        config.scene_path = temp_dir.path().join("missing.json");
        assert!(run(config).is_err());
    }
}
