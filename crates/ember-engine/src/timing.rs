//! Step timing.
//!
//! Measures how long each simulation step takes on the wall clock and keeps
//! a rolling average for reporting.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rolling wall-clock timing of simulation steps.
#[derive(Debug)]
pub struct StepTiming {
    /// Start of the step being measured
    step_start: Option<Instant>,
    /// Recent step durations in milliseconds
    samples: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
    /// Total steps measured
    steps: u64,
    /// Longest step seen
    worst: f32,
}

impl Default for StepTiming {
    fn default() -> Self {
        Self::new(120)
    }
}

impl StepTiming {
    /// Create a timer averaging over `max_samples` steps.
    #[must_use]
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            step_start: None,
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
            steps: 0,
            worst: 0.0,
        }
    }

    /// Mark the start of a step.
    pub fn begin(&mut self) {
        self.step_start = Some(Instant::now());
    }

    /// Mark the end of a step. Does nothing without a matching `begin`.
    pub fn end(&mut self) {
        if let Some(start) = self.step_start.take() {
            self.record(start.elapsed());
        }
    }

    /// Record a step duration.
    pub fn record(&mut self, duration: Duration) {
        let ms = duration.as_secs_f32() * 1000.0;
        self.samples.push_back(ms);
        if self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
        self.steps += 1;
        self.worst = self.worst.max(ms);
    }

    /// Average step time in milliseconds over the recent window.
    #[must_use]
    pub fn average_ms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    /// Longest step in milliseconds.
    #[must_use]
    pub fn worst_ms(&self) -> f32 {
        self.worst
    }

    /// Number of steps measured.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
