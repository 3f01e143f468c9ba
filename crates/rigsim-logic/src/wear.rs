//! Wear failure probability schedule.
//!
//! A component's chance of a wear failure rises in steps as its operating
//! time grows. The schedule is pure data; rolling against it is left to the
//! host (see `rigsim-core`), the component's own tick never consults it.

use serde::{Deserialize, Serialize};

/// Probability that takes effect once operating time reaches `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WearStep {
    pub time: f32,
    pub probability: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WearSchedule {
    starting_chance: f32,
    steps: Vec<WearStep>,
}

impl WearSchedule {
    /// Build from a starting chance and `(time, probability)` pairs sorted by time.
    pub fn new(starting_chance: f32, steps: &[(f32, f32)]) -> Self {
        Self {
            starting_chance,
            steps: steps
                .iter()
                .map(|&(time, probability)| WearStep { time, probability })
                .collect(),
        }
    }

    /// True when no step and no starting chance can ever fail the component.
    pub fn is_inert(&self) -> bool {
        self.starting_chance <= 0.0 && self.steps.iter().all(|s| s.probability <= 0.0)
    }

    /// Per-tick failure chance after `operating_time` of use.
    pub fn failure_chance_at(&self, operating_time: f32) -> f32 {
        self.steps
            .iter()
            .take_while(|s| s.time <= operating_time)
            .last()
            .map(|s| s.probability)
            .unwrap_or(self.starting_chance)
            .clamp(0.0, 1.0)
    }

    /// Whether a uniform `sample` in `[0, 1)` lands inside the failure chance.
    pub fn rolls_failure(&self, operating_time: f32, sample: f32) -> bool {
        sample < self.failure_chance_at(operating_time)
    }
}
