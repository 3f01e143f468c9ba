//! Resource types and bounded per-resource buffers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Fuel,
    Power,
    Coolant,
    Oxygen,
    Water,
    SpareParts,
    /// Generic tag; matched only against itself.
    Any,
}

impl ResourceType {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Fuel => "Fuel",
            ResourceType::Power => "Power",
            ResourceType::Coolant => "Coolant",
            ResourceType::Oxygen => "Oxygen",
            ResourceType::Water => "Water",
            ResourceType::SpareParts => "SpareParts",
            ResourceType::Any => "Any",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn unbounded() -> f32 {
    f32::MAX
}

/// Static description of one buffer, as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub resource_type: ResourceType,
    #[serde(default = "unbounded")]
    pub capacity: f32,
    /// Level below which the owning component cannot run. 0 disables the gate.
    #[serde(default)]
    pub minimum_operational: f32,
    /// Positive = consumed per tick on inputs, produced per tick on outputs.
    #[serde(default)]
    pub rate_per_tick: f32,
    #[serde(default)]
    pub initial_level: f32,
}

impl BufferConfig {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            capacity: unbounded(),
            minimum_operational: 0.0,
            rate_per_tick: 0.0,
            initial_level: 0.0,
        }
    }

    pub fn with_capacity(mut self, capacity: f32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_minimum(mut self, minimum: f32) -> Self {
        self.minimum_operational = minimum;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate_per_tick = rate;
        self
    }

    pub fn with_level(mut self, level: f32) -> Self {
        self.initial_level = level;
        self
    }
}

/// Bounded accumulator for a single resource type.
///
/// `level` always stays within `[0, capacity]`; anything a delta cannot fit
/// is handed back to the caller as overflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBuffer {
    resource_type: ResourceType,
    level: f32,
    capacity: f32,
    minimum_operational: f32,
    rate_per_tick: f32,
}

impl ResourceBuffer {
    pub fn new(resource_type: ResourceType, capacity: f32) -> Self {
        Self {
            resource_type,
            level: 0.0,
            capacity,
            minimum_operational: 0.0,
            rate_per_tick: 0.0,
        }
    }

    pub fn from_config(config: &BufferConfig) -> Self {
        Self::new(config.resource_type, config.capacity)
            .with_minimum(config.minimum_operational)
            .with_rate(config.rate_per_tick)
            .with_level(config.initial_level)
    }

    pub fn with_minimum(mut self, minimum: f32) -> Self {
        self.minimum_operational = minimum;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate_per_tick = rate;
        self
    }

    /// Starting level, clamped into `[0, capacity]`. A negative or NaN
    /// capacity clamps to an empty buffer.
    pub fn with_level(mut self, level: f32) -> Self {
        self.level = level.clamp(0.0, self.capacity.max(0.0));
        self
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    pub fn minimum_operational(&self) -> f32 {
        self.minimum_operational
    }

    pub fn rate_per_tick(&self) -> f32 {
        self.rate_per_tick
    }

    /// Fill fraction in `[0, 1]`.
    pub fn fill_ratio(&self) -> f32 {
        if self.capacity > 0.0 {
            (self.level / self.capacity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Add `amount` (negative drains) and return what could not be absorbed.
    ///
    /// - Saturating at capacity returns the positive excess.
    /// - Emptying below zero returns the negative unmet deficit.
    /// - Otherwise returns 0.
    pub fn apply_delta(&mut self, amount: f32) -> f32 {
        if amount.is_nan() {
            log::debug!("ignoring NaN delta on {} buffer", self.resource_type);
            return 0.0;
        }

        let target = self.level + amount;
        if target > self.capacity {
            self.level = self.capacity;
            target - self.capacity
        } else if target < 0.0 {
            self.level = 0.0;
            target
        } else {
            self.level = target;
            0.0
        }
    }

    pub fn is_operational(&self) -> bool {
        self.level >= self.minimum_operational
    }
}
