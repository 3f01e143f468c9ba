//! Construction-time component configuration and validation.

use crate::resource::{BufferConfig, ResourceType};
use crate::wear::WearSchedule;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_tick_length() -> f32 {
    1.0
}

/// Everything needed to build a component. Immutable once the component exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<BufferConfig>,
    #[serde(default)]
    pub outputs: Vec<BufferConfig>,
    /// Operating time credited per processing tick.
    #[serde(default = "default_tick_length")]
    pub tick_length: f32,
    #[serde(default)]
    pub starting_failure_chance: f32,
    /// `(operating time, failure chance)` pairs, ascending by time.
    #[serde(default)]
    pub failure_chance_increase_steps: Vec<(f32, f32)>,
}

impl ComponentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            tick_length: default_tick_length(),
            starting_failure_chance: 0.0,
            failure_chance_increase_steps: Vec::new(),
        }
    }

    pub fn input(mut self, buffer: BufferConfig) -> Self {
        self.inputs.push(buffer);
        self
    }

    pub fn output(mut self, buffer: BufferConfig) -> Self {
        self.outputs.push(buffer);
        self
    }

    pub fn with_tick_length(mut self, tick_length: f32) -> Self {
        self.tick_length = tick_length;
        self
    }

    pub fn with_wear(mut self, starting_chance: f32, steps: Vec<(f32, f32)>) -> Self {
        self.starting_failure_chance = starting_chance;
        self.failure_chance_increase_steps = steps;
        self
    }

    pub fn wear_schedule(&self) -> WearSchedule {
        WearSchedule::new(
            self.starting_failure_chance,
            &self.failure_chance_increase_steps,
        )
    }

    /// Check every numeric parameter before a component is built from this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !self.tick_length.is_finite() || self.tick_length < 0.0 {
            return Err(ConfigError::InvalidTickLength(self.tick_length));
        }
        for buffer in self.inputs.iter().chain(&self.outputs) {
            validate_buffer(buffer)?;
        }
        validate_probability(self.starting_failure_chance)?;

        let mut last_time = f32::NEG_INFINITY;
        for (index, &(time, probability)) in self.failure_chance_increase_steps.iter().enumerate() {
            if !time.is_finite() || time <= last_time {
                return Err(ConfigError::UnorderedWearStep { index });
            }
            validate_probability(probability)?;
            last_time = time;
        }
        Ok(())
    }
}

fn validate_buffer(buffer: &BufferConfig) -> Result<(), ConfigError> {
    let resource_type = buffer.resource_type;
    let finite = [
        ("capacity", buffer.capacity),
        ("minimum_operational", buffer.minimum_operational),
        ("rate_per_tick", buffer.rate_per_tick),
        ("initial_level", buffer.initial_level),
    ];
    for (field, value) in finite {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite {
                resource_type,
                field,
            });
        }
    }

    if buffer.capacity <= 0.0 {
        return Err(ConfigError::InvalidCapacity {
            resource_type,
            capacity: buffer.capacity,
        });
    }
    if buffer.minimum_operational < 0.0 {
        return Err(ConfigError::NegativeMinimum {
            resource_type,
            minimum: buffer.minimum_operational,
        });
    }
    if buffer.minimum_operational > buffer.capacity {
        return Err(ConfigError::MinimumAboveCapacity {
            resource_type,
            minimum: buffer.minimum_operational,
            capacity: buffer.capacity,
        });
    }
    Ok(())
}

fn validate_probability(p: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability(p))
    }
}

/// Errors from invalid component configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyName,
    InvalidTickLength(f32),
    NonFinite {
        resource_type: ResourceType,
        field: &'static str,
    },
    InvalidCapacity {
        resource_type: ResourceType,
        capacity: f32,
    },
    NegativeMinimum {
        resource_type: ResourceType,
        minimum: f32,
    },
    MinimumAboveCapacity {
        resource_type: ResourceType,
        minimum: f32,
        capacity: f32,
    },
    InvalidProbability(f32),
    UnorderedWearStep { index: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyName => write!(f, "component name must not be empty"),
            ConfigError::InvalidTickLength(t) => write!(f, "invalid tick length {}", t),
            ConfigError::NonFinite {
                resource_type,
                field,
            } => write!(f, "{} buffer has non-finite {}", resource_type, field),
            ConfigError::InvalidCapacity {
                resource_type,
                capacity,
            } => write!(
                f,
                "{} buffer capacity must be positive, got {}",
                resource_type, capacity
            ),
            ConfigError::NegativeMinimum {
                resource_type,
                minimum,
            } => write!(
                f,
                "{} buffer minimum must not be negative, got {}",
                resource_type, minimum
            ),
            ConfigError::MinimumAboveCapacity {
                resource_type,
                minimum,
                capacity,
            } => write!(
                f,
                "{} buffer minimum {} exceeds capacity {}",
                resource_type, minimum, capacity
            ),
            ConfigError::InvalidProbability(p) => {
                write!(f, "failure chance {} outside [0, 1]", p)
            }
            ConfigError::UnorderedWearStep { index } => {
                write!(f, "wear step {} is not after the previous step", index)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
