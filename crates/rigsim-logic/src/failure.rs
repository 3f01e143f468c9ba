//! Failure causes and their user-facing diagnostics.

use crate::resource::ResourceType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where players are pointed for further reading on any failure.
pub const FAILURE_REFERENCE_URL: &str =
    "https://en.wikipedia.org/wiki/Failure_mode_and_effects_analysis";

/// Why a component stopped working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Hard failure from accumulated wear. Needs a reset (part replacement).
    ComponentWear { component_name: String },
    /// An input buffer dropped below its operational minimum.
    LowResource {
        component_name: String,
        resource_type: ResourceType,
    },
}

impl FailureReason {
    pub fn component_wear(component_name: impl Into<String>) -> Self {
        FailureReason::ComponentWear {
            component_name: component_name.into(),
        }
    }

    pub fn low_resource(component_name: impl Into<String>, resource_type: ResourceType) -> Self {
        FailureReason::LowResource {
            component_name: component_name.into(),
            resource_type,
        }
    }

    pub fn component_name(&self) -> &str {
        match self {
            FailureReason::ComponentWear { component_name }
            | FailureReason::LowResource { component_name, .. } => component_name.as_str(),
        }
    }

    pub fn is_wear(&self) -> bool {
        matches!(self, FailureReason::ComponentWear { .. })
    }

    /// Short machine-readable identifier.
    pub fn code(&self) -> String {
        match self {
            FailureReason::ComponentWear { component_name } => {
                format!("ComponentFailed:{}", component_name)
            }
            FailureReason::LowResource {
                component_name,
                resource_type,
            } => format!("LowOrZeroResource:{},{}", resource_type, component_name),
        }
    }

    pub fn message(&self) -> String {
        match self {
            FailureReason::ComponentWear { component_name } => format!(
                "{} has failed due to wear. Replace immediately.",
                component_name
            ),
            FailureReason::LowResource { resource_type, .. } => format!(
                "{} is low or empty. Replenish {} levels.",
                resource_type, resource_type
            ),
        }
    }

    pub fn reference(&self) -> &'static str {
        FAILURE_REFERENCE_URL
    }

    /// Code, message and reference on three lines.
    pub fn formatted_message(&self) -> String {
        format!(
            "{}\n{}\nAdditional Information: {}",
            self.code(),
            self.message(),
            self.reference()
        )
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_message())
    }
}
