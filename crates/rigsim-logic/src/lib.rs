//! Pure component logic for rigsim.
//!
//! This crate models a single vehicle component (engine, generator,
//! life-support unit, ...) independent of any engine or runtime. Types take
//! plain data and report results through small traits, so the whole state
//! machine is unit-testable and can be hosted by the ECS engine in
//! `rigsim-core` or embedded anywhere else.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`component`] | On/off/active/failed state machine and per-tick update |
//! | [`config`] | Construction-time configuration and validation |
//! | [`events`] | Activated/Deactivated/Failed notifications and sinks |
//! | [`failure`] | Failure causes with code, message and reference |
//! | [`overflow`] | Per-tick overflow accumulation and pluggable policies |
//! | [`resource`] | Resource types and bounded buffers |
//! | [`wear`] | Wear failure probability schedule |

pub mod component;
pub mod config;
pub mod events;
pub mod failure;
pub mod overflow;
pub mod resource;
pub mod wear;

pub use component::{BufferDirection, BufferQueryError, ComponentState, VehicleComponent};
pub use config::{ComponentConfig, ConfigError};
pub use events::{ComponentEvent, EventLog, NotificationSink};
pub use failure::FailureReason;
pub use overflow::{DiscardOverflow, OverflowLedger, OverflowMap, OverflowPolicy};
pub use resource::{BufferConfig, ResourceBuffer, ResourceType};
pub use wear::WearSchedule;
