//! rigsim Core - hosts vehicle components in an ECS world
//!
//! Each entity carries one `VehicleComponent` (from `rigsim-logic`) plus the
//! `OverflowLedger` its ticks report into. Components are independent of one
//! another; the engine only schedules them and collects what they emit.
//!
//! # Architecture
//!
//! - **Entities**: one per hosted component
//! - **Components**: `VehicleComponent`, `OverflowLedger`
//! - **Systems**: the per-step component tick and the opt-in wear roll
//!
//! # Example
//!
//! ```rust,no_run
//! use rigsim_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new();
//! let config = ComponentConfig::new("Main Engine").input(
//!     BufferConfig::new(ResourceType::Fuel)
//!         .with_capacity(100.0)
//!         .with_minimum(5.0)
//!         .with_rate(1.0)
//!         .with_level(100.0),
//! );
//! let engine_id = engine.spawn(&config).unwrap();
//! engine.switch_on(engine_id).unwrap();
//!
//! loop {
//!     engine.tick();
//! }
//! ```

pub mod engine;
pub mod journal;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::{EngineError, SimulationEngine};
    pub use crate::journal::{JournalEntry, NotificationJournal};
    pub use rigsim_logic::{
        BufferConfig, BufferDirection, ComponentConfig, ComponentEvent, ComponentState,
        FailureReason, ResourceType,
    };
}
