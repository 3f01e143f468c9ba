//! Simulation engine - hosts components and drives them one tick at a time

use crate::journal::{JournalEntry, NotificationJournal};
use crate::systems::*;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rigsim_logic::{
    BufferDirection, BufferQueryError, ComponentConfig, ComponentState, ConfigError, EventLog,
    FailureReason, OverflowLedger, ResourceType, VehicleComponent,
};
use std::fmt;

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world; each entity carries a `VehicleComponent` and its `OverflowLedger`
    pub world: World,
    /// Every notification emitted so far
    journal: NotificationJournal,
    /// Completed ticks
    tick_count: u64,
    /// Present only when wear rolling is enabled
    wear_rng: Option<StdRng>,
}

impl SimulationEngine {
    /// Create an empty engine with wear rolling disabled
    pub fn new() -> Self {
        Self {
            world: World::new(),
            journal: NotificationJournal::new(),
            tick_count: 0,
            wear_rng: None,
        }
    }

    /// Enable random wear failures, seeded for reproducible runs
    pub fn with_wear(mut self, seed: u64) -> Self {
        self.wear_rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_journal_limit(mut self, limit: usize) -> Self {
        self.journal = NotificationJournal::with_limit(limit);
        self
    }

    pub fn wear_enabled(&self) -> bool {
        self.wear_rng.is_some()
    }

    /// Build a component from config and add it, switched off
    pub fn spawn(&mut self, config: &ComponentConfig) -> Result<Entity, EngineError> {
        let component = VehicleComponent::from_config(config)?;
        log::info!("spawned component {}", component.name());
        Ok(self.world.spawn((component, OverflowLedger::new())))
    }

    pub fn despawn(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.world
            .despawn(entity)
            .map_err(|_| EngineError::UnknownComponent(entity))
    }

    /// First component with this name
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.world
            .query::<&VehicleComponent>()
            .iter()
            .find(|(_, c)| c.name() == name)
            .map(|(entity, _)| entity)
    }

    /// Run `f` against one component and journal whatever it emits
    fn with_component<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut VehicleComponent, &mut EventLog) -> R,
    ) -> Result<R, EngineError> {
        let mut component = self
            .world
            .get::<&mut VehicleComponent>(entity)
            .map_err(|_| EngineError::UnknownComponent(entity))?;
        let mut events = EventLog::new();
        let result = f(&mut *component, &mut events);
        self.journal
            .record_all(self.tick_count, entity, component.name(), events.drain());
        Ok(result)
    }

    pub fn switch_on(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.with_component(entity, |c, events| c.switch_on(events))
    }

    pub fn switch_off(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.with_component(entity, |c, events| c.switch_off(events))
    }

    /// Top up an input buffer; returns the amount that did not fit
    pub fn replenish(
        &mut self,
        entity: Entity,
        resource_type: ResourceType,
        amount: f32,
    ) -> Result<f32, EngineError> {
        let overflow = self.with_component(entity, |c, _| c.replenish(resource_type, amount))??;
        Ok(overflow)
    }

    /// Clear failures and operating time, as after replacing the part
    pub fn reset(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.with_component(entity, |c, _| c.reset())
    }

    /// Advance every component by one step
    pub fn tick(&mut self) {
        self.tick_count += 1;

        component_tick_system(&mut self.world, &mut self.journal, self.tick_count);

        if let Some(rng) = self.wear_rng.as_mut() {
            let failed = wear_system(&mut self.world, &mut self.journal, self.tick_count, rng);
            if failed > 0 {
                log::warn!("tick {}: {} component(s) failed from wear", self.tick_count, failed);
            }
        }
    }

    pub fn run(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn buffer_level(
        &self,
        entity: Entity,
        resource_type: ResourceType,
        direction: BufferDirection,
    ) -> Result<(f32, f32), EngineError> {
        let component = self
            .world
            .get::<&VehicleComponent>(entity)
            .map_err(|_| EngineError::UnknownComponent(entity))?;
        Ok(component.get_buffer_level(resource_type, direction)?)
    }

    pub fn state(&self, entity: Entity) -> Result<ComponentState, EngineError> {
        self.world
            .get::<&VehicleComponent>(entity)
            .map(|c| c.state())
            .map_err(|_| EngineError::UnknownComponent(entity))
    }

    /// Snapshot of the overflow totals for one component
    pub fn overflow(&self, entity: Entity) -> Result<OverflowLedger, EngineError> {
        self.world
            .get::<&OverflowLedger>(entity)
            .map(|ledger| (*ledger).clone())
            .map_err(|_| EngineError::UnknownComponent(entity))
    }

    pub fn component_count(&self) -> usize {
        self.world.query::<&VehicleComponent>().iter().count()
    }

    pub fn active_count(&self) -> usize {
        count_active(&self.world)
    }

    /// Components currently holding a failure, with the reason
    pub fn failed_components(&self) -> Vec<(Entity, FailureReason)> {
        self.world
            .query::<&VehicleComponent>()
            .iter()
            .filter_map(|(entity, c)| c.current_failure().map(|r| (entity, r.clone())))
            .collect()
    }

    pub fn journal(&self) -> &NotificationJournal {
        &self.journal
    }

    pub fn drain_journal(&mut self) -> Vec<JournalEntry> {
        self.journal.drain()
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from engine operations
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    UnknownComponent(Entity),
    Config(ConfigError),
    Query(BufferQueryError),
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

impl From<BufferQueryError> for EngineError {
    fn from(e: BufferQueryError) -> Self {
        EngineError::Query(e)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownComponent(e) => write!(f, "no component on entity {:?}", e),
            EngineError::Config(e) => write!(f, "invalid config: {}", e),
            EngineError::Query(e) => write!(f, "buffer query failed: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::UnknownComponent(_) => None,
            EngineError::Config(e) => Some(e),
            EngineError::Query(e) => Some(e),
        }
    }
}
