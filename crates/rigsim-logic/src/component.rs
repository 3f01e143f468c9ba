//! Vehicle component: input/output buffers plus the on/off/active/failed state machine.
//!
//! The host calls [`VehicleComponent::tick`] once per simulation step. A tick
//! checks every input buffer against its operational minimum, records a
//! [`FailureReason::LowResource`] for each one that falls short, drains the
//! inputs by their per-tick rate and forwards whatever did not fit to an
//! [`OverflowPolicy`].
//!
//! Failure state is only ever written from one place per cause: the tick's
//! runnability evaluation for low resources, and [`VehicleComponent::fail_with`]
//! for externally detected faults such as wear. [`VehicleComponent::is_runnable`]
//! and [`VehicleComponent::is_active`] are plain queries.

use crate::config::{ComponentConfig, ConfigError};
use crate::events::{ComponentEvent, NotificationSink};
use crate::failure::FailureReason;
use crate::overflow::{accumulate_overflow, OverflowMap, OverflowPolicy};
use crate::resource::{ResourceBuffer, ResourceType};
use crate::wear::WearSchedule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of a component a buffer sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferDirection {
    Input,
    Output,
}

impl fmt::Display for BufferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferDirection::Input => f.write_str("input"),
            BufferDirection::Output => f.write_str("output"),
        }
    }
}

impl FromStr for BufferDirection {
    type Err = BufferQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "in" => Ok(BufferDirection::Input),
            "output" | "out" => Ok(BufferDirection::Output),
            other => Err(BufferQueryError::InvalidArgument(format!(
                "unknown buffer direction '{}'",
                other
            ))),
        }
    }
}

/// Coarse lifecycle state, derived from the component's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentState {
    Off,
    /// Switched on with no failure held, but not processing. This covers a
    /// component whose inputs are already short but whose next tick has not
    /// recorded the failure yet.
    Idle,
    Active,
    Failed,
}

#[derive(Debug, Clone)]
pub struct VehicleComponent {
    name: String,
    is_switched_on: bool,
    /// Set after a tick that drained the inputs; cleared when processing stops.
    processing: bool,
    time_on_component: f32,
    tick_length: f32,
    inputs: Vec<ResourceBuffer>,
    outputs: Vec<ResourceBuffer>,
    current_failure: Option<FailureReason>,
    wear: WearSchedule,
}

impl VehicleComponent {
    pub fn from_config(config: &ComponentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            name: config.name.clone(),
            is_switched_on: false,
            processing: false,
            time_on_component: 0.0,
            tick_length: config.tick_length,
            inputs: config.inputs.iter().map(ResourceBuffer::from_config).collect(),
            outputs: config.outputs.iter().map(ResourceBuffer::from_config).collect(),
            current_failure: None,
            wear: config.wear_schedule(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_switched_on(&self) -> bool {
        self.is_switched_on
    }

    pub fn time_on_component(&self) -> f32 {
        self.time_on_component
    }

    pub fn inputs(&self) -> &[ResourceBuffer] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ResourceBuffer] {
        &self.outputs
    }

    pub fn current_failure(&self) -> Option<&FailureReason> {
        self.current_failure.as_ref()
    }

    pub fn wear_schedule(&self) -> &WearSchedule {
        &self.wear
    }

    /// All inputs at or above their operational minimum.
    pub fn is_runnable(&self) -> bool {
        self.inputs.iter().all(ResourceBuffer::is_operational)
    }

    /// Switched on, no failure held, and runnable.
    pub fn is_active(&self) -> bool {
        self.is_switched_on && self.current_failure.is_none() && self.is_runnable()
    }

    pub fn state(&self) -> ComponentState {
        if !self.is_switched_on {
            ComponentState::Off
        } else if self.current_failure.is_some() {
            ComponentState::Failed
        } else if self.processing && self.is_runnable() {
            ComponentState::Active
        } else {
            ComponentState::Idle
        }
    }

    pub fn switch_on(&mut self, sink: &mut impl NotificationSink) {
        self.is_switched_on = true;
        if self.is_active() {
            log::info!("{} switched on", self.name);
            sink.notify(ComponentEvent::Activated);
        } else {
            log::info!("{} switched on but cannot run", self.name);
        }
    }

    /// Switch off. A held failure is re-announced before `Deactivated`.
    pub fn switch_off(&mut self, sink: &mut impl NotificationSink) {
        self.is_switched_on = false;
        self.processing = false;
        if let Some(reason) = &self.current_failure {
            sink.notify(ComponentEvent::Failed(reason.clone()));
        }
        log::info!("{} switched off", self.name);
        sink.notify(ComponentEvent::Deactivated);
    }

    /// Advance one simulation step.
    ///
    /// Does nothing while switched off or while a wear failure is held. A
    /// shortage found during the tick does not stop the tick: every input is
    /// still checked and, if the component started the tick without a failure,
    /// every input is still drained.
    pub fn tick(&mut self, sink: &mut impl NotificationSink, policy: &mut impl OverflowPolicy) {
        if !self.is_switched_on || self.holds_wear_failure() {
            return;
        }

        let was_healthy = self.current_failure.is_none();
        self.evaluate_runnability(sink);
        if !was_healthy {
            return;
        }

        let mut overflow = OverflowMap::new();
        for buffer in &mut self.inputs {
            let spilled = buffer.apply_delta(-buffer.rate_per_tick());
            accumulate_overflow(&mut overflow, buffer.resource_type(), spilled);
        }
        self.time_on_component += self.tick_length;
        self.processing = self.current_failure.is_none();

        // Opposite spills of one resource cancel out.
        overflow.retain(|_, amount| *amount != 0.0);
        if !overflow.is_empty() {
            log::debug!(
                "{} forwarding overflow for {} resource(s)",
                self.name,
                overflow.len()
            );
            policy.handle(&overflow);
        }
    }

    /// Record a low-resource failure for each short input, or clear a held one
    /// once every input recovers.
    fn evaluate_runnability(&mut self, sink: &mut impl NotificationSink) {
        let short: Vec<ResourceType> = self
            .inputs
            .iter()
            .filter(|b| !b.is_operational())
            .map(ResourceBuffer::resource_type)
            .collect();

        if short.is_empty() {
            if matches!(self.current_failure, Some(FailureReason::LowResource { .. })) {
                self.current_failure = None;
                log::info!("{} recovered, inputs replenished", self.name);
                if self.is_active() {
                    sink.notify(ComponentEvent::Activated);
                }
            }
            return;
        }

        // Already reported; wait for recovery.
        if self.current_failure.is_some() {
            return;
        }

        for resource_type in short {
            let reason = FailureReason::low_resource(self.name.clone(), resource_type);
            log::warn!("{}", reason.code());
            sink.notify(ComponentEvent::Failed(reason.clone()));
            self.current_failure = Some(reason);
        }
        self.processing = false;
    }

    /// Record a failure detected outside the tick (e.g. a wear roll).
    /// Re-recording the failure already held is silent.
    pub fn fail_with(&mut self, reason: FailureReason, sink: &mut impl NotificationSink) {
        if self.current_failure.as_ref() == Some(&reason) {
            return;
        }
        log::warn!("{}", reason.code());
        sink.notify(ComponentEvent::Failed(reason.clone()));
        self.current_failure = Some(reason);
        self.processing = false;
    }

    fn holds_wear_failure(&self) -> bool {
        self.current_failure
            .as_ref()
            .map(FailureReason::is_wear)
            .unwrap_or(false)
    }

    /// Clear any failure and operating time, as after replacing the part.
    /// Buffer levels and the on/off switch are left alone.
    pub fn reset(&mut self) {
        self.current_failure = None;
        self.time_on_component = 0.0;
        self.processing = false;
    }

    /// Top up the first input buffer of `resource_type`. Returns the overflow.
    pub fn replenish(
        &mut self,
        resource_type: ResourceType,
        amount: f32,
    ) -> Result<f32, BufferQueryError> {
        let buffer = self
            .inputs
            .iter_mut()
            .find(|b| b.resource_type() == resource_type)
            .ok_or(BufferQueryError::NotFound {
                resource_type,
                direction: BufferDirection::Input,
            })?;
        Ok(buffer.apply_delta(amount))
    }

    pub fn buffer(
        &self,
        resource_type: ResourceType,
        direction: BufferDirection,
    ) -> Option<&ResourceBuffer> {
        let buffers = match direction {
            BufferDirection::Input => &self.inputs,
            BufferDirection::Output => &self.outputs,
        };
        buffers.iter().find(|b| b.resource_type() == resource_type)
    }

    /// `(level, capacity)` of the first buffer of `resource_type` on the given side.
    pub fn get_buffer_level(
        &self,
        resource_type: ResourceType,
        direction: BufferDirection,
    ) -> Result<(f32, f32), BufferQueryError> {
        self.buffer(resource_type, direction)
            .map(|b| (b.level(), b.capacity()))
            .ok_or(BufferQueryError::NotFound {
                resource_type,
                direction,
            })
    }
}

/// Errors from looking up a component's buffers
#[derive(Debug, Clone, PartialEq)]
pub enum BufferQueryError {
    NotFound {
        resource_type: ResourceType,
        direction: BufferDirection,
    },
    InvalidArgument(String),
}

impl fmt::Display for BufferQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferQueryError::NotFound {
                resource_type,
                direction,
            } => write!(f, "no {} buffer for {}", direction, resource_type),
            BufferQueryError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for BufferQueryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::overflow::{DiscardOverflow, OverflowLedger};
    use crate::resource::BufferConfig;

    fn component(inputs: Vec<BufferConfig>) -> VehicleComponent {
        let mut config = ComponentConfig::new("Engine");
        config.inputs = inputs;
        VehicleComponent::from_config(&config).unwrap()
    }

    fn fuel(level: f32, minimum: f32, rate: f32) -> BufferConfig {
        BufferConfig::new(ResourceType::Fuel)
            .with_capacity(10.0)
            .with_minimum(minimum)
            .with_rate(rate)
            .with_level(level)
    }

    #[test]
    fn test_starts_off() {
        let c = component(vec![fuel(5.0, 0.0, 1.0)]);
        assert_eq!(c.state(), ComponentState::Off);
        assert!(!c.is_active());
        assert!(c.is_runnable());
    }

    #[test]
    fn test_switch_on_emits_activated_when_runnable() {
        let mut c = component(vec![fuel(5.0, 2.0, 1.0)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        assert!(c.is_active());
        assert_eq!(log.events(), &[ComponentEvent::Activated]);
        assert_eq!(c.state(), ComponentState::Idle);
    }

    #[test]
    fn test_switch_on_silent_when_not_runnable() {
        let mut c = component(vec![fuel(1.0, 2.0, 1.0)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        assert!(c.is_switched_on());
        assert!(!c.is_active());
        assert!(log.is_empty());
        // Querying runnability does not record a failure
        assert!(!c.is_runnable());
        assert!(c.current_failure().is_none());
        assert_eq!(c.state(), ComponentState::Idle);
    }

    #[test]
    fn test_tick_drains_inputs() {
        let mut c = component(vec![fuel(5.0, 0.0, 3.0)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut DiscardOverflow);
        assert_eq!(
            c.get_buffer_level(ResourceType::Fuel, BufferDirection::Input),
            Ok((2.0, 10.0))
        );
        assert_eq!(c.time_on_component(), 1.0);
        assert_eq!(c.state(), ComponentState::Active);
    }

    #[test]
    fn test_tick_noop_when_off() {
        let mut c = component(vec![fuel(5.0, 0.0, 3.0)]);
        let mut log = EventLog::new();
        c.tick(&mut log, &mut DiscardOverflow);
        assert_eq!(c.inputs()[0].level(), 5.0);
        assert_eq!(c.time_on_component(), 0.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_low_input_records_failure_on_tick() {
        let mut c = component(vec![fuel(1.0, 2.0, 0.5)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut DiscardOverflow);

        let expected = FailureReason::low_resource("Engine", ResourceType::Fuel);
        assert_eq!(c.current_failure(), Some(&expected));
        assert_eq!(log.events(), &[ComponentEvent::Failed(expected)]);
        assert!(!c.is_active());
        assert_eq!(c.state(), ComponentState::Failed);
    }

    #[test]
    fn test_shortage_does_not_stop_the_detecting_tick() {
        let power = BufferConfig::new(ResourceType::Power)
            .with_capacity(10.0)
            .with_rate(2.0)
            .with_level(8.0);
        let mut c = component(vec![fuel(1.0, 2.0, 0.5), power]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut DiscardOverflow);

        assert_eq!(c.inputs()[0].level(), 0.5);
        assert_eq!(c.inputs()[1].level(), 6.0);

        // Later ticks idle until the shortage is fixed
        c.tick(&mut log, &mut DiscardOverflow);
        assert_eq!(c.inputs()[1].level(), 6.0);
        assert_eq!(log.failures().count(), 1);
    }

    #[test]
    fn test_every_short_input_is_reported() {
        let coolant = BufferConfig::new(ResourceType::Coolant)
            .with_capacity(10.0)
            .with_minimum(3.0)
            .with_level(0.0);
        let mut c = component(vec![fuel(0.0, 1.0, 0.0), coolant]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut DiscardOverflow);

        let reported: Vec<_> = log.failures().map(|r| r.code()).collect();
        assert_eq!(
            reported,
            vec![
                "LowOrZeroResource:Fuel,Engine".to_string(),
                "LowOrZeroResource:Coolant,Engine".to_string()
            ]
        );
        assert_eq!(
            c.current_failure(),
            Some(&FailureReason::low_resource("Engine", ResourceType::Coolant))
        );
    }

    #[test]
    fn test_recovers_after_replenish() {
        let mut c = component(vec![fuel(1.0, 2.0, 1.0)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut DiscardOverflow);
        assert_eq!(c.state(), ComponentState::Failed);

        assert_eq!(c.replenish(ResourceType::Fuel, 5.0), Ok(0.0));
        log.drain();
        c.tick(&mut log, &mut DiscardOverflow);

        assert!(c.current_failure().is_none());
        assert!(c.is_active());
        assert_eq!(log.events(), &[ComponentEvent::Activated]);
        // Recovery tick does not drain; the next one does
        assert_eq!(c.inputs()[0].level(), 5.0);
        c.tick(&mut log, &mut DiscardOverflow);
        assert_eq!(c.inputs()[0].level(), 4.0);
    }

    #[test]
    fn test_switch_off_reports_pending_failure_first() {
        let mut c = component(vec![fuel(1.0, 2.0, 0.0)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut DiscardOverflow);
        log.drain();

        c.switch_off(&mut log);
        let reason = FailureReason::low_resource("Engine", ResourceType::Fuel);
        assert_eq!(
            log.events(),
            &[ComponentEvent::Failed(reason), ComponentEvent::Deactivated]
        );
        assert_eq!(c.state(), ComponentState::Off);
    }

    #[test]
    fn test_switch_off_without_failure() {
        let mut c = component(vec![fuel(5.0, 0.0, 0.0)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        log.drain();
        c.switch_off(&mut log);
        assert_eq!(log.events(), &[ComponentEvent::Deactivated]);
    }

    #[test]
    fn test_same_type_overflow_is_summed() {
        let tank = |level| {
            BufferConfig::new(ResourceType::Coolant)
                .with_capacity(10.0)
                .with_rate(-4.0)
                .with_level(level)
        };
        let mut c = component(vec![tank(8.0), tank(8.0)]);
        let mut log = EventLog::new();
        let mut ledger = OverflowLedger::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut ledger);

        assert_eq!(ledger.surplus(ResourceType::Coolant), 4.0);
        assert_eq!(ledger.ticks_with_overflow(), 1);
    }

    #[test]
    fn test_opposite_overflow_cancels() {
        let mut c = component(vec![
            BufferConfig::new(ResourceType::Coolant)
                .with_capacity(10.0)
                .with_rate(-4.0)
                .with_level(8.0),
            BufferConfig::new(ResourceType::Coolant)
                .with_capacity(10.0)
                .with_rate(4.0)
                .with_level(2.0),
        ]);
        let mut log = EventLog::new();
        let mut ledger = OverflowLedger::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut ledger);

        // +2 spilled from one tank, -2 short on the other
        assert_eq!(ledger.ticks_with_overflow(), 0);
        assert_eq!(ledger.surplus(ResourceType::Coolant), 0.0);
        assert_eq!(ledger.deficit(ResourceType::Coolant), 0.0);
    }

    #[test]
    fn test_policy_not_called_without_overflow() {
        let mut c = component(vec![fuel(5.0, 0.0, 1.0)]);
        let mut log = EventLog::new();
        let mut ledger = OverflowLedger::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut ledger);
        assert_eq!(ledger.ticks_with_overflow(), 0);
    }

    #[test]
    fn test_wear_failure_halts_until_reset() {
        let mut c = component(vec![fuel(8.0, 0.0, 1.0)]);
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        c.tick(&mut log, &mut DiscardOverflow);

        let wear = FailureReason::component_wear("Engine");
        c.fail_with(wear.clone(), &mut log);
        c.fail_with(wear.clone(), &mut log);
        assert_eq!(log.failures().count(), 1);
        assert!(!c.is_active());

        c.tick(&mut log, &mut DiscardOverflow);
        assert_eq!(c.inputs()[0].level(), 7.0);
        assert_eq!(c.current_failure(), Some(&wear));

        c.reset();
        assert_eq!(c.time_on_component(), 0.0);
        assert!(c.is_active());
        c.tick(&mut log, &mut DiscardOverflow);
        assert_eq!(c.inputs()[0].level(), 6.0);
    }

    #[test]
    fn test_operating_time_follows_tick_length() {
        let config = ComponentConfig::new("Scrubber")
            .input(fuel(8.0, 0.0, 1.0))
            .with_tick_length(0.5);
        let mut c = VehicleComponent::from_config(&config).unwrap();
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        for _ in 0..3 {
            c.tick(&mut log, &mut DiscardOverflow);
        }
        assert_eq!(c.time_on_component(), 1.5);
        assert_eq!(c.inputs()[0].level(), 5.0);
    }

    #[test]
    fn test_buffer_level_lookup() {
        let config = ComponentConfig::new("Generator")
            .input(fuel(4.0, 0.0, 1.0))
            .output(BufferConfig::new(ResourceType::Power).with_capacity(50.0));
        let c = VehicleComponent::from_config(&config).unwrap();

        assert_eq!(
            c.get_buffer_level(ResourceType::Power, BufferDirection::Output),
            Ok((0.0, 50.0))
        );
        assert_eq!(
            c.get_buffer_level(ResourceType::Power, BufferDirection::Input),
            Err(BufferQueryError::NotFound {
                resource_type: ResourceType::Power,
                direction: BufferDirection::Input,
            })
        );
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(
            "input".parse::<BufferDirection>(),
            Ok(BufferDirection::Input)
        );
        assert_eq!(
            " Output ".parse::<BufferDirection>(),
            Ok(BufferDirection::Output)
        );
        assert!(matches!(
            "sideways".parse::<BufferDirection>(),
            Err(BufferQueryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_replenish_unknown_resource() {
        let mut c = component(vec![fuel(4.0, 0.0, 1.0)]);
        assert!(matches!(
            c.replenish(ResourceType::Water, 1.0),
            Err(BufferQueryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_any_buffer_only_matches_any() {
        let mut c = component(vec![BufferConfig::new(ResourceType::Any)
            .with_capacity(10.0)
            .with_level(5.0)]);
        assert!(c.buffer(ResourceType::Fuel, BufferDirection::Input).is_none());
        assert!(c.replenish(ResourceType::Fuel, 1.0).is_err());
        assert_eq!(c.replenish(ResourceType::Any, 1.0), Ok(0.0));
    }

    #[test]
    fn test_outputs_are_not_driven() {
        let config = ComponentConfig::new("Generator")
            .input(fuel(9.0, 0.0, 1.0))
            .output(
                BufferConfig::new(ResourceType::Power)
                    .with_capacity(50.0)
                    .with_rate(5.0),
            );
        let mut c = VehicleComponent::from_config(&config).unwrap();
        let mut log = EventLog::new();
        c.switch_on(&mut log);
        for _ in 0..3 {
            c.tick(&mut log, &mut DiscardOverflow);
        }
        assert_eq!(c.outputs()[0].level(), 0.0);
        assert_eq!(c.inputs()[0].level(), 6.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ComponentConfig::new("").input(fuel(1.0, 0.0, 0.0));
        assert!(VehicleComponent::from_config(&config).is_err());
    }
}
