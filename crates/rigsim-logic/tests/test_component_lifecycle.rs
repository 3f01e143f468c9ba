//! Integration tests for the component lifecycle.
//!
//! Exercises: config → VehicleComponent → switch/tick → notifications
//! → overflow policy, through the public API only.

use rigsim_logic::{
    BufferConfig, BufferDirection, ComponentConfig, ComponentEvent, ComponentState,
    DiscardOverflow, EventLog, FailureReason, OverflowMap, OverflowPolicy, ResourceBuffer,
    ResourceType, VehicleComponent,
};

// ── Helpers ────────────────────────────────────────────────────────────

/// Keeps every overflow map it is handed.
#[derive(Default)]
struct CapturePolicy {
    maps: Vec<OverflowMap>,
}

impl OverflowPolicy for CapturePolicy {
    fn handle(&mut self, overflow: &OverflowMap) {
        self.maps.push(overflow.clone());
    }
}

fn single_input(level: f32, minimum: f32, rate: f32) -> VehicleComponent {
    let config = ComponentConfig::new("Reactor").input(
        BufferConfig::new(ResourceType::Fuel)
            .with_capacity(10.0)
            .with_minimum(minimum)
            .with_rate(rate)
            .with_level(level),
    );
    VehicleComponent::from_config(&config).unwrap()
}

// ── Buffer scenarios ───────────────────────────────────────────────────

#[test]
fn drain_inside_bounds() {
    let mut b = ResourceBuffer::new(ResourceType::Fuel, 10.0)
        .with_level(5.0)
        .with_rate(-3.0);
    let overflow = b.apply_delta(b.rate_per_tick());
    assert_eq!((b.level(), overflow), (2.0, 0.0));
}

#[test]
fn drain_below_empty() {
    let mut b = ResourceBuffer::new(ResourceType::Fuel, 10.0)
        .with_level(1.0)
        .with_rate(-5.0);
    let overflow = b.apply_delta(b.rate_per_tick());
    assert_eq!((b.level(), overflow), (0.0, -4.0));
}

#[test]
fn fill_above_capacity() {
    let mut b = ResourceBuffer::new(ResourceType::Fuel, 10.0)
        .with_level(9.0)
        .with_rate(5.0);
    let overflow = b.apply_delta(b.rate_per_tick());
    assert_eq!((b.level(), overflow), (10.0, 4.0));
}

// ── Component scenarios ────────────────────────────────────────────────

#[test]
fn tick_below_minimum_fails_with_low_resource() {
    let mut c = single_input(1.0, 2.0, 0.0);
    let mut log = EventLog::new();
    c.switch_on(&mut log);
    c.tick(&mut log, &mut DiscardOverflow);

    let expected = FailureReason::low_resource("Reactor", ResourceType::Fuel);
    assert_eq!(c.current_failure(), Some(&expected));
    assert_eq!(log.events(), &[ComponentEvent::Failed(expected)]);
}

#[test]
fn switch_off_with_pending_failure_orders_events() {
    let mut c = single_input(1.0, 2.0, 0.0);
    let mut log = EventLog::new();
    c.switch_on(&mut log);
    c.tick(&mut log, &mut DiscardOverflow);
    log.drain();

    c.switch_off(&mut log);
    let events = log.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ComponentEvent::Failed(_)));
    assert_eq!(events[1], ComponentEvent::Deactivated);
}

#[test]
fn same_type_overflow_sums_before_policy() {
    let tank = BufferConfig::new(ResourceType::Coolant)
        .with_capacity(10.0)
        .with_rate(-3.0)
        .with_level(9.0);
    let config = ComponentConfig::new("Radiator")
        .input(tank.clone())
        .input(tank);
    let mut c = VehicleComponent::from_config(&config).unwrap();
    let mut log = EventLog::new();
    let mut policy = CapturePolicy::default();

    c.switch_on(&mut log);
    c.tick(&mut log, &mut policy);

    assert_eq!(policy.maps.len(), 1);
    assert_eq!(policy.maps[0].len(), 1);
    assert!((policy.maps[0][&ResourceType::Coolant] - 4.0).abs() < 1e-6);
}

// ── Invariants over a long run ─────────────────────────────────────────

#[test]
fn active_never_coexists_with_failure_or_off() {
    let config = ComponentConfig::new("Generator")
        .input(
            BufferConfig::new(ResourceType::Fuel)
                .with_capacity(20.0)
                .with_minimum(3.0)
                .with_rate(1.5)
                .with_level(20.0),
        )
        .input(
            BufferConfig::new(ResourceType::Coolant)
                .with_capacity(5.0)
                .with_minimum(1.0)
                .with_rate(0.2)
                .with_level(5.0),
        );
    let mut c = VehicleComponent::from_config(&config).unwrap();
    let mut log = EventLog::new();
    let mut policy = CapturePolicy::default();

    for step in 0..60 {
        match step % 17 {
            0 => c.switch_on(&mut log),
            11 => {
                let _ = c.replenish(ResourceType::Fuel, 6.0);
            }
            15 => c.switch_off(&mut log),
            _ => c.tick(&mut log, &mut policy),
        }

        if c.current_failure().is_some() || !c.is_switched_on() {
            assert!(!c.is_active(), "step {}", step);
        }
        for b in c.inputs() {
            assert!(b.level() >= 0.0 && b.level() <= b.capacity());
        }
        if c.state() == ComponentState::Active {
            assert!(c.is_active());
        }
    }
}

#[test]
fn burn_until_starved_then_recover() {
    let mut c = single_input(10.0, 2.0, 2.0);
    let mut log = EventLog::new();
    c.switch_on(&mut log);

    let mut ticks = 0;
    while c.current_failure().is_none() && ticks < 100 {
        c.tick(&mut log, &mut DiscardOverflow);
        ticks += 1;
    }
    // 10 → 8 → 6 → 4 → 2 → 0; the sixth tick sees 0 < 2
    assert_eq!(ticks, 6);
    assert_eq!(log.failures().count(), 1);
    assert_eq!(c.time_on_component(), 6.0);

    c.replenish(ResourceType::Fuel, 10.0).unwrap();
    c.tick(&mut log, &mut DiscardOverflow);
    assert!(c.is_active());
    assert_eq!(
        c.get_buffer_level(ResourceType::Fuel, BufferDirection::Input),
        Ok((10.0, 10.0))
    );
}
