//! Wear system - random wear failures driven by each component's schedule
//!
//! Opt-in. Each running component rolls once per tick against the failure
//! chance its schedule gives for its accumulated operating time.

use crate::journal::NotificationJournal;
use hecs::World;
use rand::Rng;
use rigsim_logic::{EventLog, FailureReason, VehicleComponent};

/// Roll wear for every active component. Returns how many failed this tick.
pub fn wear_system(
    world: &mut World,
    journal: &mut NotificationJournal,
    tick: u64,
    rng: &mut impl Rng,
) -> u32 {
    let mut failures = 0;
    let mut events = EventLog::new();

    for (entity, component) in world.query::<&mut VehicleComponent>().iter() {
        if !component.is_active() || component.wear_schedule().is_inert() {
            continue;
        }

        let sample: f32 = rng.gen();
        if component
            .wear_schedule()
            .rolls_failure(component.time_on_component(), sample)
        {
            let reason = FailureReason::component_wear(component.name());
            component.fail_with(reason, &mut events);
            journal.record_all(tick, entity, component.name(), events.drain());
            failures += 1;
        }
    }

    failures
}
