//! Component tick system - advances every hosted component by one step

use crate::journal::NotificationJournal;
use hecs::World;
use rigsim_logic::{EventLog, OverflowLedger, VehicleComponent};

/// Tick every component once, journaling what each one reports.
///
/// Components are independent: no resource moves between entities here.
pub fn component_tick_system(world: &mut World, journal: &mut NotificationJournal, tick: u64) {
    let mut events = EventLog::new();

    for (entity, (component, ledger)) in world
        .query::<(&mut VehicleComponent, &mut OverflowLedger)>()
        .iter()
    {
        component.tick(&mut events, ledger);
        if !events.is_empty() {
            journal.record_all(tick, entity, component.name(), events.drain());
        }
    }
}

/// Count of components currently running
pub fn count_active(world: &World) -> usize {
    world
        .query::<&VehicleComponent>()
        .iter()
        .filter(|(_, c)| c.is_active())
        .count()
}
