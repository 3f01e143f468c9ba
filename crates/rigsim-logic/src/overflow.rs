//! What happens to resource a tick could not fit into its buffers.

use crate::resource::ResourceType;
use std::collections::HashMap;

/// Net overflow per resource type for one tick. Positive = surplus, negative = deficit.
pub type OverflowMap = HashMap<ResourceType, f32>;

/// Add `amount` to the entry for `resource_type`, treating a missing entry as zero.
/// Zero amounts are not recorded.
pub fn accumulate_overflow(map: &mut OverflowMap, resource_type: ResourceType, amount: f32) {
    if amount != 0.0 {
        *map.entry(resource_type).or_insert(0.0) += amount;
    }
}

/// Strategy invoked once per tick when any buffer overflowed.
pub trait OverflowPolicy {
    fn handle(&mut self, overflow: &OverflowMap);
}

impl<P: OverflowPolicy + ?Sized> OverflowPolicy for &mut P {
    fn handle(&mut self, overflow: &OverflowMap) {
        (**self).handle(overflow)
    }
}

/// Drops overflow on the floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardOverflow;

impl OverflowPolicy for DiscardOverflow {
    fn handle(&mut self, overflow: &OverflowMap) {
        log::debug!("discarding overflow for {} resource(s)", overflow.len());
    }
}

/// Running totals of surplus and unmet deficit across ticks.
#[derive(Debug, Clone, Default)]
pub struct OverflowLedger {
    surplus: HashMap<ResourceType, f32>,
    deficit: HashMap<ResourceType, f32>,
    ticks_with_overflow: u32,
}

impl OverflowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total excess that could not be stored.
    pub fn surplus(&self, resource_type: ResourceType) -> f32 {
        self.surplus.get(&resource_type).copied().unwrap_or(0.0)
    }

    /// Total demand that could not be met (reported as a positive magnitude).
    pub fn deficit(&self, resource_type: ResourceType) -> f32 {
        self.deficit.get(&resource_type).copied().unwrap_or(0.0)
    }

    pub fn ticks_with_overflow(&self) -> u32 {
        self.ticks_with_overflow
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl OverflowPolicy for OverflowLedger {
    fn handle(&mut self, overflow: &OverflowMap) {
        self.ticks_with_overflow += 1;
        for (&resource_type, &amount) in overflow {
            if amount > 0.0 {
                *self.surplus.entry(resource_type).or_insert(0.0) += amount;
            } else if amount < 0.0 {
                *self.deficit.entry(resource_type).or_insert(0.0) -= amount;
            }
        }
    }
}
