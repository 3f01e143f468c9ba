//! Systems - logic that operates on hosted components

mod component_tick;
mod wear;

pub use component_tick::*;
pub use wear::*;
