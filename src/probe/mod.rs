//! Environment probes reported by the diagnostic window

pub mod ime;
pub mod system;
