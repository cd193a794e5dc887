// Domain layer: lead/agent/list models and the ports the core depends on.
// No I/O here; concrete backends live under adapters.

pub mod model;
pub mod ports;
