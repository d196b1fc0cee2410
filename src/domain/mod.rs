// Domain layer: leave-analysis models and the read-only ports the engine consumes.

pub mod model;
pub mod ports;
