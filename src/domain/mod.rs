// Domain layer: payload model, derived records and the ports the pipeline stages depend on.

pub mod model;
pub mod ports;
