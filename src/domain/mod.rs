// Domain layer: records, rendered output and the ports the pipeline talks through.

pub mod model;
pub mod ports;
