// Domain layer: address and result models plus the ports the pipelines are written against.

pub mod model;
pub mod ports;
