// Domain layer: request/result models, the opaque policy document and ports (interfaces).

pub mod document;
pub mod model;
pub mod ports;
