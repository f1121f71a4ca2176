// Domain layer: core models and ports (interfaces). No external dependencies beyond std/serde/chrono.

pub mod model;
pub mod ports;
pub mod profile;

pub mod services;
