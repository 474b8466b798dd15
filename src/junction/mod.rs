// junction/mod.rs
pub mod controller;
pub mod messages;
pub mod service;

pub use controller::{JunctionController, JunctionError};
pub use messages::{CycleDecision, CycleRequest, LaneDemand};
pub use service::{start_junction_service, JunctionHandle};
