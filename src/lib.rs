//! Cyclic traffic-signal scheduling for a single junction.
//!
//! The [`scheduler`] module holds the policy engine, [`junction`] wraps it
//! behind a validated request/decision boundary plus an async service task,
//! and [`detection`] adapts vehicle-counting collaborators into per-lane
//! demand.

pub mod constants;
pub mod detection;
pub mod junction;
pub mod scheduler;

pub use detection::{DemandSource, ScriptedDemand, VehicleCounts};
pub use junction::{
    start_junction_service, CycleDecision, CycleRequest, JunctionController, JunctionError,
    JunctionHandle, LaneDemand,
};
pub use scheduler::{create_lanes, Lane, SchedulingAlgorithm, TrafficScheduler};
