// scheduler/mod.rs
pub mod algorithm;
pub mod engine;
pub mod lane;

pub use algorithm::SchedulingAlgorithm;
pub use engine::TrafficScheduler;
pub use lane::{create_lanes, Lane};
