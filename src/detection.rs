use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One lane's vehicle counts for one cycle, as produced by a counting
/// collaborator (camera detector, manual entry, or a scripted feed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCounts {
    pub regular_count: u32,
    pub emergency_count: u32,
}

impl VehicleCounts {
    pub fn new(regular_count: u32, emergency_count: u32) -> Self {
        Self {
            regular_count,
            emergency_count,
        }
    }

    /// Merges the raw totals of a two-model detector whose general model
    /// also counts emergency vehicles. The regular count is the general
    /// total minus the emergency total, saturating at zero so a
    /// disagreement between the models can never produce negative demand.
    pub fn from_model_totals(general_total: u32, emergency_total: u32) -> Self {
        Self {
            regular_count: general_total.saturating_sub(emergency_total),
            emergency_count: emergency_total,
        }
    }

    pub fn total(&self) -> u32 {
        self.regular_count.saturating_add(self.emergency_count)
    }
}

/// A per-cycle supplier of lane demand.
///
/// The scheduler consumes exactly one reading per lane per cycle and is
/// agnostic to how the counts were derived.
pub trait DemandSource {
    /// Returns one [`VehicleCounts`] per lane, indexed by lane id.
    fn poll_counts(&mut self) -> Vec<VehicleCounts>;
}

/// A [`DemandSource`] that replays a fixed sequence of frames, one per
/// cycle. Once the script runs out it keeps yielding all-zero frames, which
/// drives the junction into its no-demand steady state.
#[derive(Debug, Clone)]
pub struct ScriptedDemand {
    lane_count: usize,
    frames: VecDeque<Vec<VehicleCounts>>,
}

impl ScriptedDemand {
    /// Builds a script over `lane_count` lanes. Frames shorter than the lane
    /// count are padded with zero counts; longer frames are truncated.
    pub fn new(lane_count: usize, frames: Vec<Vec<VehicleCounts>>) -> Self {
        let frames = frames
            .into_iter()
            .map(|mut frame| {
                frame.resize(lane_count, VehicleCounts::default());
                frame
            })
            .collect();
        Self { lane_count, frames }
    }

    pub fn remaining_frames(&self) -> usize {
        self.frames.len()
    }
}

impl DemandSource for ScriptedDemand {
    fn poll_counts(&mut self) -> Vec<VehicleCounts> {
        self.frames
            .pop_front()
            .unwrap_or_else(|| vec![VehicleCounts::default(); self.lane_count])
    }
}
