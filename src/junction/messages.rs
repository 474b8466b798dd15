use serde::{Deserialize, Serialize};

use crate::detection::{DemandSource, VehicleCounts};
use crate::scheduler::algorithm::SchedulingAlgorithm;
use crate::scheduler::lane::Lane;

/// Demand overwrite for one lane.
///
/// Counts are signed on the wire; the boundary clamps negative readings to
/// zero before they reach the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneDemand {
    pub lane_id: usize,
    #[serde(default)]
    pub regular_count: i64,
    #[serde(default)]
    pub emergency_count: i64,
}

impl LaneDemand {
    pub fn new(lane_id: usize, regular_count: i64, emergency_count: i64) -> Self {
        Self {
            lane_id,
            regular_count,
            emergency_count,
        }
    }

    /// Wraps a detection reading for the given lane.
    pub fn from_counts(lane_id: usize, counts: VehicleCounts) -> Self {
        Self {
            lane_id,
            regular_count: i64::from(counts.regular_count),
            emergency_count: i64::from(counts.emergency_count),
        }
    }
}

fn default_intersection_clear() -> bool {
    true
}

/// One full cycle's input: demand overwrites plus the crossing report.
///
/// Lanes without an entry in `lanes` keep their previous counts, so a
/// detector that only covered some approaches this cycle can still drive
/// the junction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRequest {
    #[serde(default)]
    pub lanes: Vec<LaneDemand>,
    /// Whether all vehicles have finished crossing. Feeds the safety gate.
    #[serde(default = "default_intersection_clear")]
    pub intersection_clear: bool,
    /// Lane ids with a vehicle still inside the intersection this cycle.
    #[serde(default)]
    pub vehicles_in_intersection: Vec<usize>,
}

impl CycleRequest {
    /// A clear-intersection cycle carrying only demand overwrites.
    pub fn with_demand(lanes: Vec<LaneDemand>) -> Self {
        Self {
            lanes,
            intersection_clear: true,
            vehicles_in_intersection: Vec::new(),
        }
    }

    /// Builds the cycle's demand from a counting collaborator, one reading
    /// per lane.
    pub fn from_source(source: &mut dyn DemandSource) -> Self {
        let lanes = source
            .poll_counts()
            .into_iter()
            .enumerate()
            .map(|(lane_id, counts)| LaneDemand::from_counts(lane_id, counts))
            .collect();
        Self::with_demand(lanes)
    }
}

impl Default for CycleRequest {
    fn default() -> Self {
        Self::with_demand(Vec::new())
    }
}

/// The scheduling outcome returned to the caller each cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleDecision {
    /// Granted lane id, or `-1` when no lane holds the green.
    pub next_green_lane: i32,
    pub current_algorithm: SchedulingAlgorithm,
    /// Full post-decision snapshot of every lane.
    pub lane_data: Vec<Lane>,
}

impl CycleDecision {
    /// The granted lane, with the `-1` sentinel mapped back to `None`.
    pub fn granted_lane(&self) -> Option<usize> {
        usize::try_from(self.next_green_lane).ok()
    }
}
