use std::fmt;

use serde::{Deserialize, Serialize};

/// The three scheduling policies the junction can run.
///
/// The set is closed: the selector picks one variant per cycle and the
/// scheduler dispatches with an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingAlgorithm {
    /// Favor the lightest-loaded lane to keep total waiting low.
    ShortestDemandFirst,
    /// Drain lanes carrying emergency vehicles first.
    Priority,
    /// Rotate through non-empty lanes with a fixed per-turn quota.
    RoundRobin,
}

impl SchedulingAlgorithm {
    /// Human-readable label used in logs and the demo output.
    pub fn label(&self) -> &'static str {
        match self {
            SchedulingAlgorithm::ShortestDemandFirst => "Shortest Demand First",
            SchedulingAlgorithm::Priority => "Priority Scheduling",
            SchedulingAlgorithm::RoundRobin => "Round Robin",
        }
    }
}

impl fmt::Display for SchedulingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_display() {
        for algorithm in [
            SchedulingAlgorithm::ShortestDemandFirst,
            SchedulingAlgorithm::Priority,
            SchedulingAlgorithm::RoundRobin,
        ] {
            assert_eq!(algorithm.to_string(), algorithm.label());
        }
    }

    #[test]
    fn serializes_as_snake_case_names() {
        let json = serde_json::to_string(&SchedulingAlgorithm::ShortestDemandFirst).unwrap();
        assert_eq!(json, "\"shortest_demand_first\"");
        let parsed: SchedulingAlgorithm = serde_json::from_str("\"round_robin\"").unwrap();
        assert_eq!(parsed, SchedulingAlgorithm::RoundRobin);
    }
}
