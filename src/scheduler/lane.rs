use serde::{Deserialize, Serialize};

/// Represents one approach lane contending for the intersection.
///
/// A lane is a passive record: the scheduler reads its demand counts and
/// writes its grant flag, while the counts themselves are overwritten
/// wholesale by the caller's demand update each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    /// Stable identifier, equal to the lane's position in the scheduler's
    /// lane list.
    pub id: usize,
    /// Display label (e.g. "North"). No effect on scheduling.
    pub name: String,
    /// Regular vehicles waiting in this lane.
    pub regular_count: u32,
    /// Emergency vehicles waiting in this lane.
    pub emergency_count: u32,
    /// Cycles this lane has spent holding the green.
    pub processed_time: u64,
    /// Cycles this lane has spent waiting with demand and no green.
    pub waiting_time: u64,
    /// Whether this lane currently holds the green.
    pub is_green: bool,
    /// Whether the caller reported a vehicle from this lane still inside the
    /// intersection this cycle.
    pub has_vehicle_in_intersection: bool,
}

impl Lane {
    /// Creates an empty lane with the given id and display name.
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            regular_count: 0,
            emergency_count: 0,
            processed_time: 0,
            waiting_time: 0,
            is_green: false,
            has_vehicle_in_intersection: false,
        }
    }

    /// Overwrites the demand snapshot for this lane.
    pub fn update_counts(&mut self, regular: u32, emergency: u32) {
        self.regular_count = regular;
        self.emergency_count = emergency;
    }

    /// Total vehicles currently demanding service from this lane.
    pub fn total_demand(&self) -> u32 {
        self.regular_count.saturating_add(self.emergency_count)
    }

    /// True when any vehicle is waiting in this lane.
    pub fn has_demand(&self) -> bool {
        self.total_demand() > 0
    }
}

/// Creates the four approach lanes of the reference junction.
pub fn create_lanes() -> Vec<Lane> {
    vec![
        Lane::new(0, "North"),
        Lane::new(1, "East"),
        Lane::new(2, "South"),
        Lane::new(3, "West"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lane_starts_empty_and_red() {
        let lane = Lane::new(2, "South");
        assert_eq!(lane.id, 2);
        assert_eq!(lane.name, "South");
        assert_eq!(lane.total_demand(), 0);
        assert!(!lane.has_demand());
        assert!(!lane.is_green);
        assert!(!lane.has_vehicle_in_intersection);
    }

    #[test]
    fn update_counts_overwrites_rather_than_accumulates() {
        let mut lane = Lane::new(0, "North");
        lane.update_counts(4, 1);
        assert_eq!(lane.total_demand(), 5);
        lane.update_counts(2, 0);
        assert_eq!(lane.regular_count, 2);
        assert_eq!(lane.emergency_count, 0);
        assert_eq!(lane.total_demand(), 2);
    }

    #[test]
    fn total_demand_saturates_instead_of_overflowing() {
        let mut lane = Lane::new(1, "East");
        lane.update_counts(u32::MAX, 7);
        assert_eq!(lane.total_demand(), u32::MAX);
    }

    #[test]
    fn reference_junction_has_four_indexed_approaches() {
        let lanes = create_lanes();
        assert_eq!(lanes.len(), 4);
        for (index, lane) in lanes.iter().enumerate() {
            assert_eq!(lane.id, index);
        }
        let names: Vec<&str> = lanes.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["North", "East", "South", "West"]);
    }
}
