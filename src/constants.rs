// Scheduling thresholds and quotas

/// Vehicle-count gap between the busiest and quietest non-empty lanes at
/// which the selector switches from round robin to shortest demand first.
pub const DEMAND_GAP_THRESHOLD: u32 = 5;

/// Maximum consecutive service cycles a lane keeps its green under round
/// robin before the turn passes on.
pub const ROUND_ROBIN_CYCLE_QUOTA: u32 = 5;

/// Quota bounds for shortest demand first: half the lane's vehicles, but at
/// least one and at most two per grant.
pub const SHORTEST_DEMAND_QUOTA_MIN: u32 = 1;
pub const SHORTEST_DEMAND_QUOTA_MAX: u32 = 2;

/// Quota floors under priority scheduling. Lanes carrying emergency vehicles
/// get a higher floor so they drain faster.
pub const PRIORITY_EMERGENCY_QUOTA_MIN: u32 = 2;
pub const PRIORITY_REGULAR_QUOTA_MIN: u32 = 1;

// Junction shape

/// A junction needs at least two contending approaches to schedule.
pub const MIN_LANE_COUNT: usize = 2;
