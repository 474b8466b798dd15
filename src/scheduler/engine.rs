use std::cmp::Reverse;

use crate::constants::{
    DEMAND_GAP_THRESHOLD, MIN_LANE_COUNT, PRIORITY_EMERGENCY_QUOTA_MIN,
    PRIORITY_REGULAR_QUOTA_MIN, ROUND_ROBIN_CYCLE_QUOTA, SHORTEST_DEMAND_QUOTA_MAX,
    SHORTEST_DEMAND_QUOTA_MIN,
};
use crate::scheduler::algorithm::SchedulingAlgorithm;
use crate::scheduler::lane::Lane;

/// Mutable grant bookkeeping, threaded explicitly through each policy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GrantState {
    /// Lane currently (or most recently) holding the green.
    green_lane: Option<usize>,
    /// Consecutive cycles the current grant has been serviced. Each policy
    /// maintains its own meaning for this counter.
    consecutive_cycles: u32,
    /// Remaining vehicles the current grant may pass before reselection.
    vehicle_quota: u32,
}

impl GrantState {
    fn cleared() -> Self {
        Self {
            green_lane: None,
            consecutive_cycles: 0,
            vehicle_quota: 0,
        }
    }
}

/// The per-junction scheduling engine.
///
/// One instance owns the lane set and all grant state for a single
/// intersection. The per-cycle flow is: overwrite lane demand, set the
/// crossing gate, run [`select_algorithm`](Self::select_algorithm), then run
/// [`schedule_next_lane`](Self::schedule_next_lane). The engine performs no
/// I/O and never blocks; callers must serialize cycles against one instance.
pub struct TrafficScheduler {
    lanes: Vec<Lane>,
    current_algorithm: SchedulingAlgorithm,
    grant: GrantState,
    lane_crossings_complete: bool,
}

impl TrafficScheduler {
    /// Creates a scheduler over the given lanes.
    ///
    /// # Panics
    ///
    /// Panics when fewer than two lanes are supplied or when a lane's `id`
    /// does not match its position. The boundary layer validates both, so a
    /// trip here is a caller contract violation.
    pub fn new(lanes: Vec<Lane>) -> Self {
        assert!(
            lanes.len() >= MIN_LANE_COUNT,
            "a junction needs at least {} lanes, got {}",
            MIN_LANE_COUNT,
            lanes.len()
        );
        for (index, lane) in lanes.iter().enumerate() {
            assert_eq!(
                lane.id, index,
                "lane id {} does not match its position {}",
                lane.id, index
            );
        }
        Self {
            lanes,
            current_algorithm: SchedulingAlgorithm::RoundRobin,
            grant: GrantState::cleared(),
            lane_crossings_complete: true,
        }
    }

    /// All lanes in id order.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// The policy chosen by the most recent selector run.
    pub fn current_algorithm(&self) -> SchedulingAlgorithm {
        self.current_algorithm
    }

    /// The lane holding (or, after a no-grant cycle, most recently holding)
    /// the green.
    pub fn current_green_lane(&self) -> Option<usize> {
        self.grant.green_lane
    }

    /// Consecutive service cycles of the current grant.
    pub fn consecutive_cycles(&self) -> u32 {
        self.grant.consecutive_cycles
    }

    /// Remaining vehicle quota of the current grant.
    pub fn vehicle_quota(&self) -> u32 {
        self.grant.vehicle_quota
    }

    pub fn crossings_complete(&self) -> bool {
        self.lane_crossings_complete
    }

    /// Records whether all vehicles have finished crossing the intersection.
    /// Must be set before each scheduling decision.
    pub fn set_crossing_status(&mut self, complete: bool) {
        self.lane_crossings_complete = complete;
    }

    /// Overwrites one lane's demand snapshot.
    ///
    /// # Panics
    ///
    /// Panics when `lane_id` is out of range; the boundary layer rejects
    /// unknown lane ids before they reach the engine.
    pub fn update_lane_demand(&mut self, lane_id: usize, regular: u32, emergency: u32) {
        self.lanes[lane_id].update_counts(regular, emergency);
    }

    /// Marks which lanes the caller reported as still occupying the
    /// intersection this cycle; all other lanes are cleared.
    pub fn mark_vehicles_in_intersection(&mut self, occupying: &[usize]) {
        for lane in &mut self.lanes {
            lane.has_vehicle_in_intersection = occupying.contains(&lane.id);
        }
    }

    /// Picks the scheduling policy for this cycle from current demand.
    ///
    /// Emergency vehicles anywhere force priority scheduling. Otherwise a
    /// demand gap of at least [`DEMAND_GAP_THRESHOLD`] between the quietest
    /// and busiest non-empty lanes (two such lanes minimum) selects shortest
    /// demand first. Everything else runs round robin.
    pub fn select_algorithm(&mut self) -> SchedulingAlgorithm {
        let emergency_total: u64 = self
            .lanes
            .iter()
            .map(|lane| u64::from(lane.emergency_count))
            .sum();
        if emergency_total > 0 {
            self.current_algorithm = SchedulingAlgorithm::Priority;
            log::debug!(
                "selected algorithm {} (emergency vehicles present)",
                self.current_algorithm
            );
            return self.current_algorithm;
        }

        let demands: Vec<(usize, u32)> = self
            .lanes
            .iter()
            .filter(|lane| lane.has_demand())
            .map(|lane| (lane.id, lane.total_demand()))
            .collect();
        if demands.len() >= 2 {
            let min_entry = demands.iter().min_by_key(|entry| entry.1).copied();
            let max_entry = demands.iter().max_by_key(|entry| entry.1).copied();
            if let (Some((min_id, min_demand)), Some((max_id, max_demand))) = (min_entry, max_entry)
            {
                if max_demand - min_demand >= DEMAND_GAP_THRESHOLD {
                    self.current_algorithm = SchedulingAlgorithm::ShortestDemandFirst;
                    log::debug!(
                        "selected algorithm {} (gap between lanes {}:{} and {}:{})",
                        self.current_algorithm,
                        min_id,
                        min_demand,
                        max_id,
                        max_demand
                    );
                    return self.current_algorithm;
                }
            }
        }

        self.current_algorithm = SchedulingAlgorithm::RoundRobin;
        log::debug!("selected algorithm {} (default)", self.current_algorithm);
        self.current_algorithm
    }

    /// Decides which lane holds the green for this cycle.
    ///
    /// When the crossing gate reports vehicles still in the intersection the
    /// current grant is returned untouched: no policy runs and no counter
    /// moves. Otherwise the active policy decides, the chosen lane (if any)
    /// is committed as the sole green lane, and the accounting fields tick.
    pub fn schedule_next_lane(&mut self) -> Option<usize> {
        if !self.lane_crossings_complete {
            log::debug!(
                "crossings in progress, holding grant on {:?}",
                self.grant.green_lane
            );
            return self.grant.green_lane;
        }

        // Reset the green status for all lanes before recommitting.
        for lane in &mut self.lanes {
            lane.is_green = false;
        }

        let previous = self.grant.green_lane;
        let next = match self.current_algorithm {
            SchedulingAlgorithm::ShortestDemandFirst => {
                run_shortest_demand_first(&self.lanes, &mut self.grant)
            }
            SchedulingAlgorithm::Priority => run_priority(&self.lanes, &mut self.grant),
            SchedulingAlgorithm::RoundRobin => run_round_robin(&self.lanes, &mut self.grant),
        };

        if let Some(next_id) = next {
            debug_assert!(next_id < self.lanes.len(), "policy produced an unknown lane");
            self.lanes[next_id].is_green = true;
            self.grant.green_lane = Some(next_id);
            // Round robin counts its own cycles inside the policy.
            if previous != Some(next_id)
                && self.current_algorithm != SchedulingAlgorithm::RoundRobin
            {
                self.grant.consecutive_cycles = 1;
            }
        }

        self.tick_accounting();
        next
    }

    /// Returns the junction to its initial state: all counts and accounting
    /// zeroed, no grant, gate open, and the policy re-derived from the
    /// now-empty demand.
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.regular_count = 0;
            lane.emergency_count = 0;
            lane.processed_time = 0;
            lane.waiting_time = 0;
            lane.is_green = false;
            lane.has_vehicle_in_intersection = false;
        }
        self.grant = GrantState::cleared();
        self.lane_crossings_complete = true;
        self.select_algorithm();
        log::info!("scheduler reset, algorithm {}", self.current_algorithm);
    }

    fn tick_accounting(&mut self) {
        for lane in &mut self.lanes {
            if lane.is_green {
                lane.processed_time += 1;
            } else if lane.has_demand() {
                lane.waiting_time += 1;
            }
        }
    }
}

/// Shared continuation step for the quota-based policies.
///
/// Keeps the current grant while its lane still has demand and quota: the
/// first cycle of a grant sizes the quota via `quota_rule`, later cycles
/// consume one vehicle each. Returns `None` when the grant should be
/// reselected instead.
fn try_continue_grant(
    lanes: &[Lane],
    grant: &mut GrantState,
    quota_rule: impl Fn(&Lane) -> u32,
    policy: &str,
) -> Option<usize> {
    let current = grant.green_lane?;
    let lane = &lanes[current];
    if !lane.has_demand() {
        return None;
    }

    if grant.consecutive_cycles == 0 {
        grant.vehicle_quota = quota_rule(lane);
        grant.consecutive_cycles = 1;
        log::debug!(
            "{} set quota of {} vehicles for lane {}",
            policy,
            grant.vehicle_quota,
            current
        );
        return Some(current);
    }

    if grant.vehicle_quota > 0 {
        // One vehicle passes through per cycle.
        grant.vehicle_quota -= 1;
        grant.consecutive_cycles += 1;
        log::debug!(
            "{} kept lane {} green, remaining quota {}",
            policy,
            current,
            grant.vehicle_quota
        );
        return Some(current);
    }

    None
}

/// Reselection rule shared by shortest demand first and the priority
/// fallback: the non-empty lane with the fewest vehicles, ties to the lowest
/// lane id.
fn select_shortest(lanes: &[Lane]) -> Option<usize> {
    let chosen = lanes
        .iter()
        .filter(|lane| lane.has_demand())
        .min_by_key(|lane| lane.total_demand())?;
    log::debug!(
        "shortest demand selected lane {} with {} vehicles",
        chosen.id,
        chosen.total_demand()
    );
    Some(chosen.id)
}

fn shortest_demand_quota(lane: &Lane) -> u32 {
    (lane.total_demand() / 2).clamp(SHORTEST_DEMAND_QUOTA_MIN, SHORTEST_DEMAND_QUOTA_MAX)
}

fn priority_quota(lane: &Lane) -> u32 {
    let half = lane.total_demand() / 2;
    if lane.emergency_count > 0 {
        half.max(PRIORITY_EMERGENCY_QUOTA_MIN)
    } else {
        half.max(PRIORITY_REGULAR_QUOTA_MIN)
    }
}

fn run_shortest_demand_first(lanes: &[Lane], grant: &mut GrantState) -> Option<usize> {
    if lanes.iter().all(|lane| !lane.has_demand()) {
        return None;
    }

    if let Some(kept) = try_continue_grant(lanes, grant, shortest_demand_quota, "shortest demand") {
        return Some(kept);
    }

    // Switching lanes: the next grant initializes its own quota.
    grant.consecutive_cycles = 0;
    select_shortest(lanes)
}

fn run_priority(lanes: &[Lane], grant: &mut GrantState) -> Option<usize> {
    if lanes.iter().all(|lane| !lane.has_demand()) {
        return None;
    }

    if let Some(kept) = try_continue_grant(lanes, grant, priority_quota, "priority") {
        return Some(kept);
    }

    grant.consecutive_cycles = 0;

    let mut candidates: Vec<&Lane> = lanes
        .iter()
        .filter(|lane| lane.emergency_count > 0 && lane.has_demand())
        .collect();
    if candidates.is_empty() {
        log::debug!("priority found no emergency lanes, falling back to shortest demand");
        return select_shortest(lanes);
    }

    // Stable sort: equally loaded emergency lanes keep id order, so the
    // lowest id wins the tie.
    candidates.sort_by_key(|lane| Reverse(lane.emergency_count));
    let chosen = candidates[0];
    log::debug!(
        "priority selected lane {} with {} emergency vehicles",
        chosen.id,
        chosen.emergency_count
    );
    Some(chosen.id)
}

fn run_round_robin(lanes: &[Lane], grant: &mut GrantState) -> Option<usize> {
    if lanes.iter().all(|lane| !lane.has_demand()) {
        return None;
    }

    if let Some(current) = grant.green_lane {
        if lanes[current].has_demand() && grant.consecutive_cycles < ROUND_ROBIN_CYCLE_QUOTA {
            grant.consecutive_cycles += 1;
            log::debug!(
                "round robin kept lane {} green, consecutive cycles {}",
                current,
                grant.consecutive_cycles
            );
            return Some(current);
        }
    }

    // Turn over: walk the ring starting just past the current lane and grant
    // the first lane with demand. The granting cycle is that lane's first
    // service cycle.
    grant.consecutive_cycles = 0;
    let start = grant.green_lane.map(|id| id + 1).unwrap_or(0);
    for offset in 0..lanes.len() {
        let candidate = (start + offset) % lanes.len();
        if lanes[candidate].has_demand() {
            grant.consecutive_cycles = 1;
            log::debug!("round robin switched to lane {}", candidate);
            return Some(candidate);
        }
    }

    None
}
