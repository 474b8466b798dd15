use thiserror::Error;

use crate::constants::MIN_LANE_COUNT;
use crate::junction::messages::{CycleDecision, CycleRequest};
use crate::scheduler::algorithm::SchedulingAlgorithm;
use crate::scheduler::engine::TrafficScheduler;
use crate::scheduler::lane::{create_lanes, Lane};

/// Errors surfaced at the junction boundary. Requests that fail here are
/// rejected before any scheduler state changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JunctionError {
    /// The request referenced a lane id this junction does not have.
    #[error("unknown lane id {0}")]
    UnknownLane(usize),
    /// A junction cannot operate with fewer than two lanes.
    #[error("a junction needs at least two lanes, got {0}")]
    TooFewLanes(usize),
    /// The owning service task has stopped, so the handle is dead.
    #[error("junction service is no longer running")]
    ServiceClosed,
}

/// Owns one [`TrafficScheduler`] and translates wire requests into engine
/// calls.
///
/// All validation and clamping happens here; by the time the engine sees a
/// lane id or a vehicle count it is known to be good. The controller is the
/// scheduler's single writer.
pub struct JunctionController {
    scheduler: TrafficScheduler,
}

impl JunctionController {
    /// Builds a junction from approach names, one lane per name in order.
    pub fn new(lane_names: &[&str]) -> Result<Self, JunctionError> {
        if lane_names.len() < MIN_LANE_COUNT {
            return Err(JunctionError::TooFewLanes(lane_names.len()));
        }
        let lanes = lane_names
            .iter()
            .enumerate()
            .map(|(id, name)| Lane::new(id, *name))
            .collect();
        Ok(Self {
            scheduler: TrafficScheduler::new(lanes),
        })
    }

    /// Runs one full scheduling cycle from a wire request.
    ///
    /// The request is validated as a whole first: if any referenced lane id
    /// is unknown, nothing is applied. Negative counts clamp to zero rather
    /// than failing, since a bad detector frame should not stall the
    /// junction.
    pub fn run_cycle(&mut self, request: &CycleRequest) -> Result<CycleDecision, JunctionError> {
        self.validate(request)?;

        for update in &request.lanes {
            let regular = clamp_count(update.regular_count);
            let emergency = clamp_count(update.emergency_count);
            self.scheduler
                .update_lane_demand(update.lane_id, regular, emergency);
        }
        self.scheduler
            .mark_vehicles_in_intersection(&request.vehicles_in_intersection);
        self.scheduler.set_crossing_status(request.intersection_clear);

        // The policy choice tracks the latest demand even on cycles where
        // the grant cannot move.
        self.scheduler.select_algorithm();

        let granted = if self.must_hold_current_grant(&request.vehicles_in_intersection) {
            let current = self.scheduler.current_green_lane();
            log::debug!(
                "holding lane {:?} green until its vehicle clears the intersection",
                current
            );
            current
        } else {
            self.scheduler.schedule_next_lane()
        };

        Ok(self.decision(granted))
    }

    /// Returns every lane to its initial state and hands back the snapshot.
    pub fn reset(&mut self) -> Vec<Lane> {
        self.scheduler.reset();
        self.scheduler.lanes().to_vec()
    }

    pub fn lanes(&self) -> &[Lane] {
        self.scheduler.lanes()
    }

    pub fn current_algorithm(&self) -> SchedulingAlgorithm {
        self.scheduler.current_algorithm()
    }

    pub fn current_green_lane(&self) -> Option<usize> {
        self.scheduler.current_green_lane()
    }

    pub fn is_lane_green(&self, lane_id: usize) -> Result<bool, JunctionError> {
        self.lanes()
            .get(lane_id)
            .map(|lane| lane.is_green)
            .ok_or(JunctionError::UnknownLane(lane_id))
    }

    fn validate(&self, request: &CycleRequest) -> Result<(), JunctionError> {
        let lane_count = self.scheduler.lane_count();
        for update in &request.lanes {
            if update.lane_id >= lane_count {
                return Err(JunctionError::UnknownLane(update.lane_id));
            }
        }
        for &lane_id in &request.vehicles_in_intersection {
            if lane_id >= lane_count {
                return Err(JunctionError::UnknownLane(lane_id));
            }
        }
        Ok(())
    }

    /// The grant stays put while the granted lane itself still has a
    /// vehicle inside the intersection, even if the gate would allow a
    /// switch. Only an actually-green lane can be held.
    fn must_hold_current_grant(&self, occupying: &[usize]) -> bool {
        match self.scheduler.current_green_lane() {
            Some(current) => self.lanes()[current].is_green && occupying.contains(&current),
            None => false,
        }
    }

    fn decision(&self, granted: Option<usize>) -> CycleDecision {
        CycleDecision {
            next_green_lane: granted.map_or(-1, |id| id as i32),
            current_algorithm: self.scheduler.current_algorithm(),
            lane_data: self.scheduler.lanes().to_vec(),
        }
    }
}

/// The reference four-approach junction.
impl Default for JunctionController {
    fn default() -> Self {
        Self {
            scheduler: TrafficScheduler::new(create_lanes()),
        }
    }
}

fn clamp_count(raw: i64) -> u32 {
    raw.clamp(0, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junction::messages::LaneDemand;

    fn demand_request(lanes: Vec<LaneDemand>) -> CycleRequest {
        CycleRequest::with_demand(lanes)
    }

    #[test]
    fn default_junction_has_four_named_approaches() {
        let junction = JunctionController::default();
        let names: Vec<&str> = junction.lanes().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["North", "East", "South", "West"]);
    }

    #[test]
    fn new_rejects_a_single_lane() {
        let result = JunctionController::new(&["Only"]);
        assert_eq!(result.err(), Some(JunctionError::TooFewLanes(1)));
    }

    #[test]
    fn unknown_lane_in_demand_rejects_the_whole_request() {
        let mut junction = JunctionController::default();
        let request = demand_request(vec![
            LaneDemand::new(0, 6, 0),
            LaneDemand::new(7, 3, 0),
        ]);

        let result = junction.run_cycle(&request);
        assert_eq!(result.err(), Some(JunctionError::UnknownLane(7)));
        // The valid half of the batch must not have been applied either.
        assert_eq!(junction.lanes()[0].regular_count, 0);
        assert_eq!(junction.current_green_lane(), None);
    }

    #[test]
    fn unknown_lane_in_the_occupying_set_rejects_the_request() {
        let mut junction = JunctionController::default();
        let request = CycleRequest {
            lanes: vec![LaneDemand::new(0, 6, 0)],
            vehicles_in_intersection: vec![9],
            ..CycleRequest::default()
        };

        let result = junction.run_cycle(&request);
        assert_eq!(result.err(), Some(JunctionError::UnknownLane(9)));
        assert_eq!(junction.lanes()[0].regular_count, 0);
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let mut junction = JunctionController::default();
        let request = demand_request(vec![LaneDemand::new(0, -5, 3), LaneDemand::new(1, 4, -2)]);

        let decision = junction.run_cycle(&request).unwrap();
        assert_eq!(decision.lane_data[0].regular_count, 0);
        assert_eq!(decision.lane_data[0].emergency_count, 3);
        assert_eq!(decision.lane_data[1].regular_count, 4);
        assert_eq!(decision.lane_data[1].emergency_count, 0);
    }

    #[test]
    fn lanes_without_an_update_keep_their_counts() {
        let mut junction = JunctionController::default();
        junction
            .run_cycle(&demand_request(vec![
                LaneDemand::new(0, 4, 0),
                LaneDemand::new(1, 2, 0),
            ]))
            .unwrap();

        let decision = junction
            .run_cycle(&demand_request(vec![LaneDemand::new(1, 7, 0)]))
            .unwrap();
        assert_eq!(decision.lane_data[0].regular_count, 4);
        assert_eq!(decision.lane_data[1].regular_count, 7);
    }

    #[test]
    fn an_idle_junction_reports_the_sentinel() {
        let mut junction = JunctionController::default();
        let decision = junction.run_cycle(&CycleRequest::default()).unwrap();

        assert_eq!(decision.next_green_lane, -1);
        assert_eq!(decision.granted_lane(), None);
        assert_eq!(decision.current_algorithm, SchedulingAlgorithm::RoundRobin);
        assert!(decision.lane_data.iter().all(|lane| !lane.is_green));
    }

    #[test]
    fn a_vehicle_in_the_green_lane_holds_the_grant() {
        let mut junction = JunctionController::default();
        // Demand gap of 19 picks shortest-demand-first and grants lane 0.
        let first = junction
            .run_cycle(&demand_request(vec![
                LaneDemand::new(0, 1, 0),
                LaneDemand::new(1, 20, 0),
            ]))
            .unwrap();
        assert_eq!(first.granted_lane(), Some(0));

        // Lane 0 empties, which would normally move the grant to lane 1,
        // but its last vehicle is still inside the box.
        let held = CycleRequest {
            lanes: vec![LaneDemand::new(0, 0, 0), LaneDemand::new(1, 20, 2)],
            vehicles_in_intersection: vec![0],
            ..CycleRequest::default()
        };
        let decision = junction.run_cycle(&held).unwrap();

        assert_eq!(decision.granted_lane(), Some(0));
        assert!(decision.lane_data[0].has_vehicle_in_intersection);
        // The policy choice still tracked the new emergency demand.
        assert_eq!(decision.current_algorithm, SchedulingAlgorithm::Priority);
        // Held cycles do not accrue processed or waiting time.
        assert_eq!(decision.lane_data[0].processed_time, 1);
        assert_eq!(decision.lane_data[1].waiting_time, 1);

        // Once the vehicle clears, the emergency lane takes over.
        let released = junction
            .run_cycle(&demand_request(Vec::new()))
            .unwrap();
        assert_eq!(released.granted_lane(), Some(1));
    }

    #[test]
    fn an_unclear_intersection_freezes_the_previous_grant() {
        let mut junction = JunctionController::default();
        let first = junction
            .run_cycle(&demand_request(vec![
                LaneDemand::new(2, 3, 0),
                LaneDemand::new(3, 11, 0),
            ]))
            .unwrap();
        assert_eq!(first.granted_lane(), Some(2));

        let blocked = CycleRequest {
            intersection_clear: false,
            ..CycleRequest::default()
        };
        let decision = junction.run_cycle(&blocked).unwrap();
        assert_eq!(decision.granted_lane(), Some(2));
        assert_eq!(decision.lane_data[2].processed_time, 1);
    }

    #[test]
    fn a_vehicle_in_a_non_green_lane_does_not_hold_anything() {
        let mut junction = JunctionController::default();
        let first = junction
            .run_cycle(&demand_request(vec![
                LaneDemand::new(0, 1, 0),
                LaneDemand::new(1, 9, 0),
            ]))
            .unwrap();
        assert_eq!(first.granted_lane(), Some(0));

        // Lane 3 reports a straggler but the grant belongs to lane 0, so
        // scheduling proceeds as usual.
        let request = CycleRequest {
            lanes: vec![LaneDemand::new(0, 0, 0)],
            vehicles_in_intersection: vec![3],
            ..CycleRequest::default()
        };
        let decision = junction.run_cycle(&request).unwrap();
        assert_eq!(decision.granted_lane(), Some(1));
    }

    #[test]
    fn reset_returns_the_cleared_snapshot() {
        let mut junction = JunctionController::default();
        junction
            .run_cycle(&demand_request(vec![
                LaneDemand::new(0, 2, 1),
                LaneDemand::new(1, 8, 0),
            ]))
            .unwrap();

        let snapshot = junction.reset();
        assert_eq!(snapshot.len(), 4);
        for lane in &snapshot {
            assert_eq!(lane.total_demand(), 0);
            assert_eq!(lane.processed_time, 0);
            assert_eq!(lane.waiting_time, 0);
            assert!(!lane.is_green);
            assert!(!lane.has_vehicle_in_intersection);
        }
        assert_eq!(junction.current_green_lane(), None);
        assert_eq!(junction.current_algorithm(), SchedulingAlgorithm::RoundRobin);
    }

    #[test]
    fn is_lane_green_validates_the_id() {
        let mut junction = JunctionController::default();
        junction
            .run_cycle(&demand_request(vec![
                LaneDemand::new(1, 2, 0),
                LaneDemand::new(2, 30, 0),
            ]))
            .unwrap();

        assert_eq!(junction.is_lane_green(1), Ok(true));
        assert_eq!(junction.is_lane_green(2), Ok(false));
        assert_eq!(junction.is_lane_green(42), Err(JunctionError::UnknownLane(42)));
    }
}
