// junction_demo.rs
use junction_scheduler::{
    start_junction_service, CycleDecision, CycleRequest, JunctionController, ScriptedDemand,
    VehicleCounts,
};

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run().await {
        eprintln!("Demo error: {}", e);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (junction, _service) = start_junction_service(JunctionController::default());

    // Three detector frames: a wide demand gap, then an ambulance on East,
    // then balanced queues everywhere.
    let mut detector = ScriptedDemand::new(
        4,
        vec![
            vec![counts(2, 0), counts(12, 0), counts(0, 0), counts(0, 0)],
            vec![counts(2, 0), counts(12, 1), counts(3, 0), counts(0, 0)],
            vec![counts(4, 0), counts(5, 0), counts(3, 0), counts(4, 0)],
        ],
    );

    println!("Starting junction demo...");
    for step in 1..=3 {
        let request = CycleRequest::from_source(&mut detector);
        let decision = junction.run_cycle(request).await?;
        println!("cycle {}: {}", step, describe(&decision));
    }

    // The granted lane still has a vehicle inside the box, so the grant
    // holds even though demand elsewhere keeps building.
    let held = CycleRequest {
        lanes: Vec::new(),
        intersection_clear: false,
        vehicles_in_intersection: vec![1],
    };
    let decision = junction.run_cycle(held).await?;
    println!("cycle 4 (crossing in progress): {}", describe(&decision));

    let decision = junction.run_cycle(CycleRequest::default()).await?;
    println!("cycle 5 (cleared): {}", describe(&decision));
    println!(
        "\nfinal decision body:\n{}",
        serde_json::to_string_pretty(&decision)?
    );

    let lanes = junction.reset().await?;
    println!(
        "\nafter reset, total demand across lanes: {}",
        lanes.iter().map(|lane| u64::from(lane.total_demand())).sum::<u64>()
    );
    Ok(())
}

fn counts(regular: u32, emergency: u32) -> VehicleCounts {
    VehicleCounts::new(regular, emergency)
}

fn describe(decision: &CycleDecision) -> String {
    let lane = match decision.granted_lane() {
        Some(id) => decision.lane_data[id].name.as_str(),
        None => "none",
    };
    format!(
        "{} -> green lane {}",
        decision.current_algorithm, lane
    )
}
