// benches/bench_schedule_cycle.rs

use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use std::time::Duration;

use junction_scheduler::{CycleRequest, JunctionController, LaneDemand};

fn create_junction(num_lanes: usize) -> JunctionController {
    let names: Vec<String> = (0..num_lanes)
        .map(|id| format!("Approach {}", id))
        .collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    JunctionController::new(&name_refs).unwrap()
}

// A full boundary cycle: validation, demand overwrite, selection, and the
// scheduling decision with its lane snapshot.
fn bench_schedule_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_cycle");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &size in [4, 16, 64].iter() {
        group.bench_function(format!("lanes_{}", size), |b| {
            let mut junction = create_junction(size);
            let request = CycleRequest::with_demand(
                (0..size)
                    .map(|id| LaneDemand::new(id, (id as i64 * 5) % 13, 0))
                    .collect(),
            );
            b.iter(|| black_box(junction.run_cycle(&request).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_schedule_cycle);
criterion_main!(benches);
