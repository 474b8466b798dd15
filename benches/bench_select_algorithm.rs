// benches/bench_select_algorithm.rs

use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use std::time::Duration;

use junction_scheduler::{Lane, TrafficScheduler};

// Builds a junction with no emergency vehicles so selection always walks the
// full demand scan.
fn create_scheduler(num_lanes: usize) -> TrafficScheduler {
    let mut lanes: Vec<Lane> = (0..num_lanes)
        .map(|id| Lane::new(id, format!("Approach {}", id)))
        .collect();
    for lane in &mut lanes {
        lane.update_counts((lane.id as u32 * 3) % 11, 0);
    }
    TrafficScheduler::new(lanes)
}

fn bench_select_algorithm(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_algorithm");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &size in [4, 16, 64].iter() {
        group.bench_function(format!("lanes_{}", size), |b| {
            let mut scheduler = create_scheduler(size);
            b.iter(|| black_box(scheduler.select_algorithm()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select_algorithm);
criterion_main!(benches);
