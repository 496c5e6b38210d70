use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use strata_timer::{ManualClock, TimerWheel, WheelConfig};

fn manual_timer() -> (Arc<ManualClock>, TimerWheel) {
    let clock = Arc::new(ManualClock::new());
    let timer = TimerWheel::with_clock(WheelConfig::default(), Arc::clone(&clock));
    (clock, timer)
}

/// 基准测试：单次调度
fn bench_schedule_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_single");

    group.bench_function("schedule_ticks", |b| {
        let (_clock, timer) = manual_timer();
        b.iter(|| {
            let handle = timer.schedule_ticks(black_box(100), 0, |_| {});
            black_box(handle);
        });
    });

    group.finish();
}

/// 基准测试：批量调度，延迟分散在各层
fn bench_schedule_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_batch");

    for size in [10i32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                manual_timer,
                |(_clock, timer)| {
                    for i in 0..size {
                        timer.schedule_ticks(1 + (i * 37) % 100_000, i, |_| {});
                    }
                    black_box(timer)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// 基准测试：挂着大量待触发任务时推进 256 个 tick（一整圈 near 层）
fn bench_tick_with_pending(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_with_pending");
    group.sample_size(20);

    for pending in [1_000i32, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(pending),
            pending,
            |b, &pending| {
                b.iter_batched(
                    || {
                        let (clock, timer) = manual_timer();
                        for i in 0..pending {
                            timer.schedule_ticks(1 + (i % 100_000), i, |_| {});
                        }
                        (clock, timer)
                    },
                    |(clock, timer)| {
                        clock.advance(256);
                        timer.tick();
                        black_box(timer)
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_schedule_single,
    bench_schedule_batch,
    bench_tick_with_pending
);
criterion_main!(benches);
