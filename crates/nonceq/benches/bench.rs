use core::convert::Infallible;
use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use nonceq::{Authority, NonceAllocator};
use std::{sync::Barrier, thread::scope, time::Instant};

struct StaticAuthority(u64);

impl Authority for StaticAuthority {
    type Err = Infallible;

    fn pending_nonce(&self, _identity: &str) -> Result<u64, Self::Err> {
        Ok(self.0)
    }
}

// Number of assigns per benchmark iteration (total across threads for
// multi-threaded).
const TOTAL_ASSIGNS: usize = 4096;

/// Benchmarks the lock-free mint hot path.
fn bench_detached_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/detached/assign");
    group.throughput(Throughput::Elements(TOTAL_ASSIGNS as u64));

    group.bench_function(format!("elems/{TOTAL_ASSIGNS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let allocator =
                    NonceAllocator::detached(&StaticAuthority(0), "bench", 0).unwrap();
                for _ in 0..TOTAL_ASSIGNS {
                    black_box(allocator.assign().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks the reconciling mint path (authority query under the gate on
/// every assign).
fn bench_ensured_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/ensured/assign");
    group.throughput(Throughput::Elements(TOTAL_ASSIGNS as u64));

    group.bench_function(format!("elems/{TOTAL_ASSIGNS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let allocator =
                    NonceAllocator::ensured(StaticAuthority(0), "bench", 0).unwrap();
                for _ in 0..TOTAL_ASSIGNS {
                    black_box(allocator.assign().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks contended assigns across all cores.
fn bench_detached_assign_contended(c: &mut Criterion) {
    let threads = num_cpus::get().max(2);
    let per_thread = TOTAL_ASSIGNS / threads;

    let mut group = c.benchmark_group("allocator/detached/assign_contended");
    group.throughput(Throughput::Elements((per_thread * threads) as u64));

    group.bench_function(format!("threads/{threads}"), |b| {
        b.iter_custom(|iters| {
            let mut elapsed = core::time::Duration::ZERO;

            for _ in 0..iters {
                let allocator =
                    NonceAllocator::detached(&StaticAuthority(0), "bench", 0).unwrap();
                let barrier = Barrier::new(threads + 1);
                let mut started = None;

                // Scope exit joins the workers, so the timer covers the
                // span from barrier release to the last assign.
                scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            barrier.wait();
                            for _ in 0..per_thread {
                                black_box(allocator.assign().unwrap());
                            }
                        });
                    }

                    barrier.wait();
                    started = Some(Instant::now());
                });

                elapsed += started.expect("barrier released").elapsed();
            }

            elapsed
        });
    });

    group.finish();
}

/// Benchmarks the fail-and-reissue cycle (sorted insert + shifting pop).
fn bench_failed_reissue(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/detached/failed_reissue");
    group.throughput(Throughput::Elements(TOTAL_ASSIGNS as u64));

    group.bench_function(format!("elems/{TOTAL_ASSIGNS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let allocator =
                    NonceAllocator::detached(&StaticAuthority(0), "bench", 0).unwrap();
                for _ in 0..TOTAL_ASSIGNS {
                    let nonce = allocator.assign().unwrap();
                    allocator.add_failed_nonce(nonce).unwrap();
                    black_box(allocator.assign().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_detached_assign,
    bench_ensured_assign,
    bench_detached_assign_contended,
    bench_failed_reissue
);
criterion_main!(benches);
