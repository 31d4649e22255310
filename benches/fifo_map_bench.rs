use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use fifo_hashmap::{FifoHashMap, IdentityState};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_push_fresh_100k(c: &mut Criterion) {
    c.bench_function("fifo::push_fresh_100k", |b| {
        b.iter_batched(
            FifoHashMap::<String, u64>::new,
            |mut q| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    q.push_back(key(x), i as u64).unwrap();
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_push_pop_churn_100k(c: &mut Criterion) {
    c.bench_function("fifo::push_pop_churn_100k_over_1k_resident", |b| {
        b.iter_batched(
            || {
                let mut q = FifoHashMap::new();
                for (i, x) in lcg(2).take(1_000).enumerate() {
                    q.push_back(key(x), i as u64).unwrap();
                }
                q
            },
            |mut q| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    let _ = q.pop_front();
                    q.push_back(key(x), i as u64).unwrap();
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_random_10k_of_110k(c: &mut Criterion) {
    c.bench_function("fifo::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let mut q = FifoHashMap::new();
                let keys: Vec<String> = lcg(5)
                    .take(110_000)
                    .enumerate()
                    .map(|(i, x)| {
                        let k = key(x);
                        q.push_back(k.clone(), i as u64).unwrap();
                        k
                    })
                    .collect();
                let to_remove: Vec<String> =
                    keys.iter().step_by(11).take(10_000).cloned().collect();
                (q, to_remove)
            },
            |(mut q, to_remove)| {
                for k in &to_remove {
                    let _ = q.remove(k.as_str());
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_and_miss(c: &mut Criterion) {
    let mut q = FifoHashMap::new();
    let keys: Vec<String> = lcg(7)
        .take(100_000)
        .enumerate()
        .map(|(i, x)| {
            let k = key(x);
            q.push_back(k.clone(), i as u64).unwrap();
            k
        })
        .collect();

    c.bench_function("fifo::get_hit_100k", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for k in &keys {
                acc = acc.wrapping_add(*q.get(k.as_str()).unwrap());
            }
            black_box(acc)
        })
    });

    c.bench_function("fifo::get_miss_100k", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for x in lcg(11).take(100_000) {
                if q.get(key(x).as_str()).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

fn bench_identity_ready_queue(c: &mut Criterion) {
    c.bench_function("fifo::identity_ids_push_pop_100k", |b| {
        b.iter_batched(
            || FifoHashMap::<u32, u64, IdentityState>::with_capacity_and_hasher(128, IdentityState),
            |mut q| {
                for i in 0u32..50_000 {
                    q.push_back(i, u64::from(i)).unwrap();
                }
                while let Some(pair) = q.pop_front() {
                    black_box(pair);
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_push_fresh_100k,
    bench_push_pop_churn_100k,
    bench_remove_random_10k_of_110k,
    bench_get_hit_and_miss,
    bench_identity_ready_queue,
);
criterion_main!(benches);
