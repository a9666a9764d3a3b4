//! Benchmarks for the double-array trie map
//!
//! Compares construction, lookup, and removal against `HashMap` and
//! `BTreeMap` baselines over numeric-string and prefixed key sets.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

use datmap::{DoubleArrayMap, DoubleArrayMapBuilder};

// Benchmark data generators

fn numeric_pairs(count: usize) -> Vec<(Vec<u8>, u64)> {
    (1..=count)
        .map(|i| (i.to_string().into_bytes(), i as u64))
        .collect()
}

fn prefixed_pairs(count: usize) -> Vec<(Vec<u8>, u64)> {
    let prefixes = ["app", "application", "apply", "banana", "band", "cat", "dog"];
    (0..count)
        .map(|i| {
            let prefix = prefixes[i % prefixes.len()];
            (format!("{}_{:06}", prefix, i).into_bytes(), i as u64)
        })
        .collect()
}

fn shuffled<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
    items
}

fn miss_keys(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("absent_{:08}", i).into_bytes())
        .collect()
}

// Construction benchmarks

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for size in [1_000usize, 10_000, 100_000] {
        let pairs = numeric_pairs(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("incremental_{}", size), |b| {
            b.iter_batched(
                || pairs.clone(),
                |pairs| {
                    let mut map = DoubleArrayMap::new();
                    for (key, value) in pairs {
                        map.insert(&key, value).unwrap();
                    }
                    map
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("builder_{}", size), |b| {
            b.iter_batched(
                || pairs.clone(),
                |pairs| {
                    black_box(
                        DoubleArrayMapBuilder::new()
                            .build_from_pairs(pairs)
                            .unwrap(),
                    )
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("incremental_shuffled_{}", size), |b| {
            b.iter_batched(
                || shuffled(pairs.clone(), 0xDA7),
                |pairs| {
                    let mut map = DoubleArrayMap::new();
                    for (key, value) in pairs {
                        map.insert(&key, value).unwrap();
                    }
                    map
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashmap_baseline_{}", size), |b| {
            b.iter_batched(
                || pairs.clone(),
                |pairs| {
                    let mut map = HashMap::new();
                    for (key, value) in pairs {
                        map.insert(key, value);
                    }
                    map
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

// Lookup benchmarks

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let size = 100_000usize;
    let pairs = numeric_pairs(size);

    let mut trie = DoubleArrayMap::new();
    let mut hash_map = HashMap::new();
    let mut btree_map = BTreeMap::new();
    for (key, value) in &pairs {
        trie.insert(key, *value).unwrap();
        hash_map.insert(key.clone(), *value);
        btree_map.insert(key.clone(), *value);
    }

    let hit_keys: Vec<Vec<u8>> = shuffled(pairs, 0xBEE)
        .into_iter()
        .take(1_000)
        .map(|(key, _)| key)
        .collect();
    let absent = miss_keys(1_000);

    group.throughput(Throughput::Elements(hit_keys.len() as u64));
    group.bench_function("trie_hit", |b| {
        b.iter(|| {
            for key in &hit_keys {
                black_box(trie.get(key));
            }
        })
    });
    group.bench_function("trie_miss", |b| {
        b.iter(|| {
            for key in &absent {
                black_box(trie.get(key));
            }
        })
    });
    group.bench_function("hashmap_hit", |b| {
        b.iter(|| {
            for key in &hit_keys {
                black_box(hash_map.get(key));
            }
        })
    });
    group.bench_function("btreemap_hit", |b| {
        b.iter(|| {
            for key in &hit_keys {
                black_box(btree_map.get(key));
            }
        })
    });

    group.finish();
}

// Removal and membership churn

fn bench_removal(c: &mut Criterion) {
    let mut group = c.benchmark_group("removal");
    let size = 10_000usize;
    let pairs = prefixed_pairs(size);

    let mut full = DoubleArrayMap::new();
    for (key, value) in &pairs {
        full.insert(key, *value).unwrap();
    }
    let victims: Vec<Vec<u8>> = shuffled(pairs.clone(), 0xACE)
        .into_iter()
        .take(size / 2)
        .map(|(key, _)| key)
        .collect();

    group.throughput(Throughput::Elements(victims.len() as u64));
    group.bench_function("remove_half", |b| {
        b.iter_batched(
            || {
                let mut map = DoubleArrayMap::new();
                for (key, value) in &pairs {
                    map.insert(key, *value).unwrap();
                }
                map
            },
            |mut map| {
                for key in &victims {
                    black_box(map.remove(key));
                }
                map
            },
            BatchSize::LargeInput,
        )
    });

    // Blocklist-style churn: members leave and rejoin continuously.
    group.bench_function("churn_remove_reinsert", |b| {
        b.iter_batched(
            || {
                let mut map = DoubleArrayMap::new();
                for (key, value) in &pairs {
                    map.insert(key, *value).unwrap();
                }
                map
            },
            |mut map| {
                for key in &victims {
                    black_box(map.remove(key));
                }
                for key in &victims {
                    map.insert(key, 0).unwrap();
                }
                map
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_construction, bench_lookup, bench_removal);
criterion_main!(benches);
