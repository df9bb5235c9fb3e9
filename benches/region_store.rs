use std::hint::black_box;
use std::iter;

use criterion::{BatchSize, Criterion};
use rand::prelude::*;
use renotes::Project;
use renotes::region::{MemoryRegionStore, NewRegion, RegionId, RegionStore, Time};
use renotes::subtitle::RegionSubtitle;
use renotes::sync::{self, Session};

struct RegionSource {
    count: usize,
    max_start: Time,
    max_length: i64,
    rng: rand_pcg::Mcg128Xsl64,
}

impl RegionSource {
    fn new(count: usize) -> Self {
        let max_length = 20.min(count as i64 / 2) * 1000;

        Self {
            rng: rand_pcg::Mcg128Xsl64::new(1),
            count,
            max_start: Time(count as i64 * 1000 - max_length),
            max_length,
        }
    }

    fn random_position(&mut self) -> Time {
        Time(self.rng.random_range(0..self.max_start.0))
    }

    fn add_region(&mut self, store: &mut MemoryRegionStore) -> Option<RegionId> {
        let start = self.random_position();
        let length = self.rng.random_range(0..self.max_length);
        store.create_region(NewRegion {
            start,
            end: Time(start.0 + length),
            name: "",
            colour: None,
            index_hint: None,
        })
    }

    /// A store filled with `count` random regions, every other one carrying a subtitle.
    fn fill(&mut self) -> (MemoryRegionStore, Project) {
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();
        let actors = ["Alice", "Bob", "Carol", "?"];

        for i in 0..self.count {
            let Some(region) = self.add_region(&mut store) else {
                continue;
            };
            if i % 2 == 0 {
                let Some(bounds) = store.find_region(region) else {
                    continue;
                };
                let actor = actors[i % actors.len()];
                project.actors.find_or_create(actor);
                project.subtitles.push(RegionSubtitle::new(
                    region,
                    bounds.start,
                    bounds.end,
                    "some notes",
                    actor,
                ));
            }
        }

        (store, project)
    }
}

pub fn benchmark_create(c: &mut Criterion) {
    fn perform_bench(c: &mut Criterion, count: usize) {
        c.bench_function(format!("create {count} regions").as_str(), |b| {
            b.iter(|| {
                let mut source = RegionSource::new(count);
                let mut store = MemoryRegionStore::new_empty();
                for _ in 0..count {
                    source.add_region(&mut store);
                }
                assert_eq!(store.len(), count);
            });
        });
    }

    perform_bench(c, 100);
    perform_bench(c, 1000);
}

pub fn benchmark_query(c: &mut Criterion) {
    fn perform_bench(c: &mut Criterion, count: usize) {
        c.bench_function(format!("regions at position: {count} regions").as_str(), |b| {
            let mut source = RegionSource::new(count);
            let (store, _) = source.fill();
            let positions: Vec<Time> = iter::repeat_with(|| source.random_position())
                .take(100)
                .collect();
            b.iter(|| {
                for position in &positions {
                    black_box(store.regions_at(black_box(*position)));
                }
            });
        });
    }

    perform_bench(c, 100);
    perform_bench(c, 1000);
    perform_bench(c, 10000);
}

pub fn benchmark_overlaps(c: &mut Criterion) {
    c.bench_function("subtitled overlaps at position: 1000 regions", |b| {
        let mut source = RegionSource::new(1000);
        let (store, project) = source.fill();
        let positions: Vec<Time> = iter::repeat_with(|| source.random_position())
            .take(100)
            .collect();
        b.iter_batched_ref(
            Session::new,
            |session| {
                for position in &positions {
                    black_box(session.overlaps_at(&store, &project, *position));
                }
            },
            BatchSize::SmallInput,
        );
    });
}

pub fn benchmark_hide_and_show(c: &mut Criterion) {
    c.bench_function("disable and enable an actor: 1000 regions", |b| {
        b.iter_batched_ref(
            || RegionSource::new(1000).fill(),
            |(store, project)| {
                sync::set_actor_enabled(store, project, "Alice", false);
                sync::set_actor_enabled(store, project, "Alice", true);
            },
            BatchSize::LargeInput,
        );
    });
}
