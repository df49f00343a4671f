use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use scout_terminal::percentile::{PROFILE_STATS, ReferencePopulation, percentile_rank};
use scout_terminal::population::{Population, PositionCode, read_population};
use scout_terminal::profile::build_profile;
use scout_terminal::synthetic::synthetic_record;

const POSITIONS: [&str; 5] = ["FW", "MF", "DF", "GK", "FW,MF"];

fn synthetic_population(size: usize) -> Population {
    Population::new(
        (0..size)
            .map(|idx| {
                let mut record = synthetic_record(&format!("Player {idx}"), Some("Bench FC"));
                record.position = PositionCode::new(POSITIONS[idx % POSITIONS.len()]);
                record
            })
            .collect(),
    )
}

fn sample_csv(rows: usize) -> String {
    let mut out = String::from("Player,Pos,Squad,Age,MP,Starts,Min,Gls,Ast,xG,xAG,PrgC,PrgP,PrgR\n");
    for idx in 0..rows {
        out.push_str(&format!(
            "Player {idx},{},Club {},24-100,30,25,\"2,{:03}\",{},{},{}.5,{}.2,{},{},{}\n",
            POSITIONS[idx % POSITIONS.len()],
            idx % 20,
            idx % 1000,
            idx % 17,
            idx % 9,
            idx % 15,
            idx % 8,
            idx % 90,
            idx % 200,
            idx % 150,
        ));
    }
    out
}

fn bench_percentile_rank(c: &mut Criterion) {
    let population = synthetic_population(2500);
    let target = population.records()[0].clone();
    c.bench_function("percentile_rank", |b| {
        b.iter(|| {
            let reference = ReferencePopulation::select(black_box(&population), &target);
            let result = percentile_rank(&target, &PROFILE_STATS, &reference);
            black_box(result.len());
        })
    });
}

fn bench_build_profile(c: &mut Criterion) {
    let population = synthetic_population(2500);
    let target = population.records()[7].clone();
    c.bench_function("build_profile", |b| {
        b.iter(|| {
            let profile = build_profile(black_box(&population), &target);
            black_box(profile.composite_rating);
        })
    });
}

fn bench_csv_load(c: &mut Criterion) {
    let raw = sample_csv(2500);
    c.bench_function("csv_load", |b| {
        b.iter(|| {
            let population = read_population(black_box(raw.as_bytes())).unwrap();
            black_box(population.len());
        })
    });
}

criterion_group!(perf, bench_percentile_rank, bench_build_profile, bench_csv_load);
criterion_main!(perf);
