use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ghcnd::{merge_stations, parse_dly_text, ParseOptions};

const FIXTURE: &str = include_str!("../data/test_daily.dly");

fn bench_parse(c: &mut Criterion) {
    let defaults = ParseOptions::default();
    let everything = ParseOptions::builder()
        .start_date(NaiveDate::MIN)
        .build();

    c.bench_function("parse_dly_text", |b| {
        b.iter(|| parse_dly_text(black_box(FIXTURE), &defaults))
    });
    c.bench_function("parse_dly_text_full_history", |b| {
        b.iter(|| parse_dly_text(black_box(FIXTURE), &everything))
    });

    let series = match parse_dly_text(FIXTURE, &defaults) {
        Ok(series) => series,
        Err(e) => panic!("fixture does not parse: {e}"),
    };
    let stations = vec![series];
    c.bench_function("merge_stations", |b| {
        b.iter(|| merge_stations(black_box(&stations)))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
