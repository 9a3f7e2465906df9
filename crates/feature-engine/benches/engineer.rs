use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::FeatureEngineer;
use student_record::{Record, Table};

fn raw_row(i: i64) -> Record {
    Record::new()
        .with("failures", i % 4)
        .with("studytime", 1 + i % 4)
        .with("Medu", i % 5)
        .with("Fedu", (i + 2) % 5)
        .with("G1", i % 21)
        .with("Pstatus", if i % 2 == 0 { "T" } else { "A" })
        .with("famsize", if i % 3 == 0 { "LE3" } else { "GT3" })
        .with("address", "U")
        .with("traveltime", 1 + i % 4)
        .with("internet", "yes")
        .with("romantic", "no")
        .with("Dalc", 1 + i % 5)
        .with("Walc", 1 + (i + 1) % 5)
        .with("absences", i % 30)
}

fn bench_engineer(c: &mut Criterion) {
    let engineer = FeatureEngineer::new();
    let row = raw_row(7);
    c.bench_function("engineer_record", |b| b.iter(|| engineer.engineer(black_box(&row))));

    let table: Table = (0..395).map(raw_row).collect();
    c.bench_function("engineer_table_395", |b| {
        b.iter(|| engineer.engineer_table(black_box(&table)))
    });
}

criterion_group!(benches, bench_engineer);
criterion_main!(benches);
