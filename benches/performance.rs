use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finance_core::{
    analysis::PatternAnalyzer, config::Config, core::services::ReportService,
    domain::Transaction, time::FixedClock, FinanceManager,
};
use tempfile::tempdir;

const CATEGORIES: [&str; 8] = [
    "Groceries", "Rent", "Transport", "Dining", "Health", "Fun", "Utilities", "Travel",
];

fn build_history(count: usize) -> Vec<Transaction> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..count)
        .map(|idx| {
            let date = start + Duration::days((idx % 730) as i64);
            if idx % 10 == 0 {
                Transaction::income("Salary", 2500.0, "Work", date)
            } else {
                Transaction::expense(
                    "Purchase",
                    20.0 + (idx % 150) as f64,
                    CATEGORIES[idx % CATEGORIES.len()],
                    date,
                )
            }
        })
        .collect()
}

fn bench_analysis(c: &mut Criterion) {
    let history = build_history(black_box(10_000));

    c.bench_function("patterns_10k", |b| {
        b.iter(|| black_box(PatternAnalyzer::new(&history).analyze()))
    });

    let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    c.bench_function("report_10k", |b| {
        b.iter(|| black_box(ReportService::generate_report(&history, start, end, 6, &clock)))
    });
}

fn bench_snapshot_io(c: &mut Criterion) {
    let mut manager = FinanceManager::new(Config::default());
    manager.add_transactions(build_history(10_000));
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("finance.json");

    c.bench_function("snapshot_save_10k", |b| {
        b.iter(|| manager.save(&path).expect("save snapshot"))
    });

    manager.save(&path).expect("seed");
    c.bench_function("snapshot_load_10k", |b| {
        b.iter(|| {
            let loaded = FinanceManager::load(
                &path,
                Config::default(),
                Box::new(finance_core::time::SystemClock),
            )
            .expect("load snapshot");
            black_box(loaded);
        })
    });
}

criterion_group!(benches, bench_analysis, bench_snapshot_io);
criterion_main!(benches);
