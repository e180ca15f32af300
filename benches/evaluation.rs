//! Benchmarks for per-pair protection evaluation.
//!
//! Run with: `cargo bench --bench evaluation`

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::sync::Arc;

use protection_core::types::{ClosedTrade, TradeSide};
use protections::{CooldownPeriod, LogOnce, MemoryTradeHistory, Protection, StopDuration};

const EXIT_REASONS: [&str; 4] = ["roi", "exit_signal", "stop_loss", "trailing_stop_loss"];

fn bench_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Generate closed trades spread over the last day across `pairs` pairs.
fn generate_history(rng: &mut impl Rng, pairs: usize, trades: usize) -> Vec<ClosedTrade> {
    let now = bench_now();
    (0..trades)
        .map(|_| {
            let pair = format!("COIN{}/USDT", rng.gen_range(0..pairs));
            let close_date = now - Duration::minutes(rng.gen_range(0..1440));
            let reason = EXIT_REASONS[rng.gen_range(0..EXIT_REASONS.len())];
            ClosedTrade::new(
                pair,
                close_date - Duration::minutes(rng.gen_range(5..240)),
                close_date,
                Some(reason.to_string()),
            )
        })
        .collect()
}

/// Benchmark a single pair evaluation against histories of growing size.
fn bench_stop_per_pair(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut rng = rand::thread_rng();
    let mut group = c.benchmark_group("cooldown_stop_per_pair");

    for size in [10, 100, 1_000, 10_000].iter() {
        let history = MemoryTradeHistory::from_trades(generate_history(&mut rng, 20, *size));
        let protection = CooldownPeriod::new(
            60,
            Arc::new(StopDuration::Minutes(60)),
            Arc::new(history),
            Arc::new(LogOnce::new()),
        );

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("trades", size), &protection, |b, p| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(
                        p.stop_per_pair(black_box("COIN7/USDT"), bench_now(), TradeSide::Long)
                            .await
                            .unwrap(),
                    )
                })
            })
        });
    }

    group.finish();
}

/// Benchmark lock end calculation.
fn bench_lock_end(c: &mut Criterion) {
    use protections::LockEndCalculator;

    let mut group = c.benchmark_group("lock_end");
    let trade = ClosedTrade::new(
        "BTC/USDT",
        bench_now() - Duration::hours(2),
        bench_now() - Duration::minutes(15),
        Some("stop_loss".to_string()),
    );

    let minutes = StopDuration::Minutes(60);
    group.bench_function("minutes", |b| {
        b.iter(|| black_box(minutes.calculate_lock_end(std::slice::from_ref(&trade))))
    });

    let unlock_at = StopDuration::UnlockAt(chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    group.bench_function("unlock_at", |b| {
        b.iter(|| black_box(unlock_at.calculate_lock_end(std::slice::from_ref(&trade))))
    });

    group.finish();
}

criterion_group!(benches, bench_stop_per_pair, bench_lock_end);
criterion_main!(benches);
