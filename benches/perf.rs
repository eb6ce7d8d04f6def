use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chrono::Utc;

use ttrank_terminal::analysis_fetch::parse_analysis_json;
use ttrank_terminal::category::RankingCategory;
use ttrank_terminal::config::Locale;
use ttrank_terminal::ranking_fetch::parse_ranking_json;
use ttrank_terminal::ranking_stats::{RankingSummary, country_distribution};
use ttrank_terminal::view::{analysis_panel, country_bars};

const COUNTRIES: &[&str] = &[
    "China", "Japan", "Germany", "France", "Sweden", "Korea Republic", "Brazil", "Chinese Taipei",
];

fn ranking_json(players: usize) -> String {
    let rows = (0..players)
        .map(|i| {
            format!(
                r#"{{"RankingPosition":"{}","PlayerName":"Player {i}","CountryName":"{}","RankingPointsYTD":"{}"}}"#,
                i + 1,
                COUNTRIES[(i * 7) % COUNTRIES.len()],
                10_000 - i
            )
        })
        .collect::<Vec<_>>();
    format!(
        r#"{{"data":{{"Result":[{}]}},"updated_at":"2026-10-01T08:30:00+00:00"}}"#,
        rows.join(",")
    )
}

fn bench_ranking_parse(c: &mut Criterion) {
    let raw = ranking_json(1000);
    c.bench_function("ranking_parse_1000", |b| {
        b.iter(|| {
            let ranking =
                parse_ranking_json(RankingCategory::SenSingles, black_box(&raw), Utc::now())
                    .unwrap();
            black_box(ranking.entries.len());
        })
    });
}

fn bench_country_distribution(c: &mut Criterion) {
    let ranking = parse_ranking_json(RankingCategory::SenSingles, &ranking_json(1000), Utc::now())
        .expect("valid ranking json");
    c.bench_function("country_distribution_1000", |b| {
        b.iter(|| {
            let buckets = country_distribution(black_box(&ranking.entries));
            black_box(buckets.len());
        })
    });
    c.bench_function("ranking_summary_bars_1000", |b| {
        b.iter(|| {
            let summary = RankingSummary::from_entries(black_box(&ranking.entries), 20);
            black_box(country_bars(&summary).len());
        })
    });
}

fn bench_analysis_render(c: &mut Criterion) {
    c.bench_function("analysis_parse_render", |b| {
        b.iter(|| {
            let result = parse_analysis_json(black_box(ANALYSIS_JSON)).unwrap();
            black_box(analysis_panel(&result, Locale::ZhTw));
        })
    });
}

criterion_group!(
    perf,
    bench_ranking_parse,
    bench_country_distribution,
    bench_analysis_render
);
criterion_main!(perf);

static ANALYSIS_JSON: &str = include_str!("../tests/fixtures/analysis_success.json");
