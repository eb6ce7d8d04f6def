use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde_json::{Map, Value, json};

use ttrank_terminal::category::RankingCategory;
use ttrank_terminal::ranking_fetch::{RankingEntry, parse_ranking_json};
use ttrank_terminal::ranking_stats::{
    RankingSummary, UNKNOWN_COUNTRY, bar_ratio, country_distribution, top_n, total_count,
};
use ttrank_terminal::view::{country_bars, text_bar};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn entry(name: &str, country: &str) -> RankingEntry {
    let mut fields = Map::new();
    fields.insert("PlayerName".to_string(), Value::String(name.to_string()));
    fields.insert("CountryName".to_string(), Value::String(country.to_string()));
    RankingEntry::from_fields(fields)
}

fn entries_split(counts: &[(&str, usize)]) -> Vec<RankingEntry> {
    let mut out = Vec::new();
    for (country, n) in counts {
        for idx in 0..*n {
            out.push(entry(&format!("{country}-{idx}"), country));
        }
    }
    out
}

#[test]
fn distribution_of_empty_list_is_empty() {
    assert!(country_distribution(&[]).is_empty());
}

#[test]
fn single_country_gives_single_bucket() {
    let entries = entries_split(&[("Japan", 7)]);
    let buckets = country_distribution(&entries);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].country, "Japan");
    assert_eq!(buckets[0].count, 7);
}

#[test]
fn distribution_is_capped_sorted_and_bounded() {
    let entries = entries_split(&[
        ("A", 1),
        ("B", 4),
        ("C", 2),
        ("D", 6),
        ("E", 3),
        ("F", 5),
        ("G", 2),
    ]);
    let buckets = country_distribution(&entries);
    assert!(buckets.len() <= 5);
    assert!(buckets.windows(2).all(|w| w[0].count >= w[1].count));
    let sum: usize = buckets.iter().map(|b| b.count).sum();
    assert!(sum <= entries.len());
    let names: Vec<&str> = buckets.iter().map(|b| b.country.as_str()).collect();
    assert_eq!(names, vec!["D", "F", "B", "E", "C"]);
}

#[test]
fn ties_keep_first_seen_order() {
    let entries = vec![
        entry("a", "Sweden"),
        entry("b", "France"),
        entry("c", "France"),
        entry("d", "Sweden"),
    ];
    let buckets = country_distribution(&entries);
    assert_eq!(buckets[0].country, "Sweden");
    assert_eq!(buckets[1].country, "France");
}

#[test]
fn missing_country_is_bucketed_as_unknown() {
    let entries = vec![
        RankingEntry::from_value(json!({"PlayerName": "x"})),
        RankingEntry::from_value(json!({"PlayerName": "y", "CountryName": 12})),
    ];
    let buckets = country_distribution(&entries);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].country, UNKNOWN_COUNTRY);
    assert_eq!(buckets[0].count, 2);
}

#[test]
fn top_n_preserves_order_and_length() {
    let entries = entries_split(&[("A", 3), ("B", 30)]);
    let top = top_n(&entries, 20);
    assert_eq!(top.len(), 20);
    assert_eq!(top, &entries[..20]);

    let short = entries_split(&[("A", 4)]);
    assert_eq!(top_n(&short, 20).len(), 4);
    assert_eq!(top_n(&short, 20), short.as_slice());
    assert!(top_n(&[], 20).is_empty());
}

#[test]
fn summary_for_twenty_five_players_in_three_countries() {
    let entries = entries_split(&[("China", 10), ("Japan", 10), ("Germany", 5)]);
    let summary = RankingSummary::from_entries(&entries, 20);
    assert_eq!(summary.total, 25);
    assert_eq!(total_count(&entries), 25);
    assert_eq!(summary.top.len(), 20);
    assert_eq!(summary.distinct_countries, 3);
}

#[test]
fn fixture_summary_counts_top_five_buckets() {
    let raw = read_fixture("rankings_sen_singles.json");
    let ranking = parse_ranking_json(RankingCategory::SenSingles, &raw, Utc::now())
        .expect("fixture should parse");
    let summary = RankingSummary::from_entries(&ranking.entries, 20);
    assert_eq!(summary.total, 11);
    assert_eq!(summary.top.len(), 11);
    assert_eq!(summary.distinct_countries, 5);
    let names: Vec<&str> = summary.countries.iter().map(|b| b.country.as_str()).collect();
    assert_eq!(names, vec!["China", "Japan", "Chinese Taipei", "Sweden", "Brazil"]);
}

#[test]
fn empty_ranking_bars_never_go_nan() {
    let summary = RankingSummary::from_entries(&[], 20);
    assert!(country_bars(&summary).is_empty());
    assert_eq!(bar_ratio(3, 0), 0.0);

    let bar = text_bar(bar_ratio(0, 0), 10);
    assert_eq!(bar.chars().count(), 10);
    assert!(bar.chars().all(|c| c == '░'));
    assert_eq!(text_bar(f64::NAN, 4), "░░░░");
}

#[test]
fn bar_ratio_is_proportional() {
    let entries = entries_split(&[("China", 3), ("Japan", 1)]);
    let summary = RankingSummary::from_entries(&entries, 20);
    let bars = country_bars(&summary);
    assert_eq!(bars[0].position, 1);
    assert!((bars[0].ratio - 0.75).abs() < 1e-9);
    assert!((bars[1].ratio - 0.25).abs() < 1e-9);
    assert_eq!(text_bar(bars[0].ratio, 4), "███░");
}
