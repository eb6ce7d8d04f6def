use std::collections::HashMap;

use crate::ranking_fetch::RankingEntry;

pub const UNKNOWN_COUNTRY: &str = "Unknown";
pub const DISTRIBUTION_BUCKETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Everything the ranking screen derives from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingSummary<'a> {
    pub total: usize,
    pub top: &'a [RankingEntry],
    pub countries: Vec<CountryCount>,
    pub distinct_countries: usize,
}

impl<'a> RankingSummary<'a> {
    pub fn from_entries(entries: &'a [RankingEntry], top: usize) -> Self {
        let countries = country_distribution(entries);
        Self {
            total: total_count(entries),
            top: top_n(entries, top),
            distinct_countries: countries.len(),
            countries,
        }
    }
}

/// First `n` rows in backend order; the backend order is the rank order.
pub fn top_n(entries: &[RankingEntry], n: usize) -> &[RankingEntry] {
    &entries[..n.min(entries.len())]
}

pub fn total_count(entries: &[RankingEntry]) -> usize {
    entries.len()
}

/// Top five countries by player count.
///
/// Ties keep the order in which each country first appears in `entries`.
pub fn country_distribution(entries: &[RankingEntry]) -> Vec<CountryCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<CountryCount> = Vec::new();
    for entry in entries {
        let country = entry.country().unwrap_or(UNKNOWN_COUNTRY);
        match index.get(country) {
            Some(&slot) => buckets[slot].count += 1,
            None => {
                index.insert(country, buckets.len());
                buckets.push(CountryCount {
                    country: country.to_string(),
                    count: 1,
                });
            }
        }
    }
    // `sort_by` is stable, which gives the first-seen tie-break.
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets.truncate(DISTRIBUTION_BUCKETS);
    buckets
}

/// Fraction of `total` for a distribution bar, always within `0.0..=1.0`.
pub fn bar_ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64).clamp(0.0, 1.0)
}
