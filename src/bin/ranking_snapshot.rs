use anyhow::{Context, Result, anyhow};

use ttrank_terminal::category::RankingCategory;
use ttrank_terminal::config::AppConfig;
use ttrank_terminal::logging::init_cli_logging;
use ttrank_terminal::ranking_fetch::RankingClient;
use ttrank_terminal::ranking_stats::RankingSummary;
use ttrank_terminal::view::{
    country_bars, format_updated_at, ranking_rows, stats_cards, text_bar,
};

const BAR_WIDTH: usize = 30;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_cli_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = AppConfig::from_env();
    if let Some(url) = parse_value_arg(&args, "--api-url") {
        config = config.with_api_url(&url);
    }
    let category = match parse_value_arg(&args, "--category") {
        Some(raw) => RankingCategory::from_code(&raw)
            .ok_or_else(|| anyhow!("unknown category code: {raw}"))?,
        None => config.default_category,
    };
    let top_n = match parse_value_arg(&args, "--top") {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid --top value: {raw}"))?
            .clamp(1, 200),
        None => config.top_n,
    };

    let client = RankingClient::from_config(&config)?;
    if args.iter().any(|a| a == "--update") {
        client.trigger_update().context("ranking update failed")?;
        println!("Update triggered");
    }

    let ranking = client
        .fetch_ranking(category)
        .with_context(|| format!("fetch {} from {}", category.code(), client.base_url()))?;
    let summary = RankingSummary::from_entries(&ranking.entries, top_n);

    println!(
        "{} | updated {}",
        category.label(config.locale),
        format_updated_at(&ranking.updated_at)
    );
    for card in stats_cards(&summary, top_n, config.locale) {
        println!("{:<24} {}", card.title, card.value);
    }

    println!();
    for bar in country_bars(&summary) {
        println!(
            "{:>2}. {:<20} {} {}",
            bar.position,
            bar.country,
            text_bar(bar.ratio, BAR_WIDTH),
            bar.count
        );
    }

    println!();
    let rows = ranking_rows(&summary);
    if rows.is_empty() {
        println!("No ranking data");
        return Ok(());
    }
    println!("{:<6} {:<32} {:<20} {:>10}", "Rank", "Player", "Country", "Points");
    for row in rows {
        println!(
            "{:<6} {:<32} {:<20} {:>10}",
            row.rank, row.name, row.country, row.points
        );
    }
    Ok(())
}

fn parse_value_arg(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
