use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use ttrank_terminal::analysis_fetch::AnalysisClient;
use ttrank_terminal::config::AppConfig;
use ttrank_terminal::logging::init_cli_logging;
use ttrank_terminal::upload::{VideoFile, format_size};
use ttrank_terminal::view::{AnalysisPanel, analysis_panel, prediction_lines};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_cli_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .ok_or_else(|| {
            anyhow!("usage: analyze_clip <path> [--no-deep] [--classify] [--api-url=URL]")
        })?;
    let use_deep_analysis = !args.iter().any(|a| a == "--no-deep");
    let classify = args.iter().any(|a| a == "--classify");

    let mut config = AppConfig::from_env();
    if let Some(url) = args.iter().find_map(|a| a.strip_prefix("--api-url=")) {
        config = config.with_api_url(url);
    }
    let file = VideoFile::from_path(&path)?;
    let client = AnalysisClient::from_config(&config)?;
    println!(
        "{} ({}, {})",
        file.file_name,
        file.media_type,
        format_size(file.size_bytes)
    );

    if classify {
        let prediction = client
            .classify_video(&file)
            .context("classifier request failed")?;
        for line in prediction_lines(&prediction) {
            println!("{line}");
        }
        return Ok(());
    }

    let result = client.submit_video(&file, use_deep_analysis);
    match analysis_panel(&result, config.locale) {
        AnalysisPanel::Error { title, message } => {
            Err(anyhow!("{title}: {message}"))
        }
        AnalysisPanel::Report(sections) => {
            for section in sections {
                match section.badge {
                    Some(badge) => println!("== {} [{}]", section.title, badge.label),
                    None => println!("== {}", section.title),
                }
                for line in section.lines {
                    println!("  {line}");
                }
                println!();
            }
            Ok(())
        }
    }
}
