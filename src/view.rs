//! Presentation model shared by the TUI and the CLI tools.
//!
//! Nothing here touches the terminal; `main.rs` turns these values into widgets.

use chrono::{DateTime, Local};
use ratatui::style::Color;

use crate::analysis_fetch::{AnalysisResult, ClassifierPrediction, DetailAttribute, Severity};
use crate::config::Locale;
use crate::ranking_stats::{RankingSummary, bar_ratio};
use crate::state::{AnalysisPhase, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Good,
    Warn,
    Bad,
    Info,
    Accent,
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Neutral => Color::Gray,
        Tone::Good => Color::Green,
        Tone::Warn => Color::Yellow,
        Tone::Bad => Color::Red,
        Tone::Info => Color::Cyan,
        Tone::Accent => Color::Magenta,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityBadge {
    pub label: String,
    pub tone: Tone,
}

pub fn severity_badge(severity: &Severity, locale: Locale) -> SeverityBadge {
    let (label, tone) = match severity {
        Severity::Minor => (tr(locale, "Minor", "輕微").to_string(), Tone::Good),
        Severity::Moderate => (tr(locale, "Moderate", "中等").to_string(), Tone::Warn),
        Severity::Severe => (tr(locale, "Severe", "嚴重").to_string(), Tone::Bad),
        Severity::Other(raw) if raw.is_empty() => {
            (tr(locale, "Unrated", "未分級").to_string(), Tone::Neutral)
        }
        Severity::Other(raw) => (
            format!("{} ({raw})", tr(locale, "Unrated", "未分級")),
            Tone::Neutral,
        ),
    };
    SeverityBadge { label, tone }
}

pub fn attribute_label(attribute: &DetailAttribute, locale: Locale) -> String {
    match attribute {
        DetailAttribute::Stance => tr(locale, "Stance", "站位").to_string(),
        DetailAttribute::RacketAngle => tr(locale, "Racket angle", "拍面角度").to_string(),
        DetailAttribute::BodyBalance => tr(locale, "Body balance", "身體平衡").to_string(),
        DetailAttribute::Timing => tr(locale, "Timing", "擊球時機").to_string(),
        DetailAttribute::Other(key) => humanize_key(key),
    }
}

/// `follow_through` -> `Follow through`.
pub fn humanize_key(key: &str) -> String {
    let spaced = key
        .split(['_', '-'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Other".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: String,
    pub value: usize,
    pub tone: Tone,
}

pub fn stats_cards(summary: &RankingSummary<'_>, top_n: usize, locale: Locale) -> [StatCard; 3] {
    let top_title = match locale {
        Locale::En => format!("Top {top_n}"),
        Locale::ZhTw => format!("前{top_n}名"),
    };
    [
        StatCard {
            title: tr(locale, "Total players", "總選手數").to_string(),
            value: summary.total,
            tone: Tone::Info,
        },
        StatCard {
            title: top_title,
            value: summary.top.len(),
            tone: Tone::Warn,
        },
        StatCard {
            title: tr(locale, "Countries", "參賽國家").to_string(),
            value: summary.distinct_countries,
            tone: Tone::Good,
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryBar {
    pub position: usize,
    pub country: String,
    pub count: usize,
    pub ratio: f64,
}

pub fn country_bars(summary: &RankingSummary<'_>) -> Vec<CountryBar> {
    summary
        .countries
        .iter()
        .enumerate()
        .map(|(idx, bucket)| CountryBar {
            position: idx + 1,
            country: bucket.country.clone(),
            count: bucket.count,
            ratio: bar_ratio(bucket.count, summary.total),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingRow {
    pub rank: String,
    pub name: String,
    pub country: String,
    pub points: String,
}

pub fn ranking_rows(summary: &RankingSummary<'_>) -> Vec<RankingRow> {
    summary
        .top
        .iter()
        .enumerate()
        .map(|(idx, entry)| RankingRow {
            rank: entry.rank().unwrap_or_else(|| (idx + 1).to_string()),
            name: entry.name().unwrap_or_else(|| "-".to_string()),
            country: entry.country().unwrap_or("-").to_string(),
            points: entry.points().unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

pub fn format_updated_at(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

/// Fixed-width text bar; `ratio` outside `0..=1` (or NaN) is clamped.
pub fn text_bar(ratio: f64, width: usize) -> String {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    FailureReason,
    Category,
    DetailedAnalysis,
    Suggestions,
    Summary,
    TechnicalData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub lines: Vec<String>,
    pub tone: Tone,
    pub badge: Option<SeverityBadge>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPanel {
    Report(Vec<Section>),
    Error { title: String, message: String },
}

pub fn analysis_panel(result: &AnalysisResult, locale: Locale) -> AnalysisPanel {
    let analysis = match result {
        AnalysisResult::Failure { error } => {
            return AnalysisPanel::Error {
                title: tr(locale, "Analysis failed", "分析失敗").to_string(),
                message: error.clone(),
            };
        }
        AnalysisResult::Success(analysis) => analysis,
    };
    let ai = &analysis.ai;
    let data = &analysis.structured;

    let detail_lines = if ai.findings.is_empty() {
        vec![tr(locale, "No detailed findings", "沒有詳細分析").to_string()]
    } else {
        ai.findings
            .iter()
            .map(|f| format!("{}: {}", attribute_label(&f.attribute, locale), f.text))
            .collect()
    };
    let suggestion_lines = ai
        .improvement_suggestions
        .iter()
        .map(|s| format!("✓ {s}"))
        .collect();

    let technical = vec![
        format!(
            "{}: {:.2} s",
            tr(locale, "Video duration", "影片時長"),
            data.video_info.duration_seconds
        ),
        format!(
            "{}: {}",
            tr(locale, "Analyzed frames", "分析幀數"),
            data.pose_analysis.analyzed_frames
        ),
        format!(
            "{}: {:.1}°",
            tr(locale, "Avg racket angle", "平均拍面角度"),
            data.pose_analysis.avg_racket_angle
        ),
        format!(
            "{}: {:.1}",
            tr(locale, "Racket angle variance", "拍面角度變異"),
            data.pose_analysis.racket_angle_variance
        ),
        format!(
            "{}: {}",
            tr(locale, "Stance", "站位評估"),
            or_dash(&data.technical_indicators.stance)
        ),
        format!(
            "{}: {}",
            tr(locale, "Racket control", "拍面控制"),
            or_dash(&data.technical_indicators.racket_control)
        ),
        format!(
            "{}: {}",
            tr(locale, "Body balance", "身體平衡"),
            or_dash(&data.technical_indicators.body_balance)
        ),
    ];

    AnalysisPanel::Report(vec![
        Section {
            kind: SectionKind::FailureReason,
            title: tr(locale, "Failure reason", "失誤原因").to_string(),
            lines: vec![ai.failure_reason.clone()],
            tone: Tone::Neutral,
            badge: Some(severity_badge(&ai.severity, locale)),
        },
        Section {
            kind: SectionKind::Category,
            title: tr(locale, "Category", "問題類別").to_string(),
            lines: vec![ai.category.clone()],
            tone: Tone::Neutral,
            badge: None,
        },
        Section {
            kind: SectionKind::DetailedAnalysis,
            title: tr(locale, "Detailed analysis", "詳細分析").to_string(),
            lines: detail_lines,
            tone: Tone::Neutral,
            badge: None,
        },
        Section {
            kind: SectionKind::Suggestions,
            title: tr(locale, "Improvement suggestions", "改進建議").to_string(),
            lines: suggestion_lines,
            tone: Tone::Info,
            badge: None,
        },
        Section {
            kind: SectionKind::Summary,
            title: tr(locale, "Summary", "總結").to_string(),
            lines: vec![ai.summary.clone()],
            tone: Tone::Accent,
            badge: None,
        },
        Section {
            kind: SectionKind::TechnicalData,
            title: tr(locale, "Technical data", "技術數據").to_string(),
            lines: technical,
            tone: Tone::Neutral,
            badge: None,
        },
    ])
}

pub fn prediction_lines(prediction: &ClassifierPrediction) -> Vec<String> {
    const BAR_WIDTH: usize = 30;
    let mut lines = vec![
        format!("Predicted class: {}", prediction.predicted_class.to_uppercase()),
        format!("Confidence: {:.2}%", prediction.confidence * 100.0),
    ];
    if !prediction.probabilities.is_empty() {
        lines.push("Class probabilities:".to_string());
        for (class, prob) in &prediction.probabilities {
            lines.push(format!(
                "  {class:8} {:>6.2}% {}",
                prob * 100.0,
                text_bar(*prob, BAR_WIDTH)
            ));
        }
    }
    lines
}

/// Fixed screen copy for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiText {
    pub loading: &'static str,
    pub updating: &'static str,
    pub load_failed: &'static str,
    pub retry_hint: &'static str,
    pub error_title: &'static str,
    pub no_data: &'static str,
    pub updated: &'static str,
    pub table_header: [&'static str; 4],
    pub distribution_title: &'static str,
    pub no_countries: &'static str,
    pub upload_title: &'static str,
    pub result_title: &'static str,
    pub idle_hint: &'static str,
    pub ready_hint: &'static str,
    pub analyzing_hint: &'static str,
    pub path_label: &'static str,
    pub selected: &'static str,
    pub drop_hint: &'static str,
    pub recommended: &'static str,
    pub seconds: &'static str,
    pub deep_toggle: &'static str,
    pub status: &'static str,
    pub console_title: &'static str,
    pub no_messages: &'static str,
}

const EN_TEXT: UiText = UiText {
    loading: "Loading...",
    updating: "Updating rankings...",
    load_failed: "Could not load rankings",
    retry_hint: "Press r to retry.",
    error_title: "Error",
    no_data: "No ranking data",
    updated: "Updated",
    table_header: ["Rank", "Player", "Country", "Points"],
    distribution_title: "Country distribution",
    no_countries: "No countries",
    upload_title: "Upload clip",
    result_title: "Result",
    idle_hint: "Paste or type the path of a short clip to get started.",
    ready_hint: "Press Enter to analyze the selected clip.",
    analyzing_hint: "Analyzing the clip, please wait...",
    path_label: "Path",
    selected: "Selected",
    drop_hint: "Drop a clip by pasting its path, or press o to type one (MP4, AVI, MOV, MKV).",
    recommended: "Recommended length",
    seconds: "seconds",
    deep_toggle: "Deep AI analysis",
    status: "Status",
    console_title: "Console",
    no_messages: "No messages yet",
};

const ZH_TW_TEXT: UiText = UiText {
    loading: "載入中...",
    updating: "更新中...",
    load_failed: "獲取數據失敗",
    retry_hint: "按 r 重試。",
    error_title: "錯誤",
    no_data: "暫無數據",
    updated: "更新時間",
    table_header: ["排名", "選手", "國家", "積分"],
    distribution_title: "國家分布",
    no_countries: "暫無數據",
    upload_title: "上傳失誤影片",
    result_title: "分析結果",
    idle_hint: "貼上或輸入影片路徑以開始（支援格式: MP4, AVI, MOV, MKV）。",
    ready_hint: "按 Enter 開始分析。",
    analyzing_hint: "正在分析影片，請稍候...",
    path_label: "路徑",
    selected: "已選擇",
    drop_hint: "貼上影片路徑或按 o 輸入（支援格式: MP4, AVI, MOV, MKV）。",
    recommended: "建議時長",
    seconds: "秒",
    deep_toggle: "使用 Gemini AI 深度分析",
    status: "狀態",
    console_title: "訊息",
    no_messages: "尚無訊息",
};

pub fn ui_text(locale: Locale) -> &'static UiText {
    match locale {
        Locale::En => &EN_TEXT,
        Locale::ZhTw => &ZH_TW_TEXT,
    }
}

pub fn screen_title(screen: Screen, locale: Locale) -> &'static str {
    match screen {
        Screen::Rankings => tr(locale, "RANKINGS", "世界桌球排名"),
        Screen::Analysis => tr(locale, "FAILURE ANALYSIS", "失誤分析"),
    }
}

pub fn phase_text(phase: &AnalysisPhase, locale: Locale) -> &'static str {
    match phase {
        AnalysisPhase::Idle => tr(locale, "idle", "等待選擇影片"),
        AnalysisPhase::Ready => tr(locale, "ready", "可開始分析"),
        AnalysisPhase::Analyzing => tr(locale, "analyzing", "正在分析中..."),
        AnalysisPhase::Done(AnalysisResult::Success(_)) => tr(locale, "done", "分析完成"),
        AnalysisPhase::Done(AnalysisResult::Failure { .. }) => tr(locale, "failed", "分析失敗"),
    }
}

fn or_dash(raw: &str) -> &str {
    if raw.trim().is_empty() { "-" } else { raw }
}

fn tr(locale: Locale, en: &'static str, zh: &'static str) -> &'static str {
    match locale {
        Locale::En => en,
        Locale::ZhTw => zh,
    }
}
