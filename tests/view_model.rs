use std::fs;
use std::path::PathBuf;

use ttrank_terminal::analysis_fetch::{
    AnalysisResult, ClassifierPrediction, DetailAttribute, Severity, parse_analysis_json,
    parse_prediction_json,
};
use ttrank_terminal::config::Locale;
use ttrank_terminal::state::{AnalysisPhase, Screen};
use ttrank_terminal::view::{
    AnalysisPanel, SectionKind, Tone, analysis_panel, attribute_label, format_updated_at,
    humanize_key, phase_text, prediction_lines, screen_title, severity_badge, ui_text,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn severe_fixture() -> String {
    read_fixture("analysis_success.json").replace("\"moderate\"", "\"severe\"")
}

#[test]
fn severe_analysis_gets_severe_badge() {
    let result = parse_analysis_json(&severe_fixture()).expect("fixture should parse");
    let AnalysisPanel::Report(sections) = analysis_panel(&result, Locale::ZhTw) else {
        panic!("expected a report");
    };
    let reason = sections
        .iter()
        .find(|s| s.kind == SectionKind::FailureReason)
        .expect("failure reason section");
    let badge = reason.badge.as_ref().expect("severity badge");
    assert_eq!(badge.tone, Tone::Bad);
    assert_eq!(badge.label, "嚴重");

    let en = severity_badge(&Severity::Severe, Locale::En);
    assert_eq!(en.label, "Severe");
    assert_eq!(en.tone, Tone::Bad);
}

#[test]
fn unrecognized_severity_falls_back_to_neutral() {
    let badge = severity_badge(&Severity::from_wire("catastrophic"), Locale::En);
    assert_eq!(badge.tone, Tone::Neutral);
    assert_eq!(badge.label, "Unrated (catastrophic)");

    let blank = severity_badge(&Severity::from_wire(""), Locale::ZhTw);
    assert_eq!(blank.label, "未分級");

    let raw = read_fixture("analysis_unknown_fields.json");
    let result = parse_analysis_json(&raw).expect("fixture should parse");
    assert!(matches!(
        analysis_panel(&result, Locale::En),
        AnalysisPanel::Report(_)
    ));
}

#[test]
fn severity_wire_values_are_case_insensitive() {
    assert_eq!(Severity::from_wire(" Minor "), Severity::Minor);
    assert_eq!(
        severity_badge(&Severity::from_wire("MODERATE"), Locale::En).tone,
        Tone::Warn
    );
    assert_eq!(severity_badge(&Severity::Minor, Locale::En).tone, Tone::Good);
}

#[test]
fn failed_analysis_renders_only_the_error() {
    let raw = read_fixture("analysis_failure.json");
    let result = parse_analysis_json(&raw).expect("fixture should parse");
    match analysis_panel(&result, Locale::En) {
        AnalysisPanel::Error { message, .. } => assert_eq!(message, "timeout"),
        AnalysisPanel::Report(_) => panic!("failure must not render analysis sections"),
    }
}

#[test]
fn report_sections_follow_fixed_order() {
    let raw = read_fixture("analysis_success.json");
    let result = parse_analysis_json(&raw).expect("fixture should parse");
    let AnalysisPanel::Report(sections) = analysis_panel(&result, Locale::En) else {
        panic!("expected a report");
    };
    let kinds: Vec<SectionKind> = sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SectionKind::FailureReason,
            SectionKind::Category,
            SectionKind::DetailedAnalysis,
            SectionKind::Suggestions,
            SectionKind::Summary,
            SectionKind::TechnicalData,
        ]
    );
    assert_eq!(
        sections[2].lines,
        vec![
            "Stance: Feet too close together",
            "Racket angle: Face opens about 20 degrees",
            "Timing: Contact slightly late",
        ]
    );
    assert_eq!(sections[3].lines[0], "✓ Close the racket face");
    assert!(sections[5].lines.iter().any(|l| l == "Analyzed frames: 102"));
    assert!(sections[5].lines.iter().any(|l| l == "Avg racket angle: 37.5°"));
}

#[test]
fn unknown_detail_keys_are_rendered_with_humanized_labels() {
    let raw = read_fixture("analysis_unknown_fields.json");
    let result = parse_analysis_json(&raw).expect("fixture should parse");
    let AnalysisPanel::Report(sections) = analysis_panel(&result, Locale::ZhTw) else {
        panic!("expected a report");
    };
    let detail = &sections[2];
    assert_eq!(detail.lines[0], "擊球時機: Ball taken after the peak");
    assert_eq!(detail.lines[1], "Follow through: Stops short after contact");
    assert_eq!(detail.lines[2], "Wrist: Too stiff");
    // Missing technical values show a dash.
    assert!(sections[5].lines.iter().any(|l| l == "站位評估: -"));
}

#[test]
fn attribute_labels_by_locale() {
    assert_eq!(attribute_label(&DetailAttribute::Stance, Locale::ZhTw), "站位");
    assert_eq!(
        attribute_label(&DetailAttribute::RacketAngle, Locale::ZhTw),
        "拍面角度"
    );
    assert_eq!(
        attribute_label(&DetailAttribute::BodyBalance, Locale::En),
        "Body balance"
    );
    assert_eq!(humanize_key("follow_through"), "Follow through");
    assert_eq!(humanize_key("__"), "Other");
}

#[test]
fn prediction_lines_draw_thirty_char_bars() {
    let raw = read_fixture("prediction.json");
    let prediction = parse_prediction_json(&raw).expect("fixture should parse");
    let lines = prediction_lines(&prediction);
    assert_eq!(lines[0], "Predicted class: NET");
    assert_eq!(lines[1], "Confidence: 72.00%");
    let net = lines
        .iter()
        .find(|l| l.trim_start().starts_with("net"))
        .expect("net probability line");
    let bar: String = net.chars().filter(|c| *c == '█' || *c == '░').collect();
    assert_eq!(bar.chars().count(), 30);
    assert_eq!(bar.chars().filter(|c| *c == '█').count(), 22);

    let empty = prediction_lines(&ClassifierPrediction::default());
    assert_eq!(empty.len(), 2);
}

#[test]
fn updated_at_falls_back_to_raw_text() {
    assert_eq!(format_updated_at(" yesterday "), "yesterday");
    let formatted = format_updated_at("2026-10-01T08:30:00+00:00");
    assert_eq!(formatted.len(), "2026-10-01 08:30:00".len());
}

#[test]
fn screen_copy_follows_the_locale() {
    let zh = ui_text(Locale::ZhTw);
    assert_eq!(zh.loading, "載入中...");
    assert_eq!(zh.no_data, "暫無數據");
    assert_eq!(zh.table_header, ["排名", "選手", "國家", "積分"]);
    assert_eq!(screen_title(Screen::Rankings, Locale::ZhTw), "世界桌球排名");
    assert_eq!(
        phase_text(&AnalysisPhase::Analyzing, Locale::ZhTw),
        "正在分析中..."
    );
    assert_eq!(
        phase_text(
            &AnalysisPhase::Done(AnalysisResult::failure("x")),
            Locale::ZhTw
        ),
        "分析失敗"
    );

    let en = ui_text(Locale::En);
    assert_eq!(en.table_header, ["Rank", "Player", "Country", "Points"]);
    assert_eq!(phase_text(&AnalysisPhase::Idle, Locale::En), "idle");

    // Every zh-TW string is actually translated.
    let pairs = [
        (en.loading, zh.loading),
        (en.updating, zh.updating),
        (en.load_failed, zh.load_failed),
        (en.no_data, zh.no_data),
        (en.upload_title, zh.upload_title),
        (en.result_title, zh.result_title),
        (en.idle_hint, zh.idle_hint),
        (en.ready_hint, zh.ready_hint),
        (en.analyzing_hint, zh.analyzing_hint),
        (en.drop_hint, zh.drop_hint),
        (en.status, zh.status),
        (en.console_title, zh.console_title),
    ];
    assert!(pairs.iter().all(|(a, b)| a != b));
}
