use std::collections::BTreeMap;

use log::{debug, warn};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::http_client::upload_client;
use crate::upload::VideoFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Other(String),
}

impl Severity {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "minor" => Severity::Minor,
            "moderate" => Severity::Moderate,
            "severe" => Severity::Severe,
            _ => Severity::Other(raw.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DetailAttribute {
    Stance,
    RacketAngle,
    BodyBalance,
    Timing,
    Other(String),
}

impl DetailAttribute {
    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "stance" => DetailAttribute::Stance,
            "racket_angle" => DetailAttribute::RacketAngle,
            "body_balance" => DetailAttribute::BodyBalance,
            "timing" => DetailAttribute::Timing,
            other => DetailAttribute::Other(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            DetailAttribute::Stance => "stance",
            DetailAttribute::RacketAngle => "racket_angle",
            DetailAttribute::BodyBalance => "body_balance",
            DetailAttribute::Timing => "timing",
            DetailAttribute::Other(key) => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub attribute: DetailAttribute,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiAnalysis {
    pub failure_reason: String,
    pub category: String,
    pub findings: Vec<Finding>,
    pub improvement_suggestions: Vec<String>,
    pub summary: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoInfo {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PoseAnalysis {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub analyzed_frames: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_racket_angle: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub racket_angle_variance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(default, deserialize_with = "lenient_string")]
    pub stance: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub racket_control: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body_balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StructuredData {
    #[serde(default)]
    pub video_info: VideoInfo,
    #[serde(default)]
    pub pose_analysis: PoseAnalysis,
    #[serde(default)]
    pub technical_indicators: TechnicalIndicators,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureAnalysis {
    pub ai: AiAnalysis,
    pub structured: StructuredData,
}

/// Outcome of one submission. Transport and HTTP failures land in `Failure` too.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Success(Box<FailureAnalysis>),
    Failure { error: String },
}

impl AnalysisResult {
    pub fn failure(error: impl Into<String>) -> Self {
        AnalysisResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success(_))
    }
}

/// Output of the backend's plain pose classifier (`/analyze`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassifierPrediction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub predicted_class: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: f64,
    #[serde(default)]
    pub probabilities: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    analysis: Option<AnalysisPayload>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    ai_analysis: Option<AiAnalysisWire>,
    #[serde(default)]
    structured_data: Option<StructuredData>,
}

#[derive(Debug, Default, Deserialize)]
struct AiAnalysisWire {
    #[serde(default, deserialize_with = "lenient_string")]
    failure_reason: String,
    #[serde(default, deserialize_with = "lenient_string")]
    category: String,
    #[serde(default)]
    detailed_analysis: Option<Map<String, Value>>,
    #[serde(default)]
    improvement_suggestions: Value,
    #[serde(default, deserialize_with = "lenient_string")]
    summary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    severity: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    base_url: String,
    client: Client,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let client = upload_client(config)?.clone();
        Ok(Self::new(config.api_url.clone(), client))
    }

    /// Never fails: every error is folded into [`AnalysisResult::Failure`].
    pub fn submit_video(&self, file: &VideoFile, use_deep_analysis: bool) -> AnalysisResult {
        match self.try_submit_video(file, use_deep_analysis) {
            Ok(result) => result,
            Err(err) => {
                warn!("analysis of {} failed: {err}", file.file_name);
                AnalysisResult::failure(format!("Analysis request failed: {err}"))
            }
        }
    }

    fn try_submit_video(
        &self,
        file: &VideoFile,
        use_deep_analysis: bool,
    ) -> Result<AnalysisResult, ApiError> {
        let url = format!("{}/api/analyze-failure", self.base_url);
        let form = video_form(file)?.text("use_gemini", use_deep_analysis.to_string());
        debug!(
            "POST {url} ({}, {} bytes, deep={use_deep_analysis})",
            file.file_name, file.size_bytes
        );
        let resp = self.client.post(&url).multipart(form).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        parse_analysis_json(&body)
    }

    pub fn classify_video(&self, file: &VideoFile) -> Result<ClassifierPrediction, ApiError> {
        let url = format!("{}/analyze", self.base_url);
        let form = video_form(file)?;
        debug!("POST {url} ({})", file.file_name);
        let resp = self.client.post(&url).multipart(form).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            // The classifier reports its own failures as `{ "error": ... }`.
            if let Some(message) = backend_error(&body) {
                return Err(ApiError::Backend(message));
            }
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        parse_prediction_json(&body)
    }
}

fn video_form(file: &VideoFile) -> Result<Form, ApiError> {
    let bytes = file.read_bytes()?;
    let part = Part::bytes(bytes)
        .file_name(file.file_name.clone())
        .mime_str(&file.media_type)
        .map_err(|_| ApiError::UnsupportedMediaType {
            media_type: file.media_type.clone(),
        })?;
    Ok(Form::new().part("file", part))
}

pub fn parse_analysis_json(raw: &str) -> Result<AnalysisResult, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ApiError::Decode("empty analysis response".to_string()));
    }
    let envelope: AnalysisEnvelope = serde_json::from_str(trimmed)?;

    if !envelope.success {
        let error = envelope
            .error
            .as_ref()
            .and_then(value_text)
            .unwrap_or_else(|| "analysis failed without an error message".to_string());
        return Ok(AnalysisResult::failure(error));
    }

    let Some(payload) = envelope.analysis else {
        return Ok(AnalysisResult::failure("analysis missing from response"));
    };
    let wire = payload.ai_analysis.unwrap_or_default();
    let ai = AiAnalysis {
        failure_reason: wire.failure_reason,
        category: wire.category,
        findings: collect_findings(wire.detailed_analysis.as_ref()),
        improvement_suggestions: collect_suggestions(&wire.improvement_suggestions),
        summary: wire.summary,
        severity: Severity::from_wire(&wire.severity),
    };
    Ok(AnalysisResult::Success(Box::new(FailureAnalysis {
        ai,
        structured: payload.structured_data.unwrap_or_default(),
    })))
}

pub fn parse_prediction_json(raw: &str) -> Result<ClassifierPrediction, ApiError> {
    if let Some(message) = backend_error(raw) {
        return Err(ApiError::Backend(message));
    }
    let prediction: ClassifierPrediction = serde_json::from_str(raw.trim())?;
    Ok(prediction)
}

/// Known attributes first in their fixed order, then unknown keys lexically.
fn collect_findings(detail: Option<&Map<String, Value>>) -> Vec<Finding> {
    let Some(detail) = detail else {
        return Vec::new();
    };
    let mut findings: Vec<Finding> = detail
        .iter()
        .filter_map(|(key, value)| {
            let text = value_text(value)?;
            Some(Finding {
                attribute: DetailAttribute::from_key(key),
                text,
            })
        })
        .collect();
    findings.sort_by(|a, b| a.attribute.cmp(&b.attribute));
    findings
}

fn collect_suggestions(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_text).collect(),
        _ => Vec::new(),
    }
}

fn backend_error(raw: &str) -> Option<String> {
    let root: Value = serde_json::from_str(raw.trim()).ok()?;
    root.get("error").and_then(value_text)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(value.max(0.0).min(u32::MAX as f64) as u32)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_text).unwrap_or_default())
}
