use std::collections::VecDeque;
use std::path::Path;

use log::{debug, info, warn};

use crate::analysis_fetch::AnalysisResult;
use crate::category::{CategorySelector, RankingCategory};
use crate::config::{AppConfig, Locale};
use crate::error::ApiError;
use crate::ranking_fetch::RankingResponse;
use crate::ranking_stats::RankingSummary;
use crate::sequence::RequestSequence;
use crate::upload::{PreviewHandle, PreviewRegistry, VideoFile};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Rankings,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditingPath,
}

/// Idle -> Ready -> Analyzing -> Done, with re-selection allowed from any phase.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPhase {
    Idle,
    Ready,
    Analyzing,
    Done(AnalysisResult),
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub locale: Locale,
    pub top_n: usize,
    pub categories: CategorySelector,
    pub ranking: Option<RankingResponse>,
    pub ranking_error: Option<ApiError>,
    pub ranking_loading: bool,
    pub ranking_updating: bool,
    pub ranking_seq: RequestSequence,
    pub backend_healthy: Option<bool>,
    pub analysis_phase: AnalysisPhase,
    pub analysis_seq: RequestSequence,
    pub selected_file: Option<VideoFile>,
    pub preview: Option<PreviewHandle>,
    pub previews: PreviewRegistry,
    pub use_deep_analysis: bool,
    pub input_mode: InputMode,
    pub path_input: String,
    pub notice: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            screen: Screen::Rankings,
            locale: config.locale,
            top_n: config.top_n,
            categories: CategorySelector::new(config.default_category),
            ranking: None,
            ranking_error: None,
            ranking_loading: false,
            ranking_updating: false,
            ranking_seq: RequestSequence::new(),
            backend_healthy: None,
            analysis_phase: AnalysisPhase::Idle,
            analysis_seq: RequestSequence::new(),
            selected_file: None,
            preview: None,
            previews: PreviewRegistry::new(),
            use_deep_analysis: true,
            input_mode: InputMode::Normal,
            path_input: String::new(),
            notice: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn category(&self) -> RankingCategory {
        self.categories.selected()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// True while the refresh control must stay disabled.
    pub fn ranking_busy(&self) -> bool {
        self.ranking_loading || self.ranking_updating
    }

    pub fn ranking_summary(&self) -> Option<RankingSummary<'_>> {
        self.ranking
            .as_ref()
            .map(|r| RankingSummary::from_entries(&r.entries, self.top_n))
    }

    pub fn begin_ranking_fetch(&mut self) -> ProviderCommand {
        let seq = self.ranking_seq.issue();
        // A newer fetch supersedes any update still in flight.
        self.ranking_updating = false;
        self.ranking_loading = true;
        self.ranking_error = None;
        ProviderCommand::FetchRanking {
            seq,
            category: self.category(),
        }
    }

    /// `None` while a fetch or update is already running.
    pub fn begin_update(&mut self) -> Option<ProviderCommand> {
        if self.ranking_busy() {
            self.push_log("[INFO] Update already in progress");
            return None;
        }
        let seq = self.ranking_seq.issue();
        self.ranking_loading = true;
        self.ranking_updating = true;
        self.ranking_error = None;
        Some(ProviderCommand::TriggerUpdate {
            seq,
            category: self.category(),
        })
    }

    pub fn select_category(&mut self, category: RankingCategory) -> Option<ProviderCommand> {
        if !self.categories.select(category) {
            return None;
        }
        self.ranking = None;
        Some(self.begin_ranking_fetch())
    }

    pub fn next_category(&mut self) -> Option<ProviderCommand> {
        let before = self.category();
        if self.categories.next() == before {
            return None;
        }
        self.ranking = None;
        Some(self.begin_ranking_fetch())
    }

    pub fn prev_category(&mut self) -> Option<ProviderCommand> {
        let before = self.category();
        if self.categories.prev() == before {
            return None;
        }
        self.ranking = None;
        Some(self.begin_ranking_fetch())
    }

    /// Chooses a clip. Rejected files leave the current selection untouched.
    pub fn select_video(&mut self, path: &Path) -> Result<(), ApiError> {
        let file = match VideoFile::from_path(path) {
            Ok(file) => file,
            Err(err) => {
                self.notice = Some(err.to_string());
                self.push_log(format!("[WARN] {err}"));
                return Err(err);
            }
        };
        // A reply for the previous clip must never land on this one.
        self.analysis_seq.invalidate();
        self.preview = None;
        self.preview = Some(self.previews.open(&file));
        self.push_log(format!("[INFO] Selected {}", file.file_name));
        self.selected_file = Some(file);
        self.analysis_phase = AnalysisPhase::Ready;
        self.notice = None;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.analysis_seq.invalidate();
        self.preview = None;
        self.selected_file = None;
        self.analysis_phase = AnalysisPhase::Idle;
    }

    pub fn toggle_deep_analysis(&mut self) {
        self.use_deep_analysis = !self.use_deep_analysis;
    }

    pub fn begin_analysis(&mut self) -> Option<ProviderCommand> {
        if self.analysis_phase == AnalysisPhase::Analyzing {
            return None;
        }
        let file = self.selected_file.clone()?;
        let seq = self.analysis_seq.issue();
        self.analysis_phase = AnalysisPhase::Analyzing;
        self.notice = None;
        Some(ProviderCommand::SubmitVideo {
            seq,
            file,
            use_deep_analysis: self.use_deep_analysis,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    RankingLoaded {
        seq: u64,
        category: RankingCategory,
        result: Result<RankingResponse, ApiError>,
    },
    UpdateFinished {
        seq: u64,
        result: Result<(), ApiError>,
    },
    AnalysisFinished {
        seq: u64,
        result: AnalysisResult,
    },
    Health(Result<bool, ApiError>),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchRanking {
        seq: u64,
        category: RankingCategory,
    },
    /// Refresh on the backend, then re-fetch `category` under the same `seq`.
    TriggerUpdate {
        seq: u64,
        category: RankingCategory,
    },
    SubmitVideo {
        seq: u64,
        file: VideoFile,
        use_deep_analysis: bool,
    },
    CheckHealth,
}

/// Any HTTP answer from the update endpoint is followed by a re-fetch;
/// transport failures are not.
pub fn update_refetches(result: &Result<(), ApiError>) -> bool {
    matches!(result, Ok(()) | Err(ApiError::Http { .. }))
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::RankingLoaded {
            seq,
            category,
            result,
        } => {
            if !state.ranking_seq.is_current(seq) {
                debug!("dropping stale ranking reply {seq} for {}", category.code());
                return;
            }
            state.ranking_loading = false;
            match result {
                Ok(ranking) => {
                    info!(
                        "ranking {} applied ({} entries)",
                        category.code(),
                        ranking.entries.len()
                    );
                    state.push_log(format!(
                        "[INFO] {} loaded: {} players",
                        category.code(),
                        ranking.entries.len()
                    ));
                    state.ranking = Some(ranking);
                    state.ranking_error = None;
                }
                Err(err) => {
                    warn!("ranking {} failed: {err}", category.code());
                    state.push_log(format!("[WARN] Ranking fetch error: {err}"));
                    state.ranking = None;
                    state.ranking_error = Some(err);
                }
            }
        }
        Delta::UpdateFinished { seq, result } => {
            if !state.ranking_seq.is_current(seq) {
                debug!("dropping stale update reply {seq}");
                return;
            }
            state.ranking_updating = false;
            let refetch = update_refetches(&result);
            match result {
                Ok(()) => state.push_log("[INFO] Backend update finished"),
                Err(err) if refetch => {
                    state.push_log(format!("[WARN] Update failed: {err}; reloading"))
                }
                Err(err) => state.push_log(format!("[WARN] Update failed: {err}")),
            }
            // Without a follow-up fetch, keep whatever data is shown.
            if !refetch {
                state.ranking_loading = false;
            }
        }
        Delta::AnalysisFinished { seq, result } => {
            if !state.analysis_seq.is_current(seq) {
                debug!("dropping stale analysis reply {seq}");
                return;
            }
            match &result {
                AnalysisResult::Success(_) => state.push_log("[INFO] Analysis complete"),
                AnalysisResult::Failure { error } => {
                    state.push_log(format!("[WARN] Analysis failed: {error}"))
                }
            }
            state.analysis_phase = AnalysisPhase::Done(result);
        }
        Delta::Health(result) => match result {
            Ok(healthy) => {
                state.backend_healthy = Some(healthy);
                if !healthy {
                    state.push_log("[WARN] Backend health check is not ok");
                }
            }
            Err(err) => {
                state.backend_healthy = Some(false);
                state.push_log(format!("[WARN] Backend unreachable: {err}"));
            }
        },
        Delta::Log(msg) => state.push_log(msg),
    }
}
