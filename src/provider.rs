use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use log::debug;

use crate::analysis_fetch::AnalysisClient;
use crate::ranking_fetch::RankingClient;
use crate::state::{Delta, ProviderCommand, update_refetches};

/// Runs network commands off the UI thread.
///
/// Every command gets its own worker, so replies can arrive in any order;
/// `apply_delta` sorts that out with the sequence numbers carried along.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    rankings: RankingClient,
    analysis: AnalysisClient,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            let tx = tx.clone();
            let rankings = rankings.clone();
            let analysis = analysis.clone();
            thread::spawn(move || run_command(cmd, &tx, &rankings, &analysis));
        }
        debug!("provider command channel closed");
    })
}

pub fn run_command(
    cmd: ProviderCommand,
    tx: &Sender<Delta>,
    rankings: &RankingClient,
    analysis: &AnalysisClient,
) {
    match cmd {
        ProviderCommand::FetchRanking { seq, category } => {
            let result = rankings.fetch_ranking(category);
            let _ = tx.send(Delta::RankingLoaded {
                seq,
                category,
                result,
            });
        }
        ProviderCommand::TriggerUpdate { seq, category } => {
            let result = rankings.trigger_update();
            let refetch = update_refetches(&result);
            let _ = tx.send(Delta::UpdateFinished { seq, result });
            if refetch {
                let result = rankings.fetch_ranking(category);
                let _ = tx.send(Delta::RankingLoaded {
                    seq,
                    category,
                    result,
                });
            }
        }
        ProviderCommand::SubmitVideo {
            seq,
            file,
            use_deep_analysis,
        } => {
            let _ = tx.send(Delta::Log(format!(
                "[INFO] Uploading {} ({})",
                file.file_name,
                if use_deep_analysis { "deep" } else { "basic" }
            )));
            let result = analysis.submit_video(&file, use_deep_analysis);
            let _ = tx.send(Delta::AnalysisFinished { seq, result });
        }
        ProviderCommand::CheckHealth => {
            let _ = tx.send(Delta::Health(rankings.health()));
        }
    }
}
