pub mod analysis_fetch;
pub mod category;
pub mod config;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod provider;
pub mod ranking_fetch;
pub mod ranking_stats;
pub mod sequence;
pub mod state;
pub mod upload;
pub mod view;
