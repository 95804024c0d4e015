//! Shared Server State
//!
//! Everything the request handlers need: config, the Gemini client,
//! the results store, and the filesystem layout.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analyzer::GeminiClient;
use crate::config::{AnalyzerConfig, INCOMING_DIR, RESULTS_FILE, RUBRICS_FILE};
use crate::results::ResultsStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AnalyzerConfig>,
    pub gemini: Arc<GeminiClient>,
    pub results: Arc<ResultsStore>,
    pub rubrics_path: PathBuf,
    pub incoming_dir: PathBuf,
}

impl AppState {
    pub fn new(config: AnalyzerConfig) -> Self {
        let gemini = Arc::new(GeminiClient::new(&config));
        AppState {
            config: Arc::new(config),
            gemini,
            results: Arc::new(ResultsStore::new(PathBuf::from(RESULTS_FILE))),
            rubrics_path: PathBuf::from(RUBRICS_FILE),
            incoming_dir: PathBuf::from(INCOMING_DIR),
        }
    }
}
