//! Analyzer Module
//!
//! Rubric-driven AI analysis of financial documents: rubric loading,
//! the Gemini client, and the extract-detect-analyze pipeline shared
//! by the HTTP upload handler, the email worker, and the CLI.

pub mod client;
pub mod rubric;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::pdf;
use crate::types::{AnalysisReport, DocumentType};

pub use client::GeminiClient;
pub use rubric::{load_rubric, Rubric};

/// Failures in the rubric/analysis path. Each one is reported to the
/// requester (HTTP error, error email) rather than crashing the run.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("rubrics file not found at {0}")]
    RubricsMissing(String),

    #[error("could not read rubrics file {0}: {1}")]
    RubricsUnreadable(String, String),

    #[error("rubric '{0}' not found")]
    UnknownRubric(String),

    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("no JSON object found in model response")]
    NoJsonInResponse { raw: String },

    #[error("could not parse model response as a report: {reason}")]
    BadReport { reason: String, raw: String },
}

/// Run the full pipeline for one PDF: extract text, detect (or accept)
/// the document type, load its rubric, and analyze.
pub async fn analyze_pdf(
    gemini: &GeminiClient,
    rubrics_path: &Path,
    pdf_path: &Path,
    requested: Option<DocumentType>,
) -> Result<(DocumentType, AnalysisReport)> {
    let owned: PathBuf = pdf_path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf::extract_text(&owned))
        .await
        .context("PDF extraction task failed")??;

    // Logged for the operator; the model does its own extraction too.
    let client = pdf::extract_client_data(&text);
    info!(client = %client.name, date = %client.document_date, "scraped client details");

    let doc_type = requested.unwrap_or_else(|| DocumentType::detect(&text));
    info!(%doc_type, path = %pdf_path.display(), "analyzing document");

    let rubric = load_rubric(rubrics_path, doc_type.slug())?;
    let report = gemini.analyze(&text, &rubric).await?;

    Ok((doc_type, report))
}
