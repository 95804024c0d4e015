//! Gemini Analysis Client
//!
//! Sends document text plus a rubric to the Gemini `generateContent`
//! endpoint and parses the model's answer into an [`AnalysisReport`].
//! The model is instructed to reply with a single JSON object; the
//! parser tolerates prose around it by slicing the outermost braces.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::types::AnalysisReport;

use super::rubric::Rubric;
use super::AnalyzerError;

/// Client for the Gemini REST API.
pub struct GeminiClient {
    api_url: String,
    api_key: String,
    model: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: &AnalyzerConfig) -> Self {
        GeminiClient {
            api_url: config.gemini_api_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            http: Client::new(),
        }
    }

    /// Analyze a document against a rubric.
    pub async fn analyze(
        &self,
        document_text: &str,
        rubric: &Rubric,
    ) -> Result<AnalysisReport, AnalyzerError> {
        let prompt = build_prompt(document_text, rubric);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }]
        });

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: Value = resp.json().await?;
        let raw_text = json
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();

        debug!(chars = raw_text.len(), "model response received");
        parse_report(&raw_text)
    }
}

/// Build the analysis prompt: analyst framing, rubric, document, and
/// the required JSON answer shape.
pub fn build_prompt(document_text: &str, rubric: &Rubric) -> String {
    let json_structure = serde_json::json!({
        "client_name": "[Client/Account holder name, extracted from document if possible, otherwise 'Unknown']",
        "document_type": "[Type of document: Bank Statement, Credit Report, or Other Financial Document]",
        "analysis_summary": "[Brief summary of document analysis and key findings]",
        "overall_assessment": "[Overall risk assessment: Low Risk, Moderate Risk, High Risk, or Requires Review]",
        "key_findings": "[List of critical findings, extracted data, and important numbers]",
        "criteria_analysis": [
            {
                "criterion": "[Criterion Name]",
                "findings": "[Specific findings for this criterion with actual data and numbers]",
                "assessment": "[Assessment: Complete, Incomplete, or Concerning]",
                "notes": "[Additional notes or recommendations]"
            }
        ],
        "red_flags": "[Any concerning items, inconsistencies, or items requiring legal review]",
        "recommendations": "[Recommended next steps or actions for the legal team]"
    });
    let json_format_instruction =
        serde_json::to_string_pretty(&json_structure).unwrap_or_default();

    format!(
        "You are an AI assistant acting as a Senior Financial Analyst and Legal Document Reviewer \
working for a law firm. Your task is to analyze financial documents (bank statements, credit \
reports, etc.) based on the provided analysis criteria.\n\n\
Here are the analysis criteria for this document:\n{rubric}\n\n\
Here is the financial document to analyze:\n{document}\n\n\
Please provide a detailed analysis based on the criteria above. Extract ALL relevant financial \
data including:\n\
- Account/personal information\n\
- Specific dollar amounts, balances, and transactions\n\
- Dates and time periods\n\
- Payment histories and patterns\n\
- Any red flags or concerning items\n\
- Credit scores, limits, and utilization (for credit reports)\n\
- Income and expense patterns (for bank statements)\n\n\
Your response MUST be a valid JSON object ONLY. Do NOT include any other text, explanations, or \
formatting outside the JSON object.\n\
Be thorough and extract actual numbers and data from the document.\n\
The JSON object should strictly follow this format:\n{format}",
        rubric = rubric.format_for_prompt(),
        document = document_text,
        format = json_format_instruction,
    )
}

/// Slice the outermost `{ .. }` block out of the model's answer.
pub fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

/// Parse the model's raw answer into an [`AnalysisReport`].
pub fn parse_report(raw: &str) -> Result<AnalysisReport, AnalyzerError> {
    let block = extract_json_block(raw).ok_or_else(|| {
        warn!("no JSON object found in model response");
        AnalyzerError::NoJsonInResponse {
            raw: raw.to_string(),
        }
    })?;

    serde_json::from_str(block).map_err(|e| AnalyzerError::BadReport {
        reason: e.to_string(),
        raw: raw.to_string(),
    })
}
