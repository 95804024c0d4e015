//! Financial Document Analyzer - Type Definitions
//!
//! Shared types for document classification, AI analysis reports,
//! and the results ledger consumed by the web frontend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ─── Document classification ─────────────────────────────────────

/// The kind of financial document being analyzed. Each kind maps to a
/// rubric in `rubrics.json`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BankStatement,
    CreditReport,
    Generic,
}

impl DocumentType {
    /// Auto-detect the document type from extracted text.
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("bank statement")
            || lower.contains("account balance")
            || lower.contains("checking account")
            || lower.contains("transaction")
        {
            DocumentType::BankStatement
        } else if lower.contains("credit report")
            || lower.contains("credit score")
            || lower.contains("fico")
            || lower.contains("experian")
        {
            DocumentType::CreditReport
        } else {
            DocumentType::Generic
        }
    }

    /// The rubric key / wire identifier, e.g. `bank_statement`.
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentType::BankStatement => "bank_statement",
            DocumentType::CreditReport => "credit_report",
            DocumentType::Generic => "generic",
        }
    }

    /// Human-readable title, e.g. `Bank Statement`.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentType::BankStatement => "Bank Statement",
            DocumentType::CreditReport => "Credit Report",
            DocumentType::Generic => "Generic",
        }
    }

    /// Parse a wire identifier. Returns `None` for unknown values
    /// (including `auto`, which callers handle via [`DocumentType::detect`]).
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "bank_statement" => Some(DocumentType::BankStatement),
            "credit_report" => Some(DocumentType::CreditReport),
            "generic" => Some(DocumentType::Generic),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

// ─── Analysis report ─────────────────────────────────────────────

/// The structured analysis the model must return. The model occasionally
/// answers with arrays or numbers where prose was requested, so the text
/// fields accept any JSON value and flatten it to a string.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default = "unknown_client", deserialize_with = "stringish")]
    pub client_name: String,
    #[serde(default, deserialize_with = "stringish")]
    pub document_type: String,
    #[serde(default, deserialize_with = "stringish")]
    pub analysis_summary: String,
    #[serde(default = "pending_review", deserialize_with = "stringish")]
    pub overall_assessment: String,
    #[serde(default, deserialize_with = "stringish")]
    pub key_findings: String,
    #[serde(default)]
    pub criteria_analysis: Vec<CriterionAnalysis>,
    #[serde(default = "none_identified", deserialize_with = "stringish")]
    pub red_flags: String,
    #[serde(default, deserialize_with = "stringish")]
    pub recommendations: String,
}

/// Per-criterion findings within an [`AnalysisReport`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CriterionAnalysis {
    #[serde(default, deserialize_with = "stringish")]
    pub criterion: String,
    #[serde(default, deserialize_with = "stringish")]
    pub findings: String,
    #[serde(default, deserialize_with = "stringish")]
    pub assessment: String,
    #[serde(default, deserialize_with = "stringish")]
    pub notes: String,
}

fn unknown_client() -> String {
    "Unknown".to_string()
}

fn pending_review() -> String {
    "Pending Review".to_string()
}

fn none_identified() -> String {
    "None identified".to_string()
}

/// Accept a string, array, number, or null and flatten it to text.
fn stringish<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

// ─── Results ledger ──────────────────────────────────────────────

/// One entry in `grading_results.json`. Field names match what the
/// frontend expects; they predate the financial-analyzer rename.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultEntry {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub course: String,
    pub grade_output: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub criteria_scores: Vec<CriterionAnalysis>,
    pub document_type: String,
    #[serde(default)]
    pub red_flags: String,
}

impl ResultEntry {
    /// Build a ledger entry from an analysis report.
    pub fn from_report(report: &AnalysisReport, doc_type: DocumentType, email: &str) -> Self {
        let grade_output = format!(
            "Assessment: {}\n\nSummary: {}\n\nKey Findings: {}\n\nRed Flags: {}\n\nRecommendations: {}",
            report.overall_assessment,
            report.analysis_summary,
            report.key_findings,
            report.red_flags,
            report.recommendations,
        );

        ResultEntry {
            name: report.client_name.clone(),
            email: email.to_string(),
            course: doc_type.title().to_string(),
            grade_output,
            timestamp: chrono::Utc::now().to_rfc3339(),
            criteria_scores: report.criteria_analysis.clone(),
            document_type: doc_type.slug().to_string(),
            red_flags: report.red_flags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bank_statement() {
        let text = "ABC Bank Statement\nAccount Holder: Jane Roe\nOpening Balance: $100";
        assert_eq!(DocumentType::detect(text), DocumentType::BankStatement);
    }

    #[test]
    fn test_detect_credit_report() {
        let text = "Annual Credit Report\nFICO Score: 712";
        assert_eq!(DocumentType::detect(text), DocumentType::CreditReport);
    }

    #[test]
    fn test_detect_generic_fallback() {
        assert_eq!(
            DocumentType::detect("Quarterly earnings letter"),
            DocumentType::Generic
        );
    }

    #[test]
    fn test_slug_round_trip() {
        for ty in [
            DocumentType::BankStatement,
            DocumentType::CreditReport,
            DocumentType::Generic,
        ] {
            assert_eq!(DocumentType::from_slug(ty.slug()), Some(ty));
        }
        assert_eq!(DocumentType::from_slug("auto"), None);
    }

    #[test]
    fn test_report_accepts_array_fields() {
        let raw = serde_json::json!({
            "client_name": "John Doe",
            "document_type": "Bank Statement",
            "analysis_summary": "Stable balance.",
            "overall_assessment": "Low Risk",
            "key_findings": ["Opening balance $5,234.56", "Closing balance $3,890.23"],
            "criteria_analysis": [],
            "red_flags": null,
            "recommendations": "None"
        });

        let report: AnalysisReport = serde_json::from_value(raw).unwrap();
        assert!(report.key_findings.contains("Opening balance"));
        assert!(report.key_findings.contains('\n'));
        assert_eq!(report.red_flags, "");
    }

    #[test]
    fn test_report_defaults_for_missing_fields() {
        let report: AnalysisReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report.client_name, "Unknown");
        assert_eq!(report.overall_assessment, "Pending Review");
        assert_eq!(report.red_flags, "None identified");
        assert!(report.criteria_analysis.is_empty());
    }

    #[test]
    fn test_result_entry_from_report() {
        let report = AnalysisReport {
            client_name: "Jane Roe".to_string(),
            document_type: "Bank Statement".to_string(),
            analysis_summary: "Healthy account.".to_string(),
            overall_assessment: "Low Risk".to_string(),
            key_findings: "Steady deposits".to_string(),
            criteria_analysis: vec![],
            red_flags: "None identified".to_string(),
            recommendations: "No action".to_string(),
        };

        let entry = ResultEntry::from_report(&report, DocumentType::BankStatement, "a@b.com");
        assert_eq!(entry.name, "Jane Roe");
        assert_eq!(entry.course, "Bank Statement");
        assert_eq!(entry.document_type, "bank_statement");
        assert!(entry.grade_output.contains("Assessment: Low Risk"));
        assert!(entry.grade_output.contains("Key Findings: Steady deposits"));
        assert!(!entry.timestamp.is_empty());
    }
}
