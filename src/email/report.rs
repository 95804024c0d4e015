//! Report Formatting
//!
//! Renders an analysis report (or a processing failure) into the
//! plain-text email sent back to the document submitter.

use crate::types::{AnalysisReport, DocumentType};

/// Subject line for a successful analysis reply.
pub fn reply_subject(original_subject: &str) -> String {
    format!(
        "Re: {} - Financial Document Analysis Report",
        original_subject
    )
}

/// Subject line for an error notification.
pub fn error_subject(original_subject: &str) -> String {
    format!("Re: {} - Error Processing Document", original_subject)
}

/// Render the full analysis report email body.
pub fn format_report_body(doc_type: DocumentType, report: &AnalysisReport) -> String {
    let mut body = String::from("FINANCIAL DOCUMENT ANALYSIS REPORT\n\n");
    body.push_str(&format!(
        "Document Type: {}\n",
        doc_type.title().to_uppercase()
    ));
    body.push_str(&format!(
        "Overall Assessment: {}\n\n",
        report.overall_assessment
    ));
    body.push_str(&format!("SUMMARY:\n{}\n\n", report.analysis_summary));
    body.push_str(&format!("KEY FINDINGS:\n{}\n\n", report.key_findings));

    body.push_str("DETAILED ANALYSIS:\n");
    for criterion in &report.criteria_analysis {
        body.push_str(&format!("\n{}:\n", criterion.criterion));
        body.push_str(&format!("  Findings: {}\n", criterion.findings));
        body.push_str(&format!("  Assessment: {}\n", criterion.assessment));
        if !criterion.notes.is_empty() {
            body.push_str(&format!("  Notes: {}\n", criterion.notes));
        }
    }

    if !report.red_flags.is_empty() && report.red_flags != "None identified" {
        body.push_str(&format!("\nRED FLAGS:\n{}\n", report.red_flags));
    }

    body.push_str(&format!("\nRECOMMENDATIONS:\n{}\n", report.recommendations));
    body.push_str(
        "\n---\nThis is an automated analysis. Please review the original document for complete details.",
    );
    body
}

/// Render the error notification email body.
pub fn format_error_body(original_subject: &str, error: &str) -> String {
    format!(
        "An error occurred while processing your financial document (Subject: {}):\n\n{}\n\n\
         Please ensure the document is a valid PDF and try again, or contact our support team.",
        original_subject, error
    )
}
