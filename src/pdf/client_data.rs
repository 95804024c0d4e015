//! Client Data Scraping
//!
//! Pulls the account holder's name, account number, and document date
//! out of extracted statement text with a small set of labeled-field
//! patterns. Everything falls back to an explicit "unknown" value.

use regex::Regex;
use tracing::debug;

/// Client details scraped from document text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientData {
    pub name: String,
    pub account_number: String,
    pub document_date: String,
}

const NAME_PATTERNS: [&str; 3] = [
    r"(?i)(?:Account Holder|Name|Client|Customer):\s*(.+)",
    r"(?i)(?:Primary Account Holder):\s*(.+)",
    r"(?i)(?:Account Name):\s*(.+)",
];

const DATE_PATTERNS: [&str; 2] = [
    r"(?i)(?:Statement Date|Report Date|As of):\s*([\d/\-]+)",
    r"(?i)(?:Date):\s*([\d/\-]+)",
];

/// Scrape client name, account number, and document date from text.
pub fn extract_client_data(text: &str) -> ClientData {
    let mut name = "Unknown Client".to_string();
    for pattern in NAME_PATTERNS {
        let Ok(re) = Regex::new(pattern) else { continue };
        if let Some(captures) = re.captures(text) {
            name = captures[1].trim().to_string();
            // Drop trailing account digits that bleed into the name line.
            if let Ok(trailing) = Regex::new(r"\s+\d{4,}.*$") {
                name = trailing.replace(&name, "").to_string();
            }
            break;
        }
    }

    let account_number = Regex::new(r"(?i)(?:Account|Acct)\s*(?:Number|#)?\s*[:\-]?\s*([\*\d]{4,})")
        .ok()
        .and_then(|re| re.captures(text).map(|c| c[1].trim().to_string()))
        .unwrap_or_else(|| "Not Found".to_string());

    let mut document_date = "Unknown Date".to_string();
    for pattern in DATE_PATTERNS {
        let Ok(re) = Regex::new(pattern) else { continue };
        if let Some(captures) = re.captures(text) {
            document_date = captures[1].trim().to_string();
            break;
        }
    }

    debug!(%name, %account_number, %document_date, "scraped client data");

    ClientData {
        name,
        account_number,
        document_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_STATEMENT: &str = "\
Bank Statement - ABC Bank
Account Holder: John Doe
Account Number: ****5678
Statement Date: 01/31/2024
Opening Balance: $5,234.56
Closing Balance: $3,890.23";

    #[test]
    fn test_extracts_all_fields() {
        let data = extract_client_data(SAMPLE_STATEMENT);
        assert_eq!(data.name, "John Doe");
        assert_eq!(data.account_number, "****5678");
        assert_eq!(data.document_date, "01/31/2024");
    }

    #[test]
    fn test_strips_trailing_account_digits_from_name() {
        let data = extract_client_data("Account Holder: Jane Roe 00123456");
        assert_eq!(data.name, "Jane Roe");
    }

    #[test]
    fn test_as_of_date_pattern() {
        let data = extract_client_data("Credit Report\nAs of: 2024-03-15\nScore: 712");
        assert_eq!(data.document_date, "2024-03-15");
    }

    #[test]
    fn test_fallbacks_when_nothing_matches() {
        let data = extract_client_data("completely unstructured text");
        assert_eq!(data.name, "Unknown Client");
        assert_eq!(data.account_number, "Not Found");
        assert_eq!(data.document_date, "Unknown Date");
    }

    #[test]
    fn test_case_insensitive_labels() {
        let data = extract_client_data("CUSTOMER: alice example\nacct #: 443322110");
        assert_eq!(data.name, "alice example");
        assert_eq!(data.account_number, "443322110");
    }
}
