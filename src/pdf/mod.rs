//! PDF Module
//!
//! Text extraction from incoming PDFs and regex scraping of client
//! details from the extracted text.

pub mod client_data;
pub mod extract;

pub use client_data::{extract_client_data, ClientData};
pub use extract::extract_text;

/// Reduce an untrusted filename (upload form field or email attachment
/// name) to a bare file name safe to join under the incoming directory.
pub fn safe_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .to_string();

    if base.is_empty() || base == "." || base == ".." {
        "document.pdf".to_string()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::safe_filename;

    #[test]
    fn test_safe_filename_strips_directories() {
        assert_eq!(safe_filename("../../etc/passwd"), "passwd");
        assert_eq!(safe_filename("C:\\Users\\x\\statement.pdf"), "statement.pdf");
        assert_eq!(safe_filename("statement.pdf"), "statement.pdf");
    }

    #[test]
    fn test_safe_filename_fallback() {
        assert_eq!(safe_filename(""), "document.pdf");
        assert_eq!(safe_filename(".."), "document.pdf");
    }
}
