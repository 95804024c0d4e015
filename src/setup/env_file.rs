//! Secrets Scaffold
//!
//! Writes the `.env` template on first run. An existing file is never
//! overwritten; operators edit the placeholders by hand afterwards.

use std::fs;
use std::path::Path;

/// Placeholder keys the template must contain.
pub const ENV_KEYS: [&str; 3] = ["GEMINI_API_KEY", "EMAIL_ADDRESS", "EMAIL_PASSWORD"];

/// The `.env` template written by setup.
pub fn template_contents() -> String {
    "\
# Financial Document Analyzer - credentials
#
# Get a Gemini API key at https://aistudio.google.com/app/apikey
GEMINI_API_KEY=your_gemini_api_key_here

# Gmail address the analyzer monitors for incoming documents
EMAIL_ADDRESS=your_email@gmail.com

# Gmail app password (not your login password).
# Create one at https://myaccount.google.com/apppasswords
EMAIL_PASSWORD=your_app_password_here
"
    .to_string()
}

/// Write the template to `path`. Callers are responsible for the
/// existence check; this always writes.
pub fn write_template(path: &Path) -> std::io::Result<()> {
    fs::write(path, template_contents())
}
