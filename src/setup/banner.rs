//! Completion Banner
//!
//! The success summary and manual next steps printed after a full
//! setup run.

use colored::Colorize;

use super::runner::SetupReport;

/// Print the setup-complete banner plus next steps for the operator.
pub fn show_completion(report: &SetupReport, port: u16) {
    println!();
    println!("{}", "  ============================================".cyan());
    println!("{}", "   Financial Document Analyzer - setup done".cyan());
    println!("{}", "  ============================================".cyan());
    println!();

    if report.env_preserved {
        println!(
            "{}",
            "  Your existing .env was kept. Check that its keys are filled in.".yellow()
        );
    } else {
        println!("{}", "  Next steps:".white());
        println!("{}", "  1. Edit .env and fill in your credentials.".white());
    }
    println!("{}", "  2. Start the server:  findoc --serve".white());
    println!(
        "{}",
        format!("  3. Open http://localhost:{} in your browser.", port).white()
    );
    println!("{}", "  4. Upload a financial document to analyze it.".white());
    println!();
}
