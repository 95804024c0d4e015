//! Financial Document Analyzer
//!
//! Analyzes financial documents (bank statements, credit reports) with
//! rubric-driven AI review. Documents arrive by HTTP upload or as Gmail
//! attachments; results land in a JSON ledger and go back to the sender
//! by email. Includes the idempotent environment setup runner.

pub mod analyzer;
pub mod config;
pub mod email;
pub mod pdf;
pub mod results;
pub mod server;
pub mod setup;
pub mod types;
