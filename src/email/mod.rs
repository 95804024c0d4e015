//! Email Module
//!
//! Gmail-based document intake and reply: the REST client, the report
//! formatter, and the polling worker that ties them to the analyzer.

pub mod gmail;
pub mod report;
pub mod worker;

pub use worker::EmailWorker;
