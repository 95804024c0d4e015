//! Setup Module
//!
//! Idempotent environment bootstrap: toolchain checks, secrets file
//! scaffolding, working-directory creation, and the completion banner.
//! One portable entry point; no platform-specific scripts needed.

pub mod banner;
pub mod env_file;
pub mod runner;
pub mod toolchain;

pub use runner::{run_setup, SetupError, SetupOptions, SetupReport};
