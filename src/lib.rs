// ABOUTME: Library root for netlify-upload - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod gateway;
pub mod manifest;
pub mod output;
pub mod source;
pub mod types;
