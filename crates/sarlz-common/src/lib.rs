//! Common types and utilities for the sarlz compiler.
//!
//! This crate provides foundational types used across all sarlz crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, codes and message templates)
//! - Compiler limits and thresholds

// Diagnostic codes, categories and message templates
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, format_message};

// Centralized limits and thresholds
pub mod limits;
