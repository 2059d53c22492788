//! Document model for the write-coalescing store
//!
//! This crate provides:
//! - The per-entity document representation (JSON value tree)
//! - Dot-path leaf assignment (`apply_path`)

pub mod document;

// Re-exports
pub use document::{apply_path, empty_document, Document};
