//! Utilities module for Neatify.
//!
//! This module provides various utility functions used across the codebase.

mod paths;

pub use paths::{collect_source_files, expand_targets, is_excluded, normalize_display_path};
