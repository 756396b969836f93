//! Per-product processed marker.
//!
//! A `.processed` file in a product's clip directory means every clip group
//! of that product has been extracted. Only its existence is checked.

use crate::error::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROCESSED_MARKER: &str = ".processed";

pub fn marker_path(product_dir: &Path) -> PathBuf {
    product_dir.join(PROCESSED_MARKER)
}

pub fn is_processed(product_dir: &Path) -> bool {
    marker_path(product_dir).exists()
}

/// Writes the marker with a human-readable timestamp.
pub fn mark_processed(product_dir: &Path) -> Result<()> {
    let content = format!(
        "Processed on: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    fs::write(marker_path(product_dir), content)?;
    Ok(())
}
