//! Product database and clip versioning.
//!
//! Products are stored by base name (`widget`); each recording of a product
//! goes to its own versioned directory under the clips root (`widget_v1`,
//! `widget_v2`, ...). The database is a sorted JSON array of base names.

pub mod prompt;
pub mod similarity;

pub use prompt::{TerminalDialog, TerminalPrompt};

use crate::error::{AppError, Result};
use logging::Logger;
use similarity::close_matches;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const VERSION_MARKER: &str = "_v";
/// Suggestions offered for an unknown product name
pub const MAX_SUGGESTIONS: usize = 5;
/// Minimum similarity ratio of a fuzzy suggestion
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// Strips trailing `_v<digits>` suffixes: `widget_v3` -> `widget`.
///
/// The prefix left in front of a suffix must not be empty, so `_v1` is its
/// own base. Stripping repeats until no suffix is left, which makes
/// `extract_base(extract_base(x)) == extract_base(x)`.
pub fn extract_base(name: &str) -> &str {
    let mut base = name;
    while let Some((prefix, _)) = split_version(base) {
        base = prefix;
    }
    base
}

/// Splits `<prefix>_v<digits>` into the prefix and the version number.
fn split_version(name: &str) -> Option<(&str, u32)> {
    let (prefix, digits) = name.rsplit_once(VERSION_MARKER)?;
    if prefix.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((prefix, digits.parse().ok()?))
}

/// Operator input to database form: trimmed, lower-case, spaces as `_`.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// A known product offered for an unknown name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub product: String,
    /// Recorded versions, `["v1", "v2", ...]`
    pub versions: Vec<String>,
}

/// Operator answer to "did you mean one of these?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimilarChoice {
    /// Record a new version of this known product
    Existing(String),
    /// Keep the typed name as a new product
    NewProduct,
    Cancel,
}

/// Questions asked while resolving a label
pub trait NamingDialog {
    /// Confirms recording `next_label` for a known product.
    fn confirm_version(&mut self, product: &str, versions: &[String], next_label: &str) -> bool;
    /// Offers known products similar to an unknown name.
    fn choose_similar(&mut self, name: &str, suggestions: &[Suggestion]) -> SimilarChoice;
    /// Confirms creating a product nothing resembles.
    fn confirm_new(&mut self, name: &str) -> bool;
}

/// Known products plus the version directories under the clips root
pub struct ProductManager {
    products_file: PathBuf,
    clips_dir: PathBuf,
    products: Vec<String>,
    logger: Logger,
}

impl ProductManager {
    /// Loads the products database.
    ///
    /// A missing file is an empty database; an unreadable or malformed one is
    /// logged and also treated as empty.
    pub fn new(products_file: impl Into<PathBuf>, clips_dir: impl Into<PathBuf>, logger: &Logger) -> Self {
        let logger = logger.for_component("ProductManager");
        let products_file = products_file.into();
        let products = load_products(&products_file, &logger);
        logger.info(&format!(
            "{} product(s) loaded from {}",
            products.len(),
            products_file.display()
        ));

        Self {
            products_file,
            clips_dir: clips_dir.into(),
            products,
            logger,
        }
    }

    pub fn ensure_clips_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.clips_dir)?;
        self.logger
            .info(&format!("Clips directory ready: {}", self.clips_dir.display()));
        Ok(())
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    /// Base names, sorted and unique
    pub fn products(&self) -> &[String] {
        &self.products
    }

    /// Case-insensitive lookup of a base name
    pub fn is_known(&self, base: &str) -> bool {
        self.products.iter().any(|p| p.eq_ignore_ascii_case(base))
    }

    /// Stores the base name of `name` and rewrites the database.
    ///
    /// # Returns
    /// `Ok(true)` when the product was new, `Ok(false)` when already known
    pub fn add_product(&mut self, name: &str) -> Result<bool> {
        let base = extract_base(name);
        if base.is_empty() || self.products.iter().any(|p| p == base) {
            return Ok(false);
        }

        self.products.push(base.to_string());
        self.products.sort();
        self.save()?;
        self.logger.info(&format!("New product added: {}", base));
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.products)
            .map_err(|e| AppError::Products(e.to_string()))?;
        config_loader::write_config_file(&self.products_file, &json)
            .map_err(|e| AppError::Products(e.to_string()))
    }

    /// Version numbers of `<base>_v<N>` directories under the clips root
    fn version_numbers(&self, base: &str) -> Vec<u32> {
        let Ok(entries) = fs::read_dir(&self.clips_dir) else {
            return Vec::new();
        };

        let mut versions: Vec<u32> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let (prefix, version) = split_version(&name)?;
                (prefix == base).then_some(version)
            })
            .collect();
        versions.sort_unstable();
        versions
    }

    /// Next free label: `<base>_v<max + 1>`, or `<base>_v1`.
    pub fn get_next_version(&self, base: &str) -> String {
        let next = self
            .version_numbers(base)
            .last()
            .map_or(1, |max| max.saturating_add(1));
        format!("{}{}{}", base, VERSION_MARKER, next)
    }

    /// Recorded versions as `["v1", "v2", ...]`, numerically sorted
    pub fn existing_versions(&self, base: &str) -> Vec<String> {
        self.version_numbers(base)
            .into_iter()
            .map(|v| format!("v{}", v))
            .collect()
    }

    /// Known products resembling `query`.
    ///
    /// Substring matches (case-insensitive) come first, then fuzzy matches,
    /// best first. No duplicates, at most `max` entries.
    pub fn find_similar(&self, query: &str, max: usize) -> Vec<String> {
        let query = extract_base(query).to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let substring = self
            .products
            .iter()
            .filter(|p| p.to_lowercase().contains(&query));
        let fuzzy = close_matches(&query, &self.products, max, SIMILARITY_CUTOFF);

        let mut matches: Vec<String> = Vec::new();
        for product in substring.chain(fuzzy) {
            if !matches.contains(product) {
                matches.push(product.clone());
            }
        }
        matches.truncate(max);
        matches
    }

    fn suggestion(&self, product: &str) -> Suggestion {
        Suggestion {
            product: product.to_string(),
            versions: self.existing_versions(product),
        }
    }

    /// Turns operator input into a versioned label.
    ///
    /// * known base: next version of it, once confirmed
    /// * unknown base resembling known products: the operator picks one of
    ///   them, keeps the new name, or cancels
    /// * anything else: a new product, once confirmed
    ///
    /// New products are added to the database. Returns `None` on an empty
    /// name or whenever the operator declines.
    pub fn resolve_label(&mut self, input: &str, dialog: &mut dyn NamingDialog) -> Option<String> {
        let normalized = normalize(input);
        let base = extract_base(&normalized).to_string();
        if base.is_empty() {
            return None;
        }

        if self.is_known(&base) {
            return self.confirm_version(&base, dialog);
        }

        let similar = self.find_similar(&base, MAX_SUGGESTIONS);
        if similar.is_empty() {
            return dialog.confirm_new(&base).then(|| self.create_product(&base));
        }

        let suggestions: Vec<Suggestion> = similar.iter().map(|p| self.suggestion(p)).collect();
        match dialog.choose_similar(&base, &suggestions) {
            SimilarChoice::Existing(product) => self.confirm_version(&product, dialog),
            SimilarChoice::NewProduct => Some(self.create_product(&base)),
            SimilarChoice::Cancel => None,
        }
    }

    fn confirm_version(&self, product: &str, dialog: &mut dyn NamingDialog) -> Option<String> {
        let next = self.get_next_version(product);
        let versions = self.existing_versions(product);
        dialog
            .confirm_version(product, &versions, &next)
            .then_some(next)
    }

    fn create_product(&mut self, base: &str) -> String {
        if let Err(e) = self.add_product(base) {
            self.logger
                .error(&format!("Could not save product '{}': {}", base, e));
        }
        self.get_next_version(base)
    }
}

fn load_products(path: &Path, logger: &Logger) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }

    let parsed = config_loader::load_config_file(path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Vec<String>>(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(products) => products
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        Err(e) => {
            logger.error(&format!("Error loading products file: {}", e));
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_base() {
        assert_eq!(extract_base("widget_v3"), "widget");
        assert_eq!(extract_base("widget"), "widget");
        assert_eq!(extract_base("my_vase_v12"), "my_vase");
        assert_eq!(extract_base("widget_v"), "widget_v");
        assert_eq!(extract_base("widget_vx1"), "widget_vx1");
        assert_eq!(extract_base("_v1"), "_v1");
        assert_eq!(extract_base(""), "");
    }

    #[test]
    fn test_extract_base_is_idempotent() {
        for name in ["widget_v3", "a_v1_v2", "_v1_v2", "v1", "x_v", "cola", "", "_v_v2"] {
            let once = extract_base(name);
            assert_eq!(extract_base(once), once, "not idempotent for {:?}", name);
        }
        assert_eq!(extract_base("a_v1_v2"), "a");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Orange Juice "), "orange_juice");
        assert_eq!(normalize("COLA"), "cola");
    }
}
