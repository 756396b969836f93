//! Clip group discovery.
//!
//! Clips are grouped by the (product, timestamp) pair parsed from their file
//! names. A group is only usable when it holds exactly the expected set of
//! device ids; anything partial is discarded as a whole.

use crate::error::Result;
use capture::ClipName;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Clips of one recording session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipGroup {
    pub product: String,
    pub timestamp: String,
    /// Clip path per device id
    pub clips: BTreeMap<i32, PathBuf>,
}

impl ClipGroup {
    /// True when the group's devices are exactly `expected` (order ignored).
    pub fn is_complete(&self, expected: &[i32]) -> bool {
        let mut expected: Vec<i32> = expected.to_vec();
        expected.sort_unstable();
        expected.dedup();
        !expected.is_empty() && self.clips.keys().copied().eq(expected)
    }

    pub fn device_ids(&self) -> Vec<i32> {
        self.clips.keys().copied().collect()
    }
}

/// A product directory under the clips root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDir {
    pub name: String,
    pub path: PathBuf,
}

/// Lists product directories, sorted by name
///
/// Non-directories and names that are not valid UTF-8 are skipped.
pub fn list_product_dirs(clips_dir: &Path) -> Result<Vec<ProductDir>> {
    let mut products = Vec::new();

    for entry in fs::read_dir(clips_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            products.push(ProductDir {
                name: name.to_string(),
                path: entry.path(),
            });
        }
    }

    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
}

/// Groups every recognizable clip in one product directory
///
/// Files whose names do not follow the clip pattern are ignored. Groups are
/// returned sorted by timestamp, complete or not.
pub fn scan_product_dir(product_dir: &Path) -> Result<Vec<ClipGroup>> {
    let mut groups: BTreeMap<(String, String), ClipGroup> = BTreeMap::new();

    for entry in fs::read_dir(product_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(clip) = file_name.to_str().and_then(ClipName::parse) else {
            continue;
        };

        let key = (clip.timestamp.clone(), clip.product.clone());
        groups
            .entry(key)
            .or_insert_with(|| ClipGroup {
                product: clip.product,
                timestamp: clip.timestamp,
                clips: BTreeMap::new(),
            })
            .clips
            .insert(clip.device_id, entry.path());
    }

    Ok(groups.into_values().collect())
}

/// Complete groups of one product directory
pub fn complete_groups(product_dir: &Path, expected: &[i32]) -> Result<Vec<ClipGroup>> {
    Ok(scan_product_dir(product_dir)?
        .into_iter()
        .filter(|group| group.is_complete(expected))
        .collect())
}

/// Finds the complete groups of one product directory
pub trait GroupScanner: Send + Sync {
    fn complete_groups(&self, product_dir: &Path, expected: &[i32]) -> Result<Vec<ClipGroup>>;
}

/// Scans the product directory on disk
pub struct DirScanner;

impl GroupScanner for DirScanner {
    fn complete_groups(&self, product_dir: &Path, expected: &[i32]) -> Result<Vec<ClipGroup>> {
        complete_groups(product_dir, expected)
    }
}

/// Complete groups of every product under `clips_dir`
///
/// A missing clips directory yields no groups.
pub fn find_clip_groups(clips_dir: &Path, expected: &[i32]) -> Result<Vec<ClipGroup>> {
    if !clips_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut groups = Vec::new();
    for product in list_product_dirs(clips_dir)? {
        groups.extend(complete_groups(&product.path, expected)?);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_is_complete_requires_exact_set() {
        let group = ClipGroup {
            product: "p".to_string(),
            timestamp: "20240101_000000".to_string(),
            clips: [(0, PathBuf::new()), (2, PathBuf::new())].into_iter().collect(),
        };
        assert!(group.is_complete(&[2, 0]));
        assert!(!group.is_complete(&[0]));
        assert!(!group.is_complete(&[0, 2, 4]));
        assert!(!group.is_complete(&[]));
    }

    #[test]
    fn test_scan_groups_by_timestamp() {
        let dir = tempdir().unwrap();
        for cam in [0, 2, 4, 6] {
            touch(dir.path(), &format!("clip_cam{}_soda_v1_20240105_093000.mp4", cam));
        }
        for cam in [0, 2] {
            touch(dir.path(), &format!("clip_cam{}_soda_v1_20240105_100000.mp4", cam));
        }
        touch(dir.path(), "notes.txt");
        touch(dir.path(), ".processed");

        let groups = scan_product_dir(dir.path()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].timestamp, "20240105_093000");
        assert_eq!(groups[0].device_ids(), vec![0, 2, 4, 6]);
        assert_eq!(groups[1].device_ids(), vec![0, 2]);
        assert_eq!(groups[0].product, "soda_v1");
    }

    #[test]
    fn test_find_clip_groups_discards_partial_groups() {
        let root = tempdir().unwrap();
        let soda = root.path().join("soda_v1");
        let chips = root.path().join("chips_v2");
        fs::create_dir_all(&soda).unwrap();
        fs::create_dir_all(&chips).unwrap();
        touch(root.path(), "stray.mp4");

        for cam in [0, 2, 4, 6] {
            touch(&soda, &format!("clip_cam{}_soda_v1_20240105_093000.mp4", cam));
        }
        for cam in [0, 2, 4] {
            touch(&chips, &format!("clip_cam{}_chips_v2_20240105_110000.mp4", cam));
        }
        // An extra camera also makes a group unusable.
        for cam in [0, 2, 4, 6, 8] {
            touch(&chips, &format!("clip_cam{}_chips_v2_20240105_120000.mp4", cam));
        }

        let groups = find_clip_groups(root.path(), &[0, 2, 4, 6]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].product, "soda_v1");

        let products: Vec<String> = list_product_dirs(root.path())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(products, vec!["chips_v2", "soda_v1"]);
    }

    #[test]
    fn test_missing_clips_dir_is_empty() {
        let root = tempdir().unwrap();
        assert!(find_clip_groups(&root.path().join("clips"), &[0]).unwrap().is_empty());
    }
}
