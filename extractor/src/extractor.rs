//! Product-level extraction driver.

use crate::error::Result;
use crate::groups::{ClipGroup, DirScanner, GroupScanner, list_product_dirs};
use crate::marker::{is_processed, mark_processed};
use crate::sink::{FrameStore, JpegFrameStore};
use crate::source::{ClipOpener, OpenCvClipOpener};
use crate::sync::{ExtractionParams, extract_frames_from_group};
use logging::Logger;
use std::path::{Path, PathBuf};

/// Cameras a complete group must contain by default
pub const DEFAULT_EXPECTED_DEVICES: [i32; 4] = [0, 2, 4, 6];

/// Outcome of `extract_all_clips`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Product directories found under the clips root
    pub products_found: usize,
    /// Products skipped because they were already marked
    pub skipped: Vec<String>,
    /// Products scanned that held no complete group
    pub without_groups: Vec<String>,
    /// Products whose directory could not be scanned
    pub products_failed: Vec<String>,
    pub groups_extracted: usize,
    pub groups_failed: usize,
    pub bundles_extracted: u64,
    /// Products marked processed by this run
    pub products_marked: Vec<String>,
}

/// Readability of one listed clip
#[derive(Debug, Clone, PartialEq)]
pub enum ClipStatus {
    Readable {
        frame_count: u64,
        fps: f64,
        /// `frame_count / fps`, zero when fps is unusable
        duration_secs: f64,
    },
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipListing {
    pub device_id: i32,
    pub path: PathBuf,
    pub status: ClipStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupListing {
    pub timestamp: String,
    pub clips: Vec<ClipListing>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub product: String,
    pub processed: bool,
    pub groups: Vec<GroupListing>,
}

/// Extracts synchronized frames from every product under a clips root
pub struct FrameExtractor {
    clips_dir: PathBuf,
    frames_dir: PathBuf,
    expected_devices: Vec<i32>,
    opener: Box<dyn ClipOpener>,
    store: Box<dyn FrameStore>,
    scanner: Box<dyn GroupScanner>,
    logger: Logger,
}

impl FrameExtractor {
    /// Creates an extractor reading clips with OpenCV and writing JPEG files
    ///
    /// # Arguments
    /// * `clips_dir` - Root holding one directory per product
    /// * `frames_dir` - Output root
    /// * `logger` - Parent logger; a `FrameExtractor` component is derived from it
    pub fn new(clips_dir: impl Into<PathBuf>, frames_dir: impl Into<PathBuf>, logger: &Logger) -> Self {
        Self {
            clips_dir: clips_dir.into(),
            frames_dir: frames_dir.into(),
            expected_devices: DEFAULT_EXPECTED_DEVICES.to_vec(),
            opener: Box::new(OpenCvClipOpener),
            store: Box::new(JpegFrameStore),
            scanner: Box::new(DirScanner),
            logger: logger.for_component("FrameExtractor"),
        }
    }

    pub fn with_expected_devices(mut self, devices: &[i32]) -> Self {
        let mut devices = devices.to_vec();
        devices.sort_unstable();
        devices.dedup();
        self.expected_devices = devices;
        self
    }

    pub fn with_clip_opener(mut self, opener: Box<dyn ClipOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_frame_store(mut self, store: Box<dyn FrameStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_group_scanner(mut self, scanner: Box<dyn GroupScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    pub fn expected_devices(&self) -> &[i32] {
        &self.expected_devices
    }

    /// Complete groups of every product, processed or not
    pub fn find_clip_groups(&self) -> Result<Vec<ClipGroup>> {
        crate::groups::find_clip_groups(&self.clips_dir, &self.expected_devices)
    }

    /// Extracts every pending product
    ///
    /// A product is skipped without reading its directory when it carries
    /// the processed marker, unless `force` is set. It is marked only when
    /// it had at least one complete group and every one of them succeeded.
    ///
    /// # Arguments
    /// * `params` - Target fps and optional bundle cap per group
    /// * `force` - Re-extract products that are already marked
    pub fn extract_all_clips(&self, params: &ExtractionParams, force: bool) -> Result<ExtractionReport> {
        let mut report = ExtractionReport::default();

        if !self.clips_dir.is_dir() {
            self.logger.warn(&format!(
                "Clips directory does not exist: {}",
                self.clips_dir.display()
            ));
            return Ok(report);
        }

        let products = list_product_dirs(&self.clips_dir)?;
        report.products_found = products.len();
        self.logger.info(&format!(
            "Found {} product(s) in {} (fps: {}, max frames: {})",
            products.len(),
            self.clips_dir.display(),
            params.extract_fps,
            params
                .max_frames
                .map_or_else(|| "unlimited".to_string(), |m| m.to_string())
        ));

        for product in products {
            if !force && is_processed(&product.path) {
                self.logger
                    .info(&format!("Skipping {} (already processed)", product.name));
                report.skipped.push(product.name);
                continue;
            }

            let groups = match self
                .scanner
                .complete_groups(&product.path, &self.expected_devices)
            {
                Ok(groups) => groups,
                Err(e) => {
                    self.logger
                        .error(&format!("Could not scan product {}: {}", product.name, e));
                    report.products_failed.push(product.name);
                    continue;
                }
            };
            if groups.is_empty() {
                self.logger.warn(&format!(
                    "{}: no complete clip groups for cameras {:?}",
                    product.name, self.expected_devices
                ));
                report.without_groups.push(product.name);
                continue;
            }

            self.logger.info(&format!(
                "Processing product {} ({} group(s))",
                product.name,
                groups.len()
            ));

            let mut succeeded = 0;
            for group in &groups {
                match extract_frames_from_group(
                    group,
                    self.opener.as_ref(),
                    self.store.as_ref(),
                    &self.frames_dir,
                    params,
                    &self.logger,
                ) {
                    Ok(extraction) => {
                        succeeded += 1;
                        report.bundles_extracted += extraction.bundles;
                    }
                    Err(e) => {
                        report.groups_failed += 1;
                        self.logger.error(&format!(
                            "Failed to extract {} - {}: {}",
                            group.product, group.timestamp, e
                        ));
                    }
                }
            }
            report.groups_extracted += succeeded;

            if succeeded == groups.len() {
                match mark_processed(&product.path) {
                    Ok(()) => {
                        self.logger
                            .info(&format!("Product {} marked as processed", product.name));
                        report.products_marked.push(product.name);
                    }
                    Err(e) => self.logger.warn(&format!(
                        "Product {} extracted but could not be marked: {}",
                        product.name, e
                    )),
                }
            }
        }

        self.logger.info(&format!(
            "Summary: {} group(s) extracted, {} failed, {} product(s) unreadable, {} product(s) marked, {} skipped",
            report.groups_extracted,
            report.groups_failed,
            report.products_failed.len(),
            report.products_marked.len(),
            report.skipped.len()
        ));

        Ok(report)
    }

    /// Describes every complete group with per-clip frame count, fps and duration
    pub fn list_available_clips(&self) -> Result<Vec<ProductListing>> {
        if !self.clips_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut listings = Vec::new();
        for product in list_product_dirs(&self.clips_dir)? {
            let groups: Vec<GroupListing> = match self
                .scanner
                .complete_groups(&product.path, &self.expected_devices)
            {
                Ok(groups) => groups.iter().map(|group| self.describe_group(group)).collect(),
                Err(e) => {
                    self.logger
                        .warn(&format!("Could not scan product {}: {}", product.name, e));
                    continue;
                }
            };

            if groups.is_empty() {
                continue;
            }

            listings.push(ProductListing {
                processed: is_processed(&product.path),
                product: product.name,
                groups,
            });
        }

        Ok(listings)
    }

    fn describe_group(&self, group: &ClipGroup) -> GroupListing {
        let clips = group
            .clips
            .iter()
            .map(|(&device_id, path)| {
                let status = match self.opener.open(path) {
                    Ok(reader) => {
                        let frame_count = reader.frame_count();
                        let fps = reader.fps();
                        let duration_secs = if fps > 0.0 { frame_count as f64 / fps } else { 0.0 };
                        ClipStatus::Readable {
                            frame_count,
                            fps,
                            duration_secs,
                        }
                    }
                    Err(e) => ClipStatus::Unreadable(e.to_string()),
                };
                ClipListing {
                    device_id,
                    path: path.clone(),
                    status,
                }
            })
            .collect();

        GroupListing {
            timestamp: group.timestamp.clone(),
            clips,
        }
    }
}
