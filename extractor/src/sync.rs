//! Synchronized extraction from one clip group.
//!
//! Clips of a session were fed from the same recorder ticks, so frame `i`
//! of one clip was written in the same tick as frame `i` of every other.
//! Extraction seeks every clip to the same index and emits a bundle only
//! when every clip produced a frame there. The shortest clip bounds the
//! sequence; the first failed read ends it.

use crate::error::{ExtractError, Result};
use crate::groups::ClipGroup;
use crate::sink::FrameStore;
use crate::source::{ClipOpener, ClipReader};
use capture::clip::{camera_dir_name, frame_file_name};
use logging::Logger;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Maximum fps spread between clips before a warning is logged
pub const FPS_MISMATCH_TOLERANCE: f64 = 0.5;

/// Extraction settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionParams {
    /// Target frames per second of extracted sequences
    pub extract_fps: f64,
    /// Stop after this many bundles per group
    pub max_frames: Option<u64>,
}

impl ExtractionParams {
    pub fn new(extract_fps: f64, max_frames: Option<u64>) -> Result<Self> {
        if !extract_fps.is_finite() || extract_fps <= 0.0 {
            return Err(ExtractError::Config(format!(
                "Extraction fps must be positive, got {}",
                extract_fps
            )));
        }
        if max_frames == Some(0) {
            return Err(ExtractError::Config("Max frames must be at least 1".to_string()));
        }
        Ok(Self {
            extract_fps,
            max_frames,
        })
    }
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            extract_fps: 5.0,
            max_frames: None,
        }
    }
}

/// Result of one extracted group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupExtraction {
    pub product: String,
    pub timestamp: String,
    /// Bundles written (one image per device each)
    pub bundles: u64,
    pub frame_interval: u64,
    pub min_frames: u64,
    pub output_dir: PathBuf,
}

/// Source frames skipped between two extracted frames
///
/// `max(1, round(source_fps / extract_fps))`; unusable metadata
/// (non-positive or non-finite rates) falls back to 1.
pub fn frame_interval(source_fps: f64, extract_fps: f64) -> u64 {
    if !source_fps.is_finite() || source_fps <= 0.0 || !extract_fps.is_finite() || extract_fps <= 0.0 {
        return 1;
    }
    ((source_fps / extract_fps).round() as u64).max(1)
}

/// Extracts index-aligned frame bundles from one complete group
///
/// # Arguments
/// * `group` - Clips of one session
/// * `opener` - Opens each clip
/// * `store` - Receives one image per device per bundle
/// * `frames_dir` - Output root; frames go to `<frames_dir>/<product>/cam<id>/`
/// * `params` - Target fps and optional bundle cap
/// * `logger` - Progress logging
///
/// # Returns
/// * `Ok(GroupExtraction)` - Extraction ran (possibly stopping early at a failed read)
/// * `Err` - A clip could not be opened, the group holds no frames, or a frame could not be saved
///
/// Every clip reader is released before returning.
pub fn extract_frames_from_group(
    group: &ClipGroup,
    opener: &dyn ClipOpener,
    store: &dyn FrameStore,
    frames_dir: &Path,
    params: &ExtractionParams,
    logger: &Logger,
) -> Result<GroupExtraction> {
    logger.info(&format!("Processing: {} - {}", group.product, group.timestamp));

    if group.clips.is_empty() {
        return Err(ExtractError::Group(format!(
            "Group {} - {} has no clips",
            group.product, group.timestamp
        )));
    }

    let mut readers: BTreeMap<i32, Box<dyn ClipReader>> = BTreeMap::new();
    for (&device_id, path) in &group.clips {
        let reader = opener.open(path).map_err(|e| {
            ExtractError::Clip(format!("Could not open {}: {}", path.display(), e))
        })?;
        logger.info(&format!(
            "Cam {}: {} frames @ {:.1} FPS",
            device_id,
            reader.frame_count(),
            reader.fps()
        ));
        readers.insert(device_id, reader);
    }

    let min_frames = readers
        .values()
        .map(|reader| reader.frame_count())
        .min()
        .unwrap_or(0);
    if min_frames == 0 {
        return Err(ExtractError::Group(format!(
            "No frames to extract in {} - {}",
            group.product, group.timestamp
        )));
    }

    // The lowest device id is the fps reference.
    let reference_fps = readers.values().next().map(|r| r.fps()).unwrap_or(0.0);
    warn_on_fps_mismatch(&readers, reference_fps, logger);

    let interval = frame_interval(reference_fps, params.extract_fps);
    logger.info(&format!(
        "Extracting every {} frame(s) ({} FPS effective), up to {} source frames",
        interval, params.extract_fps, min_frames
    ));

    let output_dir = frames_dir.join(&group.product);
    let mut camera_dirs = BTreeMap::new();
    for &device_id in readers.keys() {
        let dir = output_dir.join(camera_dir_name(device_id));
        store.prepare_dir(&dir)?;
        camera_dirs.insert(device_id, dir);
    }

    let mut bundles: u64 = 0;
    let mut frame_index: u64 = 0;

    loop {
        let Some(bundle) = read_bundle(&mut readers, frame_index, logger) else {
            break;
        };

        for (device_id, frame) in &bundle {
            let file_name = frame_file_name(&group.timestamp, bundles as usize);
            store.save(&camera_dirs[device_id].join(file_name), frame)?;
        }

        bundles += 1;
        frame_index += interval;

        if params.max_frames.is_some_and(|max| bundles >= max) || frame_index >= min_frames {
            break;
        }
    }

    drop(readers);

    logger.info(&format!(
        "Extracted {} synchronized frame(s) into {}",
        bundles,
        output_dir.display()
    ));

    Ok(GroupExtraction {
        product: group.product.clone(),
        timestamp: group.timestamp.clone(),
        bundles,
        frame_interval: interval,
        min_frames,
        output_dir,
    })
}

/// Reads one frame per device at `index`; `None` if any device fails.
fn read_bundle(
    readers: &mut BTreeMap<i32, Box<dyn ClipReader>>,
    index: u64,
    logger: &Logger,
) -> Option<Vec<(i32, capture::VideoFrame)>> {
    let mut bundle = Vec::with_capacity(readers.len());

    for (&device_id, reader) in readers.iter_mut() {
        match reader.read_at(index) {
            Ok(Some(frame)) => bundle.push((device_id, frame)),
            Ok(None) => {
                logger.warn(&format!(
                    "Cam {} has no frame at index {}, stopping group",
                    device_id, index
                ));
                return None;
            }
            Err(e) => {
                logger.warn(&format!(
                    "Cam {} failed at index {}: {}, stopping group",
                    device_id, index, e
                ));
                return None;
            }
        }
    }

    Some(bundle)
}

fn warn_on_fps_mismatch(
    readers: &BTreeMap<i32, Box<dyn ClipReader>>,
    reference_fps: f64,
    logger: &Logger,
) {
    for (device_id, reader) in readers {
        if (reader.fps() - reference_fps).abs() > FPS_MISMATCH_TOLERANCE {
            logger.warn(&format!(
                "Cam {} reports {:.2} FPS but the reference clip reports {:.2}; alignment may drift",
                device_id,
                reader.fps(),
                reference_fps
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval(30.0, 5.0), 6);
        assert_eq!(frame_interval(60.0, 5.0), 12);
        assert_eq!(frame_interval(29.97, 5.0), 6);
        assert_eq!(frame_interval(4.0, 5.0), 1);
        assert_eq!(frame_interval(5.0, 5.0), 1);
    }

    #[test]
    fn test_frame_interval_falls_back_on_bad_metadata() {
        assert_eq!(frame_interval(0.0, 5.0), 1);
        assert_eq!(frame_interval(-1.0, 5.0), 1);
        assert_eq!(frame_interval(f64::NAN, 5.0), 1);
        assert_eq!(frame_interval(30.0, 0.0), 1);
    }

    #[test]
    fn test_params_validation() {
        assert!(ExtractionParams::new(5.0, None).is_ok());
        assert!(ExtractionParams::new(0.0, None).is_err());
        assert!(ExtractionParams::new(5.0, Some(0)).is_err());
        assert_eq!(ExtractionParams::default().extract_fps, 5.0);
    }
}
