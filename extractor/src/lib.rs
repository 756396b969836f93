//! Offline synchronized frame extraction
//!
//! Discovers complete clip groups, re-aligns the independently encoded
//! clips of each group by frame index and writes per-camera image
//! sequences. Products are marked once fully extracted so re-runs skip them.

pub mod cli;
pub mod error;
pub mod extractor;
pub mod groups;
pub mod marker;
pub mod sink;
pub mod source;
pub mod sync;

pub use error::{ExtractError, Result};
pub use extractor::{
    ClipListing, ClipStatus, DEFAULT_EXPECTED_DEVICES, ExtractionReport, FrameExtractor,
    GroupListing, ProductListing,
};
pub use groups::{ClipGroup, DirScanner, GroupScanner, find_clip_groups};
pub use sink::{FrameStore, JpegFrameStore};
pub use source::{ClipOpener, ClipReader, OpenCvClipOpener};
pub use sync::{ExtractionParams, GroupExtraction, extract_frames_from_group, frame_interval};
