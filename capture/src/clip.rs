//! On-disk naming of clips and extracted frames.
//!
//! `clips/<product>/clip_cam<device>_<product>_<YYYYMMDD_HHMMSS>.mp4` is the
//! only link between a recording session and the extractor, so formatting
//! and parsing live side by side here.

use chrono::{DateTime, TimeZone};
use std::fmt;

pub const CLIP_PREFIX: &str = "clip_cam";
pub const CLIP_EXTENSION: &str = ".mp4";
/// chrono format of the session timestamp
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Parsed identity of a clip file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipName {
    pub device_id: i32,
    pub product: String,
    pub timestamp: String,
}

impl ClipName {
    pub fn new(device_id: i32, product: &str, timestamp: &str) -> Self {
        Self {
            device_id,
            product: product.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    /// `clip_cam<device>_<product>_<timestamp>.mp4`
    pub fn file_name(&self) -> String {
        format!(
            "{}{}_{}_{}{}",
            CLIP_PREFIX, self.device_id, self.product, self.timestamp, CLIP_EXTENSION
        )
    }

    /// Parses a clip file name. The product may itself contain underscores;
    /// the timestamp is always the trailing `YYYYMMDD_HHMMSS`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let rest = file_name
            .strip_prefix(CLIP_PREFIX)?
            .strip_suffix(CLIP_EXTENSION)?;

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let device_id = rest[..digits].parse().ok()?;
        let rest = rest[digits..].strip_prefix('_')?;

        let (head, time) = rest.rsplit_once('_')?;
        let (product, date) = head.rsplit_once('_')?;
        let timestamp = format!("{}_{}", date, time);
        if product.is_empty() || !is_session_timestamp(&timestamp) {
            return None;
        }

        Some(Self {
            device_id,
            product: product.to_string(),
            timestamp,
        })
    }
}

impl fmt::Display for ClipName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Formats a session timestamp (`YYYYMMDD_HHMMSS`).
pub fn session_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format(SESSION_TIMESTAMP_FORMAT).to_string()
}

/// True for exactly eight digits, an underscore and six digits.
pub fn is_session_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 15
        && bytes[8] == b'_'
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[9..].iter().all(u8::is_ascii_digit)
}

/// `<timestamp>_frame_<NNNN>.jpg`
pub fn frame_file_name(timestamp: &str, index: usize) -> String {
    format!("{}_frame_{:04}.jpg", timestamp, index)
}

/// Per-camera subdirectory name inside a product's frame directory
pub fn camera_dir_name(device_id: i32) -> String {
    format!("cam{}", device_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};

    #[test]
    fn test_file_name_format() {
        let clip = ClipName::new(2, "widget_v3", "20240105_093000");
        assert_eq!(clip.file_name(), "clip_cam2_widget_v3_20240105_093000.mp4");
    }

    #[test]
    fn test_parse_product_with_underscores() {
        let clip = ClipName::parse("clip_cam6_cold_brew_can_v12_20231231_235959.mp4").unwrap();
        assert_eq!(clip.device_id, 6);
        assert_eq!(clip.product, "cold_brew_can_v12");
        assert_eq!(clip.timestamp, "20231231_235959");
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(ClipName::parse("clip_cam_widget_20240105_093000.mp4").is_none());
        assert!(ClipName::parse("clip_camX_widget_20240105_093000.mp4").is_none());
        assert!(ClipName::parse("clip_cam0_20240105_093000.mp4").is_none());
        assert!(ClipName::parse("clip_cam0_widget_2024010_093000.mp4").is_none());
        assert!(ClipName::parse("clip_cam0_widget_20240105_093000.avi").is_none());
        assert!(ClipName::parse("clip_cam0_widget_20240105_093000.mp4.bak").is_none());
        assert!(ClipName::parse("notes.txt").is_none());
    }

    #[test]
    fn test_parse_accepts_what_file_name_writes() {
        let clip = ClipName::new(10, "té_v1", "20240105_093000");
        assert_eq!(ClipName::parse(&clip.file_name()), Some(clip));
    }

    #[test]
    fn test_session_timestamp_format() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(8, 5, 9)
            .unwrap()
            .and_utc();
        assert_eq!(session_timestamp(&at), "20240307_080509");
        assert!(is_session_timestamp(&session_timestamp(&Local::now())));
    }

    #[test]
    fn test_frame_file_name_is_zero_padded() {
        assert_eq!(frame_file_name("20240105_093000", 7), "20240105_093000_frame_0007.jpg");
        assert_eq!(frame_file_name("20240105_093000", 12345), "20240105_093000_frame_12345.jpg");
        assert_eq!(camera_dir_name(4), "cam4");
    }
}
