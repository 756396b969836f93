//! Command-line options of `extract-frames`.

use crate::error::{ExtractError, Result};
use crate::extractor::DEFAULT_EXPECTED_DEVICES;
use crate::sync::ExtractionParams;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: extract-frames [OPTIONS]

Extracts synchronized frames from recorded clip groups.

Options:
  --clips-dir DIR    Clips directory (default: clips)
  --frames-dir DIR   Frames output directory (default: frames)
  --fps N            Frames per second to extract (default: 5)
  --max-frames N     Maximum frames per clip group
  --cameras LIST     Expected camera ids, comma separated (default: 0,2,4,6)
  --list             Only list available clips
  --force            Re-process products already marked as processed
  --log-file PATH    Also write the log to PATH
  -h, --help         Show this help";

/// Parsed options
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub clips_dir: PathBuf,
    pub frames_dir: PathBuf,
    pub fps: f64,
    pub max_frames: Option<u64>,
    pub cameras: Vec<i32>,
    pub list: bool,
    pub force: bool,
    pub log_file: Option<PathBuf>,
    pub help: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            clips_dir: PathBuf::from("clips"),
            frames_dir: PathBuf::from("frames"),
            fps: 5.0,
            max_frames: None,
            cameras: DEFAULT_EXPECTED_DEVICES.to_vec(),
            list: false,
            force: false,
            log_file: None,
            help: false,
        }
    }
}

impl CliArgs {
    /// Parses arguments, excluding the program name
    ///
    /// Both `--flag value` and `--flag=value` are accepted.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };

            let mut value = |name: &str| -> Result<String> {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| ExtractError::Config(format!("{} requires a value", name)))
            };

            match flag.as_str() {
                "--clips-dir" => parsed.clips_dir = PathBuf::from(value("--clips-dir")?),
                "--frames-dir" => parsed.frames_dir = PathBuf::from(value("--frames-dir")?),
                "--fps" => parsed.fps = parse_fps(&value("--fps")?)?,
                "--max-frames" => parsed.max_frames = Some(parse_max_frames(&value("--max-frames")?)?),
                "--cameras" => parsed.cameras = parse_cameras(&value("--cameras")?)?,
                "--log-file" => parsed.log_file = Some(PathBuf::from(value("--log-file")?)),
                "--list" => parsed.list = true,
                "--force" => parsed.force = true,
                "-h" | "--help" => parsed.help = true,
                other => {
                    return Err(ExtractError::Config(format!("Unknown argument: {}", other)));
                }
            }
        }

        Ok(parsed)
    }

    pub fn params(&self) -> Result<ExtractionParams> {
        ExtractionParams::new(self.fps, self.max_frames)
    }
}

fn parse_fps(value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(fps) if fps.is_finite() && fps > 0.0 => Ok(fps),
        _ => Err(ExtractError::Config(format!("Invalid --fps value: {}", value))),
    }
}

fn parse_max_frames(value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(max) if max > 0 => Ok(max),
        _ => Err(ExtractError::Config(format!("Invalid --max-frames value: {}", value))),
    }
}

/// `0,2,4` -> `[0, 2, 4]` (sorted, duplicates removed)
fn parse_cameras(value: &str) -> Result<Vec<i32>> {
    let mut cameras = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .ok()
                .filter(|id| *id >= 0)
                .ok_or_else(|| ExtractError::Config(format!("Invalid camera id: {}", s)))
        })
        .collect::<Result<Vec<i32>>>()?;

    if cameras.is_empty() {
        return Err(ExtractError::Config("--cameras needs at least one id".to_string()));
    }
    cameras.sort_unstable();
    cameras.dedup();
    Ok(cameras)
}
