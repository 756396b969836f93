//! Tile grid composition.
//!
//! Devices are laid out in at most two rows and two columns, in ascending id
//! order. Each tile is scaled to the cell size and annotated with the camera
//! id, product and recording state.

use crate::error::Result;
use capture::VideoFrame;
use opencv::core::{Mat, Point, Scalar, Vector};
use opencv::imgproc;
use std::time::Duration;

/// Tiles shown at most; further devices are recorded but not displayed
pub const MAX_TILES: usize = 4;
/// Horizontal window margin
pub const HORIZONTAL_MARGIN: i32 = 20;
/// Vertical margin kept free for text
pub const TEXT_MARGIN: i32 = 60;
pub const MIN_CELL_WIDTH: i32 = 160;
pub const MIN_CELL_HEIGHT: i32 = 120;
/// A cell more than 20% off 4:3 in either direction is corrected back to it
const ASPECT_TOLERANCE: f64 = 1.2;

const LIVE_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const REC_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0);

/// Rows, columns and which frame goes in which cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    rows: usize,
    cols: usize,
    shown: usize,
}

impl GridLayout {
    /// 1 -> 1x1, 2 -> 1x2, 3 -> 2x2 with a blank cell, 4+ -> 2x2 of the
    /// first four. `None` for zero frames.
    pub fn for_count(count: usize) -> Option<Self> {
        let (rows, cols) = match count {
            0 => return None,
            1 => (1, 1),
            2 => (1, 2),
            _ => (2, 2),
        };
        Some(Self {
            rows,
            cols,
            shown: count.min(MAX_TILES),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of frames that get a cell
    pub fn shown(&self) -> usize {
        self.shown
    }

    /// Row-major cells: the index of the frame to draw, or `None` for blank.
    pub fn cells(&self) -> Vec<Option<usize>> {
        (0..self.rows * self.cols)
            .map(|cell| (cell < self.shown).then_some(cell))
            .collect()
    }

    /// Cell size for a window of `width`x`height`.
    pub fn cell_size(&self, width: i32, height: i32) -> (i32, i32) {
        let usable_width = (width - HORIZONTAL_MARGIN).max(0);
        let usable_height = (height - TEXT_MARGIN).max(0);

        let cell_width = (usable_width / self.cols as i32).max(MIN_CELL_WIDTH);
        let cell_height = (usable_height / self.rows as i32).max(MIN_CELL_HEIGHT);

        let aspect = 4.0 / 3.0;
        let ratio = f64::from(cell_width) / f64::from(cell_height);
        if ratio > aspect * ASPECT_TOLERANCE {
            ((f64::from(cell_height) * aspect) as i32, cell_height)
        } else if 1.0 / ratio > ASPECT_TOLERANCE / aspect {
            (cell_width, (f64::from(cell_width) / aspect) as i32)
        } else {
            (cell_width, cell_height)
        }
    }
}

/// What the tiles are annotated with
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<'a> {
    pub product: Option<&'a str>,
    pub recording: bool,
    pub elapsed: Duration,
}

/// Composes the preview image.
///
/// # Arguments
/// * `frames` - `(device_id, frame)` in display order
/// * `window` - Current window size
/// * `overlay` - Product and recording state
///
/// # Returns
/// `Ok(None)` when there is nothing to show
pub fn compose_grid(frames: &[(i32, VideoFrame)], window: (i32, i32), overlay: &Overlay) -> Result<Option<Mat>> {
    let Some(layout) = GridLayout::for_count(frames.len()) else {
        return Ok(None);
    };
    let (cell_width, cell_height) = layout.cell_size(window.0, window.1);

    let mut tiles = Vec::with_capacity(layout.rows * layout.cols);
    for cell in layout.cells() {
        let tile = match cell {
            Some(index) => {
                let (device_id, frame) = &frames[index];
                annotated_tile(*device_id, frame, cell_width, cell_height, overlay)?
            }
            None => VideoFrame::filled(cell_width, cell_height, (0, 0, 0))?.into_mat(),
        };
        tiles.push(tile);
    }

    if tiles.len() == 1 {
        return Ok(tiles.pop());
    }

    let mut rows = Vector::<Mat>::new();
    for row in tiles.chunks(layout.cols) {
        let mut joined = Mat::default();
        opencv::core::hconcat(&row.iter().cloned().collect::<Vector<Mat>>(), &mut joined)?;
        rows.push(joined);
    }

    if rows.len() == 1 {
        return Ok(Some(rows.get(0)?));
    }
    let mut grid = Mat::default();
    opencv::core::vconcat(&rows, &mut grid)?;
    Ok(Some(grid))
}

fn annotated_tile(device_id: i32, frame: &VideoFrame, width: i32, height: i32, overlay: &Overlay) -> Result<Mat> {
    let mut tile = frame.resized(width, height)?.into_mat();

    let font_scale = (f64::from(width + height) / 800.0).clamp(0.4, 1.5);
    let thickness = ((2.0 * font_scale) as i32).max(1);
    let line = ((25.0 * font_scale) as i32).max(20);
    let (b, g, r) = if overlay.recording { REC_COLOR } else { LIVE_COLOR };
    let color = Scalar::new(b, g, r, 0.0);

    let mut lines = vec![match overlay.product {
        Some(product) => format!("Cam {} - {}", device_id, product),
        None => format!("Cam {}", device_id),
    }];
    lines.push(if overlay.recording { "REC" } else { "LIVE" }.to_string());
    if overlay.recording {
        lines.push(format!("{:.1}s", overlay.elapsed.as_secs_f64()));
    }

    for (i, text) in lines.iter().enumerate() {
        imgproc::put_text(
            &mut tile,
            text,
            Point::new(10, line * (i as i32 + 1)),
            imgproc::FONT_HERSHEY_SIMPLEX,
            font_scale,
            color,
            thickness,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Vec3b;
    use opencv::prelude::*;

    #[test]
    fn test_layout_for_each_count() {
        assert_eq!(GridLayout::for_count(0), None);

        for count in 1..=4 {
            let layout = GridLayout::for_count(count).unwrap();
            let shown: Vec<usize> = layout.cells().into_iter().flatten().collect();
            assert_eq!(shown, (0..count).collect::<Vec<_>>(), "count {}", count);
            assert_eq!(layout.cells().len(), layout.rows() * layout.cols());
        }

        let three = GridLayout::for_count(3).unwrap();
        assert_eq!((three.rows(), three.cols()), (2, 2));
        assert_eq!(three.cells()[3], None);
        assert_eq!(GridLayout::for_count(2).map(|l| (l.rows(), l.cols())), Some((1, 2)));
    }

    #[test]
    fn test_more_than_four_shows_first_four() {
        let layout = GridLayout::for_count(6).unwrap();
        assert_eq!(layout.shown(), 4);
        assert_eq!(layout.cells(), vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_cell_size() {
        let single = GridLayout::for_count(1).unwrap();
        assert_eq!(single.cell_size(800, 600), (780, 540));
        // Too wide: width follows height at 4:3
        assert_eq!(single.cell_size(1920, 400), (453, 340));

        let quad = GridLayout::for_count(4).unwrap();
        assert_eq!(quad.cell_size(800, 600), (390, 270));
        // Never below the minimum cell
        assert_eq!(quad.cell_size(100, 100), (160, 120));
    }

    #[test]
    fn test_compose_three_frames_leaves_black_cell() {
        let frames: Vec<(i32, VideoFrame)> = [(0, (255, 0, 0)), (2, (0, 255, 0)), (4, (0, 0, 255))]
            .into_iter()
            .map(|(id, color)| (id, VideoFrame::filled(64, 48, color).unwrap()))
            .collect();

        let grid = compose_grid(&frames, (800, 600), &Overlay::default())
            .unwrap()
            .unwrap();
        let (w, h) = GridLayout::for_count(3).unwrap().cell_size(800, 600);
        assert_eq!((grid.cols(), grid.rows()), (2 * w, 2 * h));

        // Bottom-right pixel of each cell, away from the text
        let pixel = |row: i32, col: i32| grid.at_2d::<Vec3b>(row, col).unwrap().0;
        assert_eq!(pixel(h - 1, w - 1), [255, 0, 0]);
        assert_eq!(pixel(h - 1, 2 * w - 1), [0, 255, 0]);
        assert_eq!(pixel(2 * h - 1, w - 1), [0, 0, 255]);
        assert_eq!(pixel(2 * h - 1, 2 * w - 1), [0, 0, 0]);
    }

    #[test]
    fn test_compose_single_and_pair() {
        let frame = VideoFrame::filled(64, 48, (9, 9, 9)).unwrap();
        let overlay = Overlay {
            product: Some("widget_v1"),
            recording: true,
            elapsed: Duration::from_millis(2500),
        };

        let single = compose_grid(&[(0, frame.clone())], (800, 600), &overlay)
            .unwrap()
            .unwrap();
        assert_eq!((single.cols(), single.rows()), (780, 540));

        let pair = compose_grid(&[(0, frame.clone()), (2, frame)], (800, 600), &overlay)
            .unwrap()
            .unwrap();
        let (w, h) = GridLayout::for_count(2).unwrap().cell_size(800, 600);
        assert_eq!((pair.cols(), pair.rows()), (2 * w, h));
    }

    #[test]
    fn test_compose_nothing() {
        assert!(compose_grid(&[], (800, 600), &Overlay::default()).unwrap().is_none());
    }
}
