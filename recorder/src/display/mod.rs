//! Preview window.
//!
//! `DisplayManager` owns the HighGUI window: it tracks the size the operator
//! gives it, composes the tile grid for that size and handles fullscreen and
//! grow/shrink requests.

pub mod grid;

pub use grid::{GridLayout, Overlay, compose_grid};

use crate::config::WindowConfig;
use crate::error::Result;
use capture::VideoFrame;
use logging::Logger;
use opencv::core::Mat;
use opencv::highgui;
use std::time::{Duration, Instant};

/// The window size is queried from the window system at most this often
const SIZE_CHECK_INTERVAL: Duration = Duration::from_millis(100);

pub struct DisplayManager {
    window_name: String,
    window: WindowConfig,
    last_known_size: (i32, i32),
    last_size_check: Option<Instant>,
    fullscreen: bool,
    logger: Logger,
}

impl DisplayManager {
    pub fn new(window_name: &str, window: WindowConfig, logger: &Logger) -> Self {
        Self {
            window_name: window_name.to_string(),
            last_known_size: (window.width, window.height),
            window,
            last_size_check: None,
            fullscreen: false,
            logger: logger.for_component("DisplayManager"),
        }
    }

    /// Creates the resizable window at the configured size.
    pub fn open(&mut self) -> Result<()> {
        highgui::named_window(&self.window_name, highgui::WINDOW_NORMAL)?;
        highgui::resize_window(&self.window_name, self.window.width, self.window.height)?;
        self.logger.info(&format!(
            "Window '{}' opened at {}x{}",
            self.window_name, self.window.width, self.window.height
        ));
        Ok(())
    }

    /// Composes the grid for the current window size and shows it.
    ///
    /// # Returns
    /// `false` when there was no frame to show
    pub fn render(&mut self, frames: &[(i32, VideoFrame)], overlay: &Overlay) -> Result<bool> {
        let size = self.window_size();
        match compose_grid(frames, size, overlay)? {
            Some(grid) => {
                self.show(&grid)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn show(&self, image: &Mat) -> Result<()> {
        highgui::imshow(&self.window_name, image)?;
        Ok(())
    }

    /// Pumps window events for 1 ms; the pressed key, if any.
    pub fn poll_key(&self) -> Result<Option<i32>> {
        let key = highgui::wait_key(1)?;
        Ok((key >= 0).then_some(key))
    }

    /// False once the operator has closed the window.
    pub fn is_open(&self) -> bool {
        highgui::get_window_property(&self.window_name, highgui::WND_PROP_VISIBLE)
            .is_ok_and(|visible| visible >= 1.0)
    }

    /// Size of the image area, refreshed at most every 100 ms. Sizes outside
    /// the configured bounds are ignored.
    pub fn window_size(&mut self) -> (i32, i32) {
        let due = self
            .last_size_check
            .is_none_or(|checked| checked.elapsed() >= SIZE_CHECK_INTERVAL);
        if !due {
            return self.last_known_size;
        }
        self.last_size_check = Some(Instant::now());

        if let Ok(rect) = highgui::get_window_image_rect(&self.window_name)
            && self.window.contains(rect.width, rect.height)
        {
            self.last_known_size = (rect.width, rect.height);
        }
        self.last_known_size
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Switches between fullscreen and the configured window size.
    ///
    /// # Returns
    /// Whether the window is now fullscreen
    pub fn toggle_fullscreen(&mut self) -> Result<bool> {
        if self.fullscreen {
            highgui::set_window_property(
                &self.window_name,
                highgui::WND_PROP_FULLSCREEN,
                f64::from(highgui::WINDOW_NORMAL),
            )?;
            highgui::resize_window(&self.window_name, self.window.width, self.window.height)?;
            self.fullscreen = false;
            self.logger.info("Switched to normal window mode");
        } else {
            highgui::set_window_property(
                &self.window_name,
                highgui::WND_PROP_FULLSCREEN,
                f64::from(highgui::WINDOW_FULLSCREEN),
            )?;
            self.fullscreen = true;
            self.logger.info("Switched to fullscreen mode");
        }
        Ok(self.fullscreen)
    }

    /// Grows (x1.2) or shrinks (x0.8) the window within its bounds. Ignored
    /// in fullscreen.
    pub fn resize(&mut self, grow: bool) -> Result<(i32, i32)> {
        if self.fullscreen {
            return Ok((self.window.width, self.window.height));
        }

        let (width, height) = self.window.scaled(grow);
        self.window.width = width;
        self.window.height = height;
        highgui::resize_window(&self.window_name, width, height)?;
        self.last_known_size = (width, height);

        self.logger
            .info(&format!("Window resized to: {}x{}", width, height));
        Ok((width, height))
    }

    pub fn destroy(&self) {
        if let Err(e) = highgui::destroy_all_windows() {
            self.logger.warn(&format!("Could not destroy windows: {}", e));
        }
    }
}
