//! Operator shell.
//!
//! Wires detection, capture, recording, the product database and the preview
//! window together and runs the single-threaded control loop: every tick
//! writes one frame per clip, redraws the grid and handles at most one key.

pub mod keys;

pub use keys::{CONTROLS, KeyCommand};

use crate::config::AppConfig;
use crate::display::{DisplayManager, Overlay};
use crate::error::{AppError, Result};
use crate::product::{ProductManager, TerminalPrompt};
use capture::{
    CameraDetector, CameraManager, CaptureTimeouts, OpenCvOpener, OpenCvWriterFactory,
    RecordingSummary, VideoRecorder,
};
use logging::Logger;
use std::sync::Arc;

pub const WINDOW_NAME: &str = "Multi-Camera Recorder";

pub struct App {
    config: AppConfig,
    detector: CameraDetector,
    cameras: CameraManager,
    recorder: VideoRecorder,
    products: ProductManager,
    display: DisplayManager,
    logger: Logger,
}

impl App {
    /// Builds every component from the configuration. Nothing is opened yet.
    pub fn new(config: AppConfig, logger: &Logger) -> Result<Self> {
        let video = config.video_config()?;
        let opener = Arc::new(OpenCvOpener);

        let detector = CameraDetector::new(opener.clone(), logger)
            .with_max_devices(config.capture.max_probe_devices)
            .with_dev_dir(&config.capture.dev_dir);
        let cameras = CameraManager::new(video.clone(), CaptureTimeouts::default(), opener, logger);
        let recorder = VideoRecorder::new(
            video,
            &config.paths.clips_dir,
            Arc::new(OpenCvWriterFactory),
            logger,
        );
        let products = ProductManager::new(&config.paths.products_file, &config.paths.clips_dir, logger);
        let display = DisplayManager::new(WINDOW_NAME, config.window, logger);

        Ok(Self {
            config,
            detector,
            cameras,
            recorder,
            products,
            display,
            logger: logger.for_component("App"),
        })
    }

    /// Prepares the clips directory, brings up the cameras and opens the window.
    pub fn startup(&mut self) -> Result<()> {
        self.products.ensure_clips_dir()?;

        let candidates = if self.config.capture.auto_detect() {
            println!("Detecting cameras...");
            let detected = self.detector.detect_available_cameras();
            for info in detected.values() {
                println!(
                    "  Camera {}: {} ({})",
                    info.device_id,
                    info.name,
                    info.resolution_string()
                );
            }
            detected.into_keys().collect()
        } else {
            self.logger.info(&format!(
                "Using configured cameras {:?}",
                self.config.capture.device_ids
            ));
            self.config.capture.device_ids.clone()
        };

        if candidates.is_empty() || !self.cameras.initialize_cameras(&candidates) {
            self.logger.error("No cameras could be initialized");
            return Err(AppError::NoCameras);
        }
        if self.cameras.start_capture_threads() == 0 {
            self.logger.error("No capture thread could be started");
            return Err(AppError::NoCameras);
        }

        self.display.open()?;
        println!(
            "{} camera(s) active: {:?}",
            self.cameras.camera_count(),
            self.cameras.active_device_ids()
        );
        println!("{}", CONTROLS);
        Ok(())
    }

    /// Runs the control loop until the operator quits or closes the window.
    /// Recording, cameras and window are always shut down afterwards.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        if let Err(e) = &result {
            self.logger.error(&format!("Main loop stopped: {}", e));
        }
        self.shutdown();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            let frames = self.cameras.latest_frames();
            self.recorder.write_snapshot(&frames);

            let overlay = Overlay {
                product: self.recorder.current_product(),
                recording: self.recorder.is_recording(),
                elapsed: self.recorder.elapsed(),
            };
            self.display.render(&frames, &overlay)?;

            if let Some(code) = self.display.poll_key()?
                && let Some(command) = KeyCommand::from_key(code)
                && !self.handle_command(command)?
            {
                return Ok(());
            }

            if !self.display.is_open() {
                self.logger.info("Window closed");
                return Ok(());
            }
        }
    }

    /// Applies one key command.
    ///
    /// # Returns
    /// `false` when the loop should end
    fn handle_command(&mut self, command: KeyCommand) -> Result<bool> {
        match command {
            KeyCommand::Quit => return Ok(false),
            KeyCommand::ToggleRecording => self.toggle_recording(),
            KeyCommand::RestartCameras => {
                self.stop_recording();
                println!("Restarting cameras...");
                if !self.cameras.restart_cameras(&self.detector) {
                    println!("Restart failed: no camera is capturing");
                }
            }
            KeyCommand::Redetect => {
                self.stop_recording();
                println!("Detecting cameras...");
                if self.cameras.force_redetect(&self.detector) {
                    println!("Active cameras: {:?}", self.cameras.active_device_ids());
                } else {
                    println!("No cameras detected");
                }
            }
            KeyCommand::ToggleFullscreen => {
                self.display.toggle_fullscreen()?;
            }
            KeyCommand::Grow => {
                self.display.resize(true)?;
            }
            KeyCommand::Shrink => {
                self.display.resize(false)?;
            }
        }
        Ok(true)
    }

    fn toggle_recording(&mut self) {
        if self.recorder.is_recording() {
            self.stop_recording();
            return;
        }

        let mut prompt = TerminalPrompt::stdio(&mut self.products);
        match self.recorder.start_recording(&self.cameras, &mut prompt) {
            Ok(true) => println!(
                "RECORDING {} - press SPACE to stop",
                self.recorder.current_product().unwrap_or_default()
            ),
            Ok(false) => println!("Recording not started"),
            Err(e) => {
                self.logger.error(&format!("Could not start recording: {}", e));
                println!("Could not start recording: {}", e);
            }
        }
    }

    fn stop_recording(&mut self) {
        if let Some(summary) = self.recorder.stop_recording() {
            print_summary(&summary);
        }
    }

    /// Stops recording, releases every camera and closes the window.
    pub fn shutdown(&mut self) {
        self.logger.info("Shutting down");
        self.stop_recording();
        self.cameras.cleanup();
        self.display.destroy();
    }
}

fn print_summary(summary: &RecordingSummary) {
    println!(
        "Recording finished: {} ({:.1}s, {} frame(s))",
        summary.product,
        summary.duration.as_secs_f64(),
        summary.frames_written()
    );
    for clip in &summary.clips {
        println!("  {} ({} frames)", clip.path.display(), clip.frames_written);
    }
}
