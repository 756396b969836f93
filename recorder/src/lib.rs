//! Operator application for the multi-camera recorder
//!
//! Product database and versioning, the preview grid and the control loop
//! that drives capture and recording from the keyboard.

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod product;

pub use app::{App, KeyCommand};
pub use config::{AppConfig, WindowConfig};
pub use display::{DisplayManager, GridLayout};
pub use error::{AppError, Result};
pub use product::{ProductManager, TerminalPrompt};
