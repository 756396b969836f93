use logging::Logger;
use multicam_recorder::config::CONFIG_ENV_VAR;
use multicam_recorder::{App, AppConfig};
use std::path::Path;
use std::process;

fn main() {
    println!("Multi-Camera Recorder - Starting...");

    let config = load_config();
    let logger = initialize_logger(&config);
    logger.info("Multi-camera recorder starting...");

    let code = match run(config, &logger) {
        Ok(()) => 0,
        Err(e) => {
            logger.error(&format!("Fatal: {}", e));
            eprintln!("Error: {}", e);
            1
        }
    };

    logger.info("Multi-camera recorder stopped");
    let _ = logger.flush();
    process::exit(code);
}

fn run(config: AppConfig, logger: &Logger) -> multicam_recorder::Result<()> {
    let mut app = App::new(config, logger)?;
    if let Err(e) = app.startup() {
        app.shutdown();
        return Err(e);
    }
    app.run()
}

/// Loads the configuration file, or the defaults when there is none.
///
/// Looked up in this order:
/// 1. `MULTICAM_CONFIG` environment variable
/// 2. First command-line argument
/// 3. `./config/multicam.json`, then `./multicam.json`
fn load_config() -> AppConfig {
    let env_path = std::env::var(CONFIG_ENV_VAR).ok();
    let cli_path = std::env::args().nth(1);

    let Some(path) = AppConfig::locate(env_path.as_deref(), cli_path.as_deref(), Path::new(".")) else {
        println!("No configuration file found, using default values");
        return AppConfig::default();
    };

    match AppConfig::load_from_file(&path) {
        Ok(config) => {
            println!("Configuration loaded from: {}", path.display());
            config
        }
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", path.display(), e);
            eprintln!("Using default values...");
            AppConfig::default()
        }
    }
}

/// Initializes the main logger from configuration
fn initialize_logger(config: &AppConfig) -> Logger {
    let level = config.logging.level();
    let console = config.logging.enable_console;
    let path = &config.logging.log_file_path;

    match Logger::with_component(path, level, Some("Main"), console) {
        Ok(logger) => {
            println!("Logging initialized: {} (level: {})", path, level);
            logger
        }
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            process::exit(1);
        }
    }
}
