//! # Config Loader
//!
//! Locates, reads and rewrites the small flat files the capture tools keep
//! on disk (application config, product database). Parsing is left to the
//! caller.
//!
//! ```no_run
//! use config_loader::{find_config_file, load_config_file};
//!
//! let path = find_config_file("multicam.json", Some("MULTICAM_CONFIG"))?;
//! let content = load_config_file(&path)?;
//! # Ok::<(), config_loader::ConfigError>(())
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads the whole file into a String.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
}

/// Looks for a configuration file in the usual places.
///
/// Search order:
/// 1. The path held by `env_var`, when given and set
/// 2. `./config/{filename}`
/// 3. `./{filename}`
pub fn find_config_file(filename: &str, env_var: Option<&str>) -> Result<PathBuf> {
    find_config_file_in(filename, env_var, Path::new("."))
}

/// Same as [`find_config_file`] but relative to `base` instead of the working directory.
pub fn find_config_file_in(filename: &str, env_var: Option<&str>, base: &Path) -> Result<PathBuf> {
    if let Some(var) = env_var
        && let Ok(path) = env::var(var)
    {
        let path_buf = PathBuf::from(&path);
        if path_buf.exists() {
            return Ok(path_buf);
        }
    }

    let candidates = [base.join("config").join(filename), base.join(filename)];
    if let Some(found) = candidates.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found (searched: {}{}, {})",
        filename,
        env_var.map(|v| format!("${} env var, ", v)).unwrap_or_default(),
        candidates[0].display(),
        candidates[1].display(),
    )))
}

/// Replaces the file content atomically: writes a sibling temp file, syncs it
/// and renames it over the target. Parent directories are created.
pub fn write_config_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let write_err = |e: std::io::Error| ConfigError::WriteError(format!("{}: {}", path.display(), e));

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::WriteError(format!("{}: not a file path", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_find_prefers_config_subdirectory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config").join("app.json"), "{}").unwrap();
        fs::write(dir.path().join("app.json"), "{}").unwrap();

        let found = find_config_file_in("app.json", None, dir.path()).unwrap();
        assert_eq!(found, dir.path().join("config").join("app.json"));
    }

    #[test]
    fn test_find_falls_back_to_base_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.json"), "{}").unwrap();

        let found = find_config_file_in("app.json", None, dir.path()).unwrap();
        assert_eq!(found, dir.path().join("app.json"));
    }

    #[test]
    fn test_find_missing_file() {
        let dir = tempdir().unwrap();
        let result = find_config_file_in("missing_12345.json", None, dir.path());
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_write_replaces_content_and_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("products.json");

        write_config_file(&path, "[\"a\"]").unwrap();
        write_config_file(&path, "[\"a\",\"b\"]").unwrap();

        assert_eq!(load_config_file(&path).unwrap(), "[\"a\",\"b\"]");
        assert!(!dir.path().join("data").join("products.json.tmp").exists());
    }
}
