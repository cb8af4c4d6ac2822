//! CLI utilities for ferro-vep
//!
//! This module provides testable functions used by the CLI binary:
//! argument validation and logging setup.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::VepError;

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Name of the probe file used to test directory writability
const PROBE_FILE: &str = ".ferro-vep-write-probe";

/// Check that `path` names an existing regular file.
///
/// # Examples
///
/// ```
/// use ferro_vep::cli::validate_input_exists;
///
/// assert!(validate_input_exists("definitely/not/here.vcf").is_err());
/// ```
pub fn validate_input_exists(path: impl AsRef<Path>) -> Result<PathBuf, VepError> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(VepError::InputNotFound {
            path: path.display().to_string(),
        })
    }
}

/// Directory an output path will be written into; a bare file name means `./`.
pub fn output_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Check that the directory holding `path` exists and can be written to.
///
/// Writability is tested by creating and removing a probe file.
pub fn validate_output_writable(path: impl AsRef<Path>) -> Result<PathBuf, VepError> {
    let path = path.as_ref();
    let dir = output_directory(path);
    let unwritable = || VepError::OutputNotWritable {
        path: dir.display().to_string(),
    };

    if !dir.is_dir() {
        return Err(unwritable());
    }

    let probe = dir.join(format!("{}-{}", PROBE_FILE, std::process::id()));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
        .map_err(|_| unwritable())?;
    // Best effort; a leftover probe does not affect the run.
    let _ = fs::remove_file(&probe);

    Ok(path.to_path_buf())
}

/// Per-run log file name, `ferro-vep_<YYYY-MM-DD_HH:MM:SS>.log`
pub fn default_log_file_name() -> String {
    chrono::Local::now()
        .format("ferro-vep_%Y-%m-%d_%H:%M:%S.log")
        .to_string()
}

/// Default level for the given verbosity
pub fn log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr and, when `log_file` is given, to that file as well.
/// `RUST_LOG` overrides the level chosen by `verbose`.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), VepError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level(verbose)))
        .map_err(|e| VepError::Config {
            msg: format!("Invalid log filter: {}", e),
        })?;

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| VepError::Io {
                msg: format!("Failed to create log file {}: {}", path.display(), e),
            })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| VepError::Config {
            msg: format!("Failed to initialize logging: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.vcf");
        fs::write(&path, "##fileformat=VCFv4.2\n").unwrap();
        assert_eq!(validate_input_exists(&path).unwrap(), path);
    }

    #[test]
    fn test_input_missing() {
        let err = validate_input_exists("no/such/file.vcf").unwrap_err();
        assert_eq!(err.to_string(), "File not found: no/such/file.vcf");
    }

    #[test]
    fn test_input_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_input_exists(dir.path()),
            Err(VepError::InputNotFound { .. })
        ));
    }

    #[test]
    fn test_output_directory() {
        assert_eq!(output_directory(Path::new("output.csv")), PathBuf::from("."));
        assert_eq!(
            output_directory(Path::new("results/output.csv")),
            PathBuf::from("results")
        );
    }

    #[test]
    fn test_output_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(validate_output_writable(&path).unwrap(), path);
        // Probe cleaned up
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_output_directory_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = validate_output_writable(missing.join("out.csv")).unwrap_err();
        assert_eq!(
            err,
            VepError::OutputNotWritable {
                path: missing.display().to_string()
            }
        );
        assert!(err.to_string().contains("does not exist or is unwritable"));
    }

    #[test]
    fn test_log_file_name() {
        let name = default_log_file_name();
        assert!(name.starts_with("ferro-vep_"));
        assert!(name.ends_with(".log"));
        // ferro-vep_YYYY-MM-DD_HH:MM:SS.log
        assert_eq!(name.len(), "ferro-vep_".len() + 19 + ".log".len());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(false), "info");
        assert_eq!(log_level(true), "debug");
    }
}
