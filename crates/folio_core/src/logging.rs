//! Process logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process, writing either to
//!   size-rotated files or to stderr.
//! - Route panics through the logger as a single sanitized line.
//!
//! # Invariants
//! - A second `init_logging` with identical settings is a no-op.
//! - A second `init_logging` with different settings is rejected.
//! - Credentials and request bodies never reach the log.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "folio";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Absolute directory holding `folio*.log` files.
    Directory(PathBuf),
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => write!(f, "stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub target: LogTarget,
}

impl LogSettings {
    /// Parses a level name (`warning` is accepted for `warn`) and an
    /// optional absolute log directory.
    pub fn parse(level: &str, log_dir: Option<&str>) -> Result<Self, LoggingError> {
        let name = level.trim().to_ascii_lowercase();
        let name = if name == "warning" { "warn" } else { name.as_str() };
        let level = LevelFilter::from_str(name)
            .map_err(|_| LoggingError::InvalidLevel(level.trim().to_string()))?;

        let target = match log_dir.map(str::trim) {
            None => LogTarget::Stderr,
            Some("") => return Err(LoggingError::InvalidDirectory(String::new())),
            Some(dir) if !Path::new(dir).is_absolute() => {
                return Err(LoggingError::InvalidDirectory(dir.to_string()))
            }
            Some(dir) => LogTarget::Directory(PathBuf::from(dir)),
        };

        Ok(Self { level, target })
    }
}

#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    InvalidDirectory(String),
    AlreadyInitialized {
        active: LogSettings,
        requested: LogSettings,
    },
    Io(std::io::Error),
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::InvalidDirectory(dir) => {
                write!(f, "log directory must be a non-empty absolute path, got `{dir}`")
            }
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logging already active at {} -> {}; cannot switch to {} -> {}",
                active.level, active.target, requested.level, requested.target
            ),
            Self::Io(err) => write!(f, "cannot prepare log directory: {err}"),
            Self::Backend(message) => write!(f, "cannot start logger: {message}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts process logging.
///
/// `log_dir = None` logs to stderr. A directory gets rotated files plus
/// warnings mirrored to stderr.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), LoggingError> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start_logger(requested.clone()))?;

    if active.settings != requested {
        return Err(LoggingError::AlreadyInitialized {
            active: active.settings.clone(),
            requested,
        });
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: LogSettings) -> Result<ActiveLogger, LoggingError> {
    let spec = settings.level.as_str().to_ascii_lowercase();
    let logger = Logger::try_with_str(&spec).map_err(|err| LoggingError::Backend(err.to_string()))?;

    let logger = match &settings.target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(LoggingError::Io)?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_LOG_FILES),
                )
                .append()
                .write_mode(WriteMode::BufferAndFlush)
                .duplicate_to_stderr(Duplicate::Warn)
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    let handle = logger
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;
    route_panics_to_log();

    info!(
        "event=logging_init module=logging status=ok level={} target={} os={} version={}",
        settings.level,
        settings.target,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn route_panics_to_log() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let location = panic
            .location()
            .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
        let payload = panic
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| panic.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=logging status=error location={} payload={}",
            location,
            single_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(panic);
    }));
}

/// Joins lines and caps `value` at `limit` characters.
fn single_line(value: &str, limit: usize) -> String {
    let flat: String = value
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut capped: String = flat.chars().take(limit).collect();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, single_line, LogSettings, LogTarget, LoggingError};
    use log::LevelFilter;

    #[test]
    fn settings_parse_levels_and_targets() {
        let settings = LogSettings::parse(" Warning ", None).expect("valid settings");
        assert_eq!(settings.level, LevelFilter::Warn);
        assert_eq!(settings.target, LogTarget::Stderr);

        assert!(matches!(
            LogSettings::parse("verbose", None),
            Err(LoggingError::InvalidLevel(_))
        ));
        assert!(matches!(
            LogSettings::parse("info", Some("logs/dev")),
            Err(LoggingError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn single_line_flattens_and_caps() {
        assert_eq!(single_line("a\nb", 10), "a b");
        assert_eq!(single_line("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn init_is_idempotent_and_rejects_switching() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dir_str = dir.path().to_str().expect("utf-8 temp dir").to_string();

        init_logging("info", Some(&dir_str)).expect("first init");
        init_logging("INFO", Some(&dir_str)).expect("same settings are accepted");

        assert!(matches!(
            init_logging("debug", Some(&dir_str)),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert!(matches!(
            init_logging("info", None),
            Err(LoggingError::AlreadyInitialized { .. })
        ));

        let active = logging_status().expect("logger is running");
        assert_eq!(active.level, LevelFilter::Info);
        assert_eq!(active.target, LogTarget::Directory(dir.path().to_path_buf()));
    }
}
