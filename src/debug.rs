use log::{LevelFilter, Log, Metadata, Record};
/// Logging infrastructure for pane-mcp
///
/// Every `log::info!()` etc. is routed to a debug log file:
/// `/tmp/pane_mcp_debug.log` on Unix/macOS, `%TEMP%\pane_mcp_debug.log` on
/// Windows, unless `log_file` is configured.
///
/// stdout carries the JSON-RPC stream, so log output never goes there. When
/// `RUST_LOG` is set, records are also mirrored to stderr.
///
/// Level precedence: `--log-level`, then `RUST_LOG`, then the config file's
/// `log_level`, then `info`.
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// File name of the debug log inside the temp directory.
pub const LOG_FILE_NAME: &str = "pane_mcp_debug.log";

/// Global log bridge
struct LogBridge {
    level: LevelFilter,
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl LogBridge {
    fn new(level: LevelFilter, path: &Path, mirror_stderr: bool) -> Self {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(path)
            // A log file that can't be opened must not stop the server
            .ok();

        let bridge = LogBridge {
            level,
            file: Mutex::new(file),
            mirror_stderr,
        };
        bridge.write_raw(&format!(
            "\n{}\npane-mcp session started at {} (level={})\n{}\n",
            "=".repeat(80),
            get_timestamp(),
            level,
            "=".repeat(80)
        ));
        bridge
    }

    fn write_raw(&self, msg: &str) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            let _ = std::io::stderr().write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<LogBridge> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Default debug log location.
pub fn default_log_path() -> PathBuf {
    #[cfg(unix)]
    let log_path = PathBuf::from("/tmp").join(LOG_FILE_NAME);
    #[cfg(not(unix))]
    let log_path = std::env::temp_dir().join(LOG_FILE_NAME);
    log_path
}

/// Pick the effective level from the CLI flag, `RUST_LOG` and the config.
pub fn resolve_level(
    cli_level: Option<LevelFilter>,
    rust_log: Option<&str>,
    config_level: Option<LevelFilter>,
) -> LevelFilter {
    cli_level
        .or_else(|| rust_log.and_then(|v| LevelFilter::from_str(v.trim()).ok()))
        .or(config_level)
        .unwrap_or(LevelFilter::Info)
}

/// Install the log bridge as the global `log` backend.
///
/// Only the first call has any effect.
pub fn init_log_bridge(
    cli_level: Option<LevelFilter>,
    config_level: Option<LevelFilter>,
    log_file: Option<&Path>,
) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let level = resolve_level(cli_level, rust_log.as_deref(), config_level);
    let path = log_file.map_or_else(default_log_path, Path::to_path_buf);

    let logger = LOGGER.get_or_init(|| LogBridge::new(level, &path, rust_log.is_some()));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins() {
        let level = resolve_level(
            Some(LevelFilter::Trace),
            Some("warn"),
            Some(LevelFilter::Error),
        );
        assert_eq!(level, LevelFilter::Trace);
    }

    #[test]
    fn rust_log_beats_config() {
        let level = resolve_level(None, Some("warn"), Some(LevelFilter::Error));
        assert_eq!(level, LevelFilter::Warn);
    }

    #[test]
    fn unparseable_rust_log_falls_through() {
        let level = resolve_level(None, Some("pane_mcp=debug"), Some(LevelFilter::Error));
        assert_eq!(level, LevelFilter::Error);
        assert_eq!(resolve_level(None, None, None), LevelFilter::Info);
    }

    #[test]
    fn bridge_writes_records_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let bridge = LogBridge::new(LevelFilter::Info, &path, false);

        bridge.log(
            &Record::builder()
                .level(log::Level::Info)
                .target("pane_mcp")
                .args(format_args!("hello"))
                .build(),
        );
        bridge.log(
            &Record::builder()
                .level(log::Level::Debug)
                .target("pane_mcp")
                .args(format_args!("hidden"))
                .build(),
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("session started"));
        assert!(contents.contains("[INFO ] [pane_mcp] hello"));
        assert!(!contents.contains("hidden"));
    }
}
