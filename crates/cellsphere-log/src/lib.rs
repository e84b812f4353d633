//! Logging setup for the cell sphere binaries.
//!
//! Libraries in the workspace log through the `log` facade; this crate
//! installs a `tracing-subscriber` registry that receives those records
//! (via the `tracing-log` bridge) alongside native `tracing` events.
//! Console output is always on; debug builds also write JSON lines to
//! `cellsphere.log` for later inspection.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use cellsphere_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "cellsphere.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.debug.log_level`, which wins over
/// [`DEFAULT_FILTER`]. When `debug_build` is set and `log_dir` can be
/// created, a JSON file layer is added and the file path is returned.
///
/// Only the first call installs anything. Later calls return `None` without
/// touching the log file the first subscriber is writing to.
///
/// ```no_run
/// use cellsphere_config::Config;
/// use cellsphere_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && let Some((path, file)) = create_log_file(log_dir)
    {
        let truncate_handle = file.try_clone().ok();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();
        if subscriber.with(file_layer).try_init().is_err() {
            return None;
        }
        // Start each run with an empty file, now that this subscriber owns it.
        if let Some(handle) = truncate_handle {
            let _ = handle.set_len(0);
        }
        return Some(path);
    }

    let _ = subscriber.try_init();
    None
}

/// The default filter as an [`EnvFilter`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Filter directives for `config`.
///
/// A bare level such as `"debug"` keeps the `wgpu`/`naga` noise caps; a
/// level that already carries per-target directives is used verbatim.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config.map(|c| c.debug.log_level.trim()).unwrap_or_default();
    if level.is_empty() {
        DEFAULT_FILTER.to_string()
    } else if level.contains('=') {
        level.to_string()
    } else {
        format!("{level},wgpu=warn,naga=warn")
    }
}

/// Opened for append so a call that loses the install race leaves the
/// active log intact.
fn create_log_file(log_dir: &Path) -> Option<(PathBuf, File)> {
    std::fs::create_dir_all(log_dir).ok()?;
    let path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((path, file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_level(level: &str) -> Config {
        let mut config = Config::default();
        config.debug.log_level = level.to_string();
        config
    }

    #[test]
    fn test_default_filter_caps_gpu_crates() {
        let filter_str = default_env_filter().to_string();
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_no_config_uses_default() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some(&config_with_level("  "))), DEFAULT_FILTER);
    }

    #[test]
    fn test_bare_level_keeps_gpu_caps() {
        assert_eq!(
            filter_directives(Some(&config_with_level("debug"))),
            "debug,wgpu=warn,naga=warn"
        );
    }

    #[test]
    fn test_directive_level_used_verbatim() {
        let level = "warn,cellsphere_render=trace";
        assert_eq!(filter_directives(Some(&config_with_level(level))), level);
    }

    #[test]
    fn test_directives_parse() {
        for level in ["error", "trace", "info,cellsphere_mesh=debug"] {
            let directives = filter_directives(Some(&config_with_level(level)));
            assert!(EnvFilter::try_new(&directives).is_ok(), "{directives}");
        }
    }

    #[test]
    fn test_log_file_created_in_new_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let (path, _file) = create_log_file(&log_dir).unwrap();
        assert_eq!(path, log_dir.join(LOG_FILE_NAME));
        assert!(path.exists());
    }

    #[test]
    fn test_reopening_log_file_keeps_contents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (path, _file) = create_log_file(temp_dir.path()).unwrap();
        std::fs::write(&path, "existing line\n").unwrap();

        let (_, _reopened) = create_log_file(temp_dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing line\n");
    }

    #[test]
    fn test_json_layer_writes_parseable_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (path, file) = create_log_file(temp_dir.path()).unwrap();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .json(),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(cells = 3, "frame rendered");
        });

        let contents = std::fs::read_to_string(path).unwrap();
        let line = contents.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["fields"]["message"], "frame rendered");
        assert_eq!(value["fields"]["cells"], 3);
    }

    #[test]
    fn test_second_init_keeps_existing_log_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let Some(path) = init_logging(Some(temp_dir.path()), true, None) else {
            return; // another subscriber already owns this process
        };
        tracing::warn!("first subscriber line");
        let before = std::fs::read_to_string(&path).unwrap();
        assert!(before.contains("first subscriber line"));

        assert_eq!(init_logging(Some(temp_dir.path()), true, None), None);
        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(&before));
    }
}
