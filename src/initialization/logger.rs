//! Logger initialization.
//!
//! Plain output is colored and meant for terminals; JSON output is one object
//! per line for log shippers.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// The logger reads `RUST_LOG` first, then applies `level` on top, so the
/// CLI flag wins over the environment for this crate while `RUST_LOG` can still
/// tune other modules.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Use RUST_LOG for quick debugging (no CLI args needed)
/// RUST_LOG=debug doi_landing resolve https://doi.org/10.1371/journal.pone.0000001
///
/// # Override with CLI args (takes precedence)
/// RUST_LOG=debug doi_landing --log-level info resolve https://doi.org/10.1/x
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    // html5ever reports every tag soup quirk of a landing page as a parse error
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("cookie_store", LevelFilter::Warn);
    builder.filter_module("doi_landing", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    record.target().cyan(),
                    colored_level(record.level()),
                    record.args()
                )
            });
        }
    }

    // try_init() so a second initialization (tests, embedding apps) is an error, not a panic
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

fn colored_level(level: log::Level) -> ColoredString {
    let label = level.to_string();
    match level {
        log::Level::Error => label.red().bold(),
        log::Level::Warn => label.yellow(),
        log::Level::Info => label.green(),
        log::Level::Debug => label.blue(),
        log::Level::Trace => label.purple(),
    }
}

/// One JSON log line. The message is escaped with `serde_json`.
fn json_line(timestamp_ms: i64, level: log::Level, target: &str, message: &str) -> String {
    format!(
        "{{\"ts\":{},\"level\":\"{}\",\"target\":{},\"msg\":{}}}",
        timestamp_ms,
        level,
        serde_json::to_string(target).unwrap_or_else(|_| "\"\"".into()),
        serde_json::to_string(message).unwrap_or_else(|_| "\"\"".into())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_is_valid_json() {
        let line = json_line(
            1_700_000_000_000,
            log::Level::Warn,
            "doi_landing::fetch",
            "Canonical URL mismatch: \"a\" for b\n",
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ts"], 1_700_000_000_000i64);
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "doi_landing::fetch");
        assert_eq!(value["msg"], "Canonical URL mismatch: \"a\" for b\n");
    }

    #[test]
    fn test_colored_level_keeps_label() {
        assert!(colored_level(log::Level::Error).to_string().contains("ERROR"));
        assert!(colored_level(log::Level::Info).to_string().contains("INFO"));
    }

    #[test]
    fn test_second_initialization_is_an_error_not_a_panic() {
        // only one logger per process; whichever call comes second must fail cleanly
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let result = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(matches!(result, Err(InitializationError::LoggerError(_))));
    }
}
