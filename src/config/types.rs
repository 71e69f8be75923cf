//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and for the immutable client settings injected into the executor and resolver.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    APP_NAME, DEFAULT_CONCURRENCY, DEFAULT_HOSTNAME, DEFAULT_TIMEOUT_SECS, MAX_REDIRECT_HOPS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Content type a request expects back.
///
/// Drives the `Accept` header and whether a JSON request body is encoded as JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ContentType {
    /// Structured data (`application/json`)
    #[default]
    Structured,
    /// Markup (`text/html`)
    Markup,
}

impl ContentType {
    /// Value of the `Accept` header for this content type.
    pub fn accept_header(self) -> &'static str {
        match self {
            ContentType::Structured => crate::config::ACCEPT_STRUCTURED,
            ContentType::Markup => crate::config::ACCEPT_MARKUP,
        }
    }
}

/// Immutable HTTP client settings shared by every request a
/// [`RequestExecutor`](crate::fetch::RequestExecutor) or
/// [`CanonicalResolver`](crate::fetch::CanonicalResolver) issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Hostname embedded in the `User-Agent` header. Opaque, never parsed.
    pub hostname: String,
    /// Timeout used when a request does not carry its own.
    pub default_timeout: Duration,
    /// Maximum redirect hops followed per request.
    pub max_redirects: usize,
}

impl ClientSettings {
    /// Creates settings for the given hostname with default timeout and redirect limit.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    /// Returns the `User-Agent` header value, e.g. `doi_landing - http://example.org`.
    pub fn user_agent(&self) -> String {
        format!("{} - http://{}", APP_NAME, self.hostname)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: MAX_REDIRECT_HOPS,
        }
    }
}

/// Command-line configuration for the `doi_landing` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "doi_landing",
    version,
    about = "Resolve DOIs to their canonical landing page and classify HTTP failures"
)]
pub struct Config {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Hostname advertised in the User-Agent header
    #[arg(long, env = "HOSTNAME", default_value = DEFAULT_HOSTNAME, global = true)]
    pub hostname: String,

    /// Per-request timeout in seconds (redirects included)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,
}

/// Subcommands of the `doi_landing` binary.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch a URL and print the decoded body
    Fetch {
        /// URL to fetch
        url: String,

        /// Expected content type of the response
        #[arg(long, value_enum, default_value_t = ContentType::Structured)]
        content_type: ContentType,

        /// JSON request body; sends a POST instead of a GET
        #[arg(long)]
        data: Option<String>,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Resolve one or more DOI URLs to their verified landing page
    Resolve {
        /// URLs to resolve (e.g. https://doi.org/10.1371/journal.pone.0000001)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Maximum number of URLs resolved at the same time
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        #[command(flatten)]
        request: RequestArgs,
    },
}

/// Request options shared by both subcommands.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Basic auth username
    #[arg(long)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Bearer token
    #[arg(long)]
    pub bearer: Option<String>,

    /// Extra request header as `Name: value` (repeatable)
    #[arg(long = "header", value_parser = parse_header_arg)]
    pub headers: Vec<(String, String)>,

    /// Work id attached to error reports and notifications
    #[arg(long)]
    pub work_id: Option<String>,

    /// Agent id attached to error reports and notifications
    #[arg(long)]
    pub agent_id: Option<String>,
}

impl Config {
    /// Builds the immutable client settings for this configuration.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            hostname: self.hostname.clone(),
            default_timeout: Duration::from_secs(self.timeout),
            max_redirects: MAX_REDIRECT_HOPS,
        }
    }
}

fn parse_header_arg(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header '{raw}' must look like 'Name: value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header '{raw}' has an empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_content_type_accept_header() {
        assert_eq!(ContentType::Markup.accept_header(), "text/html; charset=UTF-8");
        assert_eq!(ContentType::Structured.accept_header(), "application/json");
        assert_eq!(ContentType::default(), ContentType::Structured);
    }

    #[test]
    fn test_client_settings_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.default_timeout, Duration::from_secs(60));
        assert_eq!(settings.max_redirects, 10);
    }

    #[test]
    fn test_user_agent_uses_hostname_verbatim() {
        let settings = ClientSettings::new("lagotto.example.org:8080");
        assert_eq!(
            settings.user_agent(),
            "doi_landing - http://lagotto.example.org:8080"
        );
    }

    #[test]
    fn test_parse_header_arg() {
        assert_eq!(
            parse_header_arg("X-Api-Key: secret").unwrap(),
            ("X-Api-Key".to_string(), "secret".to_string())
        );
        assert!(parse_header_arg("no-colon").is_err());
        assert!(parse_header_arg(": value").is_err());
    }

    #[test]
    fn test_config_parses_resolve_subcommand() {
        let config = Config::try_parse_from([
            "doi_landing",
            "resolve",
            "https://doi.org/10.1/x",
            "https://doi.org/10.2/y",
            "--timeout",
            "5",
            "--header",
            "Cookie: a=b",
        ])
        .unwrap();
        assert_eq!(config.timeout, 5);
        assert_eq!(
            config.client_settings().default_timeout,
            Duration::from_secs(5)
        );
        match config.command {
            Command::Resolve { urls, request, .. } => {
                assert_eq!(urls.len(), 2);
                assert_eq!(request.headers, vec![("Cookie".into(), "a=b".into())]);
            }
            Command::Fetch { .. } => panic!("expected resolve"),
        }
    }
}
