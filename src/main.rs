//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `doi_landing` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use doi_landing::config::{Command, RequestArgs};
use doi_landing::initialization::init_logger_with;
use doi_landing::{
    CanonicalResolver, Config, Content, ContentType, ErrorClassifier, ErrorReport, RequestBody,
    RequestExecutor, RequestOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let settings = config.client_settings();
    let classifier = ErrorClassifier::default();

    let succeeded = match config.command {
        Command::Fetch {
            url,
            content_type,
            data,
            request,
        } => {
            let mut options = request_options(&request, content_type);
            if let Some(data) = data {
                options = options.with_data(request_body(data));
            }
            let executor = RequestExecutor::new(settings, classifier);
            match executor.execute(&url, &options).await {
                Ok(result) => {
                    log::info!("{} answered {} from {}", url, result.status, result.final_url);
                    println!("{}", render_content(&result.content)?);
                    true
                }
                Err(report) => {
                    println!("{}", render_report(&report)?);
                    false
                }
            }
        }
        Command::Resolve {
            urls,
            concurrency,
            request,
        } => {
            let options = request_options(&request, ContentType::Markup);
            let resolver = CanonicalResolver::new(settings, classifier);
            let results = resolver.resolve_many(urls, &options, concurrency).await;

            let total = results.len();
            let mut failed = 0;
            for (url, result) in results {
                match result {
                    Ok(resolved) => println!("✅ {url} -> {resolved}"),
                    Err(report) => {
                        failed += 1;
                        println!("❌ {url}: {} [{}]", report, report.kind);
                    }
                }
            }
            log::info!(
                "Resolved {} of {} URL{}",
                total - failed,
                total,
                if total == 1 { "" } else { "s" }
            );
            failed == 0
        }
    };

    if !succeeded {
        process::exit(1);
    }
    Ok(())
}

fn request_options(args: &RequestArgs, content_type: ContentType) -> RequestOptions {
    let mut options = RequestOptions::default().with_content_type(content_type);
    if let Some(username) = &args.username {
        options = options.with_basic_auth(username.clone(), args.password.clone());
    }
    if let Some(token) = &args.bearer {
        options = options.with_bearer(token.clone());
    }
    for (name, value) in &args.headers {
        options = options.with_header(name.clone(), value.clone());
    }
    if let Some(work_id) = &args.work_id {
        options = options.with_work_id(work_id.clone());
    }
    if let Some(agent_id) = &args.agent_id {
        options = options.with_agent_id(agent_id.clone());
    }
    options
}

/// `--data` is sent as JSON when it parses as JSON and as plain text otherwise.
fn request_body(data: String) -> RequestBody {
    match serde_json::from_str(&data) {
        Ok(value) => RequestBody::Json(value),
        Err(_) => RequestBody::Text(data),
    }
}

fn render_content(content: &Content) -> Result<String> {
    let rendered = match content {
        Content::Structured(value) => {
            serde_json::to_string_pretty(value).context("Failed to render JSON body")?
        }
        Content::Markup(document) => {
            serde_json::to_string_pretty(document).context("Failed to render markup body")?
        }
        Content::Opaque(text) => text.clone(),
    };
    Ok(rendered)
}

fn render_report(report: &ErrorReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to render error report")
}
