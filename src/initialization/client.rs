//! HTTP client initialization.
//!
//! A fresh `reqwest::Client` is built for every request so concurrent calls
//! never share cookies, timeouts or headers.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::redirect::Policy;
use reqwest::ClientBuilder;

use crate::config::ClientSettings;
use crate::fetch::RequestOptions;

/// Initializes the HTTP client for one request.
///
/// Creates a `reqwest::Client` configured with:
/// - `Accept` header matching the expected content type
/// - User-Agent built from the configured hostname
/// - Redirect following up to `settings.max_redirects` hops
/// - A cookie store, so cookies set during redirects are sent on later hops
/// - Timeout from the request options, or the default from the settings
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(
    settings: &ClientSettings,
    options: &RequestOptions,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(options.content_type.accept_header()),
    );

    ClientBuilder::new()
        .default_headers(headers)
        .user_agent(settings.user_agent())
        .redirect(Policy::limited(settings.max_redirects))
        .cookie_store(true)
        .timeout(options.timeout.unwrap_or(settings.default_timeout))
        .build()
}
