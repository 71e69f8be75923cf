//! Request execution.
//!
//! Issues one request per call, follows redirects, sniffs the body and turns
//! every failure into an [`ErrorReport`].

use std::sync::Arc;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::RequestBuilder;
use url::Url;

use crate::config::{ClientSettings, ContentType};
use crate::error_handling::{ErrorClassifier, ErrorReport, FailureKind, FetchFailure};
use crate::fetch::options::{RequestBody, RequestOptions};
use crate::initialization::init_client;
use crate::parse::{sniff, Content};

/// A successful, decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub content: Content,
    /// URL the body was served from, after redirects.
    pub final_url: String,
    pub status: u16,
}

/// A successful response before decoding.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub(crate) final_url: String,
    pub(crate) status: u16,
    pub(crate) body: String,
}

/// Sends one request and returns the raw 2xx response.
///
/// Builds a client for this call only, then sends a POST when `options.data`
/// is set and a GET otherwise, with the configured auth and extra headers.
///
/// # Arguments
///
/// * `settings` - User-Agent host, default timeout and redirect limit
/// * `url` - Absolute URL to request
/// * `options` - Per-call content type, auth, timeout, headers and body
///
/// # Returns
///
/// The final URL after redirects, the status and the body as text.
///
/// # Errors
///
/// Returns a [`FetchFailure`] for an unparsable URL, an invalid header, a
/// transport failure (timeouts included, also while reading the body) and
/// for any non-2xx response, which carries its status and body.
pub(crate) async fn send(
    settings: &ClientSettings,
    url: &str,
    options: &RequestOptions,
) -> Result<RawResponse, FetchFailure> {
    let target = Url::parse(url).map_err(|e| {
        FetchFailure::new(FailureKind::InvalidUrl, format!("invalid URL {url}: {e}"))
            .with_exception(e.to_string())
    })?;
    let extra_headers = build_headers(&options.headers)?;
    let client = init_client(settings, options)?;

    let mut request = match &options.data {
        Some(body) => attach_body(client.post(target), body, options.content_type),
        None => client.get(target),
    };
    if let Some(username) = &options.username {
        request = request.basic_auth(username, options.password.as_ref());
    }
    if let Some(token) = &options.bearer {
        request = request.bearer_auth(token);
    }
    request = request.headers(extra_headers);

    debug!("Sending request to {url}");
    let response = request.send().await?;

    let status = response.status();
    let final_url = response.url().to_string();
    if final_url != url {
        debug!("Redirected from {url} to {final_url}");
    }

    if !status.is_success() {
        let body = response.text().await?;
        debug!("{url} answered {status}");
        return Err(FetchFailure::from_status(status.as_u16(), body));
    }

    let body = response.text().await?;
    Ok(RawResponse {
        final_url,
        status: status.as_u16(),
        body,
    })
}

fn attach_body(request: RequestBuilder, body: &RequestBody, content_type: ContentType) -> RequestBuilder {
    match (body, content_type) {
        (RequestBody::Json(value), ContentType::Structured) => request.json(value),
        (RequestBody::Json(value), ContentType::Markup) => request
            .header(CONTENT_TYPE, crate::config::ACCEPT_STRUCTURED)
            .body(value.to_string()),
        (RequestBody::Form(fields), _) => {
            let form = fields
                .iter()
                .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.clone()));
            request.multipart(form)
        }
        (RequestBody::Text(text), _) => request
            .header(CONTENT_TYPE, "text/plain; charset=UTF-8")
            .body(text.clone()),
    }
}

fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap, FetchFailure> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            FetchFailure::new(FailureKind::InvalidArgument, format!("invalid header name {name:?}"))
                .with_exception(e.to_string())
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            FetchFailure::new(
                FailureKind::InvalidArgument,
                format!("invalid value for header {name:?}"),
            )
            .with_exception(e.to_string())
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

/// Issues single requests and decodes their bodies.
///
/// Holds only immutable settings; every call builds its own client, so one
/// executor can serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    settings: Arc<ClientSettings>,
    classifier: ErrorClassifier,
}

impl RequestExecutor {
    pub fn new(settings: ClientSettings, classifier: ErrorClassifier) -> Self {
        Self {
            settings: Arc::new(settings),
            classifier,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Fetches `url` and sniffs the body.
    ///
    /// Sends a POST when `options.data` is set and a GET otherwise.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to request
    /// * `options` - Per-call request options; the reporting fields only
    ///   affect the error report
    ///
    /// # Returns
    ///
    /// The decoded body (structured, markup or opaque), the final URL and the status.
    ///
    /// # Errors
    ///
    /// Any failure is classified and returned as an [`ErrorReport`]; recorded
    /// failures are also handed to the classifier's notification sink.
    pub async fn execute(&self, url: &str, options: &RequestOptions) -> Result<FetchResult, ErrorReport> {
        match send(&self.settings, url, options).await {
            Ok(raw) => Ok(FetchResult {
                content: sniff(&raw.body),
                final_url: raw.final_url,
                status: raw.status,
            }),
            Err(failure) => Err(self.classifier.classify(url, &failure, options)),
        }
    }
}
