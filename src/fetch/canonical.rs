//! Canonical URL resolution.
//!
//! A DOI is resolved by fetching it, following redirects to the publisher's
//! landing page, and checking the URL the page was served from against the
//! canonical URL the page declares for itself.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use crate::config::ClientSettings;
use crate::error_handling::{ErrorClassifier, ErrorReport, FailureResponse, FetchFailure};
use crate::fetch::options::RequestOptions;
use crate::fetch::request::send;
use crate::parse::canonical_hint_from_body;
use crate::utils::{contains_digit, normalize_final_url, normalize_hint, path_and_query};

/// Outcome of checking a landing page against its canonical hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The page is an article landing page and agrees with its hint (or has none).
    Verified,
    /// The page declares a canonical URL other than the one it was served from.
    Mismatch {
        /// `Canonical URL mismatch: <hint> for <final url>`, both normalized.
        message: String,
    },
    /// The URL does not look like an article landing page (no digit in it).
    NotLanding,
}

/// Checks a fetched page without touching the network.
///
/// A hint matches when, once normalized, it equals either the normalized final
/// URL or the normalized path and query of the final URL. The mismatch check
/// runs first; a page is only a landing page when both the original and the
/// final URL contain a digit.
///
/// # Arguments
///
/// * `original_url` - The URL the caller asked to resolve
/// * `final_url` - The URL the page was served from, after redirects
/// * `hint` - The canonical URL declared by the page, if any; blank hints are ignored
///
/// # Returns
///
/// [`Verdict::Mismatch`] with the message to report, [`Verdict::NotLanding`]
/// for digit-less URLs, or [`Verdict::Verified`].
pub fn verify_landing(original_url: &str, final_url: &str, hint: Option<&str>) -> Verdict {
    let normalized_final = normalize_final_url(final_url);
    let path = path_and_query(final_url).map(|path| normalize_final_url(&path));

    let hint = hint.map(str::trim).filter(|hint| !hint.is_empty());
    if let Some(hint) = hint {
        let body_url = normalize_hint(hint);
        if body_url != normalized_final && path.as_ref() != Some(&body_url) {
            return Verdict::Mismatch {
                message: format!("Canonical URL mismatch: {body_url} for {normalized_final}"),
            };
        }
    }

    if !contains_digit(original_url) || !contains_digit(&normalized_final) {
        return Verdict::NotLanding;
    }

    Verdict::Verified
}

/// Resolves DOIs to verified landing page URLs.
///
/// Like [`RequestExecutor`](crate::fetch::RequestExecutor) it only holds
/// immutable settings, so a single resolver can run any number of resolutions
/// at once.
#[derive(Debug, Clone, Default)]
pub struct CanonicalResolver {
    settings: Arc<ClientSettings>,
    classifier: ErrorClassifier,
}

impl CanonicalResolver {
    pub fn new(settings: ClientSettings, classifier: ErrorClassifier) -> Self {
        Self {
            settings: Arc::new(settings),
            classifier,
        }
    }

    /// Resolves `url` and returns it unchanged once verified.
    ///
    /// The request expects markup and only honors `options.timeout` and
    /// `options.headers`; the rest of `options` is used for reporting. Fetch
    /// failures and non-landing pages are reported as unresolved DOIs,
    /// disagreeing canonical hints as mismatches.
    pub async fn resolve(&self, url: &str, options: &RequestOptions) -> Result<String, ErrorReport> {
        let mut fetch_options = RequestOptions::markup();
        fetch_options.timeout = options.timeout;
        fetch_options.headers = options.headers.clone();

        let raw = match send(&self.settings, url, &fetch_options).await {
            Ok(raw) => raw,
            Err(failure) => {
                debug!("Fetching {url} failed while resolving: {failure}");
                let lookup_options = options.clone().with_doi_lookup();
                return Err(self.classifier.classify(url, &failure, &lookup_options));
            }
        };

        let hint = canonical_hint_from_body(&raw.body);
        match verify_landing(url, &raw.final_url, hint.as_deref()) {
            Verdict::Verified => {
                info!("Resolved {url} via {}", raw.final_url);
                Ok(url.to_string())
            }
            Verdict::Mismatch { message } => {
                warn!("{message}");
                let failure = FetchFailure::not_found(FailureResponse {
                    status: raw.status,
                    body: raw.body,
                    message: Some(message),
                });
                let mismatch_options = options.clone().with_doi_mismatch();
                Err(self.classifier.classify(url, &failure, &mismatch_options))
            }
            Verdict::NotLanding => {
                debug!("{} is not an article landing page", raw.final_url);
                let failure = FetchFailure::not_found(FailureResponse {
                    status: raw.status,
                    body: raw.body,
                    message: None,
                });
                let lookup_options = options.clone().with_doi_lookup();
                Err(self.classifier.classify(url, &failure, &lookup_options))
            }
        }
    }

    /// Resolves every URL in `urls`, at most `concurrency` at a time.
    ///
    /// Results come back in input order, each paired with its input URL.
    pub async fn resolve_many<I>(
        &self,
        urls: I,
        options: &RequestOptions,
        concurrency: usize,
    ) -> Vec<(String, Result<String, ErrorReport>)>
    where
        I: IntoIterator<Item = String>,
    {
        stream::iter(urls)
            .map(|url| async move {
                let result = self.resolve(&url, options).await;
                (url, result)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{ErrorKind, Level, MemorySink};
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use std::time::Duration;

    fn resolver() -> (CanonicalResolver, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let resolver = CanonicalResolver::new(
            ClientSettings::new("test.example.org"),
            ErrorClassifier::new(sink.clone()),
        );
        (resolver, sink)
    }

    fn landing_page(head: &str) -> String {
        format!("<!DOCTYPE html><html><head>{head}<title>Article</title></head><body><h1>Article</h1></body></html>")
    }

    #[test]
    fn test_redirect_without_hint_is_verified() {
        assert_eq!(
            verify_landing(
                "https://doi.org/10.1/x",
                "https://publisher.test/articles/10.1/x",
                None
            ),
            Verdict::Verified
        );
    }

    #[test]
    fn test_diverging_hint_is_mismatch() {
        let verdict = verify_landing(
            "https://doi.org/10.1/x",
            "https://publisher.test/articles/10.1/x",
            Some("https://publisher.test/old/10.1/x"),
        );
        assert_eq!(
            verdict,
            Verdict::Mismatch {
                message: "Canonical URL mismatch: https://publisher.test/old/10.1/x for https://publisher.test/articles/10.1/x".to_string()
            }
        );
    }

    #[test]
    fn test_final_url_without_digit_is_not_landing() {
        assert_eq!(
            verify_landing("https://doi.org/10.1/x", "https://publisher.test/about", None),
            Verdict::NotLanding
        );
    }

    #[test]
    fn test_original_url_without_digit_is_not_landing_even_if_hint_agrees() {
        assert_eq!(
            verify_landing(
                "https://publisher.test/article",
                "https://publisher.test/article/10.1/x",
                Some("https://publisher.test/article/10.1/x")
            ),
            Verdict::NotLanding
        );
    }

    #[test]
    fn test_hint_matching_path_and_query() {
        assert_eq!(
            verify_landing(
                "https://doi.org/10.1371/journal.pone.0000001",
                "https://journals.plos.org/plosone/article?id=10.1371/journal.pone.0000001",
                Some("/plosone/article?id=10.1371/journal.pone.0000001")
            ),
            Verdict::Verified
        );
    }

    #[test]
    fn test_hint_compared_after_normalization() {
        assert_eq!(
            verify_landing(
                "https://doi.org/10.1/X",
                "https://Publisher.test/articles/10.1/X;jsessionid=A1B2?via=ihub",
                Some("https://publisher.test/Articles/10.1%2FX")
            ),
            Verdict::Verified
        );
        assert_eq!(
            verify_landing(
                "https://doi.org/10.1109/5.771073",
                "https://ieeexplore.ieee.org/document/771073?reload=true&arnumber=771073",
                Some("https://ieeexplore.ieee.org/document/771073?arnumber=771073")
            ),
            Verdict::Verified
        );
    }

    #[test]
    fn test_relative_hint_with_encoded_hash_in_path() {
        assert_eq!(
            verify_landing(
                "https://doi.org/10.1/c%23",
                "https://publisher.test/lang/c%23/10.1?page=2",
                Some("/lang/C%23/10.1?page=2")
            ),
            Verdict::Verified
        );
    }

    #[test]
    fn test_relative_hint_with_session_segment_in_final_path() {
        assert_eq!(
            verify_landing(
                "https://doi.org/10.1/x",
                "https://publisher.test/doi/10.1/X;jsessionid=77AB",
                Some("/doi/10.1/x")
            ),
            Verdict::Verified
        );
    }

    #[test]
    fn test_blank_hint_is_ignored() {
        assert_eq!(
            verify_landing(
                "https://doi.org/10.1/x",
                "https://publisher.test/articles/10.1/x",
                Some("   ")
            ),
            Verdict::Verified
        );
    }

    #[test]
    fn test_mismatch_wins_over_missing_digit() {
        let verdict = verify_landing(
            "https://publisher.test/about",
            "https://publisher.test/about",
            Some("https://publisher.test/home"),
        );
        assert!(matches!(verdict, Verdict::Mismatch { .. }));
    }

    #[tokio::test]
    async fn test_resolve_follows_redirect_and_returns_input() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/10.1/x"))
                .respond_with(status_code(302).insert_header("Location", "/articles/10.1/x")),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/articles/10.1/x"),
                request::headers(contains(("accept", "text/html; charset=UTF-8"))),
            ])
            .respond_with(status_code(200).body(landing_page(""))),
        );

        let (resolver, sink) = resolver();
        let url = server.url_str("/10.1/x");
        let resolved = resolver.resolve(&url, &RequestOptions::default()).await.unwrap();
        assert_eq!(resolved, url);
        assert!(sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_reports_canonical_mismatch() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/articles/10.1/x")).respond_with(
                status_code(200).body(landing_page(
                    r#"<link rel="canonical" href="https://publisher.test/old/10.1/x">"#,
                )),
            ),
        );

        let (resolver, sink) = resolver();
        let url = server.url_str("/articles/10.1/x");
        let options = RequestOptions::default().with_work_id("42");
        let report = resolver.resolve(&url, &options).await.unwrap_err();
        assert_eq!(report.status, 404);
        assert_eq!(report.kind, ErrorKind::NotFoundMismatch);
        assert_eq!(report.level, Level::Error);
        assert!(report.error.starts_with("Canonical URL mismatch: https://publisher.test/old/10.1/x for "));
        assert_eq!(report.work_id.as_deref(), Some("42"));

        let recorded = sink.notifications();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].message, report.error);
    }

    #[tokio::test]
    async fn test_resolve_accepts_relative_and_og_url_hints() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/relative/10.1/x")).respond_with(
                status_code(200)
                    .body(landing_page(r#"<link rel="canonical" href="/Relative/10.1%2Fx">"#)),
            ),
        );
        let og_url = server.url_str("/og/10.1/y");
        server.expect(
            Expectation::matching(request::method_path("GET", "/og/10.1/y")).respond_with(
                status_code(200).body(landing_page(&format!(
                    r#"<meta property="og:url" content="{og_url}">"#
                ))),
            ),
        );

        let (resolver, _sink) = resolver();
        let relative = server.url_str("/relative/10.1/x");
        assert_eq!(
            resolver.resolve(&relative, &RequestOptions::default()).await.unwrap(),
            relative
        );
        assert_eq!(
            resolver.resolve(&og_url, &RequestOptions::default()).await.unwrap(),
            og_url
        );
    }

    #[tokio::test]
    async fn test_resolve_not_found_is_unresolved() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/10.1/missing"))
                .respond_with(status_code(404).body("<html><body>DOI not found</body></html>")),
        );

        let (resolver, sink) = resolver();
        let url = server.url_str("/10.1/missing");
        let report = resolver.resolve(&url, &RequestOptions::default()).await.unwrap_err();
        assert_eq!(report.status, 404);
        assert_eq!(report.kind, ErrorKind::NotFoundUnresolved);
        assert_eq!(report.error, format!("DOI {url} could not be resolved"));
        assert_eq!(sink.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_ignores_request_body_and_auth() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/10.1/z"),
                request::headers(contains(("x-trace", "1"))),
                not(request::headers(contains(key("authorization")))),
            ])
            .respond_with(status_code(200).body(landing_page(""))),
        );

        let (resolver, _sink) = resolver();
        let url = server.url_str("/10.1/z");
        let options = RequestOptions::default()
            .with_bearer("secret")
            .with_header("X-Trace", "1")
            .with_data(crate::fetch::RequestBody::Text("ignored".to_string()));
        assert_eq!(resolver.resolve(&url, &options).await.unwrap(), url);
    }

    #[tokio::test]
    async fn test_resolve_timeout() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/10.1/slow")).respond_with(
                delay_and_then(Duration::from_secs(2), status_code(200).body(landing_page(""))),
            ),
        );

        let (resolver, _sink) = resolver();
        let options = RequestOptions::default().with_timeout(Duration::from_millis(200));
        let report = resolver
            .resolve(&server.url_str("/10.1/slow"), &options)
            .await
            .unwrap_err();
        assert_eq!(report.status, 408);
        assert_eq!(report.class_name, "RequestTimeout");
        assert_eq!(report.level, Level::Warning);
        assert_eq!(report.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_resolve_many_keeps_input_order() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/10.1/a"))
                .respond_with(delay_and_then(
                    Duration::from_millis(200),
                    status_code(200).body(landing_page("")),
                )),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/10.1/b"))
                .respond_with(status_code(404).body("gone")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/10.1/c"))
                .respond_with(status_code(200).body(landing_page(""))),
        );

        let (resolver, _sink) = resolver();
        let urls: Vec<String> = ["/10.1/a", "/10.1/b", "/10.1/c"]
            .iter()
            .map(|path| server.url_str(path))
            .collect();
        let results = resolver
            .resolve_many(urls.clone(), &RequestOptions::default(), 3)
            .await;

        assert_eq!(results.len(), 3);
        for ((url, result), expected) in results.iter().zip(&urls) {
            assert_eq!(url, expected);
            if url.ends_with("/b") {
                assert_eq!(result.as_ref().unwrap_err().kind, ErrorKind::NotFoundUnresolved);
            } else {
                assert_eq!(result.as_ref().unwrap(), url);
            }
        }
    }
}
