//! Canonical URL normalization.
//!
//! Canonical hints and fetched URLs are compared only after both are
//! normalized: percent-decoded, lowercased and stripped of publisher-specific
//! noise (IEEE's `reload=true&`, J2EE `;jsessionid=`, ScienceDirect's
//! `?via=ihub`).
//!
//! Every rule is applied until the string stops changing, so normalizing a
//! normalized URL gives it back unchanged. Double-encoded escapes (`%252F`)
//! therefore decode all the way down (`/`).

use percent_encoding::percent_decode_str;
use url::{Position, Url};

/// Parameter IEEE Xplore adds to landing page URLs.
const IEEE_RELOAD_PARAM: &str = "reload=true&";
/// Session segment added by J2EE servers.
const JSESSIONID_SEGMENT: &str = ";jsessionid=";
/// Tracking query ScienceDirect appends after redirects.
const SCIENCEDIRECT_VIA: &str = "?via=ihub";
/// Upper bound on normalization passes for adversarial input.
const MAX_PASSES: usize = 16;

/// Decodes `%XX` escapes. Invalid escapes are kept and invalid UTF-8 is
/// replaced. `+` is left alone: in a path it is a literal plus.
fn unescape(url: &str) -> String {
    percent_decode_str(url).decode_utf8_lossy().into_owned()
}

fn strip_all(url: &mut String, noise: &str) {
    while let Some(index) = url.find(noise) {
        url.replace_range(index..index + noise.len(), "");
    }
}

fn hint_pass(url: &str) -> String {
    let mut normalized = unescape(url).to_lowercase();
    strip_all(&mut normalized, IEEE_RELOAD_PARAM);
    normalized
}

fn final_url_pass(url: &str) -> String {
    let mut normalized = unescape(url).to_lowercase();
    if let Some(index) = normalized.find(JSESSIONID_SEGMENT) {
        normalized.truncate(index);
    }
    strip_all(&mut normalized, IEEE_RELOAD_PARAM);
    strip_all(&mut normalized, SCIENCEDIRECT_VIA);
    normalized
}

fn until_stable(url: &str, pass: fn(&str) -> String) -> String {
    let mut current = pass(url);
    for _ in 1..MAX_PASSES {
        let next = pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Normalizes a canonical hint taken from a document.
pub fn normalize_hint(url: &str) -> String {
    until_stable(url, hint_pass)
}

/// Normalizes the URL a response was served from.
///
/// Same rules as [`normalize_hint`], plus removal of a `;jsessionid=` segment
/// (everything from its first occurrence on) and of `?via=ihub`.
pub fn normalize_final_url(url: &str) -> String {
    until_stable(url, final_url_pass)
}

/// The raw path and query of an absolute URL, without scheme, authority or
/// fragment.
///
/// `https://host/a/b?c=1#top` gives `/a/b?c=1`. Returns `None` when `url` is
/// not an absolute URL. The slice is taken before any decoding, so an encoded
/// `%23` stays part of the path.
pub fn path_and_query(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    Some(parsed[Position::BeforePath..Position::AfterQuery].to_string())
}

/// Whether `url` contains at least one ASCII digit.
pub fn contains_digit(url: &str) -> bool {
    url.chars().any(|c| c.is_ascii_digit())
}
