//! Per-call request options.

use std::time::Duration;

use serde_json::Value;

use crate::config::ContentType;

/// Body of a POST request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document; sent with `application/json` when structured data is expected.
    Json(Value),
    /// Multipart form with text fields.
    Form(Vec<(String, String)>),
    /// Raw text, sent as is.
    Text(String),
}

impl RequestBody {
    /// The `rev` (document revision) carried by the body, used to explain 409 conflicts.
    pub fn rev(&self) -> Option<String> {
        match self {
            RequestBody::Json(value) => match value.get("rev")? {
                Value::Null => None,
                Value::String(rev) => Some(rev.clone()),
                other => Some(other.to_string()),
            },
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(name, _)| name == "rev")
                .map(|(_, value)| value.clone()),
            RequestBody::Text(_) => None,
        }
    }
}

/// Options for a single request.
///
/// `work_id`, `agent_id`, `doi_mismatch` and `doi_lookup` only affect how a
/// failure is reported, never the request itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub content_type: ContentType,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bearer: Option<String>,
    /// Overrides the client's default timeout.
    pub timeout: Option<Duration>,
    /// Extra headers, sent after (and overriding) the defaults.
    pub headers: Vec<(String, String)>,
    /// Request body; its presence turns the GET into a POST.
    pub data: Option<RequestBody>,
    pub work_id: Option<String>,
    pub agent_id: Option<String>,
    /// A 404 raised for this call is a canonical URL mismatch.
    pub doi_mismatch: bool,
    /// A 404 raised for this call means the DOI could not be resolved.
    pub doi_lookup: bool,
}

impl RequestOptions {
    /// Options expecting markup (HTML) back.
    pub fn markup() -> Self {
        Self {
            content_type: ContentType::Markup,
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_data(mut self, data: RequestBody) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_work_id(mut self, work_id: impl Into<String>) -> Self {
        self.work_id = Some(work_id.into());
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_doi_mismatch(mut self) -> Self {
        self.doi_mismatch = true;
        self
    }

    pub fn with_doi_lookup(mut self) -> Self {
        self.doi_lookup = true;
        self
    }
}
