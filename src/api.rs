use crate::domain::models::{ApiSettings, Project};
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid API host '{0}'")]
    InvalidHost(String),
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read access to control-plane projects.
///
/// `Ok(None)` means the server answered with a non-success status or an
/// empty result list.
pub trait ProjectApi {
    fn find_project(&self, name: &str) -> Result<Option<Project>, ApiError>;
    fn project(&self, id: u64) -> Result<Option<Project>, ApiError>;
}

#[derive(Debug, Clone)]
enum Auth {
    Anonymous,
    Basic { username: String, password: String },
    Token(String),
}

pub struct ApiClient {
    http: reqwest::blocking::Client,
    root: String,
    auth: Auth,
}

fn normalize_host(host: &str) -> Result<String, ApiError> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidHost(host.to_string()));
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    reqwest::Url::parse(&with_scheme).map_err(|_| ApiError::InvalidHost(host.to_string()))?;
    Ok(with_scheme)
}

/// `{"results": [...]}` yields its first element; any other body is the
/// object itself.
fn first_result(body: Value) -> Result<Option<Project>, serde_json::Error> {
    let item = match body {
        Value::Object(mut map) if map.contains_key("results") => match map.remove("results") {
            Some(Value::Array(items)) => items.into_iter().next(),
            _ => None,
        },
        other => Some(other),
    };
    item.map(serde_json::from_value).transpose()
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let host = normalize_host(&settings.host)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .build()
            .map_err(ApiError::Client)?;
        let auth = match (&settings.oauth_token, &settings.username) {
            (Some(token), _) => Auth::Token(token.clone()),
            (None, Some(username)) => Auth::Basic {
                username: username.clone(),
                password: settings.password.clone().unwrap_or_default(),
            },
            (None, None) => Auth::Anonymous,
        };
        Ok(Self {
            http,
            root: format!("{}/api/{}", host, settings.api_version.trim_matches('/')),
            auth,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn rest_get(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Project>, ApiError> {
        let url = format!("{}/{}", self.root, path);
        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match &self.auth {
            Auth::Anonymous => request,
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Token(token) => request.bearer_auth(token),
        };

        let response = request.send().map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, %status, "non-success response");
            return Ok(None);
        }
        let body: Value = response.json().map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;
        first_result(body).map_err(|source| ApiError::Decode { url, source })
    }
}

impl ProjectApi for ApiClient {
    fn find_project(&self, name: &str) -> Result<Option<Project>, ApiError> {
        self.rest_get("projects/", &[("name", name)])
    }

    fn project(&self, id: u64) -> Result<Option<Project>, ApiError> {
        self.rest_get(&format!("projects/{id}/"), &[])
    }
}
