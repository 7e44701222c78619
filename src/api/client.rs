//! Blocking HTTP client for the Patchwork REST API

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::types::ApiErrorResponse;
use super::{ApiVersion, Params, PatchworkApi};
use crate::config::ServerConfig;

/// Resources that are filtered by the configured project
const PROJECT_SCOPED: &[&str] = &["patches", "series"];

/// Credentials sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    Basic { username: String, password: String },
    Anonymous,
}

/// Blocking client for a single Patchwork instance
#[derive(Debug, Clone)]
pub struct PatchworkClient {
    client: Client,
    base_url: Url,
    project: Option<String>,
    auth: Auth,
    version: ApiVersion,
}

impl PatchworkClient {
    /// Create client from server config
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Server URL not configured.\n\
                 Use --server, set GIT_PW_SERVER, or set server.url in config:\n  \
                 git-pw config server.url https://patchwork.example.com/api/1.1"
            )
        })?;

        let api_version = config
            .api_version
            .as_deref()
            .map(str::parse::<ApiVersion>)
            .transpose()?;

        let auth = match (&config.token, &config.username, &config.password) {
            (Some(token), _, _) => Auth::Token(token.clone()),
            (None, Some(username), Some(password)) => Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => Auth::Anonymous,
        };

        Self::new(
            url,
            config.project.clone(),
            auth,
            api_version,
            config.timeout_secs,
        )
    }

    /// Create client with explicit parameters
    pub fn new(
        server_url: &str,
        project: Option<String>,
        auth: Auth,
        api_version: Option<ApiVersion>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let (base, version) = normalize_server_url(server_url, api_version);
        let base_url = Url::parse(&format!("{}/", base))
            .with_context(|| format!("Invalid server URL: {}", server_url))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("git-pw/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        debug!(%base_url, %version, "Using Patchwork server");

        Ok(Self {
            client,
            base_url,
            project,
            auth,
            version,
        })
    }

    /// Build a URL for an endpoint relative to the API root
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    /// Add credentials to a request
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Token(token) => builder.header("Authorization", format!("Token {}", token)),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Auth::Anonymous => builder,
        }
    }

    fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let response = self
            .authorize(builder)
            .send()
            .with_context(|| format!("Failed to send {} request", what))?;
        check_status(response)
    }

    fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        response.json().context("Failed to parse response")
    }
}

impl PatchworkApi for PatchworkClient {
    fn version(&self) -> ApiVersion {
        self.version
    }

    fn index(&self, resource: &str, params: &Params) -> Result<Vec<Value>> {
        let url = self.url(&format!("{}/", resource))?;
        debug!(%url, ?params, "Listing {}", resource);

        let mut builder = self.client.get(url).query(params);

        if let Some(project) = &self.project {
            let has_project = params.iter().any(|(key, _)| key == "project");
            if PROJECT_SCOPED.contains(&resource) && !has_project {
                builder = builder.query(&[("project", project)]);
            }
        }

        let response = self.send(builder, "list")?;
        self.handle_response(response)
    }

    fn detail(&self, resource: &str, id: u64) -> Result<Value> {
        let url = self.url(&format!("{}/{}/", resource, id))?;
        debug!(%url, "Fetching {} {}", resource, id);

        let response = self.send(self.client.get(url), "detail")?;
        self.handle_response(response)
    }

    fn update(&self, resource: &str, id: u64, data: &Params) -> Result<Value> {
        let url = self.url(&format!("{}/{}/", resource, id))?;
        debug!(%url, ?data, "Updating {} {}", resource, id);

        let response = self.send(self.client.patch(url).form(data), "update")?;
        self.handle_response(response)
    }

    fn download(&self, url: &str, params: &Params) -> Result<PathBuf> {
        debug!(%url, ?params, "Downloading");

        let response = self.send(self.client.get(url).query(params), "download")?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| filename_from_url(url));

        // Kept after exit so `git am` and the user can still read it
        let dir = tempfile::Builder::new()
            .prefix("git-pw-")
            .tempdir()
            .context("Failed to create temporary directory")?
            .into_path();

        let path = dir.join(filename);
        let body = response.bytes().context("Failed to read download")?;
        fs::write(&path, &body).with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }

    fn get(&self, url: &str) -> Result<String> {
        debug!(%url, "Fetching");

        let response = self.send(self.client.get(url), "get")?;
        response.text().context("Failed to read response")
    }
}

/// Turn non-2xx responses into errors carrying the server's message
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => bail!("Resource not found: {}", message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            bail!("Permission denied ({}): {}", status, message)
        }
        _ => bail!("API error ({}): {}", status, message),
    }
}

/// Ensure the server URL points at the API root, returning it with the
/// negotiated version
fn normalize_server_url(url: &str, configured: Option<ApiVersion>) -> (String, ApiVersion) {
    let trimmed = url.trim_end_matches('/');

    if let Some(version) = ApiVersion::from_server_url(trimmed) {
        return (trimmed.to_string(), version);
    }

    let base = if trimmed.ends_with("/api") {
        trimmed.to_string()
    } else {
        warn!("Server URL does not end in '/api'; appending it: {}", trimmed);
        format!("{}/api", trimmed)
    };

    match configured {
        Some(version) => (format!("{}/{}", base, version), version),
        None => (base, ApiVersion::default()),
    }
}

/// Extract `filename` from a `Content-Disposition` header value
fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"'))
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Name a download after the patch or series ID in URLs such as
/// `.../patch/12/mbox/`, else after the last path segment
fn filename_from_url(url: &str) -> String {
    let segments: Vec<&str> = url
        .trim_end_matches('/')
        .rsplit('/')
        .take_while(|segment| !segment.is_empty() && !segment.contains(':'))
        .collect();

    segments
        .iter()
        .find(|segment| segment.chars().all(|c| c.is_ascii_digit()))
        .or_else(|| segments.first())
        .map(|segment| format!("{}.patch", segment))
        .unwrap_or_else(|| "patch.mbox".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    #[test]
    fn test_normalize_keeps_versioned_url() {
        let (url, version) = normalize_server_url("https://pw.example.com/api/1.1/", None);
        assert_eq!(url, "https://pw.example.com/api/1.1");
        assert_eq!(version, ApiVersion::V1_1);
    }

    #[test]
    fn test_normalize_url_version_wins_over_config() {
        let (_, version) =
            normalize_server_url("https://pw.example.com/api/1.0", Some(ApiVersion::V1_1));
        assert_eq!(version, ApiVersion::V1_0);
    }

    #[test]
    fn test_normalize_appends_api_and_configured_version() {
        let (url, version) =
            normalize_server_url("https://pw.example.com", Some(ApiVersion::V1_1));
        assert_eq!(url, "https://pw.example.com/api/1.1");
        assert_eq!(version, ApiVersion::V1_1);
    }

    #[test]
    fn test_normalize_defaults_to_oldest_version() {
        let (url, version) = normalize_server_url("https://pw.example.com/api", None);
        assert_eq!(url, "https://pw.example.com/api");
        assert_eq!(version, ApiVersion::V1_0);
    }

    #[test]
    fn test_endpoint_urls() {
        let client = PatchworkClient::new(
            "https://pw.example.com/api/1.1",
            None,
            Auth::Anonymous,
            None,
            5,
        )
        .unwrap();

        assert_eq!(
            client.url("patches/").unwrap().as_str(),
            "https://pw.example.com/api/1.1/patches/"
        );
        assert_eq!(
            client.url("patches/42/").unwrap().as_str(),
            "https://pw.example.com/api/1.1/patches/42/"
        );
    }

    #[test]
    fn test_from_config_requires_url() {
        let err = PatchworkClient::from_config(&ServerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Server URL not configured"));
    }

    #[test]
    fn test_from_config_auth_precedence() {
        let config = ServerConfig {
            url: Some("https://pw.example.com/api/1.1".to_string()),
            token: Some("secret".to_string()),
            username: Some("alice".to_string()),
            password: Some("hunter2".to_string()),
            ..ServerConfig::default()
        };
        let client = PatchworkClient::from_config(&config).unwrap();
        assert_eq!(client.auth, Auth::Token("secret".to_string()));

        let config = ServerConfig {
            token: None,
            ..config
        };
        let client = PatchworkClient::from_config(&config).unwrap();
        assert!(matches!(client.auth, Auth::Basic { .. }));
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=foo-bar.patch").as_deref(),
            Some("foo-bar.patch")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=\"../../etc/x.mbox\"").as_deref(),
            Some("x.mbox")
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://pw.example.com/patch/12/mbox/"),
            "12.patch"
        );
        assert_eq!(
            filename_from_url("https://pw.example.com/patch/12/raw/"),
            "12.patch"
        );
        assert_eq!(
            filename_from_url("https://pw.example.com/files/fix"),
            "fix.patch"
        );
        assert_eq!(filename_from_url("https://"), "patch.mbox");
    }

    // ==================== Against a mock server ====================
    //
    // The blocking client cannot run on an async worker, so every call goes
    // through `spawn_blocking`.

    fn client_for(server: &str, project: Option<&str>) -> PatchworkClient {
        PatchworkClient::new(
            &format!("{}/api/1.1", server),
            project.map(str::to_string),
            Auth::Token("secret".to_string()),
            None,
            5,
        )
        .unwrap()
    }

    fn params(values: &[(&str, &str)]) -> Vec<(String, String)> {
        values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn query_pairs(request: &Request) -> Vec<(String, String)> {
        request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_index_sends_ordered_query_and_project() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Authorization", "Token secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let uri = server.uri();
        let records = tokio::task::spawn_blocking(move || {
            let client = client_for(&uri, Some("netdev"));
            let records = client
                .index(
                    "patches",
                    &params(&[("state", "new"), ("state", "under-review"), ("submitter", "7")]),
                )
                .unwrap();
            client.index("people", &params(&[("q", "alice")])).unwrap();
            client.index("series", &params(&[("project", "other")])).unwrap();
            records
        })
        .await
        .unwrap();

        assert_eq!(records, vec![json!({"id": 1})]);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);

        assert_eq!(requests[0].url.path(), "/api/1.1/patches/");
        assert_eq!(
            query_pairs(&requests[0]),
            params(&[
                ("state", "new"),
                ("state", "under-review"),
                ("submitter", "7"),
                ("project", "netdev"),
            ])
        );

        // Identity lookups are not project scoped
        assert_eq!(requests[1].url.path(), "/api/1.1/people/");
        assert_eq!(query_pairs(&requests[1]), params(&[("q", "alice")]));

        // An explicit project is not doubled
        assert_eq!(requests[2].url.path(), "/api/1.1/series/");
        assert_eq!(query_pairs(&requests[2]), params(&[("project", "other")]));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_sends_form_encoded_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/1.1/patches/42/"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string("state=accepted&delegate=5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 42, "state": "accepted"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let record = tokio::task::spawn_blocking(move || {
            client_for(&uri, Some("netdev")).update(
                "patches",
                42,
                &params(&[("state", "accepted"), ("delegate", "5")]),
            )
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(record["state"], "accepted");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_responses_carry_server_detail() {
        let server = MockServer::start().await;
        Mock::given(path("/api/1.1/patches/404/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&server)
            .await;
        Mock::given(path("/api/1.1/patches/403/"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"detail": "Authentication credentials were not provided."})),
            )
            .mount(&server)
            .await;
        Mock::given(path("/api/1.1/patches/500/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Server Error"))
            .mount(&server)
            .await;

        let uri = server.uri();
        let errors = tokio::task::spawn_blocking(move || {
            let client = client_for(&uri, None);
            [404, 403, 500].map(|id| client.detail("patches", id).unwrap_err().to_string())
        })
        .await
        .unwrap();

        assert_eq!(errors[0], "Resource not found: Not found.");
        assert_eq!(
            errors[1],
            "Permission denied (403 Forbidden): Authentication credentials were not provided."
        );
        assert_eq!(errors[2], "API error (500 Internal Server Error): Server Error");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_download_uses_fresh_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/patch/12/mbox/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("From: alice\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/series/3/mbox/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=net-fixes.patch")
                    .set_body_string("series"),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let (first, second, named) = tokio::task::spawn_blocking(move || {
            let client = client_for(&uri, None);
            let patch_url = format!("{}/patch/12/mbox/", uri);
            (
                client.download(&patch_url, &[]).unwrap(),
                client.download(&patch_url, &[]).unwrap(),
                client
                    .download(&format!("{}/series/3/mbox/", uri), &[])
                    .unwrap(),
            )
        })
        .await
        .unwrap();

        assert_eq!(first.file_name().unwrap(), "12.patch");
        assert_eq!(fs::read_to_string(&first).unwrap(), "From: alice\n");
        assert_ne!(first.parent(), second.parent());
        assert_eq!(named.file_name().unwrap(), "net-fixes.patch");

        for file in [first, second, named] {
            fs::remove_dir_all(file.parent().unwrap()).unwrap();
        }
    }
}
