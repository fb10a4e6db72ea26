//! Greenhouse data source
//!
//! Reads role statistics from the candidate listing pages of a Greenhouse
//! instance. Every field is a separate page request with a field-specific
//! query; the count and title are scraped from the returned HTML.

use async_trait::async_trait;
use ghstat_core::query::QuerySpec;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{Client, Response, Url, redirect};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use crate::RemoteDataSource;
use crate::error::{ClientError, Result};
use crate::page;
use crate::session::{SessionState, SessionStore};

/// Greenhouse instance used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://canonical.greenhouse.io";

/// Environment variable holding a raw `Cookie` header to seed the session with
pub const SESSION_ENV: &str = "GHSTAT_SESSION";

/// Connection settings for [`GreenhouseClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Greenhouse instance
    pub base_url: String,
    /// Timeout applied to every page request
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Greenhouse candidate pages
///
/// Redirects are never followed: Greenhouse answers unauthenticated requests
/// with a redirect to the SSO login page, which is reported as
/// [`ClientError::NotAuthenticated`].
pub struct GreenhouseClient {
    base_url: Url,
    client: Client,
    session: RwLock<SessionState>,
    store: Arc<dyn SessionStore>,
}

impl GreenhouseClient {
    /// Create a new client, restoring any saved session
    ///
    /// # Arguments
    /// * `config` - Base URL and request timeout
    /// * `store` - Where the session cookies are loaded from and saved to
    ///
    /// A cookie header in `GHSTAT_SESSION` is merged over the saved session,
    /// so a freshly exported cookie replaces an expired one.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let exported = std::env::var(SESSION_ENV).ok();
        Self::with_exported_session(config, store, exported.as_deref())
    }

    /// Like [`GreenhouseClient::new`], taking the exported cookie header explicitly
    pub fn with_exported_session(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        exported: Option<&str>,
    ) -> Result<Self> {
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| ClientError::InvalidConfig(format!("base url '{}': {}", base, e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        let mut session = match store.load() {
            Ok(state) => state,
            Err(e) => {
                debug!("no saved session: {}", e);
                SessionState::default()
            }
        };

        if let Some(raw) = exported.filter(|raw| !raw.trim().is_empty()) {
            debug!("using session cookie from {}", SESSION_ENV);
            session.merge(&SessionState::from_cookie_header(raw));
        }

        Ok(Self {
            base_url,
            client,
            session: RwLock::new(session),
            store,
        })
    }

    /// Current session state
    pub fn session(&self) -> SessionState {
        self.session
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Persists the current session, logging rather than failing
    pub fn save_session(&self) {
        let state = self.session();
        if state.is_empty() {
            debug!("no session cookies to save");
            return;
        }
        if let Err(e) = self.store.save(&state) {
            warn!("failed to save session: {}", e);
        }
    }

    /// Forgets the session in memory and in the store, logging rather than failing
    pub fn clear_session(&self) {
        if let Ok(mut session) = self.session.write() {
            *session = SessionState::default();
        }
        if let Err(e) = self.store.save(&SessionState::default()) {
            warn!("failed to clear saved session: {}", e);
        }
    }

    /// Candidate listing URL for a role, narrowed by `query`
    pub fn candidates_url(&self, role_id: u64, query: &QuerySpec) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("plans/{}/candidates", role_id))
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("hiring_plan_id[]", &role_id.to_string())
                .append_pair("job_status", "open")
                .append_pair("stage_status_id[]", "2")
                .append_pair("type", "all");
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Fetches a page and returns its body
    async fn get_page(&self, url: Url) -> Result<String> {
        debug!("requesting {}", url);

        let mut request = self.client.get(url);
        if let Some(cookie) = self.session().cookie_header() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        self.absorb_cookies(&response);
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> Result<String> {
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown location")
                .to_string();
            return Err(ClientError::NotAuthenticated(format!(
                "redirected to {}",
                location
            )));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }

    /// Folds `Set-Cookie` headers into the session
    fn absorb_cookies(&self, response: &Response) {
        let headers: Vec<&str> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if headers.is_empty() {
            return;
        }

        if let Ok(mut session) = self.session.write() {
            for header in headers {
                session.apply_set_cookie(header);
            }
        }
    }
}

#[async_trait]
impl RemoteDataSource for GreenhouseClient {
    async fn login(&self) -> Result<()> {
        match self.get_page(self.base_url.clone()).await {
            Ok(_) => {
                debug!("greenhouse session is valid");
                self.save_session();
                Ok(())
            }
            Err(e) if e.is_auth_error() => {
                debug!("greenhouse rejected the session, clearing it");
                self.clear_session();
                let reason = match e {
                    ClientError::NotAuthenticated(reason) => reason,
                    other => other.to_string(),
                };
                Err(ClientError::NotAuthenticated(format!(
                    "{}; sign in to {} in a browser and export the session cookie as {}",
                    reason, self.base_url, SESSION_ENV
                )))
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_title(&self, role_id: u64) -> Result<String> {
        let url = self.candidates_url(role_id, &QuerySpec::new())?;
        let html = self.get_page(url).await?;
        page::parse_title(&html)
    }

    async fn fetch_count(&self, role_id: u64, query: &QuerySpec) -> Result<u64> {
        let url = self.candidates_url(role_id, query)?;
        let html = self.get_page(url).await?;
        page::parse_candidate_count(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use ghstat_core::query::query_spec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one canned response per connection and records request heads
    async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 8192];
                let mut head = String::new();
                while !head.contains("\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    head.push_str(&String::from_utf8_lossy(&buf[..n]));
                }
                requests.push(head);
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            requests
        });

        (format!("http://{}", addr), handle)
    }

    fn ok(body: &str, extra_headers: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
            body.len(),
            extra_headers,
            body
        )
    }

    fn client(base_url: &str, store: Arc<MemorySessionStore>) -> GreenhouseClient {
        GreenhouseClient::with_exported_session(
            ClientConfig {
                base_url: base_url.to_string(),
                timeout: Duration::from_secs(5),
            },
            store,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_candidates_url() {
        let gh = client("https://gh.example.com/", Arc::new(MemorySessionStore::new()));
        let url = gh
            .candidates_url(123, &query_spec([("needs_decision", "1")]))
            .unwrap();
        assert_eq!(url.path(), "/plans/123/candidates");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("hiring_plan_id[]".into(), "123".into())));
        assert!(pairs.contains(&("job_status".into(), "open".into())));
        assert!(pairs.contains(&("type".into(), "all".into())));
        assert!(pairs.contains(&("needs_decision".into(), "1".into())));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GreenhouseClient::new(
            ClientConfig {
                base_url: "not a url".into(),
                timeout: Duration::from_secs(1),
            },
            Arc::new(MemorySessionStore::new()),
        );
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_fetch_count_sends_session_cookie() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&SessionState::from_cookie_header("_session=abc"))
            .unwrap();

        let (base, server) = serve(vec![ok(r#"<span id="results_count">12</span>"#, "")]).await;
        let gh = client(&base, store);

        let count = gh
            .fetch_count(7, &query_spec([("needs_decision", "1")]))
            .await
            .unwrap();
        assert_eq!(count, 12);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /plans/7/candidates?"));
        assert!(requests[0].to_lowercase().contains("cookie: _session=abc"));
    }

    #[tokio::test]
    async fn test_fetch_title() {
        let (base, server) =
            serve(vec![ok(r#"<h2 class="nav-title">Platform Engineer</h2>"#, "")]).await;
        let gh = client(&base, Arc::new(MemorySessionStore::new()));

        assert_eq!(gh.fetch_title(9).await.unwrap(), "Platform Engineer");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_login_redirect_is_not_authenticated() {
        let redirect = "HTTP/1.1 302 Found\r\nLocation: https://login.ubuntu.com/+login\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string();
        let (base, server) = serve(vec![redirect]).await;
        let gh = client(&base, Arc::new(MemorySessionStore::new()));

        let err = gh.login().await.unwrap_err();
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("login.ubuntu.com"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_exported_cookie_replaces_stale_session() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&SessionState::from_cookie_header("_session=stale; remember=1"))
            .unwrap();

        let redirect = "HTTP/1.1 302 Found\r\nLocation: https://login.ubuntu.com/+login\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string();
        let (base, server) = serve(vec![redirect]).await;
        let gh = GreenhouseClient::with_exported_session(
            ClientConfig {
                base_url: base,
                timeout: Duration::from_secs(5),
            },
            store.clone(),
            Some("_session=fresh"),
        )
        .unwrap();

        let err = gh.login().await.unwrap_err();
        assert!(err.to_string().contains(SESSION_ENV));

        let requests = server.await.unwrap();
        let sent = requests[0].to_lowercase();
        assert!(sent.contains("cookie: remember=1; _session=fresh"));
        assert!(!sent.contains("stale"));

        // the rejected session is not kept for the next run
        assert!(store.saved().unwrap().is_empty());
        assert!(gh.session().is_empty());
    }

    #[tokio::test]
    async fn test_login_saves_refreshed_cookies() {
        let store = Arc::new(MemorySessionStore::new());
        let (base, server) =
            serve(vec![ok("<html></html>", "Set-Cookie: _session=fresh; Path=/\r\n")]).await;
        let gh = client(&base, Arc::clone(&store));

        gh.login().await.unwrap();
        server.await.unwrap();

        let saved = store.saved().unwrap();
        assert_eq!(saved.cookie_header().as_deref(), Some("_session=fresh"));
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let response =
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops"
                .to_string();
        let (base, server) = serve(vec![response]).await;
        let gh = client(&base, Arc::new(MemorySessionStore::new()));

        let err = gh.fetch_count(1, &QuerySpec::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 500, .. }));
        server.await.unwrap();
    }
}
