//! Session gateway: owns the bearer credential and the 401 interceptor.
//!
//! Every request to the protected API is stamped through [`SessionGateway::authorize`]
//! and every response is passed through [`SessionGateway::observe`], so a
//! server-declared session invalidation (HTTP 401) clears the credential and
//! broadcasts [`SessionEvent::Expired`] before any caller can act on the body.

use crate::config::ClientConfig;
use crate::error::ClientError;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Session lifecycle notifications, broadcast on a per-gateway watch channel.
///
/// The channel lives exactly as long as the gateway, so the interceptor is
/// installed once per session lifetime and removed on drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// No credential held
    LoggedOut,
    /// Credential present and stamped onto outgoing requests
    Authenticated,
    /// Server returned 401; credential has been cleared
    Expired,
}

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Durable slot holding the session token (one file, absent = logged out).
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted token, if any. An empty file counts as absent.
    pub fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Persist the token, creating parent directories as needed.
    pub fn save(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        Ok(())
    }

    /// Remove the persisted token; absent file is not an error.
    pub fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Holds the bearer credential and guarantees every protected request
/// carries it; detects server-declared invalidity and forces a clean logout.
#[derive(Debug)]
pub struct SessionGateway {
    http: reqwest::Client,
    api_url: String,
    store: TokenStore,
    token: RwLock<Option<String>>,
    events_tx: watch::Sender<SessionEvent>,
}

impl SessionGateway {
    /// Create a gateway, mirroring any previously persisted token into the
    /// in-memory credential.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let store = TokenStore::new(config.token_path.clone());
        let token = store.load();
        let initial = if token.is_some() {
            SessionEvent::Authenticated
        } else {
            SessionEvent::LoggedOut
        };
        let (events_tx, _) = watch::channel(initial);

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            store,
            token: RwLock::new(token),
            events_tx,
        })
    }

    /// Subscribe to session lifecycle events (used by the UI shell to leave
    /// the dashboard when the session expires).
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Shared HTTP client, cloned by the REST layer so gateway and API calls
    /// ride one connection pool.
    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// True iff a credential is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Submit credentials form-encoded to the token endpoint.
    ///
    /// Returns `false` on any failure; rejected credentials and network
    /// faults are deliberately indistinguishable to the caller. The actual
    /// cause is logged at debug level for operators.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let url = format!("{}/auth/token", self.api_url);
        let form = [("username", username), ("password", password)];

        let response = match self.http.post(&url).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("login request failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            debug!("login rejected with status {}", response.status());
            return false;
        }

        let body: TokenResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                debug!("login response parse failed: {}", e);
                return false;
            }
        };

        if let Err(e) = self.store.save(&body.access_token) {
            // In-memory session still works for this page lifetime
            warn!("failed to persist session token: {}", e);
        }
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(body.access_token);
        }
        let _ = self.events_tx.send(SessionEvent::Authenticated);
        info!("session authenticated");
        true
    }

    /// Clear the durable token and the in-memory credential; idempotent.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!("failed to clear persisted token: {}", e);
        }
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
        let _ = self.events_tx.send(SessionEvent::LoggedOut);
    }

    /// Stamp the current bearer credential onto an outgoing request.
    /// Requests go out unstamped when no credential is held.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.token.read().ok().and_then(|guard| guard.clone());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Response interceptor: every API response passes through here.
    ///
    /// A 401 clears the session exactly as [`SessionGateway::logout`] does,
    /// broadcasts [`SessionEvent::Expired`], and propagates
    /// [`ClientError::SessionExpired`] so the caller never acts on the body.
    pub fn observe(&self, response: Response) -> Result<Response, ClientError> {
        self.check_status(response.status())?;
        Ok(response)
    }

    /// Status-only half of [`SessionGateway::observe`].
    pub fn check_status(&self, status: StatusCode) -> Result<(), ClientError> {
        if status == StatusCode::UNAUTHORIZED {
            self.expire();
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Clear the session after a 401. The `Expired` event fires only on the
    /// first 401 of a session; later 401s from the same dying batch find the
    /// credential already gone and stay silent.
    fn expire(&self) {
        let had_token = self
            .token
            .write()
            .map(|mut guard| guard.take().is_some())
            .unwrap_or(false);

        if had_token {
            if let Err(e) = self.store.clear() {
                warn!("failed to clear persisted token: {}", e);
            }
            let _ = self.events_tx.send(SessionEvent::Expired);
            info!("session expired, credential cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_token_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("botpulse-test-{}-{}", tag, std::process::id()))
    }

    fn test_gateway(tag: &str) -> SessionGateway {
        let path = temp_token_path(tag);
        let _ = std::fs::remove_file(&path);
        let config = ClientConfig::new("http://127.0.0.1:1").with_token_path(path);
        SessionGateway::new(&config).unwrap()
    }

    #[test]
    fn test_token_store_roundtrip() {
        let store = TokenStore::new(temp_token_path("store"));
        store.clear().unwrap();

        assert_eq!(store.load(), None);
        store.save("abc123").unwrap();
        assert_eq!(store.load(), Some("abc123".to_string()));
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Idempotent on an already-absent file
        store.clear().unwrap();
    }

    #[test]
    fn test_authorize_stamps_bearer_only_when_token_present() {
        let gateway = test_gateway("authorize");
        let client = reqwest::Client::new();

        let unstamped = gateway
            .authorize(client.get("http://127.0.0.1:1/stats/performance"))
            .build()
            .unwrap();
        assert!(unstamped.headers().get("authorization").is_none());

        if let Ok(mut guard) = gateway.token.write() {
            *guard = Some("tok".to_string());
        }
        let stamped = gateway
            .authorize(client.get("http://127.0.0.1:1/stats/performance"))
            .build()
            .unwrap();
        assert_eq!(
            stamped.headers().get("authorization").unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn test_observe_401_clears_session_and_fires_once() {
        let gateway = test_gateway("expire");
        gateway.store.save("tok").unwrap();
        if let Ok(mut guard) = gateway.token.write() {
            *guard = Some("tok".to_string());
        }
        let mut events = gateway.subscribe();
        events.mark_unchanged();

        let err = gateway.check_status(StatusCode::UNAUTHORIZED).unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        assert!(!gateway.is_authenticated());
        assert_eq!(gateway.store.load(), None);
        assert!(events.has_changed().unwrap());
        assert_eq!(*events.borrow_and_update(), SessionEvent::Expired);

        // Second 401 from the same dying batch: error propagates, no re-fire
        let err = gateway.check_status(StatusCode::UNAUTHORIZED).unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        assert!(!events.has_changed().unwrap());
    }

    #[test]
    fn test_observe_other_statuses() {
        let gateway = test_gateway("status");
        assert!(gateway.check_status(StatusCode::OK).is_ok());
        match gateway.check_status(StatusCode::SERVICE_UNAVAILABLE) {
            Err(ClientError::Api { status }) => assert_eq!(status, 503),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_logout_is_idempotent() {
        let gateway = test_gateway("logout");
        gateway.store.save("tok").unwrap();
        if let Ok(mut guard) = gateway.token.write() {
            *guard = Some("tok".to_string());
        }

        gateway.logout();
        assert!(!gateway.is_authenticated());
        assert_eq!(gateway.store.load(), None);
        gateway.logout();
        assert!(!gateway.is_authenticated());
    }
}
