//! Per-request authentication orchestration.
//!
//! `AuthGate` resolves every inbound request to a credential before any
//! protected handler runs: from the persistent store, from an in-flight
//! exchange, or by starting a new exchange. State machine per exchange key:
//! unseen → (cache hit | pending → settled success / settled failure).

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;

use crate::error::{AppError, Result};

use super::exchange::OAuthExchanger;
use super::pending::PendingExchanges;
use super::store::{CachedToken, TokenStore};

/// Upper bound on buffered request bodies in the auth middleware.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default timeout for one provider exchange.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// The cache key of one OAuth exchange attempt. The one-time code plus the
/// anti-replay state nonce make it unique per login attempt.
pub fn exchange_key(code: &str, state: &str) -> String {
    format!("{code}-{state}")
}

/// Resolved credential attached to authenticated requests.
#[derive(Clone)]
pub struct Credential {
    pub access_token: String,
}

impl From<CachedToken> for Credential {
    fn from(token: CachedToken) -> Self {
        Self {
            access_token: token.access_token,
        }
    }
}

// Custom Debug keeps token values out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Authentication fields present in every protected request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    #[serde(default)]
    github_code: String,
    #[serde(default)]
    github_state: String,
}

/// Orchestrates the token store, the pending-exchange registry, and the
/// OAuth exchanger.
pub struct AuthGate {
    store: Arc<dyn TokenStore>,
    exchanger: Arc<dyn OAuthExchanger>,
    pending: PendingExchanges,
}

impl AuthGate {
    pub fn new(store: Arc<dyn TokenStore>, exchanger: Arc<dyn OAuthExchanger>) -> Self {
        Self::with_exchange_timeout(store, exchanger, DEFAULT_EXCHANGE_TIMEOUT)
    }

    pub fn with_exchange_timeout(
        store: Arc<dyn TokenStore>,
        exchanger: Arc<dyn OAuthExchanger>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            exchanger,
            pending: PendingExchanges::new(timeout),
        }
    }

    /// Resolve `(code, state)` to a credential.
    ///
    /// Empty inputs fail before any storage or network access. A previously
    /// exchanged pair is served from the store with no provider call; an
    /// unseen pair triggers exactly one exchange regardless of how many
    /// requests race on it, and exactly one durable store write on success.
    pub async fn authenticate(&self, code: &str, state: &str) -> Result<Credential> {
        if code.is_empty() || state.is_empty() {
            return Err(AppError::MissingAuth);
        }

        let key = exchange_key(code, state);

        if let Some(token) = self.store.get(&key).await? {
            tracing::debug!("serving credential from token store");
            return Ok(token.into());
        }

        let exchange = {
            let exchanger = Arc::clone(&self.exchanger);
            let store = Arc::clone(&self.store);
            let code = code.to_string();
            let state = state.to_string();
            let key = key.clone();
            async move {
                let token = exchanger.exchange(&code, &state).await?;
                let cached = CachedToken {
                    access_token: token.access_token,
                };
                store
                    .put(&key, &cached)
                    .await
                    .map_err(|err| super::exchange::ExchangeError::Store(err.to_string()))?;
                tracing::info!("exchanged authorization code and persisted token");
                Ok(cached)
            }
        };

        let token = self.pending.join_or_start(&key, exchange).await?;
        Ok(token.into())
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Axum middleware: authenticate the request body's `(githubCode,
/// githubState)` pair and attach the resulting [`Credential`] as a request
/// extension. The buffered body is restored for the downstream handler.
pub async fn require_auth(
    State(gate): State<Arc<AuthGate>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| AppError::Internal(format!("unable to read request body: {err}")))?;

    let payload: AuthPayload = serde_json::from_slice(&bytes).unwrap_or_default();
    let credential = gate
        .authenticate(&payload.github_code, &payload.github_state)
        .await?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(credential);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::super::exchange::{AccessToken, ExchangeError};
    use super::*;

    /// In-memory store that counts reads and writes.
    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, CachedToken>>,
        gets: AtomicUsize,
        puts: AtomicUsize,
    }

    impl MemoryStore {
        fn with_token(key: &str, value: &str) -> Self {
            let store = Self::default();
            store.entries.lock().unwrap().insert(
                key.to_string(),
                CachedToken {
                    access_token: value.to_string(),
                },
            );
            store
        }
    }

    #[async_trait]
    impl TokenStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<CachedToken>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn put(&self, key: &str, token: &CachedToken) -> Result<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), token.clone());
            Ok(())
        }
    }

    /// Scripted exchanger that counts provider calls.
    struct ScriptedExchanger {
        calls: AtomicUsize,
        outcome: std::result::Result<String, ExchangeError>,
        delay: Duration,
    }

    impl ScriptedExchanger {
        fn granting(token: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(token.to_string()),
                delay: Duration::ZERO,
            }
        }

        fn granting_after(token: &str, delay: Duration) -> Self {
            Self {
                delay,
                ..Self::granting(token)
            }
        }

        fn denying(error: &str, description: &str, uri: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Err(ExchangeError::Provider {
                    error: error.to_string(),
                    description: description.to_string(),
                    uri: uri.to_string(),
                }),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl OAuthExchanger for ScriptedExchanger {
        async fn exchange(
            &self,
            _code: &str,
            _state: &str,
        ) -> std::result::Result<AccessToken, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome
                .clone()
                .map(|access_token| AccessToken { access_token })
        }
    }

    fn gate(store: Arc<MemoryStore>, exchanger: Arc<ScriptedExchanger>) -> AuthGate {
        AuthGate::new(store, exchanger)
    }

    #[tokio::test]
    async fn missing_fields_fail_without_any_io() {
        let store = Arc::new(MemoryStore::default());
        let exchanger = Arc::new(ScriptedExchanger::granting("gho_abc"));
        let gate = gate(Arc::clone(&store), Arc::clone(&exchanger));

        for (code, state) in [("", "s1"), ("c1", ""), ("", "")] {
            let err = gate.authenticate(code, state).await.unwrap_err();
            assert!(matches!(err, AppError::MissingAuth));
        }

        assert_eq!(store.gets.load(Ordering::SeqCst), 0);
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cache_hit_skips_the_provider() {
        let store = Arc::new(MemoryStore::with_token("c1-s1", "gho_cached"));
        let exchanger = Arc::new(ScriptedExchanger::granting("gho_fresh"));
        let gate = gate(Arc::clone(&store), Arc::clone(&exchanger));

        let credential = gate.authenticate("c1", "s1").await.unwrap();
        assert_eq!(credential.access_token, "gho_cached");
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn new_pair_exchanges_once_and_persists_once() {
        let store = Arc::new(MemoryStore::default());
        let exchanger = Arc::new(ScriptedExchanger::granting("gho_new"));
        let gate = gate(Arc::clone(&store), Arc::clone(&exchanger));

        let credential = gate.authenticate("c1", "s1").await.unwrap();
        assert_eq!(credential.access_token, "gho_new");
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn replayed_pair_is_served_from_the_store() {
        let store = Arc::new(MemoryStore::default());
        let exchanger = Arc::new(ScriptedExchanger::granting("gho_new"));
        let gate = gate(Arc::clone(&store), Arc::clone(&exchanger));

        let first = gate.authenticate("c1", "s1").await.unwrap();
        let second = gate.authenticate("c1", "s1").await.unwrap();

        assert_eq!(first.access_token, second.access_token);
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_trigger_exactly_one_exchange() {
        let store = Arc::new(MemoryStore::default());
        let exchanger = Arc::new(ScriptedExchanger::granting_after(
            "gho_shared",
            Duration::from_millis(50),
        ));
        let gate = Arc::new(gate(Arc::clone(&store), Arc::clone(&exchanger)));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(
                async move { gate.authenticate("c1", "s1").await },
            ));
        }

        for handle in handles {
            let credential = handle.await.unwrap().unwrap();
            assert_eq!(credential.access_token, "gho_shared");
        }

        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_error_carries_description_and_uri_and_writes_nothing() {
        let store = Arc::new(MemoryStore::default());
        let exchanger = Arc::new(ScriptedExchanger::denying(
            "bad_verification_code",
            "The code passed is incorrect or expired.",
            "https://docs.github.com/apps",
        ));
        let gate = gate(Arc::clone(&store), Arc::clone(&exchanger));

        let err = gate.authenticate("c1", "s1").await.unwrap_err();
        match err {
            AppError::Provider {
                description, uri, ..
            } => {
                assert_eq!(description, "The code passed is incorrect or expired.");
                assert_eq!(uri, "https://docs.github.com/apps");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_exchange_can_be_retried() {
        let store = Arc::new(MemoryStore::default());
        let exchanger = Arc::new(ScriptedExchanger::denying("bad_verification_code", "", ""));
        let gate = gate(Arc::clone(&store), Arc::clone(&exchanger));

        assert!(gate.authenticate("c1", "s1").await.is_err());
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The pending slot was freed; a resubmission reaches the provider
        // again instead of observing a stale failure.
        assert!(gate.authenticate("c1", "s1").await.is_err());
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn hung_provider_times_out() {
        let store = Arc::new(MemoryStore::default());
        let exchanger = Arc::new(ScriptedExchanger::granting_after(
            "gho_slow",
            Duration::from_secs(60),
        ));
        let gate = AuthGate::with_exchange_timeout(
            Arc::clone(&store) as Arc<dyn TokenStore>,
            Arc::clone(&exchanger) as Arc<dyn OAuthExchanger>,
            Duration::from_millis(50),
        );

        let err = gate.authenticate("c1", "s1").await.unwrap_err();
        assert!(matches!(err, AppError::ExchangeTimeout(_)));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn exchange_key_joins_code_and_state() {
        assert_eq!(exchange_key("c1", "s1"), "c1-s1");
    }

    #[test]
    fn credential_debug_redacts_token() {
        let credential = Credential {
            access_token: "gho_secret".to_string(),
        };
        let output = format!("{credential:?}");
        assert!(!output.contains("gho_secret"));
    }
}
