//! Process-local deduplication of in-flight token exchanges.
//!
//! Concurrent requests carrying the same exchange key must produce exactly one
//! provider call. The first caller registers a settlement channel under the
//! key and spawns the exchange; later callers find the channel and await the
//! same settlement. Registration happens under the map lock, so a second
//! lookup can never miss an exchange that is about to be dispatched.
//!
//! Entries self-clean: the slot is removed when the exchange settles, success
//! or failure, and a timeout settles (and frees) a hung exchange so waiters
//! are not parked forever.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use super::exchange::ExchangeError;
use super::store::CachedToken;

type Settlement = Result<CachedToken, ExchangeError>;
type SettlementRx = watch::Receiver<Option<Settlement>>;

/// Registry of in-flight exchanges keyed by exchange key.
#[derive(Debug)]
pub struct PendingExchanges {
    inner: Arc<Mutex<HashMap<String, SettlementRx>>>,
    timeout: Duration,
}

impl PendingExchanges {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    /// Number of exchanges currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// Await the settlement for `key`, starting `exchange` only when no
    /// exchange is already in flight for that key.
    pub async fn join_or_start<F>(&self, key: &str, exchange: F) -> Settlement
    where
        F: Future<Output = Settlement> + Send + 'static,
    {
        let rx = {
            let mut pending = self
                .inner
                .lock()
                .map_err(|_| ExchangeError::Aborted("pending registry lock poisoned".into()))?;

            if let Some(rx) = pending.get(key) {
                tracing::debug!(key, "joining in-flight token exchange");
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                pending.insert(key.to_string(), rx.clone());

                let registry = Arc::clone(&self.inner);
                let key = key.to_string();
                let timeout = self.timeout;
                tokio::spawn(async move {
                    let settlement = match tokio::time::timeout(timeout, exchange).await {
                        Ok(settlement) => settlement,
                        Err(_) => {
                            tracing::warn!(key, "token exchange timed out");
                            Err(ExchangeError::TimedOut(timeout.as_secs()))
                        }
                    };
                    // Deliver before freeing the slot so joiners holding the
                    // receiver always observe a settlement.
                    let _ = tx.send(Some(settlement));
                    if let Ok(mut pending) = registry.lock() {
                        pending.remove(&key);
                    }
                });
                rx
            }
        };

        let mut rx = rx;
        match rx.wait_for(|settlement| settlement.is_some()).await {
            Ok(settlement) => settlement
                .clone()
                .unwrap_or_else(|| Err(ExchangeError::Aborted("empty settlement".into()))),
            Err(_) => Err(ExchangeError::Aborted(
                "exchange task dropped before settling".into(),
            )),
        }
    }
}
