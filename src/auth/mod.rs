//! GitHub OAuth code exchange, token caching, and request deduplication.
//!
//! Every API request carries a one-time `(githubCode, githubState)` pair. The
//! [`AuthGate`] turns that pair into a long-lived access token exactly once:
//! previously exchanged pairs are served from the [`TokenStore`], concurrent
//! requests for the same pair join a single in-flight exchange through the
//! [`PendingExchanges`] registry, and only a never-seen pair reaches the
//! provider's token endpoint.
//!
//! The pending registry is process-local; two instances racing on the same
//! pair will each call the provider and the provider's own code semantics
//! decide the outcome.

pub mod exchange;
pub mod gate;
pub mod pending;
pub mod store;

pub use exchange::{AccessToken, ExchangeError, GithubExchanger, OAuthExchanger};
pub use gate::{AuthGate, Credential, exchange_key, require_auth};
pub use pending::PendingExchanges;
pub use store::{CachedToken, JsonFileTokenStore, TokenStore};
