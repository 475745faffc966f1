//! Editor connector server.
//!
//! # Usage
//! ```bash
//! editor-connector --workspace-root /srv/workspaces \
//!     --client-id Iv1.e422a5bfa1197db1 \
//!     --client-secret-file ./secrets/client-secret.secret
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use editor_connector::auth::{AuthGate, GithubExchanger, JsonFileTokenStore};
use editor_connector::github::GITHUB_API_BASE;
use editor_connector::routes::{self, AppState};
use editor_connector::storage::StorageManager;

/// GitHub-backed content connector for the web editor
#[derive(Parser)]
#[command(name = "editor-connector")]
#[command(about = "GitHub-backed content connector API", long_about = None)]
struct Cli {
    /// Directory holding branch working copies (<root>/<org>/<project>/<branch>)
    #[arg(long, value_name = "DIR")]
    workspace_root: PathBuf,

    /// GitHub OAuth app client id
    #[arg(long)]
    client_id: String,

    /// File containing the GitHub OAuth app client secret
    #[arg(long, value_name = "FILE", default_value = "./secrets/client-secret.secret")]
    client_secret_file: PathBuf,

    /// Path of the persistent token store
    #[arg(long, value_name = "FILE", default_value = "./auth-tokens.json")]
    token_store: PathBuf,

    /// Port to run the server on
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client_secret = fs::read_to_string(&cli.client_secret_file)
        .with_context(|| {
            format!(
                "unable to read client secret from {}",
                cli.client_secret_file.display()
            )
        })?
        .trim()
        .to_string();

    let gate = Arc::new(AuthGate::new(
        Arc::new(JsonFileTokenStore::new(&cli.token_store)),
        Arc::new(GithubExchanger::new(&cli.client_id, &client_secret)),
    ));

    let state = AppState {
        gate,
        storage: StorageManager::new(&cli.workspace_root),
        api_base: GITHUB_API_BASE.to_string(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("unable to bind {addr}"))?;

    tracing::info!(
        workspace_root = %cli.workspace_root.display(),
        %addr,
        "editor connector listening"
    );

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("failed to listen for ctrl-c");
        }
        tracing::info!("shutting down");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
