pub mod admission_request;
pub mod admission_response;
pub mod api;
mod certs;
pub mod cli;
pub mod config;
pub mod errors;
pub mod mutation;
pub mod tracing;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use ::tracing::{error, info, Level};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tower_http::trace::{self, TraceLayer};

use api::{
    handlers::{mutate_handler, readiness_handler},
    state::ApiServerState,
};
use config::Config;
use mutation::{annotation::OverrideParser, policy::NamespacePolicy, Mutator};

/// Time given to in-flight requests once a shutdown signal is received
const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WebhookServer {
    router: Router,
    addr: SocketAddr,
    tls_config: Option<RustlsConfig>,
}

impl WebhookServer {
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let tls_config = match &config.tls_config {
            Some(tls_config) => Some(certs::create_tls_config(tls_config).await?),
            None => None,
        };

        let mutator = Mutator::new(
            NamespacePolicy::new(config.excluded_namespaces.iter().cloned()),
            OverrideParser::new(config.annotation_key()),
        );
        info!(
            annotation = config.annotation_key().as_str(),
            excluded_namespaces = ?config.excluded_namespaces,
            "mutation configured"
        );

        let state = Arc::new(ApiServerState { mutator });

        let router = Router::new()
            .route("/mutate", post(mutate_handler))
            .route("/readiness", get(readiness_handler))
            .with_state(state)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
            );

        Ok(Self {
            router,
            addr: config.addr,
            tls_config,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self) -> Result<()> {
        let handle = Handle::new();
        tokio::spawn(shutdown_on_signal(handle.clone()));

        match self.tls_config {
            Some(tls_config) => {
                info!(address = %self.addr, "started HTTPS server");
                axum_server::bind_rustls(self.addr, tls_config)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            None => {
                info!(address = %self.addr, "started HTTP server");
                axum_server::bind(self.addr)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        }

        info!("webhook server stopped");
        Ok(())
    }
}

async fn shutdown_on_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("got OS shutdown signal, shutting down webhook server gracefully");
    handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
}
