use std::net::SocketAddr;

use axum::Router;
use pod_modifier_webhook::{
    config::{default_excluded_namespaces, Config, DEFAULT_ANNOTATION},
    WebhookServer,
};

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        tls_config: None,
        annotation: DEFAULT_ANNOTATION.to_owned(),
        excluded_namespaces: default_excluded_namespaces(),
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) async fn app(config: Config) -> Router {
    let server = WebhookServer::new_from_config(config).await.unwrap();

    server.router()
}
