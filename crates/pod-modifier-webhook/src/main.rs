use anyhow::{anyhow, Result};
use tracing::info;

use pod_modifier_webhook::{
    cli,
    config::{self, Config},
    tracing::setup_tracing,
    WebhookServer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;

    // Starting from rustls 0.22, each application must set its default crypto provider.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Cannot install the default crypto provider"))?;

    info!(service = config::SERVICE_NAME, "starting");

    let server = WebhookServer::new_from_config(config).await?;
    server.run().await
}
