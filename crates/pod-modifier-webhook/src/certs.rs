use std::{path::Path, sync::Arc};

use ::tracing::{info, warn};
use anyhow::{anyhow, Result};
use axum_server::tls_rustls::RustlsConfig;
use rustls::ServerConfig;
use rustls_pki_types::{pem::PemObject, CertificateDer, PrivateKeyDer};

use crate::config::TlsConfig;

/// Build the RustlsConfig used by the https server.
///
/// On linux the certificate and key files are watched with inotify: once
/// both of them have been rewritten the configuration is reloaded, without
/// restarting the server.
pub(crate) async fn create_tls_config(tls_config: &TlsConfig) -> Result<RustlsConfig> {
    let (cert, key) =
        load_server_cert_and_key(&tls_config.cert_file, &tls_config.key_file).await?;
    let server_config = build_tls_server_config(cert, key)?;
    let rustls_config = RustlsConfig::from_config(Arc::new(server_config));

    #[cfg(target_os = "linux")]
    watch_certificate_changes(tls_config.clone(), rustls_config.clone())?;

    Ok(rustls_config)
}

#[cfg(target_os = "linux")]
fn watch_certificate_changes(tls_config: TlsConfig, rustls_config: RustlsConfig) -> Result<()> {
    use ::tracing::error;
    use tokio_stream::StreamExt;

    let inotify =
        inotify::Inotify::init().map_err(|e| anyhow!("Cannot initialize inotify: {e}"))?;
    let cert_watch = inotify
        .watches()
        .add(&tls_config.cert_file, inotify::WatchMask::CLOSE_WRITE)
        .map_err(|e| anyhow!("Cannot watch certificate file: {e}"))?;
    let key_watch = inotify
        .watches()
        .add(&tls_config.key_file, inotify::WatchMask::CLOSE_WRITE)
        .map_err(|e| anyhow!("Cannot watch key file: {e}"))?;

    let buffer = [0; 1024];
    let stream = inotify
        .into_event_stream(buffer)
        .map_err(|e| anyhow!("Cannot create inotify event stream: {e}"))?;

    tokio::spawn(async move {
        tokio::pin!(stream);
        let mut cert_changed = false;
        let mut key_changed = false;

        while let Some(event) = stream.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!("Cannot read inotify event: {e}");
                    continue;
                }
            };

            if event.wd == cert_watch {
                info!("TLS certificate file has been modified");
                cert_changed = true;
            }
            if event.wd == key_watch {
                info!("TLS key file has been modified");
                key_changed = true;
            }

            // a certificate without its matching key cannot be served
            if !(cert_changed && key_changed) {
                continue;
            }
            cert_changed = false;
            key_changed = false;

            info!("Reloading TLS certificates");
            let server_config =
                load_server_cert_and_key(&tls_config.cert_file, &tls_config.key_file)
                    .await
                    .and_then(|(cert, key)| build_tls_server_config(cert, key));
            match server_config {
                Ok(server_config) => rustls_config.reload_from_config(Arc::new(server_config)),
                Err(e) => error!("Failed to reload TLS certificates: {e}"),
            }
        }
    });

    Ok(())
}

fn build_tls_server_config(
    cert: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<ServerConfig> {
    Ok(ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert, key)?)
}

// Load the server certificate and key
async fn load_server_cert_and_key(
    cert_file: &Path,
    key_file: &Path,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let cert_contents = tokio::fs::read(cert_file)
        .await
        .map_err(|e| anyhow!("Cannot read certificate file {}: {e}", cert_file.display()))?;
    let key_contents = tokio::fs::read(key_file)
        .await
        .map_err(|e| anyhow!("Cannot read key file {}: {e}", key_file.display()))?;

    let certs: Vec<CertificateDer<'static>> = CertificateDer::pem_slice_iter(&cert_contents)
        .filter_map(|it| {
            if let Err(ref e) = it {
                warn!("Cannot parse certificate: {e}");
            }
            it.ok()
        })
        .collect();
    if certs.len() != 1 {
        return Err(anyhow!(
            "Expected exactly one certificate in certificate file, found {}",
            certs.len()
        ));
    }

    let mut keys: Vec<PrivateKeyDer<'static>> = PrivateKeyDer::pem_slice_iter(&key_contents)
        .filter_map(|it| {
            if let Err(ref e) = it {
                warn!("Cannot parse private key: {e}");
            }
            it.ok()
        })
        .collect();
    if keys.len() != 1 {
        return Err(anyhow!(
            "Expected exactly one key in key file, found {}",
            keys.len()
        ));
    }

    Ok((certs, keys.remove(0)))
}
