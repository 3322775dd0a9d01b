use anyhow::{anyhow, Result};
use clap::ArgMatches;
use lazy_static::lazy_static;
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::mutation::annotation::POD_DEFINITION_SUFFIX;
use crate::mutation::policy::DEFAULT_EXCLUDED_NAMESPACES;

pub static SERVICE_NAME: &str = "pod-modifier-webhook";
pub const DEFAULT_ANNOTATION: &str = "pod-modifier.solace.com/modify";

lazy_static! {
    pub(crate) static ref HOSTNAME: String =
        std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("unknown"));
}

pub struct Config {
    pub addr: SocketAddr,
    pub tls_config: Option<TlsConfig>,
    pub annotation: String,
    pub excluded_namespaces: BTreeSet<String>,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

#[derive(Clone, Debug)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        // init some variables based on the cli parameters
        let addr = api_bind_address(matches)?;
        let tls_config = tls_config(matches)?;

        let annotation = matches
            .get_one::<String>("annotation")
            .expect("This should not happen, there's a default value for annotation")
            .to_owned();
        if annotation.is_empty() {
            return Err(anyhow!("error parsing arguments: --annotation cannot be empty"));
        }

        let log_level = matches
            .get_one::<String>("log-level")
            .expect("This should not happen, there's a default value for log-level")
            .to_owned();
        let log_fmt = matches
            .get_one::<String>("log-fmt")
            .expect("This should not happen, there's a default value for log-fmt")
            .to_owned();
        let log_no_color = matches
            .get_one::<bool>("log-no-color")
            .expect("clap should have assigned a default value")
            .to_owned();

        Ok(Self {
            addr,
            tls_config,
            annotation,
            excluded_namespaces: default_excluded_namespaces(),
            log_level,
            log_fmt,
            log_no_color,
        })
    }

    /// The annotation holding the override document
    pub fn annotation_key(&self) -> String {
        format!("{}{}", self.annotation, POD_DEFINITION_SUFFIX)
    }
}

pub fn default_excluded_namespaces() -> BTreeSet<String> {
    DEFAULT_EXCLUDED_NAMESPACES
        .iter()
        .map(|namespace| namespace.to_string())
        .collect()
}

fn api_bind_address(matches: &clap::ArgMatches) -> Result<SocketAddr> {
    format!(
        "{}:{}",
        matches
            .get_one::<String>("address")
            .expect("This should not happen, there's a default value for address"),
        matches
            .get_one::<String>("port")
            .expect("This should not happen, there's a default value for port")
    )
    .parse()
    .map_err(|e| anyhow!("error parsing arguments: {}", e))
}

fn tls_config(matches: &clap::ArgMatches) -> Result<Option<TlsConfig>> {
    let cert_file = matches
        .get_one::<String>("tls-cert-file")
        .cloned()
        .unwrap_or_default();
    let key_file = matches
        .get_one::<String>("tls-key-file")
        .cloned()
        .unwrap_or_default();

    match (cert_file.is_empty(), key_file.is_empty()) {
        (true, true) => Ok(None),
        (false, false) => Ok(Some(TlsConfig {
            cert_file: PathBuf::from(cert_file),
            key_file: PathBuf::from(key_file),
        })),
        _ => Err(anyhow!("error parsing arguments: either both --tls-cert-file and --tls-key-file must be provided, or neither")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli;
    use rstest::rstest;

    fn config_from(args: &[&str]) -> Result<Config> {
        let argv = std::iter::once("pod-modifier-webhook").chain(args.iter().copied());
        let matches = cli::build_cli()
            .try_get_matches_from(argv)
            .expect("arguments should be accepted by clap");
        Config::from_args(&matches)
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.addr, "0.0.0.0:443".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.annotation_key(),
            "pod-modifier.solace.com/modify.podDefinition"
        );
        assert_eq!(
            config.excluded_namespaces,
            BTreeSet::from([String::from("kube-public"), String::from("kube-system")])
        );
        let tls_config = config.tls_config.expect("TLS should be enabled by default");
        assert_eq!(tls_config.cert_file, PathBuf::from("/etc/webhook/certs/cert.pem"));
        assert_eq!(tls_config.key_file, PathBuf::from("/etc/webhook/certs/key.pem"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_fmt, "text");
    }

    #[test]
    fn custom_annotation() {
        let config = config_from(&["--annotation", "example.com/resources"]).unwrap();

        assert_eq!(config.annotation_key(), "example.com/resources.podDefinition");
    }

    #[test]
    fn plain_http_when_no_certificate_is_given() {
        let config = config_from(&["--tls-cert-file", "", "--tls-key-file", ""]).unwrap();

        assert!(config.tls_config.is_none());
    }

    #[rstest]
    #[case::only_key(&["--tls-cert-file", ""])]
    #[case::only_cert(&["--tls-key-file", ""])]
    fn incomplete_tls_configuration(#[case] args: &[&str]) {
        assert!(config_from(args).is_err());
    }

    #[rstest]
    #[case::bad_port(&["--port", "https"])]
    #[case::bad_address(&["--addr", "localhost:8443"])]
    #[case::empty_annotation(&["--annotation", ""])]
    fn invalid_arguments(#[case] args: &[&str]) {
        assert!(config_from(args).is_err());
    }
}
