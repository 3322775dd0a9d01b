use clap::builder::PossibleValue;
use clap::{crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("POD_MODIFIER_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("POD_MODIFIER_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("POD_MODIFIER_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("443")
            .env("POD_MODIFIER_PORT")
            .help("Webhook server port"),
        Arg::new("tls-cert-file")
            .long("tls-cert-file")
            .value_name("CERT_FILE")
            .default_value("/etc/webhook/certs/cert.pem")
            .env("POD_MODIFIER_TLS_CERT_FILE")
            .help("File containing the x509 certificate for HTTPS, empty to serve plain HTTP"),
        Arg::new("tls-key-file")
            .long("tls-key-file")
            .value_name("KEY_FILE")
            .default_value("/etc/webhook/certs/key.pem")
            .env("POD_MODIFIER_TLS_KEY_FILE")
            .help("File containing the x509 private key matching --tls-cert-file"),
        Arg::new("annotation")
            .long("annotation")
            .value_name("ANNOTATION")
            .default_value(crate::config::DEFAULT_ANNOTATION)
            .env("POD_MODIFIER_ANNOTATION")
            .help("Prefix of the annotation holding the pod definition overrides, the document is read from <ANNOTATION>.podDefinition"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .author(crate_authors!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
