/// Failures while bringing the service up. Transaction outcomes never use
/// this type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unable to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid logging directive: {0}")]
    LogDirective(#[from] tracing_subscriber::filter::ParseError),
    #[error("Unable to install the log subscriber: {0}")]
    LoggerInit(#[from] tracing_subscriber::util::TryInitError),
}
