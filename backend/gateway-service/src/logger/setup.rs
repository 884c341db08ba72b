//!
//! Setup logging subsystem.
//!

use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::config::{Log, LogFormat};
use crate::error::ConfigurationError;

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG`, when set, overrides the configured level and directive.
pub fn setup(config: &Log) -> Result<(), ConfigurationError> {
    let console = &config.console;
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::builder().parse(directives)?,
        _ => EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(console.level.into_level()).into())
            .parse(console.filtering_directive.as_deref().unwrap_or_default())?,
    };

    let console_layer = console.enabled.then(|| match console.log_format {
        LogFormat::Default => fmt::layer()
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .pretty()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    });

    tracing_subscriber::registry()
        .with(console_layer.map(|layer| layer.with_filter(filter)))
        .try_init()?;

    tracing::debug!(
        enabled = console.enabled,
        format = ?console.log_format,
        "logger initialised"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_once() {
        let config = Log::default();
        assert!(setup(&config).is_ok());
        assert!(matches!(
            setup(&config),
            Err(ConfigurationError::LoggerInit(_))
        ));
    }
}
