use std::io;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::UtcTime},
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const LOG_LEVEL: &str = "PHOTOVERSE_LOG_LEVEL";
const LOG_FORMAT: &str = "PHOTOVERSE_LOG_FORMAT";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_environment() -> Self {
        match std::env::var(LOG_FORMAT) {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

pub(crate) fn init() -> Result<()> {
    let env_filter = env_filter_merge_from_environment("info", LOG_LEVEL)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match LogFormat::from_environment() {
        LogFormat::Json => fmt_layer.json().with_filter(env_filter).boxed(),
        LogFormat::Text => fmt_layer.with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    Ok(())
}

fn env_filter_merge_from_environment(
    default_directives: &'static str,
    env_var: &'static str,
) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .parse(default_directives)
        .with_context(|| anyhow!("Default directives were invalid: {default_directives}"))?;

    if let Ok(env_value) = std::env::var(env_var) {
        for env_directive in env_value.split(',') {
            match env_directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("WARN ignoring log directive: {env_directive:?}: {err}"),
            }
        }
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        assert!(env_filter_merge_from_environment("info", "PHOTOVERSE_TEST_UNSET_LEVEL").is_ok());
        assert!(
            env_filter_merge_from_environment("warn,photoverse=debug", "PHOTOVERSE_TEST_UNSET_LEVEL")
                .is_ok()
        );
    }

    #[test]
    fn log_format_defaults_to_text() {
        std::env::remove_var(LOG_FORMAT);
        assert_eq!(LogFormat::from_environment(), LogFormat::Text);
    }
}
