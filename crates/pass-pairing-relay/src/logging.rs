//! Tracing subscriber setup from the `logging` config section.

use anyhow::{anyhow, bail};
use tracing_subscriber::EnvFilter;

use pass_pairing_core::config::LoggingConfig;

/// Filter directives from config: base level first, then per-crate overrides.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = vec![config.level.clone().unwrap_or_else(|| "info".into())];
    directives.extend(config.filters.iter().cloned());
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` takes priority over config.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let json = match config.format.as_str() {
        "plain" => false,
        "json" => true,
        other => bail!("Unknown log format: {other}"),
    };
    let to_stdout = match config.output.as_str() {
        "stderr" => false,
        "stdout" => true,
        other => bail!("Unknown log output: {other}"),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match (json, to_stdout) {
        (true, true) => builder.json().with_writer(std::io::stdout).try_init(),
        (true, false) => builder.json().with_writer(std::io::stderr).try_init(),
        (false, true) => builder.with_writer(std::io::stdout).try_init(),
        (false, false) => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
