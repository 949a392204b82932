//! Tracing initialisation for the `ttreco` binary and benchmarks.
//!
//! Per-event outcomes (`hadronic_w.reconstructed`, `ttbar.reconstructed`,
//! `reconstruction.failed`) are emitted at `debug`, `event.rejected` at
//! `warn`, the `batch.finished` summary at `info` and solver detail at
//! `trace`. The default `info` level therefore prints rejected events and one
//! summary per batch, and `--verbose` (or
//! `RUST_LOG=ttreco_core=debug`) prints one line per reconstructor per event.
//!
//! Everything is written to stderr. Stdout carries the JSON outcomes of
//! `ttreco reconstruct`, which must stay parseable when piped.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: the workspace crates at `level`,
/// everything else at `warn`.
fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,ttreco_core={level},ttreco={level}")
}

/// Initialise the global tracing subscriber. Only the first call in a
/// process takes effect.
///
/// * `json`: newline-delimited JSON records, with targets kept so a log
///   pipeline can split core events from CLI lines.
/// * `level`: verbosity of the `ttreco` crates when `RUST_LOG` is unset.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let json_layer = json.then(|| fmt::layer().with_writer(std::io::stderr).json());
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_quiet_dependencies() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,ttreco_core=debug,ttreco=debug"
        );
        assert!(EnvFilter::try_new(default_directives(Level::INFO)).is_ok());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
        tracing::debug!(event = "telemetry.test");
    }
}
