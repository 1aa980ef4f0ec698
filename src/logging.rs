//! Structured logging setup.
//!
//! Events go to stderr through `tracing-subscriber`'s `fmt` layer, filtered
//! by the directive in `ESPRUINO_BUILD_LOG` (same syntax as `RUST_LOG`).

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "ESPRUINO_BUILD_LOG";

/// Directive used when [`LOG_ENV_VAR`] is unset, blank or invalid.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Resolve the filter directive from the environment.
///
/// Returns the directive and whether the configured value had to be
/// discarded.
#[must_use]
pub fn filter_directive<E: mockable::Env>(env: &E) -> (String, bool) {
    match env.string(LOG_ENV_VAR) {
        Some(directive) if directive.trim().is_empty() => (String::from(DEFAULT_DIRECTIVE), false),
        Some(directive) if EnvFilter::try_new(&directive).is_ok() => (directive, false),
        Some(_) => (String::from(DEFAULT_DIRECTIVE), true),
        None => (String::from(DEFAULT_DIRECTIVE), false),
    }
}

/// Install the global subscriber.
///
/// Uses `try_init`, so an embedding application that already installed a
/// subscriber keeps it. Returns whether this call installed one.
pub fn init_logging<E: mockable::Env>(env: &E) -> bool {
    let (directive, discarded) = filter_directive(env);
    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(EnvFilter::new(&directive)),
        )
        .try_init()
        .is_ok();

    if discarded {
        tracing::warn!(
            variable = LOG_ENV_VAR,
            fallback = DEFAULT_DIRECTIVE,
            "ignoring invalid log filter"
        );
    }
    if !installed {
        tracing::debug!("global tracing subscriber already installed");
    }
    installed
}
