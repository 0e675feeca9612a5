//! Logging for the receive engine
//!
//! Events are emitted inside a span named after the direction of the traffic they
//! describe. `incoming!` covers payloads read back from transient storage and
//! `outgoing!` covers PDUs posted to the relay. Everything else goes through
//! `internal!`.
//!
//! ```rust,ignore
//! incoming!("Read {} bytes from {}", payload.len(), path.display());
//! outgoing!(level = DEBUG, "POST {url}");
//! ```

use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Environment variable holding the level filter, e.g. `LOG_LEVEL=debug`
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

#[doc(hidden)]
#[macro_export]
macro_rules! __event_in_span {
    ($span:literal, $level:ident, $($msg:expr),*) => {{
        let span = $crate::tracing::span!($crate::tracing::Level::$level, $span);
        let _entered = span.enter();
        $crate::tracing::event!($crate::tracing::Level::$level, $($msg),*)
    }};
}

/// An acknowledgment or other PDU on its way to the relay (TRACE unless a level is given)
#[macro_export]
macro_rules! outgoing {
    (level = $level:ident, $($msg:expr),*) => {
        $crate::__event_in_span!("outgoing", $level, $($msg),*)
    };
    ($($msg:expr),*) => {
        $crate::__event_in_span!("outgoing", TRACE, $($msg),*)
    };
}

/// A fetched payload entering the engine (TRACE unless a level is given)
#[macro_export]
macro_rules! incoming {
    (level = $level:ident, $($msg:expr),*) => {
        $crate::__event_in_span!("incoming", $level, $($msg),*)
    };
    ($($msg:expr),*) => {
        $crate::__event_in_span!("incoming", TRACE, $($msg),*)
    };
}

#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:expr),*) => {
        $crate::__event_in_span!("internal", $level, $($msg),*)
    };
    ($($msg:expr),*) => {
        $crate::__event_in_span!("internal", TRACE, $($msg),*)
    };
}

const fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    }
}

/// Parse a level filter, falling back to the build's default when absent or invalid
#[must_use]
pub fn level_from(value: Option<&str>) -> LevelFilter {
    let Some(value) = value else {
        return default_level();
    };

    LevelFilter::from_str(value.trim()).unwrap_or_else(|_| {
        eprintln!(
            "Invalid {LOG_LEVEL_ENV} '{value}', using {}",
            default_level()
        );
        default_level()
    })
}

fn is_engine_target(target: &str) -> bool {
    target.starts_with("mmsrx")
}

/// Install the global subscriber
///
/// Only events from the engine's own crates pass the filter. A subscriber that is
/// already installed is left in place.
pub fn init() {
    let level = level_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref());

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(ChronoUtc::rfc_3339())
        .with_filter(level)
        .with_filter(FilterFn::new(|metadata| is_engine_target(metadata.target())));

    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        tracing::debug!("Subscriber already installed");
    }
}
