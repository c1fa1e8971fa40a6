//! Log output for suite runs.
//!
//! `RUST_LOG` picks the filter (default [`DEFAULT_FILTER`]).
//! `SAUCE_E2E_LOG_FORMAT=json` switches to one JSON object per event.
//! [`init`] writes to stdout; [`init_for_tests`] routes through libtest's
//! capture so output only shows for failing tests.

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "sauce_e2e=info";

/// Env var selecting the output format
pub const LOG_FORMAT_ENV: &str = "SAUCE_E2E_LOG_FORMAT";

/// Where formatted events go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Stdout,
    TestCapture,
}

impl Sink {
    fn writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::TestCapture => BoxMakeWriter::new(TestWriter::new()),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"))
}

/// Install the global subscriber from the environment.
///
/// Returns `false` if a subscriber was already installed; calling this more
/// than once is harmless.
pub fn init() -> bool {
    install(env_filter(), json_requested(), Sink::Stdout)
}

/// Like [`init`], but output goes through the test harness's capture
pub fn init_for_tests() -> bool {
    install(env_filter(), json_requested(), Sink::TestCapture)
}

/// Install the global subscriber with an explicit filter directive
pub fn init_with(directives: &str) -> bool {
    install(EnvFilter::new(directives), false, Sink::Stdout)
}

fn install(filter: EnvFilter, json: bool, sink: Sink) -> bool {
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(sink.writer());
    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
