use std::io::{self, IsTerminal};

use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global tracing subscriber.
///
/// Diagnostics go to stderr so they never interleave with the colored status
/// lines on stdout. `0` shows this crate's info events and warnings from
/// dependencies, `1` (`-v`) is debug with the chatty hyper internals held at
/// warn, `2+` (`-vv`) traces everything. `RUST_LOG` overrides the level unless
/// `--quiet` is set. `RUST_LOG_JSON=true` switches to JSON lines, which is also
/// the default when stderr is not a terminal.
pub fn init_logging(verbose_level: u8, quiet: bool) -> Result<(), String> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let filter_str = match verbose_level {
            0 => "warn,monthlist=info",
            1 => "debug,hyper::proto::h1=warn,hyper_util::client=warn,hyper::client::pool=warn",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let registry = Registry::default().with(filter);

    if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(json_layer).try_init().map_err(|e| e.to_string())
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(fmt_layer).try_init().map_err(|e| e.to_string())
    }
}
