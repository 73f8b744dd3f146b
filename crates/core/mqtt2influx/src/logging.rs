use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize a `tracing_subscriber` reporting to stderr and, when a journal
/// socket is available, to systemd-journald.
///
/// If `debug` is `true` all the events down to debug level are reported,
/// whatever `RUST_LOG` says. Otherwise `RUST_LOG` is honored, with a
/// default of `info`.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    // Outside systemd there is no journal socket: stderr only.
    match tracing_journald::layer() {
        Ok(journald) => subscriber.with(journald).init(),
        Err(_) => subscriber.init(),
    }
}
