use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Installs the process-wide subscriber: one line per event on stdout with
/// timestamp, level, target, source location and message. `RUST_LOG` takes
/// precedence over the verbosity flag.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}
