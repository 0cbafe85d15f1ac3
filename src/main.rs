//! clocksync main entrypoint.

use clocksync::run;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // logs go to stderr so `list --json` output stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
