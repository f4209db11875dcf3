// src/main.rs

use neuron_lens::{cli::Cli, commands, AppError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse_args();

    // --- Initialize Tracing (stderr, so stdout stays clean for results) ---
    let env_filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let json_layer = cli.json_logs.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!cli.json_logs).then(|| {
        fmt::layer()
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
    });
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    commands::execute(cli).await.map_err(|e| {
        eprintln!("Error: {e}");
        e
    })
}
