// src/commands.rs

//! Execution of the CLI subcommands.

use crate::{
    batch::{BatchResult, LookupOutcome, LookupPolicy},
    cli::{Cli, Commands, ConfigCommands},
    config::{self, AppConfig},
    create_router,
    error::{AppError, Result},
    explain::ExplanationRecord,
    handlers::explain::{BatchResponse, NO_DESCRIPTIONS_FOUND},
    setup_configuration,
    state::AppState,
    tokenizer::tokenize,
};
use std::{fmt::Write as _, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Tokenize { text, json } => {
            let tokens = tokenize(&text);
            if json {
                println!("{}", serde_json::to_string(&tokens)?);
            } else {
                for token in tokens {
                    println!("{token}");
                }
            }
            Ok(())
        }
        Commands::Explain {
            text,
            preset,
            token,
            shared,
            json,
        } => {
            let state = AppState::new(setup_configuration(&cli.config)?)?;
            explain(&state, &text, preset.as_deref(), token.as_deref(), shared, json).await
        }
        Commands::Presets => {
            let config = setup_configuration(&cli.config)?;
            print!("{}", render_presets(&config));
            Ok(())
        }
        Commands::Serve { host, port } => {
            let mut config = setup_configuration(&cli.config)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Config {
            action: ConfigCommands::Validate { file, verbose },
        } => {
            let path = file.unwrap_or(cli.config);
            let config = config::load_config(&path)?;
            println!("Configuration '{}' is valid.", path.display());
            if verbose {
                println!("{config:#?}");
            }
            Ok(())
        }
    }
}

async fn explain(
    state: &AppState,
    text: &str,
    preset: Option<&str>,
    only_token: Option<&str>,
    shared: bool,
    json: bool,
) -> Result<()> {
    let tokens = tokenize(text);
    let model = state.resolve_model(preset, None)?;

    if let Some(token) = only_token {
        if !tokens.contains(&token) {
            return Err(AppError::invalid_request(format!(
                "token `{token}` does not occur in the input (tokens: {tokens:?})"
            )));
        }
        let records = state.client.fetch(token, &model).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            print!("{}", render_token(token, &records, None));
        }
        return Ok(());
    }

    let aggregator = if shared {
        state.aggregator.clone().with_policy(LookupPolicy::Shared)
    } else {
        state.aggregator.clone()
    };
    let result = aggregator.fetch_all(&tokens, &model).await;

    if json {
        println!("{}", render_batch_json(&model.model_id, result)?);
    } else {
        print!("{}", render_batch(&result));
    }
    Ok(())
}

/// Plain-text rendering of one token's descriptions.
pub fn render_token(token: &str, records: &[ExplanationRecord], note: Option<&str>) -> String {
    let mut out = String::new();
    if records.is_empty() {
        let _ = writeln!(out, "{NO_DESCRIPTIONS_FOUND} for `{token}`.");
    } else {
        let _ = writeln!(out, "Descriptions for token `{token}`:");
        for record in records {
            let _ = writeln!(out, "  - {}", record.description);
        }
    }
    if let Some(note) = note {
        let _ = writeln!(out, "  ({note})");
    }
    out
}

/// Plain-text rendering of a whole batch: the token strip, then each token.
pub fn render_batch(result: &BatchResult) -> String {
    let mut out = String::new();
    let strip: Vec<String> = result.lookups.iter().map(|l| format!("[{}]", l.token)).collect();
    let _ = writeln!(out, "Tokens: {}", strip.join(" "));

    for lookup in &result.lookups {
        out.push('\n');
        let note = match &lookup.outcome {
            LookupOutcome::Completed => None,
            LookupOutcome::Failed(e) => Some(format!("lookup failed: {e}")),
            LookupOutcome::NotCompleted => Some("lookup did not complete".to_string()),
        };
        out.push_str(&render_token(&lookup.token, &lookup.records, note.as_deref()));
    }

    if let Some(reason) = result.interruption {
        let _ = writeln!(out, "\nBatch stopped early ({reason:?}); results are partial.");
    }
    out
}

/// JSON rendering of a whole batch, in the same shape the server returns.
pub fn render_batch_json(model_id: &str, result: BatchResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&BatchResponse::new(model_id, result))?)
}

pub fn render_presets(config: &AppConfig) -> String {
    let mut out = String::new();
    for (name, preset) in config.preset_registry().iter() {
        let marker = if name == config.default_preset { " (default)" } else { "" };
        let _ = writeln!(
            out,
            "{name}{marker}: model={} source_set={} layers={} num_results={}",
            preset.model_id,
            preset.source_set,
            preset.selected_layers.join(","),
            preset.num_results
        );
    }
    out
}

async fn serve(config: AppConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            AppError::config_validation(format!("Invalid bind address: {e}"), Some("server.host"))
        })?;

    let state = Arc::new(AppState::new(config)?);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!(server.address = %addr, error = ?e, "Failed to bind to address. Exiting.");
        AppError::from(e)
    })?;
    info!(server.address = %addr, "Server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = ?e, "Server run loop encountered an error. Exiting.");
            AppError::from(e)
        })?;

    info!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!(signal = "Ctrl+C", "Received signal. Initiating graceful shutdown...") },
        () = terminate => { info!(signal = "Terminate", "Received signal. Initiating graceful shutdown...") },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        batch::{Interruption, TokenLookup},
        error::RemoteError,
    };
    use serde_json::{json, Map};

    fn record(description: &str) -> ExplanationRecord {
        let mut neuron = Map::new();
        neuron.insert("index".to_string(), json!("42"));
        ExplanationRecord {
            description: description.to_string(),
            neuron,
        }
    }

    #[test]
    fn renders_descriptions_and_empty_tokens() {
        let result = BatchResult {
            lookups: vec![
                TokenLookup {
                    position: 0,
                    token: "Hi".to_string(),
                    records: vec![record("greetings")],
                    outcome: LookupOutcome::Completed,
                },
                TokenLookup {
                    position: 1,
                    token: "!".to_string(),
                    records: vec![],
                    outcome: LookupOutcome::Failed(RemoteError::status(500, "boom")),
                },
            ],
            interruption: None,
            calls_issued: 2,
        };

        let text = render_batch(&result);
        assert!(text.starts_with("Tokens: [Hi] [!]\n"));
        assert!(text.contains("Descriptions for token `Hi`:\n  - greetings\n"));
        assert!(text.contains("No descriptions found for `!`.\n"));
        assert!(text.contains("lookup failed: search API returned 500: boom"));
        assert!(!text.contains("partial"));
    }

    #[test]
    fn json_rendering_reports_interrupted_batch() {
        let result = BatchResult {
            lookups: vec![
                TokenLookup {
                    position: 0,
                    token: "Hi".to_string(),
                    records: vec![record("greetings")],
                    outcome: LookupOutcome::Completed,
                },
                TokenLookup {
                    position: 1,
                    token: "!".to_string(),
                    records: vec![],
                    outcome: LookupOutcome::NotCompleted,
                },
            ],
            interruption: Some(Interruption::DeadlineExceeded),
            calls_issued: 2,
        };

        let rendered = render_batch_json("gpt2-small", result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["model_id"], json!("gpt2-small"));
        assert_eq!(value["partial"], json!(true));
        assert_eq!(value["interruption"], json!("deadline_exceeded"));
        assert_eq!(value["calls_issued"], json!(2));
        assert_eq!(value["entries"][0]["status"], json!("completed"));
        assert_eq!(value["entries"][1]["status"], json!("not_completed"));
    }

    #[test]
    fn presets_listing_marks_default() {
        let text = render_presets(&AppConfig::default());
        assert!(text.contains("gpt2-small (default): model=gpt2-small source_set=res-jb layers=12-res-jb num_results=5"));
        assert!(text.contains("llama3.1-8b: model=llama3.1-8b"));
    }
}
