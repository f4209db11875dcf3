use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "neuron-lens",
    version,
    about = "Split text into tokens and look up neuron explanations for each one",
    long_about = "Tokenizes a sentence into words and punctuation, then queries a neuron explanation search API for every token and prints the returned descriptions. Can also serve the same operations as a small JSON API."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "NEURON_LENS_CONFIG", default_value = "neuron-lens.yaml", global = true)]
    pub config: PathBuf,

    /// Log level or filter directive
    #[arg(short, long, default_value = "warn", env = "RUST_LOG", global = true)]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "NEURON_LENS_JSON_LOGS", global = true)]
    pub json_logs: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tokens of a sentence
    Tokenize {
        text: String,

        /// Print a JSON array instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// Look up explanations for every token of a sentence
    Explain {
        text: String,

        /// Model preset to query (defaults to the configured default preset)
        #[arg(short, long)]
        preset: Option<String>,

        /// Only look up this token (it must occur in TEXT)
        #[arg(short, long)]
        token: Option<String>,

        /// Look up repeated tokens once and share the result
        #[arg(long)]
        shared: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the available model presets
    Presets,

    /// Serve tokenization and explanation lookups as a JSON API
    Serve {
        /// Bind address (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Configuration file to validate (defaults to --config)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Show the resolved configuration
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
