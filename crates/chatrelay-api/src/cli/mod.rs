//! CLI command definitions for the `chatrelay` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod key;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Streaming chat relay for OpenAI-compatible model providers.
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (defaults to <data dir>/config.toml).
    #[arg(long, global = true, env = "CHATRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Port to listen on (overrides [server].port).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides [server].host).
        #[arg(long)]
        host: Option<String>,

        /// Export spans to stdout via OpenTelemetry.
        #[arg(long)]
        otel: bool,
    },

    /// Manage API keys.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Mint an API key acting for a user. The key is printed once.
    Create {
        /// User id the key authenticates as.
        user_id: String,

        /// Label for the key.
        #[arg(long, default_value = "default")]
        name: String,
    },
}
