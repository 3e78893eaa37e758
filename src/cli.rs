//! Command-line interface for prime_lock.

use clap::{Parser, Subcommand};
use prime_lock::LockMode;
use std::path::PathBuf;

/// Prime Lock Lab - crack composite locks, marvel at prime ones
#[derive(Parser, Debug)]
#[command(name = "prime_lock")]
#[command(about = "A guessing game about prime and composite keys", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the lab configuration file
    #[arg(short, long, global = true, default_value = "prime_lock.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Lock mode for the first round (composite or prime)
        #[arg(short, long, default_value = "composite")]
        mode: LockMode,

        /// File that receives logs while the UI owns the terminal
        #[arg(long, default_value = "prime_lock_tui.log")]
        log_file: PathBuf,
    },

    /// Serve the game as an HTTP JSON API
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate one round and print it as JSON (reveals the secret)
    Generate {
        /// Lock mode (composite or prime)
        #[arg(short, long, default_value = "composite")]
        mode: LockMode,

        /// Seed for a reproducible round
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Ask the teacher a single question
    Explain {
        /// What the student is asking about
        #[arg(long)]
        topic: String,

        /// What happened in the game
        #[arg(long, default_value = "")]
        context: String,
    },
}
