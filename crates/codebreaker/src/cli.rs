//! Command-line interface for codebreaker.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Codebreaker - crack hidden color sequences across 100 levels
#[derive(Parser, Debug)]
#[command(name = "codebreaker")]
#[command(about = "Terminal code-breaking puzzle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List levels with their lock state
    Levels,

    /// Play, continuing from the highest unlocked level by default
    Play {
        /// Level to start at (must be unlocked)
        #[arg(short, long)]
        level: Option<u32>,
    },

    /// Show completed levels and overall progress
    Progress,

    /// Sign in to an account (password read from stdin)
    Login {
        /// Account name
        #[arg(short, long)]
        username: String,
    },

    /// Create an account and sign in (password read from stdin)
    Register {
        /// Account name
        #[arg(short, long)]
        username: String,
    },

    /// Sign out and return to device progress
    Logout,

    /// Show the active identity
    Whoami,
}
