//! CLI entry point for studio-auth.

pub mod auth;
pub mod terminal_popup;

use clap::{Parser, Subcommand};

use crate::auth::Provider;

/// Sign in to GitHub, Google or the local stub from a terminal.
#[derive(Parser, Debug)]
#[command(name = "studio-auth", version, about = "OAuth sign-in CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with a provider
    Login(LoginArgs),
    /// Show stored sessions
    Status,
    /// Forget the stored session for a provider
    Logout(LogoutArgs),
}

/// Arguments for `studio-auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Provider to sign in with (github, google, local)
    #[arg(value_parser = parse_provider)]
    pub provider: Provider,
}

/// Arguments for `studio-auth logout`.
#[derive(Parser, Debug)]
pub struct LogoutArgs {
    /// Provider to sign out from (github, google, local)
    #[arg(value_parser = parse_provider)]
    pub provider: Provider,
}

fn parse_provider(value: &str) -> Result<Provider, String> {
    value
        .parse()
        .map_err(|_| format!("unknown provider: {value} (supported: github, google, local)"))
}
