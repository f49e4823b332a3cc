//! studio-auth CLI binary entry point.

use clap::Parser;
use studio_auth::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STUDIO_AUTH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login(args) => studio_auth::cli::auth::handle_login(args.provider).await,
        Commands::Status => studio_auth::cli::auth::handle_status().await,
        Commands::Logout(args) => studio_auth::cli::auth::handle_logout(args.provider).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
