//! CLI handlers for login, status, and logout.

use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::auth::store::{FileSessionStore, SessionStore};
use crate::auth::service::UserCodeCallback;
use crate::auth::{AuthService, FailureReason, Provider};
use crate::cli::terminal_popup::TerminalPopupOpener;
use crate::config::AuthConfig;

/// Handle `studio-auth login <provider>`.
pub async fn handle_login(provider: Provider) -> Result<(), Box<dyn std::error::Error>> {
    let config = AuthConfig::load()?;
    let service = AuthService::new(config, Arc::new(TerminalPopupOpener));
    let store = FileSessionStore::new_default();

    let show_code = |code: &str, url: &str| {
        println!("🔗 Visit: {url}");
        println!("📋 Enter code: {code}");
        println!("⏳ Waiting for authorization...");
    };
    let on_user_code: Option<UserCodeCallback<'_>> = if provider.needs_user_code() {
        Some(&show_code)
    } else {
        println!("⏳ Signing in with {}...", provider.display_name());
        None
    };

    match service.authenticate_detailed(provider, on_user_code).await {
        Ok(outcome) => {
            store.save(&outcome)?;
            let identity = &outcome.identity;
            println!(
                "✅ Signed in with {} as {}",
                provider.display_name(),
                identity.display_name
            );
            if !identity.email.is_empty() {
                println!("   {}", identity.email);
            }
            Ok(())
        }
        Err(err) if err.is_usage_error() => Err(err.into()),
        Err(err) => {
            let message = match err.failure_reason() {
                FailureReason::Denied => "Authorization denied".to_string(),
                FailureReason::Expired => "Device code expired, please try again".to_string(),
                FailureReason::Cancelled => "Sign-in cancelled".to_string(),
                FailureReason::PopupBlocked => "Sign-in window could not be opened".to_string(),
                FailureReason::CsrfMismatch => {
                    "Redirect did not match this sign-in attempt".to_string()
                }
                _ => format!("{} sign-in failed: {err}", provider.display_name()),
            };
            eprintln!("❌ {message}");
            std::process::exit(1);
        }
    }
}

/// Handle `studio-auth status`.
pub async fn handle_status() -> Result<(), Box<dyn std::error::Error>> {
    let store = FileSessionStore::new_default();

    println!("🔐 Sessions\n");
    for provider in Provider::iter() {
        let name = provider.display_name();
        match store.load(provider) {
            Ok(Some(session)) => {
                let identity = &session.outcome.identity;
                println!(
                    "  {name}: ✅ {} (since {})",
                    identity.display_name,
                    session.saved_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(None) => println!("  {name}: ❌ Not signed in"),
            Err(e) => println!("  {name}: ⚠️  Error: {e}"),
        }
    }
    Ok(())
}

/// Handle `studio-auth logout <provider>`.
pub async fn handle_logout(provider: Provider) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileSessionStore::new_default();
    store.clear(provider)?;
    println!("✅ Signed out of {}", provider.display_name());
    Ok(())
}
