//! studio-auth: multi-provider OAuth sign-in for desktop applications.
//!
//! Establishes an authenticated identity for a local user against GitHub
//! (device authorization grant), Google (implicit grant through a popup
//! browsing context) or a local stub provider, without any server-side
//! component. Every attempt ends in exactly one [`auth::AuthOutcome`] or
//! `None`.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use studio_auth::prelude::*;
//!
//! # async fn example(opener: Arc<dyn PopupOpener>) -> Result<(), AuthError> {
//! let service = AuthService::new(AuthConfig::load()?, opener);
//! let show_code = |code: &str, url: &str| println!("Enter {code} at {url}");
//! if let Some(outcome) = service.authenticate(Provider::Github, Some(&show_code)).await? {
//!     println!("Signed in as {}", outcome.identity.display_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
