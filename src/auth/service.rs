use std::sync::Arc;
use std::time::Duration;

use super::clock::{Clock, SystemClock};
use super::error::AuthError;
use super::identity::{AuthOutcome, Provider};
use super::popup::PopupOpener;
use super::profile::ProfileResolver;
use super::providers::{GitHubDeviceAuth, GooglePopupAuth, LocalStubAuth};
use crate::config::AuthConfig;

/// Callback that shows the device-flow user code and verification URL.
pub type UserCodeCallback<'a> = &'a (dyn Fn(&str, &str) + Send + Sync);

/// Single entry point for signing in with any provider.
///
/// Stateless: each call builds its own engine, so concurrent calls never
/// share authentication state. Persisting the outcome is the caller's job.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use studio_auth::auth::{AuthService, PopupOpener, Provider};
/// use studio_auth::config::AuthConfig;
///
/// # async fn example(opener: Arc<dyn PopupOpener>) -> Result<(), studio_auth::auth::AuthError> {
/// let svc = AuthService::new(AuthConfig::default(), opener);
/// let outcome = svc.authenticate(Provider::Local, None).await?;
/// assert!(outcome.is_some());
/// # Ok(())
/// # }
/// ```
pub struct AuthService {
    config: AuthConfig,
    client: reqwest::Client,
    popup_opener: Arc<dyn PopupOpener>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(config: AuthConfig, popup_opener: Arc<dyn PopupOpener>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            popup_opener,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Sign in with `provider`.
    ///
    /// Returns `Ok(None)` for every authentication failure (denied, expired,
    /// cancelled, unreachable). `Err` is reserved for misuse: a missing
    /// `on_user_code` for GitHub or an unconfigured client id.
    pub async fn authenticate(
        &self,
        provider: Provider,
        on_user_code: Option<UserCodeCallback<'_>>,
    ) -> Result<Option<AuthOutcome>, AuthError> {
        match self.authenticate_detailed(provider, on_user_code).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) if err.is_usage_error() => Err(err),
            Err(err) => {
                tracing::info!(
                    provider = %provider,
                    reason = %err.failure_reason(),
                    error = %err,
                    "sign-in failed"
                );
                Ok(None)
            }
        }
    }

    /// Like [`AuthService::authenticate`], but keeps the failure cause.
    pub async fn authenticate_detailed(
        &self,
        provider: Provider,
        on_user_code: Option<UserCodeCallback<'_>>,
    ) -> Result<AuthOutcome, AuthError> {
        tracing::debug!(provider = %provider, "sign-in started");
        match provider {
            Provider::Github => {
                let on_user_code =
                    on_user_code.ok_or(AuthError::MissingUserCodeCallback(provider))?;
                self.github().run(on_user_code).await
            }
            Provider::Google => self.google().run(self.popup_opener.as_ref()).await,
            Provider::Local => Ok(self.local().run().await),
        }
    }

    fn resolver(&self) -> ProfileResolver {
        ProfileResolver::new(self.client.clone(), &self.config)
    }

    fn github(&self) -> GitHubDeviceAuth {
        GitHubDeviceAuth::new(
            self.client.clone(),
            &self.config,
            self.resolver(),
            self.clock.clone(),
        )
    }

    fn google(&self) -> GooglePopupAuth {
        GooglePopupAuth::new(&self.config, self.resolver(), self.clock.clone())
    }

    fn local(&self) -> LocalStubAuth {
        LocalStubAuth::new(
            Duration::from_millis(self.config.local.latency_ms),
            self.clock.clone(),
        )
    }
}
