use std::sync::Arc;
use std::time::Duration;

use crate::auth::clock::Clock;
use crate::auth::error::AuthError;
use crate::auth::identity::{AuthOutcome, Provider};
use crate::auth::popup::{
    build_authorize_url, random_hex, PopupOpener, PopupProbe, PopupSession, PopupSize,
    PopupWindow, RedirectFragment,
};
use crate::auth::profile::ProfileResolver;
use crate::config::AuthConfig;

const STATE_BYTES: usize = 32;

/// Google sign-in via the implicit grant in a popup browsing context.
///
/// No client secret is held; the token arrives in the redirect fragment.
pub struct GooglePopupAuth {
    client_id: String,
    scope: String,
    authorize_url: String,
    redirect_uri: String,
    size: PopupSize,
    tick: Duration,
    resolver: ProfileResolver,
    clock: Arc<dyn Clock>,
}

impl GooglePopupAuth {
    pub fn new(config: &AuthConfig, resolver: ProfileResolver, clock: Arc<dyn Clock>) -> Self {
        let google = &config.google;
        Self {
            client_id: google.client_id.clone(),
            scope: google.scope.clone(),
            authorize_url: google.authorize_url.clone(),
            redirect_uri: google.redirect_uri.clone(),
            size: PopupSize {
                width: google.popup_width,
                height: google.popup_height,
            },
            tick: config.polling.popup_tick(),
            resolver,
            clock,
        }
    }

    /// Fresh CSRF state and the authorization URL embedding it.
    pub fn prepare(&self) -> Result<PopupSession, AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration(
                "Google client id is not configured".to_string(),
            ));
        }
        let state = random_hex(STATE_BYTES);
        let authorize_url = build_authorize_url(
            &self.authorize_url,
            &self.client_id,
            &self.redirect_uri,
            &self.scope,
            &state,
        )?;
        Ok(PopupSession {
            state,
            authorize_url,
        })
    }

    pub async fn run(&self, opener: &dyn PopupOpener) -> Result<AuthOutcome, AuthError> {
        let session = self.prepare()?;
        let Some(mut popup) = opener.open(&session.authorize_url, self.size) else {
            tracing::info!("sign-in popup blocked");
            return Err(AuthError::PopupBlocked);
        };
        tracing::debug!(width = self.size.width, height = self.size.height, "popup opened");

        let fragment = self.monitor(popup.as_mut()).await?;
        let access_token = fragment.into_token(&session.state)?;

        let identity = self.resolver.resolve(&access_token, Provider::Google).await?;
        tracing::info!(id = %identity.id, "Google sign-in complete");
        Ok(AuthOutcome {
            identity,
            bearer_token: access_token,
        })
    }

    /// Probe on every tick until the popup closes or reaches the redirect.
    async fn monitor(&self, popup: &mut dyn PopupWindow) -> Result<RedirectFragment, AuthError> {
        loop {
            self.clock.sleep(self.tick).await;
            match popup.probe().await {
                PopupProbe::Closed => {
                    tracing::info!("popup closed before authorization");
                    return Err(AuthError::Cancelled);
                }
                PopupProbe::CrossOrigin => continue,
                PopupProbe::Redirected(location) => {
                    let fragment = RedirectFragment::parse(&location);
                    if fragment.access_token.is_some() || fragment.error.is_some() {
                        popup.close().await;
                        tracing::debug!("redirect reached, popup closed");
                        return Ok(fragment);
                    }
                }
            }
        }
    }
}
