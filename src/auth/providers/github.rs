use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::auth::clock::{remaining_until, Clock};
use crate::auth::device_code::{
    classify_token_response, slowed_interval, DeviceCodePoll, DeviceFlowState, DeviceGrant,
    DeviceTokenResponse,
};
use crate::auth::error::AuthError;
use crate::auth::identity::{AuthOutcome, Provider};
use crate::auth::profile::ProfileResolver;
use crate::config::{GitHubConfig, PollingConfig};

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const MIN_INTERVAL_SECS: u64 = 1;

/// GitHub sign-in via the device authorization grant.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use studio_auth::auth::providers::github::GitHubDeviceAuth;
/// use studio_auth::auth::{ProfileResolver, SystemClock};
/// use studio_auth::config::AuthConfig;
///
/// # async fn example() -> Result<(), studio_auth::auth::AuthError> {
/// let config = AuthConfig::load()?;
/// let client = reqwest::Client::new();
/// let auth = GitHubDeviceAuth::new(
///     client.clone(),
///     &config,
///     ProfileResolver::new(client, &config),
///     Arc::new(SystemClock),
/// );
/// let outcome = auth
///     .run(&|code: &str, url: &str| println!("Enter {code} at {url}"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GitHubDeviceAuth {
    client: reqwest::Client,
    client_id: String,
    scope: String,
    device_code_url: String,
    access_token_url: String,
    polling: PollingConfig,
    resolver: ProfileResolver,
    clock: Arc<dyn Clock>,
}

impl GitHubDeviceAuth {
    pub fn new(
        client: reqwest::Client,
        config: &crate::config::AuthConfig,
        resolver: ProfileResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let GitHubConfig {
            client_id,
            scope,
            device_code_url,
            access_token_url,
            ..
        } = config.github.clone();
        Self {
            client,
            client_id,
            scope,
            device_code_url,
            access_token_url,
            polling: config.polling.clone(),
            resolver,
            clock,
        }
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = url.into();
        self
    }

    /// Drive the whole flow: request, display, poll, resolve.
    ///
    /// `on_user_code` is invoked exactly once, before the first poll.
    pub async fn run(
        &self,
        on_user_code: &(dyn Fn(&str, &str) + Send + Sync),
    ) -> Result<AuthOutcome, AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration(
                "GitHub client id is not configured".to_string(),
            ));
        }

        let mut state = DeviceFlowState::Requesting;
        let access_token = loop {
            tracing::trace!(state = state.label(), "device flow step");
            state = match state {
                DeviceFlowState::Requesting => match self.start_device_code().await {
                    Ok(grant) => DeviceFlowState::AwaitingUser(grant),
                    Err(err) => DeviceFlowState::Done(Err(err)),
                },
                DeviceFlowState::AwaitingUser(grant) => {
                    on_user_code(&grant.user_code, &grant.verification_uri);
                    let interval_secs = grant.interval_secs;
                    DeviceFlowState::Polling {
                        grant,
                        interval_secs,
                    }
                }
                DeviceFlowState::Polling {
                    grant,
                    interval_secs,
                } => self.poll_step(grant, interval_secs).await,
                DeviceFlowState::Done(result) => break result?,
            };
        };

        let identity = self.resolver.resolve(&access_token, Provider::Github).await?;
        tracing::info!(id = %identity.id, "GitHub sign-in complete");
        Ok(AuthOutcome {
            identity,
            bearer_token: access_token,
        })
    }

    /// Request a device code. Any failure here is terminal.
    pub async fn start_device_code(&self) -> Result<DeviceGrant, AuthError> {
        let requested_at = self.clock.now();
        let resp = self
            .client
            .post(&self.device_code_url)
            .header("Accept", "application/json")
            .json(&json!({
                "client_id": self.client_id,
                "scope": self.scope,
            }))
            .send()
            .await
            .map_err(|err| AuthError::DeviceCodeRequest(err.to_string()))?;
        if !resp.status().is_success() {
            return Err(AuthError::DeviceCodeRequest(format!(
                "request failed with status {}",
                resp.status()
            )));
        }
        let payload: DeviceCodeResponse = resp
            .json()
            .await
            .map_err(|err| AuthError::DeviceCodeRequest(format!("malformed body: {err}")))?;
        let interval_secs = if payload.interval == 0 {
            self.polling.default_interval_secs
        } else {
            payload.interval
        }
        .max(MIN_INTERVAL_SECS);
        let expires_at = i64::try_from(payload.expires_in)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| requested_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::DeviceCodeRequest("malformed body: expires_in out of range".to_string())
            })?;
        tracing::debug!(
            user_code = %payload.user_code,
            interval_secs,
            expires_in = payload.expires_in,
            "device code issued"
        );
        Ok(DeviceGrant {
            device_code: payload.device_code,
            user_code: payload.user_code,
            verification_uri: payload.verification_uri,
            interval_secs,
            expires_at,
        })
    }

    /// Poll the token endpoint once. Never fails; transport problems come
    /// back as [`DeviceCodePoll::Transient`].
    pub async fn poll_device_code(&self, grant: &DeviceGrant) -> DeviceCodePoll {
        let sent = self
            .client
            .post(&self.access_token_url)
            .header("Accept", "application/json")
            .json(&json!({
                "client_id": self.client_id,
                "device_code": grant.device_code,
                "grant_type": DEVICE_GRANT_TYPE,
            }))
            .send()
            .await;
        let resp = match sent {
            Ok(resp) => resp,
            Err(err) => {
                return DeviceCodePoll::Transient {
                    reason: err.to_string(),
                }
            }
        };
        // Error responses carry the same JSON shape, whatever the status.
        match resp.json::<DeviceTokenResponse>().await {
            Ok(payload) => classify_token_response(payload),
            Err(err) => DeviceCodePoll::Transient {
                reason: format!("unreadable token response: {err}"),
            },
        }
    }

    /// Wait one interval (never past the deadline), then poll once.
    async fn poll_step(&self, grant: DeviceGrant, interval_secs: u64) -> DeviceFlowState {
        let wait = Duration::from_secs(interval_secs);
        let remaining = remaining_until(self.clock.as_ref(), grant.expires_at);
        if wait >= remaining {
            self.clock.sleep(remaining).await;
            tracing::info!("device code expired before authorization");
            return DeviceFlowState::Done(Err(AuthError::Expired));
        }
        self.clock.sleep(wait).await;
        if self.clock.now() >= grant.expires_at {
            return DeviceFlowState::Done(Err(AuthError::Expired));
        }

        match self.poll_device_code(&grant).await {
            DeviceCodePoll::Authorized { access_token } => DeviceFlowState::Done(Ok(access_token)),
            DeviceCodePoll::Pending => DeviceFlowState::Polling {
                grant,
                interval_secs,
            },
            DeviceCodePoll::SlowDown {
                interval_secs: provider_interval,
            } => {
                let next = slowed_interval(
                    interval_secs,
                    self.polling.slow_down_step_secs,
                    provider_interval,
                );
                tracing::debug!(from = interval_secs, to = next, "provider asked to slow down");
                DeviceFlowState::Polling {
                    grant,
                    interval_secs: next,
                }
            }
            DeviceCodePoll::Transient { reason } => {
                tracing::warn!(%reason, "transient device poll failure, retrying");
                DeviceFlowState::Polling {
                    grant,
                    interval_secs,
                }
            }
            DeviceCodePoll::AccessDenied => {
                tracing::info!("device authorization denied");
                DeviceFlowState::Done(Err(AuthError::AccessDenied))
            }
            DeviceCodePoll::Expired => {
                tracing::info!("provider reported expired device code");
                DeviceFlowState::Done(Err(AuthError::Expired))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default)]
    interval: u64,
}
