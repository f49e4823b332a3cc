use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::AuthError;

/// One device-flow attempt, as issued by the provider.
///
/// # Example
/// ```no_run
/// use studio_auth::auth::DeviceGrant;
/// use chrono::Utc;
///
/// let grant = DeviceGrant {
///     device_code: "3584d83530557fdd1f46af8289938c8ef79f9dc5".to_string(),
///     user_code: "WDJB-MJHT".to_string(),
///     verification_uri: "https://github.com/login/device".to_string(),
///     interval_secs: 5,
///     expires_at: Utc::now() + chrono::Duration::minutes(15),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DeviceGrant {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub interval_secs: u64,
    pub expires_at: DateTime<Utc>,
}

/// Classified outcome of a single token-endpoint poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCodePoll {
    Pending,
    /// Provider asked for back-off; `interval_secs` is the provider's new
    /// interval, if it sent one.
    SlowDown { interval_secs: Option<u64> },
    Authorized { access_token: String },
    AccessDenied,
    Expired,
    /// Transport failure or unreadable response; treated like `Pending`.
    Transient { reason: String },
}

impl DeviceCodePoll {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Authorized { .. } | Self::AccessDenied | Self::Expired
        )
    }
}

/// States of the device authorization machine.
#[derive(Debug)]
pub enum DeviceFlowState {
    Requesting,
    AwaitingUser(DeviceGrant),
    Polling { grant: DeviceGrant, interval_secs: u64 },
    Done(Result<String, AuthError>),
}

impl DeviceFlowState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Requesting => "requesting",
            Self::AwaitingUser(_) => "awaiting_user",
            Self::Polling { .. } => "polling",
            Self::Done(_) => "done",
        }
    }
}

/// Token-endpoint response body (success and error share one shape).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeviceTokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub interval: Option<u64>,
}

pub(crate) fn classify_token_response(payload: DeviceTokenResponse) -> DeviceCodePoll {
    if let Some(access_token) = payload.access_token.filter(|t| !t.is_empty()) {
        return DeviceCodePoll::Authorized { access_token };
    }
    match payload.error.as_deref() {
        Some("authorization_pending") => DeviceCodePoll::Pending,
        Some("slow_down") => DeviceCodePoll::SlowDown {
            interval_secs: payload.interval,
        },
        Some("expired_token") => DeviceCodePoll::Expired,
        Some("access_denied") => DeviceCodePoll::AccessDenied,
        Some(other) => DeviceCodePoll::Transient {
            reason: format!("unrecognized device flow error: {other}"),
        },
        None => DeviceCodePoll::Transient {
            reason: "response missing token and error".to_string(),
        },
    }
}

/// Interval after a `slow_down`: grows by `step` and never shrinks below the
/// provider's own value.
pub(crate) fn slowed_interval(current: u64, step: u64, provider_interval: Option<u64>) -> u64 {
    let bumped = current.saturating_add(step).max(step);
    provider_interval.map_or(bumped, |p| bumped.max(p))
}
