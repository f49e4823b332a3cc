use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Identity provider tag.
///
/// # Example
/// ```
/// use std::str::FromStr;
/// use studio_auth::auth::Provider;
///
/// assert_eq!(Provider::from_str("github").unwrap(), Provider::Github);
/// assert_eq!(Provider::Google.to_string(), "google");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    /// Device authorization grant.
    Github,
    /// Implicit grant through a popup browsing context.
    Google,
    /// Offline stub; no network protocol.
    Local,
}

impl Provider {
    /// Human-readable provider name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Google => "Google",
            Self::Local => "Local",
        }
    }

    /// Whether the flow needs a user-code callback.
    pub fn needs_user_code(self) -> bool {
        matches!(self, Self::Github)
    }
}

/// A resolved user.
///
/// `id` is never empty. `email` and `avatar_url` are empty strings when the
/// provider does not expose them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
    pub provider: Provider,
    /// Account handle, for providers that have one (GitHub).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

/// Terminal result of one successful sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub bearer_token: String,
    pub identity: AuthenticatedIdentity,
}
