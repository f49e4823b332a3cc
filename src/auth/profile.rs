use serde::Deserialize;
use serde_json::Value;

use super::error::AuthError;
use super::identity::{AuthenticatedIdentity, Provider};
use crate::config::AuthConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("studio-auth/", env!("CARGO_PKG_VERSION"));

/// Exchanges a bearer token for a normalized [`AuthenticatedIdentity`].
///
/// # Example
/// ```no_run
/// use studio_auth::auth::{ProfileResolver, Provider};
/// use studio_auth::config::AuthConfig;
///
/// # async fn example() -> Result<(), studio_auth::auth::AuthError> {
/// let resolver = ProfileResolver::new(reqwest::Client::new(), &AuthConfig::default());
/// let identity = resolver.resolve("gho_token", Provider::Github).await?;
/// println!("{}", identity.display_name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    client: reqwest::Client,
    github_api_url: String,
    google_userinfo_url: String,
}

impl ProfileResolver {
    pub fn new(client: reqwest::Client, config: &AuthConfig) -> Self {
        Self {
            client,
            github_api_url: config.github.api_url.trim_end_matches('/').to_string(),
            google_userinfo_url: config.google.userinfo_url.clone(),
        }
    }

    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_google_userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.google_userinfo_url = url.into();
        self
    }

    pub async fn resolve(
        &self,
        token: &str,
        provider: Provider,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let identity = match provider {
            Provider::Github => self.resolve_github(token).await?,
            Provider::Google => self.resolve_google(token).await?,
            Provider::Local => {
                return Err(AuthError::Unsupported(
                    "local provider has no profile endpoint".to_string(),
                ))
            }
        };
        tracing::debug!(provider = %provider, id = %identity.id, "profile resolved");
        Ok(identity)
    }

    async fn resolve_github(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        let resp = self
            .client
            .get(format!("{}/user", self.github_api_url))
            .bearer_auth(token)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::ProfileUnavailable(format!(
                "GitHub user request failed with status {}",
                resp.status()
            )));
        }
        let user: GitHubUser = resp.json().await?;
        let id = stable_id(&user.id).ok_or_else(|| {
            AuthError::ProfileUnavailable("GitHub user response missing id".to_string())
        })?;

        let email = match non_empty(user.email) {
            Some(email) => email,
            None => self.github_primary_email(token).await.unwrap_or_default(),
        };
        let login = non_empty(user.login);
        let display_name = non_empty(user.name)
            .or_else(|| login.clone())
            .unwrap_or_else(|| fallback_name(&email, &id));

        Ok(AuthenticatedIdentity {
            id,
            display_name,
            email,
            avatar_url: user.avatar_url.unwrap_or_default(),
            provider: Provider::Github,
            login,
        })
    }

    /// Secondary lookup for accounts that hide their public email.
    ///
    /// Failures here never fail resolution; they only leave the email empty.
    async fn github_primary_email(&self, token: &str) -> Option<String> {
        let resp = self
            .client
            .get(format!("{}/user/emails", self.github_api_url))
            .bearer_auth(token)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await;
        let resp = match resp {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(error = %err, "email list request failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "email list unavailable");
            return None;
        }
        let emails: Vec<GitHubEmail> = resp.json().await.ok()?;
        select_primary_email(emails)
    }

    async fn resolve_google(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        let resp = self
            .client
            .get(&self.google_userinfo_url)
            .bearer_auth(token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::ProfileUnavailable(format!(
                "Google userinfo request failed with status {}",
                resp.status()
            )));
        }
        let user: GoogleUser = resp.json().await?;
        let id = stable_id(&user.id).ok_or_else(|| {
            AuthError::ProfileUnavailable("Google userinfo response missing id".to_string())
        })?;
        let email = user.email.unwrap_or_default();
        let display_name = non_empty(user.name).unwrap_or_else(|| fallback_name(&email, &id));
        Ok(AuthenticatedIdentity {
            id,
            display_name,
            email,
            avatar_url: user.picture.unwrap_or_default(),
            provider: Provider::Google,
            login: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    #[serde(default)]
    id: Value,
    login: Option<String>,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    #[serde(default)]
    id: Value,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

fn select_primary_email(emails: Vec<GitHubEmail>) -> Option<String> {
    let primary = emails.iter().position(|e| e.primary).unwrap_or(0);
    emails.into_iter().nth(primary).map(|e| e.email)
}

/// Provider ids arrive as numbers (GitHub) or strings (Google).
fn stable_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn fallback_name(email: &str, id: &str) -> String {
    if email.is_empty() {
        id.to_string()
    } else {
        email.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn email(address: &str, primary: bool) -> GitHubEmail {
        GitHubEmail {
            email: address.to_string(),
            primary,
        }
    }

    #[test]
    fn primary_email_is_preferred() {
        let picked = select_primary_email(vec![email("b@x.com", false), email("a@x.com", true)]);
        assert_eq!(picked.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn first_email_is_used_without_primary() {
        let picked = select_primary_email(vec![email("b@x.com", false), email("c@x.com", false)]);
        assert_eq!(picked.as_deref(), Some("b@x.com"));
        assert_eq!(select_primary_email(Vec::new()), None);
    }

    #[test]
    fn ids_are_stringified_and_never_empty() {
        assert_eq!(stable_id(&json!(42)).as_deref(), Some("42"));
        assert_eq!(stable_id(&json!("1089")).as_deref(), Some("1089"));
        assert_eq!(stable_id(&json!("  ")), None);
        assert_eq!(stable_id(&Value::Null), None);
    }

    #[tokio::test]
    async fn resolving_local_is_unsupported() {
        let resolver = ProfileResolver::new(reqwest::Client::new(), &AuthConfig::default());
        let result = resolver.resolve("tok", Provider::Local).await;
        assert!(matches!(result, Err(AuthError::Unsupported(_))));
    }
}
