//! Browsing-context seam for the implicit-grant flow.
//!
//! The engine never touches a real window. It asks a [`PopupOpener`] for a
//! [`PopupWindow`] and probes it on a fixed tick; each probe answers with one
//! of three named outcomes.

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use url::Url;

use super::error::AuthError;

/// Requested popup dimensions in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupSize {
    pub width: u32,
    pub height: u32,
}

/// Result of probing a popup once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupProbe {
    /// The context was destroyed (closed by the user).
    Closed,
    /// Location unreadable; still on the provider's origin.
    CrossOrigin,
    /// Location readable; carries the full URL the popup is showing.
    Redirected(String),
}

/// A browsing context opened for one sign-in attempt.
#[async_trait]
pub trait PopupWindow: Send {
    async fn probe(&mut self) -> PopupProbe;
    async fn close(&mut self);
}

/// Opens browsing contexts. Returns `None` when the popup was blocked.
pub trait PopupOpener: Send + Sync {
    fn open(&self, url: &str, size: PopupSize) -> Option<Box<dyn PopupWindow>>;
}

/// One implicit-grant attempt: the CSRF state and the URL carrying it.
#[derive(Debug, Clone)]
pub struct PopupSession {
    pub state: String,
    pub authorize_url: String,
}

/// Parameters the provider appends to the redirect fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectFragment {
    pub access_token: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl RedirectFragment {
    /// Parse the `#...` part of `location`. Accepts a full URL or a bare
    /// fragment (`#access_token=...` or `access_token=...`).
    pub fn parse(location: &str) -> Self {
        let fragment = match Url::parse(location) {
            Ok(url) => url.fragment().unwrap_or_default().to_string(),
            Err(_) => location
                .split_once('#')
                .map_or(location, |(_, frag)| frag)
                .to_string(),
        };
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "access_token" => parsed.access_token = value,
                "state" => parsed.state = value,
                "error" => parsed.error = value,
                _ => {}
            }
        }
        parsed
    }

    /// Accept the token only when the echoed state matches `expected`.
    pub fn into_token(self, expected_state: &str) -> Result<String, AuthError> {
        if let Some(error) = self.error {
            return Err(match error.as_str() {
                "access_denied" => AuthError::AccessDenied,
                _ => AuthError::InvalidResponse(format!("authorization error: {error}")),
            });
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(AuthError::StateMismatch);
        }
        self.access_token.ok_or_else(|| {
            AuthError::InvalidResponse("redirect fragment missing access_token".to_string())
        })
    }
}

/// Build the implicit-grant authorization URL.
pub fn build_authorize_url(
    base: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> Result<String, AuthError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "token")
        .append_pair("scope", scope)
        .append_pair("state", state);
    Ok(url.into())
}

/// Hex string built from `byte_count` bytes of OS randomness.
pub fn random_hex(byte_count: usize) -> String {
    let mut buf = vec![0u8; byte_count];
    OsRng.fill_bytes(&mut buf);
    hex_encode(&buf)
}

fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_64_hex_chars_and_fresh() {
        let a = random_hex(32);
        let b = random_hex(32);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn state_has_no_fixed_nibbles() {
        // Over 200 draws every hex position should take more than one value.
        let states: Vec<Vec<u8>> = (0..200).map(|_| random_hex(32).into_bytes()).collect();
        for pos in 0..64 {
            let first = states[0][pos];
            assert!(
                states.iter().any(|s| s[pos] != first),
                "hex position {pos} never varied"
            );
        }
    }

    #[test]
    fn hex_encode_is_lowercase_and_padded() {
        assert_eq!(hex_encode(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
    }

    #[test]
    fn authorize_url_carries_implicit_grant_params() {
        let url = build_authorize_url(
            "https://accounts.google.com/o/oauth2/v2/auth",
            "client-1",
            "http://localhost/auth/google/callback",
            "openid email profile",
            "abc123",
        )
        .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("response_type".into(), "token".into())));
        assert!(pairs.contains(&("scope".into(), "openid email profile".into())));
        assert!(pairs.contains(&("state".into(), "abc123".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost/auth/google/callback".into()
        )));
    }

    #[test]
    fn fragment_parses_from_full_url_and_bare_fragment() {
        let full = RedirectFragment::parse(
            "http://localhost/auth/google/callback#access_token=ya29.x&token_type=Bearer&state=s1",
        );
        assert_eq!(full.access_token.as_deref(), Some("ya29.x"));
        assert_eq!(full.state.as_deref(), Some("s1"));

        let bare = RedirectFragment::parse("#state=s2&access_token=tok%2Bplus");
        assert_eq!(bare.access_token.as_deref(), Some("tok+plus"));
        assert_eq!(bare.state.as_deref(), Some("s2"));
    }

    #[test]
    fn token_requires_matching_state() {
        let fragment = RedirectFragment::parse("#access_token=tok&state=evil");
        assert!(matches!(
            fragment.into_token("good"),
            Err(AuthError::StateMismatch)
        ));

        let missing = RedirectFragment::parse("#access_token=tok");
        assert!(matches!(
            missing.into_token("good"),
            Err(AuthError::StateMismatch)
        ));

        let ok = RedirectFragment::parse("#access_token=tok&state=good");
        assert_eq!(ok.into_token("good").unwrap(), "tok");
    }

    #[test]
    fn provider_error_in_fragment_is_reported() {
        let fragment = RedirectFragment::parse("#error=access_denied&state=good");
        assert!(matches!(
            fragment.into_token("good"),
            Err(AuthError::AccessDenied)
        ));
    }
}
