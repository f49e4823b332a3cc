//! Convenience re-exports for callers of the session façade.

pub use crate::auth::popup::{PopupOpener, PopupProbe, PopupSize, PopupWindow};
pub use crate::auth::service::AuthService;
pub use crate::auth::store::{FileSessionStore, SessionStore, StoredSession};
pub use crate::auth::{AuthError, AuthOutcome, AuthenticatedIdentity, FailureReason, Provider};
pub use crate::config::AuthConfig;
