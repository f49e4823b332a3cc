//! OAuth sign-in flows, profile resolution and session persistence.

pub mod clock;
pub mod device_code;
pub mod error;
pub mod identity;
pub mod popup;
pub mod profile;
pub mod providers;
pub mod service;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use device_code::{DeviceCodePoll, DeviceFlowState, DeviceGrant};
pub use error::{AuthError, FailureReason};
pub use identity::{AuthOutcome, AuthenticatedIdentity, Provider};
pub use popup::{PopupOpener, PopupProbe, PopupSession, PopupSize, PopupWindow};
pub use profile::ProfileResolver;
pub use service::AuthService;
pub use store::{FileSessionStore, SessionStore, SessionStoreConfig, StoredSession};
