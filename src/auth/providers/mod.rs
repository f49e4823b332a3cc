//! Per-provider sign-in engines.

pub mod github;
pub mod google;
pub mod local;

pub use github::GitHubDeviceAuth;
pub use google::GooglePopupAuth;
pub use local::LocalStubAuth;
