use std::sync::Arc;
use std::time::Duration;

use crate::auth::clock::Clock;
use crate::auth::identity::{AuthOutcome, AuthenticatedIdentity, Provider};

const DISPLAY_NAME: &str = "Local Developer";
const EMAIL: &str = "dev@localhost";

/// Offline provider that always succeeds after a simulated delay.
pub struct LocalStubAuth {
    latency: Duration,
    clock: Arc<dyn Clock>,
}

impl LocalStubAuth {
    pub fn new(latency: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { latency, clock }
    }

    pub async fn run(&self) -> AuthOutcome {
        self.clock.sleep(self.latency).await;
        AuthOutcome {
            identity: AuthenticatedIdentity {
                id: format!("local_{}", random_suffix(9)),
                display_name: DISPLAY_NAME.to_string(),
                email: EMAIL.to_string(),
                avatar_url: String::new(),
                provider: Provider::Local,
                login: None,
            },
            bearer_token: format!("local_{}", random_suffix(16)),
        }
    }
}

fn random_suffix(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        out.push_str(&uuid::Uuid::new_v4().simple().to_string());
    }
    out.truncate(len);
    out
}
