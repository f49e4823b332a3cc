#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use studio_auth::auth::{Clock, PopupOpener, PopupProbe, PopupSize, PopupWindow};
use studio_auth::config::AuthConfig;
use wiremock::MockServer;

/// Virtual clock: `sleep` advances `now` instantly and is recorded.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("clock lock poisoned").clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .expect("clock lock poisoned")
            .push(duration);
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += chrono::Duration::from_std(duration).expect("duration in range");
    }
}

/// Popup that replays a fixed sequence of probe results, then reports
/// `Closed` forever.
pub struct ScriptedPopup {
    script: VecDeque<PopupProbe>,
    probes: Arc<AtomicUsize>,
    closed_by_engine: Arc<AtomicUsize>,
}

#[async_trait]
impl PopupWindow for ScriptedPopup {
    async fn probe(&mut self) -> PopupProbe {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().unwrap_or(PopupProbe::Closed)
    }

    async fn close(&mut self) {
        self.closed_by_engine.fetch_add(1, Ordering::SeqCst);
    }
}

/// Opener handing out [`ScriptedPopup`]s. The script may reference the
/// state from the authorization URL through [`ScriptStep::RedirectWithState`].
#[derive(Clone)]
pub enum ScriptStep {
    CrossOrigin,
    Closed,
    Redirect(String),
    /// Redirect to `base#access_token=<token>&state=<state from the URL>`.
    RedirectWithState { base: String, token: String },
}

#[derive(Default)]
pub struct ScriptedOpener {
    steps: Vec<ScriptStep>,
    blocked: bool,
    pub opened_urls: Mutex<Vec<String>>,
    pub sizes: Mutex<Vec<PopupSize>>,
    pub probes: Arc<AtomicUsize>,
    pub closed_by_engine: Arc<AtomicUsize>,
}

impl ScriptedOpener {
    pub fn new(steps: Vec<ScriptStep>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            ..Self::default()
        })
    }

    pub fn blocked() -> Arc<Self> {
        Arc::new(Self {
            blocked: true,
            ..Self::default()
        })
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn engine_closes(&self) -> usize {
        self.closed_by_engine.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<String> {
        self.opened_urls
            .lock()
            .expect("opener lock poisoned")
            .last()
            .cloned()
    }
}

impl PopupOpener for ScriptedOpener {
    fn open(&self, url: &str, size: PopupSize) -> Option<Box<dyn PopupWindow>> {
        self.opened_urls
            .lock()
            .expect("opener lock poisoned")
            .push(url.to_string());
        self.sizes.lock().expect("opener lock poisoned").push(size);
        if self.blocked {
            return None;
        }
        let state = url::Url::parse(url)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "state")
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap_or_default();
        let script = self
            .steps
            .iter()
            .map(|step| match step {
                ScriptStep::CrossOrigin => PopupProbe::CrossOrigin,
                ScriptStep::Closed => PopupProbe::Closed,
                ScriptStep::Redirect(location) => PopupProbe::Redirected(location.clone()),
                ScriptStep::RedirectWithState { base, token } => PopupProbe::Redirected(format!(
                    "{base}#access_token={token}&token_type=Bearer&state={state}"
                )),
            })
            .collect();
        Some(Box::new(ScriptedPopup {
            script,
            probes: self.probes.clone(),
            closed_by_engine: self.closed_by_engine.clone(),
        }))
    }
}

/// Config with every endpoint pointed at `server` and no simulated latency.
pub fn mock_config(server: &MockServer) -> AuthConfig {
    let mut config = AuthConfig::default();
    config.github.client_id = "test-client".to_string();
    config.github.device_code_url = format!("{}/login/device/code", server.uri());
    config.github.access_token_url = format!("{}/login/oauth/access_token", server.uri());
    config.github.api_url = server.uri();
    config.google.client_id = "google-client".to_string();
    config.google.authorize_url = format!("{}/o/oauth2/v2/auth", server.uri());
    config.google.userinfo_url = format!("{}/oauth2/v2/userinfo", server.uri());
    config.local.latency_ms = 0;
    config
}
