//! The AudioWS application.
//!
//! Invoked once per call with an argument string whose first comma-separated
//! field is the WebSocket URL. Connects to that URL, relays audio until the
//! session ends, and returns the relay's exit status.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::lifecycle::{AppEntry, AppState, HostApplication};
use crate::config::RelayConfig;
use crate::core::leg::CallLeg;
use crate::core::relay::{FrameRelay, RelayReport};
use crate::core::transport::{TransportConnector, WebSocketConnector};
use crate::errors::{AppError, AppResult};
use crate::utils::{is_secure, redact_url, validate_ws_url};

/// Call variable holding the URL the session connected to
pub const URL_VARIABLE: &str = "AUDIOWS_URL";

/// Extract the URL from an application argument string.
///
/// Only the first comma-separated field is used. Returns `None` when that
/// field is blank.
pub fn parse_url_argument(args: &str) -> Option<&str> {
    let url = args.split(',').next()?.trim();
    (!url.is_empty()).then_some(url)
}

pub struct AudioWsApp {
    config: RelayConfig,
    connector: Arc<dyn TransportConnector>,
    entry: Mutex<AppEntry>,
}

impl AudioWsApp {
    /// Create an application that connects over WebSocket.
    pub fn new(config: RelayConfig) -> Self {
        Self::with_connector(config, Arc::new(WebSocketConnector))
    }

    pub fn with_connector(config: RelayConfig, connector: Arc<dyn TransportConnector>) -> Self {
        Self {
            config,
            connector,
            entry: Mutex::new(AppEntry::new()),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run `f` against the lifecycle bookkeeping
    pub fn with_entry<R>(&self, f: impl FnOnce(&AppEntry) -> R) -> R {
        f(&self.entry.lock())
    }

    /// Run one session and return the full report.
    ///
    /// # Errors
    /// Fails before any audio is relayed if the application is stopped, the
    /// URL is missing or invalid, or the transport cannot be opened.
    pub async fn run(&self, args: &str, leg: Box<dyn CallLeg>) -> AppResult<RelayReport> {
        if !self.entry.lock().begin_session() {
            let err = AppError::Stopped(self.config.app_name.clone());
            self.entry.lock().record_refused(err.to_string());
            return Err(err);
        }

        match self.run_session(args, leg).await {
            Ok(report) => {
                self.entry.lock().finish_session(report.outcome);
                Ok(report)
            }
            Err(e) => {
                self.entry.lock().abort_session(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_session(&self, args: &str, mut leg: Box<dyn CallLeg>) -> AppResult<RelayReport> {
        let raw_url = parse_url_argument(args).ok_or_else(|| {
            AppError::MissingArgument(format!("{} requires a URL argument", self.config.app_name))
        })?;
        let url = validate_ws_url(raw_url)?;

        leg.set_variable(URL_VARIABLE, raw_url);

        let settings = self.config.transport_settings(raw_url);
        let transport = self.connector.connect(&settings).await?;

        info!(
            url = %redact_url(&url),
            secure = is_secure(&url),
            "Relaying call audio"
        );

        let relay = FrameRelay::new(leg, transport, self.config.relay_settings());
        Ok(relay.run().await)
    }
}

#[async_trait]
impl HostApplication for AudioWsApp {
    fn name(&self) -> &str {
        &self.config.app_name
    }

    fn state(&self) -> AppState {
        self.entry.lock().state
    }

    async fn start(&self, args: &str, leg: Box<dyn CallLeg>) -> i32 {
        match self.run(args, leg).await {
            Ok(report) => report.exit_status(),
            Err(e @ (AppError::MissingArgument(_) | AppError::InvalidUrl(_) | AppError::Stopped(_))) => {
                warn!("{} not started: {}", self.config.app_name, e);
                -1
            }
            Err(e) => {
                error!("{} failed: {}", self.config.app_name, e);
                -1
            }
        }
    }

    fn stop(&self) {
        let mut entry = self.entry.lock();
        if entry.state.can_stop() {
            entry.transition(AppState::Stopped);
            info!(
                active_sessions = entry.active_sessions,
                uptime_secs = entry.uptime().as_secs(),
                "{} stopped", self.config.app_name
            );
        }
    }
}
