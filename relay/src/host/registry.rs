//! Application Registry
//!
//! Maps application names to the [`HostApplication`] invoked for a call.
//! Names are matched case-insensitively. Registration replaces the static
//! "register on module load" step of a telephony host: callers register
//! explicitly and unregister on shutdown.
//!
//! # Usage
//!
//! ```rust,no_run
//! use audiows_relay::config::RelayConfig;
//! use audiows_relay::host::{ApplicationRegistry, AudioWsApp};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ApplicationRegistry::new();
//! registry.register(Arc::new(AudioWsApp::new(RelayConfig::default())))?;
//! assert!(registry.contains("audiows"));
//! # Ok(())
//! # }
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::lifecycle::HostApplication;
use crate::core::leg::CallLeg;
use crate::errors::{AppError, AppResult};

/// Shared handle to a registered application
pub type SharedApplication = Arc<dyn HostApplication>;

#[derive(Default)]
pub struct ApplicationRegistry {
    apps: RwLock<HashMap<String, SharedApplication>>,
}

fn registry_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application under its own name.
    ///
    /// # Errors
    /// Returns [`AppError::AlreadyRegistered`] if the name is taken.
    pub fn register(&self, app: SharedApplication) -> AppResult<()> {
        let key = registry_key(app.name());
        let mut apps = self.apps.write();
        if apps.contains_key(&key) {
            return Err(AppError::AlreadyRegistered(app.name().to_string()));
        }
        info!(app = %app.name(), "Registered application");
        apps.insert(key, app);
        Ok(())
    }

    /// Remove an application and stop it.
    ///
    /// # Errors
    /// Returns [`AppError::NotRegistered`] if no application has that name.
    pub fn unregister(&self, name: &str) -> AppResult<SharedApplication> {
        let app = self
            .apps
            .write()
            .remove(&registry_key(name))
            .ok_or_else(|| AppError::NotRegistered(name.to_string()))?;
        app.stop();
        info!(app = %app.name(), "Unregistered application");
        Ok(app)
    }

    /// Stop and remove every application
    pub fn unregister_all(&self) {
        let apps: Vec<SharedApplication> = self.apps.write().drain().map(|(_, app)| app).collect();
        for app in apps {
            app.stop();
            info!(app = %app.name(), "Unregistered application");
        }
    }

    pub fn get(&self, name: &str) -> Option<SharedApplication> {
        self.apps.read().get(&registry_key(name)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.apps.read().contains_key(&registry_key(name))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .apps
            .read()
            .values()
            .map(|app| app.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Invoke an application for one call. Unknown names return `-1`.
    pub async fn invoke(&self, name: &str, args: &str, leg: Box<dyn CallLeg>) -> i32 {
        match self.get(name) {
            Some(app) => app.start(args, leg).await,
            None => {
                warn!(app = %name, "No such application");
                -1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::core::leg::ChannelCallLeg;
    use crate::host::{AppState, AudioWsApp};

    fn app_named(name: &str) -> Arc<AudioWsApp> {
        Arc::new(AudioWsApp::new(RelayConfig {
            app_name: name.to_string(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ApplicationRegistry::new();
        registry.register(app_named("AudioWS")).unwrap();

        assert!(registry.contains("AudioWS"));
        assert!(registry.contains("audiows"));
        assert_eq!(registry.get("AUDIOWS").unwrap().name(), "AudioWS");
        assert_eq!(registry.names(), vec!["AudioWS".to_string()]);
    }

    #[test]
    fn test_register_duplicate_fails() {
        let registry = ApplicationRegistry::new();
        registry.register(app_named("AudioWS")).unwrap();

        let result = registry.register(app_named("audiows"));
        assert!(matches!(result, Err(AppError::AlreadyRegistered(_))));
    }

    #[test]
    fn test_unregister_stops_application() {
        let registry = ApplicationRegistry::new();
        let app = app_named("AudioWS");
        registry.register(app.clone()).unwrap();

        registry.unregister("AudioWS").unwrap();
        assert!(!registry.contains("AudioWS"));
        assert_eq!(app.state(), AppState::Stopped);

        let result = registry.unregister("AudioWS");
        assert!(matches!(result, Err(AppError::NotRegistered(_))));
    }

    #[test]
    fn test_unregister_all() {
        let registry = ApplicationRegistry::new();
        let first = app_named("First");
        let second = app_named("Second");
        registry.register(first.clone()).unwrap();
        registry.register(second.clone()).unwrap();

        registry.unregister_all();
        assert!(registry.names().is_empty());
        assert_eq!(first.state(), AppState::Stopped);
        assert_eq!(second.state(), AppState::Stopped);
    }

    #[tokio::test]
    async fn test_invoke_unknown_application() {
        let registry = ApplicationRegistry::new();
        let (leg, _inbound, _outbound) = ChannelCallLeg::pair(1);

        assert_eq!(registry.invoke("Missing", "ws://x", Box::new(leg)).await, -1);
    }
}
