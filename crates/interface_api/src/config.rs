//! Application configuration
//!
//! Values come from environment variables prefixed with `APP`, with `__`
//! separating both the prefix and nested keys, on top of the defaults below:
//!
//! ```text
//! APP__SERVER__PORT=8080
//! APP__DATABASE__URL=postgres://localhost/crediya
//! APP__APPLICANT_DIRECTORY__TOKEN=...
//! APP__QUEUES__ASSESSMENT_RESULTS=resultado-evaluacion
//! APP__LISTENER__MAX_RECEIVE_COUNT=5
//! APP__LENDING__DISPATCH_MODE=background
//! ```

use std::time::Duration;

use serde::Deserialize;

use domain_lending::{DispatchMode, ListenerConfig, ServiceConfig};
use infra_db::DatabaseConfig;
use infra_http::ApplicantDirectoryConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseSettings,
    pub applicant_directory: ApplicantDirectorySettings,
    pub queues: QueueNames,
    pub listener: ListenerSettings,
    pub lending: LendingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/crediya".to_string(),
            max_connections: 10,
            min_connections: 2,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicantDirectorySettings {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApplicantDirectorySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueNames {
    pub assessment_requests: String,
    pub assessment_results: String,
    pub notifications: String,
    pub reports: String,
}

impl Default for QueueNames {
    fn default() -> Self {
        Self {
            assessment_requests: "evaluacion-capacidad".to_string(),
            assessment_results: "resultado-evaluacion".to_string(),
            notifications: "notificaciones".to_string(),
            reports: "reportes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerSettings {
    pub enabled: bool,
    pub workers: usize,
    pub batch_size: u32,
    pub wait_time_secs: u64,
    pub visibility_timeout_secs: u64,
    pub max_receive_count: Option<u32>,
    pub error_backoff_secs: u64,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: 2,
            batch_size: 10,
            wait_time_secs: 20,
            visibility_timeout_secs: 30,
            max_receive_count: None,
            error_backoff_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LendingSettings {
    pub dispatch_mode: DispatchMode,
    pub single_application_per_applicant: bool,
}

impl AppConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true)
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database.url)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
    }

    pub fn applicant_directory_config(&self) -> ApplicantDirectoryConfig {
        ApplicantDirectoryConfig {
            base_url: self.applicant_directory.base_url.clone(),
            token: self.applicant_directory.token.clone(),
            timeout: Duration::from_secs(self.applicant_directory.timeout_secs),
        }
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            queue: self.queues.assessment_results.clone(),
            workers: self.listener.workers,
            batch_size: self.listener.batch_size,
            wait_time: Duration::from_secs(self.listener.wait_time_secs),
            visibility_timeout: Duration::from_secs(self.listener.visibility_timeout_secs),
            max_receive_count: self.listener.max_receive_count,
            error_backoff: Duration::from_secs(self.listener.error_backoff_secs),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            dispatch_mode: self.lending.dispatch_mode,
            single_application_per_applicant: self.lending.single_application_per_applicant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> AppConfig {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_environment(AppConfig::environment().source(Some(source))).unwrap()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = load(&[]);

        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.queues.assessment_results, "resultado-evaluacion");
        assert_eq!(config.listener.max_receive_count, None);
        assert_eq!(config.lending.dispatch_mode, DispatchMode::Inline);
        assert!(!config.lending.single_application_per_applicant);
    }

    #[test]
    fn test_nested_overrides() {
        let config = load(&[
            ("APP__SERVER__PORT", "9090"),
            ("APP__LOGGING__JSON", "true"),
            ("APP__APPLICANT_DIRECTORY__TOKEN", "secret"),
            ("APP__LISTENER__MAX_RECEIVE_COUNT", "5"),
            ("APP__LENDING__DISPATCH_MODE", "background"),
            ("APP__LENDING__SINGLE_APPLICATION_PER_APPLICANT", "true"),
        ]);

        assert_eq!(config.server.port, 9090);
        assert!(config.logging.json);
        assert_eq!(config.applicant_directory.token.as_deref(), Some("secret"));
        assert_eq!(config.listener_config().max_receive_count, Some(5));

        let service = config.service_config();
        assert_eq!(service.dispatch_mode, DispatchMode::Background);
        assert!(service.single_application_per_applicant);
    }

    #[test]
    fn test_listener_config_uses_results_queue() {
        let config = load(&[("APP__QUEUES__ASSESSMENT_RESULTS", "veredictos")]);
        let listener = config.listener_config();

        assert_eq!(listener.queue, "veredictos");
        assert_eq!(listener.wait_time, Duration::from_secs(20));
        assert_eq!(listener.visibility_timeout, Duration::from_secs(30));
    }
}
