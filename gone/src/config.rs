//! Framework configuration is read with the [config] crate from an optional `gone.json` file,
//! overridden by environment variables prefixed with `GONE_`. Nested keys are separated by a
//! double underscore, e.g. `GONE_SERVER__PORT` sets `server.port`.
//!
//! The same configuration is available to components through [ConfigProvider], a named provider
//! registered as `config` by the [Application](crate::application::Application):
//!
//! ```
//! use gone::config::CONFIG_PROVIDER_NAME;
//! use gone_di::field::Inject;
//! use gone_di::Goner;
//!
//! #[derive(Goner, Default)]
//! struct Server {
//!     #[gone(name = "config", extend = "server.port,default=8080")]
//!     port: Inject<u16>,
//!     #[gone(name = "config", extend = "server.host,default=localhost")]
//!     host: Inject<String>,
//! }
//!
//! assert_eq!(CONFIG_PROVIDER_NAME, "config");
//! ```

use config::{Config, ConfigError, Environment, File};
use gone_di::instance_provider::{AnyValue, ErrorPtr, TypeInfo};
use gone_di::provider::NamedProvider;
use gone_di::Goner;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const CONFIG_ENV_PREFIX: &str = "GONE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "gone.json";

/// Name under which [ConfigProvider] is registered.
pub const CONFIG_PROVIDER_NAME: &str = "config";

pub(crate) fn convert_error<E: Error + Send + Sync + 'static>(error: E) -> ErrorPtr {
    Arc::new(error) as ErrorPtr
}

/// Loads configuration from [CONFIG_FILE] and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
}

/// Framework configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    pub install_tracing_logger: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
        }
    }
}

impl ApplicationConfig {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            install_tracing_logger: optional(config, "install_tracing_logger")?
                .unwrap_or(default.install_tracing_logger),
        })
    }
}

fn optional<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ConfigError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(error) => Err(error),
    }
}

/// Errors returned by [ConfigProvider].
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum ConfigProviderError {
    #[error("Missing configuration value: {0}")]
    MissingKey(String),
    #[error("Invalid default value '{value}' for configuration key: {key}")]
    InvalidDefault { key: String, value: String },
    #[error("Configuration values of type {0} are not supported")]
    UnsupportedType(String),
    #[error("Empty configuration key")]
    EmptyKey,
}

type LookupFunction = fn(&Config, &str, Option<&str>) -> Result<AnyValue, ErrorPtr>;

fn lookup<T>(config: &Config, key: &str, default: Option<&str>) -> Result<AnyValue, ErrorPtr>
where
    T: DeserializeOwned + FromStr + Send + Sync + 'static,
{
    match optional::<T>(config, key).map_err(convert_error)? {
        Some(value) => Ok(Box::new(value)),
        None => {
            let default = default
                .ok_or_else(|| convert_error(ConfigProviderError::MissingKey(key.to_string())))?;

            default
                .parse::<T>()
                .map(|value| Box::new(value) as AnyValue)
                .map_err(|_| {
                    convert_error(ConfigProviderError::InvalidDefault {
                        key: key.to_string(),
                        value: default.to_string(),
                    })
                })
        }
    }
}

fn lookup_list(config: &Config, key: &str, default: Option<&str>) -> Result<AnyValue, ErrorPtr> {
    match optional::<Vec<String>>(config, key).map_err(convert_error)? {
        Some(value) => Ok(Box::new(value)),
        None => default
            .map(|default| {
                Box::new(
                    default
                        .split(';')
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                ) as AnyValue
            })
            .ok_or_else(|| convert_error(ConfigProviderError::MissingKey(key.to_string()))),
    }
}

/// Splits `key[,default=value]` into its parts.
fn parse_conf(conf: &str) -> (&str, Option<&str>) {
    let mut parts = conf.split(',').map(str::trim);
    let key = parts.next().unwrap_or_default();
    let default = parts.find_map(|part| part.strip_prefix("default="));
    (key, default)
}

/// Named provider of configuration values. Fields refer to it by name, passing the key and an
/// optional default value, separated by a comma: `server.port,default=8080`.
///
/// Supported value types are `String`, `bool`, all integer types, `f32`, `f64` and `Vec<String>`
/// (defaults for lists are separated by `;`).
#[derive(Goner)]
#[goner(named_provider)]
pub struct ConfigProvider {
    config: Config,
    lookups: Vec<(TypeInfo, LookupFunction)>,
}

impl ConfigProvider {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            lookups: vec![
                (TypeInfo::of::<String>(), lookup::<String>),
                (TypeInfo::of::<bool>(), lookup::<bool>),
                (TypeInfo::of::<i8>(), lookup::<i8>),
                (TypeInfo::of::<i16>(), lookup::<i16>),
                (TypeInfo::of::<i32>(), lookup::<i32>),
                (TypeInfo::of::<i64>(), lookup::<i64>),
                (TypeInfo::of::<isize>(), lookup::<isize>),
                (TypeInfo::of::<u8>(), lookup::<u8>),
                (TypeInfo::of::<u16>(), lookup::<u16>),
                (TypeInfo::of::<u32>(), lookup::<u32>),
                (TypeInfo::of::<u64>(), lookup::<u64>),
                (TypeInfo::of::<usize>(), lookup::<usize>),
                (TypeInfo::of::<f32>(), lookup::<f32>),
                (TypeInfo::of::<f64>(), lookup::<f64>),
                (TypeInfo::of::<Vec<String>>(), lookup_list),
            ],
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl NamedProvider for ConfigProvider {
    fn provide(&self, conf: &str, requested: TypeInfo) -> Result<AnyValue, ErrorPtr> {
        let (key, default) = parse_conf(conf);
        if key.is_empty() {
            return Err(convert_error(ConfigProviderError::EmptyKey));
        }

        debug!(key, requested = requested.name, "Providing configuration value.");

        let (_, lookup) = self
            .lookups
            .iter()
            .find(|(type_info, _)| *type_info == requested)
            .ok_or_else(|| {
                convert_error(ConfigProviderError::UnsupportedType(requested.name.to_string()))
            })?;

        lookup(&self.config, key, default)
    }
}
