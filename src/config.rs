//! Configuration supplied to the factory and exposed as a bean.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{downcast_concrete, Bean, BeanType, TypeDescriptor};

/// Ordered string properties with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    properties: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Parses the value as an integer; `None` when missing or malformed.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_str(key)?.trim().parse().ok()
    }

    /// Accepts `true`/`false`, `yes`/`no`, `on`/`off` and `1`/`0`, case-insensitively.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get_str(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Suppliers
// -------------------------------------------------------------------------------------------------

/// Supplies the configuration the factory registers during load.
pub trait ConfigurationSupplier: Send + Sync {
    fn current_config(&self) -> Configuration;
}

impl ConfigurationSupplier for Configuration {
    fn current_config(&self) -> Configuration {
        self.clone()
    }
}

impl<F> ConfigurationSupplier for F
where
    F: Fn() -> Configuration + Send + Sync,
{
    fn current_config(&self) -> Configuration {
        self()
    }
}

/// Reads `PREFIX_*` environment variables.
///
/// `APP_SERVER_PORT=8080` with prefix `APP` becomes `server.port = 8080`.
#[derive(Debug, Clone)]
pub struct EnvConfigurationSupplier {
    prefix: String,
}

impl EnvConfigurationSupplier {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn key_for(&self, variable: &str) -> Option<String> {
        let rest = variable.strip_prefix(&self.prefix)?.strip_prefix('_')?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.to_ascii_lowercase().replace('_', "."))
    }
}

impl ConfigurationSupplier for EnvConfigurationSupplier {
    fn current_config(&self) -> Configuration {
        std::env::vars()
            .filter_map(|(variable, value)| Some((self.key_for(&variable)?, value)))
            .collect()
    }
}

// -------------------------------------------------------------------------------------------------
// Bean
// -------------------------------------------------------------------------------------------------

/// The configuration bean, registered under its own qualified type name.
#[derive(Debug, Clone)]
pub struct ConfigurationManager {
    configuration: Configuration,
}

impl ConfigurationManager {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.configuration.get_str(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.configuration.get_int(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.configuration.get_bool(key)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.configuration.get_or(key, default)
    }
}

impl BeanType for ConfigurationManager {
    fn descriptor() -> &'static TypeDescriptor {
        static DESCRIPTOR: TypeDescriptor = TypeDescriptor::concrete(
            concat!(module_path!(), "::ConfigurationManager"),
            "ConfigurationManager",
        );
        &DESCRIPTOR
    }

    fn cast(bean: &Bean) -> Option<Arc<Self>> {
        downcast_concrete(bean)
    }
}
