//! Environment variable parsing with type safety.
//!
//! Provides a type-safe parser for `CC_OBS_*` environment variables that
//! collects errors instead of stopping at the first one.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvError {
    /// Invalid value for a variable.
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    /// Invalid log level.
    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    Env(String),
}

/// A value tagged with its source, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> Sourced<T> {
    pub fn from_env(value: T, var: String) -> Self {
        Self {
            value,
            source: ConfigSource::Env(var),
        }
    }

    pub fn default_value(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::Default,
        }
    }
}

/// Type-safe environment variable parser.
///
/// Values are looked up through `lookup`, which is `std::env::var` outside of
/// tests.
pub struct EnvParser {
    prefix: &'static str,
    lookup: Box<dyn Fn(&str) -> Option<String>>,
    errors: Vec<EnvError>,
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvParser {
    /// Create a parser over the process environment with the `CC_OBS_` prefix.
    pub fn new() -> Self {
        Self::with_lookup(|name| env::var(name).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            prefix: "CC_OBS_",
            lookup: Box::new(lookup),
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn raw(&self, var_name: &str) -> Option<String> {
        (self.lookup)(var_name).filter(|v| !v.trim().is_empty())
    }

    /// Get a string value with default.
    pub fn get_string(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match self.raw(&var_name) {
            Some(value) => Sourced::from_env(value, var_name),
            None => Sourced::default_value(default.to_string()),
        }
    }

    /// Get an optional path.
    pub fn get_path(&mut self, name: &str) -> Option<Sourced<PathBuf>> {
        let var_name = self.var_name(name);
        self.raw(&var_name)
            .map(|value| Sourced::from_env(PathBuf::from(value), var_name))
    }

    /// Get a value restricted to `allowed` (case-insensitive).
    pub fn get_choice(
        &mut self,
        name: &str,
        allowed: &[&str],
        default: &str,
    ) -> Sourced<String> {
        let var_name = self.var_name(name);
        let Some(value) = self.raw(&var_name) else {
            return Sourced::default_value(default.to_string());
        };
        let lowered = value.to_lowercase();
        if allowed.contains(&lowered.as_str()) {
            Sourced::from_env(lowered, var_name)
        } else {
            self.errors.push(EnvError::InvalidValue {
                var: var_name,
                expected: allowed.join("|"),
                value,
            });
            Sourced::default_value(default.to_string())
        }
    }

    /// Get a tracing level or filter directive.
    pub fn get_log_level(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        let Some(value) = self.raw(&var_name) else {
            return Sourced::default_value(default.to_string());
        };
        if tracing_subscriber::EnvFilter::try_new(&value).is_ok() {
            Sourced::from_env(value, var_name)
        } else {
            self.errors.push(EnvError::InvalidLogLevel {
                var: var_name,
                value,
            });
            Sourced::default_value(default.to_string())
        }
    }
}
