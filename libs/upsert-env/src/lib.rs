// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;

mod map;

pub use map::MapEnvironment;

/// Source of configuration values. Everything that reads configuration goes through this trait, so
/// tests can supply a [`MapEnvironment`] instead of mutating the process environment.
pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, EnvError> {
        match self.get(key) {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" | "enable" => Ok(true),
                "false" | "0" | "no" | "off" | "disabled" | "disable" => Ok(false),
                _ => Err(EnvError::InvalidBoolean {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }

    fn get_or_else(&self, key: &str, default_value: &str) -> String {
        self.get(key).unwrap_or(default_value.to_string())
    }

    /// Comma-separated list. Empty entries are dropped.
    fn get_list(&self, key: &str, default_value: Vec<String>) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or(default_value)
    }
}

/// Parse a numeric value, reporting the key on failure.
pub fn parse_number<T: FromStr>(
    env: &dyn Environment,
    key: &str,
) -> Result<Option<T>, EnvError> {
    env.get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| EnvError::InvalidNumber {
                    key: key.to_string(),
                    value,
                })
        })
        .transpose()
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid value for {key}: {value}. Expected a number")]
    InvalidNumber { key: String, value: String },

    #[error("Missing required environment variable {key}")]
    Missing { key: String },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_values() {
        let env = MapEnvironment::from([("A", "Yes"), ("B", "off"), ("C", "maybe")]);

        assert!(env.enabled("A", false).unwrap());
        assert!(!env.enabled("B", true).unwrap());
        assert!(env.enabled("MISSING", true).unwrap());
        assert!(matches!(
            env.enabled("C", false),
            Err(EnvError::InvalidBoolean { .. })
        ));
    }

    #[test]
    fn list_values() {
        let env = MapEnvironment::from([("SCHEMAS", "public, app,,audit ")]);

        assert_eq!(
            env.get_list("SCHEMAS", vec![]),
            vec!["public".to_string(), "app".to_string(), "audit".to_string()]
        );
        assert_eq!(
            env.get_list("OTHER", vec!["public".to_string()]),
            vec!["public".to_string()]
        );
    }

    #[test]
    fn numeric_values() {
        let env = MapEnvironment::from([("SIZE", "12"), ("BAD", "twelve")]);

        assert_eq!(parse_number::<usize>(&env, "SIZE").unwrap(), Some(12));
        assert_eq!(parse_number::<usize>(&env, "MISSING").unwrap(), None);
        assert!(matches!(
            parse_number::<usize>(&env, "BAD"),
            Err(EnvError::InvalidNumber { .. })
        ));
    }
}
