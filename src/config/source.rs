//! Flat string-keyed configuration sources with typed lookups.

use std::{collections::HashMap, str::FromStr};

use super::error::{ConfigError, ValueKind};

/// Read-only key/value store of tunables.
///
/// Implementors only supply [`get_raw`](Self::get_raw); the typed getters parse
/// on demand and report malformed values as [`ConfigError::Parse`]. A missing
/// key is `Ok(None)` so callers can apply their own default.
pub trait ConfigurationSource {
    /// Raw string value configured for `key`, if any.
    fn get_raw(&self, key: &str) -> Option<&str>;

    /// Read `key` as a 32-bit integer.
    fn get_int(&self, key: &str) -> Result<Option<i32>, ConfigError> {
        parse_scalar(key, self.get_raw(key), ValueKind::Int)
    }

    /// Read `key` as a 64-bit integer.
    fn get_long(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        parse_scalar(key, self.get_raw(key), ValueKind::Long)
    }

    /// Read `key` as a floating point number.
    fn get_float(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        parse_scalar(key, self.get_raw(key), ValueKind::Float)
    }

    /// Read `key` as a boolean. Accepts `true`/`false` in any case.
    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.get_raw(key) {
            None => Ok(None),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(parse_error(key, raw, ValueKind::Bool)),
            },
        }
    }

    /// Read `key` as a string, untouched.
    fn get_str(&self, key: &str) -> Option<String> {
        self.get_raw(key).map(str::to_owned)
    }
}

fn parse_scalar<T: FromStr>(
    key: &str,
    raw: Option<&str>,
    kind: ValueKind,
) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| parse_error(key, value, kind))
    })
    .transpose()
}

fn parse_error(key: &str, value: &str, kind: ValueKind) -> ConfigError {
    ConfigError::Parse {
        key: key.to_owned(),
        value: value.to_owned(),
        kind,
    }
}

/// In-memory configuration map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    values: HashMap<String, String>,
}

impl Configuration {
    /// Create an empty configuration; every lookup falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    /// Remove `key`, returning the value it held.
    pub fn unset(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Number of configured keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigurationSource for Configuration {
    fn get_raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Configuration
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<S: ConfigurationSource + ?Sized> ConfigurationSource for &S {
    fn get_raw(&self, key: &str) -> Option<&str> {
        (**self).get_raw(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookups_parse_trimmed_values() {
        let conf = Configuration::new()
            .with("a.int", " 7 ")
            .with("a.long", "9000000000")
            .with("a.float", "1.5")
            .with("a.bool", "TRUE");
        assert_eq!(conf.get_int("a.int"), Ok(Some(7)));
        assert_eq!(conf.get_long("a.long"), Ok(Some(9_000_000_000)));
        assert_eq!(conf.get_float("a.float"), Ok(Some(1.5)));
        assert_eq!(conf.get_bool("a.bool"), Ok(Some(true)));
        assert_eq!(conf.get_int("missing"), Ok(None));
        assert_eq!(conf.get_str("missing"), None);
    }

    #[test]
    fn malformed_values_surface_parse_errors() {
        let conf: Configuration = [("x", "ten"), ("y", "maybe"), ("z", "9000000000")]
            .into_iter()
            .collect();
        assert_eq!(
            conf.get_long("x"),
            Err(ConfigError::Parse {
                key: "x".into(),
                value: "ten".into(),
                kind: ValueKind::Long,
            })
        );
        assert!(matches!(
            conf.get_bool("y"),
            Err(ConfigError::Parse {
                kind: ValueKind::Bool,
                ..
            })
        ));
        // Out of range for an int even though it is a valid long.
        assert!(conf.get_int("z").is_err());
    }

    #[test]
    fn set_and_unset_round_trip() {
        let mut conf = Configuration::new();
        assert!(conf.is_empty());
        conf.set("k", 3);
        assert_eq!(conf.get_raw("k"), Some("3"));
        assert_eq!(conf.unset("k").as_deref(), Some("3"));
        assert_eq!(conf.len(), 0);
    }
}
