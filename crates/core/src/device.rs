//! Per-user device registrations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::is_truthy;

/// The `deviceTokens` field of a user document: token → enabled flag.
///
/// Clients disable a device by writing `false` instead of deleting the key,
/// so the map distinguishes "registered" from "should receive pushes". Flags
/// are read loosely (see [`crate::value::is_truthy`]). Keys iterate in sorted
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceTokenMap(BTreeMap<String, Value>);

impl DeviceTokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` with the given enabled flag, replacing any prior flag.
    pub fn insert(&mut self, token: impl Into<String>, enabled: bool) {
        self.0.insert(token.into(), Value::Bool(enabled));
    }

    /// Tokens whose flag is truthy, in key order.
    pub fn active_tokens(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, enabled)| is_truthy(enabled))
            .map(|(token, _)| token.clone())
            .collect()
    }

    /// Delete the given keys, returning how many were present.
    pub fn remove_tokens(&mut self, tokens: &[String]) -> usize {
        tokens
            .iter()
            .filter(|token| self.0.remove(token.as_str()).is_some())
            .count()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Into<String>> FromIterator<(T, bool)> for DeviceTokenMap {
    fn from_iter<I: IntoIterator<Item = (T, bool)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (token, enabled) in iter {
            map.insert(token, enabled);
        }
        map
    }
}
