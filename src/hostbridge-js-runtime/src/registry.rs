//! Process-wide record of protocol message identifiers, grouped by the direction the
//! messages travel in. The host records identifiers as it constructs message types,
//! scripts read them back through the `registry` module.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use spin::{Lazy, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficDirection {
    /// Sent by the client, handled by the server.
    Serverbound,
    /// Sent by the server, handled by the client.
    Clientbound,
}

impl TrafficDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficDirection::Serverbound => "serverbound",
            TrafficDirection::Clientbound => "clientbound",
        }
    }
}

impl fmt::Display for TrafficDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown traffic direction `{0}`, expected `serverbound` or `clientbound`")]
pub struct UnknownDirection(String);

impl FromStr for TrafficDirection {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serverbound" => Ok(TrafficDirection::Serverbound),
            "clientbound" => Ok(TrafficDirection::Clientbound),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

/// Message identifiers per direction. Recording is idempotent and identifiers keep
/// the order they were first recorded in.
#[derive(Default)]
pub struct MessageRegistry {
    identifiers: RwLock<HashMap<TrafficDirection, IndexSet<String>>>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the identifier was not recorded for `direction` before.
    pub fn record(&self, direction: TrafficDirection, identifier: impl Into<String>) -> bool {
        self.identifiers
            .write()
            .entry(direction)
            .or_default()
            .insert(identifier.into())
    }

    pub fn identifiers(&self, direction: TrafficDirection) -> Vec<String> {
        self.identifiers
            .read()
            .get(&direction)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, direction: TrafficDirection, identifier: &str) -> bool {
        self.identifiers
            .read()
            .get(&direction)
            .is_some_and(|ids| ids.contains(identifier))
    }

    /// Number of identifiers recorded for `direction`.
    pub fn len(&self, direction: TrafficDirection) -> usize {
        self.identifiers
            .read()
            .get(&direction)
            .map_or(0, IndexSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.read().values().all(IndexSet::is_empty)
    }
}

pub static MESSAGE_REGISTRY: Lazy<MessageRegistry> = Lazy::new(MessageRegistry::new);
