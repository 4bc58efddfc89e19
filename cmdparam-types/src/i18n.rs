use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Localized messages, looked up by key.
///
/// Used to resolve the label and description keys of [`RenderingInformation`](crate::rendering::RenderingInformation).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceBundle {
    messages: HashMap<String, String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ResourceBundleError {
    #[error("Failed to parse resource bundle")]
    Parse {
        #[source] cause: serde_json::Error,
    },
}

impl ResourceBundle {

    pub fn new() -> Self {
        Default::default()
    }

    /// Parses a flat JSON object of keys to messages.
    pub fn from_json(json: &str) -> Result<Self, ResourceBundleError> {
        serde_json::from_str(json)
            .map_err(|cause| ResourceBundleError::Parse { cause })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) -> Option<String> {
        self.messages.insert(key.into(), message.into())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ResourceBundle
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item=(K, V)>>(iter: T) -> Self {
        Self {
            messages: iter.into_iter()
                .map(|(key, message)| (key.into(), message.into()))
                .collect(),
        }
    }
}
