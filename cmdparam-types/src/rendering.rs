use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::i18n::ResourceBundle;

/// Display metadata of a parameter.
///
/// The engine only reads the `hidden` flag and the description from it; everything else is
/// passed through to whatever renders the parameter. Label and description may be given as
/// resource bundle keys, see [`RenderingInformation::apply_resource_bundle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenderingInformation {
    pub label_key: Option<String>,
    pub description_key: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub hidden: bool,
    pub read_only: bool,
    /// The value is a secret and must not be displayed.
    pub obscured: bool,
    pub hint: RenderingHint,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderingHint {
    #[default]
    Plain,
    TextField { width: u16, height: u16 },
    /// A selection from the allowed values of a fixed-values parameter.
    OptionList,
}

impl RenderingInformation {

    pub fn new() -> Self {
        Default::default()
    }

    pub fn text_field(width: u16, height: u16) -> Self {
        Self {
            hint: RenderingHint::TextField { width, height },
            ..Default::default()
        }
    }

    pub fn option_list() -> Self {
        Self {
            hint: RenderingHint::OptionList,
            ..Default::default()
        }
    }

    pub fn with_label_key(mut self, key: impl Into<String>) -> Self {
        self.label_key = Some(key.into());
        self
    }

    pub fn with_description_key(mut self, key: impl Into<String>) -> Self {
        self.description_key = Some(key.into());
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_obscured(mut self, obscured: bool) -> Self {
        self.obscured = obscured;
        self
    }

    /// Replaces label and description with the messages their keys map to.
    ///
    /// Keys missing from the bundle leave the current text in place.
    pub fn apply_resource_bundle(&mut self, bundle: &ResourceBundle) {
        if let Some(key) = &self.label_key {
            match bundle.get(key) {
                Some(label) => self.label = Some(label.to_owned()),
                None => debug!("No message for label key '{key}' in resource bundle."),
            }
        }
        if let Some(key) = &self.description_key {
            match bundle.get(key) {
                Some(description) => self.description = Some(description.to_owned()),
                None => debug!("No message for description key '{key}' in resource bundle."),
            }
        }
    }
}

/// Dimensions of the text fields in a definition's default rendering information.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenderingDefaults {
    pub text_field_width: u16,
    pub map_rows: u16,
    pub collection_rows: u16,
}

impl Default for RenderingDefaults {
    fn default() -> Self {
        Self {
            text_field_width: 50,
            map_rows: 5,
            collection_rows: 1,
        }
    }
}
