//! Tree configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration applied when a tree is created.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct TreeConfig {
    /// Separator used to split input paths and rebuild directory paths.
    #[builder(default = "std::path::MAIN_SEPARATOR")]
    #[serde(default = "default_separator")]
    pub separator: char,
}

pub(crate) fn default_separator() -> char {
    std::path::MAIN_SEPARATOR
}

impl TreeConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(separator) = self.separator {
            if separator.is_control() || separator.is_alphanumeric() {
                return Err(format!("Unusable path separator: {separator:?}"));
            }
        }
        Ok(())
    }
}

impl TreeConfig {
    /// Create a new tree config builder.
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::default()
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}
