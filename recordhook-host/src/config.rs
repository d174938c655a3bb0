//! Plugin construction parameters, optionally read from a TOML file.
//!
//! ```toml
//! unsecure = "region=emea"
//! secure = "api-key"
//!
//! [images]
//! pre = "before"
//! post = "after"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_PRE_IMAGE_NAME: &str = "preimage";
pub const DEFAULT_POST_IMAGE_NAME: &str = "postimage";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The two opaque configuration strings plus the image names the decoder reads.
///
/// `unsecure` and `secure` are passed through unopened to callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub unsecure: Option<String>,
    pub secure: Option<String>,
    pub pre_image_name: String,
    pub post_image_name: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            unsecure: None,
            secure: None,
            pre_image_name: DEFAULT_PRE_IMAGE_NAME.to_string(),
            post_image_name: DEFAULT_POST_IMAGE_NAME.to_string(),
        }
    }
}

impl PluginConfig {
    pub fn new(unsecure: Option<String>, secure: Option<String>) -> Self {
        Self {
            unsecure,
            secure,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_image_names(mut self, pre: impl Into<String>, post: impl Into<String>) -> Self {
        self.pre_image_name = pre.into();
        self.post_image_name = post.into();
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.into_config())
    }

    /// Loads config from `path`. A missing file yields defaults; an
    /// unreadable or malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No plugin config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded plugin config from {:?}", path);
        Ok(config)
    }
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    unsecure: Option<String>,
    #[serde(default)]
    secure: Option<String>,
    #[serde(default)]
    images: ImageSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ImageSection {
    pre: Option<String>,
    post: Option<String>,
}

impl ConfigFile {
    fn into_config(self) -> PluginConfig {
        PluginConfig {
            unsecure: self.unsecure,
            secure: self.secure,
            pre_image_name: self
                .images
                .pre
                .unwrap_or_else(|| DEFAULT_PRE_IMAGE_NAME.to_string()),
            post_image_name: self
                .images
                .post
                .unwrap_or_else(|| DEFAULT_POST_IMAGE_NAME.to_string()),
        }
    }
}
