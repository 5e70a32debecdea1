//! TOML configuration.
//!
//! ```toml
//! [registry]
//! must_be_single = true
//! overwrite_on_merge = true
//! canonical_ignores_tagged = false
//! script = "latin"          # omit to detect from the document
//!
//! [required]
//! street = ["GEO"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use refmerge_coalesce::RegistryConfig;
use refmerge_core::{attrs, ReferentKind};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Everything a [`crate::DocumentSession`] can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Merge engine settings
    pub registry: RegistryConfig,
    /// Extra attributes the base registry requires, keyed by kind name
    pub required: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("loading config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Required attributes with the kind names resolved.
    pub fn required_by_kind(&self) -> Result<BTreeMap<ReferentKind, Vec<String>>> {
        let mut resolved: BTreeMap<ReferentKind, Vec<String>> = BTreeMap::new();
        for (name, names) in &self.required {
            let kind: ReferentKind = name
                .parse()
                .map_err(|_| Error::config(format!("unknown kind '{}' in [required]", name)))?;
            resolved
                .entry(kind)
                .or_default()
                .extend(names.iter().map(|a| attrs::normalize(a)));
        }
        Ok(resolved)
    }

    /// Reject unknown kinds and empty attribute names.
    pub fn validate(&self) -> Result<()> {
        for (kind, attrs) in self.required_by_kind()? {
            if attrs.iter().any(String::is_empty) {
                return Err(Error::config(format!(
                    "empty required attribute for {}",
                    kind
                )));
            }
        }
        Ok(())
    }
}
