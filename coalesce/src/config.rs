//! Registry settings.

use refmerge_core::Script;
use serde::{Deserialize, Serialize};

/// Settings of a [`crate::ReferentRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Reject a lookup whose hits are not all mutually compatible
    pub must_be_single: bool,
    /// On merge, a candidate's exclusive values replace the survivor's
    pub overwrite_on_merge: bool,
    /// Skip tagged term variants when picking canonical text
    pub canonical_ignores_tagged: bool,
    /// Primary script; `None` means detect it from the document
    pub script: Option<Script>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            must_be_single: true,
            overwrite_on_merge: true,
            canonical_ignores_tagged: false,
            script: None,
        }
    }
}

impl RegistryConfig {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [`must_be_single`](Self::must_be_single).
    #[must_use]
    pub fn with_must_be_single(mut self, value: bool) -> Self {
        self.must_be_single = value;
        self
    }

    /// Set [`overwrite_on_merge`](Self::overwrite_on_merge).
    #[must_use]
    pub fn with_overwrite_on_merge(mut self, value: bool) -> Self {
        self.overwrite_on_merge = value;
        self
    }

    /// Set [`canonical_ignores_tagged`](Self::canonical_ignores_tagged).
    #[must_use]
    pub fn with_canonical_ignores_tagged(mut self, value: bool) -> Self {
        self.canonical_ignores_tagged = value;
        self
    }

    /// Pin the primary script instead of detecting it.
    #[must_use]
    pub fn with_script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }
}
