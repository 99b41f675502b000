//! Plugin descriptor configuration.
//!
//! A [`PluginConfig`] replaces the static descriptor tables plugin ABIs
//! grow: it is constructed explicitly (usually as a `static`) and handed to
//! whichever host-format adapter wraps the processor. The runtime itself
//! only reads the `id` (recorded in state blobs).
//!
//! # Example
//!
//! ```ignore
//! pub static CONFIG: PluginConfig = PluginConfig::new("Lowpass", "org.opaline.lowpass")
//!     .with_vendor("Opaline Audio")
//!     .with_version(env!("CARGO_PKG_VERSION"))
//!     .with_features(&["audio-effect", "filter"]);
//! ```

/// Static plugin metadata.
#[derive(Debug, Clone, Copy)]
pub struct PluginConfig {
    /// Display name shown by hosts.
    pub name: &'static str,
    /// Stable reverse-DNS identifier; also keys state blobs.
    pub id: &'static str,
    /// Vendor name.
    pub vendor: &'static str,
    /// Vendor or product URL.
    pub url: &'static str,
    /// Version string.
    pub version: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Host-facing category tags (e.g. "audio-effect", "filter").
    pub features: &'static [&'static str],
}

impl PluginConfig {
    /// Create a configuration with the required fields.
    pub const fn new(name: &'static str, id: &'static str) -> Self {
        Self {
            name,
            id,
            vendor: "",
            url: "",
            version: "",
            description: "",
            features: &[],
        }
    }

    /// Set the vendor name.
    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Set the vendor/product URL.
    pub const fn with_url(mut self, url: &'static str) -> Self {
        self.url = url;
        self
    }

    /// Set the version string.
    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    /// Set the one-line description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Set the host-facing feature tags.
    pub const fn with_features(mut self, features: &'static [&'static str]) -> Self {
        self.features = features;
        self
    }
}
