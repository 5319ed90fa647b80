//! Tracking scripts and interstitial configuration embedded on a link.

use serde::{Deserialize, Serialize};

/// Default interstitial delay before the client-side redirect fires.
pub const DEFAULT_DELAY_SECONDS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Serve the interstitial even without scripts, hiding the referrer.
    #[serde(default)]
    pub cloaking: bool,
    #[serde(default = "default_delay")]
    pub delay_seconds: u32,
    #[serde(default)]
    pub scripts: Vec<TrackingScript>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cloaking: false,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            scripts: Vec::new(),
        }
    }
}

fn default_delay() -> u32 {
    DEFAULT_DELAY_SECONDS
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Head,
    Body,
    Footer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingScript {
    #[serde(flatten)]
    pub kind: ScriptKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub placement: Placement,
}

/// A tracking integration, keyed by its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptKind {
    GoogleAnalytics { measurement_id: String },
    FacebookPixel { pixel_id: String },
    GoogleTagManager { container_id: String },
    Custom { code: String },
}
