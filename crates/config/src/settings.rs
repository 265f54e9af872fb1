use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use meterbill_recon::{Pricing, PRICE_COLOR, PRICE_MONO, TAX_RATE};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "meterbill";

/// Fallback data directory when the platform has no data dir.
pub const FALLBACK_DATA_DIR: &str = "meterbill_data";

/// Unit prices and tax rate applied to counted impressions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub mono_price: f64,
    pub color_price: f64,
    pub tax_rate: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            mono_price: PRICE_MONO,
            color_price: PRICE_COLOR,
            tax_rate: TAX_RATE,
        }
    }
}

impl From<PricingSettings> for Pricing {
    fn from(p: PricingSettings) -> Self {
        Pricing {
            mono_price: p.mono_price,
            color_price: p.color_price,
            tax_rate: p.tax_rate,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where records are stored. `None` = platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    pub pricing: PricingSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file yields defaults; an unreadable
    /// or malformed one is logged and yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Data directory to use: explicit override, then the settings file, then
    /// the platform data dir, then `./meterbill_data`.
    pub fn resolved_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing.into()
    }
}
