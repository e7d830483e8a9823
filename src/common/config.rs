//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Which server to check and how long to wait for it
    #[serde(default)]
    pub target: TargetConfig,

    /// Account used by the register and login steps
    #[serde(default)]
    pub credentials: Credentials,

    /// Payload sent by the create-product step
    #[serde(default)]
    pub product: ProductFixture,

    /// Update-quantity step settings
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Target server settings
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// Base URL of the inventory API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Base URL used when neither the command line nor the config names one
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Username and password for the test account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

fn default_username() -> String {
    "testuser".to_string()
}

fn default_password() -> String {
    "testpass123".to_string()
}

/// Product created during the run
///
/// Serialized as-is into the `POST /api/products` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFixture {
    #[serde(default = "default_product_name")]
    pub name: String,

    #[serde(rename = "type", default = "default_product_type")]
    pub product_type: String,

    #[serde(default = "default_sku")]
    pub sku: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_initial_quantity")]
    pub quantity: u32,

    #[serde(default = "default_price")]
    pub price: f64,

    #[serde(default = "default_image_url")]
    pub image_url: String,
}

impl Default for ProductFixture {
    fn default() -> Self {
        Self {
            name: default_product_name(),
            product_type: default_product_type(),
            sku: default_sku(),
            description: default_description(),
            quantity: default_initial_quantity(),
            price: default_price(),
            image_url: default_image_url(),
        }
    }
}

fn default_product_name() -> String {
    "Test Product".to_string()
}
fn default_product_type() -> String {
    "Electronics".to_string()
}
fn default_sku() -> String {
    "TEST001".to_string()
}
fn default_description() -> String {
    "A test product for API testing".to_string()
}
fn default_initial_quantity() -> u32 {
    100
}
fn default_price() -> f64 {
    29.99
}
fn default_image_url() -> String {
    "https://example.com/test-product.jpg".to_string()
}

/// Update-quantity step settings
#[derive(Debug, Deserialize)]
pub struct UpdateConfig {
    /// Quantity written to the created product, and expected back
    #[serde(default = "default_target_quantity")]
    pub quantity: u32,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            quantity: default_target_quantity(),
        }
    }
}

fn default_target_quantity() -> u32 {
    150
}

impl Config {
    /// Load configuration from an explicit path or the default config file
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}
