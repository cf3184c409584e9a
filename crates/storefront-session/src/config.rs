//! # Storefront Configuration
//!
//! Which storage backs the cart, under which key, and how money is shown.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_STORAGE=memory                                          │
//! │     STOREFRONT_DB_PATH=/var/lib/storefront/cart.db                     │
//! │     STOREFRONT_CART_KEY=outside-zone-cart                              │
//! │     STOREFRONT_TRUST_SNAPSHOT=true                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.outside-zone.storefront/         │
//! │       storefront.toml (macOS)                                          │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     SQLite in the platform data dir, key "outside-zone-cart", USD      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [storage]
//! backend = "sqlite"          # sqlite | memory | disabled
//! database_path = "/var/lib/storefront/cart.db"
//! cart_key = "outside-zone-cart"
//! trust_snapshot = false      # true: load stored carts verbatim
//!
//! [currency]
//! code = "USD"
//! symbol = "$"
//! decimals = 2
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use storefront_core::Money;
use storefront_store::{DisabledStore, MemoryStore, SqliteStore, StoreBackend, StoreConfig};

use crate::error::{SessionError, SessionResult};
use crate::session::SessionOptions;

/// Storage key the cart lives under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "outside-zone-cart";

// =============================================================================
// Storage Kind
// =============================================================================

/// Which backend holds the cart between sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// SQLite file in the data directory.
    #[default]
    Sqlite,

    /// Process memory; gone when the process exits.
    Memory,

    /// Storage capability off. Every session starts empty.
    Disabled,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Sqlite => write!(f, "sqlite"),
            StorageKind::Memory => write!(f, "memory"),
            StorageKind::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for StorageKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "file" => Ok(StorageKind::Sqlite),
            "memory" | "mem" => Ok(StorageKind::Memory),
            "disabled" | "off" | "none" => Ok(StorageKind::Disabled),
            other => Err(SessionError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: sqlite, memory, disabled",
                other
            ))),
        }
    }
}

// =============================================================================
// Settings Sections
// =============================================================================

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageKind,

    /// SQLite file. Defaults to `storefront.db` in the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_cart_key")]
    pub cart_key: String,

    /// Load stored carts verbatim instead of repairing them.
    #[serde(default)]
    pub trust_snapshot: bool,
}

fn default_cart_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageKind::default(),
            database_path: None,
            cart_key: default_cart_key(),
            trust_snapshot: false,
        }
    }
}

/// `[currency]` section. Display only; amounts are always cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// ISO 4217 code.
    #[serde(default = "default_currency_code")]
    pub code: String,

    #[serde(default = "default_currency_symbol")]
    pub symbol: String,

    #[serde(default = "default_currency_decimals")]
    pub decimals: u8,
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency_code(),
            symbol: default_currency_symbol(),
            decimals: default_currency_decimals(),
        }
    }
}

// =============================================================================
// Storefront Config
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub currency: CurrencySettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        if self.storage.cart_key.trim().is_empty() {
            return Err(SessionError::InvalidConfig("cart_key must not be empty".into()));
        }

        // 10^decimals must fit the cent arithmetic in format_currency
        if self.currency.decimals > 4 {
            return Err(SessionError::InvalidConfig(format!(
                "currency decimals must be between 0 and 4, got {}",
                self.currency.decimals
            )));
        }

        if self.storage.backend == StorageKind::Sqlite {
            if let Some(path) = &self.storage.database_path {
                if path.as_os_str().is_empty() {
                    return Err(SessionError::InvalidConfig(
                        "database_path must not be empty".into(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source.
    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = lookup("STOREFRONT_STORAGE") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("STOREFRONT_CART_KEY") {
            self.storage.cart_key = key;
        }

        if let Some(trust) = lookup("STOREFRONT_TRUST_SNAPSHOT") {
            match trust.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.storage.trust_snapshot = true,
                "0" | "false" | "no" => self.storage.trust_snapshot = false,
                _ => warn!(value = %trust, "Ignoring STOREFRONT_TRUST_SNAPSHOT"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "outside-zone", "storefront")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved SQLite file path.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.database_path {
            return path.clone();
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("storefront.db"))
            .unwrap_or_else(|| PathBuf::from("storefront.db"))
    }

    /// Options for a [`CartSession`](crate::CartSession) built from this config.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            cart_key: self.storage.cart_key.clone(),
            trust_snapshot: self.storage.trust_snapshot,
        }
    }

    /// Opens the configured backend.
    ///
    /// A SQLite file that cannot be opened is not fatal: the session runs
    /// on [`DisabledStore`] and the cart lives in memory only.
    pub async fn open_backend(&self) -> StoreBackend {
        match self.storage.backend {
            StorageKind::Sqlite => {
                let path = self.database_path();
                match SqliteStore::new(StoreConfig::new(&path)).await {
                    Ok(store) => StoreBackend::Sqlite(store),
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "Cart storage unavailable, continuing memory-only"
                        );
                        StoreBackend::Disabled(DisabledStore)
                    }
                }
            }
            StorageKind::Memory => StoreBackend::Memory(MemoryStore::new()),
            StorageKind::Disabled => StoreBackend::Disabled(DisabledStore),
        }
    }

    /// Formats an amount with the configured symbol and decimals.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::Money;
    /// use storefront_session::StorefrontConfig;
    ///
    /// let config = StorefrontConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let decimals = u32::from(self.currency.decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if decimals == 0 {
            format!("{}{}{}", sign, self.currency.symbol, whole)
        } else {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.currency.symbol,
                whole,
                frac,
                width = decimals as usize
            )
        }
    }
}
