//! Feed configuration: a read-only default table merged with caller overrides.
//!
//! Overrides arrive as a flat key-value record (strings), either built in code
//! or flattened from a TOML file. Missing keys fall back to the defaults, so a
//! merged [`FeedConfig`] always has every field populated. Unknown keys are
//! accepted but logged, since they usually indicate a typo.
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value could not be coerced to the type its key requires.
    #[error("Invalid value for `{key}`: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

// ============================================================================
// Keys
// ============================================================================

pub const KEY_TITLE: &str = "title";
pub const KEY_URL: &str = "url";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_XSL_STYLESHEET_URL: &str = "xsl_stylesheet_url";
pub const KEY_CSS_STYLESHEET_URL: &str = "css_stylesheet_url";
pub const KEY_COPYRIGHT: &str = "copyright";
pub const KEY_TTL: &str = "ttl";
pub const KEY_ITEM_TITLE_FIELD: &str = "item_title_field";
pub const KEY_ITEM_DESCRIPTION_FIELD: &str = "item_description_field";
pub const KEY_ITEM_DATE_FIELD: &str = "item_date_field";
pub const KEY_ITEM_DESCRIPTION_MAX_LENGTH: &str = "item_description_max_length";

/// Every key [`FeedConfig::merge`] understands.
pub const KNOWN_KEYS: [&str; 11] = [
    KEY_TITLE,
    KEY_URL,
    KEY_DESCRIPTION,
    KEY_XSL_STYLESHEET_URL,
    KEY_CSS_STYLESHEET_URL,
    KEY_COPYRIGHT,
    KEY_TTL,
    KEY_ITEM_TITLE_FIELD,
    KEY_ITEM_DESCRIPTION_FIELD,
    KEY_ITEM_DATE_FIELD,
    KEY_ITEM_DESCRIPTION_MAX_LENGTH,
];

// ============================================================================
// FeedConfig
// ============================================================================

/// Feed-level metadata and the field names used to read each item.
///
/// Built once per render through [`FeedConfig::merge`] (or `load`) and never
/// mutated afterwards; fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    title: String,
    url: String,
    description: String,
    xsl_stylesheet_url: String,
    css_stylesheet_url: String,
    copyright: String,
    ttl: u32,
    item_title_field: String,
    item_description_field: String,
    item_date_field: String,
    item_description_max_length: usize,
}

/// The default table every merge starts from.
impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            description: String::new(),
            xsl_stylesheet_url: String::new(),
            css_stylesheet_url: String::new(),
            copyright: String::new(),
            ttl: 0,
            item_title_field: "title".to_string(),
            item_description_field: "body".to_string(),
            item_date_field: "created".to_string(),
            item_description_max_length: 0,
        }
    }
}

impl FeedConfig {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Builds a config from the default table overlaid with `overrides`.
    ///
    /// Integer keys (`ttl`, `item_description_max_length`) are parsed from
    /// their string form; blank counts as `0`. Negative or non-numeric values
    /// fail fast with [`ConfigError::InvalidValue`] instead of leaking into
    /// the rendered feed.
    ///
    /// # Examples
    ///
    /// ```
    /// use syndicate::config::FeedConfig;
    ///
    /// let config = FeedConfig::merge([("title", "Release notes"), ("ttl", "60")]).unwrap();
    /// assert_eq!(config.title(), "Release notes");
    /// assert_eq!(config.ttl(), 60);
    /// assert_eq!(config.item_title_field(), "title"); // default
    ///
    /// assert!(FeedConfig::merge([("ttl", "soon")]).is_err());
    /// ```
    pub fn merge<I, K, V>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in overrides {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                KEY_TITLE => config.title = value.to_string(),
                KEY_URL => config.url = value.to_string(),
                KEY_DESCRIPTION => config.description = value.to_string(),
                KEY_XSL_STYLESHEET_URL => config.xsl_stylesheet_url = value.to_string(),
                KEY_CSS_STYLESHEET_URL => config.css_stylesheet_url = value.to_string(),
                KEY_COPYRIGHT => config.copyright = value.to_string(),
                KEY_TTL => config.ttl = parse_count(key, value)?,
                KEY_ITEM_TITLE_FIELD => config.item_title_field = value.to_string(),
                KEY_ITEM_DESCRIPTION_FIELD => config.item_description_field = value.to_string(),
                KEY_ITEM_DATE_FIELD => config.item_date_field = value.to_string(),
                KEY_ITEM_DESCRIPTION_MAX_LENGTH => {
                    config.item_description_max_length = parse_count(key, value)?
                }
                _ => tracing::warn!(key = %key, "Unknown key in feed config, ignoring"),
            }
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(FeedConfig::default())`
    /// - Empty file → `Ok(FeedConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Bad value types → `Err(ConfigError::InvalidValue)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading to prevent memory exhaustion
        // from a maliciously large or corrupted config file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {} // Size is within limits, proceed
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), title = %config.title, "Loaded feed configuration");
        Ok(config)
    }

    /// Parse TOML text into a config.
    ///
    /// Keys may sit at the top level or inside a `[feed]` table. Scalar values
    /// (strings, integers, booleans) are flattened to strings and merged, so
    /// TOML input goes through the same coercion as programmatic overrides.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut table: toml::Table = content.parse()?;
        if let Some(toml::Value::Table(feed)) = table.remove("feed") {
            table = feed;
        }

        let mut overrides = HashMap::with_capacity(table.len());
        for (key, value) in table {
            let flat = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        value: other.to_string(),
                        reason: "expected a string or integer",
                    })
                }
            };
            overrides.insert(key, flat);
        }

        Self::merge(&overrides)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Channel link; empty means the renderer's fallback URL is used.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn xsl_stylesheet_url(&self) -> &str {
        &self.xsl_stylesheet_url
    }

    pub fn css_stylesheet_url(&self) -> &str {
        &self.css_stylesheet_url
    }

    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    /// Cache lifetime hint in minutes. 0 = omit `<ttl>`.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn item_title_field(&self) -> &str {
        &self.item_title_field
    }

    pub fn item_description_field(&self) -> &str {
        &self.item_description_field
    }

    pub fn item_date_field(&self) -> &str {
        &self.item_date_field
    }

    /// Description length bound in chars. 0 = no stripping, no truncation.
    pub fn item_description_max_length(&self) -> usize {
        self.item_description_max_length
    }
}

/// Coerces a non-negative integer, treating blank input as zero.
fn parse_count<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default,
{
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }

    trimmed.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: if trimmed.parse::<i64>().is_ok_and(|n| n < 0) {
            "must not be negative"
        } else {
            "expected a non-negative integer"
        },
    })
}

// ============================================================================
// Tests
// ============================================================================
